use std::fs;

pub fn settings_export() {
    print!("{}", lat_core::settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(
        lat_core::settings::parse_settings_toml(&content),
        "Error: {}"
    );
    println!(
        "OK: scoring.semiring={}, rescore.frame_width={}, forward_backward.rtol={}",
        s.scoring.semiring, s.rescore.frame_width, s.forward_backward.rtol
    );
}

/// Install a custom settings file as the global settings.
pub fn load_settings(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    die!(
        lat_core::settings::init_custom(content),
        "Error loading settings: {}"
    );
}
