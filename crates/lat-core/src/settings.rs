//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

use crate::semiring::SemiringKind;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub scoring: ScoringSettings,
    pub forward_backward: ForwardBackwardSettings,
    pub rescore: RescoreSettings,
    pub htk: HtkSettings,
    pub ctm: CtmSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    pub semiring: SemiringKind,
    #[serde(default)]
    pub lift_scores: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForwardBackwardSettings {
    pub rtol: f64,
    /// Absolute tolerance; dominates when the total is near zero.
    #[serde(default = "default_atol")]
    pub atol: f64,
}

fn default_atol() -> f64 {
    1e-9
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortLinkPolicy {
    /// Score the link as a single frame at its start time.
    SingleFrame,
    /// Fail with `LatticeError::DegenerateInterval`.
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescoreSettings {
    pub frame_width: f64,
    pub short_links: ShortLinkPolicy,
    /// Upper bound on frames per link.
    #[serde(default = "default_max_link_frames")]
    pub max_link_frames: usize,
}

fn default_max_link_frames() -> usize {
    1_000_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct HtkSettings {
    pub default_lm_scale: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CtmSettings {
    #[serde(default)]
    pub skip_words: Vec<String>,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_non_negative {
        ($section:ident . $field:ident) => {
            if !(s.$section.$field >= 0.0) {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be non-negative".to_string(),
                });
            }
        };
    }

    check_non_negative!(forward_backward.rtol);
    check_non_negative!(forward_backward.atol);

    if !(s.rescore.frame_width > 0.0) || !s.rescore.frame_width.is_finite() {
        return Err(SettingsError::InvalidValue {
            field: "rescore.frame_width".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if s.rescore.max_link_frames == 0 {
        return Err(SettingsError::InvalidValue {
            field: "rescore.max_link_frames".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if !s.htk.default_lm_scale.is_finite() {
        return Err(SettingsError::InvalidValue {
            field: "htk.default_lm_scale".to_string(),
            reason: "must be finite".to_string(),
        });
    }

    Ok(())
}
