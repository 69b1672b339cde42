//! Word error rate via an external `sclite` binary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug_span, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum WerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed sclite report: {0}")]
    Report(String),
}

/// Where sclite writes its summary for `hyp`: `<out_dir>/<hyp file name>.sys`.
pub fn sys_path(out_dir: &Path, hyp: &Path) -> PathBuf {
    let mut name = hyp
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".sys");
    out_dir.join(name)
}

/// Extract the WER column from an sclite `.sys` report: the ninth token
/// after the `Sum/Avg` marker.
pub fn parse_sys_wer(report: &str) -> Result<f64, WerError> {
    let (_, tail) = report
        .split_once("Sum/Avg")
        .ok_or_else(|| WerError::Report("no Sum/Avg row".to_string()))?;
    let token = tail
        .split_whitespace()
        .nth(8)
        .ok_or_else(|| WerError::Report("Sum/Avg row too short".to_string()))?;
    token
        .parse()
        .map_err(|e| WerError::Report(format!("WER '{token}': {e}")))
}

/// Score `hyp` (CTM) against `reference` (STM) and return the WER.
pub fn run_sclite(sclite: &Path, hyp: &Path, reference: &Path, out_dir: &Path) -> Result<f64, WerError> {
    let _span = debug_span!("sclite", hyp = %hyp.display()).entered();
    fs::create_dir_all(out_dir)?;
    let output = Command::new(sclite)
        .args(["-e", "utf-8", "-r"])
        .arg(reference)
        .arg("stm")
        .arg("-h")
        .arg(hyp)
        .args(["ctm", "-o", "all", "-O"])
        .arg(out_dir)
        .output()
        .map_err(|source| WerError::Spawn {
            program: sclite.display().to_string(),
            source,
        })?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        info!(target: "lat_cli::sclite", "{line}");
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        warn!(target: "lat_cli::sclite", "{line}");
    }
    if !output.status.success() {
        warn!(status = %output.status, "sclite exited with failure");
    }

    let report = fs::read_to_string(sys_path(out_dir, hyp))?;
    parse_sys_wer(&report)
}

pub fn wer_cmd(hyp: &str, reference: &str, out_dir: &str, sclite: &str) {
    let wer = die!(
        run_sclite(
            Path::new(sclite),
            Path::new(hyp),
            Path::new(reference),
            Path::new(out_dir)
        ),
        "Error computing WER: {}"
    );
    println!("WER: {wer}");
}
