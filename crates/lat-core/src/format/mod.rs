//! Text formats around the scoring core: HTK lattices in, CTM transcripts out.

pub mod ctm;
pub mod htk;

use std::io;

use crate::lattice::LatticeError;

pub use ctm::{CtmWriter, Hypothesis, UtteranceSpan};
pub use htk::{parse_htk, parse_htk_with, read_htk};

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("header declares {declared} {what}, found {found}")]
    CountMismatch {
        what: &'static str,
        declared: usize,
        found: usize,
    },

    #[error("malformed utterance id '{0}' (expected <name>_<start-ms>_<end-ms>)")]
    Utterance(String),

    #[error(transparent)]
    Lattice(#[from] LatticeError),
}
