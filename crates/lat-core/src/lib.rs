//! Semiring-generic scoring of word lattices: forward-backward, link
//! posteriors and time-frame rescoring, plus HTK/CTM text adapters.

pub mod format;
pub mod lattice;
pub(crate) mod numeric;
pub mod scoring;
pub mod semiring;
pub mod settings;
