//! Lattice scoring: forward-backward, link posteriors and frame rescoring.
//!
//! Each stage reads the results of the previous one and returns its own
//! annotation record keyed by node or link index:
//!
//! topological sort → [`forward_backward`] → [`edge_posteriors`] → [`rescore`]
//!
//! The lattice itself is never modified, so the same lattice can be scored
//! repeatedly or under several semirings.

mod forward_backward;
mod posterior;
mod rescore;
#[cfg(test)]
pub(crate) mod testutil;

#[cfg(test)]
mod tests;

use serde::Serialize;
use tracing::debug_span;

use crate::lattice::{Lattice, LatticeError};
use crate::semiring::Semiring;
use crate::settings::{settings, Settings};

pub use forward_backward::{forward_backward, forward_backward_with, ForwardBackward};
pub use posterior::{edge_posteriors, EdgePosteriors};
pub use rescore::{frame_times, rescore, rescore_with, time_frame_word_posterior, Rescored};

/// All scoring results for one lattice.
#[derive(Debug, Clone, Serialize)]
pub struct LatticeAnnotations {
    pub utterance: String,
    pub forward_backward: ForwardBackward,
    /// Absent when the semiring has no notion of posterior probability.
    pub posteriors: Option<EdgePosteriors>,
    pub rescored: Option<Rescored>,
}

/// Run every applicable stage using the global settings.
pub fn score_lattice(
    lattice: &Lattice,
    semiring: &dyn Semiring,
) -> Result<LatticeAnnotations, LatticeError> {
    score_lattice_with(lattice, semiring, settings())
}

/// Run forward-backward, then posteriors and rescoring if the semiring
/// supports them (tropical stops after forward-backward).
pub fn score_lattice_with(
    lattice: &Lattice,
    semiring: &dyn Semiring,
    settings: &Settings,
) -> Result<LatticeAnnotations, LatticeError> {
    let _span = debug_span!("score_lattice", utterance = %lattice.utterance).entered();
    let scores = forward_backward_with(lattice, semiring, settings)?;

    let (posteriors, rescored) = if semiring.invert(semiring.one()).is_some() {
        let posteriors = edge_posteriors(lattice, &scores, semiring)?;
        let rescored = rescore_with(lattice, &posteriors, semiring, &settings.rescore)?;
        (Some(posteriors), Some(rescored))
    } else {
        (None, None)
    };

    Ok(LatticeAnnotations {
        utterance: lattice.utterance.clone(),
        forward_backward: scores,
        posteriors,
        rescored,
    })
}
