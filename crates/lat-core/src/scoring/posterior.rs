use serde::Serialize;
use tracing::{debug, debug_span};

use super::forward_backward::ForwardBackward;
use crate::lattice::{Lattice, LatticeError};
use crate::semiring::Semiring;

/// Posterior of every link, indexed by link index, in the semiring's carrier.
#[derive(Debug, Clone, Serialize)]
pub struct EdgePosteriors {
    pub semiring: &'static str,
    pub values: Vec<f64>,
}

impl EdgePosteriors {
    pub fn get(&self, link: usize) -> Option<f64> {
        self.values.get(link).copied()
    }
}

/// Fail unless `semiring` is the one `scores` were produced under.
pub(super) fn check_semiring(
    semiring: &dyn Semiring,
    scored_under: &'static str,
) -> Result<(), LatticeError> {
    if semiring.name() != scored_under {
        return Err(LatticeError::SemiringMismatch {
            expected: scored_under,
            found: semiring.name(),
        });
    }
    Ok(())
}

/// Fail unless an annotation has one entry per node or link of the lattice.
pub(super) fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), LatticeError> {
    if expected != found {
        return Err(LatticeError::AnnotationMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

/// Compute link posteriors from forward-backward scores.
///
/// `posterior(l) = forward(l.start) ⊗ w(l) ⊗ backward(l.end) ⊗ total⁻¹`.
/// Only semirings with a multiplicative inverse support this; the tropical
/// semiring is rejected with [`LatticeError::UnsupportedSemiring`].
pub fn edge_posteriors(
    lattice: &Lattice,
    scores: &ForwardBackward,
    semiring: &dyn Semiring,
) -> Result<EdgePosteriors, LatticeError> {
    let _span = debug_span!("edge_posteriors", semiring = semiring.name()).entered();
    check_semiring(semiring, scores.semiring)?;
    check_len("forward-backward scores", lattice.nodes().len(), scores.forward.len())?;
    check_len("forward-backward scores", lattice.nodes().len(), scores.backward.len())?;
    check_len("link weights", lattice.links().len(), scores.link_weights.len())?;

    let normalizer = semiring
        .invert(scores.total)
        .ok_or(LatticeError::UnsupportedSemiring {
            semiring: semiring.name(),
            operation: "edge posterior",
        })?;
    if scores.total == semiring.zero() {
        return Err(LatticeError::ZeroMass {
            semiring: semiring.name(),
        });
    }

    let values: Vec<f64> = lattice
        .links()
        .iter()
        .map(|link| {
            semiring.multiply(&[
                scores.forward[link.start],
                scores.link_weights[link.index],
                scores.backward[link.end],
                normalizer,
            ])
        })
        .collect();

    debug!(link_count = values.len(), total = scores.total);
    Ok(EdgePosteriors {
        semiring: semiring.name(),
        values,
    })
}
