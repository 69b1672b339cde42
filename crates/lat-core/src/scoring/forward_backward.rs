use serde::Serialize;
use tracing::{debug, debug_span};

use crate::lattice::{forward_order, Lattice, LatticeError};
use crate::numeric::approx_eq;
use crate::semiring::Semiring;
use crate::settings::{settings, Settings};

/// Forward and backward scores for every node, indexed by node index.
///
/// Nodes not reachable from the start node keep the semiring's `zero()`.
#[derive(Debug, Clone, Serialize)]
pub struct ForwardBackward {
    pub semiring: &'static str,
    /// Nodes reachable from the start, in forward topological order.
    pub order: Vec<usize>,
    pub forward: Vec<f64>,
    pub backward: Vec<f64>,
    /// Total lattice mass, `forward(end)`.
    pub total: f64,
    /// Per-link weight the passes multiplied in.
    pub link_weights: Vec<f64>,
}

impl ForwardBackward {
    /// Reverse topological order (end node first).
    pub fn reverse_order(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().rev().copied()
    }
}

/// Run forward-backward under `semiring` using the global settings.
pub fn forward_backward(
    lattice: &Lattice,
    semiring: &dyn Semiring,
) -> Result<ForwardBackward, LatticeError> {
    forward_backward_with(lattice, semiring, settings())
}

/// Run forward-backward under `semiring`.
///
/// `forward(start)` and `backward(end)` are `one()`; every other node sums,
/// over its incoming (outgoing) links, the product of the neighbour's score
/// and the link weight. Fails with [`LatticeError::Inconsistent`] if the two
/// directions disagree on the total mass beyond the configured tolerance.
pub fn forward_backward_with(
    lattice: &Lattice,
    semiring: &dyn Semiring,
    settings: &Settings,
) -> Result<ForwardBackward, LatticeError> {
    let nodes = lattice.nodes();
    let links = lattice.links();
    let _span = debug_span!(
        "forward_backward",
        semiring = semiring.name(),
        node_count = nodes.len(),
        link_count = links.len()
    )
    .entered();

    let lift = settings.scoring.lift_scores;
    let link_weights: Vec<f64> = links
        .iter()
        .map(|link| {
            let score = lattice.link_score(link);
            if lift {
                semiring.from_log(score)
            } else {
                score
            }
        })
        .collect();

    let order = forward_order(lattice);
    let start = lattice.start_node().index;
    let end = lattice.end_node().index;
    let mut terms: Vec<f64> = Vec::new();

    let mut forward = vec![semiring.zero(); nodes.len()];
    forward[start] = semiring.one();
    for &node in order.iter().filter(|&&n| n != start) {
        terms.clear();
        terms.extend(nodes[node].in_links.iter().map(|&l| {
            semiring.multiply(&[forward[links[l].start], link_weights[l]])
        }));
        forward[node] = semiring.add(&terms);
    }

    let mut backward = vec![semiring.zero(); nodes.len()];
    backward[end] = semiring.one();
    for &node in order.iter().rev().filter(|&&n| n != end) {
        terms.clear();
        terms.extend(nodes[node].out_links.iter().map(|&l| {
            semiring.multiply(&[backward[links[l].end], link_weights[l]])
        }));
        backward[node] = semiring.add(&terms);
    }

    let forward_total = forward[end];
    let backward_total = backward[start];
    let fb = &settings.forward_backward;
    if !approx_eq(backward_total, forward_total, fb.rtol, fb.atol) {
        return Err(LatticeError::Inconsistent {
            forward_total,
            backward_total,
        });
    }

    debug!(total = forward_total, reachable = order.len());
    Ok(ForwardBackward {
        semiring: semiring.name(),
        order,
        forward,
        backward,
        total: forward_total,
        link_weights,
    })
}
