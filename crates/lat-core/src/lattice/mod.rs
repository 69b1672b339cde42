//! Word lattices: timed nodes joined by word-labelled links.
//!
//! Nodes and links live in index-addressed arenas owned by [`Lattice`];
//! adjacency is stored as link indices on each node. A lattice is immutable
//! once built, and every scoring stage returns its results as a separate
//! annotation record rather than writing into the graph.

mod topo;

use serde::Serialize;
use tracing::debug;

pub use topo::{forward_order, topological_sort};

#[derive(Debug, thiserror::Error)]
pub enum LatticeError {
    #[error("{operation} is not defined under the {semiring} semiring")]
    UnsupportedSemiring {
        semiring: &'static str,
        operation: &'static str,
    },

    #[error("forward total {forward_total} disagrees with backward total {backward_total}")]
    Inconsistent {
        forward_total: f64,
        backward_total: f64,
    },

    #[error("link {link} spans {duration}s, shorter than one time frame")]
    DegenerateInterval { link: usize, duration: f64 },

    #[error("scores were computed under the {expected} semiring, not {found}")]
    SemiringMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("lattice has zero total mass under the {semiring} semiring")]
    ZeroMass { semiring: &'static str },

    #[error("node {0} not found")]
    NodeNotFound(usize),

    #[error("invalid link {link}: {reason}")]
    InvalidLink { link: usize, reason: String },

    #[error("node {node} has invalid time {time}s (must be finite and non-negative)")]
    InvalidTime { node: usize, time: f64 },

    #[error("{what} has {found} entries but the lattice has {expected}")]
    AnnotationMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("link {link} spans {frames} frames, more than the limit of {limit}")]
    TooManyFrames { link: usize, frames: f64, limit: usize },

    #[error("lattice has no nodes")]
    EmptyLattice,

    #[error("unknown semiring: {0}")]
    UnknownSemiring(String),
}

/// A point in time within the lattice.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub index: usize,
    /// Seconds from the start of the utterance.
    pub time: f64,
    pub word: Option<String>,
    pub var: Option<u32>,
    /// Indices of links ending at this node.
    pub in_links: Vec<usize>,
    /// Indices of links starting at this node.
    pub out_links: Vec<usize>,
}

/// A hypothesised word occupying the interval between two nodes.
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub word: String,
    pub var: u32,
    /// Acoustic log-likelihood.
    pub acoustic_score: f64,
    /// Language-model log-probability.
    pub lm_score: f64,
}

impl Link {
    /// Combined log-domain score `lm_scale * lm + acoustic`.
    ///
    /// Always additive, whatever semiring the caller later applies it under.
    pub fn score(&self, lm_scale: f64) -> f64 {
        lm_scale * self.lm_score + self.acoustic_score
    }
}

/// A single-source, single-sink DAG of recognition hypotheses.
#[derive(Debug, Clone)]
pub struct Lattice {
    nodes: Vec<Node>,
    links: Vec<Link>,
    pub lm_scale: f64,
    pub utterance: String,
    pub version: Option<String>,
}

impl Lattice {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn link(&self, index: usize) -> Option<&Link> {
        self.links.get(index)
    }

    /// The first node, where every path starts.
    pub fn start_node(&self) -> &Node {
        &self.nodes[0]
    }

    /// The last node, where every path ends.
    pub fn end_node(&self) -> &Node {
        &self.nodes[self.nodes.len() - 1]
    }

    /// Time span `(start, end)` of a link in seconds.
    pub fn link_interval(&self, link: &Link) -> (f64, f64) {
        (self.nodes[link.start].time, self.nodes[link.end].time)
    }

    pub fn link_score(&self, link: &Link) -> f64 {
        link.score(self.lm_scale)
    }
}

/// Assembles a [`Lattice`], keeping node adjacency and links consistent.
///
/// Node indices must be dense and given in order; link endpoints must
/// refer to existing nodes and may not run backwards in time.
#[derive(Debug)]
pub struct LatticeBuilder {
    nodes: Vec<Node>,
    links: Vec<Link>,
    lm_scale: f64,
    utterance: String,
    version: Option<String>,
}

impl LatticeBuilder {
    pub fn new(utterance: impl Into<String>, lm_scale: f64) -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            lm_scale,
            utterance: utterance.into(),
            version: None,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Append a node and return its index.
    pub fn add_node(&mut self, time: f64) -> usize {
        self.add_tagged_node(time, None, None)
    }

    pub fn add_tagged_node(&mut self, time: f64, word: Option<String>, var: Option<u32>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            index,
            time,
            word,
            var,
            in_links: Vec::new(),
            out_links: Vec::new(),
        });
        index
    }

    /// Append a link between two existing nodes and return its index.
    pub fn add_link(
        &mut self,
        start: usize,
        end: usize,
        word: impl Into<String>,
        var: u32,
        acoustic_score: f64,
        lm_score: f64,
    ) -> Result<usize, LatticeError> {
        let index = self.links.len();
        let start_time = self
            .nodes
            .get(start)
            .ok_or(LatticeError::NodeNotFound(start))?
            .time;
        let end_time = self
            .nodes
            .get(end)
            .ok_or(LatticeError::NodeNotFound(end))?
            .time;
        if start == end {
            return Err(LatticeError::InvalidLink {
                link: index,
                reason: format!("self-loop on node {start}"),
            });
        }
        if start_time > end_time {
            return Err(LatticeError::InvalidLink {
                link: index,
                reason: format!("starts at {start_time}s but ends at {end_time}s"),
            });
        }
        self.links.push(Link {
            index,
            start,
            end,
            word: word.into(),
            var,
            acoustic_score,
            lm_score,
        });
        self.nodes[start].out_links.push(index);
        self.nodes[end].in_links.push(index);
        Ok(index)
    }

    pub fn build(self) -> Result<Lattice, LatticeError> {
        if self.nodes.is_empty() {
            return Err(LatticeError::EmptyLattice);
        }
        if let Some(node) = self
            .nodes
            .iter()
            .find(|n| !n.time.is_finite() || n.time < 0.0)
        {
            return Err(LatticeError::InvalidTime {
                node: node.index,
                time: node.time,
            });
        }
        debug!(
            utterance = %self.utterance,
            node_count = self.nodes.len(),
            link_count = self.links.len(),
            "built lattice"
        );
        Ok(Lattice {
            nodes: self.nodes,
            links: self.links,
            lm_scale: self.lm_scale,
            utterance: self.utterance,
            version: self.version,
        })
    }
}
