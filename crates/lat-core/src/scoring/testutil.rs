//! Small hand-built lattices shared by the scoring tests.

use crate::lattice::{Lattice, LatticeBuilder};
use crate::settings::{parse_settings_toml, Settings, DEFAULT_SETTINGS_TOML};

pub fn default_settings() -> Settings {
    parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap()
}

pub fn lifted_settings() -> Settings {
    let mut s = default_settings();
    s.scoring.lift_scores = true;
    s
}

pub fn close(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
}

/// start → n1 → … → end, one link per entry of `scores` (acoustic only),
/// each link 0.1s long.
pub fn chain(scores: &[f64]) -> Lattice {
    let mut b = LatticeBuilder::new("chain_0000000_0001000", 1.0);
    let mut prev = b.add_node(0.0);
    for (i, &score) in scores.iter().enumerate() {
        let next = b.add_node((i + 1) as f64 * 0.1);
        b.add_link(prev, next, format!("w{i}"), 1, score, 0.0)
            .unwrap();
        prev = next;
    }
    b.build().unwrap()
}

/// Two competing 30ms words followed by two competing 30ms words:
///
/// ```text
///        yes (ln .6)      no (ln 1)
///   0 ───────────→ 1 ───────────→ 3
///    \                           ↗
///     └──────────→ 2 ───────────┘
///        yes (ln .4)      now (ln 1)
/// ```
///
/// Node times: 0.00, 0.03, 0.03, 0.06. Total mass is 1, so under the
/// probability semiring the posteriors are .6, .4, .6, .4.
pub fn confusable() -> Lattice {
    let mut b = LatticeBuilder::new("conf_0000000_0000060", 1.0);
    let n0 = b.add_node(0.0);
    let n1 = b.add_node(0.03);
    let n2 = b.add_node(0.03);
    let n3 = b.add_node(0.06);
    b.add_link(n0, n1, "yes", 1, 0.6f64.ln(), 0.0).unwrap();
    b.add_link(n0, n2, "yes", 1, 0.4f64.ln(), 0.0).unwrap();
    b.add_link(n1, n3, "no", 1, 0.0, 0.0).unwrap();
    b.add_link(n2, n3, "now", 1, 0.0, 0.0).unwrap();
    b.build().unwrap()
}

/// start → {a, b} → end with acoustic and LM scores mixed by `lm_scale`.
pub fn diamond(lm_scale: f64) -> Lattice {
    let mut b = LatticeBuilder::new("diamond_0000000_0000200", lm_scale);
    let start = b.add_node(0.0);
    let a = b.add_node(0.1);
    let bb = b.add_node(0.1);
    let end = b.add_node(0.2);
    b.add_link(start, a, "a", 1, -1.0, -0.5).unwrap();
    b.add_link(start, bb, "b", 1, -2.0, -0.25).unwrap();
    b.add_link(a, end, "c", 1, -0.5, -1.0).unwrap();
    b.add_link(bb, end, "c", 1, -0.75, -0.5).unwrap();
    b.build().unwrap()
}

/// Parallel start → end paths of three links each; every entry holds the
/// acoustic scores of one path.
pub fn parallel_paths(paths: &[[f64; 3]]) -> Lattice {
    let mut b = LatticeBuilder::new("paths_0000000_0000300", 1.0);
    let start = b.add_node(0.0);
    let inner: Vec<(usize, usize)> = paths
        .iter()
        .map(|_| (b.add_node(0.1), b.add_node(0.2)))
        .collect();
    let end = b.add_node(0.3);
    for (i, (scores, &(n1, n2))) in paths.iter().zip(&inner).enumerate() {
        let word = format!("p{i}");
        b.add_link(start, n1, word.as_str(), 1, scores[0], 0.0).unwrap();
        b.add_link(n1, n2, word.as_str(), 1, scores[1], 0.0).unwrap();
        b.add_link(n2, end, word.as_str(), 1, scores[2], 0.0).unwrap();
    }
    b.build().unwrap()
}

/// Split `ln(prob)` unevenly across three links.
pub fn split_log_prob(prob: f64, first: f64, second: f64) -> [f64; 3] {
    let total = prob.ln();
    let a = total * first;
    let b = total * second;
    [a, b, total - a - b]
}
