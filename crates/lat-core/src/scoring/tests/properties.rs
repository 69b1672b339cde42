use proptest::prelude::*;

use super::*;
use crate::lattice::LatticeBuilder;
use crate::numeric::approx_eq;
use crate::scoring::testutil::{default_settings, lifted_settings, parallel_paths, split_log_prob};
use crate::semiring::{LogSemiring, ProbabilitySemiring};

/// A chain 0 → 1 → … → n-1 plus extra forward links, so every node is on
/// some start-to-end path.
fn random_dag() -> impl Strategy<Value = Lattice> {
    (3usize..12)
        .prop_flat_map(|n| {
            let chain = prop::collection::vec(-8.0f64..0.0, n - 1);
            let extra = prop::collection::vec((0..n, 0..n, -8.0f64..0.0, -3.0f64..0.0), 0..20);
            (Just(n), chain, extra)
        })
        .prop_map(|(n, chain, extra)| {
            let mut b = LatticeBuilder::new("prop", 0.8);
            for i in 0..n {
                b.add_node(i as f64 * 0.02);
            }
            for (i, &a) in chain.iter().enumerate() {
                b.add_link(i, i + 1, format!("w{}", i % 3), 1, a, -1.0).unwrap();
            }
            for (x, y, a, l) in extra {
                if x < y {
                    b.add_link(x, y, format!("w{}", y % 3), 1, a, l).unwrap();
                }
            }
            b.build().unwrap()
        })
}

proptest! {
    #[test]
    fn prop_log_totals_agree(lattice in random_dag()) {
        let fb = forward_backward_with(&lattice, &LogSemiring, &default_settings()).unwrap();
        let start = lattice.start_node().index;
        prop_assert!(approx_eq(fb.backward[start], fb.total, 1e-6, 1e-9));
        prop_assert_eq!(fb.order.len(), lattice.nodes().len());
    }

    #[test]
    fn prop_normalised_three_link_paths_are_consistent(
        weights in prop::collection::vec(0.05f64..1.0, 3),
        splits in prop::collection::vec((0.0f64..0.5, 0.0f64..0.5), 3),
    ) {
        let sum: f64 = weights.iter().sum();
        let paths: Vec<[f64; 3]> = weights
            .iter()
            .zip(&splits)
            .map(|(w, &(first, second))| split_log_prob(w / sum, first, second))
            .collect();
        let lattice = parallel_paths(&paths);
        let fb = forward_backward_with(&lattice, &LogSemiring, &default_settings());
        prop_assert!(fb.is_ok(), "{:?}", fb.as_ref().err());
        prop_assert!(fb.unwrap().total.abs() < 1e-9);
    }

    #[test]
    fn prop_posteriors_leaving_start_are_certain(lattice in random_dag()) {
        let settings = lifted_settings();
        let fb = forward_backward_with(&lattice, &ProbabilitySemiring, &settings).unwrap();
        let post = edge_posteriors(&lattice, &fb, &ProbabilitySemiring).unwrap();
        let leaving: f64 = lattice
            .start_node()
            .out_links
            .iter()
            .map(|&l| post.values[l])
            .sum();
        prop_assert!((leaving - 1.0).abs() < 1e-9, "{}", leaving);
        for &p in &post.values {
            prop_assert!((-1e-12..=1.0 + 1e-9).contains(&p));
        }
    }

    #[test]
    fn prop_probability_rescored_within_unit_interval(lattice in random_dag()) {
        let settings = lifted_settings();
        let annotations = score_lattice_with(&lattice, &ProbabilitySemiring, &settings).unwrap();
        for &v in &annotations.rescored.unwrap().values {
            prop_assert!((-1e-9..=1.0 + 1e-9).contains(&v), "{}", v);
        }
    }
}
