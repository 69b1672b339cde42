use std::path::Path;

use serde::Serialize;
use tracing::info;

use lat_core::format::read_htk;
use lat_core::lattice::{forward_order, Lattice};
use lat_core::scoring::{score_lattice, LatticeAnnotations};
use lat_core::semiring::SemiringKind;
use lat_core::settings::settings;

/// `--semiring` if given, otherwise `[scoring] semiring`.
pub fn resolve_semiring(name: Option<&str>) -> SemiringKind {
    match name {
        Some(name) => die!(name.parse::<SemiringKind>(), "Error: {}"),
        None => settings().scoring.semiring,
    }
}

pub fn open_lattice(path: &str) -> Lattice {
    die!(read_htk(Path::new(path)), "Error reading lattice {path}: {}")
}

/// One row of the per-link table.
#[derive(Debug, Serialize)]
pub struct LinkRow<'a> {
    pub index: usize,
    pub word: &'a str,
    pub start: f64,
    pub end: f64,
    pub score: f64,
    pub posterior: Option<f64>,
    pub rescored: Option<f64>,
}

pub fn link_rows<'a>(lattice: &'a Lattice, annotations: &LatticeAnnotations) -> Vec<LinkRow<'a>> {
    lattice
        .links()
        .iter()
        .map(|link| {
            let (start, end) = lattice.link_interval(link);
            LinkRow {
                index: link.index,
                word: &link.word,
                start,
                end,
                score: lattice.link_score(link),
                posterior: annotations.posteriors.as_ref().and_then(|p| p.get(link.index)),
                rescored: annotations.rescored.as_ref().and_then(|r| r.get(link.index)),
            }
        })
        .collect()
}

#[derive(Serialize)]
struct ScoreReport<'a> {
    annotations: &'a LatticeAnnotations,
    links: Vec<LinkRow<'a>>,
}

pub fn score_cmd(lattice_file: &str, semiring: Option<&str>, json: bool) {
    let kind = resolve_semiring(semiring);
    let lattice = open_lattice(lattice_file);
    let annotations = die!(score_lattice(&lattice, kind.semiring()), "Error scoring lattice: {}");
    info!(
        utterance = %lattice.utterance,
        semiring = %kind,
        total = annotations.forward_backward.total,
        "scored lattice"
    );

    let rows = link_rows(&lattice, &annotations);
    if json {
        let report = ScoreReport {
            annotations: &annotations,
            links: rows,
        };
        println!(
            "{}",
            die!(serde_json::to_string_pretty(&report), "Error: {}")
        );
        return;
    }

    println!("utterance: {}", lattice.utterance);
    println!("semiring:  {kind}");
    println!("total:     {}", annotations.forward_backward.total);
    println!();
    println!(
        "{:>5}  {:<16} {:>8} {:>8} {:>12} {:>12} {:>12}",
        "link", "word", "start", "end", "score", "posterior", "rescored"
    );
    let fmt_opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.6}"));
    for row in &rows {
        println!(
            "{:>5}  {:<16} {:>8.3} {:>8.3} {:>12.4} {:>12} {:>12}",
            row.index,
            row.word,
            row.start,
            row.end,
            row.score,
            fmt_opt(row.posterior),
            fmt_opt(row.rescored)
        );
    }
}

pub fn order_cmd(lattice_file: &str) {
    let lattice = open_lattice(lattice_file);
    let order = forward_order(&lattice);
    let line: Vec<String> = order.iter().map(|i| i.to_string()).collect();
    println!("{}", line.join(" "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use lat_core::format::parse_htk_with;
    use lat_core::scoring::score_lattice_with;
    use lat_core::settings::{default_toml, parse_settings_toml};

    const LATTICE: &str = "\
UTTERANCE=u_0000000_0000200
N=3 L=3
I=0 t=0.00
I=1 t=0.10
I=2 t=0.20
J=0 S=0 E=1 W=a a=-1.0
J=1 S=0 E=1 W=b a=-2.0
J=2 S=1 E=2 W=c a=-0.5
";

    #[test]
    fn test_link_rows() {
        let lattice = parse_htk_with(LATTICE, 1.0).unwrap();
        let settings = parse_settings_toml(default_toml()).unwrap();
        let annotations =
            score_lattice_with(&lattice, SemiringKind::Log.semiring(), &settings).unwrap();
        let rows = link_rows(&lattice, &annotations);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].word, "b");
        assert_eq!((rows[2].start, rows[2].end), (0.1, 0.2));
        assert_eq!(rows[2].score, -0.5);
        // The only link into the end node carries all the mass.
        assert!(rows[2].posterior.unwrap().abs() < 1e-12);
        assert!(rows.iter().all(|r| r.rescored.is_some()));
    }

    #[test]
    fn test_link_rows_tropical_has_no_posteriors() {
        let lattice = parse_htk_with(LATTICE, 1.0).unwrap();
        let settings = parse_settings_toml(default_toml()).unwrap();
        let annotations =
            score_lattice_with(&lattice, SemiringKind::Tropical.semiring(), &settings).unwrap();
        let rows = link_rows(&lattice, &annotations);
        assert!(rows.iter().all(|r| r.posterior.is_none() && r.rescored.is_none()));
    }

    #[test]
    fn test_resolve_semiring_flag() {
        assert_eq!(resolve_semiring(Some("prob")), SemiringKind::Probability);
        assert_eq!(resolve_semiring(Some("Tropical")), SemiringKind::Tropical);
    }
}
