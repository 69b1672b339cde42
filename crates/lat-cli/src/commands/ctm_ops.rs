use std::path::Path;

use tracing::info;

use lat_core::format::{CtmWriter, Hypothesis};
use lat_core::scoring::score_lattice;

use super::score_ops::{open_lattice, resolve_semiring};

/// Parse a comma-separated list of link indices, e.g. `0,3,5`.
pub fn parse_link_list(list: &str) -> Result<Vec<usize>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().map_err(|e| format!("bad link index '{s}': {e}")))
        .collect()
}

pub fn ctm_cmd(
    lattice_file: &str,
    links: &str,
    output: &str,
    confidence: bool,
    semiring: Option<&str>,
) {
    let lattice = open_lattice(lattice_file);
    let links = die!(parse_link_list(links), "Error: {}");

    let annotations = confidence.then(|| {
        let kind = resolve_semiring(semiring);
        die!(score_lattice(&lattice, kind.semiring()), "Error scoring lattice: {}")
    });
    let rescored = match &annotations {
        Some(a) => match &a.rescored {
            Some(r) => Some(r.values.as_slice()),
            None => {
                eprintln!("Error: --confidence needs a semiring with posteriors");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let hypothesis = Hypothesis {
        lattice: &lattice,
        links: &links,
        confidence: rescored,
    };
    die!(
        CtmWriter::default().write_file(Path::new(output), &[hypothesis]),
        "Error writing {output}: {}"
    );
    info!(output, links = links.len(), "wrote ctm");
}
