//! HTK Standard Lattice Format (SLF) reader.
//!
//! Supports the subset produced by common decoders:
//!
//! ```text
//! VERSION=1.1
//! UTTERANCE=spk1_0001230_0004560
//! lmscale=12.0
//! NODES=3 LINKS=2          (or N=3 L=2)
//! I=0 t=0.00
//! I=1 t=0.25 W=!NULL
//! I=2 t=0.61
//! J=0 S=0 E=1 W=HELLO v=1 a=-1234.5 l=-3.2
//! J=1 S=1 E=2 W="WORLD" v=1 a=-987.0 l=-2.8
//! ```
//!
//! Fields are `key=value` tokens in any order. Blank lines and lines starting
//! with `#` are skipped; unknown header keys are ignored.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, debug_span};

use super::FormatError;
use crate::lattice::{Lattice, LatticeBuilder};
use crate::settings::settings;

/// Read and parse an HTK lattice file.
pub fn read_htk(path: &Path) -> Result<Lattice, FormatError> {
    let text = fs::read_to_string(path)?;
    parse_htk(&text)
}

/// Parse HTK lattice text, falling back to `[htk] default_lm_scale`.
pub fn parse_htk(text: &str) -> Result<Lattice, FormatError> {
    parse_htk_with(text, settings().htk.default_lm_scale)
}

struct RawNode {
    time: f64,
    word: Option<String>,
    var: Option<u32>,
}

struct RawLink {
    start: usize,
    end: usize,
    word: String,
    var: u32,
    acoustic: f64,
    lm: f64,
}

/// `key=value` tokens of one line.
struct Fields<'a> {
    line: usize,
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Fields<'a> {
    fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, v)| v.trim_matches('"'))
    }

    fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, FormatError>
    where
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|v| {
                v.parse().map_err(|e| FormatError::Parse {
                    line: self.line,
                    message: format!("{key}={v}: {e}"),
                })
            })
            .transpose()
    }

    fn require<T: FromStr>(&self, key: &str) -> Result<T, FormatError>
    where
        T::Err: std::fmt::Display,
    {
        self.parse(key)?.ok_or_else(|| FormatError::Parse {
            line: self.line,
            message: format!("missing {key}="),
        })
    }
}

/// Parse HTK lattice text. `default_lm_scale` applies when the header has
/// no `lmscale=`.
pub fn parse_htk_with(text: &str, default_lm_scale: f64) -> Result<Lattice, FormatError> {
    let _span = debug_span!("read_htk", bytes = text.len()).entered();
    let mut version: Option<String> = None;
    let mut utterance = String::new();
    let mut lm_scale: Option<f64> = None;
    let mut declared_nodes: Option<usize> = None;
    let mut declared_links: Option<usize> = None;
    let mut nodes: Vec<RawNode> = Vec::new();
    let mut links: Vec<RawLink> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields = Fields {
            line: line_no,
            pairs: line
                .split_whitespace()
                .filter_map(|tok| tok.split_once('='))
                .collect(),
        };

        if line.starts_with("I=") {
            let index: usize = fields.require("I")?;
            if index != nodes.len() {
                return Err(FormatError::Parse {
                    line: line_no,
                    message: format!("node I={index} out of order (expected {})", nodes.len()),
                });
            }
            nodes.push(RawNode {
                time: fields.require("t")?,
                word: fields.get("W").map(str::to_string),
                var: fields.parse("v")?,
            });
        } else if line.starts_with("J=") {
            let index: usize = fields.require("J")?;
            if index != links.len() {
                return Err(FormatError::Parse {
                    line: line_no,
                    message: format!("link J={index} out of order (expected {})", links.len()),
                });
            }
            links.push(RawLink {
                start: fields.require("S")?,
                end: fields.require("E")?,
                word: fields.require("W")?,
                var: fields.parse("v")?.unwrap_or(0),
                acoustic: fields.parse("a")?.unwrap_or(0.0),
                lm: fields.parse("l")?.unwrap_or(0.0),
            });
        } else {
            if let Some(v) = fields.get("VERSION") {
                version = Some(v.to_string());
            }
            if let Some(u) = fields.get("UTTERANCE") {
                utterance = u.to_string();
            }
            if let Some(scale) = fields.parse("lmscale")? {
                lm_scale = Some(scale);
            }
            if let Some(n) = fields.parse("NODES")?.or(fields.parse("N")?) {
                declared_nodes = Some(n);
            }
            if let Some(n) = fields.parse("LINKS")?.or(fields.parse("L")?) {
                declared_links = Some(n);
            }
        }
    }

    check_count("nodes", declared_nodes, nodes.len())?;
    check_count("links", declared_links, links.len())?;

    let lm_scale = lm_scale.unwrap_or(default_lm_scale);
    let mut builder = LatticeBuilder::new(utterance, lm_scale);
    if let Some(v) = version {
        builder = builder.version(v);
    }
    for node in nodes {
        builder.add_tagged_node(node.time, node.word, node.var);
    }
    for link in links {
        builder.add_link(link.start, link.end, link.word, link.var, link.acoustic, link.lm)?;
    }
    let lattice = builder.build()?;

    debug!(
        utterance = %lattice.utterance,
        node_count = lattice.nodes().len(),
        link_count = lattice.links().len(),
        lm_scale,
        "read lattice"
    );
    Ok(lattice)
}

fn check_count(what: &'static str, declared: Option<usize>, found: usize) -> Result<(), FormatError> {
    match declared {
        Some(declared) if declared != found => Err(FormatError::CountMismatch {
            what,
            declared,
            found,
        }),
        _ => Ok(()),
    }
}
