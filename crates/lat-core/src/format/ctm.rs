//! CTM (time-marked conversation) writer for decoded hypotheses.
//!
//! Utterance ids are expected to look like `<name>_<start-ms>_<end-ms>`,
//! e.g. `sw02001-A_0001230_0004560`; link times are written relative to the
//! utterance start.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, debug_span};

use super::FormatError;
use crate::lattice::{Lattice, LatticeError};
use crate::settings::settings;

/// Recording name and time span encoded in an utterance id.
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceSpan {
    pub name: String,
    /// Seconds.
    pub start: f64,
    /// Seconds.
    pub end: f64,
}

impl UtteranceSpan {
    pub fn parse(utterance: &str) -> Result<Self, FormatError> {
        let malformed = || FormatError::Utterance(utterance.to_string());
        let mut parts = utterance.rsplitn(3, '_');
        let end = parts.next().ok_or_else(malformed)?;
        let start = parts.next().ok_or_else(malformed)?;
        let name = parts.next().filter(|n| !n.is_empty()).ok_or_else(malformed)?;
        let millis = |s: &str| s.parse::<u64>().map_err(|_| malformed());
        Ok(Self {
            name: name.to_string(),
            start: millis(start)? as f64 / 1000.0,
            end: millis(end)? as f64 / 1000.0,
        })
    }
}

/// One decoded path through a lattice.
#[derive(Debug, Clone, Copy)]
pub struct Hypothesis<'a> {
    pub lattice: &'a Lattice,
    /// Link indices from start to end.
    pub links: &'a [usize],
    /// Optional per-link confidence indexed by link index (e.g. rescored values).
    pub confidence: Option<&'a [f64]>,
}

const HEADER: [&str; 6] = [";;", "<name>", "<track>", "<start>", "<duration>", "<word>"];

pub struct CtmWriter {
    skip_words: Vec<String>,
}

impl Default for CtmWriter {
    /// Skips the words listed in `[ctm] skip_words`.
    fn default() -> Self {
        Self::new(settings().ctm.skip_words.clone())
    }
}

impl CtmWriter {
    pub fn new(skip_words: Vec<String>) -> Self {
        Self { skip_words }
    }

    pub fn write_file(&self, path: &Path, hypotheses: &[Hypothesis<'_>]) -> Result<(), FormatError> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write(&mut out, hypotheses)?;
        out.flush()?;
        Ok(())
    }

    pub fn write<W: Write>(&self, out: &mut W, hypotheses: &[Hypothesis<'_>]) -> Result<(), FormatError> {
        let _span = debug_span!("write_ctm", hypotheses = hypotheses.len()).entered();
        let mut rows = 0usize;
        for hyp in hypotheses {
            let lattice = hyp.lattice;
            let span = UtteranceSpan::parse(&lattice.utterance)?;

            let mut header: Vec<&str> = HEADER.to_vec();
            if hyp.confidence.is_some() {
                header.push("<confidence>");
            }
            write_row(out, &header)?;
            let description = [
                ";;".to_string(),
                format!("{}/{}", span.name, lattice.utterance),
                format!("({:.3}-{:.3})", span.start, span.end),
            ];
            write_row(out, &description)?;

            for &index in hyp.links {
                let link = lattice.link(index).ok_or_else(|| LatticeError::InvalidLink {
                    link: index,
                    reason: format!("not in lattice {}", lattice.utterance),
                })?;
                if self.skip_words.iter().any(|w| *w == link.word) {
                    continue;
                }
                let (start, end) = lattice.link_interval(link);
                let mut row = vec![
                    span.name.clone(),
                    "1".to_string(),
                    format!("{:.3}", start + span.start),
                    format!("{:.3}", end - start),
                    link.word.trim_end().to_string(),
                ];
                if let Some(confidence) = hyp.confidence {
                    let value = confidence.get(index).copied().unwrap_or(f64::NAN);
                    row.push(format!("{value:.3}"));
                }
                write_row(out, &row)?;
                rows += 1;
            }
        }
        debug!(rows);
        Ok(())
    }
}

/// Space-separated row; fields containing spaces, quotes or newlines are quoted.
fn write_row<W: Write, S: AsRef<str>>(out: &mut W, fields: &[S]) -> Result<(), FormatError> {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        let field = field.as_ref();
        if field.contains([' ', '"', '\n', '\r']) {
            line.push('"');
            line.push_str(&field.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(field);
        }
    }
    line.push('\n');
    out.write_all(line.as_bytes())?;
    Ok(())
}
