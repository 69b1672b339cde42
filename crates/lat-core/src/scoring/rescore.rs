use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, debug_span, warn};

use super::posterior::{check_len, check_semiring, EdgePosteriors};
use crate::lattice::{Lattice, LatticeError, Link};
use crate::semiring::Semiring;
use crate::settings::{settings, RescoreSettings, ShortLinkPolicy};

/// Smoothed per-link cost: one minus the frame-averaged word posterior.
#[derive(Debug, Clone, Serialize)]
pub struct Rescored {
    pub semiring: &'static str,
    pub values: Vec<f64>,
}

impl Rescored {
    pub fn get(&self, link: usize) -> Option<f64> {
        self.values.get(link).copied()
    }
}

fn frame_count(start: f64, end: f64, frame_width: f64) -> f64 {
    ((end - start) / frame_width).round().max(0.0)
}

/// Frame timestamps covering `[start, end)` at `frame_width` spacing.
///
/// The frame count is `round((end - start) / frame_width)`, so a link
/// shorter than half a frame has none. Non-finite spans have no frames.
pub fn frame_times(start: f64, end: f64, frame_width: f64) -> Vec<f64> {
    let count = frame_count(start, end, frame_width);
    if !count.is_finite() {
        return Vec::new();
    }
    (0..count as usize)
        .map(|i| start + i as f64 * frame_width)
        .collect()
}

/// Semiring sum of the posteriors of every link labelled `word` whose
/// interval `[start, end)` contains `time`.
pub fn time_frame_word_posterior(
    lattice: &Lattice,
    posteriors: &EdgePosteriors,
    semiring: &dyn Semiring,
    word: &str,
    time: f64,
) -> f64 {
    let mut terms = Vec::new();
    collect_frame_terms(
        lattice,
        posteriors,
        lattice.links().iter().filter(|l| l.word == word),
        time,
        &mut terms,
    );
    semiring.add(&terms)
}

fn collect_frame_terms<'a>(
    lattice: &Lattice,
    posteriors: &EdgePosteriors,
    candidates: impl Iterator<Item = &'a Link>,
    time: f64,
    terms: &mut Vec<f64>,
) {
    terms.clear();
    terms.extend(candidates.filter_map(|link| {
        let (start, end) = lattice.link_interval(link);
        if start <= time && time < end {
            posteriors.get(link.index)
        } else {
            None
        }
    }));
}

/// Rescore every link using the global settings.
pub fn rescore(
    lattice: &Lattice,
    posteriors: &EdgePosteriors,
    semiring: &dyn Semiring,
) -> Result<Rescored, LatticeError> {
    rescore_with(lattice, posteriors, semiring, &settings().rescore)
}

/// Rescore every link from time-frame word posteriors.
///
/// For each link the word posterior is evaluated at every frame the link
/// covers, the frame values are summed and divided by the frame count, and
/// the result is subtracted from one with plain arithmetic. Sub-frame links
/// follow `config.short_links`.
pub fn rescore_with(
    lattice: &Lattice,
    posteriors: &EdgePosteriors,
    semiring: &dyn Semiring,
    config: &RescoreSettings,
) -> Result<Rescored, LatticeError> {
    let links = lattice.links();
    let _span = debug_span!(
        "rescore",
        semiring = semiring.name(),
        link_count = links.len(),
        frame_width = config.frame_width
    )
    .entered();
    check_semiring(semiring, posteriors.semiring)?;
    let unsupported = || LatticeError::UnsupportedSemiring {
        semiring: semiring.name(),
        operation: "rescoring",
    };
    if semiring.invert(semiring.one()).is_none() {
        return Err(unsupported());
    }
    check_len("link posteriors", links.len(), posteriors.values.len())?;

    let mut by_word: HashMap<&str, Vec<&Link>> = HashMap::new();
    for link in links {
        by_word.entry(link.word.as_str()).or_default().push(link);
    }

    let mut frame_posteriors = Vec::new();
    let mut terms = Vec::new();
    let mut values = Vec::with_capacity(links.len());
    let mut short_links = 0usize;

    for link in links {
        let (start, end) = lattice.link_interval(link);
        let count = frame_count(start, end, config.frame_width);
        if !(count <= config.max_link_frames as f64) {
            return Err(LatticeError::TooManyFrames {
                link: link.index,
                frames: count,
                limit: config.max_link_frames,
            });
        }
        let mut frames = frame_times(start, end, config.frame_width);
        if frames.is_empty() {
            match config.short_links {
                ShortLinkPolicy::Reject => {
                    return Err(LatticeError::DegenerateInterval {
                        link: link.index,
                        duration: end - start,
                    });
                }
                ShortLinkPolicy::SingleFrame => {
                    short_links += 1;
                    frames.push(start);
                }
            }
        }

        let same_word = &by_word[link.word.as_str()];
        frame_posteriors.clear();
        for &time in &frames {
            collect_frame_terms(lattice, posteriors, same_word.iter().copied(), time, &mut terms);
            frame_posteriors.push(semiring.add(&terms));
        }
        let link_posterior = semiring.add(&frame_posteriors);

        let normalizer = semiring
            .invert(semiring.from_count(frames.len()))
            .ok_or_else(unsupported)?;
        let averaged = semiring.multiply(&[link_posterior, normalizer]);
        values.push(semiring.one() - averaged);
    }

    if short_links > 0 {
        warn!(
            short_links,
            frame_width = config.frame_width,
            "links shorter than one frame scored as a single frame"
        );
    }
    debug!(link_count = values.len());
    Ok(Rescored {
        semiring: semiring.name(),
        values,
    })
}
