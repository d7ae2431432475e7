//! Maximum-information item selection with exposure control.
//!
//! Purpose
//! -------
//! Pick the next item for a session given its current θ and the candidate
//! set (unanswered items of the session's skill).
//!
//! Key behaviors
//! -------------
//! - Candidates are ranked by Fisher information at θ, descending, with ties
//!   broken by the lowest [`ItemId`]. The ranking is total, so the baseline
//!   choice is deterministic.
//! - Scoring switches to `rayon` once the pool reaches
//!   [`PARALLEL_SCORING_THRESHOLD`] items; results are identical either way.
//! - [`ItemSelector`] applies the configured [`ExposureControl`] on top of the
//!   ranking. Randomesque draws come from one `Pcg64` stream behind a mutex,
//!   so a seeded selector replays the same sequence of choices.
//!
//! Invariants & assumptions
//! ------------------------
//! - Empty candidates → `None`; the engine reports that as bank exhaustion.
//! - A returned item is always an element of `candidates`.
use std::{
    cmp::Ordering,
    sync::{Arc, Mutex, PoisonError},
};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rayon::prelude::*;

use crate::{
    bank::{Item, ItemId, exposure_rate},
    selection::exposure::ExposureControl,
};

/// Pool size from which candidate scoring runs in parallel.
pub const PARALLEL_SCORING_THRESHOLD: usize = 512;

#[derive(Debug, Clone, Copy)]
struct Scored {
    index: usize,
    id: ItemId,
    info: f64,
}

fn scored(index: usize, theta: f64, item: &Item) -> Scored {
    let info = item.information(theta);
    Scored { index, id: item.id, info: if info.is_nan() { f64::NEG_INFINITY } else { info } }
}

/// Higher information first, then lower id.
fn by_rank(lhs: &Scored, rhs: &Scored) -> Ordering {
    rhs.info.total_cmp(&lhs.info).then_with(|| lhs.id.cmp(&rhs.id))
}

fn score_all(theta: f64, candidates: &[Arc<Item>]) -> Vec<Scored> {
    if candidates.len() >= PARALLEL_SCORING_THRESHOLD {
        candidates.par_iter().enumerate().map(|(i, item)| scored(i, theta, item)).collect()
    } else {
        candidates.iter().enumerate().map(|(i, item)| scored(i, theta, item)).collect()
    }
}

/// Candidate indices ordered by [`by_rank`].
pub fn rank_candidates(theta: f64, candidates: &[Arc<Item>]) -> Vec<usize> {
    let mut scores = score_all(theta, candidates);
    scores.sort_unstable_by(by_rank);
    scores.into_iter().map(|s| s.index).collect()
}

/// The most informative candidate at `theta`, lowest id on ties.
pub fn select_max_information(theta: f64, candidates: &[Arc<Item>]) -> Option<&Arc<Item>> {
    score_all(theta, candidates).into_iter().min_by(by_rank).map(|best| &candidates[best.index])
}

/// Stateful selector applying an exposure-control policy.
#[derive(Debug)]
pub struct ItemSelector {
    policy: ExposureControl,
    rng: Mutex<Pcg64>,
}

impl ItemSelector {
    /// Build a selector; `seed = None` draws the generator state from the OS.
    pub fn new(policy: ExposureControl, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_os_rng(),
        };
        Self { policy, rng: Mutex::new(rng) }
    }

    pub fn policy(&self) -> ExposureControl {
        self.policy
    }

    /// Choose the next item among `candidates` at ability `theta`.
    ///
    /// `sessions_started` is the exposure-rate denominator and only matters
    /// for [`ExposureControl::MaxExposureRate`].
    pub fn select<'a>(
        &self, theta: f64, candidates: &'a [Arc<Item>], sessions_started: u64,
    ) -> Option<&'a Arc<Item>> {
        if candidates.is_empty() {
            return None;
        }
        match self.policy {
            ExposureControl::MaxInformation => select_max_information(theta, candidates),
            ExposureControl::Randomesque { top_k } => {
                let ranked = rank_candidates(theta, candidates);
                let k = top_k.clamp(1, ranked.len());
                let pick = {
                    let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                    rng.random_range(0..k)
                };
                Some(&candidates[ranked[pick]])
            }
            ExposureControl::MaxExposureRate { max_rate } => {
                let eligible: Vec<Arc<Item>> = candidates
                    .iter()
                    .filter(|item| {
                        exposure_rate(item.times_administered(), sessions_started) < max_rate
                    })
                    .cloned()
                    .collect();
                if eligible.is_empty() {
                    return select_max_information(theta, candidates);
                }
                let chosen = select_max_information(theta, &eligible)?.id;
                candidates.iter().find(|item| item.id == chosen)
            }
        }
    }
}

impl Default for ItemSelector {
    fn default() -> Self {
        Self::new(ExposureControl::default(), None)
    }
}
