//! Calibrated test item with atomic usage counters.
//!
//! Purpose
//! -------
//! Represent one multiple-choice question: its immutable calibration and
//! content, plus the two usage counters the engine bumps after every
//! committed administration.
//!
//! Invariants & assumptions
//! ------------------------
//! - `params` passed [`ItemParams::validate`] at construction.
//! - `options` is non-empty and `correct_option < options.len()`.
//! - Counters are monotone; `times_correct ≤ times_administered` holds as long
//!   as callers only go through [`Item::record_administration`].
//!
//! Conventions
//! -----------
//! - Option indices are 0-based.
//! - Counters use `Relaxed` ordering: they are statistics, not
//!   synchronization points.
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::irt::{self, ItemParams, ParamError, ParamResult};

/// Stable identifier of an item in the bank.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// One calibrated multiple-choice item.
#[derive(Debug)]
pub struct Item {
    pub id: ItemId,
    pub skill_ref: String,
    pub params: ItemParams,
    pub options: Vec<String>,
    pub correct_option: usize,
    times_administered: AtomicU64,
    times_correct: AtomicU64,
}

impl Item {
    /// Construct a validated item with zeroed counters.
    ///
    /// # Errors
    /// - Any [`ParamError`] from the 3PL parameters.
    /// - [`ParamError::NoOptions`] for an empty option list.
    /// - [`ParamError::CorrectOptionOutOfRange`] if the key does not index
    ///   into `options`.
    pub fn new(
        id: ItemId, skill_ref: impl Into<String>, params: ItemParams, options: Vec<String>,
        correct_option: usize,
    ) -> ParamResult<Self> {
        params.validate()?;
        if options.is_empty() {
            return Err(ParamError::NoOptions);
        }
        if correct_option >= options.len() {
            return Err(ParamError::CorrectOptionOutOfRange {
                index: correct_option,
                n_options: options.len(),
            });
        }
        Ok(Self {
            id,
            skill_ref: skill_ref.into(),
            params,
            options,
            correct_option,
            times_administered: AtomicU64::new(0),
            times_correct: AtomicU64::new(0),
        })
    }

    pub fn n_options(&self) -> usize {
        self.options.len()
    }

    pub fn is_valid_option(&self, selected_option: usize) -> bool {
        selected_option < self.options.len()
    }

    pub fn is_correct(&self, selected_option: usize) -> bool {
        selected_option == self.correct_option
    }

    /// Fisher information of this item at `theta`.
    pub fn information(&self, theta: f64) -> f64 {
        irt::information(theta, &self.params)
    }

    /// Bump the usage counters for one committed administration.
    pub fn record_administration(&self, is_correct: bool) {
        self.times_administered.fetch_add(1, Ordering::Relaxed);
        if is_correct {
            self.times_correct.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn times_administered(&self) -> u64 {
        self.times_administered.load(Ordering::Relaxed)
    }

    pub fn times_correct(&self) -> u64 {
        self.times_correct.load(Ordering::Relaxed)
    }

    /// Observed percent correct, or `None` if the item was never administered.
    pub fn difficulty_rating(&self) -> Option<f64> {
        let administered = self.times_administered();
        if administered == 0 {
            return None;
        }
        Some(self.times_correct() as f64 / administered as f64 * 100.0)
    }
}
