//! bank — calibrated items and their usage statistics.
//!
//! Purpose
//! -------
//! Hold the item pool the engine draws from. Items are immutable after
//! calibration apart from their atomic usage counters, and are shared as
//! `Arc<Item>` between the engine, the selector and simulations.
//!
//! Key behaviors
//! -------------
//! - [`Item`] validates parameters and options once and exposes
//!   [`Item::record_administration`] and [`Item::difficulty_rating`].
//! - [`ItemBank`] indexes items by id and by skill and counts started
//!   sessions for exposure-rate control.
//!
//! Downstream usage
//! ----------------
//! - `session::engine` filters candidates with
//!   [`ItemBank::items_for_skill`] and bumps counters after each commit.
//! - `selection` reads [`ItemBank::exposure_rate`]-style statistics.

pub mod errors;
pub mod item;
pub mod item_bank;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{BankError, BankResult};
pub use self::item::{Item, ItemId};
pub use self::item_bank::{ItemBank, ItemDefinition, exposure_rate};
