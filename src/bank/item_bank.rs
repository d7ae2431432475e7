//! Item bank — calibrated items indexed by id and by skill.
//!
//! Purpose
//! -------
//! Own every [`Item`] behind an `Arc` so sessions, the selector and the
//! simulation can share them across threads, and keep the global
//! sessions-started counter used as the exposure-rate denominator.
//!
//! Key behaviors
//! -------------
//! - [`ItemBank::new`] rejects duplicate ids.
//! - [`ItemBank::items_for_skill`] returns items in ascending id order.
//! - [`ItemBank::from_toml_str`] loads `[[items]]` tables and validates each
//!   definition through [`Item::new`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The bank's membership never changes after construction; only the
//!   per-item counters and `sessions_started` move.
use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use serde::{Deserialize, Serialize};

use crate::{
    bank::{
        errors::{BankError, BankResult},
        item::{Item, ItemId},
    },
    irt::ItemParams,
};

/// Serialized form of one item, as read from a bank file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: u64,
    pub skill: String,
    pub discrimination: f64,
    pub difficulty: f64,
    #[serde(default)]
    pub guessing: f64,
    pub options: Vec<String>,
    pub correct_option: usize,
}

impl ItemDefinition {
    /// Validate into a live [`Item`].
    pub fn into_item(self) -> BankResult<Item> {
        let id = ItemId(self.id);
        let params = ItemParams {
            discrimination: self.discrimination,
            difficulty: self.difficulty,
            guessing: self.guessing,
        };
        Item::new(id, self.skill, params, self.options, self.correct_option)
            .map_err(|source| BankError::InvalidItem { id, source })
    }
}

#[derive(Debug, Deserialize)]
struct BankFile {
    #[serde(default)]
    items: Vec<ItemDefinition>,
}

#[derive(Debug, Default)]
pub struct ItemBank {
    items: HashMap<ItemId, Arc<Item>>,
    by_skill: HashMap<String, Vec<Arc<Item>>>,
    sessions_started: AtomicU64,
}

impl ItemBank {
    /// Build a bank from already-validated items.
    ///
    /// # Errors
    /// [`BankError::DuplicateItem`] if two items share an id.
    pub fn new(items: impl IntoIterator<Item = Item>) -> BankResult<Self> {
        let mut by_id: HashMap<ItemId, Arc<Item>> = HashMap::new();
        let mut by_skill: BTreeMap<String, Vec<Arc<Item>>> = BTreeMap::new();
        for item in items {
            let id = item.id;
            if by_id.contains_key(&id) {
                return Err(BankError::DuplicateItem { id });
            }
            let item = Arc::new(item);
            by_skill.entry(item.skill_ref.clone()).or_default().push(Arc::clone(&item));
            by_id.insert(id, item);
        }
        let by_skill = by_skill
            .into_iter()
            .map(|(skill, mut items)| {
                items.sort_by_key(|item| item.id);
                (skill, items)
            })
            .collect();
        Ok(Self { items: by_id, by_skill, sessions_started: AtomicU64::new(0) })
    }

    /// Parse a TOML document of `[[items]]` tables.
    ///
    /// # Errors
    /// - [`BankError::Parse`] for malformed TOML.
    /// - [`BankError::InvalidItem`] or [`BankError::DuplicateItem`] for bad
    ///   definitions.
    pub fn from_toml_str(contents: &str) -> BankResult<Self> {
        let file: BankFile =
            toml::from_str(contents).map_err(|e| BankError::Parse { text: e.to_string() })?;
        let items =
            file.items.into_iter().map(ItemDefinition::into_item).collect::<BankResult<Vec<_>>>()?;
        Self::new(items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&Arc<Item>> {
        self.items.get(&id)
    }

    /// Items calibrated for `skill_ref`, ascending by id. Empty for unknown
    /// skills.
    pub fn items_for_skill(&self, skill_ref: &str) -> &[Arc<Item>] {
        self.by_skill.get(skill_ref).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn skills(&self) -> impl Iterator<Item = &str> {
        self.by_skill.keys().map(String::as_str)
    }

    /// Count one more started session; returns the new total.
    pub fn record_session_start(&self) -> u64 {
        self.sessions_started.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn sessions_started(&self) -> u64 {
        self.sessions_started.load(Ordering::Relaxed)
    }

    /// Fraction of started sessions in which `item` was administered; `0.0`
    /// before any session started.
    pub fn exposure_rate(&self, item: &Item) -> f64 {
        exposure_rate(item.times_administered(), self.sessions_started())
    }
}

/// `administered / sessions_started`, or `0.0` when no session started yet.
pub fn exposure_rate(administered: u64, sessions_started: u64) -> f64 {
    if sessions_started == 0 { 0.0 } else { administered as f64 / sessions_started as f64 }
}
