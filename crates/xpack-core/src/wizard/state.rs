//! Explicit state model for wizard steps.
//!
//! The controller never reads state back out of presentation markers. Field
//! values, checked flags, tile selection, tile visibility and invalid markers
//! all live here; rendering is a function of this state.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::utils::{contains_ignore_case, is_blank};

use super::layout::{FieldKind, FieldSpec, OptionGroupSpec, OptionTileSpec, StepLayout};
use super::styles;

// ============================================================================
// Collected data
// ============================================================================

/// A collected value: text for ordinary fields, a flag for checkboxes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Flag(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Flag(true) => f.write_str("sí"),
            FieldValue::Flag(false) => f.write_str("no"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Field name to value map accumulated across steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WizardData(BTreeMap<String, FieldValue>);

impl WizardData {
    pub const EMPTY: WizardData = WizardData(BTreeMap::new());

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// Overwrite entries with those of `other` (last write wins)
    pub fn extend(&mut self, other: &WizardData) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }
}

// ============================================================================
// Validation markers
// ============================================================================

/// Visual validation state of a field or option group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marker {
    pub invalid: bool,
    /// Start of the most recent shake animation
    pub shaken_at: Option<Instant>,
}

impl Marker {
    /// Mark invalid and restart the shake animation
    pub fn flag(&mut self, now: Instant) {
        self.invalid = true;
        self.shaken_at = Some(now);
    }

    pub fn clear(&mut self) {
        self.invalid = false;
    }

    /// Horizontal shake offset in pixels at `now` (0 when not shaking)
    pub fn shake_offset(&self, now: Instant) -> i16 {
        match self.shaken_at {
            Some(start) => styles::shake_offset(now.saturating_duration_since(start)),
            None => 0,
        }
    }
}

// ============================================================================
// Fields
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    pub spec: FieldSpec,
    pub value: String,
    pub checked: bool,
    pub marker: Marker,
}

impl FieldState {
    pub fn new(spec: FieldSpec) -> Self {
        Self {
            value: spec.value.clone(),
            checked: spec.checked,
            spec,
            marker: Marker::default(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.spec.name.as_deref()
    }

    pub fn kind(&self) -> FieldKind {
        self.spec.kind
    }

    /// Whether a required field would pass validation
    pub fn has_value(&self) -> bool {
        !is_blank(&self.value)
    }

    fn satisfied(&self) -> bool {
        !self.spec.required || self.has_value()
    }

    /// Value as stored in wizard data
    pub fn collected(&self) -> FieldValue {
        match self.spec.kind {
            FieldKind::Checkbox => FieldValue::Flag(self.checked),
            _ => FieldValue::Text(self.value.clone()),
        }
    }
}

// ============================================================================
// Option groups
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TileState {
    pub spec: OptionTileSpec,
    pub selected: bool,
    pub visible: bool,
}

/// Change notification raised by a tile selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionChange {
    pub key: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupState {
    pub spec: OptionGroupSpec,
    pub tiles: Vec<TileState>,
    pub marker: Marker,
    /// Hidden field mirroring the selection, created on first select
    pub hidden_input: Option<FieldState>,
}

impl GroupState {
    pub fn new(spec: OptionGroupSpec) -> Self {
        let tiles = spec
            .tiles
            .iter()
            .map(|tile| TileState {
                spec: tile.clone(),
                selected: false,
                visible: true,
            })
            .collect();
        Self {
            spec,
            tiles,
            marker: Marker::default(),
            hidden_input: None,
        }
    }

    pub fn selected(&self) -> Option<&TileState> {
        self.tiles.iter().find(|t| t.selected)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.tiles.iter().position(|t| t.selected)
    }

    fn satisfied(&self) -> bool {
        !self.spec.required || self.selected().is_some()
    }

    /// Single-select a tile: deselect siblings, select it, sync the hidden
    /// field named after the group key. Returns the change to dispatch, or
    /// `None` when the tile does not exist.
    pub fn select(&mut self, index: usize) -> Option<OptionChange> {
        if index >= self.tiles.len() {
            return None;
        }
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            tile.selected = i == index;
        }
        let value = self.tiles[index].spec.value.clone();

        if let Some(ref key) = self.spec.key {
            let input = self
                .hidden_input
                .get_or_insert_with(|| FieldState::new(FieldSpec::hidden(key, "")));
            input.value = value.clone();
        }

        Some(OptionChange {
            key: self.spec.key.clone(),
            value,
        })
    }

    /// Show only tiles whose visible text contains `query` (case-insensitive).
    /// Selection is untouched. Returns the number of visible tiles.
    pub fn filter(&mut self, query: &str) -> usize {
        let mut shown = 0;
        for tile in &mut self.tiles {
            tile.visible = contains_ignore_case(&tile.spec.visible_text(), query);
            if tile.visible {
                shown += 1;
            }
        }
        shown
    }
}

// ============================================================================
// Steps
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StepState {
    pub title: String,
    pub fields: Vec<FieldState>,
    pub groups: Vec<GroupState>,
}

impl StepState {
    pub fn new(layout: &StepLayout) -> Self {
        Self {
            title: layout.title.clone(),
            fields: layout.fields.iter().cloned().map(FieldState::new).collect(),
            groups: layout.groups.iter().cloned().map(GroupState::new).collect(),
        }
    }

    /// Non-destructive check used for next-button enablement
    pub fn requirements_met(&self) -> bool {
        self.fields.iter().all(FieldState::satisfied) && self.groups.iter().all(GroupState::satisfied)
    }

    /// Full validation: marks failing fields and groups invalid and shakes
    /// them, clears the marker on passing ones.
    pub fn validate(&mut self, now: Instant) -> bool {
        let mut valid = true;

        for field in self.fields.iter_mut().filter(|f| f.spec.required) {
            if field.has_value() {
                field.marker.clear();
            } else {
                field.marker.flag(now);
                valid = false;
            }
        }

        for group in self.groups.iter_mut().filter(|g| g.spec.required) {
            if group.selected().is_some() {
                group.marker.clear();
            } else {
                group.marker.flag(now);
                valid = false;
            }
        }

        valid
    }

    /// Store every named field, then every selected option, into `data`
    pub fn collect_into(&self, data: &mut WizardData) {
        let named = self
            .fields
            .iter()
            .chain(self.groups.iter().filter_map(|g| g.hidden_input.as_ref()));
        for field in named {
            if let Some(name) = field.name() {
                data.insert(name, field.collected());
            }
        }

        for group in &self.groups {
            let (Some(key), Some(tile)) = (group.spec.key.as_deref(), group.selected()) else {
                continue;
            };
            data.insert(key, tile.spec.value.as_str());
            data.insert(format!("{}_label", key), tile.spec.title.as_str());
        }
    }

    /// Index of the first field that can take focus
    pub fn first_focusable(&self) -> Option<usize> {
        self.fields.iter().position(|f| f.kind().is_focusable())
    }
}
