//! Declarative wizard markup.
//!
//! A `WizardLayout` describes everything a `WizardController` binds to: the
//! steps in navigation order, their fields and option groups, and which
//! optional parts (overlay, progress dots, counter, controls, host form) exist.
//! Layouts are registered on a `Page` under their root id, the same way a
//! document exposes elements by id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Fields
// ============================================================================

/// Input kind of a wizard field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Tel,
    Number,
    Date,
    TextArea,
    Select,
    Checkbox,
    Hidden,
}

impl FieldKind {
    /// Multi-line fields keep Enter for themselves
    pub fn is_multiline(self) -> bool {
        matches!(self, FieldKind::TextArea)
    }

    /// Hidden fields never receive focus
    pub fn is_focusable(self) -> bool {
        !matches!(self, FieldKind::Hidden)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Data key. Unnamed fields are never collected.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Initial value (for checkboxes: the submitted value when checked)
    #[serde(default)]
    pub value: String,
    /// Initial checked state for checkboxes
    #[serde(default)]
    pub checked: bool,
    /// Choices offered by `Select` fields
    #[serde(default)]
    pub choices: Vec<String>,
}

impl FieldSpec {
    pub fn new(kind: FieldKind, name: &str, label: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            label: label.to_string(),
            kind,
            required: false,
            value: if kind == FieldKind::Checkbox { "on".to_string() } else { String::new() },
            checked: false,
            choices: Vec::new(),
        }
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::new(FieldKind::Text, name, label)
    }

    pub fn textarea(name: &str, label: &str) -> Self {
        Self::new(FieldKind::TextArea, name, label)
    }

    pub fn checkbox(name: &str, label: &str) -> Self {
        Self::new(FieldKind::Checkbox, name, label)
    }

    pub fn hidden(name: &str, value: &str) -> Self {
        Self::new(FieldKind::Hidden, name, "").with_value(value)
    }

    pub fn select(name: &str, label: &str, choices: &[&str]) -> Self {
        let mut spec = Self::new(FieldKind::Select, name, label);
        spec.choices = choices.iter().map(|c| c.to_string()).collect();
        spec.value = spec.choices.first().cloned().unwrap_or_default();
        spec
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn unnamed(mut self) -> Self {
        self.name = None;
        self
    }
}

// ============================================================================
// Option groups
// ============================================================================

/// One clickable tile of a single-select option group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionTileSpec {
    pub value: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl OptionTileSpec {
    pub fn new(value: &str, title: &str) -> Self {
        Self {
            value: value.to_string(),
            title: title.to_string(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Everything the tile shows, used by option search
    pub fn visible_text(&self) -> String {
        match &self.description {
            Some(desc) => format!("{} {}", self.title, desc),
            None => self.title.clone(),
        }
    }
}

/// Single-select group of tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionGroupSpec {
    /// Data key the selection is stored under
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub tiles: Vec<OptionTileSpec>,
}

impl OptionGroupSpec {
    pub fn new(key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            required: false,
            tiles: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn tile(mut self, tile: OptionTileSpec) -> Self {
        self.tiles.push(tile);
        self
    }
}

// ============================================================================
// Steps and wizard
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepLayout {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub groups: Vec<OptionGroupSpec>,
}

impl StepLayout {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn group(mut self, group: OptionGroupSpec) -> Self {
        self.groups.push(group);
        self
    }
}

/// Navigation controls present in the markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    #[serde(default)]
    pub back: bool,
    #[serde(default)]
    pub next: bool,
    #[serde(default)]
    pub submit: bool,
    #[serde(default)]
    pub close: bool,
}

impl Controls {
    pub fn all() -> Self {
        Self {
            back: true,
            next: true,
            submit: true,
            close: true,
        }
    }

    pub fn none() -> Self {
        Self {
            back: false,
            next: false,
            submit: false,
            close: false,
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardLayout {
    pub root_id: String,
    /// Wrapped in an overlay that can be opened and closed
    #[serde(default)]
    pub overlay: bool,
    /// Enclosed in a host form that can be submitted natively
    #[serde(default)]
    pub form: bool,
    /// One progress dot per step
    #[serde(default)]
    pub progress: bool,
    /// "Paso N de M" counter
    #[serde(default)]
    pub counter: bool,
    #[serde(default)]
    pub controls: Controls,
    #[serde(default)]
    pub steps: Vec<StepLayout>,
}

impl WizardLayout {
    /// A layout with every optional part present
    pub fn new(root_id: &str) -> Self {
        Self {
            root_id: root_id.to_string(),
            overlay: true,
            form: false,
            progress: true,
            counter: true,
            controls: Controls::all(),
            steps: Vec::new(),
        }
    }

    /// A bare layout: steps only, nothing optional
    pub fn bare(root_id: &str) -> Self {
        Self {
            root_id: root_id.to_string(),
            overlay: false,
            form: false,
            progress: false,
            counter: false,
            controls: Controls::none(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: StepLayout) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_form(mut self) -> Self {
        self.form = true;
        self
    }

    pub fn with_controls(mut self, controls: Controls) -> Self {
        self.controls = controls;
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// The host document: wizard layouts addressable by root id
#[derive(Debug, Clone, Default)]
pub struct Page {
    layouts: HashMap<String, WizardLayout>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layout, replacing any previous one with the same root id
    pub fn bind(&mut self, layout: WizardLayout) -> &mut Self {
        self.layouts.insert(layout.root_id.clone(), layout);
        self
    }

    pub fn layout(&self, root_id: &str) -> Option<&WizardLayout> {
        self.layouts.get(root_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkbox_defaults_to_on_value() {
        let spec = FieldSpec::checkbox("owner", "Propietario");
        assert_eq!(spec.value, "on");
        assert!(!spec.checked);
    }

    #[test]
    fn test_select_defaults_to_first_choice() {
        let spec = FieldSpec::select("tower", "Torre", &["Norte", "Sur"]);
        assert_eq!(spec.value, "Norte");

        let empty = FieldSpec::select("tower", "Torre", &[]);
        assert_eq!(empty.value, "");
    }

    #[test]
    fn test_visible_text_includes_description() {
        let tile = OptionTileSpec::new("a101", "A-101").with_description("Torre Norte");
        assert_eq!(tile.visible_text(), "A-101 Torre Norte");
        assert_eq!(OptionTileSpec::new("b", "B-2").visible_text(), "B-2");
    }

    #[test]
    fn test_layout_from_json() {
        let json = r#"{
            "root_id": "wizard-resident",
            "overlay": true,
            "counter": true,
            "steps": [
                {"title": "Nombre", "fields": [{"name": "name", "kind": "text", "required": true}]},
                {"title": "Apartamento", "groups": [{"key": "apartment", "required": true,
                    "tiles": [{"value": "a101", "title": "A-101"}]}]}
            ]
        }"#;

        let layout = WizardLayout::from_json(json).expect("Failed to parse layout JSON");
        assert_eq!(layout.steps.len(), 2);
        assert!(layout.overlay);
        assert!(!layout.progress);
        assert_eq!(layout.controls, Controls::all());
        assert!(layout.steps[0].fields[0].required);
        assert_eq!(layout.steps[1].groups[0].key.as_deref(), Some("apartment"));
    }

    #[test]
    fn test_page_lookup() {
        let mut page = Page::new();
        page.bind(WizardLayout::new("a")).bind(WizardLayout::bare("b"));
        assert!(page.layout("a").is_some());
        assert!(page.layout("b").is_some());
        assert!(page.layout("missing").is_none());
    }
}
