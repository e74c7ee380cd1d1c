//! Application state for the xpack terminal front-end.
//!
//! The `App` owns a `WizardController` bound to the resident-registration
//! layout and translates terminal focus (which field or tile list receives
//! keys) into wizard interactions. Wizard callbacks cannot borrow the `App`,
//! so they report back through a channel drained on every tick, the same way
//! background work reports its results.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use xpack_core::utils::{format_currency, truncate_string};
use xpack_core::wizard::{
    ClickTarget, FieldKind, FieldRef, FieldSpec, FieldState, GroupRef, GroupState, KeyOutcome,
    OptionGroupSpec, OptionTileSpec, Page, StepLayout, StepState, Submission, WizardController,
    WizardKey, WizardLayout, WizardOptions,
};
use xpack_core::{FieldValue, WizardData};

// ============================================================================
// Constants
// ============================================================================

/// Root id of the registration wizard
pub const WIZARD_ID: &str = "wizard-resident";

/// Maximum length of a single-line field
const MAX_FIELD_LENGTH: usize = 80;

/// Maximum length of a multi-line field
const MAX_TEXTAREA_LENGTH: usize = 500;

/// Apartments offered by the picker: value, title, description
const APARTMENTS: [(&str, &str, &str); 8] = [
    ("a101", "A-101", "Torre Norte, 2 habitaciones"),
    ("a102", "A-102", "Torre Norte, 3 habitaciones"),
    ("a201", "A-201", "Torre Norte, penthouse"),
    ("b101", "B-101", "Torre Sur, 1 habitación"),
    ("b102", "B-102", "Torre Sur, 2 habitaciones"),
    ("b201", "B-201", "Torre Sur, 3 habitaciones"),
    ("c001", "C-001", "Local comercial"),
    ("c002", "C-002", "Local comercial, esquina"),
];

const PAYMENT_METHODS: [&str; 3] = ["Transferencia", "Efectivo", "Cheque"];

/// The resident-registration wizard
pub fn resident_layout() -> WizardLayout {
    let apartments = APARTMENTS
        .iter()
        .fold(OptionGroupSpec::new("apartment").required(), |group, (value, title, desc)| {
            group.tile(OptionTileSpec::new(value, title).with_description(desc))
        });

    WizardLayout::new(WIZARD_ID)
        .step(
            StepLayout::new("Datos del residente")
                .field(FieldSpec::text("name", "Nombre completo").required())
                .field(FieldSpec::text("id_number", "Cédula"))
                .field(FieldSpec::hidden("source", "terminal")),
        )
        .step(StepLayout::new("Apartamento").group(apartments))
        .step(
            StepLayout::new("Contacto")
                .field(FieldSpec::new(FieldKind::Tel, "phone", "Teléfono").required())
                .field(FieldSpec::new(FieldKind::Email, "email", "Correo electrónico"))
                .field(FieldSpec::checkbox("owner", "Es propietario")),
        )
        .step(
            StepLayout::new("Cuota")
                .field(FieldSpec::new(FieldKind::Number, "monthly_fee", "Cuota mensual").required())
                .field(FieldSpec::select("payment_method", "Forma de pago", &PAYMENT_METHODS))
                .field(FieldSpec::new(FieldKind::Date, "move_in", "Fecha de entrada"))
                .field(FieldSpec::textarea("notes", "Notas")),
        )
}

// ============================================================================
// UI State Types
// ============================================================================

/// Application state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// What receives keystrokes inside the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(FieldRef),
    Group(GroupRef),
}

/// A completed registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub submitted_at: DateTime<Utc>,
    pub payload: WizardData,
}

impl Registration {
    fn text(&self, key: &str) -> &str {
        self.payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.text("name")
    }

    pub fn apartment(&self) -> &str {
        self.text("apartment_label")
    }

    pub fn monthly_fee(&self) -> Option<f64> {
        self.text("monthly_fee").trim().parse().ok()
    }

    pub fn is_owner(&self) -> bool {
        self.payload
            .get("owner")
            .and_then(FieldValue::as_bool)
            .unwrap_or(false)
    }

    /// Pretty JSON of the submitted payload
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.payload).unwrap_or_default()
    }
}

/// Reported by wizard callbacks
enum WizardEvent {
    StepChanged(usize),
    Submitted(Registration),
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub state: AppState,
    pub wizard: WizardController,
    /// Explicit focus; `None` until the wizard's deferred focus lands
    pub focus: Option<Focus>,
    /// Highlighted tile of the focused option group
    pub tile_cursor: usize,
    pub search_query: String,
    pub status_message: Option<String>,
    pub registrations: Vec<Registration>,
    events_tx: Sender<WizardEvent>,
    events: Receiver<WizardEvent>,
}

/// A fresh controller bound to the registration page. Each opening gets its
/// own, so no field or tile state carries over from the previous resident.
fn build_wizard(tx: &Sender<WizardEvent>) -> WizardController {
    let step_tx = tx.clone();
    let submit_tx = tx.clone();

    let options = WizardOptions::new()
        .on_step_change(move |step, _data| {
            let _ = step_tx.send(WizardEvent::StepChanged(step));
        })
        .on_submit(move |event, data| {
            let mut payload = event.form.clone();
            payload.extend(data);
            let _ = submit_tx.send(WizardEvent::Submitted(Registration {
                submitted_at: event.submitted_at,
                payload,
            }));
        });

    let mut page = Page::new();
    page.bind(resident_layout());
    WizardController::new(&page, WIZARD_ID, options)
}

impl App {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        Self {
            state: AppState::Normal,
            wizard: build_wizard(&tx),
            focus: None,
            tile_cursor: 0,
            search_query: String::new(),
            status_message: None,
            registrations: Vec::new(),
            events_tx: tx,
            events: rx,
        }
    }

    // ===== Lifecycle =====

    pub fn open_wizard(&mut self) {
        if self.wizard.is_open() {
            return;
        }
        self.wizard = build_wizard(&self.events_tx);
        self.wizard.open();
        self.focus = None;
        self.tile_cursor = 0;
        self.search_query.clear();
        self.status_message = None;
        debug!("Registration wizard opened");
    }

    pub fn close_wizard(&mut self) {
        if self.wizard.handle_key(WizardKey::Escape, self.focused_field()) == KeyOutcome::Handled {
            self.state = AppState::Normal;
            self.status_message = Some("Registro cancelado".to_string());
        }
    }

    /// Land deferred focus and process wizard callbacks. Called from the
    /// event loop on every iteration.
    pub fn tick(&mut self, now: Instant) {
        if let Some(field) = self.wizard.poll_focus(now) {
            self.focus = Some(Focus::Field(field));
        }
        self.check_wizard_events();
    }

    pub fn check_wizard_events(&mut self) {
        let events: Vec<WizardEvent> = self.events.try_iter().collect();
        for event in events {
            match event {
                WizardEvent::StepChanged(step) => self.on_step_changed(step),
                WizardEvent::Submitted(registration) => self.record(registration),
            }
        }
    }

    fn on_step_changed(&mut self, step: usize) {
        self.state = AppState::Normal;
        self.search_query.clear();
        let group = GroupRef { step, group: 0 };
        if self.wizard.group(group).is_some() {
            self.wizard.filter_options(group, "");
        }
        self.tile_cursor = self
            .wizard
            .group(group)
            .and_then(GroupState::selected_index)
            .unwrap_or(0);
        debug!(step, "Step changed");
    }

    fn record(&mut self, registration: Registration) {
        info!(
            name = registration.name(),
            apartment = registration.apartment(),
            "Resident registered"
        );
        self.status_message = Some(format!(
            "Residente registrado: {} ({})",
            truncate_string(registration.name(), 30),
            registration.apartment()
        ));
        self.registrations.push(registration);
        self.wizard.close();
        self.focus = None;
    }

    // ===== Focus =====

    pub fn current_step(&self) -> Option<&StepState> {
        self.wizard.step(self.wizard.current_step())
    }

    /// Everything on the current step that can take focus, in order
    pub fn focus_targets(&self) -> Vec<Focus> {
        let step = self.wizard.current_step();
        let Some(state) = self.current_step() else {
            return Vec::new();
        };

        let fields = state
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.kind().is_focusable())
            .map(|(field, _)| Focus::Field(FieldRef { step, field }));
        let groups = (0..state.groups.len()).map(|group| Focus::Group(GroupRef { step, group }));
        fields.chain(groups).collect()
    }

    /// Focus on the current step. Stale focus from another step is ignored;
    /// a step without fields focuses its first option group.
    pub fn current_focus(&self) -> Option<Focus> {
        let step = self.wizard.current_step();
        match self.focus {
            Some(Focus::Field(f)) if f.step == step => self.focus,
            Some(Focus::Group(g)) if g.step == step => self.focus,
            _ => {
                let state = self.current_step()?;
                let has_fields = state.fields.iter().any(|f| f.kind().is_focusable());
                if !has_fields && !state.groups.is_empty() {
                    Some(Focus::Group(GroupRef { step, group: 0 }))
                } else {
                    None
                }
            }
        }
    }

    pub fn focused_field(&self) -> Option<FieldRef> {
        match self.current_focus() {
            Some(Focus::Field(f)) => Some(f),
            _ => None,
        }
    }

    fn focused_state(&self) -> Option<(FieldRef, &FieldState)> {
        let field = self.focused_field()?;
        self.wizard.field(field).map(|state| (field, state))
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        let targets = self.focus_targets();
        if targets.is_empty() {
            return;
        }
        let position = self
            .current_focus()
            .and_then(|f| targets.iter().position(|t| *t == f));
        let next = match (position, forward) {
            (None, true) => 0,
            (None, false) => targets.len() - 1,
            (Some(i), true) => (i + 1) % targets.len(),
            (Some(i), false) => (i + targets.len() - 1) % targets.len(),
        };
        self.set_focus(targets[next]);
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = Some(focus);
        self.wizard.set_focused(match focus {
            Focus::Field(f) => Some(f),
            Focus::Group(_) => None,
        });
    }

    // ===== Editing =====

    pub fn type_char(&mut self, c: char) {
        let Some((field, state)) = self.focused_state() else {
            return;
        };
        if !can_add_char(state.kind(), state.value.chars().count(), c) {
            return;
        }
        let mut value = state.value.clone();
        value.push(c);
        self.wizard.input(field, &value);
    }

    pub fn backspace(&mut self) {
        let Some((field, state)) = self.focused_state() else {
            return;
        };
        if !accepts_text(state.kind()) {
            return;
        }
        let mut value = state.value.clone();
        value.pop();
        self.wizard.input(field, &value);
    }

    /// Space: toggle a checkbox or select the highlighted tile
    pub fn toggle(&mut self) {
        match self.current_focus() {
            Some(Focus::Field(field)) => {
                let Some(state) = self.wizard.field(field) else { return };
                match state.kind() {
                    FieldKind::Checkbox => {
                        let checked = !state.checked;
                        self.wizard.set_checked(field, checked);
                    }
                    kind if accepts_text(kind) => self.type_char(' '),
                    _ => {}
                }
            }
            Some(Focus::Group(group)) => self.select_highlighted(group),
            None => {}
        }
    }

    /// Left/Right on a select field
    pub fn cycle_choice(&mut self, forward: bool) {
        let Some((field, state)) = self.focused_state() else {
            return;
        };
        if state.kind() != FieldKind::Select || state.spec.choices.is_empty() {
            return;
        }
        let choices = &state.spec.choices;
        let current = choices.iter().position(|c| *c == state.value).unwrap_or(0);
        let next = if forward {
            (current + 1) % choices.len()
        } else {
            (current + choices.len() - 1) % choices.len()
        };
        let value = choices[next].clone();
        self.wizard.input(field, &value);
    }

    // ===== Option tiles =====

    /// Indices of the tiles the current search leaves visible
    pub fn visible_tiles(&self, group: GroupRef) -> Vec<usize> {
        self.wizard
            .group(group)
            .map(|g| {
                g.tiles
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.visible)
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn move_tile_cursor(&mut self, down: bool) {
        let Some(Focus::Group(group)) = self.current_focus() else {
            return;
        };
        let visible = self.visible_tiles(group);
        if visible.is_empty() {
            return;
        }
        let position = visible.iter().position(|i| *i == self.tile_cursor);
        let next = match (position, down) {
            (None, _) => 0,
            (Some(i), true) => (i + 1).min(visible.len() - 1),
            (Some(i), false) => i.saturating_sub(1),
        };
        self.tile_cursor = visible[next];
    }

    fn select_highlighted(&mut self, group: GroupRef) {
        if self.visible_tiles(group).contains(&self.tile_cursor) {
            self.wizard.click(ClickTarget::Tile {
                group,
                tile: self.tile_cursor,
            });
        }
    }

    pub fn start_search(&mut self) {
        if matches!(self.current_focus(), Some(Focus::Group(_))) {
            self.state = AppState::Searching;
        }
    }

    pub fn end_search(&mut self) {
        self.state = AppState::Normal;
    }

    pub fn search_push(&mut self, c: char) {
        self.search_query.push(c);
        self.apply_search();
    }

    pub fn search_pop(&mut self) {
        self.search_query.pop();
        self.apply_search();
    }

    fn apply_search(&mut self) {
        let Some(Focus::Group(group)) = self.current_focus() else {
            return;
        };
        let visible = self.wizard.filter_options(group, &self.search_query);
        let tiles = self.visible_tiles(group);
        if !tiles.contains(&self.tile_cursor) {
            self.tile_cursor = tiles.first().copied().unwrap_or(0);
        }
        debug!(query = %self.search_query, visible, "Apartment search");
    }

    // ===== Navigation =====

    /// Enter: newline in a text area, submit on the last step, otherwise
    /// validate and advance.
    pub fn enter(&mut self) {
        if let Some((_, state)) = self.focused_state() {
            if state.kind().is_multiline() {
                self.type_char('\n');
                return;
            }
        }
        if self.wizard.is_last() {
            self.submit();
        } else {
            self.wizard.handle_key(WizardKey::Enter, self.focused_field());
        }
    }

    /// The back button
    pub fn back(&mut self) {
        self.wizard.click(ClickTarget::Back);
    }

    /// The next button; does nothing while the button is disabled
    pub fn forward(&mut self) {
        self.wizard.click(ClickTarget::Next);
    }

    /// The submit button
    pub fn submit(&mut self) {
        let complete = self.current_step().map(StepState::requirements_met).unwrap_or(false);
        if !complete {
            self.status_message = Some("Completa los campos requeridos".to_string());
            return;
        }

        match self.wizard.click(ClickTarget::Submit) {
            Some(Submission::Handled) => self.check_wizard_events(),
            Some(Submission::Form(values)) => self.record(Registration {
                submitted_at: Utc::now(),
                payload: values,
            }),
            Some(Submission::Ignored) | None => {
                warn!("Submit control had nothing to submit to");
            }
        }
    }

    // ===== Display helpers =====

    /// Monthly fee entered so far, formatted as currency
    pub fn fee_summary(&self) -> Option<String> {
        let step = self.wizard.current_step();
        let state = self.current_step()?;
        let index = state.fields.iter().position(|f| f.name() == Some("monthly_fee"))?;
        let field = self.wizard.field(FieldRef { step, field: index })?;
        let amount: f64 = field.value.trim().parse().ok()?;
        Some(format_currency(amount))
    }

    pub fn last_registration(&self) -> Option<&Registration> {
        self.registrations.last()
    }
}

fn accepts_text(kind: FieldKind) -> bool {
    !matches!(kind, FieldKind::Checkbox | FieldKind::Select | FieldKind::Hidden)
}

/// Check if a character may be typed into a field of `kind`
pub fn can_add_char(kind: FieldKind, current_len: usize, c: char) -> bool {
    let max = if kind.is_multiline() { MAX_TEXTAREA_LENGTH } else { MAX_FIELD_LENGTH };
    if current_len >= max || !accepts_text(kind) {
        return false;
    }
    match kind {
        FieldKind::Number => c.is_ascii_digit() || c == '.',
        FieldKind::Tel => c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'),
        FieldKind::Date => c.is_ascii_digit() || c == '-',
        FieldKind::Email => !c.is_whitespace() && !c.is_control(),
        FieldKind::TextArea => c == '\n' || !c.is_control(),
        _ => !c.is_control(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use xpack_core::wizard::FOCUS_DELAY;

    fn settle(app: &mut App) {
        app.tick(Instant::now() + FOCUS_DELAY + Duration::from_millis(10));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.type_char(c);
        }
    }

    fn opened() -> App {
        let mut app = App::new();
        app.open_wizard();
        settle(&mut app);
        app
    }

    /// Fill in every step up to the last one
    fn fill_to_last(app: &mut App) {
        type_str(app, "Ana Pérez");
        app.enter();
        settle(app);

        app.search_query.clear();
        app.tile_cursor = 3;
        app.toggle();
        app.enter();
        settle(app);

        type_str(app, "809-555-0101");
        app.cycle_focus(true);
        app.cycle_focus(true);
        app.toggle();
        app.enter();
        settle(app);
    }

    #[test]
    fn test_resident_layout_shape() {
        let layout = resident_layout();
        assert_eq!(layout.steps.len(), 4);
        assert_eq!(layout.steps[1].groups[0].tiles.len(), APARTMENTS.len());
        assert!(layout.overlay && layout.counter && layout.progress);
    }

    #[test]
    fn test_open_focuses_first_field_after_delay() {
        let mut app = App::new();
        app.open_wizard();
        assert!(app.wizard.is_open());
        assert_eq!(app.current_focus(), None);

        settle(&mut app);
        assert_eq!(app.current_focus(), Some(Focus::Field(FieldRef { step: 0, field: 0 })));
    }

    #[test]
    fn test_enter_validates_before_advancing() {
        let mut app = opened();
        app.enter();
        assert_eq!(app.wizard.current_step(), 0);

        type_str(&mut app, "Ana");
        app.enter();
        settle(&mut app);
        assert_eq!(app.wizard.current_step(), 1);
        assert_eq!(app.wizard.get_data("name"), Some(&FieldValue::from("Ana")));
        assert_eq!(app.wizard.get_data("source"), Some(&FieldValue::from("terminal")));
    }

    #[test]
    fn test_apartment_step_focuses_tiles() {
        let mut app = opened();
        type_str(&mut app, "Ana");
        app.enter();
        settle(&mut app);

        let group = GroupRef { step: 1, group: 0 };
        assert_eq!(app.current_focus(), Some(Focus::Group(group)));

        app.move_tile_cursor(true);
        app.toggle();
        assert_eq!(app.wizard.group(group).and_then(GroupState::selected_index), Some(1));
    }

    #[test]
    fn test_search_narrows_tiles() {
        let mut app = opened();
        type_str(&mut app, "Ana");
        app.enter();
        settle(&mut app);

        app.start_search();
        assert_eq!(app.state, AppState::Searching);
        for c in "sur".chars() {
            app.search_push(c);
        }
        let group = GroupRef { step: 1, group: 0 };
        assert_eq!(app.visible_tiles(group), vec![3, 4, 5]);
        assert_eq!(app.tile_cursor, 3);

        app.search_pop();
        app.search_pop();
        app.search_pop();
        assert_eq!(app.visible_tiles(group).len(), APARTMENTS.len());
    }

    #[test]
    fn test_field_input_is_filtered_by_kind() {
        assert!(can_add_char(FieldKind::Number, 0, '7'));
        assert!(!can_add_char(FieldKind::Number, 0, 'x'));
        assert!(can_add_char(FieldKind::Tel, 0, '+'));
        assert!(!can_add_char(FieldKind::Email, 0, ' '));
        assert!(can_add_char(FieldKind::TextArea, 0, '\n'));
        assert!(!can_add_char(FieldKind::Text, 0, '\n'));
        assert!(!can_add_char(FieldKind::Checkbox, 0, 'a'));
        assert!(!can_add_char(FieldKind::Text, MAX_FIELD_LENGTH, 'a'));
    }

    #[test]
    fn test_select_cycles_choices() {
        let mut app = opened();
        fill_to_last(&mut app);
        assert_eq!(app.wizard.current_step(), 3);

        let method = FieldRef { step: 3, field: 1 };
        app.cycle_focus(true);
        assert_eq!(app.focused_field(), Some(method));
        app.cycle_choice(true);
        assert_eq!(app.wizard.field(method).map(|f| f.value.as_str()), Some("Efectivo"));
        app.cycle_choice(false);
        app.cycle_choice(false);
        assert_eq!(app.wizard.field(method).map(|f| f.value.as_str()), Some("Cheque"));
    }

    #[test]
    fn test_submit_requires_last_step_complete() {
        let mut app = opened();
        fill_to_last(&mut app);

        app.enter();
        assert!(app.registrations.is_empty());
        assert!(app.wizard.is_open());
        assert_eq!(app.status_message.as_deref(), Some("Completa los campos requeridos"));
    }

    #[test]
    fn test_submit_records_registration() {
        let mut app = opened();
        fill_to_last(&mut app);

        type_str(&mut app, "1250.5");
        assert_eq!(app.fee_summary().as_deref(), Some("RD$ 1,250.50"));
        app.enter();

        assert_eq!(app.registrations.len(), 1);
        assert!(!app.wizard.is_open());

        let registration = app.last_registration().expect("registered");
        assert_eq!(registration.name(), "Ana Pérez");
        assert_eq!(registration.apartment(), "B-101");
        assert_eq!(registration.monthly_fee(), Some(1250.5));
        assert_eq!(registration.payload.get("owner"), Some(&FieldValue::Flag(true)));
        assert!(registration.is_owner());
        assert!(registration.to_json().contains("\"payment_method\": \"Transferencia\""));
        assert!(app
            .status_message
            .as_deref()
            .is_some_and(|m| m.contains("Ana Pérez")));
    }

    #[test]
    fn test_textarea_enter_inserts_newline() {
        let mut app = opened();
        fill_to_last(&mut app);

        let notes = FieldRef { step: 3, field: 3 };
        app.cycle_focus(false);
        assert_eq!(app.focused_field(), Some(notes));
        type_str(&mut app, "piso");
        app.enter();
        type_str(&mut app, "alto");

        assert_eq!(app.wizard.field(notes).map(|f| f.value.as_str()), Some("piso\nalto"));
        assert_eq!(app.wizard.current_step(), 3);
    }

    #[test]
    fn test_escape_closes_wizard() {
        let mut app = opened();
        app.close_wizard();
        assert!(!app.wizard.is_open());
        assert_eq!(app.status_message.as_deref(), Some("Registro cancelado"));
    }

    #[test]
    fn test_back_keeps_entered_values() {
        let mut app = opened();
        type_str(&mut app, "Ana");
        app.enter();
        settle(&mut app);

        app.back();
        settle(&mut app);
        assert_eq!(app.wizard.current_step(), 0);
        let name = app.wizard.field(FieldRef { step: 0, field: 0 }).map(|f| f.value.clone());
        assert_eq!(name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_reopen_after_registration_starts_blank() {
        let mut app = opened();
        fill_to_last(&mut app);
        type_str(&mut app, "900");
        app.enter();
        assert_eq!(app.registrations.len(), 1);

        app.open_wizard();
        settle(&mut app);
        assert_eq!(app.wizard.current_step(), 0);
        assert!(app.wizard.data().is_empty());
        let name = app.wizard.field(FieldRef { step: 0, field: 0 }).map(|f| f.value.clone());
        assert_eq!(name.as_deref(), Some(""));
        let apartment = GroupRef { step: 1, group: 0 };
        assert_eq!(app.wizard.group(apartment).and_then(GroupState::selected_index), None);

        // Enter on the blank form must not register the same resident again
        app.enter();
        assert_eq!(app.wizard.current_step(), 0);
        assert_eq!(app.registrations.len(), 1);
    }

    #[test]
    fn test_reopen_after_escape_starts_blank() {
        let mut app = opened();
        type_str(&mut app, "Ana");
        app.enter();
        settle(&mut app);
        app.toggle();
        app.close_wizard();
        assert!(!app.wizard.is_open());

        app.open_wizard();
        settle(&mut app);
        assert_eq!(app.wizard.current_step(), 0);
        assert_eq!(app.current_focus(), Some(Focus::Field(FieldRef { step: 0, field: 0 })));
        let name = app.wizard.field(FieldRef { step: 0, field: 0 }).map(|f| f.value.clone());
        assert_eq!(name.as_deref(), Some(""));
        let apartment = GroupRef { step: 1, group: 0 };
        assert_eq!(app.wizard.group(apartment).and_then(GroupState::selected_index), None);
    }

    #[test]
    fn test_owner_flag_defaults_to_false() {
        let mut payload = WizardData::new();
        payload.insert("name", "Ana");
        let registration = Registration { submitted_at: Utc::now(), payload };
        assert!(!registration.is_owner());

        let mut payload = WizardData::new();
        payload.insert("owner", FieldValue::Flag(true));
        assert!(Registration { submitted_at: Utc::now(), payload }.is_owner());
    }
}
