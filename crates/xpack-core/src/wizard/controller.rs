//! The wizard controller.
//!
//! `WizardController` drives one linear sequence of steps: it gates forward
//! navigation on validation, accumulates field data step by step, and keeps a
//! `ViewState` in sync after every navigation. It owns no I/O; the host feeds
//! it user interactions and renders its state.
//!
//! Callback contract:
//! - `next()` and `prev()` fire `on_step_change` after re-rendering.
//! - `go_to()` does NOT fire `on_step_change`. Programmatic jumps are treated
//!   as host-initiated and the host already knows the new step.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::focus::{FieldRef, FocusScheduler};
use super::layout::{Page, WizardLayout};
use super::state::{FieldState, FieldValue, GroupState, StepState, WizardData};
use super::view::{ViewFeatures, ViewState};

// ============================================================================
// Options and events
// ============================================================================

pub type StepChangeHook = Box<dyn FnMut(usize, &WizardData)>;
/// Returning `false` cancels the navigation
pub type BeforeNextHook = Box<dyn FnMut(usize, &WizardData) -> bool>;
pub type SubmitHook = Box<dyn FnMut(&SubmitEvent, &WizardData)>;

/// Callbacks recognised by the controller. All optional.
#[derive(Default)]
pub struct WizardOptions {
    on_step_change: Option<StepChangeHook>,
    on_before_next: Option<BeforeNextHook>,
    on_submit: Option<SubmitHook>,
}

impl WizardOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_step_change(mut self, hook: impl FnMut(usize, &WizardData) + 'static) -> Self {
        self.on_step_change = Some(Box::new(hook));
        self
    }

    pub fn on_before_next(mut self, hook: impl FnMut(usize, &WizardData) -> bool + 'static) -> Self {
        self.on_before_next = Some(Box::new(hook));
        self
    }

    pub fn on_submit(mut self, hook: impl FnMut(&SubmitEvent, &WizardData) + 'static) -> Self {
        self.on_submit = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for WizardOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardOptions")
            .field("on_step_change", &self.on_step_change.is_some())
            .field("on_before_next", &self.on_before_next.is_some())
            .field("on_submit", &self.on_submit.is_some())
            .finish()
    }
}

/// Passed to `on_submit`
#[derive(Debug, Clone)]
pub struct SubmitEvent {
    pub step: usize,
    pub submitted_at: DateTime<Utc>,
    /// Every named field of every step, as a native form post would send it
    pub form: WizardData,
}

/// What the submit control did
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// `on_submit` handled it
    Handled,
    /// No callback; the host should post its form with these values
    Form(WizardData),
    /// Nothing to submit to
    Ignored,
}

/// Keys the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardKey {
    Escape,
    Enter,
}

/// Whether the host should suppress the key's default action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

/// Element under a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The overlay itself, outside the wizard content
    Backdrop,
    /// Anywhere inside the wizard content without a dedicated action
    Content,
    Close,
    Back,
    Next,
    Submit,
    Tile { group: GroupRef, tile: usize },
}

/// An option group of a specific step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupRef {
    pub step: usize,
    pub group: usize,
}

// ============================================================================
// Controller
// ============================================================================

/// State of a controller bound to a layout
struct Wizard {
    features: ViewFeatures,
    has_overlay: bool,
    has_form: bool,
    steps: Vec<StepState>,
    current_step: usize,
    data: WizardData,
    view: ViewState,
    overlay_active: bool,
    scroll_locked: bool,
    focus: FocusScheduler,
    focused: Option<FieldRef>,
    options: WizardOptions,
}

static EMPTY_DATA: WizardData = WizardData::EMPTY;

pub struct WizardController {
    /// `None` when the root id was not found: every method is a no-op
    wizard: Option<Wizard>,
}

impl WizardController {
    /// Bind to the layout registered under `root_id`. An unknown id yields an
    /// inert controller.
    pub fn new(page: &Page, root_id: &str, options: WizardOptions) -> Self {
        match page.layout(root_id) {
            Some(layout) => Self::from_layout(layout, options),
            None => {
                debug!(root_id, "Wizard root not found, controller is inert");
                Self { wizard: None }
            }
        }
    }

    pub fn from_layout(layout: &WizardLayout, options: WizardOptions) -> Self {
        let steps: Vec<StepState> = layout.steps.iter().map(StepState::new).collect();
        let features = ViewFeatures::from(layout);
        let mut wizard = Wizard {
            features,
            has_overlay: layout.overlay,
            has_form: layout.form,
            view: ViewState::compute(0, steps.len(), features),
            steps,
            current_step: 0,
            data: WizardData::new(),
            overlay_active: false,
            scroll_locked: false,
            focus: FocusScheduler::new(),
            focused: None,
            options,
        };
        wizard.update_view(Instant::now());
        debug!(root_id = %layout.root_id, steps = wizard.steps.len(), "Wizard bound");
        Self { wizard: Some(wizard) }
    }

    /// Whether the controller found its layout
    pub fn is_bound(&self) -> bool {
        self.wizard.is_some()
    }

    // ===== Navigation =====

    /// Validate the current step and advance.
    pub fn next(&mut self) {
        let Some(w) = self.wizard.as_mut() else { return };
        if w.is_last() {
            return;
        }

        let now = Instant::now();
        let current = w.current_step;
        if !w.steps[current].validate(now) {
            return;
        }

        if let Some(hook) = w.options.on_before_next.as_mut() {
            if !hook(current, &w.data) {
                debug!(step = current, "Advance cancelled by on_before_next");
                return;
            }
        }

        w.steps[current].collect_into(&mut w.data);
        w.current_step += 1;
        w.update_view(now);
        debug!(step = w.current_step, "Wizard advanced");

        if let Some(hook) = w.options.on_step_change.as_mut() {
            hook(w.current_step, &w.data);
        }
    }

    /// Go back one step. Nothing is validated or collected.
    pub fn prev(&mut self) {
        let Some(w) = self.wizard.as_mut() else { return };
        if w.current_step == 0 {
            return;
        }

        w.current_step -= 1;
        w.update_view(Instant::now());
        debug!(step = w.current_step, "Wizard went back");

        if let Some(hook) = w.options.on_step_change.as_mut() {
            hook(w.current_step, &w.data);
        }
    }

    /// Jump to `step` without validating. Does not fire `on_step_change`.
    pub fn go_to(&mut self, step: usize) {
        let Some(w) = self.wizard.as_mut() else { return };
        if step >= w.steps.len() {
            return;
        }
        w.current_step = step;
        w.update_view(Instant::now());
    }

    // ===== Lifecycle =====

    /// Show the overlay, lock background scroll and start over.
    pub fn open(&mut self) {
        let Some(w) = self.wizard.as_mut() else { return };
        if w.has_overlay {
            w.overlay_active = true;
            w.scroll_locked = true;
        }
        self.reset();

        if let Some(w) = self.wizard.as_mut() {
            let target = w.first_focusable(0);
            w.focus.schedule(target, Instant::now());
        }
    }

    /// Hide the overlay. Data is kept until the next reset.
    pub fn close(&mut self) {
        let Some(w) = self.wizard.as_mut() else { return };
        if w.has_overlay {
            w.overlay_active = false;
            w.scroll_locked = false;
        }
    }

    pub fn reset(&mut self) {
        let Some(w) = self.wizard.as_mut() else { return };
        w.current_step = 0;
        w.data.clear();
        w.update_view(Instant::now());
    }

    /// Action of the submit control
    pub fn submit(&mut self) -> Submission {
        let Some(w) = self.wizard.as_mut() else {
            return Submission::Ignored;
        };

        if w.options.on_submit.is_some() {
            let event = SubmitEvent {
                step: w.current_step,
                submitted_at: Utc::now(),
                form: w.form_values(),
            };
            if let Some(hook) = w.options.on_submit.as_mut() {
                hook(&event, &w.data);
            }
            Submission::Handled
        } else if w.has_form {
            Submission::Form(w.form_values())
        } else {
            Submission::Ignored
        }
    }

    // ===== Data =====

    pub fn set_data(&mut self, key: &str, value: impl Into<FieldValue>) {
        if let Some(w) = self.wizard.as_mut() {
            w.data.insert(key, value);
        }
    }

    pub fn get_data(&self, key: &str) -> Option<&FieldValue> {
        self.wizard.as_ref().and_then(|w| w.data.get(key))
    }

    pub fn data(&self) -> &WizardData {
        self.wizard.as_ref().map(|w| &w.data).unwrap_or(&EMPTY_DATA)
    }

    // ===== Interaction =====

    /// Text typed into a field (an `input` event)
    pub fn input(&mut self, field: FieldRef, value: &str) {
        let Some(w) = self.wizard.as_mut() else { return };
        let Some(state) = w.field_mut(field) else { return };
        state.value = value.to_string();
        w.update_next_button();
    }

    /// Checkbox toggled (a `change` event)
    pub fn set_checked(&mut self, field: FieldRef, checked: bool) {
        let Some(w) = self.wizard.as_mut() else { return };
        let Some(state) = w.field_mut(field) else { return };
        state.checked = checked;
        w.update_next_button();
    }

    /// Single-select a tile of an option group and notify listeners
    pub fn select_option(&mut self, group: GroupRef, tile: usize) {
        let Some(w) = self.wizard.as_mut() else { return };
        let Some(state) = w.group_mut(group) else { return };
        if let Some(change) = state.select(tile) {
            debug!(key = ?change.key, value = %change.value, "Option selected");
            w.update_next_button();
        }
    }

    /// Filter a group's tiles by `query`. Returns the number left visible.
    pub fn filter_options(&mut self, group: GroupRef, query: &str) -> usize {
        self.wizard
            .as_mut()
            .and_then(|w| w.group_mut(group))
            .map(|state| state.filter(query))
            .unwrap_or(0)
    }

    /// Keyboard handling. `target` is the focused field, if any.
    pub fn handle_key(&mut self, key: WizardKey, target: Option<FieldRef>) -> KeyOutcome {
        let Some(w) = self.wizard.as_ref() else {
            return KeyOutcome::Ignored;
        };

        match key {
            WizardKey::Escape => {
                if w.has_overlay && w.overlay_active {
                    self.close();
                    KeyOutcome::Handled
                } else {
                    KeyOutcome::Ignored
                }
            }
            WizardKey::Enter => {
                let multiline = target
                    .and_then(|t| w.field(t))
                    .map(|f| f.kind().is_multiline())
                    .unwrap_or(false);
                if multiline {
                    return KeyOutcome::Ignored;
                }
                if !w.is_last() {
                    self.next();
                }
                KeyOutcome::Handled
            }
        }
    }

    /// Mouse/touch activation of an element. Returns the submission when
    /// the submit control was activated.
    pub fn click(&mut self, target: ClickTarget) -> Option<Submission> {
        let w = self.wizard.as_ref()?;
        let controls = w.features.controls;

        match target {
            ClickTarget::Backdrop if w.has_overlay => self.close(),
            ClickTarget::Close if controls.close => self.close(),
            ClickTarget::Back if w.view.back_visible => self.prev(),
            ClickTarget::Next if w.view.next_visible && w.view.next_enabled => self.next(),
            ClickTarget::Submit if w.view.submit_visible => return Some(self.submit()),
            ClickTarget::Tile { group, tile } => self.select_option(group, tile),
            _ => {}
        }
        None
    }

    /// Take the deferred focus if it is due. The host should move input
    /// focus to the returned field.
    pub fn poll_focus(&mut self, now: Instant) -> Option<FieldRef> {
        let w = self.wizard.as_mut()?;
        let target = w.focus.poll(now)?;
        w.focused = Some(target);
        Some(target)
    }

    /// Focus moved by the host (e.g. Tab)
    pub fn set_focused(&mut self, field: Option<FieldRef>) {
        if let Some(w) = self.wizard.as_mut() {
            w.focused = field;
        }
    }

    // ===== Accessors =====

    pub fn current_step(&self) -> usize {
        self.wizard.as_ref().map(|w| w.current_step).unwrap_or(0)
    }

    pub fn total_steps(&self) -> usize {
        self.wizard.as_ref().map(|w| w.steps.len()).unwrap_or(0)
    }

    pub fn is_first(&self) -> bool {
        self.current_step() == 0
    }

    pub fn is_last(&self) -> bool {
        self.wizard.as_ref().map(Wizard::is_last).unwrap_or(true)
    }

    pub fn is_open(&self) -> bool {
        self.wizard.as_ref().map(|w| w.overlay_active).unwrap_or(false)
    }

    pub fn scroll_locked(&self) -> bool {
        self.wizard.as_ref().map(|w| w.scroll_locked).unwrap_or(false)
    }

    pub fn view(&self) -> Option<&ViewState> {
        self.wizard.as_ref().map(|w| &w.view)
    }

    pub fn step(&self, index: usize) -> Option<&StepState> {
        self.wizard.as_ref().and_then(|w| w.steps.get(index))
    }

    pub fn field(&self, field: FieldRef) -> Option<&FieldState> {
        self.wizard.as_ref().and_then(|w| w.field(field))
    }

    pub fn group(&self, group: GroupRef) -> Option<&GroupState> {
        self.wizard
            .as_ref()
            .and_then(|w| w.steps.get(group.step))
            .and_then(|s| s.groups.get(group.group))
    }

    pub fn focused(&self) -> Option<FieldRef> {
        self.wizard.as_ref().and_then(|w| w.focused)
    }
}

impl Wizard {
    fn is_last(&self) -> bool {
        self.current_step + 1 >= self.steps.len()
    }

    fn field(&self, field: FieldRef) -> Option<&FieldState> {
        self.steps.get(field.step).and_then(|s| s.fields.get(field.field))
    }

    fn field_mut(&mut self, field: FieldRef) -> Option<&mut FieldState> {
        self.steps.get_mut(field.step).and_then(|s| s.fields.get_mut(field.field))
    }

    fn group_mut(&mut self, group: GroupRef) -> Option<&mut GroupState> {
        self.steps.get_mut(group.step).and_then(|s| s.groups.get_mut(group.group))
    }

    fn first_focusable(&self, step: usize) -> Option<FieldRef> {
        self.steps
            .get(step)
            .and_then(StepState::first_focusable)
            .map(|field| FieldRef { step, field })
    }

    /// Recompute the view, re-evaluate the next button and schedule focus
    /// for the current step (cancelling any stale focus).
    fn update_view(&mut self, now: Instant) {
        self.view = ViewState::compute(self.current_step, self.steps.len(), self.features);
        self.update_next_button();
        let target = self.first_focusable(self.current_step);
        self.focus.schedule(target, now);
    }

    fn update_next_button(&mut self) {
        self.view.next_enabled = self.features.controls.next
            && self
                .steps
                .get(self.current_step)
                .map(StepState::requirements_met)
                .unwrap_or(false);
    }

    fn form_values(&self) -> WizardData {
        let mut form = WizardData::new();
        for step in &self.steps {
            step.collect_into(&mut form);
        }
        form
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::wizard::focus::FOCUS_DELAY;
    use crate::wizard::layout::{FieldSpec, OptionGroupSpec, OptionTileSpec, StepLayout};
    use crate::wizard::view::{ProgressStatus, StepStatus};

    const NAME: FieldRef = FieldRef { step: 0, field: 0 };
    const APARTMENT: GroupRef = GroupRef { step: 1, group: 0 };

    fn resident_layout() -> WizardLayout {
        WizardLayout::new("wizard-resident")
            .step(StepLayout::new("Nombre").field(FieldSpec::text("name", "Nombre").required()))
            .step(
                StepLayout::new("Apartamento").group(
                    OptionGroupSpec::new("apartment")
                        .required()
                        .tile(OptionTileSpec::new("a101", "A-101"))
                        .tile(OptionTileSpec::new("b202", "B-202")),
                ),
            )
            .step(
                StepLayout::new("Contacto")
                    .field(FieldSpec::text("phone", "Teléfono"))
                    .field(FieldSpec::checkbox("owner", "Propietario"))
                    .field(FieldSpec::textarea("notes", "Notas")),
            )
    }

    fn controller() -> WizardController {
        WizardController::from_layout(&resident_layout(), WizardOptions::new())
    }

    fn complete_first_two(wizard: &mut WizardController) {
        wizard.input(NAME, "Ana");
        wizard.next();
        wizard.select_option(APARTMENT, 0);
        wizard.next();
    }

    #[test]
    fn test_next_advances_and_collects() {
        let mut wizard = controller();
        wizard.input(NAME, "Ana");
        wizard.next();

        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.get_data("name"), Some(&FieldValue::from("Ana")));
    }

    #[test]
    fn test_next_blocked_by_blank_required_field() {
        let mut wizard = controller();
        wizard.next();

        assert_eq!(wizard.current_step(), 0);
        assert!(wizard.field(NAME).expect("field exists").marker.invalid);
        assert!(wizard.data().is_empty());
    }

    #[test]
    fn test_unchecked_required_checkbox_does_not_block() {
        let layout = WizardLayout::new("wizard-rules")
            .step(StepLayout::new("Reglas").field(FieldSpec::checkbox("accept", "Acepto").required()))
            .step(StepLayout::new("Listo"));
        let mut wizard = WizardController::from_layout(&layout, WizardOptions::new());
        wizard.next();

        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.get_data("accept"), Some(&FieldValue::Flag(false)));
    }

    #[test]
    fn test_next_blocked_by_missing_required_option() {
        let mut wizard = controller();
        wizard.input(NAME, "Ana");
        wizard.next();
        wizard.next();

        assert_eq!(wizard.current_step(), 1);
        assert!(wizard.group(APARTMENT).expect("group exists").marker.invalid);
    }

    #[test]
    fn test_boundary_navigation_is_noop() {
        let mut wizard = controller();
        wizard.prev();
        assert_eq!(wizard.current_step(), 0);

        complete_first_two(&mut wizard);
        assert!(wizard.is_last());
        let before = wizard.data().clone();
        wizard.next();
        assert_eq!(wizard.current_step(), 2);
        assert_eq!(wizard.data(), &before, "next on last step collects nothing");
    }

    #[test]
    fn test_before_next_false_aborts_without_collecting() {
        let options = WizardOptions::new().on_before_next(|_, _| false);
        let mut wizard = WizardController::from_layout(&resident_layout(), options);
        wizard.input(NAME, "Ana");
        wizard.next();

        assert_eq!(wizard.current_step(), 0);
        assert!(wizard.get_data("name").is_none());
    }

    #[test]
    fn test_step_change_fires_on_next_and_prev_but_not_go_to() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&calls);
        let options = WizardOptions::new().on_step_change(move |step, data| {
            seen.borrow_mut().push((step, data.len()));
        });
        let mut wizard = WizardController::from_layout(&resident_layout(), options);

        wizard.input(NAME, "Ana");
        wizard.next();
        wizard.prev();
        wizard.go_to(2);

        assert_eq!(*calls.borrow(), vec![(1, 1), (0, 1)]);
        assert_eq!(wizard.current_step(), 2);
    }

    #[test]
    fn test_prev_keeps_data_and_skips_validation() {
        let mut wizard = controller();
        complete_first_two(&mut wizard);
        wizard.prev();
        wizard.prev();

        assert_eq!(wizard.current_step(), 0);
        assert_eq!(wizard.get_data("name"), Some(&FieldValue::from("Ana")));
        assert_eq!(wizard.get_data("apartment"), Some(&FieldValue::from("a101")));
    }

    #[test]
    fn test_go_to_range_and_data() {
        let mut wizard = controller();
        wizard.set_data("unit_id", "7");

        wizard.go_to(2);
        assert_eq!(wizard.current_step(), 2);
        wizard.go_to(3);
        assert_eq!(wizard.current_step(), 2);
        assert_eq!(wizard.data().len(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut wizard = controller();
        complete_first_two(&mut wizard);
        wizard.set_data("extra", true);

        wizard.reset();
        assert_eq!(wizard.current_step(), 0);
        assert!(wizard.data().is_empty());
        assert_eq!(wizard.view().expect("bound").counter.as_deref(), Some("Paso 1 de 3"));
    }

    #[test]
    fn test_option_reselect_updates_value_and_label() {
        let mut wizard = controller();
        wizard.input(NAME, "Ana");
        wizard.next();
        wizard.select_option(APARTMENT, 0);
        wizard.select_option(APARTMENT, 1);
        wizard.next();

        let group = wizard.group(APARTMENT).expect("group exists");
        assert_eq!(group.selected_index(), Some(1));
        assert_eq!(group.tiles.iter().filter(|t| t.selected).count(), 1);
        assert_eq!(wizard.get_data("apartment"), Some(&FieldValue::from("b202")));
        assert_eq!(wizard.get_data("apartment_label"), Some(&FieldValue::from("B-202")));
    }

    #[test]
    fn test_submit_without_hook_or_form_is_ignored() {
        let mut wizard = controller();
        complete_first_two(&mut wizard);
        assert_eq!(wizard.submit(), Submission::Ignored);
    }

    #[test]
    fn test_form_post_carries_checkbox_as_boolean() {
        let mut wizard = WizardController::from_layout(&resident_layout().with_form(), WizardOptions::new());
        complete_first_two(&mut wizard);
        wizard.set_checked(FieldRef { step: 2, field: 1 }, true);

        match wizard.submit() {
            Submission::Form(values) => {
                assert_eq!(values.get("owner"), Some(&FieldValue::Flag(true)));
                assert_eq!(values.get("phone"), Some(&FieldValue::from("")));
                assert_eq!(values.get("apartment_label"), Some(&FieldValue::from("A-101")));
            }
            other => panic!("expected form post, got {:?}", other),
        }
    }

    #[test]
    fn test_submit_hook_receives_form_and_data() {
        let received = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&received);
        let options = WizardOptions::new().on_submit(move |event, data| {
            *sink.borrow_mut() = Some((event.step, event.form.clone(), data.clone()));
        });
        let mut wizard = WizardController::from_layout(&resident_layout(), options);
        complete_first_two(&mut wizard);
        wizard.input(FieldRef { step: 2, field: 0 }, "809-555-0101");

        assert_eq!(wizard.click(ClickTarget::Submit), Some(Submission::Handled));

        let (step, form, data) = received.borrow_mut().take().expect("hook called");
        assert_eq!(step, 2);
        assert_eq!(form.get("phone"), Some(&FieldValue::from("809-555-0101")));
        assert!(data.get("phone").is_none(), "last step is not collected by next()");
        assert_eq!(data.get("name"), Some(&FieldValue::from("Ana")));
    }

    #[test]
    fn test_view_tracks_navigation() {
        let mut wizard = controller();
        complete_first_two(&mut wizard);
        wizard.prev();

        let view = wizard.view().expect("bound");
        assert_eq!(view.steps[1], StepStatus::Active);
        assert_eq!(view.progress, vec![ProgressStatus::Completed, ProgressStatus::Active, ProgressStatus::Pending]);
        assert_eq!(view.counter.as_deref(), Some("Paso 2 de 3"));
        assert!(view.back_visible && view.next_visible && !view.submit_visible);
    }

    #[test]
    fn test_next_button_follows_input_without_marking() {
        let mut wizard = controller();
        assert!(!wizard.view().expect("bound").next_enabled);

        wizard.input(NAME, "A");
        assert!(wizard.view().expect("bound").next_enabled);
        wizard.input(NAME, "  ");
        assert!(!wizard.view().expect("bound").next_enabled);
        assert!(!wizard.field(NAME).expect("field").marker.invalid);

        wizard.input(NAME, "Ana");
        wizard.next();
        assert!(!wizard.view().expect("bound").next_enabled, "option not chosen yet");
        wizard.select_option(APARTMENT, 1);
        assert!(wizard.view().expect("bound").next_enabled);
    }

    #[test]
    fn test_disabled_next_control_ignores_clicks() {
        let mut wizard = controller();
        wizard.click(ClickTarget::Next);
        assert_eq!(wizard.current_step(), 0);
        assert!(!wizard.field(NAME).expect("field").marker.invalid);
    }

    #[test]
    fn test_open_close_and_escape() {
        let mut wizard = controller();
        wizard.set_data("stale", "x");
        wizard.open();
        assert!(wizard.is_open());
        assert!(wizard.scroll_locked());
        assert!(wizard.data().is_empty());

        assert_eq!(wizard.handle_key(WizardKey::Escape, None), KeyOutcome::Handled);
        assert!(!wizard.is_open());
        assert!(!wizard.scroll_locked());
        assert_eq!(wizard.handle_key(WizardKey::Escape, None), KeyOutcome::Ignored);

        wizard.open();
        wizard.click(ClickTarget::Content);
        assert!(wizard.is_open());
        wizard.click(ClickTarget::Backdrop);
        assert!(!wizard.is_open());
    }

    #[test]
    fn test_close_keeps_data() {
        let mut wizard = controller();
        wizard.open();
        wizard.input(NAME, "Ana");
        wizard.next();
        wizard.click(ClickTarget::Close);
        assert!(!wizard.is_open());
        assert_eq!(wizard.get_data("name"), Some(&FieldValue::from("Ana")));
    }

    #[test]
    fn test_enter_advances_except_in_textarea() {
        let mut wizard = controller();
        wizard.input(NAME, "Ana");
        assert_eq!(wizard.handle_key(WizardKey::Enter, Some(NAME)), KeyOutcome::Handled);
        assert_eq!(wizard.current_step(), 1);

        wizard.select_option(APARTMENT, 0);
        wizard.handle_key(WizardKey::Enter, None);
        assert_eq!(wizard.current_step(), 2);

        let notes = FieldRef { step: 2, field: 2 };
        assert_eq!(wizard.handle_key(WizardKey::Enter, Some(notes)), KeyOutcome::Ignored);
        assert_eq!(wizard.handle_key(WizardKey::Enter, None), KeyOutcome::Handled);
        assert_eq!(wizard.current_step(), 2);
    }

    #[test]
    fn test_focus_follows_latest_render_only() {
        let mut wizard = controller();
        wizard.input(NAME, "Ana");
        let start = Instant::now();
        wizard.next();
        wizard.prev();

        let focused = wizard.poll_focus(start + FOCUS_DELAY * 2);
        assert_eq!(focused, Some(NAME));
        assert_eq!(wizard.focused(), Some(NAME));
        assert_eq!(wizard.poll_focus(start + FOCUS_DELAY * 3), None);
    }

    #[test]
    fn test_step_without_fields_schedules_no_focus() {
        let mut wizard = controller();
        wizard.input(NAME, "Ana");
        wizard.next();
        assert_eq!(wizard.poll_focus(Instant::now() + FOCUS_DELAY * 2), None);
    }

    #[test]
    fn test_unknown_root_is_inert() {
        let page = Page::new();
        let mut wizard = WizardController::new(&page, "missing", WizardOptions::new());

        assert!(!wizard.is_bound());
        wizard.next();
        wizard.prev();
        wizard.go_to(1);
        wizard.open();
        wizard.close();
        wizard.reset();
        wizard.set_data("k", "v");
        wizard.input(NAME, "x");
        wizard.select_option(APARTMENT, 0);

        assert_eq!(wizard.get_data("k"), None);
        assert_eq!(wizard.total_steps(), 0);
        assert!(wizard.view().is_none());
        assert!(!wizard.is_open());
        assert_eq!(wizard.submit(), Submission::Ignored);
        assert_eq!(wizard.handle_key(WizardKey::Enter, None), KeyOutcome::Ignored);
        assert_eq!(wizard.poll_focus(Instant::now()), None);
    }

    #[test]
    fn test_page_binding() {
        let mut page = Page::new();
        page.bind(resident_layout());
        let wizard = WizardController::new(&page, "wizard-resident", WizardOptions::new());
        assert!(wizard.is_bound());
        assert_eq!(wizard.total_steps(), 3);
    }

    #[test]
    fn test_filter_options_through_controller() {
        let mut wizard = controller();
        assert_eq!(wizard.filter_options(APARTMENT, "b-2"), 1);
        assert!(!wizard.group(APARTMENT).expect("group").tiles[0].visible);
        assert_eq!(wizard.filter_options(GroupRef { step: 9, group: 0 }, "x"), 0);
    }
}
