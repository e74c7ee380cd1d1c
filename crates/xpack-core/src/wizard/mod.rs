//! Multi-step form wizard.
//!
//! This module provides:
//! - `WizardController`: navigation, validation gating and data collection
//! - `WizardLayout` / `Page`: declarative binding of steps, fields, option
//!   groups and controls
//! - `ViewState`: pure state-to-view mapping
//! - `FocusScheduler`: deferred focus cancelled by newer renders
//! - `styles::init`: one-time, idempotent global style installation

pub mod controller;
pub mod focus;
pub mod layout;
pub mod state;
pub mod styles;
pub mod view;

pub use controller::{
    ClickTarget, GroupRef, KeyOutcome, SubmitEvent, Submission, WizardController, WizardKey,
    WizardOptions,
};
pub use focus::{FieldRef, FocusScheduler, FOCUS_DELAY};
pub use layout::{
    Controls, FieldKind, FieldSpec, OptionGroupSpec, OptionTileSpec, Page, StepLayout,
    WizardLayout,
};
pub use state::{FieldState, FieldValue, GroupState, Marker, StepState, TileState, WizardData};
pub use styles::init;
pub use view::{ProgressStatus, StepStatus, ViewState};
