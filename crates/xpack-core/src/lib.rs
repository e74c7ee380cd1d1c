//! Core library for xpack.
//!
//! This crate provides the two browser-side building blocks of the xpack
//! front-end, modelled without any DOM or Service Worker runtime:
//!
//! - `wizard`: a one-field-at-a-time, multi-step form wizard controller
//! - `offline`: an asset cache worker with cache-first / network-first routing
//!
//! The two components share no state. A host application (see `xpack-tui`)
//! may use both.

pub mod offline;
pub mod utils;
pub mod wizard;

pub use offline::{AssetCacheWorker, CacheError, CacheStorage, Network};
pub use wizard::{FieldValue, Page, WizardController, WizardData, WizardLayout, WizardOptions};
