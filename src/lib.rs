//! # fls-behaviors
//!
//! Attribute-driven page behaviors, built on
//! [spark-signals](https://github.com/RLabs-Inc/spark-signals) for reactive state.
//!
//! ## Architecture
//!
//! Elements are indices into a [`Document`] arena. Each behavior is activated
//! by a marker attribute when the page loads and afterwards only reacts to
//! events and timers delivered through a [`Page`]:
//!
//! ```text
//! PageEvent → Page → ScrollLockManager / HeaderController / RatingRegistry → Document
//!                 ↘ Scheduler (virtual clock) ↗
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (ElementId, ClassList, Style)
//! - [`dom`] - Document arena and viewport
//! - [`scheduler`] - Virtual clock with cancellable delayed tasks
//! - [`state`] - Scroll lock, header scroll state machine, menu toggle
//! - [`primitives`] - Rating widget
//! - [`pipeline`] - Page wiring and module preloading
//! - [`config`] - Attribute names, defaults, numeric coercion

pub mod config;
pub mod dom;
pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod scheduler;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::PageConfig;
pub use dom::{Document, Element, Viewport};
pub use error::{Error, Result};
pub use pipeline::{FetchRequest, Page, PageEvent};
pub use primitives::{RatingConfig, RatingRegistry, RatingWidget};
pub use scheduler::{Scheduler, Task, TimerHandle};
pub use state::{HeaderConfig, HeaderController, MenuToggle, ScrollLockManager};
