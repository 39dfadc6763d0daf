//! Page Pipeline
//!
//! Connects the behaviors to the environment's events.
//!
//! ```text
//! construction → module preload scan
//! load         → attribute discovery → behavior activation
//! scroll/click → behaviors → Document
//! advance(ms)  → Scheduler → due tasks → behaviors → Document
//! ```

pub mod page;
pub mod preload;

pub use page::{Page, PageEvent};
pub use preload::{Credentials, FetchOptions, FetchRequest, ModulePreloader};
