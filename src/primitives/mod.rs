//! Widget Primitives - self-rendering page widgets.
//!
//! - [`rating`] - Star rating with fractional fill and click-to-set
//!
//! # Architecture
//!
//! A primitive renders its own markup into the element that declared it and
//! keeps only an `ElementId` plus its config. The Document stays the source
//! of truth for what is on screen.

pub mod rating;

pub use rating::{RatingConfig, RatingRegistry, RatingWidget};
