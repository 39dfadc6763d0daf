//! Crate error type.
//!
//! None of these reach the page user. Activation logs them and falls back to
//! defaults, so a misconfigured widget simply does nothing.

use thiserror::Error;

use crate::types::ElementId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("attribute `{attribute}` is not a number: {value:?}")]
    InvalidNumber { attribute: String, value: String },

    #[error("attribute `{attribute}` must be positive, got {value}")]
    NonPositive { attribute: String, value: f64 },

    #[error("element {0} does not exist")]
    UnknownElement(ElementId),

    #[error("cannot append {child} into {parent}: {child} is an inclusive ancestor")]
    HierarchyRequest { parent: ElementId, child: ElementId },

    #[error("rating {0} is already initialized")]
    AlreadyInitialized(ElementId),
}

pub type Result<T> = std::result::Result<T, Error>;
