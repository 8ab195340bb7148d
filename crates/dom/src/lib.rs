//! Labelled Tree Library
//!
//! Arena-backed element/text tree with attributes and computed styles,
//! the data source for accessible name computation.
//!
//! ## Core Design
//!
//! ```text
//! JSON document → DomService → DomArena (owned) → NodeId (u32) handles
//! ```

pub mod arena;
pub mod error;
pub mod service;
pub mod types;

pub use arena::DomArena;
pub use error::{DomError, Result};
pub use service::{DomService, DomServiceConfig};
pub use types::*;
