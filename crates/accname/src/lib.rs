//! Accessible Name Computation
//!
//! Computes the accessible name and description of an element in a labelled
//! tree, the text assistive technology announces for it.
//!
//! ## Core Design
//!
//! ```text
//! Oracles (tree, style, focus)
//!     ↓
//! AccNameService ── eligibility ──→ NameComputer (name pass)
//!                                 → NameComputer (aria-describedby pass)
//!     ↓
//! AccessibleName { name, description, error }
//! ```
//!
//! The computation only reads through the oracle traits. `DomArena` from the
//! `dom` crate implements all of them.
//!
//! ```no_run
//! use accname::{AccNameService, Oracles};
//! use dom::DomArena;
//!
//! let mut arena = DomArena::new();
//! let button = arena.append_element(None, "button", &[]).unwrap();
//! arena.append_text(button, "Save").unwrap();
//!
//! let result = AccNameService::new(Oracles::from_arena(&arena)).compute(Some(button));
//! assert_eq!(result.name, "Save");
//! ```

pub mod config;
pub mod css;
pub mod error;
pub mod oracle;
pub mod refs;
pub mod roles;
pub mod service;
pub mod types;
pub mod utils;
pub mod visibility;
pub mod walker;

pub use config::AccNameConfig;
pub use error::{AccNameError, Result};
pub use oracle::{oracle_fault, FocusOracle, NodeKind, Oracles, StyleOracle, TreeAccessor};
pub use service::{compute_accessible_name_and_description, AccNameService};
pub use types::{AccessibleName, NamingResult};
pub use walker::NameComputer;
