//! Common types and traits shared across Komando crates.
//!
//! This crate holds the conversation data model (turns, roles, delegate
//! categories, intents) and the [`SubAgent`] capability that the executor
//! dispatches to, so the coordinator and agent crates can share them without
//! depending on each other.

pub mod category;
pub mod error;
pub mod message;
pub mod traits;

pub use category::DelegateCategory;
pub use error::{KomandoError, Result};
pub use message::{DelegationResult, Intent, IntentArgument, Role, Turn};
pub use traits::SubAgent;
