//! Persona domain module.
//!
//! This module contains all persona-related domain models, the catalog they
//! are looked up in, and the preset configurations.
//!
//! # Module Structure
//!
//! - `model`: Core persona domain model (`AgentPersona`)
//! - `catalog`: Name-keyed persona directory (`PersonaCatalog`)
//! - `preset`: Default system personas

mod catalog;
mod model;
mod preset;

// Re-export public API
pub use catalog::{CatalogFile, PersonaCatalog};
pub use model::AgentPersona;
pub use preset::get_default_presets;
