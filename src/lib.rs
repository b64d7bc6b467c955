//! FMEA Designer
//!
//! Authoring core for failure mode and effects analysis: a structure tree, a
//! function net and a fault net per document, kept consistent by a hierarchy
//! engine and persisted as flat tables.

pub mod cli;
pub mod core;
pub mod entities;
