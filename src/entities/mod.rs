//! Entity type definitions
//!
//! An FMEA document holds three kinds of entity:
//!
//! - [`Structure`] - the system decomposition (system, subsystem, component)
//! - [`Function`] - behaviors attached to structures, linked by prerequisites
//! - [`Fault`] - failure effects, modes and causes attached to functions
//!
//! plus a [`DocumentHeader`] carrying metadata and the team roster.

pub mod document;
pub mod fault;
pub mod function;
pub mod structure;

pub use document::{DocumentHeader, Planning, Stage};
pub use fault::{Fault, FaultDraft, FaultPatch, FaultTier};
pub use function::{Function, FunctionDraft, FunctionPatch};
pub use structure::{Structure, StructureDraft, StructurePatch};
