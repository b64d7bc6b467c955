//! Core module - document model, hierarchy engine and persistence

pub mod assembler;
pub mod config;
pub mod document;
pub mod entity;
pub mod error;
pub mod exchange;
pub mod identity;
pub mod project;
pub mod store;
pub mod team;

pub use assembler::{assemble_document, diff_document, submit_document};
pub use config::Config;
pub use document::{Arena, Document, GraphNode, MoveDirection, TreeNode};
pub use entity::{Entity, EntityKind, Relation};
pub use error::{FmeaError, Result, ValidationErrors, Violation};
pub use exchange::{Exchange, ExchangeFormat};
pub use identity::{CodeGenerator, CodeStyle, SequentialCodes, UlidCodes};
pub use project::{Project, ProjectError};
pub use store::{ChangeSet, EntityDiff, EntityStore, SqliteStore};
pub use team::{Membership, Team, TeamMember};
