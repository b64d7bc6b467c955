//! CLI command implementations

pub mod completions;
pub mod doc;
pub mod exchange;
pub mod fault;
pub mod function;
pub mod init;
pub mod structure;
pub mod team;
pub mod tree;
pub mod validate;
