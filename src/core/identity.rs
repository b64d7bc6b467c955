//! Code generation for new entities
//!
//! Entity codes are plain strings. The engine never invents them itself: every
//! "create child" operation takes a [`CodeGenerator`] supplied by the caller.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ulid::Ulid;

use crate::core::entity::EntityKind;

/// Source of fresh codes for new entities
pub trait CodeGenerator {
    fn next_code(&mut self, kind: EntityKind) -> String;
}

impl<F> CodeGenerator for F
where
    F: FnMut(EntityKind) -> String,
{
    fn next_code(&mut self, kind: EntityKind) -> String {
        self(kind)
    }
}

/// How the CLI generates codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CodeStyle {
    /// `STR-1`, `FUN-2`, ...
    #[default]
    Sequential,
    /// `STR-01HQ...`
    Ulid,
}

impl std::str::FromStr for CodeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(CodeStyle::Sequential),
            "ulid" => Ok(CodeStyle::Ulid),
            _ => Err(format!("Unknown code style: {}", s)),
        }
    }
}

/// Type-prefixed ULID codes, unique without coordination
#[derive(Debug, Default, Clone, Copy)]
pub struct UlidCodes;

impl CodeGenerator for UlidCodes {
    fn next_code(&mut self, kind: EntityKind) -> String {
        format!("{}-{}", kind.prefix(), Ulid::new())
    }
}

/// Per-kind counters producing `PREFIX-N`
#[derive(Debug, Default, Clone)]
pub struct SequentialCodes {
    next: HashMap<EntityKind, u64>,
}

impl SequentialCodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the counters past every sequential code already in use
    pub fn seeded<'a>(existing: impl IntoIterator<Item = &'a str>) -> Self {
        let mut codes = Self::new();
        for code in existing {
            codes.observe(code);
        }
        codes
    }

    /// Make sure `code` will never be generated
    pub fn observe(&mut self, code: &str) {
        let Some((prefix, number)) = code.split_once('-') else {
            return;
        };
        let Some(kind) = EntityKind::all().iter().find(|k| k.prefix() == prefix) else {
            return;
        };
        if let Ok(n) = number.parse::<u64>() {
            let next = self.next.entry(*kind).or_insert(1);
            if n >= *next {
                *next = n + 1;
            }
        }
    }
}

impl CodeGenerator for SequentialCodes {
    fn next_code(&mut self, kind: EntityKind) -> String {
        let next = self.next.entry(kind).or_insert(1);
        let code = format!("{}-{}", kind.prefix(), next);
        *next += 1;
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_codes_count_per_kind() {
        let mut codes = SequentialCodes::new();
        assert_eq!(codes.next_code(EntityKind::Structure), "STR-1");
        assert_eq!(codes.next_code(EntityKind::Structure), "STR-2");
        assert_eq!(codes.next_code(EntityKind::Fault), "FLT-1");
    }

    #[test]
    fn test_seeded_codes_skip_existing() {
        let mut codes = SequentialCodes::seeded(["STR-1", "STR-7", "FUN-2", "custom", "FLT-x"]);
        assert_eq!(codes.next_code(EntityKind::Structure), "STR-8");
        assert_eq!(codes.next_code(EntityKind::Function), "FUN-3");
        assert_eq!(codes.next_code(EntityKind::Fault), "FLT-1");
    }

    #[test]
    fn test_ulid_codes_are_prefixed_and_unique() {
        let mut codes = UlidCodes;
        let a = codes.next_code(EntityKind::Function);
        let b = codes.next_code(EntityKind::Function);
        assert!(a.starts_with("FUN-"));
        assert_eq!(a.len(), 4 + 26);
        assert_ne!(a, b);
    }

    #[test]
    fn test_closure_generator() {
        let mut generator = |_kind: EntityKind| "F1.1".to_string();
        assert_eq!(generator.next_code(EntityKind::Function), "F1.1");
    }
}
