//! Team roster of an FMEA document
//!
//! Every document names a core team and an extended team. An employee may
//! belong to at most one of them.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::error::{FmeaError, Result};

/// Which team list a member belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    Core,
    Extended,
}

impl std::fmt::Display for Membership {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Membership::Core => write!(f, "core"),
            Membership::Extended => write!(f, "extended"),
        }
    }
}

/// A team member identified by employee number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub employee_no: String,

    #[serde(default)]
    pub name: String,

    /// Role in the analysis (moderator, design engineer, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl TeamMember {
    pub fn new(employee_no: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            employee_no: employee_no.into(),
            name: name.into(),
            role: None,
            department: None,
        }
    }

    fn is(&self, employee_no: &str) -> bool {
        self.employee_no.trim().eq_ignore_ascii_case(employee_no.trim())
    }
}

/// Core and extended team lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub core: Vec<TeamMember>,

    #[serde(default)]
    pub extended: Vec<TeamMember>,
}

impl Team {
    pub fn members(&self, membership: Membership) -> &[TeamMember] {
        match membership {
            Membership::Core => &self.core,
            Membership::Extended => &self.extended,
        }
    }

    /// Find a member in either list
    pub fn find_member(&self, employee_no: &str) -> Option<(Membership, &TeamMember)> {
        self.core
            .iter()
            .find(|m| m.is(employee_no))
            .map(|m| (Membership::Core, m))
            .or_else(|| {
                self.extended
                    .iter()
                    .find(|m| m.is(employee_no))
                    .map(|m| (Membership::Extended, m))
            })
    }

    /// Add a member; an employee already on either list is rejected
    pub fn add_member(&mut self, membership: Membership, member: TeamMember) -> Result<()> {
        if self.find_member(&member.employee_no).is_some() {
            return Err(FmeaError::DuplicateTeamMember(member.employee_no));
        }
        match membership {
            Membership::Core => self.core.push(member),
            Membership::Extended => self.extended.push(member),
        }
        Ok(())
    }

    /// Remove a member from whichever list holds it
    pub fn remove_member(&mut self, employee_no: &str) -> Option<TeamMember> {
        if let Some(pos) = self.core.iter().position(|m| m.is(employee_no)) {
            return Some(self.core.remove(pos));
        }
        if let Some(pos) = self.extended.iter().position(|m| m.is(employee_no)) {
            return Some(self.extended.remove(pos));
        }
        None
    }

    /// Employee numbers present in both lists
    pub fn duplicate_members(&self) -> Vec<&str> {
        self.core
            .iter()
            .filter(|c| self.extended.iter().any(|e| e.is(&c.employee_no)))
            .map(|c| c.employee_no.as_str())
            .collect()
    }

    /// Fail with the first employee listed in both teams
    pub fn ensure_disjoint(&self) -> Result<()> {
        match self.duplicate_members().first() {
            Some(employee_no) => Err(FmeaError::DuplicateTeamMember(employee_no.to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_team() -> Team {
        let mut team = Team::default();
        team.add_member(Membership::Core, TeamMember::new("E1", "Jane Smith"))
            .unwrap();
        team.add_member(Membership::Extended, TeamMember::new("E2", "Bob Wilson"))
            .unwrap();
        team
    }

    #[test]
    fn test_find_member() {
        let team = create_test_team();
        let (membership, member) = team.find_member("E2").unwrap();
        assert_eq!(membership, Membership::Extended);
        assert_eq!(member.name, "Bob Wilson");
    }

    #[test]
    fn test_find_member_case_insensitive() {
        let team = create_test_team();
        assert!(team.find_member("e1").is_some());
        assert!(team.find_member(" E1 ").is_some());
    }

    #[test]
    fn test_add_member_rejects_member_of_other_list() {
        let mut team = create_test_team();
        let err = team
            .add_member(Membership::Extended, TeamMember::new("E1", "Jane again"))
            .unwrap_err();
        assert!(matches!(err, FmeaError::DuplicateTeamMember(ref no) if no == "E1"));
        assert_eq!(team.extended.len(), 1);
    }

    #[test]
    fn test_ensure_disjoint_detects_overlap() {
        let team = Team {
            core: vec![TeamMember::new("E1", "")],
            extended: vec![TeamMember::new("E1", "")],
        };
        assert_eq!(team.duplicate_members(), vec!["E1"]);
        assert!(matches!(
            team.ensure_disjoint(),
            Err(FmeaError::DuplicateTeamMember(_))
        ));
    }

    #[test]
    fn test_remove_member() {
        let mut team = create_test_team();
        assert!(team.remove_member("E2").is_some());
        assert!(team.remove_member("E2").is_none());
        assert!(team.extended.is_empty());
        assert!(team.ensure_disjoint().is_ok());
    }
}
