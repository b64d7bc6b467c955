//! Import / export in a flat, code-identified exchange format
//!
//! An exchange file lists structures, functions and faults with explicit
//! parent references and reference lists. Sibling order is the order of
//! appearance in the file. Importing rebuilds the forward code lists, then
//! runs the same cycle checks and level assignment as native edits before the
//! document is accepted.
//!
//! ```yaml
//! document:
//!   code: DOC-1
//!   name: Brake FMEA
//! structures:
//!   - code: STR-1
//!     long_name: Vehicle
//!   - code: STR-2
//!     long_name: Brake
//!     parent: STR-1
//! functions:
//!   - code: FUN-1
//!     long_name: Decelerate
//!     structure: STR-2
//! faults:
//!   - code: FLT-1
//!     long_name: No deceleration
//!     function: FUN-1
//!     risk_priority_factor: 8
//! ```

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::document::{check_parent_chain, Document};
use crate::core::entity::EntityKind;
use crate::core::error::{FmeaError, Result};
use crate::core::team::Team;
use crate::entities::{DocumentHeader, Fault, Function, Planning, Stage, Structure};

/// Serialization format of an exchange file
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExchangeFormat {
    Yaml,
    Json,
}

impl ExchangeFormat {
    /// Guess from the file extension, defaulting to YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExchangeFormat::Json,
            _ => ExchangeFormat::Yaml,
        }
    }
}

/// Header fields carried by an exchange file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeHeader {
    pub code: String,
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub stage: Stage,

    #[serde(default)]
    pub planning: Planning,

    #[serde(default)]
    pub team: Team,
}

fn default_version() -> String {
    "1".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeStructure {
    pub code: String,
    pub long_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,

    /// Absent for the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeFunction {
    pub code: String,
    pub long_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_name: String,

    /// Owning structure
    pub structure: String,

    /// Function this one is a prerequisite of
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeFault {
    pub code: String,
    pub long_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_name: String,

    #[serde(default = "default_risk_priority_factor")]
    pub risk_priority_factor: u32,

    /// Owning function
    pub function: String,

    /// Fault this one is a cause of
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

fn default_risk_priority_factor() -> u32 {
    1
}

/// A whole document in exchange form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub document: ExchangeHeader,

    #[serde(default)]
    pub structures: Vec<ExchangeStructure>,

    #[serde(default)]
    pub functions: Vec<ExchangeFunction>,

    #[serde(default)]
    pub faults: Vec<ExchangeFault>,
}

impl Exchange {
    pub fn parse(content: &str, format: ExchangeFormat) -> Result<Self> {
        Ok(match format {
            ExchangeFormat::Yaml => serde_yml::from_str(content)?,
            ExchangeFormat::Json => serde_json::from_str(content)?,
        })
    }

    pub fn render(&self, format: ExchangeFormat) -> Result<String> {
        Ok(match format {
            ExchangeFormat::Yaml => serde_yml::to_string(self)?,
            ExchangeFormat::Json => serde_json::to_string_pretty(self)?,
        })
    }

    /// Flatten a document; structures come in pre-order from the root
    pub fn from_document(document: &Document) -> Result<Self> {
        let header = &document.header;
        let mut exchange = Exchange {
            document: ExchangeHeader {
                code: header.code.clone(),
                name: header.name.clone(),
                version: header.version.clone(),
                stage: header.stage,
                planning: header.planning.clone(),
                team: header.team.clone(),
            },
            structures: Vec::new(),
            functions: Vec::new(),
            faults: Vec::new(),
        };

        document.check_cycles()?;
        let mut stack = vec![(document.root()?, None::<String>)];
        while let Some((structure, parent)) = stack.pop() {
            exchange.structures.push(ExchangeStructure {
                code: structure.code.clone(),
                long_name: structure.long_name.clone(),
                short_name: structure.short_name.clone(),
                category: structure.category.clone(),
                parent,
            });

            for function in document.functions_of(structure)? {
                exchange.functions.push(ExchangeFunction {
                    code: function.code.clone(),
                    long_name: function.long_name.clone(),
                    short_name: function.short_name.clone(),
                    structure: structure.code.clone(),
                    parent: None,
                    prerequisites: function.prerequisites.clone(),
                });
                for fault in document.faults_of(function)? {
                    exchange.faults.push(ExchangeFault {
                        code: fault.code.clone(),
                        long_name: fault.long_name.clone(),
                        short_name: fault.short_name.clone(),
                        risk_priority_factor: fault.risk_priority_factor,
                        function: function.code.clone(),
                        parent: None,
                        causes: fault.causes.clone(),
                    });
                }
            }

            let children = document.children(structure)?;
            for child in children.into_iter().rev() {
                stack.push((child, Some(structure.code.clone())));
            }
        }
        Ok(exchange)
    }

    /// Build a checked document at generation 0
    pub fn into_document(self) -> Result<Document> {
        self.document.team.ensure_disjoint()?;

        let mut seen = HashSet::new();
        let all_codes = self
            .structures
            .iter()
            .map(|s| &s.code)
            .chain(self.functions.iter().map(|f| &f.code))
            .chain(self.faults.iter().map(|f| &f.code));
        for code in all_codes {
            if !seen.insert(code.as_str()) {
                return Err(FmeaError::DuplicateCode(code.clone()));
            }
        }

        let root = self.find_root()?;
        self.check_parent_chains()?;

        let mut structures: HashMap<String, Structure> = HashMap::new();
        for s in &self.structures {
            let mut structure = Structure::new(s.code.clone(), s.long_name.clone());
            structure.short_name = s.short_name.clone();
            structure.category = s.category.clone();
            structures.insert(s.code.clone(), structure);
        }
        for s in &self.structures {
            if let Some(parent) = &s.parent {
                let parent = structures
                    .get_mut(parent)
                    .ok_or_else(|| FmeaError::not_found(EntityKind::Structure, parent))?;
                parent.decomposition.push(s.code.clone());
            }
        }

        let mut functions: HashMap<String, Function> = HashMap::new();
        for f in &self.functions {
            let mut function = Function::new(f.code.clone(), f.long_name.clone(), f.structure.clone());
            function.short_name = f.short_name.clone();
            function.prerequisites = f.prerequisites.clone();
            structures
                .get_mut(&f.structure)
                .ok_or_else(|| FmeaError::not_found(EntityKind::Structure, &f.structure))?
                .functions
                .push(f.code.clone());
            functions.insert(f.code.clone(), function);
        }
        for f in &self.functions {
            if let Some(parent) = &f.parent {
                let parent = functions
                    .get_mut(parent)
                    .ok_or_else(|| FmeaError::not_found(EntityKind::Function, parent))?;
                if !parent.prerequisites.contains(&f.code) {
                    parent.prerequisites.push(f.code.clone());
                }
            }
        }

        let mut faults: HashMap<String, Fault> = HashMap::new();
        for f in &self.faults {
            let mut fault = Fault::new(f.code.clone(), f.long_name.clone(), f.function.clone());
            fault.short_name = f.short_name.clone();
            fault.risk_priority_factor = f.risk_priority_factor;
            fault.causes = f.causes.clone();
            functions
                .get_mut(&f.function)
                .ok_or_else(|| FmeaError::not_found(EntityKind::Function, &f.function))?
                .fault_refs
                .push(f.code.clone());
            faults.insert(f.code.clone(), fault);
        }
        for f in &self.faults {
            if let Some(parent) = &f.parent {
                let parent = faults
                    .get_mut(parent)
                    .ok_or_else(|| FmeaError::not_found(EntityKind::Fault, parent))?;
                if !parent.causes.contains(&f.code) {
                    parent.causes.push(f.code.clone());
                }
            }
        }

        // seq follows list position
        let seqs: HashMap<String, u32> = structures
            .values()
            .flat_map(|s| position_seqs(&s.decomposition))
            .collect();
        for structure in structures.values_mut() {
            structure.seq = seqs.get(&structure.code).copied().unwrap_or(1);
        }
        let seqs: HashMap<String, u32> = structures
            .values()
            .flat_map(|s| position_seqs(&s.functions))
            .collect();
        for function in functions.values_mut() {
            function.seq = seqs.get(&function.code).copied().unwrap_or(1);
        }
        let seqs: HashMap<String, u32> = functions
            .values()
            .flat_map(|f| position_seqs(&f.fault_refs))
            .collect();
        for fault in faults.values_mut() {
            fault.seq = seqs.get(&fault.code).copied().unwrap_or(1);
        }

        let now = Utc::now();
        let header = DocumentHeader {
            code: self.document.code,
            name: self.document.name,
            version: self.document.version,
            stage: self.document.stage,
            root_structure_code: root,
            planning: self.document.planning,
            team: self.document.team,
            created: now,
            updated: now,
            generation: 0,
        };
        let mut document = Document::from_parts(
            header,
            structures.into_values(),
            functions.into_values(),
            faults.into_values(),
        );

        document.check_cycles()?;
        document.setup_levels()?;
        document.validate().into_result()?;
        debug!(
            document = %document.header.code,
            structures = document.structures.len(),
            functions = document.functions.len(),
            faults = document.faults.len(),
            "exchange imported"
        );
        Ok(document)
    }

    fn find_root(&self) -> Result<String> {
        let roots: Vec<&ExchangeStructure> =
            self.structures.iter().filter(|s| s.parent.is_none()).collect();
        match roots.as_slice() {
            [root] => Ok(root.code.clone()),
            [] => Err(FmeaError::InvalidField {
                field: "structures",
                message: "no root structure (one structure must have no parent)".to_string(),
            }),
            many => Err(FmeaError::InvalidField {
                field: "structures",
                message: format!(
                    "several structures have no parent: {}",
                    many.iter().map(|s| s.code.as_str()).collect::<Vec<_>>().join(", ")
                ),
            }),
        }
    }

    /// Walk every parent reference upward before any forward list exists
    fn check_parent_chains(&self) -> Result<()> {
        let structure_parents: HashMap<&str, &str> = self
            .structures
            .iter()
            .filter_map(|s| s.parent.as_deref().map(|p| (s.code.as_str(), p)))
            .collect();
        for s in &self.structures {
            check_parent_chain(EntityKind::Structure, &s.code, |c| {
                structure_parents.get(c).map(|p| p.to_string())
            })?;
        }

        let function_parents: HashMap<&str, &str> = self
            .functions
            .iter()
            .filter_map(|f| f.parent.as_deref().map(|p| (f.code.as_str(), p)))
            .collect();
        for f in &self.functions {
            check_parent_chain(EntityKind::Function, &f.code, |c| {
                function_parents.get(c).map(|p| p.to_string())
            })?;
        }

        let fault_parents: HashMap<&str, &str> = self
            .faults
            .iter()
            .filter_map(|f| f.parent.as_deref().map(|p| (f.code.as_str(), p)))
            .collect();
        for f in &self.faults {
            check_parent_chain(EntityKind::Fault, &f.code, |c| {
                fault_parents.get(c).map(|p| p.to_string())
            })?;
        }
        Ok(())
    }
}

fn position_seqs(codes: &[String]) -> impl Iterator<Item = (String, u32)> + '_ {
    codes
        .iter()
        .enumerate()
        .map(|(i, code)| (code.clone(), i as u32 + 1))
}

/// One line of the flattened FMEA worksheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorksheetRow {
    pub structure: String,
    pub structure_name: String,
    pub structure_level: u32,
    pub function: String,
    pub function_name: String,
    pub function_level: u32,
    pub fault: String,
    pub fault_name: String,
    pub tier: String,
    pub risk_priority_factor: u32,
    pub causes: String,
}

/// Worksheet rows: one per fault, in structure pre-order
///
/// Functions without faults get a row with empty fault columns.
pub fn worksheet_rows(document: &Document) -> Result<Vec<WorksheetRow>> {
    let mut structures = vec![document.root()?];
    structures.extend(document.flatten_structures()?);

    let mut rows = Vec::new();
    for structure in structures {
        for function in document.functions_of(structure)? {
            let base = WorksheetRow {
                structure: structure.code.clone(),
                structure_name: structure.long_name.clone(),
                structure_level: structure.level,
                function: function.code.clone(),
                function_name: function.long_name.clone(),
                function_level: function.level,
                fault: String::new(),
                fault_name: String::new(),
                tier: String::new(),
                risk_priority_factor: 0,
                causes: String::new(),
            };
            let faults = document.faults_of(function)?;
            if faults.is_empty() {
                rows.push(base);
                continue;
            }
            for fault in faults {
                rows.push(WorksheetRow {
                    fault: fault.code.clone(),
                    fault_name: fault.long_name.clone(),
                    tier: fault.tier().map(|t| t.to_string()).unwrap_or_default(),
                    risk_priority_factor: fault.risk_priority_factor,
                    causes: fault.causes.join(" "),
                    ..base.clone()
                });
            }
        }
    }
    Ok(rows)
}

/// Write the worksheet as CSV with a header line
pub fn write_worksheet<W: Write>(document: &Document, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in worksheet_rows(document)? {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}
