//! Document assembler: flat tables to [`Document`] and back
//!
//! Reading stitches a header and the three entity tables into a document
//! whose code lists stay unresolved. Writing checks the document, diffs it
//! against what is stored and commits the diff in one transaction.

use chrono::Utc;
use tracing::{debug, instrument};

use crate::core::document::Document;
use crate::core::error::Result;
use crate::core::store::{ChangeSet, EntityDiff, EntityStore};
use crate::entities::{Fault, Function, Structure};

/// Load one document from the store
pub fn assemble_document<S: EntityStore>(store: &S, code: &str) -> Result<Document> {
    let header = store.load_header(code)?;
    let document = Document::from_parts(
        header,
        store.load_entities::<Structure>(code)?,
        store.load_entities::<Function>(code)?,
        store.load_entities::<Fault>(code)?,
    );
    debug!(
        document = code,
        generation = document.header.generation,
        structures = document.structures.len(),
        functions = document.functions.len(),
        faults = document.faults.len(),
        "document assembled"
    );
    Ok(document)
}

/// Partition every collection of `document` against the stored rows
pub fn diff_document<S: EntityStore>(store: &S, document: &Document) -> Result<ChangeSet> {
    let code = document.code();
    Ok(ChangeSet {
        structures: EntityDiff::between(
            &store.load_entities::<Structure>(code)?,
            &document.structures,
        ),
        functions: EntityDiff::between(
            &store.load_entities::<Function>(code)?,
            &document.functions,
        ),
        faults: EntityDiff::between(&store.load_entities::<Fault>(code)?, &document.faults),
    })
}

/// Check and persist a document, returning it at its new generation
///
/// In order: the team lists must be disjoint, the hierarchy must be free of
/// cycles, levels are recomputed, and every rule in [`Document::validate`]
/// must hold. Only then is the diff computed and committed. A document whose
/// stored generation moved on since it was loaded fails with
/// [`Conflict`](crate::core::error::FmeaError::Conflict).
#[instrument(skip_all, fields(document = %document.header.code, generation = document.header.generation))]
pub fn submit_document<S: EntityStore>(store: &mut S, mut document: Document) -> Result<Document> {
    document.header.team.ensure_disjoint()?;
    document.check_cycles()?;
    document.setup_levels()?;
    document.validate().into_result()?;

    let changes = diff_document(store, &document)?;
    let expected = document.header.generation;
    document.header.updated = Utc::now();
    document.header.generation = store.commit(&document.header, expected, &changes)?;
    Ok(document)
}
