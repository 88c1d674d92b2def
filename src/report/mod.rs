pub mod types;

pub use types::{FlaggedDocument, ScanSummary};

use colored::Colorize;
use std::io::Write;
use thiserror::Error;

use crate::redaction::{DocumentResult, Entity};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to write result: {0}")]
    Write(#[from] std::io::Error),
}

/// Keep the entities whose confidence score is at least `threshold`.
/// Order is preserved.
pub fn filter_entities(entities: &[Entity], threshold: f64) -> Vec<Entity> {
    entities
        .iter()
        .filter(|entity| entity.confidence_score >= threshold)
        .cloned()
        .collect()
}

/// Turn a service result into a flagged document, or `None` when nothing
/// reaches the threshold.
pub fn flag_document(result: DocumentResult, threshold: f64) -> Option<FlaggedDocument> {
    let entities = filter_entities(&result.entities, threshold);
    if entities.is_empty() {
        return None;
    }

    Some(FlaggedDocument {
        id: result.id,
        redacted: result.redacted_text,
        entities,
    })
}

/// Write one flagged document as pretty-printed JSON followed by a newline.
pub fn write_document<W: Write>(
    out: &mut W,
    document: &FlaggedDocument,
) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut *out, document)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Print the end-of-run summary to stderr so stdout stays machine-readable.
pub fn print_summary(summary: &ScanSummary) {
    eprintln!("{}", summary_line(summary));
}

fn summary_line(summary: &ScanSummary) -> String {
    let flagged = format!("{} flagged", summary.flagged_documents);
    let flagged = if summary.flagged_documents > 0 {
        flagged.red().bold()
    } else {
        flagged.green().bold()
    };
    format!(
        "Scanned {} across {} pages ({} analysis requests): {} ({} entities)",
        format!("{} issues", summary.issues).bold(),
        summary.pages,
        summary.requests,
        flagged,
        summary.flagged_entities
    )
}
