use std::io::Write;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::{ConfigError, ScanSettings};
use crate::issues::{Issue, IssueError, IssueSource};
use crate::redaction::{Document, PiiEntityRecognitionRequest, PiiRecognizer, RedactionError};
use crate::report::{self, ReportError, ScanSummary};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Issues(#[from] IssueError),

    #[error(transparent)]
    Redaction(#[from] RedactionError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Coarse classification of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing settings; nothing was sent over the network
    Config,
    /// Connection failure or error status from either API
    Transport,
    /// A response body that did not match the expected JSON shape
    Decode,
    /// Results could not be written out
    Output,
}

impl ScanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::Config(_) | ScanError::Issues(IssueError::Client(_)) => ErrorKind::Config,
            ScanError::Issues(IssueError::Transport(_))
            | ScanError::Redaction(RedactionError::Transport(_)) => ErrorKind::Transport,
            ScanError::Issues(IssueError::Decode(_))
            | ScanError::Redaction(RedactionError::Decode(_)) => ErrorKind::Decode,
            ScanError::Report(_) => ErrorKind::Output,
        }
    }
}

/// Build the analysis request for a batch of issues.
pub fn build_request(issues: &[Issue], settings: &ScanSettings) -> PiiEntityRecognitionRequest {
    let documents = issues
        .iter()
        .map(|issue| Document {
            id: issue.url.clone(),
            text: issue.body.clone(),
            language: settings.language.clone(),
        })
        .collect();
    PiiEntityRecognitionRequest::new(documents, &settings.domain)
}

/// Page through every issue, analyze each batch and write flagged documents
/// to `out`. Stops at the first error; anything already written stays written.
#[instrument(skip_all, fields(threshold = settings.threshold, batch_size = settings.batch_size))]
pub async fn run<W: Write>(
    source: &dyn IssueSource,
    recognizer: &dyn PiiRecognizer,
    settings: &ScanSettings,
    out: &mut W,
) -> Result<ScanSummary, ScanError> {
    let mut summary = ScanSummary::default();
    let mut page = 0u32;

    loop {
        let batch = source.fetch_page(page).await?;
        summary.pages += 1;
        summary.issues += batch.issues.len();
        debug!(page, issues = batch.issues.len(), has_next = batch.has_next, "fetched page");

        if batch.issues.is_empty() {
            debug!(page, "empty page, skipping analysis");
        }

        for chunk in batch.issues.chunks(settings.batch_size.max(1)) {
            let request = build_request(chunk, settings);
            let response = recognizer.recognize(&request).await?;
            summary.requests += 1;

            let results = response.results;
            debug!(
                page,
                kind = %response.kind,
                model_version = %results.model_version,
                documents = results.documents.len(),
                "analysis complete"
            );
            for failed in &results.errors {
                warn!(
                    id = %failed.id,
                    code = %failed.error.code,
                    "service rejected document: {}",
                    failed.error.message
                );
            }

            for result in results.documents {
                for warning in &result.warnings {
                    debug!(
                        id = %result.id,
                        code = %warning.code,
                        "service warning: {}",
                        warning.message
                    );
                }
                if let Some(flagged) = report::flag_document(result, settings.threshold) {
                    report::write_document(out, &flagged)?;
                    summary.flagged_documents += 1;
                    summary.flagged_entities += flagged.entities.len();
                }
            }
        }

        if !batch.has_next {
            break;
        }
        page += 1;
    }

    info!(
        pages = summary.pages,
        issues = summary.issues,
        flagged = summary.flagged_documents,
        "scan finished"
    );
    Ok(summary)
}
