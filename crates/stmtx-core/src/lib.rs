pub mod config;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod model;
pub mod normalize;
pub mod parsing;
pub mod sink;
pub mod transactions;

use tracing::warn;

use config::{validate_options, EngineOptions};
use engine::CancellationToken;
use error::StmtError;
use extraction::DocumentSource;
use formats::ExtractorChain;
use model::{ConversionSummary, ExtractionResult, Outcome};
use sink::TableSink;

/// Build the extractor chain selected by `options.formats`.
pub fn chain_for(options: &EngineOptions) -> Result<ExtractorChain, StmtError> {
    match options.formats {
        Some(ref names) => ExtractorChain::from_names(names.as_slice()),
        None => Ok(ExtractorChain::builtin()),
    }
}

/// Extract normalized transaction tables from a document.
///
/// Runs every page through the extractor chain (native tables, bank formats,
/// generic tables, raw text) and returns the tables in page order. Pages that
/// cannot be read are reported in `page_reports` and skipped.
pub fn extract_document(
    source: &dyn DocumentSource,
    options: &EngineOptions,
    cancel: &CancellationToken,
) -> Result<ExtractionResult, StmtError> {
    validate_options(options)?;
    let chain = chain_for(options)?;
    engine::extract(source, &chain, options, cancel)
}

/// Main API entry point: convert a statement into a spreadsheet.
///
/// Never fails. Every problem, from an unreadable document to a sink that
/// cannot be written, comes back as an outcome plus a message the caller can
/// show as is. The sink is written only when the outcome is a success.
pub fn convert(
    source: &dyn DocumentSource,
    sink: &mut dyn TableSink,
    options: &EngineOptions,
) -> ConversionSummary {
    convert_with_cancellation(source, sink, options, &CancellationToken::new())
}

/// Same as [`convert`], stopping at the next page boundary once `cancel` fires.
pub fn convert_with_cancellation(
    source: &dyn DocumentSource,
    sink: &mut dyn TableSink,
    options: &EngineOptions,
    cancel: &CancellationToken,
) -> ConversionSummary {
    let result = match extract_document(source, options, cancel) {
        Ok(result) => result,
        Err(e @ (StmtError::ConfigInvalid(_) | StmtError::WorkerPool(_))) => {
            return failed(0, e.to_string());
        }
        Err(e) => {
            warn!(error = %e, "document unreadable");
            return failed(0, format!("Could not read document: {}", reason(&e)));
        }
    };

    let message = engine::summarize(&result);
    if result.outcome.is_success() {
        if let Err(e) = sink.write(&result) {
            warn!(error = %e, "spreadsheet write failed");
            return failed(
                result.pages_processed,
                format!("Could not write spreadsheet: {}", reason(&e)),
            );
        }
    }

    ConversionSummary {
        outcome: result.outcome,
        pages_processed: result.pages_processed,
        message,
    }
}

fn failed(pages_processed: usize, message: String) -> ConversionSummary {
    ConversionSummary {
        outcome: Outcome::Failed,
        pages_processed,
        message,
    }
}

/// Error text without the variant prefix.
fn reason(e: &StmtError) -> String {
    match e {
        StmtError::DocumentUnreadable(reason) | StmtError::SinkWrite(reason) => reason.clone(),
        other => other.to_string(),
    }
}
