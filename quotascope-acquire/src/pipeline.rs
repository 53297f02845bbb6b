//! Acquisition pipeline executing sources in cascade order.
//!
//! The pipeline takes an ordered list of usage sources and executes them one
//! at a time until a source yields a usable result. Order is the fallback
//! contract: a source's failure (or unusable result) is the precondition for
//! attempting the next, so sources never run concurrently.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use quotascope_core::{DateRange, ResourceGroupFilter};
use quotascope_inventory::Inventory;

use crate::context::AcquireContext;
use crate::error::AcquireError;
use crate::source::{result_is_usable, AcquiredUsage, SourceKind, UsageSource};

// ============================================================================
// Source Attempt
// ============================================================================

/// Record of a single source attempt.
#[derive(Debug, Clone)]
pub struct SourceAttempt {
    /// The source ID that was attempted.
    pub source_id: String,
    /// The kind of source.
    pub kind: SourceKind,
    /// Whether the attempt produced the accepted result.
    pub success: bool,
    /// Error or rejection reason if the attempt failed.
    pub error: Option<String>,
    /// How long the attempt took.
    pub duration: Duration,
}

impl SourceAttempt {
    /// Creates a successful attempt record.
    pub fn success(source_id: impl Into<String>, kind: SourceKind, duration: Duration) -> Self {
        Self {
            source_id: source_id.into(),
            kind,
            success: true,
            error: None,
            duration,
        }
    }

    /// Creates a failed attempt record.
    pub fn failure(
        source_id: impl Into<String>,
        kind: SourceKind,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            kind,
            success: false,
            error: Some(error.into()),
            duration,
        }
    }
}

// ============================================================================
// Acquire Outcome
// ============================================================================

/// The outcome of a pipeline execution.
#[derive(Debug)]
pub struct AcquireOutcome {
    /// The result (accepted usage or final error).
    pub result: Result<AcquiredUsage, AcquireError>,
    /// All attempts made, in cascade order.
    pub attempts: Vec<SourceAttempt>,
    /// Total duration of all attempts.
    pub duration: Duration,
}

impl AcquireOutcome {
    /// Returns true if acquisition succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the number of sources that were tried.
    pub fn attempts_count(&self) -> usize {
        self.attempts.len()
    }

    /// Returns the accepted source ID, if any.
    pub fn successful_source(&self) -> Option<&str> {
        self.result.as_ref().ok().map(|r| r.source_id.as_str())
    }

    /// Returns all errors that occurred along the cascade.
    pub fn errors(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter_map(|a| a.error.as_deref())
            .collect()
    }
}

// ============================================================================
// Acquisition Pipeline
// ============================================================================

/// An ordered cascade of usage sources.
///
/// Unlike a priority queue, the declaration order IS the cascade order;
/// callers list sources from highest to lowest fidelity.
pub struct AcquisitionPipeline {
    sources: Vec<Box<dyn UsageSource>>,
}

impl AcquisitionPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Creates a pipeline with the given sources, tried in the given order.
    pub fn with_sources(sources: Vec<Box<dyn UsageSource>>) -> Self {
        Self { sources }
    }

    /// Creates the standard four-source cascade over a discovered inventory.
    pub fn standard(inventory: Arc<Inventory>) -> Self {
        Self::with_sources(vec![
            Box::new(crate::sources::CostQuerySource::new()),
            Box::new(crate::sources::UsageDetailsSource::new()),
            Box::new(crate::sources::LegacyUsageSource::new()),
            Box::new(crate::sources::InventoryEstimateSource::new(inventory)),
        ])
    }

    /// Appends a source at the end of the cascade.
    pub fn add_source(&mut self, source: Box<dyn UsageSource>) {
        self.sources.push(source);
    }

    /// Returns the number of sources in the cascade.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if the cascade is empty.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Execute the cascade, stopping at the first usable result.
    #[instrument(skip(self, ctx, filter), fields(sources = self.sources.len(), range = %range))]
    pub async fn execute(
        &self,
        ctx: &AcquireContext,
        range: &DateRange,
        filter: Option<&ResourceGroupFilter>,
    ) -> AcquireOutcome {
        let start = Instant::now();
        let mut attempts = Vec::new();

        if self.sources.is_empty() {
            return AcquireOutcome {
                result: Err(AcquireError::AllSourcesFailed),
                attempts,
                duration: start.elapsed(),
            };
        }

        info!(count = self.sources.len(), "Executing acquisition cascade");

        for source in &self.sources {
            let source_id = source.id();
            let kind = source.kind();
            let attempt_start = Instant::now();

            debug!(source = %source_id, kind = %kind, "Attempting source");

            match source.acquire(ctx, range, filter).await {
                Ok(rows) => {
                    let duration = attempt_start.elapsed();
                    let usable = result_is_usable(&rows);

                    if usable || source.is_terminal() {
                        if !usable {
                            warn!(
                                source = %source_id,
                                "Terminal source produced no usable rows"
                            );
                        }
                        info!(
                            source = %source_id,
                            rows = rows.len(),
                            duration = ?duration,
                            "Source accepted"
                        );
                        attempts.push(SourceAttempt::success(source_id, kind, duration));
                        return AcquireOutcome {
                            result: Ok(AcquiredUsage::new(rows, source_id, kind)),
                            attempts,
                            duration: start.elapsed(),
                        };
                    }

                    warn!(
                        source = %source_id,
                        rows = rows.len(),
                        "Source returned unusable result, advancing cascade"
                    );
                    attempts.push(SourceAttempt::failure(
                        source_id,
                        kind,
                        AcquireError::UnusableResult.to_string(),
                        duration,
                    ));
                }
                Err(error) => {
                    let duration = attempt_start.elapsed();
                    warn!(
                        source = %source_id,
                        error = %error,
                        duration = ?duration,
                        "Source failed, advancing cascade"
                    );
                    attempts.push(SourceAttempt::failure(
                        source_id,
                        kind,
                        error.to_string(),
                        duration,
                    ));
                }
            }
        }

        warn!("All usage sources failed");
        AcquireOutcome {
            result: Err(AcquireError::AllSourcesFailed),
            attempts,
            duration: start.elapsed(),
        }
    }
}

impl Default for AcquisitionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
