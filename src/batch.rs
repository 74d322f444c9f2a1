//! Sequential best-effort batches over alert IDs.

use serde::Serialize;
use std::future::Future;
use tracing::{error, info};

use crate::error::GatewayError;

/// Tally of one batch call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub success_count: usize,
    pub fail_count: usize,
    pub total_count: usize,
}

impl BatchOutcome {
    /// Fire `on_success(successes, total)` if anything succeeded and `on_error(failures, total)`
    /// if anything failed. A mixed batch fires both, success first.
    pub fn report<S, E>(&self, on_success: S, on_error: E)
    where
        S: FnOnce(usize, usize),
        E: FnOnce(usize, usize),
    {
        if self.success_count > 0 {
            on_success(self.success_count, self.total_count);
        }
        if self.fail_count > 0 {
            on_error(self.fail_count, self.total_count);
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.fail_count == 0 && self.success_count == self.total_count
    }
}

/// Run `step` for each ID in order, awaiting each before starting the next.
///
/// A failing step is logged and counted; the rest of the batch still runs. An empty ID
/// list is rejected before anything is sent.
pub async fn run_sequential<'a, F, Fut>(
    operation: &'static str,
    ids: &'a [String],
    mut step: F,
) -> Result<BatchOutcome, GatewayError>
where
    F: FnMut(&'a str) -> Fut,
    Fut: Future<Output = Result<(), GatewayError>>,
{
    if ids.is_empty() {
        return Err(GatewayError::EmptyBatch(operation));
    }

    let mut outcome = BatchOutcome {
        total_count: ids.len(),
        ..Default::default()
    };

    for id in ids {
        match step(id.as_str()).await {
            Ok(()) => outcome.success_count += 1,
            Err(e) => {
                error!("{}: alert {} failed: {}", operation, id, e);
                outcome.fail_count += 1;
            }
        }
    }

    info!(
        "{}: {} succeeded, {} failed of {}",
        operation, outcome.success_count, outcome.fail_count, outcome.total_count
    );
    Ok(outcome)
}
