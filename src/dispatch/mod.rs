//! Sends actions to the backend and records what came back.
//!
//! Local validation happens before any call is made. Transport failures are
//! never returned as errors: they become [`ExecutionOutcome::Failed`] so a
//! batch run can carry on past them.

pub mod config;
pub mod transport;

pub use config::*;
pub use transport::*;

use crate::action::ActionId;
use crate::error::{SelectionError, TaskError, TransportError};
use crate::session::SessionState;
use serde_json::Value;
use std::time::Duration;

/// What happened to one dispatched action.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Completed {
        output: Value,
        float_fields: Vec<String>,
    },
    Failed {
        error: TransportError,
    },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Completed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub action: ActionId,
    /// 1-based position in the store.
    pub position: usize,
    pub message: String,
}

/// Tally of a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub success_count: usize,
    pub error_count: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.success_count + self.error_count
    }
}

pub struct Dispatcher<T: Transport> {
    transport: T,
    batch_delay: Duration,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn batch_delay(&self) -> Duration {
        self.batch_delay
    }

    /// Selects an environment and interface on the backend and loads the
    /// returned operations into the session.
    pub async fn select_environment(
        &self,
        session: &mut SessionState,
        environment: &str,
        interface: &str,
    ) -> Result<usize, SelectionError> {
        session
            .select_environment(&self.transport, environment, interface)
            .await
    }

    /// Runs one action. Local validation errors are returned before any call
    /// is made; a backend failure comes back as `Ok(ExecutionOutcome::Failed)`.
    pub async fn execute(
        &self,
        session: &mut SessionState,
        id: ActionId,
    ) -> Result<ExecutionOutcome, TaskError> {
        let request = session.prepare_execution(id)?;
        log::info!("Executing '{}' for {}", request.api_name, id);

        let outcome = match self.transport.execute(&request).await {
            Ok(response) => ExecutionOutcome::Completed {
                output: response.output,
                float_fields: response.float_fields,
            },
            Err(error) => {
                log::warn!("Execution of '{}' failed: {}", request.api_name, error);
                ExecutionOutcome::Failed { error }
            }
        };
        session.complete_execution(id, &outcome)?;
        Ok(outcome)
    }

    /// Runs every action in store order, one at a time, pausing between calls.
    ///
    /// Refuses to start when the store is empty or any action lacks an
    /// operation. Once started, individual failures are tallied and the run
    /// continues.
    pub async fn execute_all(&self, session: &mut SessionState) -> Result<BatchSummary, TaskError> {
        let ids = session.store().ids();
        if ids.is_empty() {
            return Err(TaskError::NoActions);
        }
        if let Some(position) = session
            .store()
            .iter()
            .position(|action| action.selected_operation().is_none())
        {
            return Err(TaskError::IncompleteBatch {
                position: position + 1,
            });
        }

        let total = ids.len();
        let mut summary = BatchSummary::default();
        for (index, id) in ids.into_iter().enumerate() {
            log::info!("Executing action {} of {}", index + 1, total);
            let failure = match self.execute(session, id).await {
                Ok(ExecutionOutcome::Completed { .. }) => None,
                Ok(ExecutionOutcome::Failed { error }) => Some(error.to_string()),
                Err(error) => Some(error.to_string()),
            };
            match failure {
                None => summary.success_count += 1,
                Some(message) => {
                    summary.error_count += 1;
                    summary.failures.push(BatchFailure {
                        action: id,
                        position: index + 1,
                        message,
                    });
                }
            }
            if index + 1 < total {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        log::info!(
            "Batch finished: {} succeeded, {} failed",
            summary.success_count,
            summary.error_count
        );
        Ok(summary)
    }
}

impl Dispatcher<HttpTransport> {
    /// HTTP dispatcher that pauses between batch calls as `config` says.
    pub fn from_config(config: ClientConfig) -> Result<Self, TransportError> {
        let delay = config.batch_delay;
        Ok(Self::new(HttpTransport::new(config)?).with_batch_delay(delay))
    }
}
