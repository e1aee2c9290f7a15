//! Simulated transaction submission.
//!
//! A submission is a tokio task that waits a fixed latency and then asks a
//! [`SettlementBackend`] for the outcome. The task does not touch the wizard:
//! it publishes the outcome on a watch channel. The caller can await it through
//! [`PendingSubmission::wait`], and the wizard keeps its own receiver so
//! `Wizard::poll_submission` still settles a submission whose handle was
//! dropped. Resolutions carry the session that issued them, and the wizard
//! drops those from sessions that have since been reset.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::catalog::Direction;
use crate::config::DEFAULT_SUBMISSION_DELAY_MS;
use crate::errors::WizardError;
use crate::wizard::FlowKind;

/// Payload a real backend would receive for a finished wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub flow: FlowKind,
    pub direction: Direction,
    pub entry_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_type: Option<String>,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_amount: Option<f64>,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_pin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_reference: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub reference: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub total: f64,
}

impl SubmissionReceipt {
    pub fn for_request(request: &SubmissionRequest) -> Self {
        Self {
            reference: Uuid::new_v4(),
            submitted_at: Utc::now(),
            total: request.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Approved(SubmissionReceipt),
    Rejected { reason: String },
}

/// Decides how a submitted request settles.
pub trait SettlementBackend: Send + Sync + 'static {
    fn settle(&self, request: &SubmissionRequest) -> SubmissionOutcome;
}

/// Approves every request; the behavior of the shipped app.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproveAll;

impl SettlementBackend for ApproveAll {
    fn settle(&self, request: &SubmissionRequest) -> SubmissionOutcome {
        SubmissionOutcome::Approved(SubmissionReceipt::for_request(request))
    }
}

/// Schedules submissions with a fixed latency.
#[derive(Clone)]
pub struct SubmissionSimulator {
    delay: Duration,
    backend: Arc<dyn SettlementBackend>,
}

impl fmt::Debug for SubmissionSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionSimulator")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl Default for SubmissionSimulator {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SUBMISSION_DELAY_MS))
    }
}

impl SubmissionSimulator {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            backend: Arc::new(ApproveAll),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn SettlementBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Spawns the delayed settlement on the current tokio runtime.
    pub(crate) fn schedule(
        &self,
        session: u64,
        request: SubmissionRequest,
    ) -> Result<PendingSubmission, WizardError> {
        let runtime = Handle::try_current().map_err(|_| WizardError::NoRuntime)?;
        let delay = self.delay;
        let backend = Arc::clone(&self.backend);
        let (sender, outcome) = watch::channel(None);
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            sender.send_replace(Some(backend.settle(&request)));
        });
        Ok(PendingSubmission {
            session,
            abort: task.abort_handle(),
            outcome,
        })
    }
}

/// Latest settlement of one submission; `None` until the delay elapses.
pub(crate) type OutcomeReceiver = watch::Receiver<Option<SubmissionOutcome>>;

/// Handle to an in-flight submission.
#[derive(Debug)]
#[must_use = "await `wait` or call `Wizard::poll_submission` to learn the outcome"]
pub struct PendingSubmission {
    session: u64,
    abort: AbortHandle,
    outcome: OutcomeReceiver,
}

impl PendingSubmission {
    pub fn session(&self) -> u64 {
        self.session
    }

    pub(crate) fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub(crate) fn subscribe(&self) -> OutcomeReceiver {
        self.outcome.clone()
    }

    /// Waits for the settlement. `None` means the submission was cancelled.
    pub async fn wait(mut self) -> Option<SubmissionResolution> {
        let session = self.session;
        let settled = match self.outcome.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            Err(_) => None,
        };
        if settled.is_none() {
            tracing::debug!(session, "submission cancelled before settling");
        }
        settled.map(|outcome| SubmissionResolution { session, outcome })
    }
}

/// Settled result, applied with `Wizard::resolve`.
#[derive(Debug)]
pub struct SubmissionResolution {
    pub(crate) session: u64,
    pub(crate) outcome: SubmissionOutcome,
}

impl SubmissionResolution {
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn outcome(&self) -> &SubmissionOutcome {
        &self.outcome
    }
}
