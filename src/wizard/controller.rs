use std::sync::Arc;

use tokio::task::AbortHandle;

use crate::catalog::{Catalog, CatalogEntry};
use crate::config::Config;
use crate::errors::WizardError;
use crate::submission::{
    OutcomeReceiver, PendingSubmission, SubmissionOutcome, SubmissionReceipt, SubmissionRequest,
    SubmissionResolution, SubmissionSimulator,
};

use super::flow::{FlowKind, Step};
use super::gate::{blockers, Blocker};
use super::state::{update_field, AmountInput, Evidence, Field, Precision, Pricing, WizardState};

/// Input to the step reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    Update(Field),
    AttachEvidence(Evidence),
    ClearEvidence,
    Advance,
    Retreat,
    /// Direct index change used by progress-indicator navigation.
    JumpTo(usize),
    Reset,
}

/// Form state plus step position: everything the reducer owns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Machine {
    pub(crate) form: WizardState,
    pub(crate) index: usize,
}

impl Machine {
    pub fn form(&self) -> &WizardState {
        &self.form
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Read-only inputs shared by every reduction of one flow.
#[derive(Debug, Clone, Copy)]
pub struct FlowContext<'a> {
    pub flow: FlowKind,
    pub catalog: &'a Catalog,
    pub precision: Precision,
}

impl<'a> FlowContext<'a> {
    pub fn pricing(&self) -> Pricing<'a> {
        Pricing::new(
            self.catalog,
            self.flow.direction(),
            self.precision.for_kind(self.flow.entry_kind()),
        )
    }

    pub fn blockers_at(&self, machine: &Machine, index: usize) -> Vec<Blocker> {
        match self.flow.steps().get(index) {
            Some(step) => blockers(self.flow, *step, &machine.form, self.catalog),
            None => Vec::new(),
        }
    }
}

/// Pure transition function: `(state, event) -> state`.
pub fn reduce(context: &FlowContext<'_>, machine: &Machine, event: WizardEvent) -> Machine {
    let last = context.flow.steps().len().saturating_sub(1);
    match event {
        WizardEvent::Update(field) => Machine {
            form: update_field(&machine.form, field, &context.pricing()),
            index: machine.index,
        },
        WizardEvent::AttachEvidence(evidence) => Machine {
            form: machine.form.with_evidence(Some(evidence)),
            index: machine.index,
        },
        WizardEvent::ClearEvidence => Machine {
            form: machine.form.with_evidence(None),
            index: machine.index,
        },
        WizardEvent::Advance => {
            let open = context.blockers_at(machine, machine.index).is_empty();
            let index = if open && machine.index < last {
                machine.index + 1
            } else {
                machine.index
            };
            Machine {
                form: machine.form.clone(),
                index,
            }
        }
        WizardEvent::Retreat => Machine {
            form: machine.form.clone(),
            index: machine.index.saturating_sub(1),
        },
        WizardEvent::JumpTo(index) => Machine {
            form: machine.form.clone(),
            index: if index <= last { index } else { machine.index },
        },
        WizardEvent::Reset => Machine::default(),
    }
}

/// Result of pressing "Next".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved { from: Step, to: Step },
    Blocked(Vec<Blocker>),
    /// The last step submits instead of advancing.
    AtFinalStep,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Processing,
    Completed(SubmissionReceipt),
    Failed(String),
}

#[derive(Debug)]
struct InFlight {
    abort: AbortHandle,
    outcome: OutcomeReceiver,
}

/// One live flow: reducer state plus submission bookkeeping.
#[derive(Debug)]
pub struct Wizard {
    flow: FlowKind,
    catalog: Arc<Catalog>,
    precision: Precision,
    simulator: SubmissionSimulator,
    machine: Machine,
    status: SubmissionStatus,
    session: u64,
    in_flight: Option<InFlight>,
}

impl Wizard {
    pub fn new(flow: FlowKind, catalog: Arc<Catalog>) -> Self {
        Self {
            flow,
            catalog,
            precision: Precision::default(),
            simulator: SubmissionSimulator::default(),
            machine: Machine::default(),
            status: SubmissionStatus::Idle,
            session: 0,
            in_flight: None,
        }
    }

    pub fn with_config(flow: FlowKind, catalog: Arc<Catalog>, config: &Config) -> Self {
        Self::new(flow, catalog)
            .with_precision(Precision::from_config(config))
            .with_simulator(SubmissionSimulator::new(config.submission_delay()))
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_simulator(mut self, simulator: SubmissionSimulator) -> Self {
        self.simulator = simulator;
        self
    }

    fn context(&self) -> FlowContext<'_> {
        FlowContext {
            flow: self.flow,
            catalog: &self.catalog,
            precision: self.precision,
        }
    }

    fn dispatch(&mut self, event: WizardEvent) {
        let next = reduce(&self.context(), &self.machine, event);
        self.machine = next;
    }

    pub fn flow(&self) -> FlowKind {
        self.flow
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &WizardState {
        &self.machine.form
    }

    pub fn steps(&self) -> &'static [Step] {
        self.flow.steps()
    }

    pub fn step_index(&self) -> usize {
        self.machine.index
    }

    pub fn current_step(&self) -> Step {
        self.flow.steps()[self.machine.index]
    }

    pub fn is_final_step(&self) -> bool {
        self.machine.index + 1 == self.flow.steps().len()
    }

    pub fn selected_entry(&self) -> Option<&CatalogEntry> {
        self.state()
            .entry()
            .and_then(|id| self.catalog.entry(id))
            .filter(|entry| entry.kind == self.flow.entry_kind())
    }

    /// Rate applied to the current selection, if one is defined.
    pub fn rate(&self) -> Option<f64> {
        self.context().pricing().rate(self.state())
    }

    pub fn blockers(&self) -> Vec<Blocker> {
        self.context().blockers_at(&self.machine, self.machine.index)
    }

    /// Whether the Next control should be enabled.
    pub fn can_advance(&self) -> bool {
        !self.is_final_step() && self.blockers().is_empty()
    }

    /// Whether the Submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.is_final_step()
            && !matches!(
                self.status,
                SubmissionStatus::Processing | SubmissionStatus::Completed(_)
            )
            && self.first_blocked_step().is_none()
    }

    pub fn update(&mut self, field: Field) {
        self.dispatch(WizardEvent::Update(field));
    }

    /// Stores `evidence`, discarding any previous upload.
    pub fn attach_evidence(&mut self, evidence: Evidence) {
        tracing::debug!(
            file = %evidence.file_name,
            bytes = evidence.len(),
            "evidence attached"
        );
        self.dispatch(WizardEvent::AttachEvidence(evidence));
    }

    pub fn clear_evidence(&mut self) {
        self.dispatch(WizardEvent::ClearEvidence);
    }

    pub fn advance(&mut self) -> Advance {
        let from = self.current_step();
        if self.is_final_step() {
            return Advance::AtFinalStep;
        }
        let missing = self.blockers();
        if !missing.is_empty() {
            tracing::debug!(step = %from, blockers = missing.len(), "advance blocked");
            return Advance::Blocked(missing);
        }
        self.dispatch(WizardEvent::Advance);
        let to = self.current_step();
        tracing::debug!(flow = %self.flow, from = %from, to = %to, "advanced");
        Advance::Moved { from, to }
    }

    /// Steps back once. Returns `false` at the first step.
    pub fn retreat(&mut self) -> bool {
        if self.machine.index == 0 {
            return false;
        }
        self.dispatch(WizardEvent::Retreat);
        tracing::debug!(flow = %self.flow, to = %self.current_step(), "retreated");
        true
    }

    /// Sets the step index directly. Out-of-range indices are ignored.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.flow.steps().len() {
            return false;
        }
        self.dispatch(WizardEvent::JumpTo(index));
        true
    }

    /// Back to step zero with an empty form. Any pending submission is
    /// cancelled and its late result will be ignored.
    pub fn reset(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abort.abort();
        }
        self.session = self.session.wrapping_add(1);
        self.status = SubmissionStatus::Idle;
        self.dispatch(WizardEvent::Reset);
        tracing::debug!(flow = %self.flow, session = self.session, "wizard reset");
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.status, SubmissionStatus::Processing)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, SubmissionStatus::Completed(_))
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    fn first_blocked_step(&self) -> Option<Step> {
        let context = self.context();
        (0..self.flow.steps().len())
            .find(|index| !context.blockers_at(&self.machine, *index).is_empty())
            .map(|index| self.flow.steps()[index])
    }

    /// The request the current form would submit.
    pub fn request(&self) -> Option<SubmissionRequest> {
        let state = self.state();
        let entry_id = state.entry()?.to_string();
        let text = |value: &str| (!value.trim().is_empty()).then(|| value.to_string());
        Some(SubmissionRequest {
            flow: self.flow,
            direction: self.flow.direction(),
            entry_id,
            region: state.region().map(str::to_string),
            category: state.category().map(str::to_string),
            sub_type: state.sub_type().map(str::to_string),
            receipt_type: state.receipt_type().map(str::to_string),
            quantity: state.quantity(),
            local_amount: (state.amount_input() == AmountInput::LocalAmount)
                .then(|| state.local_amount()),
            total: state.total(),
            comment: text(state.comment()),
            card_number: text(state.card_number()),
            card_pin: text(state.card_pin()),
            email: text(state.email()),
            payment_method: state.payment_method().map(str::to_string),
            evidence_reference: state.evidence().map(|evidence| evidence.reference),
        })
    }

    /// Starts the simulated submission. Processing is set before this returns;
    /// completion arrives later through [`Wizard::resolve`].
    pub fn submit(&mut self) -> Result<PendingSubmission, WizardError> {
        self.poll_submission();
        match self.status {
            SubmissionStatus::Processing => return Err(WizardError::AlreadyProcessing),
            SubmissionStatus::Completed(_) => return Err(WizardError::AlreadyCompleted),
            SubmissionStatus::Idle | SubmissionStatus::Failed(_) => {}
        }
        let step = self.current_step();
        if !self.is_final_step() {
            return Err(WizardError::NotAtFinalStep(step));
        }
        if let Some(blocked) = self.first_blocked_step() {
            tracing::warn!(flow = %self.flow, step = %blocked, "submission refused");
            return Err(WizardError::StepIncomplete(blocked));
        }
        let request = self.request().ok_or(WizardError::StepIncomplete(step))?;
        let total = request.total;
        let pending = self.simulator.schedule(self.session, request)?;
        self.in_flight = Some(InFlight {
            abort: pending.abort_handle(),
            outcome: pending.subscribe(),
        });
        self.status = SubmissionStatus::Processing;
        tracing::info!(
            flow = %self.flow,
            session = self.session,
            total,
            delay_ms = self.simulator.delay().as_millis() as u64,
            "submission processing"
        );
        Ok(pending)
    }

    /// Applies the in-flight submission's outcome once it has settled, whether
    /// or not its [`PendingSubmission`] is still held. Returns `true` when the
    /// status changed.
    pub fn poll_submission(&mut self) -> bool {
        let Some(in_flight) = &self.in_flight else {
            return false;
        };
        let settled = (*in_flight.outcome.borrow()).clone();
        match settled {
            Some(outcome) => self.resolve(SubmissionResolution {
                session: self.session,
                outcome,
            }),
            None => false,
        }
    }

    /// Applies a settled submission. Returns `false` for results that belong to
    /// a reset session or arrive when nothing is processing.
    pub fn resolve(&mut self, resolution: SubmissionResolution) -> bool {
        if resolution.session != self.session || !self.is_processing() {
            tracing::warn!(
                issued = resolution.session,
                current = self.session,
                "ignoring stale submission result"
            );
            return false;
        }
        self.in_flight = None;
        self.status = match resolution.outcome {
            SubmissionOutcome::Approved(receipt) => {
                tracing::info!(reference = %receipt.reference, "submission completed");
                SubmissionStatus::Completed(receipt)
            }
            SubmissionOutcome::Rejected { reason } => {
                tracing::warn!(%reason, "submission rejected");
                SubmissionStatus::Failed(reason)
            }
        };
        true
    }
}
