//! Multi-step buy/sell wizards.
//!
//! Four flows share one engine: a pure field reducer ([`update_field`]) that
//! keeps derived totals consistent, a pure step reducer ([`reduce`]) gated by
//! per-step [`blockers`], and a [`Wizard`] that owns one flow instance and its
//! simulated submission.

mod controller;
mod flow;
mod gate;
mod state;
pub mod summary;

pub use controller::{
    reduce, Advance, FlowContext, Machine, SubmissionStatus, Wizard, WizardEvent,
};
pub use flow::{FlowKind, Step};
pub use gate::{blockers, Blocker};
pub use state::{update_field, AmountInput, Evidence, Field, Precision, Pricing, WizardState};
