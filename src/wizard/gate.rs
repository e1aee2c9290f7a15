//! Per-step validation predicates.
//!
//! A step is open when `blockers` returns an empty list. Blockers are plain
//! values, not errors: callers use them to keep the Next/Submit control
//! disabled and to tell the user what is still missing.

use std::fmt;

use crate::catalog::{Catalog, CatalogEntry};

use super::flow::{FlowKind, Step};
use super::state::{AmountInput, WizardState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocker {
    EntryMissing,
    UnknownEntry(String),
    RegionMissing,
    CategoryMissing,
    PaymentMethodMissing,
    AmountNotPositive,
    AmountTooLarge,
    LocalAmountRequired,
    TermsNotAccepted,
    DetailsNotConfirmed,
    SubTypeMissing,
    CardNumberMissing,
    CardPinMissing,
    ReceiptTypeMissing,
    EmailMissing,
    EvidenceMissing,
    EvidenceNotImage,
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blocker::EntryMissing => write!(f, "choose an asset or card"),
            Blocker::UnknownEntry(id) => write!(f, "`{}` is not available in this flow", id),
            Blocker::RegionMissing => write!(f, "choose a supported network or country"),
            Blocker::CategoryMissing => write!(f, "choose a rate category"),
            Blocker::PaymentMethodMissing => write!(f, "choose a payment method"),
            Blocker::AmountNotPositive => write!(f, "enter an amount greater than zero"),
            Blocker::AmountTooLarge => write!(f, "the amount is too large to price"),
            Blocker::LocalAmountRequired => write!(
                f,
                "enter the amount to spend with `amount`; the quantity is derived from it"
            ),
            Blocker::TermsNotAccepted => write!(f, "accept the terms"),
            Blocker::DetailsNotConfirmed => write!(f, "confirm the transaction details"),
            Blocker::SubTypeMissing => write!(f, "choose a card type"),
            Blocker::CardNumberMissing => write!(f, "enter the card number"),
            Blocker::CardPinMissing => write!(f, "enter the card PIN"),
            Blocker::ReceiptTypeMissing => write!(f, "choose a receipt type"),
            Blocker::EmailMissing => write!(f, "enter a delivery email"),
            Blocker::EvidenceMissing => write!(f, "upload an image"),
            Blocker::EvidenceNotImage => write!(f, "the upload must be an image"),
        }
    }
}

/// Everything keeping `step` from being completed in `flow`.
pub fn blockers(flow: FlowKind, step: Step, state: &WizardState, catalog: &Catalog) -> Vec<Blocker> {
    let mut missing = Vec::new();
    let entry = state
        .entry()
        .and_then(|id| catalog.entry(id))
        .filter(|entry| entry.kind == flow.entry_kind());

    match step {
        Step::SelectAsset | Step::SelectCard => selection(state, entry, &mut missing),
        Step::PaymentMethod => payment_method(state, catalog, &mut missing),
        Step::EnterDetails | Step::EnterAmount => details(flow, state, entry, &mut missing),
        Step::Review | Step::SendCrypto => {}
        Step::UploadProof => evidence(state, &mut missing),
        Step::UploadAndReview => {
            if entry.map_or(false, |entry| entry.requires_front_back) {
                evidence(state, &mut missing);
            }
        }
        Step::CompletePayment | Step::Payment => {
            payment_method(state, catalog, &mut missing);
            let needs_proof = state
                .payment_method()
                .and_then(|id| catalog.payment_method(id))
                .map_or(false, |method| method.requires_proof);
            if needs_proof {
                evidence(state, &mut missing);
            }
        }
    }
    missing
}

fn selection(state: &WizardState, entry: Option<&CatalogEntry>, missing: &mut Vec<Blocker>) {
    let Some(entry) = entry else {
        match state.entry() {
            Some(id) => missing.push(Blocker::UnknownEntry(id.to_string())),
            None => missing.push(Blocker::EntryMissing),
        }
        missing.push(Blocker::RegionMissing);
        missing.push(Blocker::CategoryMissing);
        return;
    };
    if !state.region().map_or(false, |region| entry.has_region(region)) {
        missing.push(Blocker::RegionMissing);
    }
    if state.category().and_then(|name| entry.category(name)).is_none() {
        missing.push(Blocker::CategoryMissing);
    }
}

fn evidence(state: &WizardState, missing: &mut Vec<Blocker>) {
    match state.evidence() {
        None => missing.push(Blocker::EvidenceMissing),
        Some(evidence) if !evidence.is_image() => missing.push(Blocker::EvidenceNotImage),
        Some(_) => {}
    }
}

fn payment_method(state: &WizardState, catalog: &Catalog, missing: &mut Vec<Blocker>) {
    let known = state
        .payment_method()
        .and_then(|id| catalog.payment_method(id))
        .is_some();
    if !known {
        missing.push(Blocker::PaymentMethodMissing);
    }
}

fn details(
    flow: FlowKind,
    state: &WizardState,
    entry: Option<&CatalogEntry>,
    missing: &mut Vec<Blocker>,
) {
    let amount = if flow.prices_from_local_amount() {
        state.local_amount()
    } else {
        state.quantity()
    };
    if state.amount_overflow() {
        missing.push(Blocker::AmountTooLarge);
    } else if amount <= 0.0 {
        let typed_quantity =
            state.amount_input() == AmountInput::Quantity && state.quantity() > 0.0;
        if flow.prices_from_local_amount() && typed_quantity {
            missing.push(Blocker::LocalAmountRequired);
        } else {
            missing.push(Blocker::AmountNotPositive);
        }
    }
    if !state.terms_accepted() {
        missing.push(Blocker::TermsNotAccepted);
    }
    if !state.details_confirmed() {
        missing.push(Blocker::DetailsNotConfirmed);
    }

    if let Some(entry) = entry {
        if !entry.sub_types.is_empty()
            && !state.sub_type().map_or(false, |sub| entry.has_sub_type(sub))
        {
            missing.push(Blocker::SubTypeMissing);
        }
    }

    match flow {
        FlowKind::GiftCardSell => {
            if state.card_number().is_empty() {
                missing.push(Blocker::CardNumberMissing);
            }
            if state.card_pin().is_empty() {
                missing.push(Blocker::CardPinMissing);
            }
            if let Some(entry) = entry {
                if !entry.receipt_types.is_empty()
                    && !state
                        .receipt_type()
                        .map_or(false, |receipt| entry.has_receipt_type(receipt))
                {
                    missing.push(Blocker::ReceiptTypeMissing);
                }
            }
        }
        FlowKind::GiftCardBuy => {
            if state.email().is_empty() {
                missing.push(Blocker::EmailMissing);
            }
        }
        FlowKind::CryptoSell | FlowKind::CryptoBuy => {}
    }
}
