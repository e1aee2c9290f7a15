//! Plain-text review of a wizard's current selections.

use crate::catalog::EntryKind;
use crate::currency::format_local;

use super::controller::Wizard;

/// Label/value rows shown on review and status screens.
pub fn review_rows(wizard: &Wizard, currency: &str) -> Vec<(&'static str, String)> {
    let state = wizard.state();
    let kind = wizard.flow().entry_kind();
    let (entry_label, region_label, quantity_label) = match kind {
        EntryKind::Crypto => ("Asset", "Network", "Quantity"),
        EntryKind::GiftCard => ("Card", "Country", "Card value"),
    };

    let mut rows = vec![("Flow", wizard.flow().to_string())];
    let entry = wizard.selected_entry();
    match (entry, state.entry()) {
        (Some(entry), _) => rows.push((entry_label, entry.label.clone())),
        (None, Some(id)) => rows.push((entry_label, format!("{} (unavailable)", id))),
        (None, None) => rows.push((entry_label, "-".to_string())),
    }
    rows.push((region_label, state.region().unwrap_or("-").to_string()));
    rows.push(("Category", state.category().unwrap_or("-").to_string()));
    if let Some(sub_type) = state.sub_type() {
        rows.push(("Type", sub_type.to_string()));
    }
    if let Some(receipt) = state.receipt_type() {
        rows.push(("Receipt", receipt.to_string()));
    }
    if let Some(rate) = wizard.rate() {
        rows.push(("Rate", format_local(rate, currency)));
    }
    if wizard.flow().prices_from_local_amount() {
        rows.push(("Amount", format_local(state.local_amount(), currency)));
    }
    let quantity = if state.quantity_input().trim().is_empty() {
        "-".to_string()
    } else {
        state.quantity_input().to_string()
    };
    rows.push((quantity_label, quantity));
    if let Some(range) = entry.and_then(|entry| entry.value_range_for(state.quantity())) {
        rows.push(("Range", range.label.clone()));
    }
    rows.push(("Total", format_local(state.total(), currency)));
    if let Some(method) = state
        .payment_method()
        .and_then(|id| wizard.catalog().payment_method(id))
    {
        rows.push(("Payment", method.label.clone()));
    }
    if !state.email().is_empty() {
        rows.push(("Email", state.email().to_string()));
    }
    if !state.comment().trim().is_empty() {
        rows.push(("Comment", state.comment().trim().to_string()));
    }
    if let Some(evidence) = state.evidence() {
        rows.push((
            "Evidence",
            format!("{} ({} bytes)", evidence.file_name, evidence.len()),
        ));
    }
    if entry.map_or(false, |entry| entry.is_information_card) {
        rows.push(("Note", "information card, details are checked manually".to_string()));
    }
    rows
}

/// Renders [`review_rows`] as aligned `label: value` lines.
pub fn render_review(wizard: &Wizard, currency: &str) -> String {
    let rows = review_rows(wizard, currency);
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("{:<width$}  {}", format!("{}:", label), value, width = width + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
