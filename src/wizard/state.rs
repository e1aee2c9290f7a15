//! Wizard form state and the derived-value recalculator.
//!
//! `update_field` is pure: it never mutates the prior state and never fails.
//! Totals are derived here and nowhere else, so `total == quantity * rate`
//! holds for every state it returns.

use std::fs;
use std::io;
use std::path::Path;

use uuid::Uuid;

use crate::catalog::{Catalog, Direction, EntryKind};
use crate::config::{Config, DEFAULT_CRYPTO_PRECISION, DEFAULT_FIAT_PRECISION};
use crate::currency::{format_fixed, parse_lenient, round_to};

/// A single user edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Entry(String),
    Region(String),
    Category(String),
    SubType(String),
    ReceiptType(String),
    Quantity(String),
    LocalAmount(String),
    Comment(String),
    CardNumber(String),
    CardPin(String),
    Email(String),
    PaymentMethod(String),
    TermsAccepted(bool),
    DetailsConfirmed(bool),
}

impl Field {
    fn name(&self) -> &'static str {
        match self {
            Field::Entry(_) => "entry",
            Field::Region(_) => "region",
            Field::Category(_) => "category",
            Field::SubType(_) => "sub_type",
            Field::ReceiptType(_) => "receipt_type",
            Field::Quantity(_) => "quantity",
            Field::LocalAmount(_) => "local_amount",
            Field::Comment(_) => "comment",
            Field::CardNumber(_) => "card_number",
            Field::CardPin(_) => "card_pin",
            Field::Email(_) => "email",
            Field::PaymentMethod(_) => "payment_method",
            Field::TermsAccepted(_) => "terms_accepted",
            Field::DetailsConfirmed(_) => "details_confirmed",
        }
    }
}

/// Uploaded image held in memory until the wizard is reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    pub reference: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Evidence {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            reference: Uuid::new_v4(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn from_path(path: &Path) -> io::Result<Self> {
        let data = fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        let content_type = content_type_for(path);
        Ok(Self::new(file_name, content_type, data))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Which amount the user typed last; the other one is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmountInput {
    #[default]
    Quantity,
    LocalAmount,
}

/// Fractional digits kept when deriving a quantity from a local amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    pub crypto: u32,
    pub fiat: u32,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            crypto: DEFAULT_CRYPTO_PRECISION,
            fiat: DEFAULT_FIAT_PRECISION,
        }
    }
}

impl Precision {
    pub fn from_config(config: &Config) -> Self {
        Self {
            crypto: config.crypto_precision,
            fiat: config.fiat_precision,
        }
    }

    pub fn for_kind(&self, kind: EntryKind) -> u32 {
        match kind {
            EntryKind::Crypto => self.crypto,
            EntryKind::GiftCard => self.fiat,
        }
    }
}

/// Rate lookups for one flow: catalog, trade direction and rounding precision.
#[derive(Debug, Clone, Copy)]
pub struct Pricing<'a> {
    pub catalog: &'a Catalog,
    pub direction: Direction,
    pub precision: u32,
}

impl<'a> Pricing<'a> {
    pub fn new(catalog: &'a Catalog, direction: Direction, precision: u32) -> Self {
        Self {
            catalog,
            direction,
            precision,
        }
    }

    /// Rate applicable to the state's current entry and category, if any.
    pub fn rate(&self, state: &WizardState) -> Option<f64> {
        let entry = state.entry.as_deref()?;
        let category = state.category.as_deref()?;
        self.catalog.rate(entry, category, self.direction)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub(crate) entry: Option<String>,
    pub(crate) region: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) sub_type: Option<String>,
    pub(crate) receipt_type: Option<String>,
    pub(crate) quantity_input: String,
    pub(crate) quantity: f64,
    pub(crate) local_amount_input: String,
    pub(crate) local_amount: f64,
    pub(crate) amount_input: AmountInput,
    pub(crate) total: f64,
    pub(crate) amount_overflow: bool,
    pub(crate) comment: String,
    pub(crate) card_number: String,
    pub(crate) card_pin: String,
    pub(crate) email: String,
    pub(crate) payment_method: Option<String>,
    pub(crate) terms_accepted: bool,
    pub(crate) details_confirmed: bool,
    pub(crate) evidence: Option<Evidence>,
}

impl WizardState {
    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn sub_type(&self) -> Option<&str> {
        self.sub_type.as_deref()
    }

    pub fn receipt_type(&self) -> Option<&str> {
        self.receipt_type.as_deref()
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// The quantity as typed, or as derived from a local amount.
    pub fn quantity_input(&self) -> &str {
        &self.quantity_input
    }

    pub fn local_amount(&self) -> f64 {
        self.local_amount
    }

    pub fn amount_input(&self) -> AmountInput {
        self.amount_input
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Whether the last recalculation left the representable range. Quantity
    /// and total are zeroed when this is set.
    pub fn amount_overflow(&self) -> bool {
        self.amount_overflow
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    pub fn card_pin(&self) -> &str {
        &self.card_pin
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    pub fn details_confirmed(&self) -> bool {
        self.details_confirmed
    }

    pub fn evidence(&self) -> Option<&Evidence> {
        self.evidence.as_ref()
    }

    /// Returns a copy holding `evidence`, dropping whatever was uploaded before.
    pub fn with_evidence(&self, evidence: Option<Evidence>) -> Self {
        Self {
            evidence,
            ..self.clone()
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_amount(input: &str) -> f64 {
    parse_lenient(input).max(0.0)
}

/// Applies one field edit and recomputes whatever depends on it.
pub fn update_field(state: &WizardState, field: Field, pricing: &Pricing<'_>) -> WizardState {
    let name = field.name();
    let mut next = state.clone();
    let reprice = match field {
        Field::Entry(id) => {
            next.entry = non_empty(id);
            next.region = None;
            next.category = None;
            next.sub_type = None;
            next.receipt_type = None;
            true
        }
        Field::Category(category) => {
            next.category = non_empty(category);
            true
        }
        Field::Quantity(input) => {
            next.quantity = parse_amount(&input);
            next.quantity_input = input;
            next.local_amount = 0.0;
            next.local_amount_input.clear();
            next.amount_input = AmountInput::Quantity;
            true
        }
        Field::LocalAmount(input) => {
            next.local_amount = parse_amount(&input);
            next.local_amount_input = input;
            next.amount_input = AmountInput::LocalAmount;
            true
        }
        Field::Region(region) => {
            next.region = non_empty(region);
            false
        }
        Field::SubType(sub_type) => {
            next.sub_type = non_empty(sub_type);
            false
        }
        Field::ReceiptType(receipt_type) => {
            next.receipt_type = non_empty(receipt_type);
            false
        }
        Field::Comment(comment) => {
            next.comment = comment;
            false
        }
        Field::CardNumber(number) => {
            next.card_number = number.trim().to_string();
            false
        }
        Field::CardPin(pin) => {
            next.card_pin = pin.trim().to_string();
            false
        }
        Field::Email(email) => {
            next.email = email.trim().to_string();
            false
        }
        Field::PaymentMethod(method) => {
            next.payment_method = non_empty(method);
            false
        }
        Field::TermsAccepted(accepted) => {
            next.terms_accepted = accepted;
            false
        }
        Field::DetailsConfirmed(confirmed) => {
            next.details_confirmed = confirmed;
            false
        }
    };

    if reprice {
        recalculate(&mut next, pricing);
        tracing::debug!(field = name, total = next.total, "field updated, total recomputed");
    } else {
        tracing::debug!(field = name, "field updated");
    }
    next
}

fn recalculate(state: &mut WizardState, pricing: &Pricing<'_>) {
    let rate = pricing.rate(state);
    state.amount_overflow = false;
    if state.amount_input == AmountInput::LocalAmount {
        match rate.filter(|rate| *rate > 0.0) {
            Some(rate) if state.local_amount > 0.0 => {
                let quantity = state.local_amount / rate;
                if quantity.is_finite() {
                    let quantity = round_to(quantity, pricing.precision);
                    state.quantity = quantity;
                    state.quantity_input = format_fixed(quantity, pricing.precision);
                } else {
                    state.quantity = 0.0;
                    state.quantity_input.clear();
                    state.amount_overflow = true;
                }
            }
            _ => {
                state.quantity = 0.0;
                state.quantity_input.clear();
            }
        }
    }
    let total = match rate {
        Some(rate) => state.quantity * rate,
        None => 0.0,
    };
    if total.is_finite() {
        state.total = total;
    } else {
        // The typed quantity text is kept so it can be corrected.
        state.quantity = 0.0;
        state.total = 0.0;
        state.amount_overflow = true;
    }
    if state.amount_overflow {
        tracing::warn!(
            quantity = %state.quantity_input,
            local_amount = state.local_amount,
            "amount out of range, total cleared"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, Category};

    fn sell_pricing(catalog: &Catalog) -> Pricing<'_> {
        Pricing::new(catalog, Direction::Sell, 8)
    }

    fn apply(state: WizardState, fields: Vec<Field>, pricing: &Pricing<'_>) -> WizardState {
        fields
            .into_iter()
            .fold(state, |state, field| update_field(&state, field, pricing))
    }

    #[test]
    fn usdt_standard_sell_total() {
        let catalog = Catalog::builtin();
        let pricing = sell_pricing(&catalog);
        let state = apply(
            WizardState::default(),
            vec![
                Field::Entry("USDT".into()),
                Field::Category("Standard".into()),
                Field::Quantity("100".into()),
            ],
            &pricing,
        );
        assert_eq!(state.total(), 157_500.0);
    }

    #[test]
    fn entry_change_resets_sub_selections_every_time() {
        let catalog = Catalog::builtin();
        let pricing = sell_pricing(&catalog);
        let selected = apply(
            WizardState::default(),
            vec![
                Field::Entry("USDT".into()),
                Field::Region("TRC20".into()),
                Field::Category("Standard".into()),
                Field::Quantity("10".into()),
            ],
            &pricing,
        );
        assert!(selected.total() > 0.0);

        let reselected = update_field(&selected, Field::Entry("USDT".into()), &pricing);
        assert_eq!(reselected.region(), None);
        assert_eq!(reselected.category(), None);
        assert_eq!(reselected.total(), 0.0);
        assert_eq!(reselected.quantity_input(), "10");

        let again = update_field(
            &update_field(&reselected, Field::Region("ERC20".into()), &pricing),
            Field::Entry("USDT".into()),
            &pricing,
        );
        assert_eq!(again.region(), None);
    }

    #[test]
    fn non_total_fields_leave_total_untouched() {
        let catalog = Catalog::builtin();
        let pricing = sell_pricing(&catalog);
        let state = apply(
            WizardState::default(),
            vec![
                Field::Entry("ETH".into()),
                Field::Category("Standard".into()),
                Field::Quantity("2".into()),
            ],
            &pricing,
        );
        let commented = apply(
            state.clone(),
            vec![
                Field::Comment("thanks".into()),
                Field::Region("ERC20".into()),
                Field::TermsAccepted(true),
            ],
            &pricing,
        );
        assert_eq!(commented.total(), state.total());
        assert_eq!(commented.total(), 3_500_000.0);
    }

    #[test]
    fn garbage_quantity_degrades_to_zero() {
        let catalog = Catalog::builtin();
        let pricing = sell_pricing(&catalog);
        let state = apply(
            WizardState::default(),
            vec![
                Field::Entry("BTC".into()),
                Field::Category("Standard".into()),
                Field::Quantity("twelve".into()),
            ],
            &pricing,
        );
        assert_eq!(state.quantity(), 0.0);
        assert_eq!(state.total(), 0.0);
        assert_eq!(state.quantity_input(), "twelve");

        let negative = update_field(&state, Field::Quantity("-3".into()), &pricing);
        assert_eq!(negative.total(), 0.0);
    }

    #[test]
    fn local_amount_derives_quantity_at_crypto_precision() {
        let catalog = Catalog::builtin();
        let pricing = Pricing::new(&catalog, Direction::Buy, 8);
        let state = apply(
            WizardState::default(),
            vec![
                Field::Entry("BTC".into()),
                Field::LocalAmount("2650000".into()),
            ],
            &pricing,
        );
        assert_eq!(state.quantity_input(), "");
        assert_eq!(state.total(), 0.0);

        let priced = update_field(&state, Field::Category("Standard".into()), &pricing);
        assert_eq!(priced.quantity_input(), "0.10000000");
        assert!((priced.quantity() - 0.1).abs() < 1e-12);
        assert_eq!(priced.total(), priced.quantity() * 26_500_000.0);
    }

    #[test]
    fn gift_card_local_amount_rounds_to_two_places() {
        let catalog = Catalog::builtin();
        let pricing = Pricing::new(&catalog, Direction::Buy, 2);
        let state = apply(
            WizardState::default(),
            vec![
                Field::Entry("steam".into()),
                Field::Category("Standard".into()),
                Field::LocalAmount("10001".into()),
            ],
            &pricing,
        );
        assert_eq!(state.quantity_input(), "20.00");
        assert_eq!(state.total(), 10_000.0);
    }

    #[test]
    fn oversized_quantity_clears_total() {
        let catalog = Catalog::builtin();
        let pricing = sell_pricing(&catalog);
        let state = apply(
            WizardState::default(),
            vec![
                Field::Entry("BTC".into()),
                Field::Category("Standard".into()),
                Field::Quantity("1e305".into()),
            ],
            &pricing,
        );
        assert!(state.amount_overflow());
        assert_eq!(state.total(), 0.0);
        assert_eq!(state.quantity(), 0.0);
        assert_eq!(state.quantity_input(), "1e305");

        let corrected = update_field(&state, Field::Quantity("2".into()), &pricing);
        assert!(!corrected.amount_overflow());
        assert_eq!(corrected.total(), 53_000_000.0);
    }

    #[test]
    fn huge_local_amount_keeps_values_finite() {
        let catalog = Catalog::builtin();
        let pricing = Pricing::new(&catalog, Direction::Buy, 8);
        let state = apply(
            WizardState::default(),
            vec![
                Field::Entry("USDT".into()),
                Field::Category("Standard".into()),
                Field::LocalAmount("1e305".into()),
            ],
            &pricing,
        );
        assert!(state.quantity().is_finite());
        assert!(state.total().is_finite());
        assert_ne!(state.quantity_input(), "inf");
    }

    #[test]
    fn local_amount_overflowing_quantity_is_flagged() {
        let dust = CatalogEntry {
            id: "DUST".into(),
            label: "Dust".into(),
            icon: String::new(),
            color: String::new(),
            kind: EntryKind::Crypto,
            regions: vec!["DUST".into()],
            categories: vec![Category::new("Standard", 1e-300, 1e-300)],
            sub_types: Vec::new(),
            receipt_types: Vec::new(),
            value_ranges: Vec::new(),
            requires_front_back: false,
            is_information_card: false,
        };
        let catalog = Catalog::new(vec![dust], Vec::new()).unwrap();
        let pricing = Pricing::new(&catalog, Direction::Buy, 8);
        let state = apply(
            WizardState::default(),
            vec![
                Field::Entry("DUST".into()),
                Field::Category("Standard".into()),
                Field::LocalAmount("1e10".into()),
            ],
            &pricing,
        );
        assert!(state.amount_overflow());
        assert_eq!(state.quantity(), 0.0);
        assert_eq!(state.quantity_input(), "");
        assert_eq!(state.total(), 0.0);
    }

    #[test]
    fn replacing_evidence_drops_previous_blob() {
        let first = Evidence::new("front.png", "image/png", vec![1, 2, 3]);
        let second = Evidence::new("back.png", "image/png", vec![4]);
        let state = WizardState::default().with_evidence(Some(first));
        let replaced = state.with_evidence(Some(second.clone()));
        assert_eq!(replaced.evidence(), Some(&second));
        assert_eq!(replaced.evidence().map(Evidence::len), Some(1));
    }
}
