//! Static rate catalog shared by the crypto and gift-card wizards.
//!
//! A catalog is immutable once built. Wizards receive it as an `Arc<Catalog>`
//! at construction and only ever read from it.

mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::CatalogError;

/// Which side of the trade the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "buy"),
            Direction::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Crypto,
    GiftCard,
}

/// A rate-bearing variant of an entry (receipt type, card condition, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub buy_rate: f64,
    pub sell_rate: f64,
}

impl Category {
    pub fn new(name: impl Into<String>, sell_rate: f64, buy_rate: f64) -> Self {
        Self {
            name: name.into(),
            buy_rate,
            sell_rate,
        }
    }

    pub fn rate(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Buy => self.buy_rate,
            Direction::Sell => self.sell_rate,
        }
    }
}

/// Advisory amount band shown next to crypto inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub name: String,
    pub label: String,
    pub min_amount: f64,
    pub max_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub color: String,
    pub kind: EntryKind,
    /// Networks for crypto assets, countries for gift cards.
    pub regions: Vec<String>,
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receipt_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_ranges: Vec<ValueRange>,
    #[serde(default)]
    pub requires_front_back: bool,
    #[serde(default)]
    pub is_information_card: bool,
}

impl CatalogEntry {
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    pub fn has_region(&self, region: &str) -> bool {
        self.regions.iter().any(|candidate| candidate == region)
    }

    pub fn has_sub_type(&self, sub_type: &str) -> bool {
        self.sub_types.iter().any(|candidate| candidate == sub_type)
    }

    pub fn has_receipt_type(&self, receipt_type: &str) -> bool {
        self.receipt_types
            .iter()
            .any(|candidate| candidate == receipt_type)
    }

    /// Band containing `quantity`, if the entry defines value ranges.
    pub fn value_range_for(&self, quantity: f64) -> Option<&ValueRange> {
        self.value_ranges
            .iter()
            .find(|range| quantity >= range.min_amount && quantity < range.max_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub label: String,
    pub description: String,
    /// Whether a proof-of-payment image must accompany the submission.
    #[serde(default)]
    pub requires_proof: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<BankAccount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_cards: Vec<String>,
}

#[derive(Deserialize)]
struct CatalogFile {
    entries: Vec<CatalogEntry>,
    #[serde(default)]
    payment_methods: Vec<PaymentMethod>,
}

/// Read-only lookup of entries, categories and rates.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    payment_methods: Vec<PaymentMethod>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids, empty lists and negative rates.
    pub fn new(
        entries: Vec<CatalogEntry>,
        payment_methods: Vec<PaymentMethod>,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            validate_entry(entry)?;
            if index.insert(entry.id.clone(), position).is_some() {
                return Err(CatalogError::Invalid(format!(
                    "duplicate entry id `{}`",
                    entry.id
                )));
            }
        }
        Ok(Self {
            entries,
            index,
            payment_methods,
        })
    }

    /// The crypto assets, gift cards and payment methods the app ships with.
    pub fn builtin() -> Self {
        let mut entries = builtin::crypto_assets();
        entries.extend(builtin::gift_cards());
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            index.insert(entry.id.clone(), position);
        }
        Self {
            entries,
            index,
            payment_methods: builtin::payment_methods(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.entries, file.payment_methods)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let data = fs::read_to_string(path)?;
        let catalog = Self::from_json(&data)?;
        tracing::info!(
            path = %path.display(),
            entries = catalog.entries.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn entry(&self, id: &str) -> Option<&CatalogEntry> {
        self.index.get(id).map(|&position| &self.entries[position])
    }

    pub fn require_entry(&self, id: &str) -> Result<&CatalogEntry, CatalogError> {
        self.entry(id)
            .ok_or_else(|| CatalogError::UnknownEntry(id.to_string()))
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn entries_of(&self, kind: EntryKind) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    /// Entries of `kind` whose label contains `term`, ignoring case.
    pub fn search(&self, kind: EntryKind, term: &str) -> Vec<&CatalogEntry> {
        let needle = term.trim().to_lowercase();
        self.entries_of(kind)
            .filter(|entry| needle.is_empty() || entry.label.to_lowercase().contains(&needle))
            .collect()
    }

    /// Rate for an (entry, category, direction) triple, `None` if it does not exist.
    pub fn rate(&self, entry_id: &str, category: &str, direction: Direction) -> Option<f64> {
        self.entry(entry_id)?
            .category(category)
            .map(|category| category.rate(direction))
    }

    pub fn payment_method(&self, id: &str) -> Option<&PaymentMethod> {
        self.payment_methods.iter().find(|method| method.id == id)
    }

    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }
}

fn validate_entry(entry: &CatalogEntry) -> Result<(), CatalogError> {
    if entry.id.trim().is_empty() {
        return Err(CatalogError::Invalid("entry with empty id".into()));
    }
    if entry.regions.is_empty() {
        return Err(CatalogError::Invalid(format!(
            "entry `{}` lists no regions",
            entry.id
        )));
    }
    if entry.categories.is_empty() {
        return Err(CatalogError::Invalid(format!(
            "entry `{}` lists no categories",
            entry.id
        )));
    }
    for category in &entry.categories {
        let valid = |rate: f64| rate.is_finite() && rate >= 0.0;
        if !valid(category.buy_rate) || !valid(category.sell_rate) {
            return Err(CatalogError::Invalid(format!(
                "entry `{}` category `{}` has an invalid rate",
                entry.id, category.name
            )));
        }
    }
    Ok(())
}
