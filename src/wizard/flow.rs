use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{Direction, EntryKind};

/// One of the four independent wizards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowKind {
    CryptoSell,
    CryptoBuy,
    #[serde(rename = "giftcard-sell")]
    GiftCardSell,
    #[serde(rename = "giftcard-buy")]
    GiftCardBuy,
}

/// Named stage of a flow. Each flow walks a fixed, ordered subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    SelectAsset,
    SelectCard,
    PaymentMethod,
    EnterDetails,
    EnterAmount,
    Review,
    SendCrypto,
    UploadProof,
    CompletePayment,
    UploadAndReview,
    Payment,
}

const CRYPTO_SELL_STEPS: [Step; 5] = [
    Step::SelectAsset,
    Step::EnterDetails,
    Step::Review,
    Step::SendCrypto,
    Step::UploadProof,
];

const CRYPTO_BUY_STEPS: [Step; 5] = [
    Step::SelectAsset,
    Step::PaymentMethod,
    Step::EnterAmount,
    Step::Review,
    Step::CompletePayment,
];

const GIFT_CARD_SELL_STEPS: [Step; 3] = [
    Step::SelectCard,
    Step::EnterDetails,
    Step::UploadAndReview,
];

const GIFT_CARD_BUY_STEPS: [Step; 3] = [Step::SelectCard, Step::EnterAmount, Step::Payment];

impl FlowKind {
    pub const ALL: [FlowKind; 4] = [
        FlowKind::CryptoSell,
        FlowKind::CryptoBuy,
        FlowKind::GiftCardSell,
        FlowKind::GiftCardBuy,
    ];

    pub fn steps(self) -> &'static [Step] {
        match self {
            FlowKind::CryptoSell => &CRYPTO_SELL_STEPS,
            FlowKind::CryptoBuy => &CRYPTO_BUY_STEPS,
            FlowKind::GiftCardSell => &GIFT_CARD_SELL_STEPS,
            FlowKind::GiftCardBuy => &GIFT_CARD_BUY_STEPS,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            FlowKind::CryptoSell | FlowKind::GiftCardSell => Direction::Sell,
            FlowKind::CryptoBuy | FlowKind::GiftCardBuy => Direction::Buy,
        }
    }

    pub fn entry_kind(self) -> EntryKind {
        match self {
            FlowKind::CryptoSell | FlowKind::CryptoBuy => EntryKind::Crypto,
            FlowKind::GiftCardSell | FlowKind::GiftCardBuy => EntryKind::GiftCard,
        }
    }

    /// Crypto purchases are priced from a local-currency amount rather than a quantity.
    pub fn prices_from_local_amount(self) -> bool {
        matches!(self, FlowKind::CryptoBuy)
    }

    pub fn slug(self) -> &'static str {
        match self {
            FlowKind::CryptoSell => "crypto-sell",
            FlowKind::CryptoBuy => "crypto-buy",
            FlowKind::GiftCardSell => "giftcard-sell",
            FlowKind::GiftCardBuy => "giftcard-buy",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for FlowKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(&['_', ' '][..], "-");
        let normalized = normalized.replace("gift-card", "giftcard");
        FlowKind::ALL
            .into_iter()
            .find(|flow| flow.slug() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown flow `{}` (expected one of: crypto-sell, crypto-buy, giftcard-sell, giftcard-buy)",
                    value
                )
            })
    }
}

impl Step {
    pub fn title(self) -> &'static str {
        match self {
            Step::SelectAsset => "Select Asset",
            Step::SelectCard => "Select Card",
            Step::PaymentMethod => "Payment Method",
            Step::EnterDetails => "Enter Details",
            Step::EnterAmount => "Enter Amount",
            Step::Review => "Review",
            Step::SendCrypto => "Send Crypto",
            Step::UploadProof => "Upload Proof",
            Step::CompletePayment => "Complete Payment",
            Step::UploadAndReview => "Upload & Review",
            Step::Payment => "Payment",
        }
    }

    /// Informational steps never block advancement.
    pub fn is_informational(self) -> bool {
        matches!(self, Step::Review | Step::SendCrypto)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
