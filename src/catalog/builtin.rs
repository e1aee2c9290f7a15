use super::{BankAccount, CatalogEntry, Category, EntryKind, PaymentMethod, ValueRange};

const STANDARD: &str = "Standard";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn ranges(bands: [(f64, f64); 3]) -> Vec<ValueRange> {
    let labels = [
        ("low", "$10 - $1,000"),
        ("medium", "$1,000 - $10,000"),
        ("high", "$10,000+"),
    ];
    labels
        .iter()
        .zip(bands)
        .map(|((name, label), (min_amount, max_amount))| ValueRange {
            name: name.to_string(),
            label: label.to_string(),
            min_amount,
            max_amount,
        })
        .collect()
}

fn asset(
    id: &str,
    label: &str,
    icon: &str,
    color: &str,
    rate: f64,
    networks: &[&str],
    bands: [(f64, f64); 3],
) -> CatalogEntry {
    CatalogEntry {
        id: id.into(),
        label: label.into(),
        icon: icon.into(),
        color: color.into(),
        kind: EntryKind::Crypto,
        regions: strings(networks),
        categories: vec![Category::new(STANDARD, rate, rate)],
        sub_types: Vec::new(),
        receipt_types: Vec::new(),
        value_ranges: ranges(bands),
        requires_front_back: false,
        is_information_card: false,
    }
}

pub(super) fn crypto_assets() -> Vec<CatalogEntry> {
    vec![
        asset(
            "BTC",
            "Bitcoin (BTC)",
            "₿",
            "#F7931A",
            26_500_000.0,
            &["BTC"],
            [(0.0003, 0.03), (0.03, 0.3), (0.3, 100.0)],
        ),
        asset(
            "ETH",
            "Ethereum (ETH)",
            "Ξ",
            "#627EEA",
            1_750_000.0,
            &["ERC20", "BEP20"],
            [(0.005, 0.5), (0.5, 5.0), (5.0, 1000.0)],
        ),
        asset(
            "USDT",
            "Tether (USDT)",
            "₮",
            "#26A17B",
            1575.0,
            &["ERC20", "TRC20", "BEP20"],
            [(10.0, 1000.0), (1000.0, 10_000.0), (10_000.0, 1_000_000.0)],
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn card(
    id: &str,
    label: &str,
    icon: &str,
    color: &str,
    countries: &[&str],
    sub_types: &[&str],
    sell_rate: f64,
    buy_rate: f64,
) -> CatalogEntry {
    CatalogEntry {
        id: id.into(),
        label: label.into(),
        icon: icon.into(),
        color: color.into(),
        kind: EntryKind::GiftCard,
        regions: strings(countries),
        categories: vec![Category::new(STANDARD, sell_rate, buy_rate)],
        sub_types: strings(sub_types),
        receipt_types: Vec::new(),
        value_ranges: Vec::new(),
        requires_front_back: false,
        is_information_card: false,
    }
}

const PHYSICAL_ECODE: &[&str] = &["Physical", "E-code"];

pub(super) fn gift_cards() -> Vec<CatalogEntry> {
    let receipts = [
        ("Cash receipt", 500.0, 550.0),
        ("No receipt", 480.0, 530.0),
        ("Debit receipt", 490.0, 540.0),
        ("Credit receipt", 495.0, 545.0),
        ("Ecode", 510.0, 560.0),
    ];
    let amazon = CatalogEntry {
        id: "amazon".into(),
        label: "Amazon".into(),
        icon: "🛒".into(),
        color: "#FF9900".into(),
        kind: EntryKind::GiftCard,
        regions: strings(&["US", "UK", "Canada", "Australia", "Germany"]),
        categories: receipts
            .iter()
            .map(|(name, sell, buy)| Category::new(*name, *sell, *buy))
            .collect(),
        sub_types: Vec::new(),
        receipt_types: receipts.iter().map(|(name, _, _)| name.to_string()).collect(),
        value_ranges: Vec::new(),
        requires_front_back: false,
        is_information_card: false,
    };

    let mut google_play = card(
        "google-play",
        "Google Play",
        "▶️",
        "#0F9D58",
        &[
            "Australia", "Switzerland", "UK", "Belgium", "Germany", "Canada", "Brazil", "US",
            "New Zealand",
        ],
        &["Physical", "Ecode"],
        470.0,
        520.0,
    );
    google_play.is_information_card = true;

    let mut visa = card(
        "visa",
        "Visa Gift Card",
        "💳",
        "#1A1F71",
        &["US", "Canada"],
        &["4852", "4034", "4746", "4358", "4912"],
        400.0,
        450.0,
    );
    visa.requires_front_back = true;

    vec![
        amazon,
        card(
            "steam",
            "Steam",
            "🎮",
            "#00ADE1",
            &[
                "Australia", "US", "Switzerland", "UK", "Belgium", "Spain", "Canada",
                "New Zealand", "Italy", "Germany",
            ],
            &["Physical", "Ecode"],
            450.0,
            500.0,
        ),
        card(
            "apple",
            "Apple",
            "🍎",
            "#FF3B30",
            &[
                "France", "Netherlands", "Australia", "Finland", "Switzerland", "UK", "Belgium",
                "Germany", "Spain", "Canada", "Austria", "Singapore", "US",
            ],
            &[
                "Horizontal version",
                "Vertical version",
                "Slow-load",
                "Fast-load",
                "E-code",
            ],
            520.0,
            570.0,
        ),
        google_play,
        card(
            "razor-gold",
            "Razor Gold",
            "💰",
            "#F7931A",
            &["Australia", "Malaysia", "Canada", "Singapore", "US"],
            PHYSICAL_ECODE,
            460.0,
            510.0,
        ),
        card("foot-locker", "Foot Locker", "👟", "#E31937", &["US"], PHYSICAL_ECODE, 440.0, 490.0),
        card("ebay", "eBay", "📦", "#E53238", &["US", "Canada"], PHYSICAL_ECODE, 430.0, 480.0),
        card("sephora", "Sephora", "💄", "#E4008C", &["Canada", "US"], PHYSICAL_ECODE, 420.0, 470.0),
        card("xbox", "Xbox", "🎮", "#107C10", &["Canada", "US"], PHYSICAL_ECODE, 450.0, 500.0),
        card("roblox", "Roblox", "👾", "#EC3D3D", &["US"], PHYSICAL_ECODE, 440.0, 490.0),
        visa,
        card("walmart-visa", "Walmart Visa Card", "🏪", "#007DC6", &["US"], &["Physical"], 410.0, 460.0),
        card("walmart", "Walmart Card", "🏪", "#007DC6", &["US"], &["Physical"], 420.0, 470.0),
        card("nordstrom", "Nordstrom", "👔", "#000000", &["US"], PHYSICAL_ECODE, 430.0, 480.0),
        card("macys", "Macy's", "🛍️", "#E21836", &["US"], PHYSICAL_ECODE, 420.0, 470.0),
        card("nike", "Nike", "👟", "#000000", &["US"], PHYSICAL_ECODE, 440.0, 490.0),
        card("gamestop", "GameStop", "🎮", "#0E7C0E", &["US"], &["Physical"], 430.0, 480.0),
        card("finish-line", "Finish Line", "🏁", "#BD081C", &["US"], &["Physical"], 420.0, 470.0),
    ]
}

pub(super) fn payment_methods() -> Vec<PaymentMethod> {
    vec![
        PaymentMethod {
            id: "bank".into(),
            label: "Bank Transfer".into(),
            description: "Transfer directly to our bank account".into(),
            requires_proof: true,
            account: Some(BankAccount {
                bank_name: "First Bank of Nigeria".into(),
                account_number: "12345678901".into(),
                account_name: "Crypto Exchange Ltd".into(),
            }),
            supported_cards: Vec::new(),
        },
        PaymentMethod {
            id: "card".into(),
            label: "Debit/Credit Card".into(),
            description: "Pay securely with your debit or credit card".into(),
            requires_proof: false,
            account: None,
            supported_cards: strings(&["Visa", "Mastercard", "Verve"]),
        },
    ]
}
