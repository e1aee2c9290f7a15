#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use cardbill_core::catalog::Catalog;
use cardbill_core::config::{Config, ConfigManager};
use cardbill_core::wizard::{Field, FlowKind, Wizard};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

static CATALOG: Lazy<Arc<Catalog>> = Lazy::new(|| Arc::new(Catalog::builtin()));

pub fn catalog() -> Arc<Catalog> {
    Arc::clone(&CATALOG)
}

pub fn wizard(flow: FlowKind) -> Wizard {
    Wizard::new(flow, catalog())
}

pub fn fill(wizard: &mut Wizard, fields: Vec<Field>) {
    for field in fields {
        wizard.update(field);
    }
}

/// Advances until the final step, panicking if any gate is closed.
pub fn walk_to_end(wizard: &mut Wizard) {
    while !wizard.is_final_step() {
        let step = wizard.current_step();
        assert!(
            wizard.can_advance(),
            "blocked at {step}: {:?}",
            wizard.blockers()
        );
        wizard.advance();
    }
}

/// A gift-card purchase with every gate satisfied, sitting on the payment step.
pub fn ready_gift_card_buy() -> Wizard {
    let mut wizard = wizard(FlowKind::GiftCardBuy);
    fill(
        &mut wizard,
        vec![
            Field::Entry("steam".into()),
            Field::Region("US".into()),
            Field::Category("Standard".into()),
            Field::SubType("Physical".into()),
            Field::Quantity("20".into()),
            Field::Email("buyer@example.com".into()),
            Field::TermsAccepted(true),
            Field::DetailsConfirmed(true),
            Field::PaymentMethod("card".into()),
        ],
    );
    walk_to_end(&mut wizard);
    wizard
}

/// Creates an isolated app data directory holding `config`.
pub fn temp_home(config: &Config) -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    ConfigManager::with_base_dir(base.clone())
        .expect("create config manager for temp dir")
        .save(config)
        .expect("save test config");
    base
}
