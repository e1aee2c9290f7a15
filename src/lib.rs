#![doc(test(attr(deny(warnings))))]

//! CardBill Core implements the buy/sell transaction wizards of the CardBill
//! app: a static rate catalog, pure form and step reducers, and a simulated
//! asynchronous submission, plus a small shell for driving them.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod currency;
pub mod errors;
pub mod submission;
pub mod utils;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("CardBill tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
