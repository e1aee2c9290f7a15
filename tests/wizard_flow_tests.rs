mod common;

use cardbill_core::errors::WizardError;
use cardbill_core::wizard::{Advance, Blocker, Evidence, Field, FlowKind, Step};
use common::{fill, walk_to_end, wizard};

fn image(name: &str) -> Evidence {
    Evidence::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
}

#[test]
fn crypto_sell_walks_all_five_steps() {
    let mut wizard = wizard(FlowKind::CryptoSell);
    assert_eq!(wizard.current_step(), Step::SelectAsset);
    assert!(!wizard.can_advance());

    fill(
        &mut wizard,
        vec![
            Field::Entry("USDT".into()),
            Field::Region("TRC20".into()),
            Field::Category("Standard".into()),
        ],
    );
    assert!(matches!(
        wizard.advance(),
        Advance::Moved {
            from: Step::SelectAsset,
            to: Step::EnterDetails
        }
    ));

    fill(
        &mut wizard,
        vec![
            Field::Quantity("100".into()),
            Field::TermsAccepted(true),
            Field::DetailsConfirmed(true),
        ],
    );
    assert_eq!(wizard.state().total(), 157_500.0);
    walk_to_end(&mut wizard);
    assert_eq!(wizard.current_step(), Step::UploadProof);
    assert!(!wizard.can_submit());
    assert_eq!(wizard.blockers(), vec![Blocker::EvidenceMissing]);

    wizard.attach_evidence(image("receipt.png"));
    assert!(wizard.can_submit());
    assert_eq!(wizard.advance(), Advance::AtFinalStep);
}

#[test]
fn details_gate_lists_everything_missing() {
    let mut wizard = wizard(FlowKind::CryptoSell);
    fill(
        &mut wizard,
        vec![
            Field::Entry("BTC".into()),
            Field::Region("BTC".into()),
            Field::Category("Standard".into()),
        ],
    );
    wizard.advance();
    assert_eq!(
        wizard.advance(),
        Advance::Blocked(vec![
            Blocker::AmountNotPositive,
            Blocker::TermsNotAccepted,
            Blocker::DetailsNotConfirmed,
        ])
    );
    assert_eq!(wizard.current_step(), Step::EnterDetails);
}

#[test]
fn unsupported_network_keeps_selection_closed() {
    let mut wizard = wizard(FlowKind::CryptoSell);
    fill(
        &mut wizard,
        vec![
            Field::Entry("BTC".into()),
            Field::Region("TRC20".into()),
            Field::Category("Standard".into()),
        ],
    );
    assert_eq!(wizard.blockers(), vec![Blocker::RegionMissing]);
}

#[test]
fn gift_card_entries_are_not_crypto_assets() {
    let mut wizard = wizard(FlowKind::CryptoBuy);
    fill(
        &mut wizard,
        vec![
            Field::Entry("amazon".into()),
            Field::Region("US".into()),
            Field::Category("Cash receipt".into()),
        ],
    );
    assert!(wizard.selected_entry().is_none());
    assert_eq!(
        wizard.blockers()[0],
        Blocker::UnknownEntry("amazon".to_string())
    );
}

#[test]
fn crypto_buy_prices_from_local_amount() {
    let mut wizard = wizard(FlowKind::CryptoBuy);
    fill(
        &mut wizard,
        vec![
            Field::Entry("BTC".into()),
            Field::Region("BTC".into()),
            Field::Category("Standard".into()),
        ],
    );
    wizard.advance();
    assert_eq!(wizard.current_step(), Step::PaymentMethod);
    wizard.update(Field::PaymentMethod("bank".into()));
    wizard.advance();

    fill(
        &mut wizard,
        vec![
            Field::LocalAmount("2,650,000".into()),
            Field::TermsAccepted(true),
            Field::DetailsConfirmed(true),
        ],
    );
    assert_eq!(wizard.state().quantity_input(), "0.10000000");
    assert_eq!(
        wizard.state().total(),
        wizard.state().quantity() * 26_500_000.0
    );

    walk_to_end(&mut wizard);
    assert_eq!(wizard.current_step(), Step::CompletePayment);
    assert_eq!(wizard.blockers(), vec![Blocker::EvidenceMissing]);
    wizard.attach_evidence(image("transfer.png"));
    assert!(wizard.can_submit());
}

#[test]
fn huge_quantity_never_prices_as_infinite() {
    let mut wizard = wizard(FlowKind::CryptoSell);
    fill(
        &mut wizard,
        vec![
            Field::Entry("BTC".into()),
            Field::Region("BTC".into()),
            Field::Category("Standard".into()),
        ],
    );
    wizard.advance();
    fill(
        &mut wizard,
        vec![
            Field::Quantity("1e305".into()),
            Field::TermsAccepted(true),
            Field::DetailsConfirmed(true),
        ],
    );
    assert_eq!(wizard.state().total(), 0.0);
    assert_eq!(
        wizard.advance(),
        Advance::Blocked(vec![Blocker::AmountTooLarge])
    );
    let request = wizard.request().unwrap();
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["total"], 0.0);
}

#[test]
fn huge_local_amount_stays_finite() {
    let mut wizard = wizard(FlowKind::CryptoBuy);
    fill(
        &mut wizard,
        vec![
            Field::Entry("USDT".into()),
            Field::Region("TRC20".into()),
            Field::Category("Standard".into()),
            Field::LocalAmount("1e305".into()),
        ],
    );
    let state = wizard.state();
    assert!(state.quantity().is_finite());
    assert!(state.total().is_finite());
    assert!(!state.quantity_input().contains("inf"));
}

#[test]
fn bank_proof_must_be_an_image() {
    let mut wizard = wizard(FlowKind::GiftCardBuy);
    wizard.update(Field::PaymentMethod("bank".into()));
    assert!(wizard.jump_to(2));
    wizard.attach_evidence(Evidence::new("slip.txt", "text/plain", b"paid".to_vec()));
    assert_eq!(wizard.blockers(), vec![Blocker::EvidenceNotImage]);
    wizard.attach_evidence(image("slip.png"));
    assert!(wizard.blockers().is_empty());
}

#[test]
fn card_payment_needs_no_proof() {
    let mut wizard = common::ready_gift_card_buy();
    assert_eq!(wizard.current_step(), Step::Payment);
    assert!(wizard.can_submit());

    wizard.update(Field::PaymentMethod("bank".into()));
    assert!(!wizard.can_submit());
    assert_eq!(wizard.blockers(), vec![Blocker::EvidenceMissing]);
}

#[test]
fn front_and_back_card_blocks_submit_until_upload() {
    let mut wizard = wizard(FlowKind::GiftCardSell);
    fill(
        &mut wizard,
        vec![
            Field::Entry("visa".into()),
            Field::Region("US".into()),
            Field::Category("Standard".into()),
            Field::SubType("4852".into()),
            Field::Quantity("100".into()),
            Field::CardNumber("4852 0000 1111 2222".into()),
            Field::CardPin("1234".into()),
            Field::TermsAccepted(true),
            Field::DetailsConfirmed(true),
        ],
    );
    assert_eq!(wizard.state().total(), 40_000.0);
    walk_to_end(&mut wizard);
    assert_eq!(wizard.current_step(), Step::UploadAndReview);
    assert!(!wizard.can_submit());
    assert_eq!(
        wizard.submit().unwrap_err(),
        WizardError::StepIncomplete(Step::UploadAndReview)
    );

    wizard.attach_evidence(image("front-and-back.png"));
    assert!(wizard.can_submit());
}

#[test]
fn ordinary_card_upload_is_optional() {
    let mut wizard = wizard(FlowKind::GiftCardSell);
    fill(
        &mut wizard,
        vec![
            Field::Entry("steam".into()),
            Field::Region("UK".into()),
            Field::Category("Standard".into()),
            Field::SubType("Ecode".into()),
            Field::Quantity("50".into()),
            Field::CardNumber("STEAM-CODE".into()),
            Field::CardPin("0000".into()),
            Field::TermsAccepted(true),
            Field::DetailsConfirmed(true),
        ],
    );
    walk_to_end(&mut wizard);
    assert!(wizard.can_submit());
}

#[test]
fn receipt_cards_require_a_receipt_type() {
    let mut wizard = wizard(FlowKind::GiftCardSell);
    fill(
        &mut wizard,
        vec![
            Field::Entry("amazon".into()),
            Field::Region("UK".into()),
            Field::Category("Cash receipt".into()),
        ],
    );
    wizard.advance();
    fill(
        &mut wizard,
        vec![
            Field::Quantity("100".into()),
            Field::CardNumber("AMZN".into()),
            Field::CardPin("9999".into()),
            Field::TermsAccepted(true),
            Field::DetailsConfirmed(true),
        ],
    );
    assert_eq!(wizard.state().total(), 50_000.0);
    assert_eq!(wizard.blockers(), vec![Blocker::ReceiptTypeMissing]);

    wizard.update(Field::ReceiptType("No receipt".into()));
    assert!(wizard.can_advance());
}

#[test]
fn retreat_at_first_step_is_a_no_op() {
    let mut wizard = wizard(FlowKind::GiftCardBuy);
    assert!(!wizard.retreat());
    assert_eq!(wizard.step_index(), 0);
}

#[test]
fn retreat_keeps_entered_data() {
    let mut wizard = common::ready_gift_card_buy();
    assert!(wizard.retreat());
    assert_eq!(wizard.current_step(), Step::EnterAmount);
    assert_eq!(wizard.state().email(), "buyer@example.com");
    assert_eq!(wizard.state().total(), 10_000.0);
}

#[test]
fn submit_checks_steps_skipped_by_jumping() {
    let mut wizard = wizard(FlowKind::GiftCardBuy);
    fill(
        &mut wizard,
        vec![
            Field::Entry("xbox".into()),
            Field::Region("US".into()),
            Field::Category("Standard".into()),
            Field::PaymentMethod("card".into()),
        ],
    );
    assert!(wizard.jump_to(2));
    assert!(wizard.blockers().is_empty());
    assert!(!wizard.can_submit());
    assert_eq!(
        wizard.submit().unwrap_err(),
        WizardError::StepIncomplete(Step::EnterAmount)
    );
    assert!(!wizard.jump_to(3));
}

#[test]
fn submit_before_final_step_is_refused() {
    let mut wizard = wizard(FlowKind::CryptoSell);
    assert_eq!(
        wizard.submit().unwrap_err(),
        WizardError::NotAtFinalStep(Step::SelectAsset)
    );
}

#[test]
fn changing_entry_clears_dependent_selections() {
    let mut wizard = wizard(FlowKind::GiftCardSell);
    fill(
        &mut wizard,
        vec![
            Field::Entry("amazon".into()),
            Field::Region("US".into()),
            Field::Category("No receipt".into()),
            Field::ReceiptType("No receipt".into()),
            Field::Quantity("10".into()),
        ],
    );
    assert_eq!(wizard.state().total(), 4_800.0);

    wizard.update(Field::Entry("apple".into()));
    let state = wizard.state();
    assert_eq!(state.region(), None);
    assert_eq!(state.category(), None);
    assert_eq!(state.receipt_type(), None);
    assert_eq!(state.total(), 0.0);
}

#[test]
fn reset_returns_to_a_clean_first_step() {
    let mut wizard = common::ready_gift_card_buy();
    let session = wizard.session();
    wizard.reset();
    assert_eq!(wizard.step_index(), 0);
    assert_eq!(wizard.state().entry(), None);
    assert_eq!(wizard.state().total(), 0.0);
    assert!(wizard.state().evidence().is_none());
    assert!(wizard.session() > session);
}
