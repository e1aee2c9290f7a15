mod common;

use std::io::Write;

use assert_cmd::Command;
use cardbill_core::config::Config;
use predicates::prelude::*;
use predicates::str::contains;

fn shell() -> Command {
    let config = Config {
        submission_delay_ms: 10,
        ..Config::default()
    };
    let home = common::temp_home(&config);
    let mut cmd = Command::cargo_bin("cardbill_cli").unwrap();
    cmd.env("CARDBILL_CLI_SCRIPT", "1")
        .env("CARDBILL_HOME", home)
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn script_mode_completes_a_crypto_sell() {
    let mut proof = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    proof.write_all(b"\x89PNG proof").unwrap();
    let input = format!(
        "flow crypto-sell
select USDT
region TRC20
category Standard
next
quantity 100
accept-terms
confirm-details
next
next
next
upload {}
submit
exit
",
        proof.path().display()
    );

    shell()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Total: ₦157,500.00"))
        .stdout(contains("Step: Upload Proof"))
        .stdout(contains("Transaction submitted"));
}

#[test]
fn blocked_step_lists_missing_fields() {
    shell()
        .write_stdin("flow giftcard-buy\nselect steam\nnext\nexit\n")
        .assert()
        .success()
        .stdout(contains("Cannot continue from Select Card"))
        .stdout(contains("choose a supported network or country"))
        .stdout(contains("Transaction submitted").not());
}

#[test]
fn unknown_command_suggests_alternative() {
    shell()
        .write_stdin("flow crypto-buy\nnxet\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `nxet` (did you mean `next`?)"));
}

#[test]
fn commands_need_a_flow() {
    shell()
        .write_stdin("quantity 3\nexit\n")
        .assert()
        .success()
        .stdout(contains("No active flow"));
}

#[test]
fn submit_away_from_final_step_is_rejected() {
    shell()
        .write_stdin("flow crypto-sell\nsubmit\nexit\n")
        .assert()
        .success()
        .stdout(contains("Submission is only available on the final step"));
}

#[test]
fn oversized_quantity_is_flagged_and_blocks() {
    shell()
        .write_stdin(
            "flow crypto-sell\nselect BTC\nregion BTC\ncategory Standard\nnext\n\
             quantity 1e305\naccept-terms\nconfirm-details\nnext\nexit\n",
        )
        .assert()
        .success()
        .stdout(contains("Total: ₦0.00"))
        .stdout(contains("too large to price"))
        .stdout(contains("Cannot continue from Enter Details"))
        .stdout(contains("₦inf").not());
}
