use std::path::Path;
use std::sync::Arc;

use strsim::levenshtein;
use tokio::runtime::{Builder, Runtime};

use crate::catalog::{Catalog, CatalogEntry, Direction, EntryKind};
use crate::config::{Config, ConfigManager};
use crate::currency::format_local;
use crate::submission::SubmissionReceipt;
use crate::utils::build_info;
use crate::wizard::summary::render_review;
use crate::wizard::{Advance, Evidence, Field, FlowKind, SubmissionStatus, Wizard};

use super::output;
use super::{CliError, CliMode, CommandError, LoopControl};

/// Command names with their usage line, in help order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("flow", "flow <crypto-sell|crypto-buy|giftcard-sell|giftcard-buy>"),
    ("catalog", "catalog [search term]"),
    ("select", "select <entry id>"),
    ("region", "region <network or country>"),
    ("category", "category <name>"),
    ("subtype", "subtype <card type>"),
    ("receipt", "receipt <receipt type>"),
    ("quantity", "quantity <number>"),
    ("amount", "amount <local currency amount>"),
    ("comment", "comment <text>"),
    ("card-number", "card-number <code>"),
    ("card-pin", "card-pin <pin>"),
    ("email", "email <address>"),
    ("payment", "payment <bank|card>"),
    ("accept-terms", "accept-terms [yes|no]"),
    ("confirm-details", "confirm-details [yes|no]"),
    ("upload", "upload <image path>"),
    ("clear-upload", "clear-upload"),
    ("next", "next"),
    ("back", "back"),
    ("jump", "jump <step number>"),
    ("status", "status"),
    ("submit", "submit"),
    ("reset", "reset"),
    ("version", "version"),
    ("help", "help"),
    ("exit", "exit"),
];

fn usage(command: &str) -> &'static str {
    COMMANDS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, usage)| *usage)
        .unwrap_or("help")
}

/// Shell state: configuration, catalog, the active wizard and the runtime
/// submissions run on.
pub struct ShellContext {
    pub mode: CliMode,
    pub running: bool,
    config: Config,
    catalog: Arc<Catalog>,
    wizard: Option<Wizard>,
    runtime: Runtime,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config = ConfigManager::new()?.load()?;
        Self::with_config(mode, config)
    }

    pub fn with_config(mode: CliMode, config: Config) -> Result<Self, CliError> {
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin(),
        };
        let runtime = Builder::new_current_thread().enable_time().build()?;
        if mode == CliMode::Script {
            output::disable_colors();
        }
        Ok(Self {
            mode,
            running: true,
            config,
            catalog: Arc::new(catalog),
            wizard: None,
            runtime,
        })
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        COMMANDS.iter().map(|(name, _)| *name).collect()
    }

    pub fn prompt(&self) -> String {
        match &self.wizard {
            Some(wizard) => format!(
                "cardbill[{} {}/{} {}]> ",
                wizard.flow(),
                wizard.step_index() + 1,
                wizard.steps().len(),
                wizard.current_step()
            ),
            None => "cardbill> ".to_string(),
        }
    }

    pub fn report_error(&self, err: CommandError) {
        tracing::debug!(error = %err, "command failed");
        output::error(err);
    }

    fn wizard(&mut self) -> Result<&mut Wizard, CommandError> {
        self.wizard.as_mut().ok_or(CommandError::NoActiveFlow)
    }

    pub fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<LoopControl, CommandError> {
        match command {
            "flow" => self.start_flow(args),
            "catalog" => self.list_catalog(args),
            "select" => {
                let id = single(command, args)?;
                self.catalog.require_entry(id)?;
                self.wizard()?.update(Field::Entry(id.to_string()));
                self.describe_selection();
                Ok(LoopControl::Continue)
            }
            "region" => self.set(command, args, Field::Region),
            "category" => self.set(command, args, Field::Category),
            "subtype" => self.set(command, args, Field::SubType),
            "receipt" => self.set(command, args, Field::ReceiptType),
            "quantity" => {
                if self.wizard()?.flow().prices_from_local_amount() {
                    return Err(CommandError::Invalid(
                        "this flow is priced from the amount you spend; use `amount`".into(),
                    ));
                }
                self.set(command, args, Field::Quantity)
            }
            "amount" => self.set(command, args, Field::LocalAmount),
            "comment" => self.set(command, args, Field::Comment),
            "card-number" => self.set(command, args, Field::CardNumber),
            "card-pin" => self.set(command, args, Field::CardPin),
            "email" => self.set(command, args, Field::Email),
            "payment" => self.set(command, args, Field::PaymentMethod),
            "accept-terms" => self.toggle(command, args, Field::TermsAccepted),
            "confirm-details" => self.toggle(command, args, Field::DetailsConfirmed),
            "upload" => self.upload(args),
            "clear-upload" => {
                self.wizard()?.clear_evidence();
                output::info("Upload removed.");
                Ok(LoopControl::Continue)
            }
            "next" => self.next(),
            "back" => {
                let wizard = self.wizard()?;
                if wizard.retreat() {
                    output::info(format!("Back to {}.", wizard.current_step()));
                } else {
                    output::warning("Already at the first step.");
                }
                Ok(LoopControl::Continue)
            }
            "jump" => self.jump(args),
            "status" => self.status(),
            "submit" => self.submit(),
            "reset" => {
                self.wizard()?.reset();
                output::info("Wizard reset.");
                Ok(LoopControl::Continue)
            }
            "version" => {
                output::info(build_info::current().summary());
                println!(
                    "  locale {}, currency {}, submission delay {} ms",
                    self.config.locale, self.config.local_currency, self.config.submission_delay_ms
                );
                Ok(LoopControl::Continue)
            }
            "help" => {
                output::section("Commands");
                for (_, usage) in COMMANDS {
                    println!("  {}", usage);
                }
                Ok(LoopControl::Continue)
            }
            "exit" | "quit" => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => Err(CommandError::Unknown {
                command: other.to_string(),
                hint: suggest(other)
                    .map(|name| format!(" (did you mean `{}`?)", name))
                    .unwrap_or_default(),
            }),
        }
    }

    fn start_flow(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let raw = single("flow", args)?;
        let flow: FlowKind = raw.parse().map_err(CommandError::Invalid)?;
        self.wizard = Some(Wizard::with_config(
            flow,
            Arc::clone(&self.catalog),
            &self.config,
        ));
        let steps: Vec<&str> = flow.steps().iter().map(|step| step.title()).collect();
        output::success(format!("Started {} ({}).", flow, steps.join(" -> ")));
        Ok(LoopControl::Continue)
    }

    fn list_catalog(&self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let term = args.join(" ");
        let kinds: Vec<EntryKind> = match &self.wizard {
            Some(wizard) => vec![wizard.flow().entry_kind()],
            None => vec![EntryKind::Crypto, EntryKind::GiftCard],
        };
        let direction = self.wizard.as_ref().map(|wizard| wizard.flow().direction());
        let entries: Vec<&CatalogEntry> = kinds
            .into_iter()
            .flat_map(|kind| self.catalog.search(kind, &term))
            .collect();
        if entries.is_empty() {
            output::warning(format!("No entries match `{}`.", term));
        }
        for entry in entries {
            println!("  {}", self.catalog_line(entry, direction));
        }
        Ok(LoopControl::Continue)
    }

    fn catalog_line(&self, entry: &CatalogEntry, direction: Option<Direction>) -> String {
        let currency = &self.config.local_currency;
        let rates: Vec<String> = entry
            .categories
            .iter()
            .map(|category| match direction {
                Some(direction) => format!(
                    "{} {}",
                    category.name,
                    format_local(category.rate(direction), currency)
                ),
                None => format!(
                    "{} sell {} / buy {}",
                    category.name,
                    format_local(category.sell_rate, currency),
                    format_local(category.buy_rate, currency)
                ),
            })
            .collect();
        format!("{:<14} {:<20} {}", entry.id, entry.label, rates.join(", "))
    }

    fn describe_selection(&self) {
        let Some(wizard) = &self.wizard else {
            return;
        };
        match wizard.selected_entry() {
            Some(entry) => {
                output::info(format!("Selected {}.", entry.label));
                println!("  regions:    {}", entry.regions.join(", "));
                let categories: Vec<&str> =
                    entry.categories.iter().map(|c| c.name.as_str()).collect();
                println!("  categories: {}", categories.join(", "));
                if !entry.sub_types.is_empty() {
                    println!("  types:      {}", entry.sub_types.join(", "));
                }
                if !entry.receipt_types.is_empty() {
                    println!("  receipts:   {}", entry.receipt_types.join(", "));
                }
                if entry.requires_front_back {
                    output::warning("Front and back images of the card are required.");
                }
            }
            None => output::warning("That entry is not available in this flow."),
        }
    }

    fn set(
        &mut self,
        command: &str,
        args: &[&str],
        field: fn(String) -> Field,
    ) -> Result<LoopControl, CommandError> {
        if args.is_empty() {
            return Err(CommandError::Usage(usage(command)));
        }
        let value = args.join(" ");
        let currency = self.config.local_currency.clone();
        let wizard = self.wizard()?;
        wizard.update(field(value));
        let state = wizard.state();
        match command {
            "amount" => output::info(format!(
                "Quantity: {} (total {})",
                state.quantity_input(),
                format_local(state.total(), &currency)
            )),
            "quantity" | "category" => {
                output::info(format!("Total: {}", format_local(state.total(), &currency)))
            }
            "payment" => match state
                .payment_method()
                .and_then(|id| wizard.catalog().payment_method(id))
            {
                Some(method) => {
                    output::info(format!("{}: {}", method.label, method.description));
                    if let Some(account) = &method.account {
                        println!(
                            "  {} / {} / {}",
                            account.bank_name, account.account_number, account.account_name
                        );
                    }
                    if method.requires_proof {
                        println!("  Upload a proof of payment before submitting.");
                    }
                }
                None => output::warning("Unknown payment method; choose `bank` or `card`."),
            },
            _ => {}
        }
        if state.amount_overflow() {
            output::warning("That amount is too large to price; enter a smaller one.");
        }
        Ok(LoopControl::Continue)
    }

    fn toggle(
        &mut self,
        command: &str,
        args: &[&str],
        field: fn(bool) -> Field,
    ) -> Result<LoopControl, CommandError> {
        let value = match args.first().map(|arg| arg.to_ascii_lowercase()) {
            None => true,
            Some(arg) if matches!(arg.as_str(), "yes" | "y" | "true" | "on") => true,
            Some(arg) if matches!(arg.as_str(), "no" | "n" | "false" | "off") => false,
            Some(_) => return Err(CommandError::Usage(usage(command))),
        };
        self.wizard()?.update(field(value));
        Ok(LoopControl::Continue)
    }

    fn upload(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let path = single("upload", args)?;
        let evidence = Evidence::from_path(Path::new(path))?;
        if !evidence.is_image() {
            return Err(CommandError::Invalid(format!(
                "{} is not an image; upload a png, jpg, gif, webp or heic file",
                evidence.file_name
            )));
        }
        let name = evidence.file_name.clone();
        self.wizard()?.attach_evidence(evidence);
        output::success(format!("Uploaded {}.", name));
        Ok(LoopControl::Continue)
    }

    fn next(&mut self) -> Result<LoopControl, CommandError> {
        let wizard = self.wizard()?;
        match wizard.advance() {
            Advance::Moved { to, .. } => {
                output::info(format!("Step: {}", to));
                if to.is_informational() {
                    println!("  Nothing to fill in here; `next` to continue.");
                }
            }
            Advance::Blocked(blockers) => {
                output::warning(format!("Cannot continue from {}:", wizard.current_step()));
                for blocker in blockers {
                    println!("  - {}", blocker);
                }
            }
            Advance::AtFinalStep => output::info("Final step reached; use `submit`."),
        }
        Ok(LoopControl::Continue)
    }

    fn jump(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let raw = single("jump", args)?;
        let number: usize = raw
            .parse()
            .map_err(|_| CommandError::Usage(usage("jump")))?;
        let wizard = self.wizard()?;
        if number == 0 || !wizard.jump_to(number - 1) {
            return Err(CommandError::Invalid(format!(
                "step must be between 1 and {}",
                wizard.steps().len()
            )));
        }
        output::info(format!("Step: {}", wizard.current_step()));
        Ok(LoopControl::Continue)
    }

    fn status(&mut self) -> Result<LoopControl, CommandError> {
        let currency = self.config.local_currency.clone();
        let wizard = self.wizard()?;
        wizard.poll_submission();
        output::section(format!(
            "{} step {}/{}: {}",
            wizard.flow(),
            wizard.step_index() + 1,
            wizard.steps().len(),
            wizard.current_step()
        ));
        output::block(&render_review(wizard, &currency));
        let blockers = wizard.blockers();
        if !blockers.is_empty() {
            println!("  Missing:");
            for blocker in blockers {
                println!("  - {}", blocker);
            }
        }
        match wizard.status() {
            SubmissionStatus::Idle => {}
            SubmissionStatus::Processing => output::info("Submission processing."),
            SubmissionStatus::Completed(receipt) => print_receipt(receipt, &currency),
            SubmissionStatus::Failed(reason) => output::warning(format!("Last submission failed: {}", reason)),
        }
        Ok(LoopControl::Continue)
    }

    fn submit(&mut self) -> Result<LoopControl, CommandError> {
        let currency = self.config.local_currency.clone();
        let wizard = self.wizard.as_mut().ok_or(CommandError::NoActiveFlow)?;
        let pending = {
            let _guard = self.runtime.enter();
            wizard.submit()?
        };
        output::info("Processing...");
        if let Some(resolution) = self.runtime.block_on(pending.wait()) {
            wizard.resolve(resolution);
        }
        match wizard.status() {
            SubmissionStatus::Completed(receipt) => print_receipt(receipt, &currency),
            SubmissionStatus::Failed(reason) => {
                output::warning(format!("Submission failed: {}", reason))
            }
            SubmissionStatus::Idle | SubmissionStatus::Processing => {
                output::warning("Submission did not settle.")
            }
        }
        Ok(LoopControl::Continue)
    }
}

fn print_receipt(receipt: &SubmissionReceipt, currency: &str) {
    output::success(format!(
        "Transaction submitted: {} for {}.",
        receipt.reference,
        format_local(receipt.total, currency)
    ));
}

fn single<'a>(command: &str, args: &[&'a str]) -> Result<&'a str, CommandError> {
    match args {
        [value] => Ok(*value),
        _ => Err(CommandError::Usage(usage(command))),
    }
}

fn suggest(input: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .map(|(name, _)| (*name, levenshtein(input, name)))
        .filter(|(_, distance)| *distance <= 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(name, _)| name)
}
