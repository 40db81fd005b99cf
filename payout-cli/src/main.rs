//! Payouts CLI
//!
//! Operator interface over the payout gateway. Every command prints JSON on
//! stdout; logs go to stderr.

mod config;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::json;

use payout_gateway::{DEFAULT_BANKS, Dispatcher, parse_bank_list};
use payout_types::domain::bank::CATALOG;
use payout_types::{AccountValidation, Currency, TransferRequest};

#[derive(Parser)]
#[command(name = "payouts")]
#[command(author, version, about = "Bank payout gateway CLI", long_about = None)]
struct Cli {
    /// Enabled banks, comma-separated codes or names
    #[arg(long, env = "PAYOUT_BANKS", default_value = DEFAULT_BANKS)]
    banks: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the bank catalog and which banks are enabled
    Banks,
    /// Validate a destination account
    Validate {
        /// Bank whose API performs the check
        #[arg(long)]
        bank: String,
        #[arg(long)]
        account: String,
        #[arg(long)]
        rut: String,
        /// Bank holding the account, defaults to --bank
        #[arg(long)]
        destination_bank: Option<String>,
    },
    /// Pay out to a destination account
    Transfer {
        #[arg(long)]
        bank: String,
        #[arg(long)]
        account: String,
        /// Account holder name
        #[arg(long)]
        name: String,
        #[arg(long)]
        rut: String,
        /// Bank holding the account, defaults to --bank
        #[arg(long)]
        destination_bank: Option<String>,
        /// Amount in the smallest currency unit
        #[arg(long)]
        amount: i64,
        #[arg(long, default_value = "CLP")]
        currency: Currency,
        #[arg(long, default_value = "")]
        description: String,
        /// Caller reference, generated when omitted
        #[arg(long)]
        reference: Option<String>,
    },
    /// Poll the status of a transfer
    Status {
        #[arg(long)]
        bank: String,
        /// Bank transaction id
        id: String,
    },
    /// Show the operating account balance
    Balance {
        #[arg(long)]
        bank: String,
    },
    /// List operating account movements (dates as YYYY-MM-DD, inclusive)
    History {
        #[arg(long)]
        bank: String,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::Config::from_env()?;
    config.init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Banks => {
            let enabled = parse_bank_list(&cli.banks)?;
            let banks: Vec<_> = CATALOG
                .iter()
                .map(|bank| {
                    json!({
                        "symbol": bank.symbol,
                        "name": bank.name,
                        "code": bank.code(),
                        "enabled": enabled.iter().any(|b| b.symbol == bank.symbol),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&banks)?);
        }

        Commands::Validate {
            bank,
            account,
            rut,
            destination_bank,
        } => {
            let dispatcher = Dispatcher::from_bank_list(&cli.banks)?;
            let destination = destination_bank.unwrap_or_else(|| bank.clone());
            let result = dispatcher
                .validate_account(&bank, AccountValidation::new(&account, &rut, &destination))
                .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_valid {
                std::process::exit(1);
            }
        }

        Commands::Transfer {
            bank,
            account,
            name,
            rut,
            destination_bank,
            amount,
            currency,
            description,
            reference,
        } => {
            let dispatcher = Dispatcher::from_bank_list(&cli.banks)?;
            let req = TransferRequest {
                recipient_account: account,
                recipient_name: name,
                recipient_rut: rut,
                recipient_bank: destination_bank.unwrap_or_else(|| bank.clone()),
                amount,
                currency,
                description,
                reference_id: reference.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            };
            let resp = dispatcher.transfer(&bank, &req).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
            if !resp.success() {
                std::process::exit(1);
            }
        }

        Commands::Status { bank, id } => {
            let dispatcher = Dispatcher::from_bank_list(&cli.banks)?;
            let report = dispatcher.transaction_status(&bank, &id).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Balance { bank } => {
            let dispatcher = Dispatcher::from_bank_list(&cli.banks)?;
            let balance = dispatcher.balance(&bank).await?;
            println!("{}", serde_json::to_string_pretty(&balance)?);
        }

        Commands::History { bank, from, to } => {
            let dispatcher = Dispatcher::from_bank_list(&cli.banks)?;
            let movements = dispatcher.transaction_history(&bank, from, to).await?;
            println!("{}", serde_json::to_string_pretty(&movements)?);
        }
    }

    Ok(())
}
