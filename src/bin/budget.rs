//! A command line client for the transaction ledger.
//!
//! This stands in for the mobile UI: it hydrates the ledger engine from the
//! local store, issues a single mutation (or just displays state) and exits.
//! Every mutation persists the snapshot and refreshes the widget mirror
//! before the process returns.

use std::{
    fs,
    path::PathBuf,
    process::ExitCode,
    sync::{Arc, Mutex},
};

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use directories::ProjectDirs;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::EnvFilter;

use budget_tracker_rs::{
    Error, LedgerEngine, Transaction, TransactionId, TransactionKind, format_amount,
    stores::sqlite::{SqliteLedgerStore, SqliteWidgetMirror, create_kv_table},
};

/// The command line client for the budget tracker ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the ledger SQLite database. Defaults to a file in the
    /// platform data directory.
    #[arg(long)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record money coming in.
    Income {
        /// The amount received, a positive number.
        amount: Decimal,
        /// What the money was for. Defaults to "Income".
        description: Option<String>,
    },
    /// Record money going out.
    Expense {
        /// The amount spent, a positive number.
        amount: Decimal,
        /// What the money was for. Defaults to "Expense".
        description: Option<String>,
    },
    /// Delete a transaction and reverse its effect on the balance.
    Delete {
        /// The ID of the transaction to delete.
        id: String,
    },
    /// List all transactions, newest first.
    List,
    /// Print the current balance.
    Balance,
    /// Set or clear the budget goal shown by the goal-tracking widget.
    Goal {
        #[command(subcommand)]
        command: GoalCommand,
    },
}

#[derive(Subcommand, Debug)]
enum GoalCommand {
    /// Set the budget goal to a positive amount.
    Set {
        /// The goal amount, a positive number.
        amount: Decimal,
    },
    /// Clear the budget goal.
    Clear,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::InvalidAmount(amount)) => {
            eprintln!("Invalid amount: {amount}. Enter a positive number.");
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let connection = Arc::new(Mutex::new(open_store(args.db_path)));
    let mut engine = LedgerEngine::hydrate(
        SqliteLedgerStore::new(connection.clone()),
        SqliteWidgetMirror::new(connection),
    );

    match args.command {
        Command::Income {
            amount,
            description,
        } => {
            let transaction =
                engine.add_transaction(TransactionKind::Income, amount, description.as_deref())?;
            print_recorded(&transaction, engine.balance());
        }
        Command::Expense {
            amount,
            description,
        } => {
            let transaction =
                engine.add_transaction(TransactionKind::Expense, amount, description.as_deref())?;
            print_recorded(&transaction, engine.balance());
        }
        Command::Delete { id } => match engine.delete_transaction(&TransactionId::new(id)) {
            Some(transaction) => {
                println!(
                    "Deleted \"{}\". Balance is now {}.",
                    transaction.description,
                    format_amount(engine.balance())
                );
            }
            None => println!("No transaction with that ID."),
        },
        Command::List => {
            if engine.transactions().is_empty() {
                println!("No transactions recorded yet.");
            } else {
                println!("{}", transaction_table(engine.transactions()));
                println!("Balance: {}", format_amount(engine.balance()));
            }
        }
        Command::Balance => println!("{}", format_amount(engine.balance())),
        Command::Goal { command } => match command {
            GoalCommand::Set { amount } => {
                engine.set_budget_goal(Some(amount))?;
                match engine.snapshot().clamped_percentage() {
                    Some(percentage) => println!(
                        "Goal set to {}. You are at {percentage}% of it.",
                        format_amount(amount)
                    ),
                    None => println!("Goal set to {}.", format_amount(amount)),
                }
            }
            GoalCommand::Clear => {
                engine.set_budget_goal(None)?;
                println!("Goal cleared.");
            }
        },
    }

    Ok(())
}

fn print_recorded(transaction: &Transaction, balance: Decimal) {
    let sign = match transaction.kind {
        TransactionKind::Income => "+",
        TransactionKind::Expense => "-",
    };

    println!(
        "Recorded \"{}\" ({sign}{}), ID {}. Balance is now {}.",
        transaction.description,
        format_amount(transaction.amount),
        transaction.id,
        format_amount(balance)
    );
}

fn transaction_table(transactions: &[Transaction]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["ID", "Date", "Type", "Description", "Amount"].map(Cell::new));

    for transaction in transactions {
        let sign = match transaction.kind {
            TransactionKind::Income => "+",
            TransactionKind::Expense => "-",
        };

        table.add_row([
            Cell::new(transaction.id.as_str()),
            Cell::new(
                transaction
                    .date
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| transaction.date.to_string()),
            ),
            Cell::new(transaction.kind.to_string()),
            Cell::new(&transaction.description),
            Cell::new(format!("{sign}{}", format_amount(transaction.amount))),
        ]);
    }

    table
}

fn open_store(db_path: Option<PathBuf>) -> Connection {
    let path = db_path.unwrap_or_else(default_db_path);

    let connection = Connection::open(&path).expect("Could not open the ledger database");
    create_kv_table(&connection).expect("Could not initialize the ledger database");

    connection
}

fn default_db_path() -> PathBuf {
    let dirs = ProjectDirs::from("rs", "", "budget_tracker")
        .expect("Could not determine the platform data directory");

    fs::create_dir_all(dirs.data_dir()).expect("Could not create the data directory");

    dirs.data_dir().join("ledger.sqlite")
}
