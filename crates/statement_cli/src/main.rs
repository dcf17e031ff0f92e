//! Command-line driver for the statement store.
//!
//! Reads the secrets file, opens the configured database and runs one
//! storage use-case per invocation.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use statement_core::{
    connect_to_db, create_tables, init_logging_from_config, load_secrets, resolve_secrets_path,
    GoogleProfile, Secrets, StatementService, TransactionListQuery, TransactionRecord, UserId,
};

#[derive(Parser, Debug)]
#[command(
    name = "statement-store",
    version,
    about = "Store and query parsed bank-statement transactions"
)]
struct Cli {
    /// Secrets file (defaults to $STATEMENT_STORE_SECRETS, then .secrets/secrets.toml)
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the Users and Transactions tables if missing
    Init,
    /// Insert or refresh a signed-in user profile
    SignIn(SignInArgs),
    /// Import an extracted statement JSON array for a user
    Import(ImportArgs),
    /// List a user's stored transactions
    List(ListArgs),
}

#[derive(Args, Debug)]
struct SignInArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    picture: Option<String>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Email of a user created with `sign-in`
    #[arg(long)]
    email: String,
    /// JSON file holding the extracted transactions
    file: PathBuf,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,
    #[arg(long)]
    category: Option<String>,
    /// Print rows as a JSON array instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let secrets_path = resolve_secrets_path(cli.secrets.as_deref());
    let secrets = load_secrets(&secrets_path)?;
    init_logging_from_config(&secrets.logging).map_err(|err| anyhow!(err))?;

    let mut conn = open_connection(&secrets)?;
    let mut service = StatementService::new(&mut conn);

    match cli.command {
        Commands::Init => {
            println!("tables ready");
        }
        Commands::SignIn(args) => {
            let profile = GoogleProfile::new(args.email, args.name, args.picture);
            let user_id = service.sign_in(&profile)?;
            println!("user_id={user_id}");
        }
        Commands::Import(args) => {
            let user_id = user_id_for(&mut service, &args.email)?;
            let payload = std::fs::read_to_string(&args.file)
                .with_context(|| format!("failed to read {}", args.file.display()))?;
            let summary = service.import_statement(user_id, &payload)?;
            if summary.inserted == 0 && summary.parsed > 0 {
                println!("all {} transaction(s) already exist", summary.parsed);
            } else {
                println!(
                    "parsed={} inserted={} skipped_duplicates={}",
                    summary.parsed, summary.inserted, summary.skipped_duplicates
                );
            }
        }
        Commands::List(args) => {
            let user_id = user_id_for(&mut service, &args.email)?;
            let query = TransactionListQuery {
                year: args.year,
                month: args.month,
                category: args.category,
                ..TransactionListQuery::for_user(user_id)
            };
            let rows = service.filter_transactions(&query);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_table(&rows);
            }
        }
    }

    Ok(())
}

fn open_connection(secrets: &Secrets) -> Result<Connection> {
    let mut conn = connect_to_db(&secrets.database)
        .context("error connecting to database; check [database] in the secrets file")?;
    create_tables(&mut conn).context("error creating tables")?;
    Ok(conn)
}

fn user_id_for(service: &mut StatementService<'_>, email: &str) -> Result<UserId> {
    service
        .find_user_by_email(email)?
        .map(|user| user.user_id)
        .ok_or_else(|| anyhow!("no user with that email; run `sign-in` first"))
}

fn print_table(rows: &[TransactionRecord]) {
    if rows.is_empty() {
        println!("no transactions");
        return;
    }

    println!(
        "{:<10}  {:<28}  {:<22}  {:>12}  {}",
        "date", "merchant", "category", "amount", "sub"
    );
    for row in rows {
        let entry = &row.entry;
        println!(
            "{:<10}  {:<28}  {:<22}  {:>12}  {}",
            entry
                .transaction_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            entry.activity_description.as_deref().unwrap_or(""),
            entry.category.as_deref().unwrap_or(""),
            entry
                .amount_spent
                .map(|amount| amount.to_string())
                .unwrap_or_default(),
            if entry.is_subscription { "yes" } else { "" }
        );
    }
}
