use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{AccountKind, Currency, Engine, MoneyCents, NewAccountCmd, RegisterUserCmd, UserRole};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "finance_admin")]
#[command(about = "Operator utilities for the finance tracker (bootstrap users/accounts, audits)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./finance.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Account(Account),
    /// Recompute balances and budget totals and compare them to the stored ones.
    Audit(AuditArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    admin: bool,
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
    /// Print every account of a user with its balance.
    List(OwnerArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
    #[arg(long = "type", value_parser = parse_kind)]
    kind: AccountKind,
    /// Opening balance, e.g. `1250.50`.
    #[arg(long, default_value = "0", value_parser = parse_money)]
    balance: MoneyCents,
    #[arg(long, default_value = "INR", value_parser = parse_currency)]
    currency: Currency,
}

#[derive(Args, Debug)]
struct OwnerArgs {
    #[arg(long)]
    owner: String,
}

#[derive(Args, Debug)]
struct AuditArgs {
    #[arg(long)]
    owner: String,
}

fn parse_kind(raw: &str) -> Result<AccountKind, String> {
    AccountKind::try_from(raw).map_err(|err| err.to_string())
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    Currency::try_from(raw).map_err(|err| err.to_string())
}

fn parse_money(raw: &str) -> Result<MoneyCents, String> {
    raw.parse::<MoneyCents>().map_err(|err| err.to_string())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads a password without echoing it.
fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => {}
        }
        out.flush()?;
    }

    Ok(buf)
}

fn prompt_new_password() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            eprintln!("Password must not be empty.");
            continue;
        }
        if prompt_password("Confirm password: ")? == first {
            return Ok(first);
        }
        eprintln!("Passwords do not match. Try again.");
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn audit(engine: &Engine, owner: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
    let user = engine.user_by_email(owner).await?;
    let mut consistent = true;

    println!("accounts:");
    for account in engine.list_accounts(user.id).await? {
        let audit = engine.audit_account(account.id, user.id).await?;
        // The opening balance is not stored, so this is informational only.
        println!(
            "  {:<24} balance {:>12} {}  transactions {:>12}",
            account.name, audit.stored_balance, account.currency, audit.transactions_effect
        );
    }

    println!("budgets:");
    for budget in engine.list_budgets(user.id).await? {
        let audit = engine.audit_budget(budget.id, user.id).await?;
        let mark = if audit.is_consistent() { "ok" } else { "MISMATCH" };
        consistent &= audit.is_consistent();
        println!(
            "  {} {:<20} spent {:>12}  recomputed {:>12}  {mark}",
            budget.period, budget.category, audit.stored_spent, audit.recomputed_spent
        );
    }
    Ok(consistent)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_new_password()?;
            let role = if args.admin {
                UserRole::Admin
            } else {
                UserRole::User
            };
            let user = engine
                .register_user(RegisterUserCmd::new(args.email, args.name, password).role(role))
                .await?;
            println!("created user: {} ({})", user.email, user.id);
        }
        Command::Account(Account {
            command: AccountCommand::Create(args),
        }) => {
            let owner = engine.user_by_email(&args.owner).await?;
            let account = engine
                .create_account(
                    NewAccountCmd::new(owner.id, args.name, args.kind)
                        .balance(args.balance)
                        .currency(args.currency),
                )
                .await?;
            println!(
                "created account: {} ({}) balance {} {}",
                account.name, account.id, account.balance, account.currency
            );
        }
        Command::Account(Account {
            command: AccountCommand::List(args),
        }) => {
            let owner = engine.user_by_email(&args.owner).await?;
            for account in engine.list_accounts(owner.id).await? {
                println!(
                    "{}  {:<24} {:<12} {:>12} {}",
                    account.id,
                    account.name,
                    account.kind.as_str(),
                    account.balance,
                    account.currency
                );
            }
            println!("total: {}", engine.total_balance(owner.id).await?);
        }
        Command::Audit(args) => {
            if !audit(&engine, &args.owner).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
