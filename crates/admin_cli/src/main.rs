use std::{error::Error, io::Write};

use chrono::{TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, Identity, MovementKind, MovementNew, Role, UserNew, UserPatch};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "tally_admin")]
#[command(about = "Admin utilities for Tally (bootstrap users, demo data)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./tally.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Replace every movement with a demo data set spread across the two
    /// oldest users.
    Seed(SeedArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    Role(UserRoleArgs),
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long, default_value = "USER", value_parser = parse_role)]
    role: Role,
}

#[derive(Args, Debug)]
struct UserRoleArgs {
    #[arg(long)]
    email: String,
    #[arg(long, value_parser = parse_role)]
    role: Role,
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// Do not ask for confirmation before deleting existing movements.
    #[arg(long)]
    yes: bool,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::try_from(raw).map_err(|err| err.to_string())
}

/// Demo movements as `(concept, amount_minor, kind, (year, month, day))`.
const DEMO_MOVEMENTS: &[(&str, i64, MovementKind, (i32, u32, u32))] = &[
    ("Salary March", 245_000, MovementKind::Income, (2025, 3, 1)),
    ("Salary April", 245_000, MovementKind::Income, (2025, 4, 1)),
    ("Salary May", 252_000, MovementKind::Income, (2025, 5, 1)),
    ("Freelance web project", 120_000, MovementKind::Income, (2025, 3, 15)),
    ("Rent", 85_000, MovementKind::Expense, (2025, 3, 5)),
    ("Rent", 85_000, MovementKind::Expense, (2025, 4, 5)),
    ("Rent", 85_000, MovementKind::Expense, (2025, 5, 5)),
    ("Groceries", 18_750, MovementKind::Expense, (2025, 3, 8)),
    ("Groceries", 20_320, MovementKind::Expense, (2025, 4, 12)),
    ("Groceries", 16_580, MovementKind::Expense, (2025, 5, 10)),
    ("Electricity", 7_200, MovementKind::Expense, (2025, 3, 15)),
    ("Electricity", 6_800, MovementKind::Expense, (2025, 4, 15)),
    ("Internet and phone", 5_500, MovementKind::Expense, (2025, 3, 20)),
    ("Internet and phone", 5_500, MovementKind::Expense, (2025, 4, 20)),
    ("Fuel", 12_000, MovementKind::Expense, (2025, 3, 22)),
    ("Fuel", 9_500, MovementKind::Expense, (2025, 5, 18)),
    ("Restaurant", 4_590, MovementKind::Expense, (2025, 3, 10)),
    ("Cinema", 2_400, MovementKind::Expense, (2025, 4, 8)),
    ("Streaming subscription", 1_499, MovementKind::Expense, (2025, 5, 1)),
    ("Pharmacy", 3_250, MovementKind::Expense, (2025, 4, 25)),
    ("Transit pass", 4_000, MovementKind::Expense, (2025, 5, 2)),
    ("Online course", 8_900, MovementKind::Expense, (2025, 3, 18)),
    ("Extra consulting", 50_000, MovementKind::Income, (2025, 4, 20)),
    ("Expense refund", 12_000, MovementKind::Income, (2025, 5, 12)),
    ("Car insurance", 9_500, MovementKind::Expense, (2025, 3, 25)),
    ("Birthday present", 5_000, MovementKind::Expense, (2025, 4, 14)),
];

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
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

fn confirm(question: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    write!(out, "{question} [y/N] ")?;
    out.flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Returns the owners of the demo data: the two oldest users, creating a
/// demo administrator and a demo user when the table is empty.
async fn demo_owners(engine: &Engine) -> Result<Vec<engine::User>, Box<dyn Error + Send + Sync>> {
    let mut users = engine.list_users().await?;
    if users.is_empty() {
        println!("no users found, creating demo accounts");
        let password = prompt_password_twice()?;
        for (name, email, role, phone) in [
            ("Admin Demo", "admin@tally.demo", Role::Admin, "+34 600 000 000"),
            ("Ana Garcia", "ana.garcia@tally.demo", Role::User, "+34 611 222 333"),
        ] {
            let user = engine
                .create_user(UserNew {
                    name: Some(name.to_string()),
                    email: email.to_string(),
                    role,
                    phone: Some(phone.to_string()),
                    password: password.clone(),
                })
                .await?;
            println!("created user: {}", user.email);
        }
        users = engine.list_users().await?;
    }

    users.reverse();
    users.truncate(2);
    Ok(users)
}

async fn seed(engine: &Engine, args: SeedArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let existing = engine.list_movements().await?;
    if !existing.is_empty()
        && !args.yes
        && !confirm(&format!("delete {} existing movements?", existing.len()))?
    {
        println!("aborted");
        return Ok(());
    }

    let owners = demo_owners(engine).await?;
    for owner in &owners {
        println!("owner: {}", owner.email);
    }

    let mut demo = Vec::with_capacity(DEMO_MOVEMENTS.len());
    for (i, (concept, amount_minor, kind, (year, month, day))) in
        DEMO_MOVEMENTS.iter().enumerate()
    {
        let owner = &owners[i % owners.len()];
        let date = Utc
            .with_ymd_and_hms(*year, *month, *day, 0, 0, 0)
            .single()
            .ok_or("invalid demo date")?;
        demo.push((
            MovementNew {
                concept: concept.to_string(),
                amount_minor: *amount_minor,
                kind: *kind,
                date,
            },
            Identity::new(owner.id.to_string(), owner.role),
        ));
    }

    let removed = engine.replace_movements(demo).await?;
    println!("previous movements deleted: {removed}");
    println!("movements in store: {}", engine.list_movements().await?.len());
    Ok(())
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
            if engine.user_by_email(&args.email).await.is_ok() {
                eprintln!("user already exists: {}", args.email);
                std::process::exit(1);
            }

            let password = prompt_password_twice()?;
            let user = engine
                .create_user(UserNew {
                    name: args.name,
                    email: args.email,
                    role: args.role,
                    phone: args.phone,
                    password,
                })
                .await?;

            println!("created user: {} ({}, {})", user.email, user.id, user.role.as_str());
        }
        Command::User(User {
            command: UserCommand::Role(args),
        }) => {
            let Ok(user) = engine.user_by_email(&args.email).await else {
                eprintln!("user not found: {}", args.email);
                std::process::exit(1);
            };
            let user = engine
                .update_user(
                    user.id,
                    UserPatch {
                        role: Some(args.role),
                        ..Default::default()
                    },
                )
                .await?;
            println!("{} is now {}", user.email, user.role.as_str());
        }
        Command::User(User {
            command: UserCommand::List,
        }) => {
            for user in engine.list_users().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    user.id,
                    user.email,
                    user.role.as_str(),
                    user.name.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Seed(args) => seed(&engine, args).await?,
    }

    Ok(())
}
