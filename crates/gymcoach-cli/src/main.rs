mod config;
mod serve_cmd;

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use gymcoach_core::plan;
use gymcoach_db::pool;

use config::CoachConfig;

#[derive(Parser)]
#[command(name = "gymcoach", about = "Fitness coaching backend: plans, users and chat relay")]
struct Cli {
    /// Database URL (overrides GYMCOACH_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a gymcoach config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/gymcoach")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the database and apply migrations
    DbInit,
    /// Run the HTTP server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Store demo plans when the plan tables are empty
    Seed {
        /// Date to seed, YYYY-MM-DD (defaults to today, UTC)
        #[arg(long)]
        date: Option<String>,
    },
    /// Inspect plans
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Print the workout and nutrition plan served for a date
    Show {
        /// Date, YYYY-MM-DD (defaults to today, UTC)
        date: Option<String>,
    },
    /// Print the generated cycle for a month
    Calendar {
        /// Year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,
    },
}

fn date_or_today(raw: Option<&str>) -> anyhow::Result<NaiveDate> {
    match raw {
        Some(raw) => Ok(plan::parse_plan_date(raw)?),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Execute the `gymcoach init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let token_secret = config::generate_token_secret();

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        auth: config::AuthSection {
            token_secret: token_secret.clone(),
            session_ttl_secs: None,
        },
        chat: config::ChatSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  auth.token_secret = {}...{}", &token_secret[..8], &token_secret[56..]);
    println!();
    println!("Next: run `gymcoach db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `gymcoach db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let db_config = config::resolve_db_config(cli_db_url);

    println!("Initializing gymcoach database...");

    pool::ensure_database_exists(&db_config).await?;
    let db_pool = pool::create_pool(&db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("gymcoach db-init complete.");
    Ok(())
}

async fn cmd_seed(cli_db_url: Option<&str>, date: Option<&str>) -> anyhow::Result<()> {
    let date = date_or_today(date)?;
    let db_config = config::resolve_db_config(cli_db_url);
    let db_pool = pool::create_pool(&db_config).await?;
    let result = plan::seed_demo_plans(&db_pool, date).await;
    db_pool.close().await;

    if result? {
        println!("Seeded demo plans for {date}.");
    } else {
        println!("Plans already present; nothing seeded.");
    }
    Ok(())
}

async fn cmd_plan(cli_db_url: Option<&str>, command: PlanCommands) -> anyhow::Result<()> {
    match command {
        PlanCommands::Show { date } => {
            let date = date_or_today(date.as_deref())?;
            let db_config = config::resolve_db_config(cli_db_url);
            let db_pool = pool::create_pool(&db_config).await?;
            let workout = plan::resolve_workout(&db_pool, date).await;
            let nutrition = plan::resolve_nutrition(&db_pool, date).await;
            db_pool.close().await;
            let (workout, nutrition) = (workout?, nutrition?);

            println!("Date: {date} (cycle day {})", plan::cycle_index(date));
            println!("Workout ({}):", workout.source());
            println!("{}", serde_json::to_string_pretty(&workout)?);
            println!("Nutrition ({}):", nutrition.source());
            println!("{}", serde_json::to_string_pretty(&nutrition)?);
        }
        PlanCommands::Calendar { year, month } => {
            let today = Utc::now().date_naive();
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            let days = plan::month_overview(year, month)?;

            println!("{:<12} {:<6} {:<10} NUTRITION", "DATE", "CYCLE", "WORKOUT");
            for day in &days {
                println!(
                    "{:<12} {:<6} {:<10} {}",
                    day.date, day.cycle_index, day.muscle_group, day.nutrition
                );
            }
        }
    }
    Ok(())
}

async fn cmd_serve(cli_db_url: Option<&str>, bind: &str, port: u16) -> anyhow::Result<()> {
    let resolved = CoachConfig::resolve(cli_db_url)?;
    let db_pool = pool::create_pool(&resolved.db_config)
        .await
        .context("cannot serve without a database")?;

    let state = serve_cmd::AppState {
        pool: db_pool.clone(),
        sessions: resolved.session_config,
        chat: resolved.chat_config,
    };
    let result = serve_cmd::run_serve(state, bind, port).await;
    db_pool.close().await;
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db_url = cli.database_url.as_deref();

    match cli.command {
        Commands::Init { db_url, force } => cmd_init(&db_url, force)?,
        Commands::DbInit => cmd_db_init(db_url).await?,
        Commands::Serve { bind, port } => cmd_serve(db_url, &bind, port).await?,
        Commands::Seed { date } => cmd_seed(db_url, date.as_deref()).await?,
        Commands::Plan { command } => cmd_plan(db_url, command).await?,
    }

    Ok(())
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that mutate process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }
}
