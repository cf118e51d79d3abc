use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settler::config::Config;
use settler::db::{create_pool, init_db};
use settler::error::Result;
use settler::sweep::{self, DateFilter};

#[derive(Parser, Debug)]
#[command(name = "settler")]
#[command(about = "Remove superseded webhooks from the webhooks table")]
struct Cli {
    /// Delete processed webhooks received on this date
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,

    /// Start of a received-date range, inclusive
    #[arg(long, value_name = "YYYY-MM-DD")]
    start_date: Option<NaiveDate>,

    /// End of a received-date range, inclusive
    #[arg(long, value_name = "YYYY-MM-DD")]
    end_date: Option<NaiveDate>,

    /// Increase output detail (-v for the count, -vv for per-record detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "settler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    if let Err(e) = run(&cli, &config) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let pool = create_pool(&config.database_path)?;
    let conn = pool.get()?;
    init_db(&conn)?;

    let now = Utc::now().timestamp();

    let deleted = match DateFilter::from_options(cli.date, cli.start_date, cli.end_date) {
        // Maintenance purge with a date filter.
        Some(filter) => {
            let removed = sweep::clean_by_date(&conn, &filter, now)?;
            if cli.verbose >= 2 {
                for webhook in &removed {
                    println!("Deleting Webhook ID = {}", webhook.id);
                }
            }
            removed.len()
        }
        // No dates: one retention sweep over the whole table.
        None => sweep::clean(&conn, config, now)?,
    };

    if cli.verbose >= 1 {
        println!("Removed {} entries from the webhook table.", deleted);
    } else {
        println!("Webhook table has been cleaned.");
    }

    Ok(())
}
