use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use account_service::{config, db, migrator::Migrator};

#[derive(Parser)]
#[command(name = "migration", about = "Manage the account service database schema", version)]
struct Cli {
    #[arg(
        long,
        help = "Connection string; defaults to the configured database_url"
    )]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Up {
        #[arg(long, help = "Number of migrations to apply; all when omitted")]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(long, default_value_t = 1, help = "Number of migrations to roll back")]
        steps: u32,
    },
    /// Drop every table and re-apply all migrations
    Fresh,
    /// List applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let database_url = match cli.database_url {
        Some(url) => {
            config::init_tracing("info", false);
            url
        }
        None => {
            let cfg = config::load_config().context("failed to load configuration")?;
            config::init_tracing(cfg.effective_log_level(), cfg.log_json);
            cfg.database_url
        }
    };

    let pool = db::establish_connection(&database_url).await?;

    match cli.command {
        Commands::Up { steps } => {
            Migrator::up(&pool, steps)
                .await
                .context("failed to apply migrations")?;
            info!("Migrations applied");
        }
        Commands::Down { steps } => {
            Migrator::down(&pool, Some(steps))
                .await
                .context("failed to roll back migrations")?;
            info!(steps, "Migrations rolled back");
        }
        Commands::Fresh => {
            Migrator::fresh(&pool)
                .await
                .context("failed to recreate schema")?;
            info!("Schema recreated");
        }
        Commands::Status => {
            for migration in Migrator::get_applied_migrations(&pool).await? {
                println!("applied  {}", migration.name());
            }
            for migration in Migrator::get_pending_migrations(&pool).await? {
                println!("pending  {}", migration.name());
            }
        }
    }

    db::close_pool(pool).await?;
    Ok(())
}
