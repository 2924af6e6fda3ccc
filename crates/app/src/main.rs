use clap::{Args, Parser, Subcommand};
use engine::{Engine, EngineError, EntryForm, PersistenceError};
use migration::SchemaApplier;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "ladger")]
#[command(about = "Double-entry ledger kept in SQLite and a Markdown archive")]
struct Cli {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations and print their status.
    Migrate,
    /// Record one entry in the archive and the database.
    Record(RecordArgs),
    /// List recorded entries.
    List {
        #[arg(long)]
        json: bool,
    },
    /// List archive files that have no database row.
    Orphans,
}

#[derive(Args, Debug)]
struct RecordArgs {
    #[arg(long)]
    debitor: String,
    #[arg(long)]
    creditor: String,
    /// Decimal amount, e.g. `50` or `12,30`.
    #[arg(long, allow_hyphen_values = true)]
    amount: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ladger={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let db = sea_orm::Database::connect(settings.database.url()).await?;

    // Building the engine applies pending migrations.
    let mut engine = Engine::builder()
        .database(db)
        .archive_dir(settings.archive.dir())
        .build()
        .await?;
    tracing::debug!(archive = %engine.archive_dir().display(), "engine ready");

    match cli.command {
        Command::Migrate => {
            let migrations = migration::registry().finalize()?;
            for status in SchemaApplier::new(engine.database(), migrations)
                .status()
                .await?
            {
                let state = status.applied_at.as_deref().unwrap_or("pending");
                println!("{}  {:<25}  {}", status.version, state, status.description);
            }
        }
        Command::Record(args) => {
            let mut form = EntryForm::new(args.debitor, args.creditor, args.amount);
            match form.submit(&mut engine).await {
                Ok(recorded) => println!(
                    "recorded #{}: {} -> {} {} ({})",
                    recorded.id,
                    recorded.entry.debitor(),
                    recorded.entry.creditor(),
                    recorded.entry.credit(),
                    recorded.archive_path.display()
                ),
                Err(err) => {
                    report(&err);
                    return Err(err.into());
                }
            }
        }
        Command::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(engine.transactions())?);
            } else {
                for row in engine.transactions() {
                    println!(
                        "{:>6}  {}  {:<20} {:>14} {:>14}  {}",
                        row.id,
                        row.timestamp.to_rfc3339(),
                        row.debitor,
                        row.debit,
                        row.credit,
                        row.creditor
                    );
                }
            }
        }
        Command::Orphans => {
            for orphan in engine.orphans().await? {
                match &orphan.contents {
                    Ok(entry) => println!(
                        "{}  {} -> {} {}",
                        orphan.path.display(),
                        entry.debitor,
                        entry.creditor,
                        entry.credit
                    ),
                    Err(err) => println!("{}  unreadable: {err}", orphan.path.display()),
                }
            }
        }
    }

    Ok(())
}

fn report(err: &EngineError) {
    match err {
        EngineError::Validation(validation) => {
            eprintln!("check the {:?} field: {validation}", validation.field());
        }
        EngineError::Persistence(PersistenceError::DatabaseWriteFailed { archive_path, .. }) => {
            eprintln!(
                "entry partially saved: {} was written but the database row was not; \
                 do not re-enter it",
                archive_path.display()
            );
        }
        EngineError::Persistence(PersistenceError::ArchiveWriteFailed { .. }) => {
            eprintln!("nothing was saved, retry the entry");
        }
        _ => {}
    }
}
