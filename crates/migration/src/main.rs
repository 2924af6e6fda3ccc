use migration::SchemaApplier;
use sea_orm::Database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter("migration=info")
        .init();

    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());

    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:./ladger.db?mode=rwc".to_string());

    let db = Database::connect(&db_url).await?;
    let migrations = migration::registry().finalize()?;
    let applier = SchemaApplier::new(&db, migrations);

    match cmd.as_str() {
        "up" => {
            let applied = applier.apply_pending().await?;
            println!("applied {applied} migration(s)");
        }
        "status" => {
            for status in applier.status().await? {
                let state = status.applied_at.as_deref().unwrap_or("pending");
                println!("{}  {:<25}  {}", status.version, state, status.description);
            }
        }
        _ => {
            eprintln!("Usage: cargo run -p migration -- [up|status]");
            std::process::exit(2);
        }
    }

    Ok(())
}
