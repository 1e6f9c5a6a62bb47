use anyhow::Result;
use clap::{Arg, Command};
use name_picker::db::{DatabaseConfig, get_db_pool};
use name_picker::store::{NameStore, PgStore};
use name_picker::utils;
use std::env;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    utils::init_logging();

    let matches = Command::new("wipe-tables")
        .about("Remove the fixed users' swipes and matches plus every uploaded name")
        .arg(
            Arg::new("confirm-wipe")
                .long("confirm-wipe")
                .help("Confirm that you want to wipe the test data (required)")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if !matches.get_flag("confirm-wipe") {
        warn!("Wipe not confirmed. Use --confirm-wipe to proceed.");
        return Ok(());
    }

    let mut db_config = DatabaseConfig::from_env()?;
    // DATABASE_PUBLIC_URL reaches a hosted database from outside its network
    if let Ok(public_url) = env::var("DATABASE_PUBLIC_URL") {
        info!("Using DATABASE_PUBLIC_URL");
        db_config.database_url = public_url;
    }

    let pool = get_db_pool(&db_config).await?;
    let store = PgStore::new(pool);

    let cleared = store.clear_test_data().await?;
    info!(
        "Wiped {} matches, {} swipes and {} uploaded names",
        cleared.matches, cleared.swipes, cleared.names
    );

    Ok(())
}
