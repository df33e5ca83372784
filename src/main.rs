// src/main.rs

use std::sync::Arc;

use anyhow::Context;
use log::info;

use filmorate::application::{seed_reference_data, AppState};
use filmorate::config::DatabaseConfig;
use filmorate::db::{
    create_connection_pool, get_database_stats, initialize_database, verify_database_integrity,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. INFRASTRUCTURE
    let config = DatabaseConfig::from_env().context("reading database configuration")?;
    info!("Opening database at {}", config.path.display());

    let pool = Arc::new(create_connection_pool(&config)?);

    // Initialize schema (idempotent) and refuse to start on a corrupt file
    {
        let conn = pool.get()?;
        initialize_database(&conn)?;
        verify_database_integrity(&conn).context("checking database integrity")?;
    }

    // 2. APPLICATION STATE
    let state = AppState::new(pool.clone());

    // 3. REFERENCE DATA
    seed_reference_data(&state).context("seeding ratings and genres")?;

    let stats = {
        let conn = pool.get()?;
        get_database_stats(&conn)?
    };
    info!(
        "Catalog ready: {} films, {} users, {} genres, {} ratings ({} bytes)",
        stats.film_count, stats.user_count, stats.genre_count, stats.rating_count, stats.size_bytes
    );

    Ok(())
}
