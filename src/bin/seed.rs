use scrap_market_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    services::category_service::ensure_default_categories,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 1).await?;
    let orm = create_orm_conn(pool);
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let created = ensure_default_categories(&orm).await?;

    println!("Seed completed. {created} categories added.");
    Ok(())
}
