use crate::db::Database;

pub async fn run() -> anyhow::Result<()> {
    Database::migrate().await?;
    println!("database schema is up to date");
    Ok(())
}
