//! Bollinger Scout - Bollinger Band trend screening
//!
//! Screens a list of symbols and recommends the one with the widest bands
//! among those trending through or toward their bands.

use anyhow::Result;

use bollinger_scout::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (data source overrides can go here)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
