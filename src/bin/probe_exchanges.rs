use dotenv::dotenv;
use funding_compare::adapters::all_adapters;
use funding_compare::config::Config;

/// Connectivity check: hits every exchange once and prints how many symbols
/// each adapter normalized.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt().init();

    let config = Config::from_env()?;
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    for adapter in all_adapters(config.detail_concurrency) {
        match adapter.fetch(&client).await {
            Ok(quotes) => println!("✅ {}: {} symbols", adapter.id(), quotes.len()),
            Err(e) => println!("❌ {}: {}", adapter.id(), e),
        }
    }
    Ok(())
}
