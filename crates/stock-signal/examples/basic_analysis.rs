//! Basic stock analysis example
//!
//! Resolves a query, prints the latest indicators and the signal.
//!
//! To run this example:
//! ```bash
//! # Yahoo Finance needs no key; for Alpha Vantage set both
//! export STOCK_PROVIDER=alpha_vantage
//! export ALPHA_VANTAGE_API_KEY=your_key_here
//!
//! cargo run -p stock-signal --example basic_analysis "Deutsche Bank"
//! ```

use std::env;

use stock_signal::{StockAnalyzer, StockConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stock_utils::init_tracing("info");

    let args: Vec<String> = env::args().skip(1).collect();
    let query = if args.is_empty() {
        "AAPL".to_string()
    } else {
        args.join(" ")
    };

    let analyzer = StockAnalyzer::from_config(StockConfig::from_env()?)?;
    println!("=== Stock Signal ({}) ===\n", analyzer.provider_name());
    println!("Query: {query}");

    let analysis = analyzer.analyze(&query).await?;
    let latest = &analysis.latest;

    println!("Ticker: {}", analysis.symbol);
    if let Some(name) = analysis.info.as_ref().and_then(|i| i.name.as_deref()) {
        println!("Name: {name}");
    }
    println!("Close ({}): {:.2}", latest.date, latest.close);
    println!("SMA50: {:?}  SMA200: {:?}", latest.sma50, latest.sma200);
    println!("RSI14: {:?}", latest.rsi14);
    println!("MACD: {:?}  Signal: {:?}", latest.macd, latest.macd_signal);

    match analysis.signal {
        Some(signal) => println!(
            "\nRecommendation: {} (score {:+.1})",
            signal.recommendation, signal.score
        ),
        None => println!("\nNot enough history for a recommendation"),
    }

    Ok(())
}
