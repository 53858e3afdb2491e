//! Daily stock signals from the terminal
//!
//! # Usage
//!
//! ```bash
//! # Optional: use Alpha Vantage instead of Yahoo Finance
//! export ALPHA_VANTAGE_API_KEY="your-key"
//! export STOCK_PROVIDER="alpha_vantage"
//!
//! # One-shot modes
//! cargo run -p stock-cli -- search "Deutsche Bank"
//! cargo run -p stock-cli -- daily --top 10
//!
//! # Interactive menu
//! cargo run -p stock-cli
//! ```

mod commands;
mod formatter;

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use stock_signal::{DataProvider, StockAnalyzer, StockConfig, StockError};
use tracing::info;

use crate::commands::Command;
use crate::formatter::{Formatter, FormatterFactory, OutputStyle};

#[derive(Parser, Debug)]
#[command(name = "stock-cli")]
#[command(about = "Technical buy / neutral / caution signals for stocks", long_about = None)]
struct Args {
    /// Data provider (yahoo or alpha_vantage); overrides STOCK_PROVIDER
    #[arg(long, value_parser = parse_provider)]
    provider: Option<DataProvider>,

    /// Alpha Vantage API key; overrides ALPHA_VANTAGE_API_KEY
    #[arg(long)]
    api_key: Option<String>,

    /// Output style
    #[arg(long, value_enum, default_value_t = OutputStyle::Terminal)]
    style: OutputStyle,

    /// Print chart data (search) or the ranking (daily) as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Analyze one stock by company name, ticker or ISIN
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Rank the watchlist by signal score
    Daily {
        /// Number of tickers to show
        #[arg(long, value_parser = parse_top)]
        top: Option<usize>,
    },
}

fn parse_provider(value: &str) -> Result<DataProvider, String> {
    value.parse().map_err(|e: StockError| e.to_string())
}

fn parse_top(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a positive number of tickers, got '{value}'")),
    }
}

fn build_config(args: &Args) -> anyhow::Result<StockConfig> {
    let mut builder = StockConfig::builder()
        .with_env_api_key()
        .with_env_provider()?
        .with_env_watchlist();
    if let Some(provider) = args.provider {
        builder = builder.provider(provider);
    }
    if let Some(key) = &args.api_key {
        builder = builder.alpha_vantage_api_key(key.clone());
    }
    Ok(builder.build()?)
}

struct App {
    analyzer: StockAnalyzer,
    formatter: Box<dyn Formatter>,
    json: bool,
}

impl App {
    async fn search(&self, query: &str) -> String {
        match self.analyzer.analyze(query).await {
            Ok(analysis) if self.json => serde_json::to_string_pretty(&analysis.chart())
                .unwrap_or_else(|e| self.formatter.format_error(&StockError::from(e))),
            Ok(analysis) => self.formatter.format_analysis(&analysis),
            Err(e) => self.formatter.format_error(&e),
        }
    }

    async fn daily(&self, top: Option<usize>) -> String {
        let report = self.analyzer.daily_recommendations(top).await;
        if self.json {
            serde_json::to_string_pretty(&report)
                .unwrap_or_else(|e| self.formatter.format_error(&StockError::from(e)))
        } else {
            self.formatter.format_ranking(&report)
        }
    }

    async fn run_menu(&self) -> anyhow::Result<()> {
        print_banner(self.analyzer.provider_name());

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("stock> ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {e}");
                    continue;
                }
            }

            if input.trim().is_empty() {
                continue;
            }

            let output = match Command::parse(&input) {
                Ok(Command::Search { query }) => self.search(&query).await,
                Ok(Command::Daily { top }) => {
                    println!("Scoring {} tickers...", self.analyzer.config().watchlist.len());
                    self.daily(top).await
                }
                Ok(Command::Help) => self.formatter.format_help(),
                Ok(Command::Exit) => {
                    println!("Goodbye!");
                    break;
                }
                Err(e) => self.formatter.format_error(&e),
            };
            println!("{output}\n");
        }

        Ok(())
    }
}

fn print_banner(provider: &str) {
    println!(
        r#"
╔══════════════════════════════════════════════╗
║             Daily Stock Signals              ║
║                                              ║
║  /search <query>  - analyze a stock          ║
║  /daily [n]       - rank the watchlist       ║
║  /help            - show help                ║
║  /exit            - quit                     ║
║                                              ║
║  Or just type a name, ticker or ISIN.        ║
╚══════════════════════════════════════════════╝
"#
    );
    println!("Data provider: {provider}\n");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stock_utils::init_tracing("warn,stock_signal=info");

    let args = Args::parse();
    let config = build_config(&args)?;
    info!(provider = ?config.provider, "Starting stock-cli");

    let app = App {
        analyzer: StockAnalyzer::from_config(config)?,
        formatter: FormatterFactory::create(args.style),
        json: args.json,
    };

    match args.mode {
        Some(Mode::Search { query }) => println!("{}", app.search(&query.join(" ")).await),
        Some(Mode::Daily { top }) => println!("{}", app.daily(top).await),
        None => app.run_menu().await?,
    }

    Ok(())
}
