//! Menu commands for the interactive mode

use stock_signal::{Result, StockError};

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Analyze one stock by name, ticker or ISIN
    Search { query: String },
    /// Rank the configured watchlist
    Daily { top: Option<usize> },
    Help,
    Exit,
}

impl Command {
    /// Parse a menu line. Text without a leading `/` is a search query.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(StockError::Command("Empty input".to_string()));
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Ok(Command::Search {
                query: input.to_string(),
            });
        };

        let mut parts = rest.split_whitespace();
        let Some(cmd) = parts.next() else {
            return Err(StockError::Command("Empty command".to_string()));
        };
        let args: Vec<&str> = parts.collect();

        match cmd.to_lowercase().as_str() {
            "search" | "s" => {
                if args.is_empty() {
                    return Err(StockError::Command(
                        "Missing name, ticker or ISIN for search".to_string(),
                    ));
                }
                Ok(Command::Search {
                    query: args.join(" "),
                })
            }
            "daily" | "d" => {
                let top = match args.first() {
                    Some(n) => Some(n.parse::<usize>().ok().filter(|n| *n > 0).ok_or_else(
                        || StockError::Command(format!("Invalid number of results: {n}")),
                    )?),
                    None => None,
                };
                Ok(Command::Daily { top })
            }
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            other => Err(StockError::Command(format!("Unknown command: /{other}"))),
        }
    }

    pub fn help_text() -> &'static str {
        r#"
Daily Stock Signals
===================

  /search <query>   Analyze a stock by company name, ticker or ISIN
  /daily [n]        Rank the watchlist and show the best n
  /help             Show this help
  /exit             Quit

Aliases: /s = /search, /d = /daily, /q = /exit

Typing anything without a leading slash searches for it:
  Apple
  SAP
  DE0007164600
"#
    }
}
