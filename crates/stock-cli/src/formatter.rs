//! Response formatting for the terminal and for markdown output

use clap::ValueEnum;
use comfy_table::Table;
use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use stock_signal::{Analysis, BatchReport, ChartData, IndicatorRow, StockError};

use crate::commands::Command;

pub trait Formatter: Send + Sync {
    fn format_analysis(&self, analysis: &Analysis) -> String;
    fn format_ranking(&self, report: &BatchReport) -> String;
    fn format_error(&self, error: &StockError) -> String;
    fn format_help(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputStyle {
    /// Box-drawn tables and a line chart
    #[default]
    Terminal,
    /// Markdown headings and pipe tables
    Markdown,
}

pub struct TerminalFormatter {
    pub chart_width: usize,
    pub chart_height: usize,
}

impl Default for TerminalFormatter {
    fn default() -> Self {
        Self {
            chart_width: 60,
            chart_height: 12,
        }
    }
}

impl Formatter for TerminalFormatter {
    fn format_analysis(&self, analysis: &Analysis) -> String {
        let heading = title(analysis);
        let mut output = format!("{heading}\n");
        output.push_str(&"=".repeat(heading.chars().count()));
        output.push_str("\n\n");
        output.push_str(&overview_lines(analysis).join("\n"));
        output.push_str("\n\n");
        output.push_str(&indicator_table(&analysis.latest, UTF8_FULL));
        output.push_str("\n\n");
        output.push_str(&signal_line(analysis));
        output.push_str("\n\n");
        output.push_str(&render_line_chart(
            &analysis.chart(),
            self.chart_width,
            self.chart_height,
        ));
        output
    }

    fn format_ranking(&self, report: &BatchReport) -> String {
        let mut output = String::from("Daily recommendations\n\n");
        output.push_str(&ranking_body(report, UTF8_FULL));
        output
    }

    fn format_error(&self, error: &StockError) -> String {
        format!("❌ {}", error_message(error))
    }

    fn format_help(&self) -> String {
        Command::help_text().to_string()
    }
}

pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
    fn format_analysis(&self, analysis: &Analysis) -> String {
        let mut output = format!("## {}\n\n", title(analysis));
        for line in overview_lines(analysis) {
            output.push_str(&format!("- {line}\n"));
        }
        output.push('\n');
        output.push_str(&indicator_table(&analysis.latest, ASCII_MARKDOWN));
        output.push_str(&format!("\n\n**{}**\n\n", signal_line(analysis)));
        output.push_str("```text\n");
        output.push_str(&render_line_chart(&analysis.chart(), 60, 12));
        output.push_str("```\n");
        output
    }

    fn format_ranking(&self, report: &BatchReport) -> String {
        let mut output = String::from("## Daily recommendations\n\n");
        output.push_str(&ranking_body(report, ASCII_MARKDOWN));
        output
    }

    fn format_error(&self, error: &StockError) -> String {
        format!("❌ **Error:** {}", error_message(error))
    }

    fn format_help(&self) -> String {
        format!("```text{}```", Command::help_text())
    }
}

pub struct FormatterFactory;

impl FormatterFactory {
    pub fn create(style: OutputStyle) -> Box<dyn Formatter> {
        match style {
            OutputStyle::Terminal => Box::new(TerminalFormatter::default()),
            OutputStyle::Markdown => Box::new(MarkdownFormatter),
        }
    }
}

fn title(analysis: &Analysis) -> String {
    match analysis.info.as_ref().and_then(|i| i.name.as_deref()) {
        Some(name) => format!("{} ({name})", analysis.symbol),
        None => analysis.symbol.clone(),
    }
}

fn overview_lines(analysis: &Analysis) -> Vec<String> {
    let info = analysis.info.as_ref();
    let mut lines = vec![
        format!(
            "Price: {:.2} ({})",
            analysis.latest_price(),
            analysis.latest.date
        ),
        format!(
            "P/E: {}",
            fmt_opt(info.and_then(|i| i.pe_ratio), 2)
        ),
        format!(
            "Dividend yield: {}",
            info.and_then(|i| i.dividend_yield)
                .map_or_else(|| "n/a".to_string(), |y| format!("{:.2}%", y * 100.0))
        ),
    ];
    if let Some(candidate) = analysis
        .attempts
        .iter()
        .find(|c| c.valid && !c.suffix.is_empty())
    {
        lines.push(format!("Listed as {} ({})", candidate.symbol, candidate.suffix));
    }
    lines
}

fn indicator_table(row: &IndicatorRow, preset: &str) -> String {
    let mut table = Table::new();
    table
        .load_preset(preset)
        .set_header(vec!["Indicator", "Value"]);
    let cells = [
        ("SMA 50", row.sma50),
        ("SMA 200", row.sma200),
        ("RSI 14", row.rsi14),
        ("MACD", row.macd),
        ("MACD signal", row.macd_signal),
        ("Bollinger upper", row.bb_upper),
        ("Bollinger lower", row.bb_lower),
    ];
    for (name, value) in cells {
        table.add_row(vec![name.to_string(), fmt_opt(value, 2)]);
    }
    table.to_string()
}

fn signal_line(analysis: &Analysis) -> String {
    match analysis.signal {
        Some(signal) => format!(
            "Recommendation: {} (score {:+.1})",
            signal.recommendation, signal.score
        ),
        None => format!(
            "Recommendation: not available ({} trading days is not enough history)",
            analysis.series.len()
        ),
    }
}

fn ranking_body(report: &BatchReport, preset: &str) -> String {
    let mut output = String::new();
    if report.ranked.is_empty() {
        output.push_str("No watchlist ticker could be scored.\n");
    } else {
        let mut table = Table::new();
        table
            .load_preset(preset)
            .set_header(vec!["#", "Ticker", "Close", "RSI", "Score", "Signal"]);
        for (i, entry) in report.ranked.iter().enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                entry.symbol.clone(),
                format!("{:.2}", entry.close),
                format!("{:.1}", entry.rsi),
                format!("{:+.1}", entry.score),
                entry.recommendation.to_string(),
            ]);
        }
        output.push_str(&table.to_string());
        output.push('\n');
    }

    if !report.skipped.is_empty() {
        output.push_str("\nSkipped:\n");
        for skipped in &report.skipped {
            output.push_str(&format!("  {}: {}\n", skipped.symbol, skipped.reason));
        }
    }
    output
}

/// User-facing text for a failed query
pub fn error_message(error: &StockError) -> String {
    match error {
        StockError::NotFound { query, attempted } => {
            let mut msg = format!("No ticker found for '{query}'.");
            if !attempted.is_empty() {
                msg.push_str(&format!("\nTried: {}", attempted.join(", ")));
            }
            msg
        }
        StockError::NoData { symbol } => format!("No price data available for {symbol}."),
        StockError::RateLimitExceeded { provider } => {
            format!("{provider} rate limit reached, try again in a minute.")
        }
        e if e.is_upstream() => format!("Data source unavailable: {e}"),
        e => e.to_string(),
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.decimals$}"))
}

/// Plot closing prices as a `width` x `height` character grid with a price axis
pub fn render_line_chart(chart: &ChartData, width: usize, height: usize) -> String {
    let closes = chart.closes();
    let (Some(min), Some(max)) = (chart.min_price, chart.max_price) else {
        return format!("{}: no data to chart\n", chart.title);
    };
    if closes.is_empty() || width == 0 || height == 0 {
        return format!("{}: no data to chart\n", chart.title);
    }

    let columns = width.min(closes.len());
    let sampled: Vec<f64> = (0..columns)
        .map(|c| {
            let index = if columns == 1 {
                closes.len() - 1
            } else {
                c * (closes.len() - 1) / (columns - 1)
            };
            closes[index]
        })
        .collect();

    let span = max - min;
    let row_of = |value: f64| -> usize {
        if span <= 0.0 {
            (height - 1) / 2
        } else {
            (((max - value) / span) * (height - 1) as f64).round() as usize
        }
    };

    let mut grid = vec![vec![' '; columns]; height];
    let mut previous: Option<usize> = None;
    for (c, &value) in sampled.iter().enumerate() {
        let row = row_of(value).min(height - 1);
        if let Some(prev) = previous {
            for line in grid.iter_mut().take(row.max(prev)).skip(row.min(prev) + 1) {
                line[c] = '│';
            }
        }
        grid[row][c] = '●';
        previous = Some(row);
    }

    let mut output = format!("{}\n", chart.title);
    for (r, line) in grid.iter().enumerate() {
        let label = if r == 0 {
            format!("{max:>10.2}")
        } else if r == height - 1 {
            format!("{min:>10.2}")
        } else {
            " ".repeat(10)
        };
        let body: String = line.iter().collect();
        output.push_str(&format!("{label} ┤{}\n", body.trim_end()));
    }
    output.push_str(&format!("{} └{}\n", " ".repeat(10), "─".repeat(columns)));
    if let (Some(start), Some(end)) = (chart.start_date, chart.end_date) {
        output.push_str(&format!("{}  {start} .. {end}\n", " ".repeat(10)));
    }
    output
}
