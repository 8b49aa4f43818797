//! One-shot analysis from the command line.
//!
//! Usage: `coinvision <SYMBOL> [PERIOD]`, e.g. `coinvision BTC-USD 3mo`.

use std::env;
use std::str::FromStr;

use coinvision::config::Config;
use coinvision::core::pipeline::Pipeline;
use coinvision::logging;
use coinvision::models::signal::{SignalFrame, Strategy, TradeSignal};
use coinvision::services::market_data::{MarketDataProvider, Period};
use coinvision::services::yahoo::YahooFinanceProvider;
use tracing::info;

const TABLE_ROWS: usize = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    logging::init_logging();

    let mut args = env::args().skip(1);
    let Some(symbol) = args.next() else {
        eprintln!("usage: coinvision <SYMBOL> [1mo|3mo|6mo|1y|5y]");
        std::process::exit(2);
    };
    let period = match args.next() {
        Some(raw) => Period::from_str(&raw)?,
        None => config.default_period,
    };

    let provider = YahooFinanceProvider::new(config.yahoo_base_url.clone())?;
    let pipeline = Pipeline::from_config(&config)?;

    let series = provider.fetch(&symbol, period).await?;
    info!(symbol = %symbol, period = %period, points = series.len(), "Fetched price history");

    let frame = pipeline.run(&series);
    print_latest(&symbol, &frame);
    for strategy in Strategy::ALL {
        print_strategy_table(&frame, strategy);
    }

    Ok(())
}

fn label(signal: Option<TradeSignal>) -> String {
    signal.map_or_else(|| "-".to_string(), |s| s.to_string())
}

fn print_latest(symbol: &str, frame: &SignalFrame) {
    let Some(latest) = frame.latest_signals() else {
        println!("{}: no price history", symbol);
        return;
    };
    println!("{} @ {} close {:.4}", symbol, latest.timestamp.date_naive(), latest.close);
    println!("  RSI strategy:       {}", label(latest.rsi_signal));
    println!("  Bollinger strategy: {}", label(latest.bollinger_signal));
    println!("  MACD strategy:      {}", label(latest.macd_signal));
}

fn print_strategy_table(frame: &SignalFrame, strategy: Strategy) {
    println!();
    println!("{} strategy (latest {} rows)", strategy.name().to_uppercase(), TABLE_ROWS);
    for row in frame.strategy_table(strategy).iter().take(TABLE_ROWS) {
        let values: Vec<String> = row
            .values
            .iter()
            .map(|(field, value)| format!("{}={:.4}", field, value))
            .collect();
        println!(
            "  {}  close={:.4}  {}  {}",
            row.timestamp.date_naive(),
            row.close,
            values.join("  "),
            row.signal
        );
    }
}
