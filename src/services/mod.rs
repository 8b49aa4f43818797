//! External collaborators: market data retrieval and narrative analysis.

pub mod market_data;
pub mod narrative;
pub mod yahoo;

pub use market_data::{InMemoryMarketDataProvider, MarketDataError, MarketDataProvider, Period};
pub use narrative::{narrative_records, NarrativeAnalyst, NarrativeError, NarrativeRecord, OpenAiAnalyst};
pub use yahoo::YahooFinanceProvider;
