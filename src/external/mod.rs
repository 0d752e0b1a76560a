pub mod exchange_rate;
pub mod multi_provider;
pub mod price_provider;
pub mod twelvedata;
pub mod yahoofinance;
