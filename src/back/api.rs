use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::{FetchError, Result};
use super::market::{Bond, HistoryPoint, MarketStat, Stock};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Where the poller gets its data from.
pub trait MarketSource: Send + Sync {
    fn stocks(&self) -> Result<Vec<Stock>>;

    fn market_stats(&self) -> Result<Vec<MarketStat>>;

    fn bonds(&self) -> Result<Vec<Bond>>;

    /// Ordered price history for one symbol.
    fn history(&self, symbol: &str) -> Result<Vec<HistoryPoint>>;
}

/// JSON API of the dashboard backend.
#[derive(Debug, Clone)]
pub struct MarketApi {
    client: Client,
    base: Url,
}

impl MarketApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url.trim())?;
        if base.cannot_be_a_base() {
            return Err(FetchError::CannotBeABase(base.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::CannotBeABase(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        debug!("GET {}", url);
        let data = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .json::<T>()?;
        Ok(data)
    }
}

impl MarketSource for MarketApi {
    fn stocks(&self) -> Result<Vec<Stock>> {
        self.get_json(&["api", "stocks"])
    }

    fn market_stats(&self) -> Result<Vec<MarketStat>> {
        self.get_json(&["api", "market-stats"])
    }

    fn bonds(&self) -> Result<Vec<Bond>> {
        self.get_json(&["api", "bonds"])
    }

    fn history(&self, symbol: &str) -> Result<Vec<HistoryPoint>> {
        self.get_json(&["api", "history", symbol])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> MarketApi {
        MarketApi::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_from_bare_host() {
        let api = api(DEFAULT_BASE_URL);
        assert_eq!(
            api.endpoint(&["api", "stocks"]).unwrap().as_str(),
            "http://127.0.0.1:8000/api/stocks"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = api("https://example.org/rse/");
        assert_eq!(
            api.endpoint(&["api", "market-stats"]).unwrap().as_str(),
            "https://example.org/rse/api/market-stats"
        );
    }

    #[test]
    fn test_history_symbol_is_encoded() {
        let api = api("http://localhost:8000");
        assert_eq!(
            api.endpoint(&["api", "history", "I&M/RW"]).unwrap().as_str(),
            "http://localhost:8000/api/history/I&M%2FRW"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            MarketApi::new("not a url", Duration::from_secs(1)),
            Err(FetchError::Url(_))
        ));
        assert!(matches!(
            MarketApi::new("mailto:desk@rse.rw", Duration::from_secs(1)),
            Err(FetchError::CannotBeABase(_))
        ));
    }
}
