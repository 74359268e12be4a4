use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::back::api::DEFAULT_BASE_URL;
use crate::back::secs;

/// Persisted through eframe storage between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Setting {
    pub open: bool,
    pub base_url: String,
    /// Seconds between data polls.
    pub interval: u32,
    /// Seconds between chart refreshes.
    pub chart_interval: u32,
    pub request_timeout: u32,
}

impl Default for Setting {
    fn default() -> Self {
        Self {
            open: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            interval: 5,
            chart_interval: 5,
            request_timeout: 10,
        }
    }
}

impl Setting {
    pub fn poll_interval(&self) -> Duration {
        secs(self.interval)
    }

    pub fn chart_poll_interval(&self) -> Duration {
        secs(self.chart_interval)
    }

    pub fn timeout(&self) -> Duration {
        secs(self.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let setting = Setting::default();
        assert_eq!(setting.base_url, "http://127.0.0.1:8000");
        assert_eq!(setting.poll_interval(), Duration::from_secs(5));
        assert_eq!(setting.chart_poll_interval(), Duration::from_secs(5));
        assert_eq!(setting.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_stored_value_fills_defaults() {
        let setting: Setting = serde_json::from_str(r#"{"interval":15}"#).unwrap();
        assert_eq!(setting.interval, 15);
        assert_eq!(setting.chart_interval, 5);
        assert_eq!(setting.base_url, DEFAULT_BASE_URL);
    }
}
