use chrono::{DateTime, Local, NaiveDateTime, ParseError, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

pub type Vol = u64;
pub type Price = f64;

// {
//     "symbol": "BOK",
//     "name": "Bank of Kigali",
//     "current_price": 278.0,
//     "change": -0.71,
//     "volume": 12400,
//     "high": 280.0,
//     "low": null
// }
#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stock {
    #[serde(deserialize_with = "null_as_default")]
    pub symbol: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current_price: Price,
    /// Signed percent change.
    #[serde(deserialize_with = "null_as_default")]
    pub change: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub volume: Vol,
    pub high: Option<Price>,
    pub low: Option<Price>,
}

impl Stock {
    #[cfg(test)]
    pub fn new(symbol: &str, name: &str) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.change >= 0.0
    }

    /// A stock counts as trading when it moved volume or reported a high.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.volume > 0 || self.high.is_some_and(|high| high > 0.0)
    }
}

#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketStat {
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
}

#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bond {
    #[serde(deserialize_with = "null_as_default")]
    pub security: String,
    #[serde(deserialize_with = "null_as_default")]
    pub coupon: String,
    #[serde(deserialize_with = "null_as_default")]
    pub maturity: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price: Price,
    #[serde(deserialize_with = "null_as_default")]
    pub yield_percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HistoryPoint {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Local>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: Price,
}

impl HistoryPoint {
    #[cfg(test)]
    pub fn new(timestamp: DateTime<Local>, price: Price) -> Self {
        Self { timestamp, price }
    }

    /// Time of day in the `h:mm:ss AM` form used for chart labels.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%-I:%M:%S %p").to_string()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Accepts RFC 3339 or a naive ISO date-time. Naive values are local time.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Local>, ParseError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))?;
    Ok(Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive)))
}
