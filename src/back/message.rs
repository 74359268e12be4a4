use super::market::{Bond, HistoryPoint, MarketStat, Stock};

#[derive(Debug)]
pub enum ToBackend {
    Refresh,
    /// Data poll interval in seconds.
    SetInterval(u32),
    /// Chart poll interval in seconds.
    SetChartInterval(u32),
    SelectSymbol(String),
    Shutdown,
}

#[derive(Debug)]
pub enum ToFrontend {
    Snapshot(Snapshot),
    History(History),
    DataFailed(u64),
}

/// Result of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub epoch: u64,
    pub stocks: Vec<Stock>,
    pub stats: Vec<MarketStat>,
    pub bonds: Vec<Bond>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub epoch: u64,
    pub symbol: String,
    pub points: Vec<HistoryPoint>,
}
