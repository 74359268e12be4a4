use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::back::market::{Bond, MarketStat, Stock};
use crate::back::message::{History, Snapshot};

use super::chart::Chart;
use super::render::{render, DashboardView};

/// Mutable UI state of one dashboard window: the selected symbol, the chart
/// and the latest applied poll.
#[derive(Debug, Clone, Default)]
pub struct Session {
    current_symbol: Option<String>,
    chart: Chart,
    view: DashboardView,
    stocks: Vec<Stock>,
    stats: Vec<MarketStat>,
    bonds: Vec<Bond>,
    snapshot_epoch: u64,
    history_epoch: u64,
    last_updated: Option<DateTime<Local>>,
    stale: bool,
}

impl Session {
    pub fn new() -> Self {
        let mut session = Self::default();
        session.chart.init();
        session
    }

    #[inline]
    pub fn current_symbol(&self) -> Option<&str> {
        self.current_symbol.as_deref()
    }

    #[inline]
    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    #[inline]
    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    #[inline]
    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    #[inline]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Applies a poll result. Returns the symbol whose history must be
    /// fetched when the selection had to be (re)initialised.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> Option<String> {
        if snapshot.epoch <= self.snapshot_epoch {
            debug!(
                "dropping snapshot {} (already at {})",
                snapshot.epoch, self.snapshot_epoch
            );
            return None;
        }
        self.snapshot_epoch = snapshot.epoch;
        self.stocks = snapshot.stocks;
        self.stats = snapshot.stats;
        self.bonds = snapshot.bonds;
        self.last_updated = Some(Local::now());
        self.stale = false;

        let listed = self
            .current_symbol
            .as_deref()
            .is_some_and(|current| self.stocks.iter().any(|s| s.symbol == current));
        let fallback = if listed {
            None
        } else {
            self.stocks.first().map(|s| s.symbol.clone())
        };
        if let Some(symbol) = &fallback {
            info!("selecting {}", symbol);
            self.current_symbol = Some(symbol.clone());
        }
        self.redraw();
        fallback
    }

    /// Applies a history response if it is the newest one for the selected
    /// symbol. Returns whether the chart changed.
    pub fn apply_history(&mut self, history: History) -> bool {
        if history.epoch <= self.history_epoch {
            debug!("dropping history {} for {}", history.epoch, history.symbol);
            return false;
        }
        if self.current_symbol.as_deref() != Some(history.symbol.as_str()) {
            debug!("dropping history of deselected {}", history.symbol);
            return false;
        }
        self.history_epoch = history.epoch;
        self.chart.set_history(&history.points);
        true
    }

    pub fn apply_failure(&mut self, epoch: u64) {
        if epoch > self.snapshot_epoch {
            self.stale = true;
        }
    }

    /// User selection. Returns `false` when `symbol` was already selected.
    pub fn select(&mut self, symbol: &str) -> bool {
        if self.current_symbol.as_deref() == Some(symbol) {
            return false;
        }
        self.current_symbol = Some(symbol.to_string());
        self.redraw();
        true
    }

    /// Forgets epochs after the poller has been restarted.
    pub fn reset_epochs(&mut self) {
        self.snapshot_epoch = 0;
        self.history_epoch = 0;
    }

    fn redraw(&mut self) {
        self.view = render(
            &self.stocks,
            &self.stats,
            &self.bonds,
            self.current_symbol.as_deref(),
        );
    }
}
