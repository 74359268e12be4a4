use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use std::thread::{self, ScopedJoinHandle};
use std::time::Duration;

use crossbeam::{
    channel::{tick, Receiver, RecvError, Sender},
    select,
};
use tracing::{debug, error, info};

pub mod api;
pub mod error;
pub mod market;
pub mod message;

use api::MarketSource;
use error::{FetchError, Result};
use message::{History, Snapshot, ToBackend, ToFrontend};

/// Poller thread: refreshes the dashboard data and the selected symbol's
/// history on two independent timers.
#[derive(Clone)]
pub struct Back {
    source: Arc<dyn MarketSource>,
    back_tx: Sender<ToFrontend>,
    front_rx: Receiver<ToBackend>,
    poll_interval: Duration,
    chart_interval: Duration,
    current_symbol: Option<String>,
    data_epoch: Arc<AtomicU64>,
    history_epoch: Arc<AtomicU64>,
    data_in_flight: Arc<AtomicUsize>,
    history_in_flight: Arc<AtomicUsize>,
}

enum Wake {
    Front(std::result::Result<ToBackend, RecvError>),
    DataTick,
    ChartTick,
}

/// Counts a running cycle for as long as it is alive.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn secs(interval: u32) -> Duration {
    Duration::from_secs(interval.max(1).into())
}

impl Back {
    pub fn new(
        source: Arc<dyn MarketSource>,
        back_tx: Sender<ToFrontend>,
        front_rx: Receiver<ToBackend>,
        poll_interval: Duration,
        chart_interval: Duration,
    ) -> Self {
        Self {
            source,
            back_tx,
            front_rx,
            poll_interval,
            chart_interval,
            current_symbol: None,
            data_epoch: Arc::default(),
            history_epoch: Arc::default(),
            data_in_flight: Arc::default(),
            history_in_flight: Arc::default(),
        }
    }

    pub fn run(&mut self) {
        info!(
            "poller started, data every {:?}, chart every {:?}",
            self.poll_interval, self.chart_interval
        );
        self.spawn_refetch_data(true);
        let mut ticker = tick(self.poll_interval);
        let mut chart_ticker = tick(self.chart_interval);
        loop {
            let wake = select! {
                recv(self.front_rx) -> msg => Wake::Front(msg),
                recv(ticker) -> _msg => Wake::DataTick,
                recv(chart_ticker) -> _msg => Wake::ChartTick,
            };
            match wake {
                Wake::Front(Ok(m)) => match m {
                    ToBackend::Refresh => {
                        self.spawn_refetch_data(true);
                    }
                    ToBackend::SetInterval(interval) => {
                        self.poll_interval = secs(interval);
                        ticker = tick(self.poll_interval);
                    }
                    ToBackend::SetChartInterval(interval) => {
                        self.chart_interval = secs(interval);
                        chart_ticker = tick(self.chart_interval);
                    }
                    ToBackend::SelectSymbol(symbol) => {
                        info!("select symbol {}", symbol);
                        self.current_symbol = Some(symbol.clone());
                        self.spawn_refetch_history(symbol, true);
                    }
                    ToBackend::Shutdown => {
                        info!("poller shutting down");
                        break;
                    }
                },
                Wake::Front(Err(e)) => {
                    error!("receive ToBackend msg failed : {}", e);
                    break;
                }
                Wake::DataTick => self.spawn_refetch_data(false),
                Wake::ChartTick => {
                    if let Some(symbol) = self.current_symbol.clone() {
                        self.spawn_refetch_history(symbol, false);
                    }
                }
            }
        }
    }

    /// One poll cycle: the three requests run in parallel and nothing is
    /// returned unless all of them succeed.
    pub fn refresh_all(&self) -> Result<Snapshot> {
        self.fetch_snapshot(self.next_data_epoch())
    }

    fn next_data_epoch(&self) -> u64 {
        self.data_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn fetch_snapshot(&self, epoch: u64) -> Result<Snapshot> {
        let source = self.source.as_ref();
        let (stocks, stats, bonds) = thread::scope(|s| {
            let stocks = s.spawn(|| source.stocks());
            let stats = s.spawn(|| source.market_stats());
            let bonds = s.spawn(|| source.bonds());
            (
                join(stocks, "stocks"),
                join(stats, "market stats"),
                join(bonds, "bonds"),
            )
        });
        Ok(Snapshot {
            epoch,
            stocks: stocks?,
            stats: stats?,
            bonds: bonds?,
        })
    }

    pub fn refresh_history(&self, symbol: &str) -> Result<History> {
        let epoch = self.history_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let points = self.source.history(symbol)?;
        Ok(History {
            epoch,
            symbol: symbol.to_string(),
            points,
        })
    }

    pub fn refetch_data(&self) {
        let epoch = self.next_data_epoch();
        match self.fetch_snapshot(epoch) {
            Ok(snapshot) => {
                debug!(
                    "cycle {}: {} stocks, {} stats, {} bonds",
                    snapshot.epoch,
                    snapshot.stocks.len(),
                    snapshot.stats.len(),
                    snapshot.bonds.len()
                );
                self.back_tx.send(ToFrontend::Snapshot(snapshot)).ok();
            }
            Err(e) => {
                error!("fetch data cycle {} error {}", epoch, e);
                self.back_tx.send(ToFrontend::DataFailed(epoch)).ok();
            }
        }
    }

    pub fn refetch_history(&self, symbol: &str) {
        match self.refresh_history(symbol) {
            Ok(history) => {
                debug!("history {} for {}: {} points", history.epoch, symbol, history.points.len());
                self.back_tx.send(ToFrontend::History(history)).ok();
            }
            Err(e) => {
                error!("fetch history of {} error {}", symbol, e);
            }
        }
    }

    fn spawn_refetch_data(&self, forced: bool) {
        if !forced && self.data_in_flight.load(Ordering::SeqCst) > 0 {
            debug!("previous data cycle still running, skipping tick");
            return;
        }
        let guard = InFlight::enter(&self.data_in_flight);
        let this = self.clone();
        thread::spawn(move || {
            let _guard = guard;
            this.refetch_data();
        });
    }

    fn spawn_refetch_history(&self, symbol: String, forced: bool) {
        if !forced && self.history_in_flight.load(Ordering::SeqCst) > 0 {
            debug!("previous history request still running, skipping tick");
            return;
        }
        let guard = InFlight::enter(&self.history_in_flight);
        let this = self.clone();
        thread::spawn(move || {
            let _guard = guard;
            this.refetch_history(&symbol);
        });
    }
}

fn join<T>(handle: ScopedJoinHandle<'_, Result<T>>, what: &'static str) -> Result<T> {
    handle.join().map_err(|_| FetchError::Worker(what))?
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;

    use chrono::{Local, TimeZone};
    use crossbeam::channel::unbounded;

    use super::market::{Bond, HistoryPoint, MarketStat, Stock};
    use super::*;

    #[derive(Default)]
    struct FakeSource {
        fail_bonds: bool,
        barrier: Option<Barrier>,
        // Holds `stocks()` until the sending side is dropped.
        gate: Option<Receiver<()>>,
    }

    impl FakeSource {
        fn rendezvous(&self) {
            if let Some(barrier) = &self.barrier {
                barrier.wait();
            }
        }

        fn gated(fail_bonds: bool) -> (Self, Sender<()>) {
            let (gate_tx, gate_rx) = unbounded();
            let source = Self {
                fail_bonds,
                gate: Some(gate_rx),
                ..Default::default()
            };
            (source, gate_tx)
        }
    }

    impl MarketSource for FakeSource {
        fn stocks(&self) -> Result<Vec<Stock>> {
            self.rendezvous();
            if let Some(gate) = &self.gate {
                gate.recv().ok();
            }
            Ok(vec![Stock::new("BOK", "Bank of Kigali"), Stock::new("MTNR", "MTN Rwanda")])
        }

        fn market_stats(&self) -> Result<Vec<MarketStat>> {
            self.rendezvous();
            Ok(vec![MarketStat {
                key: "Turnover".into(),
                value: "RWF 12M".into(),
            }])
        }

        fn bonds(&self) -> Result<Vec<Bond>> {
            self.rendezvous();
            if self.fail_bonds {
                return Err(FetchError::CannotBeABase("fake".into()));
            }
            Ok(vec![])
        }

        fn history(&self, symbol: &str) -> Result<Vec<HistoryPoint>> {
            assert!(!symbol.is_empty());
            let t = Local.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
            Ok(vec![HistoryPoint::new(t, 100.0), HistoryPoint::new(t, 110.0)])
        }
    }

    fn back_with(source: FakeSource) -> (Back, Receiver<ToFrontend>, Sender<ToBackend>) {
        back_every(source, 60, 60)
    }

    fn back_every(
        source: FakeSource,
        poll: u32,
        chart: u32,
    ) -> (Back, Receiver<ToFrontend>, Sender<ToBackend>) {
        let (back_tx, back_rx) = unbounded();
        let (front_tx, front_rx) = unbounded();
        let back = Back::new(Arc::new(source), back_tx, front_rx, secs(poll), secs(chart));
        (back, back_rx, front_tx)
    }

    #[test]
    fn test_refresh_all_runs_requests_concurrently() {
        // Every request blocks until all three have started.
        let (back, _rx, _tx) = back_with(FakeSource {
            barrier: Some(Barrier::new(3)),
            ..Default::default()
        });
        let snapshot = back.refresh_all().unwrap();
        assert_eq!(snapshot.epoch, 1);
        assert_eq!(snapshot.stocks.len(), 2);
        assert_eq!(snapshot.stats.len(), 1);
    }

    #[test]
    fn test_epochs_increase_per_cycle() {
        let (back, rx, _tx) = back_with(FakeSource::default());
        back.refetch_data();
        back.refetch_data();
        let epochs: Vec<u64> = rx
            .try_iter()
            .map(|m| match m {
                ToFrontend::Snapshot(s) => s.epoch,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(epochs, vec![1, 2]);
    }

    #[test]
    fn test_failed_retrieval_delivers_no_snapshot() {
        let (back, rx, _tx) = back_with(FakeSource {
            fail_bonds: true,
            ..Default::default()
        });
        assert!(back.refresh_all().is_err());
        back.refetch_data();
        match rx.try_recv().unwrap() {
            ToFrontend::DataFailed(epoch) => assert_eq!(epoch, 2),
            other => panic!("unexpected {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_failure_reports_its_own_cycle() {
        let (source, gate) = FakeSource::gated(true);
        let (back, rx, _tx) = back_with(source);
        back.spawn_refetch_data(true);
        while back.data_epoch.load(Ordering::SeqCst) == 0 {
            thread::yield_now();
        }
        // A later cycle starts while the first one is still waiting.
        back.data_epoch.fetch_add(1, Ordering::SeqCst);
        drop(gate);
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            ToFrontend::DataFailed(epoch) => assert_eq!(epoch, 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tick_skipped_while_cycle_in_flight() {
        let (source, gate) = FakeSource::gated(false);
        let (back, rx, _tx) = back_with(source);
        back.spawn_refetch_data(true);
        assert_eq!(back.data_in_flight.load(Ordering::SeqCst), 1);
        back.spawn_refetch_data(false);
        assert_eq!(back.data_in_flight.load(Ordering::SeqCst), 1);
        back.spawn_refetch_data(true);
        assert_eq!(back.data_in_flight.load(Ordering::SeqCst), 2);

        drop(gate);
        for _ in 0..2 {
            let message = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert!(matches!(message, ToFrontend::Snapshot(_)));
        }
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn test_refresh_history() {
        let (back, _rx, _tx) = back_with(FakeSource::default());
        let first = back.refresh_history("BOK").unwrap();
        let second = back.refresh_history("BOK").unwrap();
        assert_eq!(first.symbol, "BOK");
        assert_eq!(first.points.len(), 2);
        assert!(second.epoch > first.epoch);
    }

    #[test]
    fn test_in_flight_guard_counts() {
        let counter = Arc::new(AtomicUsize::new(0));
        let a = InFlight::enter(&counter);
        let b = InFlight::enter(&counter);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        drop(a);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        drop(b);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_secs_floor() {
        assert_eq!(secs(0), Duration::from_secs(1));
        assert_eq!(secs(5), Duration::from_secs(5));
    }

    #[test]
    fn test_run_polls_and_follows_selection() {
        let (mut back, rx, tx) = back_with(FakeSource::default());
        let handle = thread::spawn(move || back.run());

        tx.send(ToBackend::SelectSymbol("MTNR".into())).unwrap();

        let mut saw_snapshot = false;
        let mut saw_history = false;
        while !(saw_snapshot && saw_history) {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                ToFrontend::Snapshot(s) => {
                    assert_eq!(s.stocks[0].symbol, "BOK");
                    saw_snapshot = true;
                }
                ToFrontend::History(h) => {
                    assert_eq!(h.symbol, "MTNR");
                    saw_history = true;
                }
                ToFrontend::DataFailed(_) => panic!("fake source never fails"),
            }
        }

        tx.send(ToBackend::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_chart_ticker_refetches_selected_history() {
        let (mut back, rx, tx) = back_every(FakeSource::default(), 60, 1);
        let handle = thread::spawn(move || back.run());

        tx.send(ToBackend::SelectSymbol("BOK".into())).unwrap();

        let mut histories = 0;
        while histories < 2 {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                ToFrontend::History(h) => {
                    assert_eq!(h.symbol, "BOK");
                    histories += 1;
                }
                ToFrontend::Snapshot(_) => {}
                ToFrontend::DataFailed(_) => panic!("fake source never fails"),
            }
        }

        tx.send(ToBackend::Shutdown).unwrap();
        handle.join().unwrap();
    }
}
