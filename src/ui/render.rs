//! Data to render model. Nothing in here touches egui or the network; the
//! panels module paints whatever `render` produced.

use crate::back::market::{Bond, MarketStat, Stock};

use super::format::{fixed2, signed_percent, volume, CURRENCY};

pub const TOP_MOVERS: usize = 3;
pub const BUY_URL: &str = "https://www.rse.rw/RSE-Members-2/RSE-Members/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
}

impl Tone {
    fn of(stock: &Stock) -> Self {
        if stock.is_positive() {
            Tone::Positive
        } else {
            Tone::Negative
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Active,
    Inactive,
}

impl Availability {
    pub fn of(stock: &Stock) -> Self {
        if stock.is_available() {
            Availability::Active
        } else {
            Availability::Inactive
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Availability::Active => "Active",
            Availability::Inactive => "Inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BondRow {
    pub security: String,
    pub coupon: String,
    pub maturity: String,
    pub price: String,
    pub yield_percentage: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoverCard {
    pub symbol: String,
    pub name: String,
    pub change: String,
    pub tone: Tone,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockRow {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub change: String,
    pub tone: Tone,
    pub volume: String,
    pub availability: Availability,
}

/// Everything the dashboard shows for one poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub stat_cards: Vec<StatCard>,
    pub bond_rows: Vec<BondRow>,
    pub top_movers: Vec<MoverCard>,
    pub options: Vec<SymbolOption>,
    pub stock_rows: Vec<StockRow>,
}

impl DashboardView {
    pub fn selected(&self) -> Option<&SymbolOption> {
        self.options.iter().find(|o| o.selected)
    }
}

/// Largest absolute moves first. Ties keep input order.
pub fn top_movers(stocks: &[Stock]) -> Vec<&Stock> {
    let mut sorted: Vec<&Stock> = stocks.iter().collect();
    sorted.sort_by(|a, b| b.change.abs().total_cmp(&a.change.abs()));
    sorted.truncate(TOP_MOVERS);
    sorted
}

pub fn render(
    stocks: &[Stock],
    stats: &[MarketStat],
    bonds: &[Bond],
    current_symbol: Option<&str>,
) -> DashboardView {
    let stat_cards = stats
        .iter()
        .map(|stat| StatCard {
            label: stat.key.clone(),
            value: stat.value.clone(),
        })
        .collect();

    let bond_rows = bonds
        .iter()
        .map(|bond| BondRow {
            security: bond.security.clone(),
            coupon: bond.coupon.clone(),
            maturity: bond.maturity.clone(),
            price: fixed2(bond.price),
            yield_percentage: format!("{}%", fixed2(bond.yield_percentage)),
        })
        .collect();

    let top_movers = top_movers(stocks)
        .into_iter()
        .map(|stock| MoverCard {
            symbol: stock.symbol.clone(),
            name: stock.name.clone(),
            change: signed_percent(stock.change),
            tone: Tone::of(stock),
            price: format!("{} {}", CURRENCY, fixed2(stock.current_price)),
        })
        .collect();

    let options = stocks
        .iter()
        .map(|stock| SymbolOption {
            value: stock.symbol.clone(),
            label: format!("{} - {}", stock.symbol, stock.name),
            selected: current_symbol == Some(stock.symbol.as_str()),
        })
        .collect();

    let stock_rows = stocks
        .iter()
        .map(|stock| StockRow {
            symbol: stock.symbol.clone(),
            name: stock.name.clone(),
            price: fixed2(stock.current_price),
            change: signed_percent(stock.change),
            tone: Tone::of(stock),
            volume: volume(stock.volume),
            availability: Availability::of(stock),
        })
        .collect();

    DashboardView {
        stat_cards,
        bond_rows,
        top_movers,
        options,
        stock_rows,
    }
}
