use std::ops::RangeInclusive;

use eframe::egui::Ui;
use egui_plot::{GridInput, GridMark, Line, Plot, PlotPoints};

use crate::back::market::HistoryPoint;

use super::theme::ACCENT;

pub const MAX_X_LABELS: usize = 8;
pub const SERIES_NAME: &str = "Price (RWF)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartState {
    #[default]
    Uninitialized,
    Empty,
    Populated,
}

/// The single price-history line chart.
#[derive(Debug, Clone, Default)]
pub struct Chart {
    state: ChartState,
    labels: Vec<String>,
    data: Vec<f64>,
}

impl Chart {
    pub fn init(&mut self) {
        if self.state == ChartState::Uninitialized {
            self.labels.clear();
            self.data.clear();
            self.state = ChartState::Empty;
        }
    }

    /// Replaces both series wholesale.
    pub fn set_history(&mut self, points: &[HistoryPoint]) {
        self.labels = points.iter().map(HistoryPoint::time_label).collect();
        self.data = points.iter().map(|p| p.price).collect();
        self.state = ChartState::Populated;
    }

    #[inline]
    pub fn state(&self) -> ChartState {
        self.state
    }

    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn points(&self) -> Vec<[f64; 2]> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, price)| [i as f64, *price])
            .collect()
    }

    pub fn show(&self, ui: &mut Ui, height: f32) {
        let labels = self.labels.clone();
        let label_count = self.labels.len();
        let baseline = self.data.iter().copied().fold(f64::INFINITY, f64::min);

        Plot::new("price_history")
            .height(height)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show_grid([false, true])
            .x_grid_spacer(move |input: GridInput| label_marks(label_count, input.bounds))
            .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                axis_label(&labels, mark.value)
                    .unwrap_or_default()
                    .to_owned()
            })
            .show(ui, |plot_ui| {
                if self.data.is_empty() {
                    return;
                }
                let mut line = Line::new(PlotPoints::from(self.points()))
                    .name(SERIES_NAME)
                    .color(ACCENT)
                    .width(2.0);
                if baseline.is_finite() {
                    line = line.fill(baseline as f32);
                }
                plot_ui.line(line);
            });
    }
}

fn label_stride(label_count: usize) -> usize {
    label_count.div_ceil(MAX_X_LABELS).max(1)
}

/// X-axis grid marks: one per labelled index inside `bounds`.
pub fn label_marks(label_count: usize, bounds: (f64, f64)) -> Vec<GridMark> {
    let stride = label_stride(label_count);
    let first = bounds.0.max(0.0).ceil() as usize;
    let first = first.div_ceil(stride) * stride;
    let last = label_count as f64 - 1.0;
    let last = bounds.1.min(last);
    if last < 0.0 {
        return Vec::new();
    }
    (first..=last.floor() as usize)
        .step_by(stride)
        .map(|index| GridMark {
            value: index as f64,
            step_size: stride as f64,
        })
        .collect()
}

/// Label for an x-axis grid mark, thinned so that at most `MAX_X_LABELS`
/// indices carry text.
pub fn axis_label(labels: &[String], x: f64) -> Option<&str> {
    if x < 0.0 || x.fract() != 0.0 {
        return None;
    }
    let index = x as usize;
    let stride = label_stride(labels.len());
    if index % stride != 0 {
        return None;
    }
    labels.get(index).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local, TimeZone};

    use super::*;

    fn history(prices: &[f64]) -> Vec<HistoryPoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, price)| {
                let t = Local.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
                    + Duration::minutes(i as i64);
                HistoryPoint::new(t, *price)
            })
            .collect()
    }

    #[test]
    fn test_state_transitions() {
        let mut chart = Chart::default();
        assert_eq!(chart.state(), ChartState::Uninitialized);
        chart.init();
        assert_eq!(chart.state(), ChartState::Empty);
        assert!(chart.labels().is_empty() && chart.data().is_empty());
        chart.set_history(&history(&[1.0]));
        assert_eq!(chart.state(), ChartState::Populated);
        chart.init();
        assert_eq!(chart.state(), ChartState::Populated);
    }

    #[test]
    fn test_history_replaces_series() {
        let mut chart = Chart::default();
        chart.init();
        chart.set_history(&history(&[5.0, 6.0, 7.0, 8.0]));
        chart.set_history(&history(&[100.0, 110.0]));
        assert_eq!(chart.data(), &[100.0, 110.0]);
        assert_eq!(chart.labels(), &["9:00:00 AM", "9:01:00 AM"]);
        assert_eq!(chart.points(), vec![[0.0, 100.0], [1.0, 110.0]]);
    }

    #[test]
    fn test_axis_labels_capped() {
        let mut chart = Chart::default();
        chart.set_history(&history(&[1.0; 30]));
        let shown = (0..30)
            .filter(|i| axis_label(chart.labels(), *i as f64).is_some())
            .count();
        assert!(shown <= MAX_X_LABELS);
        assert_eq!(axis_label(chart.labels(), 0.0), Some("9:00:00 AM"));
        assert_eq!(axis_label(chart.labels(), 0.5), None);
        assert_eq!(axis_label(chart.labels(), -1.0), None);
        assert_eq!(axis_label(chart.labels(), 99.0), None);
    }

    #[test]
    fn test_long_series_marks_all_carry_labels() {
        let mut chart = Chart::default();
        chart.set_history(&history(&[1.0; 100]));
        let marks = label_marks(chart.labels().len(), (0.0, 99.0));
        let shown: Vec<&str> = marks
            .iter()
            .filter_map(|mark| axis_label(chart.labels(), mark.value))
            .collect();
        assert_eq!(shown.len(), marks.len());
        assert!(shown.len() >= 4 && shown.len() <= MAX_X_LABELS);
        assert_eq!(marks[0].value, 0.0);
        assert_eq!(marks[1].step_size, marks[1].value);
    }

    #[test]
    fn test_label_marks_respect_bounds() {
        let values: Vec<f64> = label_marks(20, (-3.0, 11.5)).iter().map(|m| m.value).collect();
        assert_eq!(values, vec![0.0, 3.0, 6.0, 9.0]);
        assert!(label_marks(0, (0.0, 10.0)).is_empty());
        assert!(label_marks(5, (7.0, 9.0)).is_empty());
    }

    #[test]
    fn test_short_series_labels_every_point() {
        let mut chart = Chart::default();
        chart.set_history(&history(&[1.0, 2.0, 3.0]));
        for i in 0..3 {
            assert!(axis_label(chart.labels(), i as f64).is_some());
        }
    }
}
