use crate::data::Kline;
use crate::ui::Theme;
use chrono::DateTime;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const PRICE_GUTTER: u16 = 13;

/// Layout and grid colors, re-applied whenever the host theme changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub background: Color,
    pub text: Color,
    pub grid: Color,
    pub up: Color,
    pub down: Color,
}

impl From<&Theme> for ChartStyle {
    fn from(theme: &Theme) -> Self {
        Self {
            background: theme.bg,
            text: theme.text,
            grid: theme.secondary_bg,
            up: theme.up,
            down: theme.down,
        }
    }
}

/// The candle series. Bars are kept sorted by timestamp.
#[derive(Debug, Clone, Default)]
pub struct CandleSeries {
    bars: Vec<Kline>,
}

impl CandleSeries {
    pub fn set_data(&mut self, mut bars: Vec<Kline>) {
        bars.sort_by_key(|k| k.timestamp);
        bars.dedup_by_key(|k| k.timestamp);
        self.bars = bars;
    }

    /// Replaces the bar with the same timestamp or appends a newer one.
    /// Bars older than the last one are ignored.
    pub fn update(&mut self, bar: Kline) {
        match self.bars.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            Some(last) if last.timestamp > bar.timestamp => {
                if let Ok(idx) = self.bars.binary_search_by_key(&bar.timestamp, |k| k.timestamp) {
                    self.bars[idx] = bar;
                }
            }
            _ => self.bars.push(bar),
        }
    }

    pub fn bars(&self) -> &[Kline] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }
}

#[derive(Debug, Clone)]
pub struct Chart {
    pub style: ChartStyle,
    pub series: Option<CandleSeries>,
    pub title: String,
    /// When set, every bar of the series is in view.
    pub fit: bool,
    pub zoom: usize,
    pub offset: usize,
}

impl Chart {
    pub fn new(theme: &Theme) -> Self {
        Self {
            style: ChartStyle::from(theme),
            series: None,
            title: String::new(),
            fit: true,
            zoom: 1,
            offset: 0,
        }
    }

    pub fn apply_theme(&mut self, theme: &Theme) {
        self.style = ChartStyle::from(theme);
    }

    /// Drops the old series and installs a new one holding `bars`.
    pub fn replace_series(&mut self, title: String, bars: Vec<Kline>) {
        self.remove_series();
        let mut series = CandleSeries::default();
        series.set_data(bars);
        self.series = Some(series);
        self.title = title;
        self.offset = 0;
    }

    pub fn remove_series(&mut self) {
        self.series = None;
    }

    pub fn update(&mut self, bar: Kline) {
        if let Some(series) = self.series.as_mut() {
            series.update(bar);
        }
    }

    pub fn fit_content(&mut self) {
        self.fit = true;
        self.zoom = 1;
        self.offset = 0;
    }

    pub fn bar_count(&self) -> usize {
        self.series.as_ref().map_or(0, CandleSeries::len)
    }

    pub fn last_bar(&self) -> Option<&Kline> {
        self.series.as_ref().and_then(|s| s.bars().last())
    }

    pub fn zoom_in(&mut self) {
        self.fit = false;
        self.zoom = (self.zoom * 2).min(32);
    }

    pub fn zoom_out(&mut self) {
        self.fit = false;
        self.zoom = (self.zoom / 2).max(1);
    }

    pub fn pan_left(&mut self) {
        self.fit = false;
        let visible = self.visible_count();
        if self.offset + visible < self.bar_count() {
            self.offset += (visible / 4).max(1);
        }
    }

    pub fn pan_right(&mut self) {
        self.fit = false;
        self.offset = self.offset.saturating_sub((self.visible_count() / 4).max(1));
    }

    fn visible_count(&self) -> usize {
        if self.fit {
            self.bar_count().max(1)
        } else {
            (100 / self.zoom).max(10)
        }
    }

    pub fn visible_bars(&self) -> &[Kline] {
        let bars = match &self.series {
            Some(series) => series.bars(),
            None => return &[],
        };
        let end = bars.len().saturating_sub(self.offset);
        let start = end.saturating_sub(self.visible_count());
        &bars[start..end]
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),
                Constraint::Length(4),
                Constraint::Length(3),
            ])
            .split(area);

        let title = if self.title.is_empty() {
            "Chart".to_string()
        } else {
            self.title.clone()
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.style.grid))
            .style(Style::default().bg(self.style.background).fg(self.style.text));
        let chart_area = block.inner(vertical[0]);
        frame.render_widget(block, vertical[0]);

        let bars = bucket(self.visible_bars(), chart_area.width.saturating_sub(PRICE_GUTTER) as usize);
        if bars.is_empty() {
            let hint = Paragraph::new("No data. Pick an exchange and pair, then fetch.")
                .style(Style::default().fg(self.style.text))
                .alignment(ratatui::layout::Alignment::Center);
            frame.render_widget(hint, chart_area);
            return;
        }

        self.render_candlesticks(frame, chart_area, &bars);
        self.render_volume(frame, vertical[1], &bars);
        self.render_stats(frame, vertical[2]);
    }

    fn render_candlesticks(&self, frame: &mut Frame, area: Rect, bars: &[Kline]) {
        if area.width <= PRICE_GUTTER + 2 || area.height < 5 {
            return;
        }

        let (min_price, max_price) = bars
            .iter()
            .fold((f64::MAX, f64::MIN), |(min, max), k| (min.min(k.low), max.max(k.high)));

        let price_range = (max_price - min_price).max(0.0001);
        let chart_width = area.width.saturating_sub(PRICE_GUTTER);
        // bottom row carries the time axis
        let chart_height = area.height.saturating_sub(1);
        let candle_width = (chart_width as usize / bars.len().max(1)).max(1);

        let inner = Rect {
            x: area.x + PRICE_GUTTER,
            y: area.y,
            width: chart_width,
            height: chart_height,
        };
        let to_y = |price: f64| {
            inner.y + ((max_price - price) / price_range * (chart_height - 1) as f64) as u16
        };

        let label_count = 5.min(chart_height as usize / 2).max(1);
        for i in 0..=label_count {
            let y = inner.y + (i as u16) * (chart_height.saturating_sub(1)) / label_count as u16;
            for x in inner.x..inner.x + inner.width {
                frame.buffer_mut()[(x, y)].set_char('·').set_fg(self.style.grid);
            }

            let price = max_price - (i as f64 / label_count as f64) * price_range;
            let label = format!("{:>11.2}", price);
            for (j, ch) in label.chars().enumerate() {
                let x_pos = area.x + j as u16;
                if x_pos < inner.x {
                    frame.buffer_mut()[(x_pos, y)].set_char(ch).set_fg(self.style.text);
                }
            }
        }

        for (idx, bar) in bars.iter().enumerate() {
            let x = inner.x + (idx * candle_width) as u16 + candle_width as u16 / 2;
            if x >= inner.x + inner.width {
                break;
            }
            let color = if bar.is_bullish() {
                self.style.up
            } else {
                self.style.down
            };

            let (high_y, low_y) = (to_y(bar.high), to_y(bar.low));
            let (open_y, close_y) = (to_y(bar.open), to_y(bar.close));

            for y in high_y..=low_y {
                if y < inner.y + inner.height {
                    frame.buffer_mut()[(x, y)].set_char('│').set_fg(color);
                }
            }
            for y in open_y.min(close_y)..=open_y.max(close_y) {
                if y < inner.y + inner.height {
                    frame.buffer_mut()[(x, y)].set_char('█').set_fg(color);
                }
            }
        }

        let axis_y = inner.y + inner.height;
        if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
            let axis = Line::from(vec![
                Span::styled(format_time(first.time()), Style::default().fg(self.style.text)),
                Span::raw("  →  "),
                Span::styled(format_time(last.time()), Style::default().fg(self.style.text)),
            ]);
            frame.render_widget(
                Paragraph::new(axis),
                Rect {
                    x: inner.x,
                    y: axis_y,
                    width: inner.width,
                    height: 1,
                },
            );
        }
    }

    fn render_volume(&self, frame: &mut Frame, area: Rect, bars: &[Kline]) {
        if area.width <= PRICE_GUTTER || area.height < 2 {
            return;
        }

        let max_volume = bars.iter().fold(0.0f64, |a, k| a.max(k.volume));
        if max_volume <= 0.0 {
            return;
        }

        let chart_width = area.width.saturating_sub(PRICE_GUTTER);
        let chart_height = area.height;
        let candle_width = (chart_width as usize / bars.len().max(1)).max(1);

        for (idx, bar) in bars.iter().enumerate() {
            let x = area.x + PRICE_GUTTER + (idx * candle_width) as u16 + candle_width as u16 / 2;
            if x >= area.x + area.width {
                break;
            }
            let height = ((bar.volume / max_volume) * chart_height as f64) as u16;
            let color = if bar.is_bullish() {
                self.style.up
            } else {
                self.style.down
            };
            for y in (area.y + chart_height - height)..area.y + chart_height {
                frame.buffer_mut()[(x, y)].set_char('▊').set_fg(color);
            }
        }

        let label = Paragraph::new(Line::from(Span::styled(
            format!("Vol {:.2}", max_volume),
            Style::default().fg(self.style.text),
        )));
        frame.render_widget(
            label,
            Rect {
                x: area.x,
                y: area.y,
                width: PRICE_GUTTER - 1,
                height: 1,
            },
        );
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect) {
        let Some(latest) = self.last_bar() else {
            return;
        };

        let change = latest.close - latest.open;
        let change_pct = if latest.open > 0.0 {
            (change / latest.open) * 100.0
        } else {
            0.0
        };
        let change_color = if change >= 0.0 {
            self.style.up
        } else {
            self.style.down
        };
        let label = Style::default().fg(self.style.text).add_modifier(Modifier::DIM);
        let value = Style::default().fg(self.style.text);

        let stats_text = Line::from(vec![
            Span::styled("O: ", label),
            Span::styled(format!("{:.2}  ", latest.open), value),
            Span::styled("H: ", label),
            Span::styled(format!("{:.2}  ", latest.high), Style::default().fg(self.style.up)),
            Span::styled("L: ", label),
            Span::styled(format!("{:.2}  ", latest.low), Style::default().fg(self.style.down)),
            Span::styled("C: ", label),
            Span::styled(format!("{:.2}  ", latest.close), value),
            Span::styled("Vol: ", label),
            Span::styled(format!("{:.2}  ", latest.volume), value),
            Span::styled("Chg: ", label),
            Span::styled(
                format!("{:+.2}%", change_pct),
                Style::default().fg(change_color).add_modifier(Modifier::BOLD),
            ),
        ]);

        let stats_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.style.grid))
            .style(Style::default().bg(self.style.background));
        frame.render_widget(Paragraph::new(stats_text).block(stats_block), area);
    }
}

fn format_time(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Merges consecutive bars so that at most `columns` remain.
pub fn bucket(bars: &[Kline], columns: usize) -> Vec<Kline> {
    if columns == 0 || bars.is_empty() {
        return Vec::new();
    }
    if bars.len() <= columns {
        return bars.to_vec();
    }

    let per_bucket = bars.len().div_ceil(columns);
    bars.chunks(per_bucket)
        .map(|chunk| {
            let first = chunk[0];
            let last = chunk[chunk.len() - 1];
            Kline {
                timestamp: first.timestamp,
                open: first.open,
                close: last.close,
                high: chunk.iter().fold(f64::MIN, |m, k| m.max(k.high)),
                low: chunk.iter().fold(f64::MAX, |m, k| m.min(k.low)),
                volume: chunk.iter().map(|k| k.volume).sum(),
            }
        })
        .collect()
}
