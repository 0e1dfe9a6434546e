use crate::app::controls::{Controls, Focus};
use crate::app::error::ChartError;
use crate::data::{ApiError, Exchange, Kline, KlineQuery, RequestParams, SymbolList};
use crate::ui::{Chart, Theme, Timeframe};
use std::time::{Duration, Instant};

pub const POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const ERROR_DISPLAY: Duration = Duration::from_secs(5);

/// Historical loads with at most this many bars keep the current viewport.
const FIT_THRESHOLD: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Manual,
    Poll,
}

/// Network work requested by the controller. Each command carries the
/// generation it was issued under so its result can be matched back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchExchanges {
        generation: u64,
    },
    FetchSymbols {
        generation: u64,
        exchange_id: String,
    },
    FetchKlines {
        generation: u64,
        mode: FetchMode,
        query: KlineQuery,
    },
}

#[derive(Debug)]
pub enum Loaded {
    Exchanges(Result<Vec<Exchange>, ApiError>),
    Symbols(Result<SymbolList, ApiError>),
    Klines {
        mode: FetchMode,
        result: Result<Vec<Kline>, ApiError>,
    },
}

#[derive(Debug)]
pub struct Response {
    pub generation: u64,
    pub loaded: Loaded,
}

#[derive(Debug, Clone)]
pub struct ErrorBanner {
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct PollTimer {
    next_due: Instant,
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub poll_interval: Duration,
    pub error_display: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            error_display: ERROR_DISPLAY,
        }
    }
}

/// Owns the control panel, the chart, the polling timer and the request
/// parameters of the last manual fetch. Performs no I/O: it hands out
/// [`Command`]s and consumes [`Response`]s.
pub struct ChartViewController {
    pub controls: Controls,
    pub chart: Option<Chart>,
    pub theme: Theme,
    pub loading: bool,
    pub error: Option<ErrorBanner>,
    params: Option<RequestParams>,
    poll: Option<PollTimer>,
    generation: u64,
    settings: ControllerSettings,
    preferred_exchange: Option<String>,
}

impl ChartViewController {
    pub fn new(timeframe: Timeframe, theme: Theme, settings: ControllerSettings) -> Self {
        let mut controls = Controls::new(timeframe);
        controls.set_all_disabled(true);
        Self {
            controls,
            chart: None,
            theme,
            loading: false,
            error: None,
            params: None,
            poll: None,
            generation: 0,
            settings,
            preferred_exchange: None,
        }
    }

    /// Exchange to put the cursor on once the list arrives.
    pub fn prefer_exchange(&mut self, exchange_id: Option<String>) {
        self.preferred_exchange = exchange_id;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_some()
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn show_error(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        tracing::info!(%message, "showing error");
        self.error = Some(ErrorBanner {
            message,
            expires_at: now + self.settings.error_display,
        });
    }

    fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn load_exchanges(&mut self) -> Command {
        self.loading = true;
        self.clear_error();
        Command::FetchExchanges {
            generation: self.bump(),
        }
    }

    fn on_exchanges(&mut self, result: Result<Vec<Exchange>, ApiError>, now: Instant) {
        self.loading = false;
        match result {
            Ok(exchanges) => {
                tracing::info!(count = exchanges.len(), "exchanges loaded");
                let options = exchanges.into_iter().map(|e| (e.id, e.name)).collect();
                self.controls
                    .exchange
                    .populate(options, "-- choose an exchange --");
                if let Some(pos) = self
                    .preferred_exchange
                    .as_deref()
                    .and_then(|id| self.controls.exchange.position_of(id))
                {
                    self.controls.exchange.highlighted = pos;
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch exchanges");
                self.show_error(err.to_string(), now);
                self.controls.exchange.reset("load failed");
            }
        }
        self.controls.exchange.enabled = true;
        self.controls.set_downstream_disabled(true);
        self.controls.focus = Focus::Exchange;
    }

    /// Commits the exchange choice and loads its pairs.
    pub fn select_exchange(&mut self, index: Option<usize>) -> Option<Command> {
        self.stop_polling();
        self.bump();
        self.controls.search.value.clear();
        self.controls.exchange.selected = index.filter(|i| *i < self.controls.exchange.options.len());

        let exchange_id = self.controls.exchange.value().map(str::to_string);
        self.load_symbols(exchange_id)
    }

    pub fn load_symbols(&mut self, exchange_id: Option<String>) -> Option<Command> {
        let Some(exchange_id) = exchange_id.filter(|id| !id.is_empty()) else {
            self.loading = false;
            self.controls.pair.reset("choose an exchange");
            self.controls.exchange.enabled = true;
            self.controls.set_downstream_disabled(true);
            return None;
        };

        self.loading = true;
        self.clear_error();
        self.controls.pair.reset("loading pairs...");
        self.controls.set_all_disabled(true);
        Some(Command::FetchSymbols {
            generation: self.generation,
            exchange_id,
        })
    }

    fn on_symbols(&mut self, result: Result<SymbolList, ApiError>, now: Instant) {
        self.loading = false;
        self.controls.exchange.enabled = true;
        match result {
            Ok(SymbolList::Available(symbols)) => {
                tracing::info!(count = symbols.len(), "pairs loaded");
                let options = symbols.into_iter().map(|s| (s.clone(), s)).collect();
                self.controls.pair.populate(options, "-- choose a pair --");
                self.controls.set_downstream_disabled(false);
                self.controls.fetch_enabled = true;
                self.controls.focus = Focus::Pair;
            }
            Ok(SymbolList::Empty) => {
                tracing::info!("exchange has no usable pairs");
                self.controls.pair.reset("no pairs available");
                self.controls.set_downstream_disabled(true);
            }
            Ok(SymbolList::Unavailable(reason)) => {
                tracing::warn!(%reason, "exchange reported pairs unavailable");
                self.controls.pair.reset("no pairs available");
                self.controls.set_downstream_disabled(true);
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch pairs");
                self.show_error(err.to_string(), now);
                self.controls.pair.reset("load failed");
                self.controls.set_downstream_disabled(true);
            }
        }
    }

    pub fn select_pair(&mut self, index: Option<usize>) {
        self.stop_polling();
        self.bump();
        self.controls.pair.selected = index.filter(|i| *i < self.controls.pair.options.len());
        self.controls.fetch_enabled = self.controls.pair.value().is_some();
    }

    pub fn edit_search(&mut self, value: String) {
        self.stop_polling();
        self.bump();
        self.controls.search.value = value;
        if !self.controls.search.trimmed().is_empty() {
            self.controls.pair.selected = None;
        }
        self.controls.fetch_enabled =
            !self.controls.search.trimmed().is_empty() || self.controls.pair.value().is_some();
    }

    pub fn select_timeframe(&mut self, forward: bool) {
        self.stop_polling();
        self.bump();
        if forward {
            self.controls.timeframe.select_next();
        } else {
            self.controls.timeframe.select_prev();
        }
    }

    pub fn edit_start_time(&mut self, value: String) {
        self.stop_polling();
        self.bump();
        self.controls.start_time.value = value;
    }

    /// Manual chart load from the current form values.
    pub fn fetch_chart(&mut self, now: Instant) -> Option<Command> {
        let exchange_id = self.controls.exchange.value().unwrap_or_default().to_string();
        let raw_symbol = self.controls.raw_symbol().unwrap_or_default();
        self.params = Some(RequestParams {
            exchange_id,
            raw_symbol,
            timeframe: self.controls.timeframe.current(),
            start_time: self.controls.start_time_value(),
        });
        self.stop_polling();
        let generation = self.bump();

        let query = match self.manual_query() {
            Ok(query) => query,
            Err(err) => {
                self.show_error(err.to_string(), now);
                return None;
            }
        };

        tracing::info!(
            exchange = %query.exchange_id,
            symbol = %query.symbol,
            timeframe = query.timeframe.as_str(),
            since = ?query.since,
            limit = query.limit,
            "requesting klines"
        );
        self.loading = true;
        self.clear_error();
        self.controls.set_all_disabled(true);
        Some(Command::FetchKlines {
            generation,
            mode: FetchMode::Manual,
            query,
        })
    }

    fn manual_query(&self) -> Result<KlineQuery, ChartError> {
        let params = self
            .params
            .as_ref()
            .filter(|p| !p.exchange_id.is_empty() && !p.raw_symbol.is_empty())
            .ok_or(ChartError::MissingSelection)?;
        Ok(KlineQuery::initial(params)?)
    }

    /// Refresh of the newest bars with the parameters of the last manual
    /// fetch. Historical views are never refreshed.
    pub fn poll_chart(&self) -> Option<Command> {
        let params = self.params.as_ref().filter(|p| !p.is_historical())?;
        match KlineQuery::poll(params) {
            Ok(query) => {
                tracing::debug!(symbol = %query.symbol, "fetching price update");
                Some(Command::FetchKlines {
                    generation: self.generation,
                    mode: FetchMode::Poll,
                    query,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping price update");
                None
            }
        }
    }

    fn on_klines(&mut self, mode: FetchMode, result: Result<Vec<Kline>, ApiError>, now: Instant) {
        match mode {
            FetchMode::Manual => {
                self.loading = false;
                self.controls.set_all_disabled(false);
                match result {
                    Ok(klines) if klines.is_empty() => {
                        self.show_error(ChartError::NoData.to_string(), now);
                        if let Some(chart) = self.chart.as_mut() {
                            chart.remove_series();
                        }
                    }
                    Ok(klines) => {
                        tracing::info!(bars = klines.len(), "klines loaded");
                        self.draw_chart(klines);
                        if self.params.as_ref().is_some_and(|p| !p.is_historical()) {
                            self.start_polling(now);
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, status = ?err.status(), "failed to fetch klines");
                        self.show_error(ChartError::from(err).to_string(), now);
                    }
                }
            }
            FetchMode::Poll => match result {
                Ok(klines) => {
                    if let Some(chart) = self.chart.as_mut().filter(|c| c.series.is_some()) {
                        tracing::debug!(bars = klines.len(), "merging price update");
                        for kline in klines {
                            chart.update(kline);
                        }
                    }
                }
                Err(err) => tracing::warn!(error = %err, "price update failed"),
            },
        }
    }

    fn draw_chart(&mut self, klines: Vec<Kline>) {
        let historical = self.params.as_ref().is_some_and(RequestParams::is_historical);
        let bar_count = klines.len();
        let title = self.chart_title();

        let theme = self.theme;
        let chart = self.chart.get_or_insert_with(|| Chart::new(&theme));
        chart.apply_theme(&theme);
        chart.replace_series(title, klines);
        if !historical || bar_count > FIT_THRESHOLD {
            chart.fit_content();
        }
    }

    fn chart_title(&self) -> String {
        let Some(params) = &self.params else {
            return String::new();
        };
        let symbol = KlineQuery::initial(params)
            .map(|q| q.symbol)
            .unwrap_or_else(|_| params.raw_symbol.clone());
        let exchange = self
            .controls
            .exchange
            .label_of(&params.exchange_id)
            .unwrap_or(params.exchange_id.as_str());
        format!("{} · {} · {}", symbol, params.timeframe.label(), exchange)
    }

    fn start_polling(&mut self, now: Instant) {
        self.stop_polling();
        tracing::info!(period_secs = self.settings.poll_interval.as_secs(), "starting price update timer");
        self.poll = Some(PollTimer {
            next_due: now + self.settings.poll_interval,
        });
    }

    pub fn stop_polling(&mut self) {
        if self.poll.take().is_some() {
            tracing::info!("stopping price update timer");
        }
    }

    /// Drives the banner expiry and the polling timer.
    pub fn on_tick(&mut self, now: Instant) -> Option<Command> {
        if self.error.as_ref().is_some_and(|e| now >= e.expires_at) {
            self.error = None;
        }

        let timer = self.poll.as_mut()?;
        if now < timer.next_due {
            return None;
        }
        timer.next_due = now + self.settings.poll_interval;
        self.poll_chart()
    }

    /// Applies a backend result, dropping it if the controls changed since
    /// the request went out.
    pub fn handle(&mut self, response: Response, now: Instant) {
        if response.generation != self.generation {
            tracing::debug!(
                generation = response.generation,
                current = self.generation,
                "dropping stale response"
            );
            return;
        }
        match response.loaded {
            Loaded::Exchanges(result) => self.on_exchanges(result, now),
            Loaded::Symbols(result) => self.on_symbols(result, now),
            Loaded::Klines { mode, result } => self.on_klines(mode, result, now),
        }
    }

    /// Host theme changed: repaint the panel and the chart.
    pub fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Some(chart) = self.chart.as_mut() {
            chart.apply_theme(&theme);
        }
    }

    pub fn teardown(&mut self) {
        self.stop_polling();
        self.bump();
        self.chart = None;
    }
}
