use crate::app::controller::{ChartViewController, Command};
use crate::app::controls::Focus;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Run(Command),
    ThemeChanged,
    Quit,
}

impl From<Option<Command>> for Action {
    fn from(command: Option<Command>) -> Self {
        command.map_or(Action::None, Action::Run)
    }
}

/// Maps a key press onto the controller. Disabled controls ignore input.
pub fn handle_key(controller: &mut ChartViewController, key: KeyEvent, now: Instant) -> Action {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    let controls = &mut controller.controls;
    if !controls.is_enabled(controls.focus) && controls.any_enabled() {
        controls.focus_next();
    }
    let focus = controls.focus;
    let enabled = controls.is_enabled(focus);

    match key.code {
        KeyCode::Tab => {
            controller.controls.focus_next();
            return Action::None;
        }
        KeyCode::BackTab => {
            controller.controls.focus_prev();
            return Action::None;
        }
        KeyCode::Esc => return Action::Quit,
        _ => {}
    }

    if enabled {
        if let Some(action) = handle_focused(controller, focus, key, now) {
            return action;
        }
    }
    handle_global(controller, key, now)
}

fn handle_focused(
    controller: &mut ChartViewController,
    focus: Focus,
    key: KeyEvent,
    now: Instant,
) -> Option<Action> {
    let action = match (focus, key.code) {
        (Focus::Exchange, KeyCode::Up) => {
            controller.controls.exchange.highlight_prev();
            Action::None
        }
        (Focus::Exchange, KeyCode::Down) => {
            controller.controls.exchange.highlight_next();
            Action::None
        }
        (Focus::Exchange, KeyCode::Enter) => {
            let idx = controller.controls.exchange.highlighted;
            controller.select_exchange(Some(idx)).into()
        }
        (Focus::Exchange, KeyCode::Delete) => controller.select_exchange(None).into(),
        (Focus::Pair, KeyCode::Up) => {
            controller.controls.pair.highlight_prev();
            Action::None
        }
        (Focus::Pair, KeyCode::Down) => {
            controller.controls.pair.highlight_next();
            Action::None
        }
        (Focus::Pair, KeyCode::Enter) => {
            let idx = controller.controls.pair.highlighted;
            controller.select_pair(Some(idx));
            Action::None
        }
        (Focus::Timeframe, KeyCode::Left | KeyCode::Up) => {
            controller.select_timeframe(false);
            Action::None
        }
        (Focus::Timeframe, KeyCode::Right | KeyCode::Down) => {
            controller.select_timeframe(true);
            Action::None
        }
        (Focus::Search | Focus::StartTime, KeyCode::Char(ch)) => {
            edit_text(controller, focus, |value| value.push(ch));
            Action::None
        }
        (Focus::Search | Focus::StartTime, KeyCode::Backspace) => {
            edit_text(controller, focus, |value| {
                value.pop();
            });
            Action::None
        }
        (Focus::Search | Focus::StartTime | Focus::Fetch, KeyCode::Enter) => fetch(controller, now),
        _ => return None,
    };
    Some(action)
}

fn handle_global(controller: &mut ChartViewController, key: KeyEvent, now: Instant) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('t') => Action::ThemeChanged,
        KeyCode::Char('f') => fetch(controller, now),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            with_chart(controller, |chart| chart.zoom_in());
            Action::None
        }
        KeyCode::Char('-') => {
            with_chart(controller, |chart| chart.zoom_out());
            Action::None
        }
        KeyCode::Char('[') | KeyCode::Left => {
            with_chart(controller, |chart| chart.pan_left());
            Action::None
        }
        KeyCode::Char(']') | KeyCode::Right => {
            with_chart(controller, |chart| chart.pan_right());
            Action::None
        }
        KeyCode::Char('0') => {
            with_chart(controller, |chart| chart.fit_content());
            Action::None
        }
        _ => Action::None,
    }
}

fn fetch(controller: &mut ChartViewController, now: Instant) -> Action {
    if !controller.controls.fetch_enabled {
        return Action::None;
    }
    controller.fetch_chart(now).into()
}

fn edit_text(controller: &mut ChartViewController, focus: Focus, edit: impl FnOnce(&mut String)) {
    let mut value = match focus {
        Focus::Search => controller.controls.search.value.clone(),
        _ => controller.controls.start_time.value.clone(),
    };
    edit(&mut value);
    match focus {
        Focus::Search => controller.edit_search(value),
        _ => controller.edit_start_time(value),
    }
}

fn with_chart(controller: &mut ChartViewController, f: impl FnOnce(&mut crate::ui::Chart)) {
    if let Some(chart) = controller.chart.as_mut() {
        f(chart);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controller::{ControllerSettings, Loaded, Response};
    use crate::data::{Exchange, SymbolList};
    use crate::ui::{Theme, Timeframe};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded_controller(now: Instant) -> ChartViewController {
        let mut c =
            ChartViewController::new(Timeframe::OneHour, Theme::light(), ControllerSettings::default());
        let cmd = c.load_exchanges();
        let generation = match cmd {
            Command::FetchExchanges { generation } => generation,
            _ => unreachable!(),
        };
        c.handle(
            Response {
                generation,
                loaded: Loaded::Exchanges(Ok(vec![
                    Exchange { id: "binance".into(), name: "Binance".into() },
                    Exchange { id: "kucoin".into(), name: "KuCoin".into() },
                ])),
            },
            now,
        );
        c
    }

    #[test]
    fn enter_on_exchange_commits_highlighted_row() {
        let now = Instant::now();
        let mut c = loaded_controller(now);
        assert_eq!(handle_key(&mut c, press(KeyCode::Down), now), Action::None);
        match handle_key(&mut c, press(KeyCode::Enter), now) {
            Action::Run(Command::FetchSymbols { exchange_id, .. }) => assert_eq!(exchange_id, "kucoin"),
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn typing_in_search_edits_and_enter_fetches() {
        let now = Instant::now();
        let mut c = loaded_controller(now);
        let cmd = c.select_exchange(Some(0)).unwrap();
        let generation = match cmd {
            Command::FetchSymbols { generation, .. } => generation,
            _ => unreachable!(),
        };
        c.handle(
            Response {
                generation,
                loaded: Loaded::Symbols(Ok(SymbolList::Available(vec!["BTC/USDT".into()]))),
            },
            now,
        );

        handle_key(&mut c, press(KeyCode::Tab), now);
        assert_eq!(c.controls.focus, Focus::Search);
        for ch in "btcusdt".chars() {
            handle_key(&mut c, press(KeyCode::Char(ch)), now);
        }
        handle_key(&mut c, press(KeyCode::Backspace), now);
        handle_key(&mut c, press(KeyCode::Char('t')), now);
        assert_eq!(c.controls.search.value, "btcusdt");

        match handle_key(&mut c, press(KeyCode::Enter), now) {
            Action::Run(Command::FetchKlines { query, .. }) => assert_eq!(query.symbol, "BTC/USDT"),
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn disabled_controls_ignore_keys() {
        let now = Instant::now();
        let mut c = loaded_controller(now);
        assert_eq!(handle_key(&mut c, press(KeyCode::Char('f')), now), Action::None);
        assert_eq!(c.controls.focus, Focus::Exchange);
        assert_eq!(handle_key(&mut c, press(KeyCode::Char('t')), now), Action::ThemeChanged);
        assert_eq!(handle_key(&mut c, press(KeyCode::Char('q')), now), Action::Quit);
    }
}
