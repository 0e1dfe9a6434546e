use crate::app::controller::{ChartViewController, Command, Loaded, Response};
use crate::app::input::{handle_key, Action};
use crate::data::BackendClient;
use crate::ui;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const UI_TICK: Duration = Duration::from_millis(250);

pub struct App {
    controller: ChartViewController,
    client: BackendClient,
    tx: mpsc::Sender<Response>,
    rx: mpsc::Receiver<Response>,
}

impl App {
    pub fn new(controller: ChartViewController, client: BackendClient) -> Self {
        let (tx, rx) = mpsc::channel(64);
        Self {
            controller,
            client,
            tx,
            rx,
        }
    }

    pub fn controller(&self) -> &ChartViewController {
        &self.controller
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(UI_TICK);

        let command = self.controller.load_exchanges();
        self.execute(command);

        loop {
            terminal.draw(|frame| ui::render(frame, &self.controller))?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        match handle_key(&mut self.controller, key, Instant::now()) {
                            Action::Run(command) => self.execute(command),
                            Action::ThemeChanged => {
                                let theme = self.controller.theme.toggled();
                                tracing::info!(dark = theme.dark, "theme changed");
                                self.controller.apply_theme(theme);
                            }
                            Action::Quit => break,
                            Action::None => {}
                        }
                    }
                    // the next draw picks up the new size
                    Some(Ok(Event::Resize(width, height))) => {
                        tracing::debug!(width, height, "terminal resized");
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => break,
                },
                Some(response) = self.rx.recv() => {
                    self.controller.handle(response, Instant::now());
                }
                _ = ticker.tick() => {
                    if let Some(command) = self.controller.on_tick(Instant::now()) {
                        self.execute(command);
                    }
                }
            }
        }

        self.controller.teardown();
        Ok(())
    }

    /// Runs a command on its own task; the result comes back through the
    /// response channel.
    fn execute(&self, command: Command) {
        let client = self.client.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let response = match command {
                Command::FetchExchanges { generation } => Response {
                    generation,
                    loaded: Loaded::Exchanges(client.fetch_exchanges().await),
                },
                Command::FetchSymbols {
                    generation,
                    exchange_id,
                } => Response {
                    generation,
                    loaded: Loaded::Symbols(client.fetch_symbols(&exchange_id).await),
                },
                Command::FetchKlines {
                    generation,
                    mode,
                    query,
                } => Response {
                    generation,
                    loaded: Loaded::Klines {
                        mode,
                        result: client.fetch_klines(&query).await,
                    },
                },
            };
            if tx.send(response).await.is_err() {
                tracing::debug!("response channel closed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controller::ControllerSettings;
    use crate::data::test_server::serve_once;
    use crate::data::SymbolList;
    use crate::ui::{Theme, Timeframe};

    #[tokio::test]
    async fn executed_command_reports_back_under_its_generation() {
        let (url, _server) = serve_once(
            "200 OK",
            "application/json",
            r#"["BTC/USDT","Нет подходящих пар на бирже"]"#,
        )
        .await;
        let client = BackendClient::new(&url, Duration::from_secs(5)).unwrap();
        let controller =
            ChartViewController::new(Timeframe::OneHour, Theme::dark(), ControllerSettings::default());
        let mut app = App::new(controller, client);

        app.execute(Command::FetchSymbols {
            generation: 7,
            exchange_id: "binance".to_string(),
        });

        let response = tokio::time::timeout(Duration::from_secs(5), app.rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.generation, 7);
        match response.loaded {
            Loaded::Symbols(Ok(list)) => {
                assert_eq!(list, SymbolList::Available(vec!["BTC/USDT".to_string()]));
            }
            other => panic!("expected symbols, got {other:?}"),
        }
    }
}
