use crate::ui::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
}

impl Timeframe {
    pub fn all() -> Vec<Timeframe> {
        vec![
            Timeframe::OneMinute,
            Timeframe::FiveMinutes,
            Timeframe::FifteenMinutes,
            Timeframe::ThirtyMinutes,
            Timeframe::OneHour,
            Timeframe::FourHours,
            Timeframe::OneDay,
            Timeframe::OneWeek,
        ]
    }

    /// Wire value for the backend's `timeframe` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::ThirtyMinutes => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1d",
            Timeframe::OneWeek => "1w",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::ThirtyMinutes => "30m",
            Timeframe::OneHour => "1H",
            Timeframe::FourHours => "4H",
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "1W",
        }
    }
}

pub struct TimeframeSelector {
    pub timeframes: Vec<Timeframe>,
    pub selected: usize,
}

impl TimeframeSelector {
    pub fn from_timeframe(timeframe: Timeframe) -> Self {
        let timeframes = Timeframe::all();
        let selected = timeframes.iter().position(|tf| *tf == timeframe).unwrap_or(0);
        Self {
            timeframes,
            selected,
        }
    }

    pub fn current(&self) -> Timeframe {
        self.timeframes[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.timeframes.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = if self.selected == 0 {
            self.timeframes.len() - 1
        } else {
            self.selected - 1
        };
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme, focused: bool, enabled: bool) {
        let block = Block::default()
            .title("Timeframe")
            .borders(Borders::ALL)
            .border_style(theme.border(focused, enabled));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text: Vec<Span> = self
            .timeframes
            .iter()
            .enumerate()
            .flat_map(|(idx, tf)| {
                let style = if idx == self.selected && enabled {
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else if enabled {
                    Style::default().fg(theme.text)
                } else {
                    Style::default().fg(theme.hint)
                };
                vec![
                    Span::styled(tf.label(), style),
                    if idx < self.timeframes.len() - 1 {
                        Span::raw(" ")
                    } else {
                        Span::raw("")
                    },
                ]
            })
            .collect();

        let para = Paragraph::new(Line::from(text)).alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(para, inner);
    }
}
