use crate::app::ChartViewController;
use crate::ui::Theme;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

pub struct StatusBar {
    pub loading: bool,
    pub polling: bool,
    pub bars: usize,
}

impl StatusBar {
    pub fn from_controller(controller: &ChartViewController) -> Self {
        Self {
            loading: controller.loading,
            polling: controller.is_polling(),
            bars: controller.chart.as_ref().map_or(0, |c| c.bar_count()),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let (status_color, status_text, label) = if self.loading {
            (theme.accent, "◌", "LOADING")
        } else if self.polling {
            (theme.up, "●", "LIVE")
        } else {
            (theme.hint, "○", "IDLE")
        };
        let key = Style::default().fg(theme.accent);
        let text_style = Style::default().fg(theme.text);

        let text = Line::from(vec![
            Span::styled(format!("{} ", status_text), Style::default().fg(status_color)),
            Span::styled(label, text_style),
            Span::styled(format!(" {} bars", self.bars), Style::default().fg(theme.hint)),
            Span::raw(" | "),
            Span::styled("Q", key),
            Span::raw(":Quit "),
            Span::styled("Tab", key),
            Span::raw(":Next "),
            Span::styled("↑↓", key),
            Span::raw(":Nav "),
            Span::styled("Enter", key),
            Span::raw(":Select "),
            Span::styled("F", key),
            Span::raw(":Fetch "),
            Span::styled("+/-", key),
            Span::raw(":Zoom "),
            Span::styled("[ ]", key),
            Span::raw(":Pan "),
            Span::styled("T", key),
            Span::raw(":Theme"),
        ]);

        let para = Paragraph::new(text).block(Block::default()).style(theme.base());
        frame.render_widget(para, area);
    }
}
