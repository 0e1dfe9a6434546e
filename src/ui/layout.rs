use crate::app::controls::{Focus, ListSelect, TextInput};
use crate::app::ChartViewController;
use crate::ui::{Chart, StatusBar, Theme};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const PANEL_WIDTH: u16 = 28;

pub fn render(frame: &mut Frame, controller: &ChartViewController) {
    let theme = &controller.theme;
    let area = frame.area();
    frame.render_widget(Block::default().style(theme.base()), area);

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(area);

    let controls = &controller.controls;
    controls.timeframe.render(
        frame,
        main_chunks[0],
        theme,
        controls.focus == Focus::Timeframe,
        controls.timeframe_enabled,
    );

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(PANEL_WIDTH), Constraint::Min(40)])
        .split(main_chunks[1]);

    render_panel(frame, content_chunks[0], controller);

    match &controller.chart {
        Some(chart) => chart.render(frame, content_chunks[1]),
        None => Chart::new(theme).render(frame, content_chunks[1]),
    }

    StatusBar::from_controller(controller).render(frame, main_chunks[2], theme);

    if let Some(banner) = &controller.error {
        render_error(frame, content_chunks[1], &banner.message, theme);
    }
}

fn render_panel(frame: &mut Frame, area: Rect, controller: &ChartViewController) {
    let controls = &controller.controls;
    let theme = &controller.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    render_select(frame, chunks[0], "Exchange", &controls.exchange, theme, controls.focus == Focus::Exchange);
    render_select(frame, chunks[1], "Pair", &controls.pair, theme, controls.focus == Focus::Pair);
    render_input(
        frame,
        chunks[2],
        "Search (e.g. BTCUSDT)",
        &controls.search,
        theme,
        controls.focus == Focus::Search,
    );
    render_input(
        frame,
        chunks[3],
        "Start (UTC, optional)",
        &controls.start_time,
        theme,
        controls.focus == Focus::StartTime,
    );

    let focused = controls.focus == Focus::Fetch;
    let label_style = if controls.fetch_enabled {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.hint)
    };
    let label = if controller.loading { "Loading..." } else { "Show chart" };
    let button = Paragraph::new(Span::styled(label, label_style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border(focused, controls.fetch_enabled)),
        );
    frame.render_widget(button, chunks[4]);
}

fn render_select(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    select: &ListSelect,
    theme: &Theme,
    focused: bool,
) {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(theme.border(focused, select.enabled));

    if select.options.is_empty() {
        let para = Paragraph::new(Span::styled(
            select.placeholder.as_str(),
            Style::default().fg(theme.hint),
        ))
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(para, area);
        return;
    }

    let items: Vec<ListItem> = select
        .options
        .iter()
        .enumerate()
        .map(|(idx, (_, label))| {
            let style = if Some(idx) == select.selected {
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
            } else if select.enabled {
                Style::default().fg(theme.text)
            } else {
                Style::default().fg(theme.hint)
            };
            let marker = if Some(idx) == select.selected { "● " } else { "  " };
            ListItem::new(Line::from(vec![Span::raw(marker), Span::styled(label.as_str(), style)]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(theme.secondary_bg));
    let mut state = ListState::default();
    if focused && select.enabled {
        state.select(Some(select.highlighted));
    } else {
        state.select(select.selected);
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_input(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    input: &TextInput,
    theme: &Theme,
    focused: bool,
) {
    let text_style = if input.enabled {
        Style::default().fg(theme.text)
    } else {
        Style::default().fg(theme.hint)
    };
    let mut spans = vec![Span::styled(input.value.as_str(), text_style)];
    if focused && input.enabled {
        spans.push(Span::styled("▏", Style::default().fg(theme.accent)));
    }
    let para = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(theme.border(focused, input.enabled)),
    );
    frame.render_widget(para, area);
}

fn render_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let width = area.width.saturating_sub(4).min(60);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + 1,
        width,
        height: 4.min(area.height),
    }
    .intersection(area);
    if popup.is_empty() {
        return;
    }
    let para = Paragraph::new(message)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.error).bg(theme.bg))
        .block(
            Block::default()
                .title("Error")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.error)),
        );
    frame.render_widget(Clear, popup);
    frame.render_widget(para, popup);
}
