use ratatui::style::{Color, Style};

/// Palette shared by the control panel and the chart. Mirrors the host's
/// theme parameters: background, text, hint, link/button accent and the
/// secondary background used for grid lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub dark: bool,
    pub bg: Color,
    pub text: Color,
    pub hint: Color,
    pub accent: Color,
    pub secondary_bg: Color,
    pub up: Color,
    pub down: Color,
    pub error: Color,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            dark: false,
            bg: Color::Rgb(0xff, 0xff, 0xff),
            text: Color::Rgb(0x00, 0x00, 0x00),
            hint: Color::Rgb(0x70, 0x75, 0x79),
            accent: Color::Rgb(0x24, 0x81, 0xcc),
            secondary_bg: Color::Rgb(0xf0, 0xf0, 0xf0),
            up: Color::Rgb(0x26, 0xa6, 0x9a),
            down: Color::Rgb(0xef, 0x53, 0x50),
            error: Color::Rgb(0xd3, 0x2f, 0x2f),
        }
    }

    pub fn dark() -> Self {
        Self {
            dark: true,
            bg: Color::Rgb(0x17, 0x21, 0x2b),
            text: Color::Rgb(0xf5, 0xf5, 0xf5),
            hint: Color::Rgb(0x70, 0x79, 0x93),
            accent: Color::Rgb(0x53, 0x88, 0xc1),
            secondary_bg: Color::Rgb(0x23, 0x2e, 0x3c),
            up: Color::Rgb(0x26, 0xa6, 0x9a),
            down: Color::Rgb(0xef, 0x53, 0x50),
            error: Color::Rgb(0xff, 0x6b, 0x6b),
        }
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn toggled(&self) -> Self {
        Self::from_dark(!self.dark)
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.bg)
    }

    pub fn border(&self, focused: bool, enabled: bool) -> Style {
        match (focused, enabled) {
            (true, true) => Style::default().fg(self.accent),
            (_, false) => Style::default().fg(self.secondary_bg),
            _ => Style::default().fg(self.hint),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
