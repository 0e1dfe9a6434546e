use crate::ui::{Timeframe, TimeframeSelector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Exchange,
    Pair,
    Search,
    Timeframe,
    StartTime,
    Fetch,
}

impl Focus {
    const ORDER: [Focus; 6] = [
        Focus::Exchange,
        Focus::Pair,
        Focus::Search,
        Focus::Timeframe,
        Focus::StartTime,
        Focus::Fetch,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// A drop-down: a list of `(value, label)` options, the committed selection
/// and the row the cursor is on.
#[derive(Debug, Clone, Default)]
pub struct ListSelect {
    pub options: Vec<(String, String)>,
    pub placeholder: String,
    pub selected: Option<usize>,
    pub highlighted: usize,
    pub enabled: bool,
}

impl ListSelect {
    pub fn with_placeholder(placeholder: &str) -> Self {
        Self {
            placeholder: placeholder.to_string(),
            ..Self::default()
        }
    }

    /// Drops all options and shows `placeholder` instead.
    pub fn reset(&mut self, placeholder: &str) {
        self.options.clear();
        self.placeholder = placeholder.to_string();
        self.selected = None;
        self.highlighted = 0;
    }

    pub fn populate(&mut self, options: Vec<(String, String)>, placeholder: &str) {
        self.reset(placeholder);
        self.options = options;
    }

    pub fn value(&self) -> Option<&str> {
        self.selected
            .and_then(|idx| self.options.get(idx))
            .map(|(value, _)| value.as_str())
    }

    pub fn label_of(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, label)| label.as_str())
    }

    pub fn position_of(&self, value: &str) -> Option<usize> {
        self.options.iter().position(|(v, _)| v == value)
    }

    pub fn highlight_next(&mut self) {
        if !self.options.is_empty() {
            self.highlighted = (self.highlighted + 1) % self.options.len();
        }
    }

    pub fn highlight_prev(&mut self) {
        if !self.options.is_empty() {
            self.highlighted = self
                .highlighted
                .checked_sub(1)
                .unwrap_or(self.options.len() - 1);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub value: String,
    pub enabled: bool,
}

impl TextInput {
    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }
}

pub struct Controls {
    pub exchange: ListSelect,
    pub pair: ListSelect,
    pub search: TextInput,
    pub timeframe: TimeframeSelector,
    pub timeframe_enabled: bool,
    pub start_time: TextInput,
    pub fetch_enabled: bool,
    pub focus: Focus,
}

impl Controls {
    pub fn new(timeframe: Timeframe) -> Self {
        Self {
            exchange: ListSelect::with_placeholder("loading exchanges..."),
            pair: ListSelect::with_placeholder("choose an exchange"),
            search: TextInput::default(),
            timeframe: TimeframeSelector::from_timeframe(timeframe),
            timeframe_enabled: false,
            start_time: TextInput::default(),
            fetch_enabled: false,
            focus: Focus::Exchange,
        }
    }

    pub fn set_all_disabled(&mut self, disabled: bool) {
        self.exchange.enabled = !disabled;
        self.set_downstream_disabled(disabled);
        self.fetch_enabled = !disabled;
    }

    /// Pair, search, timeframe and start time; fetch is managed separately.
    pub fn set_downstream_disabled(&mut self, disabled: bool) {
        self.pair.enabled = !disabled;
        self.search.enabled = !disabled;
        self.timeframe_enabled = !disabled;
        self.start_time.enabled = !disabled;
        if disabled {
            self.fetch_enabled = false;
        }
    }

    pub fn is_enabled(&self, focus: Focus) -> bool {
        match focus {
            Focus::Exchange => self.exchange.enabled,
            Focus::Pair => self.pair.enabled,
            Focus::Search => self.search.enabled,
            Focus::Timeframe => self.timeframe_enabled,
            Focus::StartTime => self.start_time.enabled,
            Focus::Fetch => self.fetch_enabled,
        }
    }

    pub fn any_enabled(&self) -> bool {
        Focus::ORDER.iter().any(|f| self.is_enabled(*f))
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(Focus::ORDER.len() - 1);
    }

    fn move_focus(&mut self, step: usize) {
        let len = Focus::ORDER.len();
        let start = self.focus.index();
        for i in 1..=len {
            let candidate = Focus::ORDER[(start + i * step) % len];
            if self.is_enabled(candidate) {
                self.focus = candidate;
                return;
            }
        }
    }

    /// Symbol the user asked for: typed text wins over the list selection.
    pub fn raw_symbol(&self) -> Option<String> {
        let typed = self.search.trimmed().to_uppercase();
        if !typed.is_empty() {
            return Some(typed);
        }
        self.pair.value().map(str::to_string)
    }

    pub fn start_time_value(&self) -> Option<String> {
        let value = self.start_time.trimmed();
        (!value.is_empty()).then(|| value.to_string())
    }
}
