use ratatui::{
    prelude::*,
    widgets::Paragraph,
};

use crate::app::{StatusMessage, ViewMode};
use crate::ui::{footer_layout, key_desc_span, key_span, Theme};

/// Keybinding definition
pub struct KeyBinding {
    pub key: &'static str,
    pub desc: &'static str,
}

/// Status bar component (bottom of screen): message line and keybindings
pub struct StatusBar;

impl StatusBar {
    /// Get keybindings for the chart view
    pub fn chart_keybindings() -> Vec<KeyBinding> {
        vec![
            KeyBinding { key: "Tab", desc: "view" },
            KeyBinding { key: "1-9", desc: "toggle" },
            KeyBinding { key: "a", desc: "show all" },
            KeyBinding { key: "r", desc: "reload" },
            KeyBinding { key: "s", desc: "save png" },
            KeyBinding { key: "?", desc: "help" },
            KeyBinding { key: "q", desc: "quit" },
        ]
    }

    /// Get keybindings for the table view
    pub fn table_keybindings() -> Vec<KeyBinding> {
        vec![
            KeyBinding { key: "↑↓", desc: "scroll" },
            KeyBinding { key: "g/G", desc: "top/end" },
            KeyBinding { key: "Tab", desc: "view" },
            KeyBinding { key: "r", desc: "reload" },
            KeyBinding { key: "q", desc: "quit" },
        ]
    }

    /// Get keybindings for the stats view
    pub fn stats_keybindings() -> Vec<KeyBinding> {
        vec![
            KeyBinding { key: "Tab", desc: "view" },
            KeyBinding { key: "r", desc: "reload" },
            KeyBinding { key: "s", desc: "save png" },
            KeyBinding { key: "q", desc: "quit" },
        ]
    }

    pub fn keybindings(view: ViewMode) -> Vec<KeyBinding> {
        match view {
            ViewMode::Chart => Self::chart_keybindings(),
            ViewMode::Table => Self::table_keybindings(),
            ViewMode::Stats => Self::stats_keybindings(),
        }
    }

    pub fn render(frame: &mut Frame, area: Rect, view: ViewMode, message: Option<&StatusMessage>) {
        let (message_area, keys_area) = footer_layout(area);

        if let Some(message) = message {
            let color = if message.is_error { Theme::ERROR } else { Theme::OK };
            let line = Paragraph::new(format!(" {}", message.text))
                .style(Style::default().fg(color));
            frame.render_widget(line, message_area);
        }

        let mut spans: Vec<Span> = Vec::new();
        for kb in Self::keybindings(view) {
            spans.push(key_span(kb.key));
            spans.push(key_desc_span(kb.desc));
        }

        let keys_line = Line::from(spans);
        let keys_widget = Paragraph::new(keys_line)
            .style(Style::default().bg(Theme::BG_DARK))
            .alignment(Alignment::Center);
        frame.render_widget(keys_widget, keys_area);
    }
}
