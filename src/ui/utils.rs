use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
};

use crate::app::App;
use crate::inventory::TransactionType;

/// Colour set for one theme. Dark mode swaps to the cool palette.
#[derive(Clone, Copy)]
pub struct Theme {
    pub base: Color,
    pub highlight: Color,
    pub dim: Color,
    pub text: Color,
}

impl Theme {
    pub fn for_app(app: &App) -> Theme {
        if app.dark_mode() {
            Theme {
                base: Color::Cyan,
                highlight: Color::LightBlue,
                dim: Color::DarkGray,
                text: Color::Gray,
            }
        } else {
            Theme {
                base: Color::Magenta,
                highlight: Color::LightRed,
                dim: Color::DarkGray,
                text: Color::White,
            }
        }
    }

    pub fn block<'a>(&self, title: &'a str) -> Block<'a> {
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.base))
    }

    pub fn key(&self, key: &'static str) -> Span<'static> {
        Span::styled(key, Style::default().fg(self.highlight).add_modifier(Modifier::BOLD))
    }
}

pub fn transaction_color(kind: TransactionType) -> Color {
    match kind {
        TransactionType::Add => Color::Green,
        TransactionType::Remove => Color::Red,
        TransactionType::Update => Color::Yellow,
        TransactionType::Transfer => Color::Blue,
    }
}
