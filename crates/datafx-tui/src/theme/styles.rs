//! Semantic style builders

use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};

use super::palette;

// --- Text styles ---
pub fn text_primary() -> Style {
    Style::default().fg(palette::TEXT_PRIMARY)
}

pub fn text_secondary() -> Style {
    Style::default().fg(palette::TEXT_SECONDARY)
}

pub fn text_muted() -> Style {
    Style::default().fg(palette::TEXT_MUTED)
}

// --- Interactive nodes ---
pub fn button() -> Style {
    Style::default().fg(palette::ACCENT)
}

pub fn button_focused() -> Style {
    Style::default()
        .fg(palette::DEEPEST_BG)
        .bg(palette::ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn text_field() -> Style {
    Style::default()
        .fg(palette::TEXT_PRIMARY)
        .add_modifier(Modifier::UNDERLINED)
}

// --- Status styles ---
pub fn status_red() -> Style {
    Style::default().fg(palette::STATUS_RED)
}

// --- Blocks ---
pub fn tab_block(focused: bool) -> Block<'static> {
    let border = if focused {
        palette::BORDER_ACTIVE
    } else {
        palette::BORDER_DIM
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
}

pub fn stage_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette::BORDER_ACTIVE))
        .style(Style::default().bg(palette::DEEPEST_BG))
}
