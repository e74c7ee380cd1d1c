use ratatui::style::{Color, Modifier, Style};
use xpack_core::wizard::ProgressStatus;

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn search_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Field label; invalid fields are drawn in the error color
pub fn label_style(invalid: bool) -> Style {
    if invalid {
        error_style().add_modifier(Modifier::BOLD)
    } else {
        muted_style()
    }
}

/// Wizard control button, dimmed when disabled
pub fn button_style(enabled: bool) -> Style {
    if enabled {
        help_key_style()
    } else {
        muted_style().add_modifier(Modifier::DIM)
    }
}

/// Progress dot: glyph and style
pub fn progress_dot(status: ProgressStatus) -> (&'static str, Style) {
    match status {
        ProgressStatus::Completed => ("●", success_style()),
        ProgressStatus::Active => ("●", title_style()),
        ProgressStatus::Pending => ("○", muted_style()),
    }
}
