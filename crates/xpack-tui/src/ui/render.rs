use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use xpack_core::utils::{format_currency, truncate_string};
use xpack_core::wizard::{FieldKind, FieldRef, FieldState, GroupRef, GroupState, Marker};

use crate::app::{App, AppState, Focus};

use super::styles;

/// Columns per shake pixel
const SHAKE_SCALE: i16 = 4;

/// Visible tiles shown at once
const TILE_ROWS: usize = 6;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_registrations(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    if app.wizard.is_open() {
        render_wizard(frame, app);
    }

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  XPACK · Registro de residentes";
    let help_hint = "[?] Ayuda";
    let title_len = title.chars().count();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title_len as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

/// Registered residents on the left, JSON of the latest submission on the right
fn render_registrations(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let mut lines = Vec::new();
    if app.registrations.is_empty() {
        lines.push(Line::from(Span::styled(
            " No hay residentes registrados.",
            styles::muted_style(),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(" Presiona ", styles::muted_style()),
            Span::styled("[n]", styles::help_key_style()),
            Span::styled(" para registrar uno.", styles::muted_style()),
        ]));
    }
    for registration in &app.registrations {
        let fee = registration
            .monthly_fee()
            .map(format_currency)
            .unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {:<18}", truncate_string(registration.name(), 17)),
                styles::list_item_style(),
            ),
            Span::styled(format!("{:<7}", registration.apartment()), styles::highlight_style()),
            Span::styled(
                format!("{:<5}", if registration.is_owner() { "prop." } else { "" }),
                styles::muted_style(),
            ),
            Span::styled(format!("{:>13}", fee), styles::success_style()),
            Span::styled(
                format!(" {}", registration.submitted_at.format("%H:%M")),
                styles::muted_style(),
            ),
        ]));
    }

    let list = Paragraph::new(lines).block(
        Block::default()
            .title(" Residentes ")
            .borders(Borders::ALL)
            .border_style(styles::border_style(!app.wizard.is_open())),
    );
    frame.render_widget(list, columns[0]);

    let json = app
        .last_registration()
        .map(|r| r.to_json())
        .unwrap_or_default();
    let dump = Paragraph::new(json)
        .style(styles::muted_style())
        .block(
            Block::default()
                .title(" Último envío ")
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        );
    frame.render_widget(dump, columns[1]);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = if app.wizard.is_open() {
        "[Tab] campo | [Enter] siguiente | [Esc] cerrar"
    } else {
        "[n]uevo | [q]uit"
    };

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => format!(" {} residentes ", app.registrations.len()),
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Wizard overlay
// ============================================================================

fn render_wizard(frame: &mut Frame, app: &App) {
    let Some(view) = app.wizard.view() else { return };
    let Some(step) = app.current_step() else { return };
    let step_index = app.wizard.current_step();
    let now = Instant::now();

    let area = centered_rect_fixed(64, 24, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = Vec::new();

    // Progress dots and counter
    let mut header: Vec<Span> = vec![Span::raw(" ")];
    for status in &view.progress {
        let (glyph, style) = styles::progress_dot(*status);
        header.push(Span::styled(glyph, style));
        header.push(Span::raw(" "));
    }
    if let Some(ref counter) = view.counter {
        header.push(Span::raw("  "));
        header.push(Span::styled(counter.clone(), styles::muted_style()));
    }
    lines.push(Line::from(header));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(format!(" {}", step.title), styles::title_style())));
    lines.push(Line::from(""));

    let focus = app.current_focus();
    for (index, field) in step.fields.iter().enumerate() {
        if !field.kind().is_focusable() {
            continue;
        }
        let field_ref = FieldRef { step: step_index, field: index };
        let focused = focus == Some(Focus::Field(field_ref));
        lines.extend(field_lines(field, focused, now));
    }

    for (index, group) in step.groups.iter().enumerate() {
        let group_ref = GroupRef { step: step_index, group: index };
        let focused = focus == Some(Focus::Group(group_ref));
        lines.extend(group_lines(app, group, group_ref, focused, now));
    }

    if let Some(fee) = app.fee_summary() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(" Cuota mensual: ", styles::muted_style()),
            Span::styled(fee, styles::success_style()),
        ]));
    }

    // Controls
    lines.push(Line::from(""));
    let mut controls = vec![Span::raw(" ")];
    if view.back_visible {
        controls.push(Span::styled("[PgUp] Atrás", styles::help_key_style()));
        controls.push(Span::raw("   "));
    }
    if view.next_visible {
        controls.push(Span::styled("[PgDn] Siguiente", styles::button_style(view.next_enabled)));
        controls.push(Span::raw("   "));
    }
    if view.submit_visible {
        controls.push(Span::styled("[Ctrl+S] Registrar", styles::help_key_style()));
    }
    lines.push(Line::from(controls));

    let block = Block::default()
        .title(" Nuevo residente ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Leading padding, shifted while a shake animation runs
fn indent(marker: &Marker, now: Instant) -> String {
    let base: i16 = 2;
    let shift = base + marker.shake_offset(now) / SHAKE_SCALE;
    " ".repeat(shift.max(0) as usize)
}

fn field_lines(field: &FieldState, focused: bool, now: Instant) -> Vec<Line<'static>> {
    let pad = indent(&field.marker, now);
    let required = if field.spec.required { " *" } else { "" };
    let value_style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };

    match field.kind() {
        FieldKind::Checkbox => {
            let mark = if field.checked { "[x]" } else { "[ ]" };
            vec![Line::from(vec![
                Span::raw(pad),
                Span::styled(mark.to_string(), value_style),
                Span::styled(
                    format!(" {}{}", field.spec.label, required),
                    styles::label_style(field.marker.invalid),
                ),
            ])]
        }
        FieldKind::Select => vec![Line::from(vec![
            Span::raw(pad),
            Span::styled(
                format!("{}{}: ", field.spec.label, required),
                styles::label_style(field.marker.invalid),
            ),
            Span::styled(format!("◀ {} ▶", field.value), value_style),
        ])],
        FieldKind::TextArea => {
            let mut lines = vec![Line::from(vec![
                Span::raw(pad.clone()),
                Span::styled(
                    format!("{}{}:", field.spec.label, required),
                    styles::label_style(field.marker.invalid),
                ),
            ])];
            let text = format!("{}{}", field.value, cursor);
            for row in text.split('\n') {
                lines.push(Line::from(vec![
                    Span::raw(format!("{}  ", pad)),
                    Span::styled(row.to_string(), value_style),
                ]));
            }
            lines
        }
        _ => vec![Line::from(vec![
            Span::raw(pad),
            Span::styled(
                format!("{}{}: ", field.spec.label, required),
                styles::label_style(field.marker.invalid),
            ),
            Span::styled("[", styles::muted_style()),
            Span::styled(format!("{:<24}{}", field.value, cursor), value_style),
            Span::styled("]", styles::muted_style()),
        ])],
    }
}

fn group_lines(
    app: &App,
    group: &GroupState,
    group_ref: GroupRef,
    focused: bool,
    now: Instant,
) -> Vec<Line<'static>> {
    let pad = indent(&group.marker, now);
    let mut lines = Vec::new();

    let searching = focused && matches!(app.state, AppState::Searching);
    if searching || (focused && !app.search_query.is_empty()) {
        lines.push(Line::from(vec![
            Span::raw(pad.clone()),
            Span::styled("Buscar: ", styles::muted_style()),
            Span::styled(
                format!("{}{}", app.search_query, if searching { "▌" } else { "" }),
                styles::search_style(),
            ),
        ]));
    } else if focused {
        lines.push(Line::from(vec![
            Span::raw(pad.clone()),
            Span::styled("[/] buscar  [Espacio] elegir", styles::muted_style()),
        ]));
    }

    if group.marker.invalid {
        lines.push(Line::from(vec![
            Span::raw(pad.clone()),
            Span::styled("Selecciona una opción", styles::error_style()),
        ]));
    }

    let visible = app.visible_tiles(group_ref);
    if visible.is_empty() {
        lines.push(Line::from(vec![
            Span::raw(pad),
            Span::styled("Sin resultados", styles::muted_style()),
        ]));
        return lines;
    }

    // Keep the cursor in view
    let cursor_pos = visible.iter().position(|i| *i == app.tile_cursor).unwrap_or(0);
    let start = cursor_pos.saturating_sub(TILE_ROWS - 1);
    for &index in visible.iter().skip(start).take(TILE_ROWS) {
        let tile = &group.tiles[index];
        let radio = if tile.selected { "(•)" } else { "( )" };
        let style = if focused && index == app.tile_cursor {
            styles::selected_style()
        } else if tile.selected {
            styles::highlight_style()
        } else {
            styles::list_item_style()
        };
        let mut spans = vec![
            Span::raw(pad.clone()),
            Span::styled(format!("{} {}", radio, tile.spec.title), style),
        ];
        if let Some(ref desc) = tile.spec.description {
            spans.push(Span::styled(format!("  {}", desc), styles::muted_style()));
        }
        lines.push(Line::from(spans));
    }
    lines
}

// ============================================================================
// Dialogs
// ============================================================================

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 18, frame.area());
    frame.render_widget(Clear, area);

    let entries = [
        ("n / Enter", "Nuevo residente"),
        ("Tab / S-Tab", "Siguiente / anterior campo"),
        ("Enter", "Validar y avanzar"),
        ("PgUp / PgDn", "Paso anterior / siguiente"),
        ("Espacio", "Marcar casilla / elegir opción"),
        ("← / →", "Cambiar selección"),
        ("↑ / ↓", "Recorrer opciones"),
        ("/", "Buscar apartamento"),
        ("Ctrl+S", "Registrar"),
        ("Esc", "Cerrar el asistente"),
        ("q", "Salir"),
    ];

    let mut lines = vec![
        Line::from(Span::styled(" Atajos de teclado", styles::title_style())),
        Line::from(""),
    ];
    for (key, desc) in entries {
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<14}", key), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " [Esc] cerrar",
        styles::muted_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   ¿Seguro que quieres salir?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Presiona ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" para salir, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" para cancelar", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|f| render(f, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_home_screen_invites_registration() {
        let app = App::new();
        let screen = draw(&app);
        assert!(screen.contains("No hay residentes registrados."));
    }

    #[test]
    fn test_registration_list_marks_owners() {
        let mut app = App::new();
        let mut payload = xpack_core::WizardData::new();
        payload.insert("name", "Ana Pérez");
        payload.insert("apartment_label", "B-101");
        payload.insert("monthly_fee", "1250.5");
        payload.insert("owner", xpack_core::FieldValue::Flag(true));
        app.registrations.push(crate::app::Registration {
            submitted_at: chrono::Utc::now(),
            payload,
        });

        let screen = draw(&app);
        assert!(screen.contains("Ana Pérez"));
        assert!(screen.contains("B-101  prop."));
        assert!(screen.contains("RD$ 1,250.50"));
    }

    #[test]
    fn test_wizard_shows_counter_and_controls() {
        let mut app = App::new();
        app.open_wizard();
        let screen = draw(&app);
        assert!(screen.contains("Paso 1 de 4"));
        assert!(screen.contains("Datos del residente"));
        assert!(screen.contains("[PgDn] Siguiente"));
        assert!(!screen.contains("Atrás"));
    }

    #[test]
    fn test_shake_shifts_indent() {
        let now = Instant::now();
        let mut marker = Marker::default();
        assert_eq!(indent(&marker, now), "  ");

        xpack_core::wizard::init();
        marker.flag(now);
        let shaken = indent(&marker, now + std::time::Duration::from_millis(100));
        assert_ne!(shaken, "  ");
    }
}
