use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Field, Form, Mode};
use crate::filter::Filter;
use crate::popup;
use crate::timer::Timer;

// ============================================================================
// Layout & Colors
// ============================================================================

const FILTER_PANEL_WIDTH: usize = 20;
const STATUS_WIDTH: usize = 6;
const NAME_WIDTH: usize = 22;
const REMAINING_WIDTH: usize = 17;
const POPUP_WIDTH: usize = 58;

const EXTERNAL_CHANGE_NOTE: &str = "Timer file changed on disk; local changes kept";

const BORDER_COLOR: Color = Color::Rgb(0, 200, 255);
const ACCENT_COLOR: Color = Color::Rgb(255, 100, 0);
const SELECTED_BG: Color = Color::Indexed(57);

// ============================================================================
// Frame
// ============================================================================

pub fn render_ui(f: &mut Frame, app: &App) {
    let block = Block::default()
        .title(Span::styled(" ⏳ RCOUNTDOWN ", Style::default()
            .fg(ACCENT_COLOR).add_modifier(Modifier::BOLD)))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR));
    let area = block.inner(f.size());
    f.render_widget(block, f.size());

    let width = area.width as usize;
    let height = area.height as usize;
    let background = background_lines(app, height);

    let lines: Vec<Line> = match popup_lines(app) {
        Some(panel) => {
            let merged = popup::composite(&background.lines, &panel, width, height, POPUP_WIDTH);
            let (row_offset, col_offset) = popup::placement(width, height, POPUP_WIDTH, panel.len());
            merged
                .into_iter()
                .enumerate()
                .map(|(row, text)| {
                    if (row_offset..row_offset + panel.len()).contains(&row) {
                        split_popup_row(text, col_offset)
                    } else {
                        Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
                    }
                })
                .collect()
        }
        None => background
            .lines
            .into_iter()
            .enumerate()
            .map(|(row, text)| {
                if Some(row) == background.selected {
                    Line::from(Span::styled(text, Style::default().fg(Color::White).bg(SELECTED_BG)))
                } else if row == 0 {
                    Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)))
                } else {
                    Line::from(text)
                }
            })
            .collect(),
    };

    f.render_widget(Paragraph::new(lines), area);
}

fn split_popup_row(text: String, col_offset: usize) -> Line<'static> {
    let chars: Vec<char> = text.chars().collect();
    let left: String = chars.iter().take(col_offset).collect();
    let middle: String = chars.iter().skip(col_offset).take(POPUP_WIDTH).collect();
    let right: String = chars.iter().skip(col_offset + POPUP_WIDTH).collect();
    Line::from(vec![
        Span::styled(left, Style::default().fg(Color::DarkGray)),
        Span::styled(middle, Style::default().fg(Color::White)),
        Span::styled(right, Style::default().fg(Color::DarkGray)),
    ])
}

// ============================================================================
// Background (filter panel + timer table)
// ============================================================================

pub struct Background {
    pub lines: Vec<String>,
    /// Row of the highlighted timer, if any.
    pub selected: Option<usize>,
}

pub fn background_lines(app: &App, height: usize) -> Background {
    let footer = footer_lines(app);
    let panel = filter_panel(app.filter);
    let timers = app.visible();

    // header + table rows + blank + footer
    let table_rows = height.saturating_sub(2 + footer.len()).max(1);
    let scroll = app.cursor.saturating_sub(table_rows - 1);

    let mut table = vec![format!(
        "{}{}{}{}",
        fit("Stat", STATUS_WIDTH),
        fit("Name", NAME_WIDTH),
        fit("Remaining", REMAINING_WIDTH),
        "End Time"
    )];
    if timers.is_empty() {
        table.push("  No timers here. Press a to add one.".into());
    }
    table.extend(
        timers
            .iter()
            .skip(scroll)
            .take(table_rows)
            .map(|t| timer_row(t, app)),
    );

    let selected = (!timers.is_empty()).then(|| app.cursor - scroll + 1);

    let rows = panel.len().max(table.len());
    let mut lines: Vec<String> = (0..rows)
        .map(|i| {
            let left = panel.get(i).map(String::as_str).unwrap_or("");
            let right = table.get(i).map(String::as_str).unwrap_or("");
            format!("{}{}", fit(left, FILTER_PANEL_WIDTH), right)
        })
        .collect();

    lines.push(String::new());
    lines.extend(footer);

    Background { lines, selected }
}

fn filter_panel(active: Filter) -> Vec<String> {
    let mut lines = vec![" Filters".to_string()];
    for (i, filter) in Filter::ALL.iter().enumerate() {
        let marker = if *filter == active { "▶" } else { " " };
        lines.push(format!(" {} {} {}", marker, i + 1, filter.label()));
    }
    lines
}

fn timer_row(timer: &Timer, app: &App) -> String {
    let status = timer.status(app.now);
    format!(
        "{}{}{}{}",
        fit(&format!("  {}", status.symbol()), STATUS_WIDTH),
        fit(&timer.name, NAME_WIDTH),
        fit(&timer.status_text(app.now), REMAINING_WIDTH),
        timer.end_time_text(app.now)
    )
}

fn footer_lines(app: &App) -> Vec<String> {
    let mut lines = Vec::new();
    if app.external_change_pending {
        lines.push(format!(" {}", EXTERNAL_CHANGE_NOTE));
    }
    if let Some(status) = &app.status {
        lines.push(format!(" {}", status));
    }
    if app.show_help {
        lines.extend([
            " ↑/k ↓/j move • ctrl+↑/ctrl+↓ reorder • tab cycle filter • 1-4 filter".to_string(),
            " a add • e edit • d delete • r restart • p pause/resume".to_string(),
            " P pause all • U resume all • R restart all • D delete done".to_string(),
            " ? close help • q quit".to_string(),
        ]);
    } else {
        lines.push(" ? help • q quit".to_string());
    }
    lines
}

/// Truncates to `width` characters (with an ellipsis) and pads to exactly `width`.
fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len > width {
        let mut cut: String = text.chars().take(width.saturating_sub(2)).collect();
        cut.push('…');
        format!("{:<width$}", cut, width = width)
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

// ============================================================================
// Popups
// ============================================================================

pub fn popup_lines(app: &App) -> Option<Vec<String>> {
    let content = match &app.mode {
        Mode::Browsing => return None,
        Mode::Editing(form) => form_content(form),
        Mode::ConfirmingDelete { target } => {
            let name = app.timer(*target).map(|t| t.name.as_str()).unwrap_or("?");
            confirm_content("Delete Timer", &format!("Delete \"{}\"?", name), "yes, delete")
        }
        Mode::ConfirmingRestart { target } => {
            let name = app.timer(*target).map(|t| t.name.as_str()).unwrap_or("?");
            confirm_content("Restart Timer", &format!("Restart \"{}\"?", name), "yes, restart")
        }
        Mode::ConfirmingBulk { action } => confirm_content(action.title(), action.question(), "yes"),
    };
    Some(boxed(content))
}

fn form_content(form: &Form) -> Vec<String> {
    let title = if form.is_new() { "+ Add Timer" } else { "✎ Edit Timer" };
    let field = |label: &str, value: &str, which: Field| {
        let (marker, cursor) = if form.focus == which { (">", "█") } else { (" ", "") };
        format!("{} {:<9} {}{}", marker, label, value, cursor)
    };

    let mut lines = vec![
        title.to_string(),
        "─".repeat(POPUP_WIDTH - 6),
        String::new(),
        field("Name:", &form.name, Field::Name),
        String::new(),
        field("Duration:", &form.duration, Field::Duration),
        String::new(),
        "Examples: 30s, 5m, 1h30m, 2d, 1y".to_string(),
    ];
    if let Some(error) = &form.error {
        lines.push(format!("! {}", error));
    }
    lines.push(String::new());
    lines.push("tab next • =/- step • +/_ big step".to_string());
    lines.push("enter confirm/next • esc cancel".to_string());
    lines
}

fn confirm_content(title: &str, question: &str, yes: &str) -> Vec<String> {
    vec![
        title.to_string(),
        String::new(),
        question.to_string(),
        String::new(),
        format!("y/enter {} • n no, cancel • esc cancel", yes),
    ]
}

/// Frames `content` in a rounded box exactly `POPUP_WIDTH` characters wide.
fn boxed(content: Vec<String>) -> Vec<String> {
    let inner = POPUP_WIDTH - 2;
    let mut lines = vec![format!("╭{}╮", "─".repeat(inner))];
    lines.push(format!("│{}│", " ".repeat(inner)));
    for line in content {
        lines.push(format!("│  {}│", fit(&line, inner - 2)));
    }
    lines.push(format!("│{}│", " ".repeat(inner)));
    lines.push(format!("╰{}╯", "─".repeat(inner)));
    lines
}
