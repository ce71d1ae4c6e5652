use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Config;
use crate::models::{MAX_DESCRIPTION_LEN, MAX_TITLE_LEN, Priority};
use crate::tui::app::{TaskField, TaskForm};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::popup_area;

/// Field rectangles inside the form popup
pub struct FormAreas {
    pub title: Rect,
    pub description: Rect,
    pub due_date: Rect,
    pub priority: Rect,
    pub message: Rect,
}

impl FormAreas {
    pub fn calculate(inner: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(5),    // Description (multi-line)
                Constraint::Length(3), // Due Date
                Constraint::Length(3), // Priority
                Constraint::Length(1), // Validation message
            ])
            .split(inner);
        Self {
            title: chunks[0],
            description: chunks[1],
            due_date: chunks[2],
            priority: chunks[3],
            message: chunks[4],
        }
    }
}

/// Visible part of an editor as styled lines, after scrolling it to the cursor
fn editor_lines(editor: &mut Editor, field_area: Rect, style: Style) -> Vec<Line<'static>> {
    let height = field_area.height.saturating_sub(2) as usize;
    let width = field_area.width.saturating_sub(2) as usize;
    editor.update_scroll(height);
    editor.update_horizontal_scroll(width);
    editor
        .get_visible_lines(height, width)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, style)))
        .collect()
}

fn priority_line(selected: Priority, active: Style, inactive: Style) -> Line<'static> {
    let mut spans = Vec::new();
    for priority in Priority::ALL {
        let style = if priority == selected { active.add_modifier(Modifier::BOLD) } else { inactive };
        let marker = if priority == selected { "(•)" } else { "( )" };
        spans.push(Span::styled(format!("{} {}   ", marker, priority.label()), style));
    }
    Line::from(spans)
}

pub fn render_task_form(f: &mut Frame, area: Rect, form: &mut TaskForm, config: &Config) {
    let theme = config.get_active_theme();
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let danger = parse_color(&theme.danger);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = if theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&theme.highlight_fg)
    };
    let highlight_style = Style::default().bg(highlight_bg).fg(highlight_fg);
    let inactive_field_style = Style::default().fg(fg_color).add_modifier(Modifier::DIM);

    let popup = popup_area(area, 70, 80);
    f.render_widget(Clear, popup);

    let title = if form.is_editing() { "Edit Task" } else { "Add New Task" };
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    let inner = outer.inner(popup);
    f.render_widget(outer, popup);

    let areas = FormAreas::calculate(inner);
    let style_for = |field: TaskField| {
        if form.current_field == field { highlight_style } else { inactive_field_style }
    };
    let title_style = style_for(TaskField::Title);
    let desc_style = style_for(TaskField::Description);
    let date_style = style_for(TaskField::DueDate);
    let priority_style = style_for(TaskField::Priority);

    // Title field
    let title_label = format!("Title ({}/{})", form.title.char_count(), MAX_TITLE_LEN);
    let lines = editor_lines(&mut form.title, areas.title, title_style);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title_label)),
        areas.title,
    );

    // Description field (multi-line)
    let desc_label = format!("Description ({}/{})", form.description.char_count(), MAX_DESCRIPTION_LEN);
    let lines = editor_lines(&mut form.description, areas.description, desc_style);
    f.render_widget(
        Paragraph::new(lines)
            .style(desc_style)
            .block(Block::default().borders(Borders::ALL).title(desc_label)),
        areas.description,
    );

    // Due Date field
    let lines = editor_lines(&mut form.due_date, areas.due_date, date_style);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Due Date (YYYY-MM-DD)")),
        areas.due_date,
    );

    // Priority selector
    f.render_widget(
        Paragraph::new(priority_line(form.priority, priority_style, inactive_field_style))
            .block(Block::default().borders(Borders::ALL).title("Priority (←/→)")),
        areas.priority,
    );

    if let Some(ref error) = form.error {
        f.render_widget(
            Paragraph::new(error.as_str()).style(Style::default().fg(danger).add_modifier(Modifier::BOLD)),
            areas.message,
        );
    }

    // Set cursor position for active field
    let cursor = match form.current_field {
        TaskField::Title => form.title.get_cursor_screen_pos(areas.title),
        TaskField::Description => form.description.get_cursor_screen_pos(areas.description),
        TaskField::DueDate => form.due_date.get_cursor_screen_pos(areas.due_date),
        TaskField::Priority => None,
    };
    if let Some((x, y)) = cursor {
        f.set_cursor_position((x, y));
    }
}
