use chrono::NaiveDate;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
    StatefulWidget,
};

use crate::Config;
use crate::models::{Priority, Task};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::truncate;

/// Glyph shown before the title
fn status_indicator(task: &Task) -> &'static str {
    if task.is_completed() { "✓" } else { "○" }
}

fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "!!!",
        Priority::Medium => "!! ",
        Priority::Low => "!  ",
    }
}

pub fn render_task_list(
    f: &mut Frame,
    area: Rect,
    tasks: &[Task],
    total_count: usize,
    list_state: &mut ListState,
    today: NaiveDate,
    config: &Config,
) {
    let theme = config.get_active_theme();
    let fg_color = parse_color(&theme.fg);
    let muted = parse_color(&theme.muted);
    let danger = parse_color(&theme.danger);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = if theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&theme.highlight_fg)
    };

    let title = format!("Tasks ({} of {})", tasks.len(), total_count);

    if tasks.is_empty() {
        let message = if total_count == 0 {
            "No tasks yet. Press n to add one."
        } else {
            "No tasks match the current search and filter."
        };
        let paragraph = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(Style::default().fg(muted));
        f.render_widget(paragraph, area);
        return;
    }

    // Split area to reserve space for scrollbar
    let list_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let list_area = list_areas[0];
    let scrollbar_area = list_areas[1];

    // 2 for borders, 2 for the highlight symbol
    let max_width = list_area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            let due = task.due_label(today);
            let title_width = max_width.saturating_sub(due.chars().count() + 9);
            let title_text = truncate(&task.title, title_width);

            let (title_style, due_style, priority_style) = if task.is_completed() {
                let style = Style::default().fg(muted).add_modifier(Modifier::CROSSED_OUT);
                (style, Style::default().fg(muted), Style::default().fg(muted))
            } else {
                let due_style = if task.is_overdue(today) {
                    Style::default().fg(danger).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(muted)
                };
                let priority_style = if task.priority == Priority::High {
                    Style::default().fg(danger)
                } else {
                    Style::default().fg(fg_color)
                };
                (Style::default().fg(fg_color), due_style, priority_style)
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", status_indicator(task)), title_style),
                Span::styled(format!("{} ", priority_marker(task.priority)), priority_style),
                Span::styled(title_text, title_style),
                Span::styled(format!("  {}", due), due_style),
            ]))
        })
        .collect();

    let total_items = items.len();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(fg_color))
        .highlight_symbol("> ")
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    // Render scrollbar if needed
    let visible_items = list_area.height.saturating_sub(2) as usize;
    if total_items > visible_items && scrollbar_area.width > 0 && list_area.height > 2 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            list_area.y + 1, // Start after top border
            scrollbar_area.width,
            list_area.height.saturating_sub(2),
        );

        let mut scrollbar_state = ScrollbarState::new(total_items)
            .viewport_content_length(visible_items)
            .position(list_state.selected().unwrap_or(0));

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}
