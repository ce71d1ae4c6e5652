use chrono::{Local, NaiveDate};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::Config;
use crate::models::Task;
use crate::tui::widgets::color::parse_color;

/// Detail lines for a task, styled with the given label/value/danger colors
pub fn task_detail_lines(task: &Task, today: NaiveDate, label: Style, value: Style, danger: Style) -> Vec<Line<'static>> {
    let due_style = if task.is_overdue(today) { danger } else { value };
    let created = task.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
    let updated = task.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");

    let mut lines = vec![
        Line::from(Span::styled(task.title.clone(), value.add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![Span::styled("Status:   ", label), Span::styled(task.status.to_string(), value)]),
        Line::from(vec![Span::styled("Priority: ", label), Span::styled(task.priority.label(), value)]),
        Line::from(vec![
            Span::styled("Due:      ", label),
            Span::styled(
                format!("{} ({})", task.due_date.format("%Y-%m-%d"), task.due_label(today)),
                due_style,
            ),
        ]),
        Line::from(vec![Span::styled("Created:  ", label), Span::styled(created.to_string(), value)]),
        Line::from(vec![Span::styled("Updated:  ", label), Span::styled(updated.to_string(), value)]),
        Line::from(vec![Span::styled("ID:       ", label), Span::styled(task.id.to_string(), value)]),
    ];

    if !task.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Description:", label)));
        for line in task.description.lines() {
            lines.push(Line::from(Span::styled(line.to_string(), value)));
        }
    }
    lines
}

pub fn render_task_view(f: &mut Frame, area: Rect, task: Option<&Task>, today: NaiveDate, config: &Config) {
    let theme = config.get_active_theme();
    let fg_color = parse_color(&theme.fg);
    let muted = parse_color(&theme.muted);
    let danger = parse_color(&theme.danger);

    let block = Block::default().borders(Borders::ALL).title("Details");
    let paragraph = match task {
        Some(task) => {
            let lines = task_detail_lines(
                task,
                today,
                Style::default().fg(muted),
                Style::default().fg(fg_color),
                Style::default().fg(danger),
            );
            Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false })
        }
        None => Paragraph::new("Select a task to view details").style(Style::default().fg(muted)),
    };

    f.render_widget(paragraph.block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskFields};
    use chrono::Utc;

    #[test]
    fn detail_includes_description_lines() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let task = Task::new(
            TaskFields {
                title: "Pay rent".into(),
                description: "online\nbefore noon".into(),
                due_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
                priority: Priority::High,
            },
            Utc::now(),
        );
        let lines = task_detail_lines(&task, today, Style::default(), Style::default(), Style::default());
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text[0], "Pay rent");
        assert!(text.iter().any(|l| l.contains("Overdue by 2 days")));
        assert_eq!(text[text.len() - 2], "online");
        assert_eq!(text[text.len() - 1], "before noon");
    }
}
