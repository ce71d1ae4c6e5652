use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Paragraph;

use crate::Config;
use crate::actions::Notification;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::truncate;

const SEPARATOR: &str = " • ";
const ELLIPSIS: &str = "...";

/// Join as many hints as fit in `max_width`, ending with "..." if some were dropped
pub fn fit_hints(key_hints: &[String], max_width: usize) -> String {
    let separator_len = SEPARATOR.chars().count();
    let ellipsis_len = ELLIPSIS.chars().count();

    let mut hints_text = String::new();
    for (i, hint) in key_hints.iter().enumerate() {
        let hint_len = hint.chars().count();
        let current_len = hints_text.chars().count();
        let would_be_len = if i == 0 { hint_len } else { current_len + separator_len + hint_len };

        if would_be_len > max_width {
            if hints_text.is_empty() {
                // Even the first hint is too long
                return truncate(hint, max_width);
            }
            if current_len + ellipsis_len <= max_width {
                hints_text.push_str(ELLIPSIS);
            } else {
                let truncate_to = max_width.saturating_sub(ellipsis_len);
                hints_text = hints_text.chars().take(truncate_to).collect::<String>();
                hints_text.push_str(ELLIPSIS);
            }
            break;
        }

        if i > 0 {
            hints_text.push_str(SEPARATOR);
        }
        hints_text.push_str(hint);
    }
    hints_text
}

pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    notification: Option<&Notification>,
    key_hints: &[String],
    config: &Config,
) {
    let theme = config.get_active_theme();
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let max_width = area.width as usize;

    let (content, style) = match notification {
        Some(note) => {
            // Destructive notices use the danger color, others the highlight
            let msg_bg = if note.destructive {
                parse_color(&theme.danger)
            } else {
                parse_color(&theme.highlight_bg)
            };
            let msg_fg = get_contrast_text_color(msg_bg);
            let text = format!("{}: {}", note.title, note.description);
            (
                truncate(&text, max_width),
                Style::default().fg(msg_fg).bg(msg_bg).add_modifier(Modifier::BOLD),
            )
        }
        None => (fit_hints(key_hints, max_width), Style::default().fg(fg_color).bg(bg_color)),
    };

    f.render_widget(Paragraph::new(content).style(style), area);
}
