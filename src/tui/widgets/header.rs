use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};

use crate::Config;
use crate::pipeline::FilterCounts;
use crate::tui::widgets::color::parse_color;

/// Spinner frames for the refresh indicator
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Title line with the completion summary, and a progress gauge below it
pub fn render_header(f: &mut Frame, area: Rect, counts: &FilterCounts, refreshing: bool, spinner_tick: usize, config: &Config) {
    let theme = config.get_active_theme();
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let muted = parse_color(&theme.muted);

    let [title_area, gauge_area] = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);

    let mut spans = vec![
        Span::styled("My Tasks", Style::default().fg(fg_color).add_modifier(Modifier::BOLD)),
        Span::styled("  ", Style::default()),
        Span::styled(counts.summary(), Style::default().fg(muted)),
    ];
    if refreshing {
        let frame = SPINNER[spinner_tick % SPINNER.len()];
        spans.push(Span::styled(format!("  {} Refreshing...", frame), Style::default().fg(highlight_bg)));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().fg(fg_color).bg(bg_color)),
        title_area,
    );

    let percent = counts.completion_percent();
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(highlight_bg).bg(bg_color))
        .percent(percent)
        .label(format!("{}%", percent));
    f.render_widget(gauge, gauge_area);
}
