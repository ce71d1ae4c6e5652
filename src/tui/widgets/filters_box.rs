use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Tabs};

use crate::Config;
use crate::pipeline::{Filter, FilterCounts};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::utils::format_key_binding_for_display;

/// Filter bar: one tab per filter with its count, the active one highlighted.
/// The search query, if any, is shown in the block title.
pub fn render_filters_box(
    f: &mut Frame,
    area: Rect,
    active: Filter,
    counts: &FilterCounts,
    query: &str,
    searching: bool,
    config: &Config,
) {
    let theme = config.get_active_theme();
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let titles: Vec<Line> = Filter::ALL
        .iter()
        .map(|filter| Line::from(format!(" {} ({}) ", filter.label(), counts.get(*filter))))
        .collect();
    let index = Filter::ALL.iter().position(|f| *f == active).unwrap_or(0);

    let title = if searching {
        format!("Search: {}_", query)
    } else if !query.is_empty() {
        format!("Search: {}", query)
    } else {
        format!("{}: Filter", format_key_binding_for_display(&config.key_bindings.filter_next))
    };

    let tabs = Tabs::new(titles)
        .select(index)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg).add_modifier(Modifier::BOLD))
        .divider("|");

    f.render_widget(tabs, area);
}
