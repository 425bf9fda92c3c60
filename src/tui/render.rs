use std::borrow::Cow;

use super::state::AppState;
use crate::reddit::types::Post;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const NO_SELFTEXT_PLACEHOLDER: &str = "(no self text)";
const EMPTY_FILTER_MESSAGE: &str = "No posts match your search.";

// Title line, byline, self text, URL, separator.
const CARD_LINES: usize = 5;

pub fn draw(f: &mut Frame, state: &AppState, spinner_frame: u8) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, state, chunks[0]);
    draw_posts(f, state, chunks[1], spinner_frame);
    draw_footer(f, chunks[2]);
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect) {
    let counts = if state.loading || state.error.is_some() {
        String::new()
    } else {
        let shown = state.filtered_posts().len();
        format!("{} posts \u{00b7} {} shown", state.posts.len(), shown)
    };

    let line = Line::from(vec![
        Span::raw(" Search: "),
        Span::styled(
            format!("{}\u{258f}", state.query),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("  {}", counts),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let block = Block::default()
        .title(" Reddit Feed Relay ")
        .borders(Borders::ALL);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_posts(f: &mut Frame, state: &AppState, area: Rect, spinner_frame: u8) {
    let inner_width = area.width.saturating_sub(2) as usize;

    if state.loading {
        let ch = SPINNER_FRAMES[(spinner_frame as usize) % SPINNER_FRAMES.len()];
        draw_centered_message(
            f,
            area,
            format!("{} Loading posts\u{2026}", ch),
            Color::Cyan,
        );
        return;
    }

    if let Some(error) = &state.error {
        draw_centered_message(f, area, format!("Error: {}", error), Color::Red);
        return;
    }

    let filtered = state.filtered_posts();
    if filtered.is_empty() {
        draw_centered_message(f, area, EMPTY_FILTER_MESSAGE.to_string(), Color::Yellow);
        return;
    }

    let total = filtered.len();
    let visible_cards = ((area.height.saturating_sub(2) as usize) / CARD_LINES).max(1);
    let offset = state.selected.saturating_sub(visible_cards.saturating_sub(1));
    let now = chrono::Utc::now().timestamp();

    let mut lines: Vec<Line> = Vec::new();
    for (idx, post) in filtered.into_iter().enumerate().skip(offset).take(visible_cards) {
        lines.extend(card_lines(post, idx == state.selected, inner_width, now));
    }

    let title = format!(" Posts [{}/{}] ", state.selected + 1, total);
    let block = Block::default().title(title).borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn card_lines<'a>(post: &'a Post, selected: bool, width: usize, now: i64) -> Vec<Line<'a>> {
    let text_width = width.saturating_sub(2);

    let marker = if post.thumbnail.starts_with("http") {
        Span::styled("\u{25a3} ", Style::default().fg(Color::Green))
    } else {
        Span::styled("R ", Style::default().fg(Color::DarkGray))
    };
    let title_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let title_line = Line::from(vec![
        marker,
        Span::styled(
            truncate_with_ellipsis(&post.title, text_width),
            title_style,
        ),
    ]);

    let byline = Line::from(Span::styled(
        format!(
            "  u/{} \u{00b7} {} \u{00b7} \u{25b2} {}",
            post.author,
            time_ago(post.created_secs(), now),
            post.score
        ),
        Style::default().fg(Color::DarkGray),
    ));

    let body = match post.selftext.lines().find(|l| !l.trim().is_empty()) {
        Some(line) => Line::from(Span::raw(format!(
            "  {}",
            truncate_with_ellipsis(line.trim(), text_width)
        ))),
        None => Line::from(Span::styled(
            format!("  {}", NO_SELFTEXT_PLACEHOLDER),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
    };

    let url = Line::from(Span::styled(
        format!("  {}", truncate_with_ellipsis(&post.url, text_width)),
        Style::default().fg(Color::Blue),
    ));

    vec![title_line, byline, body, url, Line::from("")]
}

fn draw_centered_message(f: &mut Frame, area: Rect, message: String, color: Color) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            message,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ];
    let block = Block::default().title(" Posts ").borders(Borders::ALL);
    let para = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(para, area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled("  [Esc]", Style::default().fg(Color::Yellow)),
        Span::raw(" quit  "),
        Span::styled("[Ctrl+R]", Style::default().fg(Color::Yellow)),
        Span::raw(" refresh  "),
        Span::styled("[\u{2191}/\u{2193}]", Style::default().fg(Color::Yellow)),
        Span::raw(" scroll  "),
        Span::styled("type", Style::default().fg(Color::Yellow)),
        Span::raw(" to search  "),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// Relative age label for a post: seconds under a minute, then whole minutes,
/// hours, and days, all floor-divided. A future timestamp clamps to "0s".
pub fn time_ago(created_utc: i64, now: i64) -> String {
    let diff = (now - created_utc).max(0);
    if diff < 60 {
        format!("{}s", diff)
    } else if diff < 3600 {
        format!("{}m", diff / 60)
    } else if diff < 86400 {
        format!("{}h", diff / 3600)
    } else {
        format!("{}d", diff / 86400)
    }
}

fn truncate_with_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    let char_count = s.chars().count();
    if char_count <= max_width {
        Cow::Borrowed(s)
    } else if max_width <= 3 {
        Cow::Owned(".".repeat(max_width))
    } else {
        let end = s
            .char_indices()
            .nth(max_width - 3)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        Cow::Owned(format!("{}...", &s[..end]))
    }
}
