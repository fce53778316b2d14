use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::domain::Post;
use crate::tui::app::{display_file_url, ActivePane, InputMode, TuiApp};

const MAX_SUGGESTIONS: usize = 8;

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    if app.maximized {
        // Maximized mode: only preview and status bar
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),   // Preview pane (full height)
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        render_preview_pane(frame, app, chunks[0], colors);
        render_status_bar(frame, app, chunks[1], colors);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search bar
            Constraint::Min(10),   // Posts + preview
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_search_bar(frame, app, chunks[0], colors);
    render_posts_pane(frame, app, body[0], colors);
    render_preview_pane(frame, app, body[1], colors);
    render_status_bar(frame, app, chunks[2], colors);

    if app.input_mode == InputMode::Search {
        render_suggestions(frame, app, chunks[0], colors);
    }
}

fn render_search_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let editing = app.input_mode == InputMode::Search;
    let border_style = if editing {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    };

    let text = if editing {
        Line::from(vec![
            Span::styled(app.search_input.clone(), Style::default().fg(colors.text)),
            Span::styled("█", Style::default().fg(colors.active_border)),
        ])
    } else if app.feed.state().query.is_empty() {
        Line::from(Span::styled(
            "Press / to search tags",
            Style::default().fg(colors.muted),
        ))
    } else {
        Line::from(Span::styled(
            app.feed.state().query.clone(),
            Style::default().fg(colors.text),
        ))
    };

    let title = format!(" {} ", app.feed.state().tab.label());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_suggestions(frame: &mut Frame, app: &TuiApp, search_area: Rect, colors: &ColorConfig) {
    let suggestions = app.autocomplete.suggestions();
    if suggestions.is_empty() {
        return;
    }

    let shown = suggestions.len().min(MAX_SUGGESTIONS);
    let area = Rect {
        x: search_area.x + 1,
        y: search_area.y + search_area.height,
        width: search_area.width.saturating_sub(2).min(50),
        height: (shown as u16 + 2).min(frame.area().height.saturating_sub(search_area.bottom())),
    };

    let items: Vec<ListItem> = suggestions
        .iter()
        .take(shown)
        .enumerate()
        .map(|(i, tag)| {
            let mut style = Style::default().fg(colors.tag_category(tag.category_name()));
            if app.suggestion_index == Some(i) {
                style = style
                    .bg(colors.selection_bg_active)
                    .fg(colors.selection_fg_active)
                    .add_modifier(Modifier::BOLD);
            }
            let alias = tag
                .antecedent_name
                .as_ref()
                .map(|a| format!(" ← {}", a))
                .unwrap_or_default();
            ListItem::new(format!("{}{}  {}", tag.name, alias, tag.post_count)).style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.active_border));

    frame.render_widget(Clear, area);
    frame.render_widget(List::new(items).block(block), area);
}

fn render_posts_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let is_active = app.active_pane == ActivePane::Posts;
    let border_style = if is_active {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    };

    let visible = app.visible_posts();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|post| {
            let line = Line::from(vec![
                Span::styled(
                    format!("[{}] ", post.rating.code()),
                    Style::default().fg(colors.rating(post.rating)),
                ),
                Span::styled(
                    format!("#{:<8} ", post.id),
                    Style::default().fg(colors.text),
                ),
                Span::styled(
                    format!("{:>5} ", post.score.total),
                    Style::default().fg(colors.muted),
                ),
                Span::styled(post.display_artists(), Style::default().fg(colors.tag_artist)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let state = app.feed.state();
    let loading = if state.is_loading() { " loading…" } else { "" };
    let end = if !state.has_more && !visible.is_empty() {
        " end"
    } else {
        ""
    };
    let title = format!(
        " Posts [{}/{}]{}{} ",
        (app.post_index + 1).min(visible.len()),
        visible.len(),
        loading,
        end
    );

    let highlight_style = if is_active {
        Style::default()
            .bg(colors.selection_bg_active)
            .fg(colors.selection_fg_active)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .bg(colors.selection_bg_inactive)
            .fg(colors.selection_fg_inactive)
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style)
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.post_list_state);
}

fn render_preview_pane(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let is_active = app.active_pane == ActivePane::Preview;
    let border_style = if is_active {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    };

    let (title, content) = match app.selected_post() {
        Some(post) => (
            format!(" #{} ", post.id),
            Text::from(preview_lines(app, post, area.width, colors)),
        ),
        None => (" Preview ".to_string(), Text::from("No post selected")),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn preview_lines<'a>(app: &'a TuiApp, post: &'a Post, width: u16, colors: &ColorConfig) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    let label = |text: &'static str| Span::styled(text, Style::default().fg(colors.muted));

    lines.push(Line::from(vec![
        Span::styled(
            post.rating.label(),
            Style::default()
                .fg(colors.rating(post.rating))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "  score {} (+{}/-{})  ♥ {}  💬 {}",
            post.score.total,
            post.score.up,
            post.score.down.abs(),
            post.fav_count,
            post.comment_count
        )),
    ]));
    lines.push(Line::from(vec![
        label("File:    "),
        Span::raw(format!(
            "{}x{} {} {} KiB",
            post.file.width,
            post.file.height,
            post.file.ext,
            post.file.size / 1024
        )),
    ]));
    lines.push(Line::from(vec![
        label("URL:     "),
        Span::styled(
            display_file_url(post, &app.settings),
            Style::default().fg(colors.link),
        ),
    ]));
    lines.push(Line::from(vec![
        label("Page:    "),
        Span::styled(
            post.page_url(&app.settings.host()),
            Style::default().fg(colors.link),
        ),
    ]));
    if let Some(created) = post.created_at {
        lines.push(Line::from(vec![
            label("Posted:  "),
            Span::raw(created.format("%Y-%m-%d %H:%M").to_string()),
        ]));
    }
    if let Some(parent) = post.relationships.parent_id {
        lines.push(Line::from(vec![label("Parent:  "), Span::raw(format!("#{}", parent))]));
    }

    lines.push(Line::from(""));
    for (category, tags) in post.tags.by_category() {
        if tags.is_empty() {
            continue;
        }
        let color = colors.tag_category(category);
        lines.push(Line::from(Span::styled(
            category,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", tags.join(" ")),
            Style::default().fg(color),
        )));
    }

    if !post.description.trim().is_empty() {
        lines.push(Line::from(""));
        for line in post.description.lines() {
            lines.push(Line::from(Span::styled(line, Style::default().fg(colors.text))));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from("─".repeat(width.saturating_sub(2) as usize)));

    match app.comments.as_ref().filter(|c| c.post_id == post.id) {
        None => lines.push(Line::from(Span::styled(
            "Press Enter to load comments",
            Style::default().fg(colors.muted),
        ))),
        Some(view) => match &view.comments {
            None => lines.push(Line::from(Span::styled(
                "Loading comments…",
                Style::default().fg(colors.muted),
            ))),
            Some(comments) if comments.is_empty() => lines.push(Line::from(Span::styled(
                "No comments",
                Style::default().fg(colors.muted),
            ))),
            Some(comments) => {
                for comment in comments.iter().filter(|c| !c.is_hidden) {
                    lines.push(Line::from(vec![
                        Span::styled(
                            comment.display_author(),
                            Style::default()
                                .fg(colors.tag_artist)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!(" ({:+})", comment.score),
                            Style::default().fg(colors.muted),
                        ),
                    ]));
                    for line in comment.body.lines() {
                        lines.push(Line::from(format!("  {}", line)));
                    }
                    lines.push(Line::from(""));
                }
            }
        },
    }

    lines
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let state = app.feed.state();
    let (status, fg) = if let Some(ref error) = state.error {
        (error.clone(), colors.error)
    } else if let Some(ref msg) = app.status_message {
        (msg.clone(), colors.status_fg)
    } else if app.input_mode == InputMode::Search {
        (
            "Enter:Search  Tab:Next suggestion  Esc:Cancel".to_string(),
            colors.status_fg,
        )
    } else if app.maximized {
        (
            "j/k:Scroll  n/p:Page  m:Exit maximize  q:Quit".to_string(),
            colors.status_fg,
        )
    } else {
        let hidden = app.hidden_count();
        let hidden = if hidden > 0 {
            format!("  ({} hidden)", hidden)
        } else {
            String::new()
        };
        let nsfw = if app.settings.nsfw_enabled { "on" } else { "off" };
        (
            format!(
                "/:Search  t:Tab  Enter:Comments  o:Open  R:Refresh  N:NSFW {}  m:Max  q:Quit{}",
                nsfw, hidden
            ),
            colors.status_fg,
        )
    };

    let paragraph = Paragraph::new(status).style(Style::default().fg(fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}
