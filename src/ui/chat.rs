use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::ai::{ChatMessage, ChatRole};
use crate::app::App;

const GREETING: &str =
    "Hello, future architect! Ask me anything about GATE, NATA or JEE Paper 2 preparation.";

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_history(frame, chunks[0], app);
    render_suggestions(frame, chunks[1], app);
    render_input(frame, chunks[2], app);
    super::render_notice(frame, chunks[3], app);
    super::render_controls(
        frame,
        chunks[4],
        "enter send  ·  tab suggestion  ·  ctrl+e export transcript  ·  esc back  ·  ctrl+c quit",
    );
}

fn render_history(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(Span::styled(GREETING, Style::default().fg(Color::Gray))),
        Line::from(""),
    ];
    for message in app.chat_messages() {
        lines.push(message_line(message));
        lines.push(Line::from(""));
    }
    if app.chat_pending() {
        lines.push(Line::from("Mentor is typing...".fg(Color::DarkGray).italic()));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Color::DarkGray)
        .title(" Study Assistant ")
        .title_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1));
    let inner_width = block.inner(area).width;
    let inner_height = block.inner(area).height;

    // keep the newest messages in view
    let total_rows = wrapped_rows(&lines, inner_width);
    let scroll = total_rows.saturating_sub(inner_height as usize);

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block)
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(widget, area);
}

fn message_line(message: &ChatMessage) -> Line<'_> {
    let (speaker, speaker_style, text_style) = match message.role {
        ChatRole::User => (
            "You: ",
            Style::default().fg(Color::Yellow).bold(),
            Style::default().fg(Color::White),
        ),
        ChatRole::Model if message.is_error => (
            "Mentor: ",
            Style::default().fg(Color::Red).bold(),
            Style::default().fg(Color::Red),
        ),
        ChatRole::Model => (
            "Mentor: ",
            Style::default().fg(Color::Cyan).bold(),
            Style::default().fg(Color::White),
        ),
    };

    let mut spans = vec![Span::styled(speaker, speaker_style)];
    spans.extend(emphasis_spans(&message.text, text_style));
    Line::from(spans)
}

/// Split `**bold**` markup into styled spans.
fn emphasis_spans(text: &str, style: Style) -> Vec<Span<'_>> {
    text.split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(index, part)| {
            if index % 2 == 1 {
                Span::styled(part, style.bold())
            } else {
                Span::styled(part, style)
            }
        })
        .collect()
}

fn wrapped_rows(lines: &[Line], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum()
}

fn render_suggestions(frame: &mut Frame, area: Rect, app: &App) {
    let suggestions = app
        .chat_messages()
        .iter()
        .rev()
        .find(|m| m.role == ChatRole::Model)
        .map(|m| m.suggestions.as_slice())
        .unwrap_or_default();
    if suggestions.is_empty() {
        return;
    }

    let mut spans = vec![Span::styled("Suggestions: ", Style::default().fg(Color::DarkGray))];
    for (index, suggestion) in suggestions.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled("  ·  ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(
            suggestion.as_str(),
            Style::default().fg(Color::Cyan),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let border = if app.chat_pending() {
        Color::DarkGray
    } else {
        Color::Cyan
    };
    let widget = Paragraph::new(format!("{}_", app.chat_input())).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" Message ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}
