use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::{App, SetupField};
use crate::bank::QUESTIONS_PER_EXAM;
use crate::models::{Difficulty, EXAM_SUBJECTS};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(5),
        Constraint::Length(8),
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_title(frame, chunks[1]);

    let columns = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(28),
        Constraint::Length(2),
        Constraint::Length(18),
        Constraint::Fill(1),
    ])
    .split(chunks[2]);

    let subjects: Vec<&str> = EXAM_SUBJECTS.to_vec();
    render_choice(
        frame,
        columns[1],
        " Subject ",
        &subjects,
        app.subject_index(),
        app.setup_field() == SetupField::Subject,
    );

    let difficulties: Vec<&str> = Difficulty::ALL.iter().map(|d| d.label()).collect();
    let selected_difficulty = Difficulty::ALL
        .iter()
        .position(|d| *d == app.selected_difficulty())
        .unwrap_or(0);
    render_choice(
        frame,
        columns[3],
        " Difficulty ",
        &difficulties,
        selected_difficulty,
        app.setup_field() == SetupField::Difficulty,
    );

    super::render_notice(frame, chunks[3], app);
    super::render_controls(
        frame,
        chunks[5],
        "j/k choose  ·  tab switch  ·  enter start  ·  c assistant  ·  q quit",
    );
}

fn render_title(frame: &mut Frame, area: Rect) {
    let content = vec![
        Line::from(Span::styled(
            "MOCK EXAM",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(
            format!(
                "{} Questions · GATE / NATA / JEE Paper 2 Architecture",
                QUESTIONS_PER_EXAM
            )
            .fg(Color::DarkGray),
        ),
    ];
    frame.render_widget(
        Paragraph::new(content).alignment(Alignment::Center),
        area,
    );
}

fn render_choice(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: &[&str],
    selected: usize,
    focused: bool,
) {
    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let is_selected = index == selected;
            let style = match (is_selected, focused) {
                (true, true) => Style::default().fg(Color::Cyan).bold(),
                (true, false) => Style::default().fg(Color::White).bold(),
                _ => Style::default().fg(Color::Gray),
            };
            let marker = if is_selected { ">" } else { " " };
            Line::from(Span::styled(format!("{} {}", marker, item), style))
        })
        .collect();

    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

pub fn render_loading(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "PREPARING YOUR EXAM",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(
            format!(
                "{} · {}",
                app.selected_subject(),
                app.selected_difficulty()
            )
            .fg(Color::Gray),
        ),
        Line::from("Generating questions...".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, chunks[1]);
    super::render_controls(frame, chunks[3], "esc cancel  ·  q quit");
}
