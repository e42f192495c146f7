use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::{QuestionType, ResponseRecord, ResponseStatus};
use crate::session::ExamSession;

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];
const LOW_TIME_SECS: u64 = 60;
const PALETTE_WIDTH: u16 = 30;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session() else {
        return;
    };

    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_header(frame, rows[0], session);

    let columns = Layout::horizontal([Constraint::Fill(1), Constraint::Length(PALETTE_WIDTH)])
        .spacing(1)
        .split(rows[1]);

    let body = Layout::vertical([Constraint::Length(7), Constraint::Fill(1)]).split(columns[0]);
    render_question_text(frame, body[0], &session.current_question().text);
    render_answer_area(frame, body[1], app, session);
    render_palette(frame, columns[1], session);

    let hints = if session.current_question().question_type() == QuestionType::Nat {
        "type number  ·  enter save & next  ·  m mark  ·  x clear  ·  h/l prev/next  ·  F1-F9 jump  ·  s submit"
    } else {
        "j/k move  ·  space select  ·  enter save & next  ·  m mark  ·  x clear  ·  h/l prev/next  ·  1-9 jump  ·  s submit"
    };
    super::render_controls(frame, rows[2], hints);
}

fn render_header(frame: &mut Frame, area: Rect, session: &ExamSession) {
    let question = session.current_question();
    let columns = Layout::horizontal([Constraint::Fill(1), Constraint::Length(16)]).split(area);

    let progress = Line::from(vec![
        Span::styled(
            format!(
                "Question {} of {}",
                session.current_question_number(),
                session.len()
            ),
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            format!(
                "  ·  {}  ·  {}  ·  {}",
                question.question_type().label(),
                question.subject,
                question.difficulty
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(progress), columns[0]);

    let countdown = session.countdown();
    let (clock, color) = if countdown.is_expired() {
        ("TIME UP".to_string(), Color::Red)
    } else if countdown.remaining_secs() <= LOW_TIME_SECS {
        (countdown.to_string(), Color::Red)
    } else {
        (countdown.to_string(), Color::Green)
    };
    let timer = Paragraph::new(clock)
        .alignment(Alignment::Right)
        .style(Style::default().fg(color).bold());
    frame.render_widget(timer, columns[1]);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray)
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn render_answer_area(frame: &mut Frame, area: Rect, app: &App, session: &ExamSession) {
    let question = session.current_question();
    let response = session.current_response();

    let (title, lines) = match question.question_type() {
        QuestionType::Nat => (" Numerical Answer ", numeric_lines(response)),
        QuestionType::Msq => (
            " Options (select all that apply) ",
            option_lines(question.options(), response, app.option_cursor(), true),
        ),
        QuestionType::Mcq | QuestionType::Match => (
            " Options ",
            option_lines(question.options(), response, app.option_cursor(), false),
        ),
    };

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .title(title)
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn option_lines<'a>(
    options: &'a [String],
    response: &ResponseRecord,
    cursor: usize,
    multiple: bool,
) -> Vec<Line<'a>> {
    let mut lines = Vec::with_capacity(options.len() * 2);

    for (index, option) in options.iter().enumerate() {
        let is_cursor = index == cursor;
        let is_chosen = if multiple {
            response.selected_options.contains(&index)
        } else {
            response.selected_option == Some(index)
        };

        let mark = match (multiple, is_chosen) {
            (true, true) => "[x]",
            (true, false) => "[ ]",
            (false, true) => "(•)",
            (false, false) => "( )",
        };
        let style = match (is_cursor, is_chosen) {
            (true, _) => Style::default().fg(Color::Cyan).bold(),
            (false, true) => Style::default().fg(Color::Green),
            (false, false) => Style::default().fg(Color::Gray),
        };
        let label = OPTION_LABELS
            .get(index)
            .map(|c| c.to_string())
            .unwrap_or_else(|| (index + 1).to_string());

        lines.push(Line::from(vec![
            Span::styled(if is_cursor { " > " } else { "   " }, style),
            Span::styled(format!("{} {}. ", mark, label), style),
            Span::styled(option.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    lines
}

fn numeric_lines(response: &ResponseRecord) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Your answer: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}_", response.numerical_value),
                Style::default().fg(Color::Cyan).bold(),
            ),
        ]),
        Line::from(""),
        Line::from("  Digits, '.' and '-' only. Backspace deletes.".fg(Color::DarkGray)),
    ]
}

const ANSWERED: Color = Color::Rgb(0x27, 0xae, 0x60);
const NOT_ANSWERED: Color = Color::Rgb(0xe6, 0x7e, 0x22);
const MARKED: Color = Color::Rgb(0x8e, 0x44, 0xad);
const MARKED_ANSWER_DOT: Color = Color::LightGreen;

fn status_color(status: ResponseStatus) -> Color {
    match status {
        ResponseStatus::NotVisited => Color::DarkGray,
        ResponseStatus::NotAnswered => NOT_ANSWERED,
        ResponseStatus::Answered => ANSWERED,
        ResponseStatus::MarkedForReview | ResponseStatus::AnsweredAndMarked => MARKED,
    }
}

/// A coloured tile; answered-and-marked tiles carry a green dot.
fn tile(status: ResponseStatus, label: String, current: bool) -> Vec<Span<'static>> {
    let mut style = Style::default().fg(Color::White).bg(status_color(status));
    if current {
        style = style.bold().underlined();
    }
    let corner = if status == ResponseStatus::AnsweredAndMarked {
        Span::styled("•", style.fg(MARKED_ANSWER_DOT))
    } else {
        Span::styled(" ", style)
    };
    vec![Span::styled(label, style), corner]
}

fn render_palette(frame: &mut Frame, area: Rect, session: &ExamSession) {
    let mut slots: Vec<Span> = Vec::new();
    for (index, record) in session.responses().iter().enumerate() {
        let current = index == session.current_index();
        slots.extend(tile(record.status, format!(" {:>2}", index + 1), current));
        slots.push(Span::raw(" "));
    }

    let mut lines = vec![Line::from(slots), Line::from("")];

    let summary = session.status_summary();
    for status in ResponseStatus::ALL {
        let count = summary.get(&status).copied().unwrap_or(0);
        let mut legend = tile(status, " ".to_string(), false);
        legend.push(Span::styled(
            format!(" {} ({})", status.label(), count),
            Style::default().fg(Color::Gray),
        ));
        lines.push(Line::from(legend));
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .title(" Palette ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}
