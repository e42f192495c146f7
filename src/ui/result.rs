use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::scoring::{ScoreReport, format_correct_answer, format_response};
use crate::session::ExamSession;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let (Some(report), Some(session)) = (app.report(), app.session()) else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[0], report);
    render_question_breakdown(frame, chunks[1], report, session, app.result_scroll());
    super::render_controls(
        frame,
        chunks[2],
        "j/k scroll  ·  r retake  ·  n new test  ·  c assistant  ·  q quit",
    );
}

fn grade_color(percentage: f64) -> Color {
    match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, report: &ScoreReport) {
    let percentage = report.percentage();
    let content = vec![
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / {}  ({:.0}%)", report.score, report.total, percentage),
            Style::default().fg(grade_color(percentage)).bold(),
        )),
        Line::from(report.affirmation().fg(Color::White)),
        Line::from(""),
        Line::from(
            format!(
                "Answered {}  ·  Marked for review {}",
                report.answered_count(),
                report.marked_count()
            )
            .fg(Color::DarkGray),
        ),
    ];

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Color::DarkGray),
        );
    frame.render_widget(widget, area);
}

/// One block per question, starting at the scrolled-to question.
fn render_question_breakdown(
    frame: &mut Frame,
    area: Rect,
    report: &ScoreReport,
    session: &ExamSession,
    scroll: usize,
) {
    let mut lines: Vec<Line> = Vec::new();

    let rows = report
        .verdicts
        .iter()
        .zip(session.questions())
        .zip(session.responses())
        .enumerate()
        .skip(scroll);

    for (index, ((verdict, question), response)) in rows {
        let (symbol, color) = match (verdict.correct, verdict.answered) {
            (true, _) => ("+", Color::Green),
            (false, true) => ("-", Color::Red),
            (false, false) => ("·", Color::DarkGray),
        };
        let mut heading = vec![
            Span::styled(format!(" {} ", symbol), Style::default().fg(color).bold()),
            Span::styled(
                format!("{:2}. ", index + 1),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(question.text.as_str(), Style::default().fg(Color::White)),
        ];
        if verdict.marked {
            heading.push(Span::styled(" [marked]", Style::default().fg(Color::Magenta)));
        }
        lines.push(Line::from(heading));

        lines.push(Line::from(vec![
            Span::styled("     Your answer: ", Style::default().fg(Color::DarkGray)),
            Span::styled(format_response(question, response), Style::default().fg(color)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("     Correct:     ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format_correct_answer(question),
                Style::default().fg(Color::Green),
            ),
        ]));
        if !question.explanation.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("     {}", question.explanation),
                Style::default().fg(Color::Gray).italic(),
            )));
        }
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().padding(Padding::horizontal(1)));
    frame.render_widget(widget, area);
}
