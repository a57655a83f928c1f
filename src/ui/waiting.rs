use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::models::QuizResponse;
use crate::poller::MatchState;
use crate::session::Identity;

pub fn render(frame: &mut Frame, area: Rect, state: &MatchState, identity: Option<&Identity>) {
    let chunks = Layout::vertical([
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let heading = match state {
        MatchState::Failed(_) => "Error",
        _ => "Finding Your Matches",
    };
    let mut header = vec![
        Line::from(""),
        Line::from(Span::styled(
            heading,
            Style::default().fg(Color::Cyan).bold(),
        )),
    ];
    if let Some(identity) = identity {
        header.push(Line::from(Span::styled(
            format!("Group {}  ·  {}", identity.group_code(), identity.user_name()),
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(
        Paragraph::new(header).alignment(Alignment::Center),
        chunks[0],
    );

    match state {
        MatchState::Loading => render_message(
            frame,
            chunks[1],
            &["Please wait while we process your responses..."],
            Color::White,
        ),
        MatchState::Ready(matches) if matches.is_empty() => render_message(
            frame,
            chunks[1],
            &[
                "Waiting for others in your group to complete the quiz...",
                "Share your group code with others to see matches!",
            ],
            Color::White,
        ),
        MatchState::Ready(matches) => render_matches(frame, chunks[1], matches),
        MatchState::Failed(message) => {
            render_message(frame, chunks[1], &[message.as_str()], Color::Red)
        }
    }

    let controls = match state {
        MatchState::Failed(_) => "[Enter] Start Over  ·  q quit",
        _ => "checking every few seconds  ·  q quit",
    };
    let widget = Paragraph::new(controls)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, chunks[2]);
}

fn render_message(frame: &mut Frame, area: Rect, lines: &[&str], color: Color) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(lines.len() as u16 * 2),
        Constraint::Fill(1),
    ])
    .split(area);

    let content: Vec<Line> = lines
        .iter()
        .flat_map(|text| {
            [
                Line::from(Span::styled(*text, Style::default().fg(color))),
                Line::from(""),
            ]
        })
        .collect();

    frame.render_widget(
        Paragraph::new(content).alignment(Alignment::Center),
        chunks[1],
    );
}

fn render_matches(frame: &mut Frame, area: Rect, matches: &[QuizResponse]) {
    let lines: Vec<Line> = matches
        .iter()
        .map(|response| {
            Line::from(vec![
                Span::styled(
                    format!("{:<28}", response.user_name),
                    Style::default().fg(Color::White).bold(),
                ),
                Span::styled(" Match! ", Style::default().fg(Color::Black).bg(Color::Green)),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Your Matches ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}
