use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{EntryField, EntryForm};

pub fn render(frame: &mut Frame, area: Rect, form: &EntryForm) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(13),
        Constraint::Fill(1),
    ])
    .split(area);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "GRID QUIZ",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        input_line("Your name: ", &form.name, form.focus == EntryField::Name),
        Line::from(""),
        input_line(
            "Group code: ",
            &form.group_code,
            form.focus == EntryField::GroupCode,
        ),
        Line::from(""),
    ];

    match &form.error {
        Some(err) => content.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        ))),
        None => content.push(Line::from("")),
    }

    content.push(Line::from(""));
    content.push(Line::from(
        "Share the group code with the people you want to match with".fg(Color::DarkGray),
    ));
    content.push(Line::from(""));
    content.push(Line::from(
        "[Tab] switch field  ·  [Enter] start  ·  [Esc] quit".fg(Color::DarkGray),
    ));

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, chunks[1]);
}

fn input_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let value_style = if focused {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = if focused { "_" } else { " " };

    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::White)),
        Span::styled(value, value_style),
        Span::styled(cursor, value_style),
    ])
}
