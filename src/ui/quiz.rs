use ratatui::{
    layout::Margin,
    prelude::*,
    symbols::Marker,
    widgets::{
        Block, Borders, Paragraph, Wrap,
        canvas::{Canvas, Line as CanvasLine, Points},
    },
};

use crate::flow::{FlowState, QuizFlow};
use crate::grid::GRID_CELLS;
use crate::models::{Answer, Question};

/// Columns kept free on each side of the canvas for the side prompts.
const SIDE_TEXT_WIDTH: u16 = 24;

struct QuizLayout {
    title: Rect,
    top: Rect,
    left: Rect,
    frame: Rect,
    right: Rect,
    bottom: Rect,
    status: Rect,
    controls: Rect,
}

fn layout(area: Rect) -> QuizLayout {
    let rows = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Min(8),
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let middle = rows[2];

    // Terminal cells are about twice as tall as wide.
    let width = middle
        .height
        .saturating_mul(2)
        .min(middle.width.saturating_sub(2 * SIDE_TEXT_WIDTH));
    let height = width / 2;

    let cols = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width),
        Constraint::Fill(1),
    ])
    .split(middle);

    let frame = Rect {
        x: cols[1].x,
        y: middle.y + (middle.height - height) / 2,
        width,
        height,
    };

    QuizLayout {
        title: rows[0],
        top: rows[1],
        left: cols[0],
        frame,
        right: cols[2],
        bottom: rows[3],
        status: rows[4],
        controls: rows[5],
    }
}

/// Screen area mouse clicks are mapped from, inside the canvas border.
pub fn canvas_area(area: Rect) -> Rect {
    layout(area).frame.inner(Margin::new(1, 1))
}

pub fn render(frame: &mut Frame, area: Rect, flow: &QuizFlow, notice: Option<&str>) {
    let Some(question) = flow.current_question() else {
        return;
    };
    let chunks = layout(area);
    let pending = flow.pending();

    let title = Paragraph::new(question.title.as_str())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Cyan).bold());
    frame.render_widget(title, chunks.title);

    render_prompts(frame, &chunks, question, pending);
    render_canvas(frame, chunks.frame, flow);
    render_status(frame, chunks.status, flow, notice);
    render_controls(frame, chunks.controls, flow);
}

fn prompt<'a>(text: &'a str, label: &str, value: Option<u8>) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from(Span::styled(text, Style::default().fg(Color::White)))];
    if let Some(value) = value {
        lines.push(Line::from(Span::styled(
            format!("{}: {}%", label, value),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines
}

fn render_prompts(frame: &mut Frame, chunks: &QuizLayout, question: &Question, pending: Option<&Answer>) {
    let percentages = pending.map(|answer| answer.percentages);

    let top = Paragraph::new(prompt(&question.top_text, "Top", percentages.map(|p| p.top)))
        .alignment(Alignment::Center);
    frame.render_widget(top, chunks.top);

    let left = Paragraph::new(prompt(&question.left_text, "Left", percentages.map(|p| p.left)))
        .alignment(Alignment::Right)
        .wrap(Wrap { trim: true });
    frame.render_widget(left, side_text_area(chunks.left, chunks.frame));

    let right = Paragraph::new(prompt(&question.right_text, "Right", percentages.map(|p| p.right)))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    frame.render_widget(right, side_text_area(chunks.right, chunks.frame));

    let bottom = Paragraph::new(prompt(
        &question.bottom_text,
        "Bottom",
        percentages.map(|p| p.bottom),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(bottom, chunks.bottom);
}

/// Vertically centre side text against the canvas, with a one column gap.
fn side_text_area(column: Rect, canvas: Rect) -> Rect {
    let height = 4.min(column.height);
    Rect {
        x: column.x + 1,
        y: canvas.y + canvas.height.saturating_sub(height) / 2,
        width: column.width.saturating_sub(2),
        height,
    }
}

fn render_canvas(frame: &mut Frame, area: Rect, flow: &QuizFlow) {
    let grid = flow.canvas();
    let size = grid.size();
    let cell = size / f64::from(GRID_CELLS);
    let diagonals = grid.diagonals();
    // Canvas y grows upwards; clicks are recorded with y growing down.
    let marker = grid.marker().map(|(x, y)| (x, size - y));

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, size])
        .y_bounds([0.0, size])
        .paint(move |ctx| {
            for i in 1..GRID_CELLS {
                let offset = cell * f64::from(i);
                ctx.draw(&CanvasLine::new(offset, 0.0, offset, size, Color::DarkGray));
                ctx.draw(&CanvasLine::new(0.0, offset, size, offset, Color::DarkGray));
            }
            for (x1, y1, x2, y2) in diagonals {
                ctx.draw(&CanvasLine::new(x1, size - y1, x2, size - y2, Color::White));
            }
            if let Some(point) = marker {
                ctx.layer();
                ctx.draw(&Points {
                    coords: &[point],
                    color: Color::Red,
                });
            }
        });

    frame.render_widget(canvas, area);
}

fn render_status(frame: &mut Frame, area: Rect, flow: &QuizFlow, notice: Option<&str>) {
    let line = if let Some(error) = flow.error() {
        Line::from(Span::styled(error, Style::default().fg(Color::Red).bold()))
    } else if let Some(notice) = notice {
        Line::from(Span::styled(notice, Style::default().fg(Color::Yellow)))
    } else if *flow.state() == FlowState::Submitting {
        Line::from("Processing...".fg(Color::Yellow))
    } else if let Some(answer) = flow.pending() {
        let action = if flow.is_last_question() {
            "Finish Quiz"
        } else {
            "Next Question"
        };
        Line::from(vec![
            Span::styled(
                format!("Selected quadrant: {}", answer.quadrant_number),
                Style::default().fg(Color::White),
            ),
            Span::styled("  ·  [Enter] ", Style::default().fg(Color::DarkGray)),
            Span::styled(action, Style::default().fg(Color::Green).bold()),
        ])
    } else {
        Line::from("Click on the grid to place your dot".fg(Color::DarkGray))
    };

    let widget = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, flow: &QuizFlow) {
    let text = format!(
        "Question {} of {}  ·  click or arrows to place  ·  enter next  ·  q quit",
        flow.current_index() + 1,
        flow.total_questions()
    );
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_fits_inside_screen() {
        let area = Rect::new(0, 0, 120, 40);
        let canvas = canvas_area(area);

        assert!(canvas.width > 0 && canvas.height > 0);
        assert!(canvas.right() <= area.right());
        assert!(canvas.bottom() <= area.bottom());
    }

    #[test]
    fn test_tiny_screen_has_no_canvas() {
        let canvas = canvas_area(Rect::new(0, 0, 40, 12));
        assert_eq!(canvas.area(), 0);
    }
}
