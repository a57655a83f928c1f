mod entry;
mod quiz;
mod waiting;

use ratatui::{prelude::*, widgets::Block};

use crate::app::{App, Screen};

pub use quiz::canvas_area;

pub fn render<S>(frame: &mut Frame, app: &App<S>) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match &app.screen {
        Screen::Entry(form) => entry::render(frame, area, form),
        Screen::Quiz(flow) => quiz::render(frame, area, flow, app.notice()),
        Screen::Waiting(handle) => waiting::render(frame, area, &handle.state(), app.identity()),
    }
}
