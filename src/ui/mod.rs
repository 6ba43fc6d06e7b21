pub mod components;
pub mod renderfns;

use crate::app::{App, Page};
use components::{draw_filter_bar, draw_modal_dialog, draw_project_list};
use ratatui::prelude::*;
use renderfns::{draw_footer, draw_header};

const CONFIRMATION: &str = "Nachricht gesendet! Vielen Dank.";

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Page content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  draw_header(frame, chunks[0], app.title(), app.page());

  match app.page() {
    Page::Portfolio => draw_portfolio(frame, chunks[1], app),
    Page::Contact => app.contact().render(frame, chunks[1]),
  }

  let notice = app.confirmation_visible().then_some(CONFIRMATION);
  draw_footer(frame, chunks[2], app.hints(), notice);

  // Dialog goes last so it covers the page
  let overlay = app.overlay_active();
  let dialog_area = app
    .open_dialog()
    .map(|(project, tab)| draw_modal_dialog(frame, chunks[1], project, tab, overlay));
  app.set_dialog_area(dialog_area);
}

fn draw_portfolio(frame: &mut Frame, area: Rect, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(1), Constraint::Min(1)])
    .split(area);

  draw_filter_bar(frame, chunks[0], app.portfolio());
  let visible = app.portfolio().visible();
  draw_project_list(frame, chunks[1], &visible, app.selected());
}
