use crate::modal::TabId;
use crate::site::Project;
use crate::ui::renderfns::centered_rect;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};

const DIALOG_WIDTH: u16 = 72;
const DIALOG_HEIGHT: u16 = 20;

/// Render a project's detail dialog over `area` and return the rect it
/// occupies. Clicks outside that rect land on the overlay.
pub fn draw_modal_dialog(
  frame: &mut Frame,
  area: Rect,
  project: &Project,
  active_tab: Option<&TabId>,
  overlay: bool,
) -> Rect {
  if overlay {
    // Dim everything behind the dialog
    frame.render_widget(
      Block::default().style(Style::default().bg(Color::Black).fg(Color::DarkGray)),
      area,
    );
  }

  let dialog = centered_rect(area, DIALOG_WIDTH, DIALOG_HEIGHT);
  frame.render_widget(Clear, dialog);

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow))
    .title(format!(" {} ", project.title))
    .title_bottom(Line::styled(
      " Tab:next  1-9:jump  Esc/x:close ",
      Style::default().fg(Color::DarkGray),
    ));

  let inner = block.inner(dialog);
  frame.render_widget(block, dialog);

  if inner.height < 3 {
    return dialog;
  }

  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(2), Constraint::Min(1)])
    .split(inner);

  let selected = active_tab.and_then(|active| project.tabs.iter().position(|t| t.id == active.as_str()));

  let titles: Vec<Line> = project
    .tabs
    .iter()
    .enumerate()
    .map(|(idx, tab)| Line::from(format!("{} {}", idx + 1, tab.label)))
    .collect();

  let mut tabs = Tabs::new(titles)
    .style(Style::default().fg(Color::Gray))
    .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
    .divider(Span::styled("│", Style::default().fg(Color::DarkGray)));
  if let Some(selected) = selected {
    tabs = tabs.select(selected);
  }
  frame.render_widget(tabs, chunks[0]);

  let body = match selected.and_then(|idx| project.tabs.get(idx)) {
    Some(tab) => tab.body.as_str(),
    None => project.summary.as_str(),
  };
  frame.render_widget(
    Paragraph::new(body)
      .style(Style::default().fg(Color::White))
      .wrap(Wrap { trim: true }),
    chunks[1],
  );

  dialog
}
