use crate::site::Project;
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

/// Render the visible portfolio projects with the selection highlighted
pub fn draw_project_list(frame: &mut Frame, area: Rect, projects: &[&Project], selected: usize) {
  let title_width = projects
    .iter()
    .map(|p| p.title.chars().count())
    .max()
    .unwrap_or(10)
    .min(32);

  let items: Vec<ListItem> = projects
    .iter()
    .map(|project| {
      ListItem::new(Line::from(vec![
        Span::styled(
          format!("{:<width$}", truncate(&project.title, 32), width = title_width),
          Style::default().fg(Color::White).bold(),
        ),
        Span::raw("  "),
        Span::styled(
          format!("{:<12}", project.category),
          Style::default().fg(Color::Yellow),
        ),
        Span::styled(project.summary.clone(), Style::default().fg(Color::Gray)),
      ]))
    })
    .collect();

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan))
    .title(format!(" Projekte ({}) ", projects.len()));

  let list = List::new(items)
    .block(block)
    .highlight_style(Style::default().bg(Color::DarkGray))
    .highlight_symbol("> ");

  let mut state = ListState::default();
  if !projects.is_empty() {
    state.select(Some(selected.min(projects.len() - 1)));
  }

  frame.render_stateful_widget(list, area, &mut state);
}
