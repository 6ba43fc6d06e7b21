use crate::site::portfolio::Portfolio;
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Render the portfolio category tabs, highlighting the active filter
pub fn draw_filter_bar(frame: &mut Frame, area: Rect, portfolio: &Portfolio) {
  let mut spans = vec![Span::styled("[Kategorie] ", Style::default().fg(Color::Yellow))];

  for (idx, filter) in portfolio.filters().iter().enumerate() {
    if idx > 0 {
      spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    }
    let style = if filter == portfolio.filter() {
      Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(
      format!(" {} ", truncate(&portfolio.label(filter), 15)),
      style,
    ));
  }

  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
