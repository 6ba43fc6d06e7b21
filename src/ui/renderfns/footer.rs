use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer: key hints, or a highlighted notice when one is showing
pub fn draw_footer(frame: &mut Frame, area: Rect, hints: &str, notice: Option<&str>) {
  let line = match notice {
    Some(text) => Line::from(Span::styled(
      format!(" {} ", text),
      Style::default().fg(Color::Black).bg(Color::Green).bold(),
    )),
    None => Line::from(Span::styled(
      format!(" {}", hints),
      Style::default().fg(Color::DarkGray),
    )),
  };

  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
