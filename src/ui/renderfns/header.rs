use crate::app::Page;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with site title, current page, and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, title: &str, page: Page) {
  let mut spans = vec![
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
  ];

  for candidate in [Page::Portfolio, Page::Contact] {
    let style = if candidate == page {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(format!(" {} ", candidate.label()), style));
  }

  spans.push(Span::raw("  "));
  // Shortcuts - keys highlighted, descriptions dimmed
  for (key, description) in shortcuts(page) {
    spans.push(Span::styled(format!("<{}>", key), Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(
      format!(" {}   ", description),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn shortcuts(page: Page) -> &'static [(&'static str, &'static str)] {
  match page {
    Page::Portfolio => &[("c", "contact"), ("[ ]", "filter"), ("q", "quit")],
    Page::Contact => &[("Tab", "next field"), ("Ctrl-S", "send"), ("Esc", "back")],
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_shortcuts_per_page() {
    assert!(shortcuts(Page::Portfolio).iter().any(|(k, _)| *k == "c"));
    assert!(shortcuts(Page::Contact).iter().any(|(k, _)| *k == "Esc"));
  }
}
