use ratatui::prelude::Rect;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// A rect of at most `width` x `height` centered in `area`.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  let x = area.x + (area.width - width) / 2;
  let y = area.y + (area.height - height) / 2;
  Rect::new(x, y, width, height)
}

/// Whether the terminal cell (`column`, `row`) lies inside `area`.
pub fn contains(area: Rect, column: u16, row: u16) -> bool {
  column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("Logopädiepraxis", 8), "Logop...");
  }

  #[test]
  fn test_centered_rect() {
    let area = Rect::new(0, 0, 100, 40);
    assert_eq!(centered_rect(area, 60, 20), Rect::new(20, 10, 60, 20));
  }

  #[test]
  fn test_centered_rect_clamps_to_area() {
    let area = Rect::new(2, 1, 30, 10);
    assert_eq!(centered_rect(area, 80, 50), area);
  }

  #[test]
  fn test_contains() {
    let area = Rect::new(10, 5, 20, 10);
    assert!(contains(area, 10, 5));
    assert!(contains(area, 29, 14));
    assert!(!contains(area, 30, 5));
    assert!(!contains(area, 9, 5));
    assert!(!contains(area, 10, 15));
  }
}
