use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::site::contact::{ContactForm, FieldKind, FormField, Submission};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use std::time::Instant;

/// Events emitted by the contact form that the app needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactEvent {
  Submitted(Submission),
  /// User left the form
  Cancelled,
}

/// Contact form component: one text input per field, validated on leave and
/// on submit.
#[derive(Debug, Clone)]
pub struct ContactFormView {
  form: ContactForm,
  inputs: Vec<TextInput>,
  focused: usize,
}

impl ContactFormView {
  pub fn new(fields: Vec<FormField>) -> Self {
    let inputs = vec![TextInput::new(); fields.len()];
    Self {
      form: ContactForm::new(fields),
      inputs,
      focused: 0,
    }
  }

  pub fn form(&self) -> &ContactForm {
    &self.form
  }

  fn move_focus(&mut self, direction: i32) {
    let count = self.inputs.len();
    if count == 0 {
      return;
    }
    // leaving a field validates it
    self.form.validate_at(self.focused);
    self.focused = (self.focused as i32 + direction).rem_euclid(count as i32) as usize;
  }

  fn submit(&mut self) -> KeyResult<ContactEvent> {
    match self.form.submit(Instant::now()) {
      Some(submission) => {
        for input in &mut self.inputs {
          input.clear();
        }
        self.focused = 0;
        KeyResult::Event(ContactEvent::Submitted(submission))
      }
      None => {
        // jump to the first invalid field
        if let Some(index) = self
          .form
          .fields()
          .iter()
          .position(|f| self.form.error(&f.name).is_some())
        {
          self.focused = index;
        }
        KeyResult::Handled
      }
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ContactEvent> {
    let last = self.inputs.len().saturating_sub(1);

    match key.code {
      KeyCode::Esc => return KeyResult::Event(ContactEvent::Cancelled),
      KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => return self.submit(),
      KeyCode::Enter if self.focused >= last => return self.submit(),
      KeyCode::Enter | KeyCode::Tab | KeyCode::Down => {
        self.move_focus(1);
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.move_focus(-1);
        return KeyResult::Handled;
      }
      _ => {}
    }

    let Some(input) = self.inputs.get_mut(self.focused) else {
      return KeyResult::NotHandled;
    };

    match input.handle_key(key) {
      InputResult::Changed => {
        self.form.set_value(self.focused, input.value());
        KeyResult::Handled
      }
      InputResult::Consumed => KeyResult::Handled,
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let fields = self.form.fields();
    let heights: Vec<Constraint> = fields
      .iter()
      .map(|f| match f.kind {
        FieldKind::Textarea => Constraint::Length(5),
        _ => Constraint::Length(3),
      })
      .chain(std::iter::once(Constraint::Min(0)))
      .collect();

    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints(heights)
      .split(area);

    for (index, field) in fields.iter().enumerate() {
      let focused = index == self.focused;
      let error = self.form.error(&field.name);

      let border_style = match (error, focused) {
        (Some(_), _) => Style::default().fg(Color::Red),
        (None, true) => Style::default().fg(Color::Yellow),
        (None, false) => Style::default().fg(Color::DarkGray),
      };

      let mut title = vec![Span::raw(format!(" {}", field.label))];
      if field.required {
        title.push(Span::styled("*", Style::default().fg(Color::Red)));
      }
      title.push(Span::raw(" "));

      let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Line::from(title));
      if let Some(error) = error {
        block = block.title_bottom(Line::styled(
          format!(" {} ", error),
          Style::default().fg(Color::Red),
        ));
      }

      let input = &self.inputs[index];
      let spans = if focused {
        let before: String = input.value().chars().take(input.cursor_position()).collect();
        let after: String = input.value().chars().skip(input.cursor_position()).collect();
        vec![
          Span::raw(before),
          Span::styled("│", Style::default().fg(Color::Yellow)),
          Span::raw(after),
        ]
      } else {
        vec![Span::raw(input.value().to_string())]
      };

      let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .wrap(ratatui::widgets::Wrap { trim: false });
      frame.render_widget(paragraph, rows[index]);
    }

    if self.form.has_errors() {
      frame.render_widget(
        Paragraph::new(Line::styled(
          " Bitte die markierten Felder prüfen.",
          Style::default().fg(Color::Red),
        )),
        rows[fields.len()],
      );
    }
  }
}
