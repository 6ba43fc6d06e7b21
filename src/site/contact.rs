//! Contact form model and validation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

static EMAIL_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email pattern regex"));

/// How long the "message sent" confirmation stays visible.
pub const CONFIRMATION_TIME: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
  #[default]
  Text,
  Email,
  Textarea,
  Select,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormField {
  pub name: String,
  pub label: String,
  #[serde(default)]
  pub kind: FieldKind,
  #[serde(default)]
  pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
  Required,
  InvalidEmail,
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FieldError::Required => f.write_str("Please fill out this field."),
      FieldError::InvalidEmail => f.write_str("Please enter a valid email address."),
    }
  }
}

/// Validate one value against its field. The value is trimmed first.
pub fn validate_field(field: &FormField, value: &str) -> Result<(), FieldError> {
  let value = value.trim();

  if field.required && value.is_empty() {
    return Err(FieldError::Required);
  }

  if field.kind == FieldKind::Email && !value.is_empty() && !EMAIL_RE.is_match(value) {
    return Err(FieldError::InvalidEmail);
  }

  Ok(())
}

/// Values collected from a valid form, keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
  pub values: BTreeMap<String, String>,
}

/// Form state: one value per field, the current errors, and the time of the
/// last successful submit.
#[derive(Debug, Clone)]
pub struct ContactForm {
  fields: Vec<FormField>,
  values: Vec<String>,
  errors: BTreeMap<String, FieldError>,
  sent_at: Option<Instant>,
}

impl ContactForm {
  pub fn new(fields: Vec<FormField>) -> Self {
    let values = vec![String::new(); fields.len()];
    Self {
      fields,
      values,
      errors: BTreeMap::new(),
      sent_at: None,
    }
  }

  pub fn fields(&self) -> &[FormField] {
    &self.fields
  }

  #[cfg(test)]
  pub fn value(&self, index: usize) -> &str {
    self.values.get(index).map(String::as_str).unwrap_or("")
  }

  pub fn error(&self, name: &str) -> Option<FieldError> {
    self.errors.get(name).copied()
  }

  pub fn has_errors(&self) -> bool {
    !self.errors.is_empty()
  }

  /// Update a value. Editing a field clears its error.
  pub fn set_value(&mut self, index: usize, value: &str) {
    let Some(slot) = self.values.get_mut(index) else {
      return;
    };
    if slot.as_str() != value {
      *slot = value.to_string();
      if let Some(field) = self.fields.get(index) {
        self.errors.remove(&field.name);
      }
    }
  }

  /// Validate a single field (on leaving it), recording any error.
  pub fn validate_at(&mut self, index: usize) -> bool {
    let Some(field) = self.fields.get(index) else {
      return true;
    };
    match validate_field(field, &self.values[index]) {
      Ok(()) => {
        self.errors.remove(&field.name);
        true
      }
      Err(e) => {
        self.errors.insert(field.name.clone(), e);
        false
      }
    }
  }

  /// Validate every field; all errors are recorded, not just the first.
  pub fn validate(&mut self) -> bool {
    let mut valid = true;
    for index in 0..self.fields.len() {
      valid &= self.validate_at(index);
    }
    valid
  }

  /// Validate and, when valid, collect the values and reset the form.
  pub fn submit(&mut self, now: Instant) -> Option<Submission> {
    if !self.validate() {
      return None;
    }

    let values = self
      .fields
      .iter()
      .zip(&self.values)
      .map(|(field, value)| (field.name.clone(), value.trim().to_string()))
      .collect();

    self.reset();
    self.sent_at = Some(now);
    Some(Submission { values })
  }

  pub fn reset(&mut self) {
    for value in &mut self.values {
      value.clear();
    }
    self.errors.clear();
  }

  /// Whether the "message sent" confirmation is still showing at `now`.
  pub fn confirmation_visible(&self, now: Instant) -> bool {
    self
      .sent_at
      .is_some_and(|sent| now.saturating_duration_since(sent) < CONFIRMATION_TIME)
  }
}
