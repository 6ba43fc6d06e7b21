//! Known modals and their tab sets.

use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a registered modal (e.g. `modal-stb`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModalId(String);

impl ModalId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<&str> for ModalId {
  fn from(id: &str) -> Self {
    Self::new(id)
  }
}

impl fmt::Display for ModalId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Identifier of a tab inside one modal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TabId(String);

impl TabId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<&str> for TabId {
  fn from(id: &str) -> Self {
    Self::new(id)
  }
}

impl fmt::Display for TabId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A modal and its ordered tab set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalSpec {
  id: ModalId,
  tabs: Vec<TabId>,
  default_tab: Option<TabId>,
}

impl ModalSpec {
  pub fn new<I, T>(id: impl Into<ModalId>, tabs: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<TabId>,
  {
    let mut ordered: Vec<TabId> = Vec::new();
    for tab in tabs {
      let tab = tab.into();
      if !ordered.contains(&tab) {
        ordered.push(tab);
      }
    }

    Self {
      id: id.into(),
      tabs: ordered,
      default_tab: None,
    }
  }

  /// Mark the tab that is active before the user picks one.
  /// Ignored if the tab is not part of this modal.
  pub fn with_default(mut self, tab: impl Into<TabId>) -> Self {
    let tab = tab.into();
    if self.tabs.contains(&tab) {
      self.default_tab = Some(tab);
    }
    self
  }

  pub fn id(&self) -> &ModalId {
    &self.id
  }

  pub fn tabs(&self) -> &[TabId] {
    &self.tabs
  }

  pub fn has_tab(&self, tab: &TabId) -> bool {
    self.tabs.contains(tab)
  }

  /// The designated default tab, or the first tab when none was designated.
  pub fn initial_tab(&self) -> Option<&TabId> {
    self.default_tab.as_ref().or_else(|| self.tabs.first())
  }
}

impl From<String> for ModalId {
  fn from(id: String) -> Self {
    Self(id)
  }
}

impl From<String> for TabId {
  fn from(id: String) -> Self {
    Self(id)
  }
}

/// Registry of every modal the controller knows about.
#[derive(Debug, Clone, Default)]
pub struct ModalRegistry {
  modals: BTreeMap<ModalId, ModalSpec>,
}

impl ModalRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a modal, replacing any previous spec with the same id.
  pub fn register(&mut self, spec: ModalSpec) {
    self.modals.insert(spec.id.clone(), spec);
  }

  pub fn get(&self, id: &ModalId) -> Option<&ModalSpec> {
    self.modals.get(id)
  }

  pub fn contains(&self, id: &ModalId) -> bool {
    self.modals.contains_key(id)
  }

  pub fn iter(&self) -> impl Iterator<Item = &ModalSpec> {
    self.modals.values()
  }

  pub fn len(&self) -> usize {
    self.modals.len()
  }

  pub fn is_empty(&self) -> bool {
    self.modals.is_empty()
  }
}

impl FromIterator<ModalSpec> for ModalRegistry {
  fn from_iter<I: IntoIterator<Item = ModalSpec>>(iter: I) -> Self {
    let mut registry = Self::new();
    for spec in iter {
      registry.register(spec);
    }
    registry
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_initial_tab_defaults_to_first() {
    let spec = ModalSpec::new("modal-stb", ["overview", "demo"]);
    assert_eq!(spec.initial_tab(), Some(&TabId::from("overview")));
  }

  #[test]
  fn test_designated_default_wins() {
    let spec = ModalSpec::new("modal-stb", ["overview", "demo"]).with_default("demo");
    assert_eq!(spec.initial_tab(), Some(&TabId::from("demo")));
  }

  #[test]
  fn test_unknown_default_is_ignored() {
    let spec = ModalSpec::new("modal-stb", ["overview"]).with_default("pricing");
    assert_eq!(spec.initial_tab(), Some(&TabId::from("overview")));
  }

  #[test]
  fn test_duplicate_tabs_collapse() {
    let spec = ModalSpec::new("modal-stb", ["a", "b", "a"]);
    assert_eq!(spec.tabs().len(), 2);
  }

  #[test]
  fn test_modal_without_tabs_has_no_initial_tab() {
    let spec = ModalSpec::new("modal-empty", Vec::<TabId>::new());
    assert!(spec.initial_tab().is_none());
  }

  #[test]
  fn test_registry_replaces_same_id() {
    let registry: ModalRegistry = [
      ModalSpec::new("modal-a", ["one"]),
      ModalSpec::new("modal-a", ["one", "two"]),
    ]
    .into_iter()
    .collect();

    assert_eq!(registry.len(), 1);
    let spec = registry.get(&ModalId::from("modal-a")).unwrap();
    assert_eq!(spec.tabs().len(), 2);
  }
}
