//! Site content: portfolio projects and the contact form.

pub mod contact;
pub mod portfolio;

use serde::Deserialize;

use crate::modal::{ModalId, ModalRegistry, ModalSpec};

/// A portfolio category the visitor can filter by.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
  pub id: String,
  pub label: String,
}

/// One tab of a project's detail dialog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectTab {
  pub id: String,
  pub label: String,
  #[serde(default)]
  pub body: String,
  /// Shown first when the dialog opens
  #[serde(default)]
  pub default: bool,
}

/// A portfolio entry. Each project owns one detail dialog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
  pub id: String,
  pub title: String,
  pub category: String,
  #[serde(default)]
  pub summary: String,
  #[serde(default)]
  pub tabs: Vec<ProjectTab>,
}

impl Project {
  /// Id of the project's detail dialog.
  pub fn modal_id(&self) -> ModalId {
    ModalId::new(format!("modal-{}", self.id))
  }

  /// Marker that opens the project's dialog when activated.
  pub fn trigger_marker(&self) -> String {
    format!("open:{}", self.modal_id())
  }

  pub fn modal_spec(&self) -> ModalSpec {
    let spec = ModalSpec::new(self.modal_id(), self.tabs.iter().map(|t| t.id.clone()));
    match self.tabs.iter().find(|t| t.default) {
      Some(tab) => spec.with_default(tab.id.clone()),
      None => spec,
    }
  }

  pub fn tab(&self, id: &str) -> Option<&ProjectTab> {
    self.tabs.iter().find(|t| t.id == id)
  }
}

/// Register one dialog per project.
pub fn modal_registry(projects: &[Project]) -> ModalRegistry {
  projects.iter().map(Project::modal_spec).collect()
}
