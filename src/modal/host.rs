//! The surface a modal controller drives.

use std::collections::BTreeSet;

use super::registry::{ModalId, TabId};

/// Side effects a [`ModalController`](super::ModalController) applies to its host.
///
/// The controller owns the lifecycle; the host only reflects it. Implementations
/// must not call back into the controller.
pub trait ModalHost {
  /// Lock or release scrolling of the page behind the overlay.
  fn set_scroll_lock(&mut self, locked: bool);

  fn set_overlay_active(&mut self, active: bool);

  fn set_modal_active(&mut self, modal: &ModalId, active: bool);

  fn set_tab_active(&mut self, modal: &ModalId, tab: &TabId, active: bool);

  /// Move keyboard focus into the modal.
  fn focus_modal(&mut self, modal: &ModalId);

  /// Give keyboard focus back to the page.
  fn restore_focus(&mut self);

  /// Route the escape key to the given modal until `clear_escape_listener`.
  fn listen_escape(&mut self, modal: &ModalId);

  fn clear_escape_listener(&mut self);
}

/// Where keyboard input goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Focus {
  #[default]
  Page,
  Modal(ModalId),
}

/// In-memory host state the terminal UI renders from.
#[derive(Debug, Clone, Default)]
pub struct Surface {
  scroll_locked: bool,
  overlay_active: bool,
  active_modals: BTreeSet<ModalId>,
  active_tabs: BTreeSet<(ModalId, TabId)>,
  focus: Focus,
  escape_listener: Option<ModalId>,
}

impl Surface {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_scroll_locked(&self) -> bool {
    self.scroll_locked
  }

  pub fn is_overlay_active(&self) -> bool {
    self.overlay_active
  }

  pub fn is_modal_active(&self, modal: &ModalId) -> bool {
    self.active_modals.contains(modal)
  }

  /// Every modal currently marked active.
  #[cfg(test)]
  pub fn active_modals(&self) -> impl Iterator<Item = &ModalId> {
    self.active_modals.iter()
  }

  #[cfg(test)]
  pub fn is_tab_active(&self, modal: &ModalId, tab: &TabId) -> bool {
    self
      .active_tabs
      .iter()
      .any(|(m, t)| m == modal && t == tab)
  }

  /// Tabs of `modal` currently marked active.
  #[cfg(test)]
  pub fn active_tabs(&self, modal: &ModalId) -> Vec<&TabId> {
    self
      .active_tabs
      .iter()
      .filter(|(m, _)| m == modal)
      .map(|(_, t)| t)
      .collect()
  }

  pub fn focus(&self) -> &Focus {
    &self.focus
  }

  pub fn escape_listener(&self) -> Option<&ModalId> {
    self.escape_listener.as_ref()
  }
}

impl ModalHost for Surface {
  fn set_scroll_lock(&mut self, locked: bool) {
    self.scroll_locked = locked;
  }

  fn set_overlay_active(&mut self, active: bool) {
    self.overlay_active = active;
  }

  fn set_modal_active(&mut self, modal: &ModalId, active: bool) {
    if active {
      self.active_modals.insert(modal.clone());
    } else {
      self.active_modals.remove(modal);
    }
  }

  fn set_tab_active(&mut self, modal: &ModalId, tab: &TabId, active: bool) {
    let entry = (modal.clone(), tab.clone());
    if active {
      self.active_tabs.insert(entry);
    } else {
      self.active_tabs.remove(&entry);
    }
  }

  fn focus_modal(&mut self, modal: &ModalId) {
    self.focus = Focus::Modal(modal.clone());
  }

  fn restore_focus(&mut self) {
    self.focus = Focus::Page;
  }

  fn listen_escape(&mut self, modal: &ModalId) {
    self.escape_listener = Some(modal.clone());
  }

  fn clear_escape_listener(&mut self) {
    self.escape_listener = None;
  }
}
