//! Single-active-modal lifecycle with per-modal tab selection.

use std::collections::BTreeMap;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use super::host::ModalHost;
use super::registry::{ModalId, ModalRegistry, TabId};

/// Whether an operation changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Applied,
  /// Unknown modal or tab, or already in the requested state.
  Ignored,
}

/// A user action that reaches the controller.
///
/// Markers are attached to UI elements as strings and resolved here, so one
/// dispatch point serves every element, including ones created later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
  /// `open:<modal>`
  Open(ModalId),
  /// `close:<modal>`
  Close(ModalId),
  /// `tab:<modal>/<tab>`
  Tab { modal: ModalId, tab: TabId },
  /// `overlay`
  Overlay,
  /// `escape`
  Escape,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerError {
  #[error("empty trigger marker")]
  Empty,
  #[error("unknown trigger marker: {0}")]
  Unknown(String),
  #[error("tab marker needs <modal>/<tab>: {0}")]
  MalformedTab(String),
}

impl FromStr for Trigger {
  type Err = MarkerError;

  fn from_str(marker: &str) -> Result<Self, Self::Err> {
    let marker = marker.trim();
    if marker.is_empty() {
      return Err(MarkerError::Empty);
    }

    match marker.split_once(':') {
      Some(("open", id)) if !id.is_empty() => Ok(Trigger::Open(ModalId::from(id))),
      Some(("close", id)) if !id.is_empty() => Ok(Trigger::Close(ModalId::from(id))),
      Some(("tab", rest)) => match rest.split_once('/') {
        Some((modal, tab)) if !modal.is_empty() && !tab.is_empty() => Ok(Trigger::Tab {
          modal: ModalId::from(modal),
          tab: TabId::from(tab),
        }),
        _ => Err(MarkerError::MalformedTab(marker.to_string())),
      },
      None if marker == "overlay" => Ok(Trigger::Overlay),
      None if marker == "escape" => Ok(Trigger::Escape),
      _ => Err(MarkerError::Unknown(marker.to_string())),
    }
  }
}

/// Owns the one active modal and the active tab of every registered modal.
///
/// Every dismissal path (overlay, escape, close control) ends in [`close`],
/// so scroll-lock release and focus restoration happen in exactly one place.
///
/// [`close`]: ModalController::close
pub struct ModalController<H: ModalHost> {
  registry: ModalRegistry,
  active_modal: Option<ModalId>,
  active_tabs: BTreeMap<ModalId, TabId>,
  host: H,
}

impl<H: ModalHost> ModalController<H> {
  /// Create a controller with every modal closed and its initial tab selected.
  pub fn new(registry: ModalRegistry, mut host: H) -> Self {
    let mut active_tabs = BTreeMap::new();
    for spec in registry.iter() {
      if let Some(tab) = spec.initial_tab() {
        host.set_tab_active(spec.id(), tab, true);
        active_tabs.insert(spec.id().clone(), tab.clone());
      }
    }

    Self {
      registry,
      active_modal: None,
      active_tabs,
      host,
    }
  }

  pub fn active_modal(&self) -> Option<&ModalId> {
    self.active_modal.as_ref()
  }

  pub fn is_open(&self, modal: &ModalId) -> bool {
    self.active_modal.as_ref() == Some(modal)
  }

  pub fn active_tab(&self, modal: &ModalId) -> Option<&TabId> {
    self.active_tabs.get(modal)
  }

  pub fn registry(&self) -> &ModalRegistry {
    &self.registry
  }

  pub fn host(&self) -> &H {
    &self.host
  }

  /// Open a registered modal, closing whichever modal is open first.
  pub fn open(&mut self, modal: &ModalId) -> Outcome {
    if !self.registry.contains(modal) {
      debug!(%modal, "open ignored: modal not registered");
      return Outcome::Ignored;
    }

    if self.is_open(modal) {
      self.host.focus_modal(modal);
      return Outcome::Ignored;
    }

    if let Some(current) = self.active_modal.clone() {
      self.close(&current);
    }

    self.host.set_scroll_lock(true);
    self.host.set_overlay_active(true);
    self.host.set_modal_active(modal, true);
    self.host.focus_modal(modal);
    self.host.listen_escape(modal);
    self.active_modal = Some(modal.clone());

    debug!(%modal, tab = ?self.active_tabs.get(modal), "modal opened");
    Outcome::Applied
  }

  /// Close `modal` if it is the open one; otherwise nothing happens.
  pub fn close(&mut self, modal: &ModalId) -> Outcome {
    if !self.is_open(modal) {
      debug!(%modal, "close ignored: modal not open");
      return Outcome::Ignored;
    }

    self.host.set_modal_active(modal, false);
    self.host.set_overlay_active(false);
    self.host.set_scroll_lock(false);
    self.host.clear_escape_listener();
    self.host.restore_focus();
    self.active_modal = None;

    debug!(%modal, "modal closed");
    Outcome::Applied
  }

  /// Close whatever modal is open.
  pub fn dismiss(&mut self) -> Outcome {
    match self.active_modal.clone() {
      Some(current) => self.close(&current),
      None => Outcome::Ignored,
    }
  }

  /// Make `tab` the single active tab of `modal`. Works on closed modals too.
  pub fn switch_tab(&mut self, modal: &ModalId, tab: &TabId) -> Outcome {
    let Some(spec) = self.registry.get(modal) else {
      debug!(%modal, %tab, "tab switch ignored: modal not registered");
      return Outcome::Ignored;
    };

    if !spec.has_tab(tab) {
      debug!(%modal, %tab, "tab switch ignored: tab not in modal");
      return Outcome::Ignored;
    }

    if self.active_tabs.get(modal) == Some(tab) {
      return Outcome::Ignored;
    }

    for other in spec.tabs().iter().filter(|t| *t != tab) {
      self.host.set_tab_active(modal, other, false);
    }
    self.host.set_tab_active(modal, tab, true);
    self.active_tabs.insert(modal.clone(), tab.clone());

    Outcome::Applied
  }

  /// The tab `offset` positions away from the active one, wrapping around.
  pub fn adjacent_tab(&self, modal: &ModalId, offset: isize) -> Option<TabId> {
    let tabs = self.registry.get(modal)?.tabs();
    if tabs.is_empty() {
      return None;
    }

    let current = self
      .active_tabs
      .get(modal)
      .and_then(|active| tabs.iter().position(|t| t == active))
      .unwrap_or(0);
    let len = tabs.len() as isize;
    let next = (current as isize + offset).rem_euclid(len) as usize;

    tabs.get(next).cloned()
  }

  /// Single dispatch point for every trigger.
  pub fn handle(&mut self, trigger: &Trigger) -> Outcome {
    match trigger {
      Trigger::Open(modal) => self.open(modal),
      Trigger::Close(modal) => self.close(modal),
      Trigger::Tab { modal, tab } => self.switch_tab(modal, tab),
      Trigger::Overlay => self.dismiss(),
      Trigger::Escape => {
        if self.active_modal.is_some() {
          self.dismiss()
        } else {
          Outcome::Ignored
        }
      }
    }
  }

  /// Resolve a marker string and dispatch it. Malformed markers are ignored.
  pub fn dispatch(&mut self, marker: &str) -> Outcome {
    match marker.parse::<Trigger>() {
      Ok(trigger) => self.handle(&trigger),
      Err(e) => {
        debug!(error = %e, "trigger ignored");
        Outcome::Ignored
      }
    }
  }
}
