use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::modal::{Focus, ModalController, ModalId, Outcome, Surface, TabId, Trigger};
use crate::site::portfolio::Portfolio;
use crate::site::{self, Project};
use crate::ui;
use crate::ui::components::{ContactEvent, ContactFormView, KeyResult};
use crate::ui::renderfns::contains;
use color_eyre::Result;
use crossterm::event::{
  DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseButton,
  MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Which page of the site is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
  Portfolio,
  Contact,
}

impl Page {
  pub fn label(self) -> &'static str {
    match self {
      Page::Portfolio => "Portfolio",
      Page::Contact => "Kontakt",
    }
  }
}

/// Runs its closure when dropped, so cleanup happens on every exit path
/// including `?` returns and panics.
struct RestoreOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for RestoreOnDrop<F> {
  fn drop(&mut self) {
    (self.0)()
  }
}

/// Leave raw mode, mouse capture and the alternate screen. Errors are
/// ignored; there is nothing left to report them to.
fn restore_terminal() {
  let _ = stdout().execute(DisableMouseCapture);
  let _ = disable_raw_mode();
  let _ = stdout().execute(LeaveAlternateScreen);
}

/// Main application state
pub struct App {
  title: String,

  page: Page,

  portfolio: Portfolio,

  /// Index into the currently visible projects
  selected: usize,

  /// Project detail dialogs, drawn through the terminal surface
  modals: ModalController<Surface>,

  contact: ContactFormView,

  /// Where the open dialog was last drawn, for overlay hit testing
  dialog_area: Option<Rect>,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Self {
    let registry = site::modal_registry(&config.projects);
    if registry.is_empty() {
      warn!("no projects configured, portfolio is empty");
    }
    info!(
      projects = config.projects.len(),
      dialogs = registry.len(),
      "site loaded"
    );

    Self {
      title: config.title,
      page: Page::Portfolio,
      portfolio: Portfolio::new(config.projects, config.categories),
      selected: 0,
      modals: ModalController::new(registry, Surface::new()),
      contact: ContactFormView::new(config.contact.fields),
      dialog_area: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let _restore = RestoreOnDrop(restore_terminal);
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_loop(&mut terminal, &mut events).await?;

    info!("vitrine exiting");
    Ok(())
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Mouse(mouse) => self.handle_mouse(mouse),
      Event::Tick => {} // redraw picks up expiring notices
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // A focused dialog takes all keys
    if let Focus::Modal(modal) = self.modals.host().focus().clone() {
      self.handle_modal_key(&modal, key);
      return;
    }

    match self.page {
      Page::Portfolio => self.handle_portfolio_key(key),
      Page::Contact => self.handle_contact_key(key),
    }
  }

  fn handle_modal_key(&mut self, modal: &ModalId, key: KeyEvent) {
    let trigger = match key.code {
      KeyCode::Esc if self.modals.host().escape_listener().is_some() => Some(Trigger::Escape),
      KeyCode::Char('x') | KeyCode::Char('q') => Some(Trigger::Close(modal.clone())),
      KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.tab_trigger(modal, 1),
      KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => self.tab_trigger(modal, -1),
      KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
        let index = c as usize - '1' as usize;
        self
          .modals
          .registry()
          .get(modal)
          .and_then(|spec| spec.tabs().get(index).cloned())
          .map(|tab| Trigger::Tab {
            modal: modal.clone(),
            tab,
          })
      }
      _ => None,
    };

    if let Some(trigger) = trigger {
      if self.modals.handle(&trigger) == Outcome::Applied && self.modals.active_modal().is_none() {
        self.dialog_area = None;
      }
    }
  }

  fn tab_trigger(&self, modal: &ModalId, offset: isize) -> Option<Trigger> {
    self
      .modals
      .adjacent_tab(modal, offset)
      .map(|tab| Trigger::Tab {
        modal: modal.clone(),
        tab,
      })
  }

  fn handle_portfolio_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') => self.should_quit = true,
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
      KeyCode::Char(']') | KeyCode::PageDown => self.cycle_filter(1),
      KeyCode::Char('[') | KeyCode::PageUp => self.cycle_filter(-1),
      KeyCode::Char('c') => self.page = Page::Contact,
      KeyCode::Enter => self.open_selected(),
      _ => {}
    }
  }

  fn handle_contact_key(&mut self, key: KeyEvent) {
    match self.contact.handle_key(key) {
      KeyResult::Event(ContactEvent::Submitted(submission)) => {
        info!(fields = submission.values.len(), "contact message submitted");
        debug!(?submission, "contact submission");
      }
      KeyResult::Event(ContactEvent::Cancelled) => self.page = Page::Portfolio,
      KeyResult::Handled | KeyResult::NotHandled => {}
    }
  }

  fn handle_mouse(&mut self, mouse: MouseEvent) {
    match mouse.kind {
      MouseEventKind::Down(MouseButton::Left) => {
        if self.modals.active_modal().is_none() {
          return;
        }
        let inside = self
          .dialog_area
          .is_some_and(|area| contains(area, mouse.column, mouse.row));
        if !inside && self.modals.handle(&Trigger::Overlay) == Outcome::Applied {
          self.dialog_area = None;
        }
      }
      MouseEventKind::ScrollDown if self.page == Page::Portfolio => self.move_selection(1),
      MouseEventKind::ScrollUp if self.page == Page::Portfolio => self.move_selection(-1),
      _ => {}
    }
  }

  fn move_selection(&mut self, delta: i32) {
    if self.modals.host().is_scroll_locked() {
      return;
    }
    let len = self.portfolio.visible().len();
    if len > 0 {
      self.selected = (self.selected as i32 + delta).rem_euclid(len as i32) as usize;
    }
  }

  fn cycle_filter(&mut self, direction: i32) {
    self.portfolio.cycle_filter(direction);
    self.selected = 0;
  }

  fn open_selected(&mut self) {
    let Some(marker) = self.selected_project().map(Project::trigger_marker) else {
      return;
    };
    self.modals.dispatch(&marker);
  }

  // Accessors for UI rendering
  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn page(&self) -> Page {
    self.page
  }

  pub fn portfolio(&self) -> &Portfolio {
    &self.portfolio
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  pub fn selected_project(&self) -> Option<&Project> {
    self.portfolio.visible().get(self.selected).copied()
  }

  pub fn contact(&self) -> &ContactFormView {
    &self.contact
  }

  /// The project whose dialog the surface shows, with its active tab.
  pub fn open_dialog(&self) -> Option<(&Project, Option<&TabId>)> {
    let surface = self.modals.host();
    let project = self
      .portfolio
      .projects()
      .iter()
      .find(|p| surface.is_modal_active(&p.modal_id()))?;
    Some((project, self.modals.active_tab(&project.modal_id())))
  }

  pub fn overlay_active(&self) -> bool {
    self.modals.host().is_overlay_active()
  }

  pub fn set_dialog_area(&mut self, area: Option<Rect>) {
    self.dialog_area = area;
  }

  pub fn confirmation_visible(&self) -> bool {
    self.contact.form().confirmation_visible(Instant::now())
  }

  pub fn hints(&self) -> &'static str {
    if self.modals.active_modal().is_some() {
      return "Tab/←→:tab  1-9:jump  Esc/x:close  click outside:close";
    }
    match self.page {
      Page::Portfolio => "j/k:nav  Enter:details  [ ]:filter  c:contact  q:quit",
      Page::Contact => "Tab/↑↓:field  Enter:next  Ctrl-S:send  Esc:back",
    }
  }
}
