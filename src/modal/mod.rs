//! Modal dialogs with tabbed content.
//!
//! - At most one modal is open at a time; opening another closes the first
//! - Each modal remembers its active tab while closed
//! - Unknown modals and tabs are ignored, never errors

mod controller;
mod host;
mod registry;

pub use controller::{ModalController, Outcome, Trigger};
pub use host::{Focus, Surface};
pub use registry::{ModalId, ModalRegistry, ModalSpec, TabId};
