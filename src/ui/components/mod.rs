mod contact_form;
mod filter_bar;
mod input;
mod key_result;
mod modal_dialog;
mod project_list;

pub use contact_form::{ContactEvent, ContactFormView};
pub use filter_bar::draw_filter_bar;
pub use key_result::KeyResult;
pub use modal_dialog::draw_modal_dialog;
pub use project_list::draw_project_list;
