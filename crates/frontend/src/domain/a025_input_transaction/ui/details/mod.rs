//! Input transaction details dialog
//!
//! MVVM split:
//! - model.rs: API functions and the string-backed form DTO
//! - view_model.rs: signals, commands, derived commission values
//! - view.rs: Leptos component (pure UI)

pub mod model;
mod view;
mod view_model;

pub use view::InputTransactionDetails;
pub use view_model::InputTransactionDetailsVm;
