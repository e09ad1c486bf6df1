//! Modal dialogs: a stack service living in context plus the overlay frame.

mod frame;
mod stack;

pub use frame::ModalFrame;
pub use stack::{CloseGuard, ModalHandle, ModalHost, ModalStackService};
