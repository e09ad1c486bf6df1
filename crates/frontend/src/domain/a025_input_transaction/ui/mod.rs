pub mod details;
pub mod list;

pub use details::InputTransactionDetails;
pub use list::InputTransactionList;
