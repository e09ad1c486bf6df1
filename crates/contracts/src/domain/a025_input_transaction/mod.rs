pub mod aggregate;
pub mod commission;
pub mod reference;

pub use aggregate::{InputTransaction, InputTransactionDto, InputTransactionError, InputTransactionId};
pub use commission::{CommissionBreakdown, CommissionInput, CommissionMode};
pub use reference::{AdditionalFee, EvidenceFile, PaymentDestination, ServiceRef};
