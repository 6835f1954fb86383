pub mod chore;
pub mod loan_payment;
pub mod snapshot;

pub use chore::Chore;
pub use loan_payment::{LoanPayment, PaymentStatus};
pub use snapshot::BalanceSnapshot;
