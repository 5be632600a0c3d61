//! Transaction management: lifecycle, mutual exclusion, commit and abort.

mod manager;
mod state;

pub use manager::{TransactionGuard, TransactionManager};
pub use state::{Transaction, TransactionMode, TransactionState};
