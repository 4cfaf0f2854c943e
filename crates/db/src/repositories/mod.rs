//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod budget;
pub mod transaction;
pub mod user;

pub use budget::{BudgetError, BudgetRepository, ReconcileSummary, UpsertMonthlyBudgetInput};
pub use transaction::{
    CreateTransactionInput, TransactionError, TransactionRepository, UpdateTransactionInput,
};
pub use user::UserRepository;
