//! Report error types.

use thiserror::Error;

/// Report generation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// No transactions fall inside the requested range.
    #[error("no transactions in the requested date range")]
    NoTransactions,
}
