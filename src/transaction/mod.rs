//! Transaction management for the bookkeeping application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing and querying transactions
//! - The JSON endpoint for recording a new transaction

mod core;
mod create_endpoint;

pub use core::{
    Category, Transaction, TransactionBuilder, TransactionType, create_transaction,
    create_transaction_table, get_transactions_by_user,
};
pub use create_endpoint::create_transaction_endpoint;

#[cfg(test)]
pub use core::{count_transactions, get_transaction};
