//! Personal finance engine.
//!
//! Keeps account balances, transaction history and monthly budget totals
//! mutually consistent. Every public operation is an `async` method on
//! [`Engine`] and takes the acting user explicitly.

pub use accounts::{Account, AccountKind, AccountSnapshot};
pub use budgets::{Budget, BudgetMonth};
pub use categories::{Category, CategoryKind};
pub use commands::{
    BudgetCmd, CreateTransactionCmd, NewAccountCmd, NewCategoryCmd, RegisterUserCmd,
    UpdateAccountCmd, UpdateTransactionCmd,
};
pub use currency::Currency;
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{AccountAudit, BudgetAudit, Engine, EngineBuilder};
pub use transactions::{Transaction, TransactionKind, TransactionWithAccount};
pub use users::{User, UserRole};

mod accounts;
mod budgets;
mod categories;
mod commands;
mod currency;
mod error;
mod money;
mod ops;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
