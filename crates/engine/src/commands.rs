//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Every command carries the
//! acting user explicitly; the engine never looks identity up on its own.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{AccountKind, BudgetMonth, CategoryKind, Currency, MoneyCents, TransactionKind, UserRole};

/// Register a new user.
#[derive(Clone, Debug)]
pub struct RegisterUserCmd {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: UserRole,
}

impl RegisterUserCmd {
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password: password.into(),
            role: UserRole::User,
        }
    }

    #[must_use]
    pub fn role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }
}

/// Create an account.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub user_id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub balance: MoneyCents,
    pub currency: Currency,
}

impl NewAccountCmd {
    #[must_use]
    pub fn new(user_id: Uuid, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            user_id,
            name: name.into(),
            kind,
            balance: MoneyCents::ZERO,
            currency: Currency::default(),
        }
    }

    /// Opening balance. May be negative (credit cards).
    #[must_use]
    pub fn balance(mut self, balance: MoneyCents) -> Self {
        self.balance = balance;
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

/// Patch an account's descriptive fields. The balance is ledger-owned.
#[derive(Clone, Debug)]
pub struct UpdateAccountCmd {
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub currency: Option<Currency>,
}

impl UpdateAccountCmd {
    #[must_use]
    pub fn new(account_id: Uuid, user_id: Uuid) -> Self {
        Self {
            account_id,
            user_id,
            name: None,
            kind: None,
            currency: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: AccountKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }
}

/// Create a transaction. `transaction_date` defaults to today.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub category: String,
    pub description: Option<String>,
    pub transaction_date: Option<NaiveDate>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        account_id: Uuid,
        kind: TransactionKind,
        amount: MoneyCents,
        category: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            account_id,
            kind,
            amount,
            category: category.into(),
            description: None,
            transaction_date: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.transaction_date = Some(date);
        self
    }
}

/// Replace every mutable field of a transaction.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub category: String,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(
        transaction_id: Uuid,
        user_id: Uuid,
        account_id: Uuid,
        kind: TransactionKind,
        amount: MoneyCents,
        category: impl Into<String>,
        transaction_date: NaiveDate,
    ) -> Self {
        Self {
            transaction_id,
            user_id,
            account_id,
            kind,
            amount,
            category: category.into(),
            description: None,
            transaction_date,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create or replace a budget.
#[derive(Clone, Debug)]
pub struct BudgetCmd {
    pub user_id: Uuid,
    pub category: String,
    pub limit: MoneyCents,
    pub period: BudgetMonth,
}

impl BudgetCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        category: impl Into<String>,
        limit: MoneyCents,
        period: BudgetMonth,
    ) -> Self {
        Self {
            user_id,
            category: category.into(),
            limit,
            period,
        }
    }
}

/// Add a reference category.
#[derive(Clone, Debug)]
pub struct NewCategoryCmd {
    pub name: String,
    pub kind: CategoryKind,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl NewCategoryCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            icon: None,
            color: None,
        }
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}
