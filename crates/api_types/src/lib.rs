//! Request and response bodies of the HTTP API.
//!
//! Money travels as integer minor units (`*_minor`), dates as `YYYY-MM-DD`
//! and budget months as `YYYY-MM`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Eur,
    Usd,
    Gbp,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub email: String,
        pub name: String,
        pub password: String,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum Role {
        User,
        Admin,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserProfile {
        pub id: Uuid,
        pub email: String,
        pub name: String,
        pub role: Role,
        pub active: bool,
        pub created_at: DateTime<Utc>,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum AccountType {
        Savings,
        Checking,
        CreditCard,
        Cash,
        Investment,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: AccountType,
        /// Opening balance; defaults to zero.
        #[serde(default)]
        pub balance_minor: Option<i64>,
        #[serde(default)]
        pub currency: Option<Currency>,
    }

    /// Partial update. The balance is not editable.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default, rename = "type")]
        pub kind: Option<AccountType>,
        #[serde(default)]
        pub currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: AccountType,
        pub balance_minor: i64,
        pub currency: Currency,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TotalBalance {
        pub total_minor: i64,
    }
}

pub mod transaction {
    use super::*;
    use crate::account::AccountType;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum TransactionType {
        Income,
        Expense,
        Transfer,
    }

    /// Create or update body. On update `transaction_date` is required.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionRequest {
        pub account_id: Uuid,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub amount_minor: i64,
        pub category: String,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub transaction_date: Option<NaiveDate>,
    }

    /// Account as it stood when the response was built.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountSummary {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: AccountType,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub amount_minor: i64,
        pub category: String,
        pub description: Option<String>,
        pub transaction_date: NaiveDate,
        pub created_at: DateTime<Utc>,
        pub account: AccountSummary,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DateRange {
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetRequest {
        pub category: String,
        /// The limit.
        pub amount_minor: i64,
        /// `YYYY-MM`.
        pub month: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub category: String,
        pub limit_minor: i64,
        pub spent_minor: i64,
        pub remaining_minor: i64,
        pub month: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum CategoryType {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: CategoryType,
        #[serde(default)]
        pub icon: Option<String>,
        #[serde(default)]
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: CategoryType,
        pub icon: Option<String>,
        pub color: Option<String>,
    }
}
