//! Transaction primitives.
//!
//! A `Transaction` is a single money movement against one account. The
//! amount is always strictly positive; the direction comes from the kind.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccountSnapshot, EngineError, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Expense,
    /// Accepted and stored, but has no balance or budget effect.
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
        }
    }

    /// Signed change a transaction of this kind imposes on its account.
    #[must_use]
    pub fn balance_effect(self, amount: MoneyCents) -> MoneyCents {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
            Self::Transfer => MoneyCents::ZERO,
        }
    }

    /// Only expenses count towards a budget.
    #[must_use]
    pub fn affects_budget(self) -> bool {
        matches!(self, Self::Expense)
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            "TRANSFER" => Ok(Self::Transfer),
            other => Err(EngineError::InvalidKind(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub category: String,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        kind: TransactionKind,
        amount: MoneyCents,
        category: String,
        description: Option<String>,
        transaction_date: NaiveDate,
    ) -> ResultEngine<Self> {
        ensure_positive(amount)?;
        Ok(Self {
            id: Uuid::new_v4(),
            account_id,
            kind,
            amount,
            category,
            description,
            transaction_date,
            created_at: Utc::now(),
        })
    }
}

pub(crate) fn ensure_positive(amount: MoneyCents) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
    }
    Ok(())
}

/// A transaction together with the account it belongs to, as of read time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWithAccount {
    pub transaction: Transaction,
    pub account: AccountSnapshot,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub category: String,
    pub description: Option<String>,
    pub transaction_date: Date,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            category: ActiveValue::Set(tx.category.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            transaction_date: ActiveValue::Set(tx.transaction_date),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            category: model.category,
            description: model.description,
            transaction_date: model.transaction_date,
            created_at: model.created_at,
        })
    }
}
