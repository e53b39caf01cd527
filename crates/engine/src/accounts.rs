//! The module contains `Account` and the account ledger.
//!
//! An account is a named store of money (bank account, card, cash). Its
//! balance is derived state: initial balance plus the effect of every stored
//! transaction. The ledger methods here are the only place that effect is
//! computed.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineError, MoneyCents, ResultEngine, TransactionKind,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    Savings,
    Checking,
    CreditCard,
    Cash,
    Investment,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "SAVINGS",
            Self::Checking => "CHECKING",
            Self::CreditCard => "CREDIT_CARD",
            Self::Cash => "CASH",
            Self::Investment => "INVESTMENT",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SAVINGS" => Ok(Self::Savings),
            "CHECKING" => Ok(Self::Checking),
            "CREDIT_CARD" => Ok(Self::CreditCard),
            "CASH" => Ok(Self::Cash),
            "INVESTMENT" => Ok(Self::Investment),
            other => Err(EngineError::InvalidKind(format!(
                "invalid account type: {other}"
            ))),
        }
    }
}

/// An account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    /// No floor or ceiling: credit cards and overdrafts go negative.
    pub balance: MoneyCents,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Applies the effect of a transaction of `kind` and `amount`.
    ///
    /// Income adds, expense subtracts, transfer has no balance effect.
    /// The balance is left untouched when the result would overflow.
    pub fn apply(&mut self, kind: TransactionKind, amount: MoneyCents) -> ResultEngine<()> {
        let effect = kind.balance_effect(amount);
        tracing::debug!(account = %self.id, kind = kind.as_str(), %effect, "ledger apply");
        self.balance = self.balance.try_add(effect)?;
        Ok(())
    }

    /// Undoes a previous [`Account::apply`] with the same arguments.
    pub fn reverse(&mut self, kind: TransactionKind, amount: MoneyCents) -> ResultEngine<()> {
        let effect = kind.balance_effect(amount);
        tracing::debug!(account = %self.id, kind = kind.as_str(), %effect, "ledger reverse");
        self.balance = self.balance.try_sub(effect)?;
        Ok(())
    }
}

/// Denormalized view of an account embedded in transaction responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub balance: MoneyCents,
}

impl From<&Account> for AccountSnapshot {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            kind: account.kind,
            balance: account.balance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: String,
    pub balance_minor: i64,
    pub currency: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            user_id: ActiveValue::Set(account.user_id.to_string()),
            name: ActiveValue::Set(account.name.clone()),
            kind: ActiveValue::Set(account.kind.as_str().to_string()),
            balance_minor: ActiveValue::Set(account.balance.cents()),
            currency: ActiveValue::Set(account.currency.code().to_string()),
            created_at: ActiveValue::Set(account.created_at),
            updated_at: ActiveValue::Set(account.updated_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            name: model.name,
            kind: AccountKind::try_from(model.kind.as_str())?,
            balance: MoneyCents::new(model.balance_minor),
            currency: model_currency(&model.currency)?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
