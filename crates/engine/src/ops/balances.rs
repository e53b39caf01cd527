//! Read-only consistency audit.
//!
//! Recomputes the cached `balance` and `spent` values from the stored
//! transactions and reports them next to the cached ones. Nothing is written
//! back.

use chrono::NaiveDate;
use sea_orm::{JoinType, QueryFilter, QuerySelect, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, Transaction, TransactionKind, accounts, transactions,
};

use super::Engine;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountAudit {
    pub account_id: Uuid,
    pub stored_balance: MoneyCents,
    /// Signed sum of the account's transactions.
    pub transactions_effect: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BudgetAudit {
    pub budget_id: Uuid,
    pub stored_spent: MoneyCents,
    /// `max(0, Σ expenses matching the budget key)`.
    pub recomputed_spent: MoneyCents,
}

impl BudgetAudit {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.stored_spent == self.recomputed_spent
    }
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next.pred_opt()?))
}

impl Engine {
    pub async fn audit_account(
        &self,
        account_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<AccountAudit> {
        let account = self
            .require_account_owned(&self.database, account_id, user_id)
            .await?;
        let effects = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account.id.to_string()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<Vec<_>>>()?
            .iter()
            .map(|tx| tx.kind.balance_effect(tx.amount))
            .collect::<Vec<_>>();
        let effect = MoneyCents::try_sum(effects)?;
        Ok(AccountAudit {
            account_id: account.id,
            stored_balance: account.balance,
            transactions_effect: effect,
        })
    }

    pub async fn audit_budget(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<BudgetAudit> {
        let budget = self
            .require_budget_owned(&self.database, budget_id, user_id)
            .await?;
        let Some((start, end)) = month_bounds(budget.period.year(), budget.period.month()) else {
            return Err(EngineError::InvalidMonth(budget.period.to_string()));
        };

        let amounts = transactions::Entity::find()
            .join(JoinType::InnerJoin, transactions::Relation::Accounts.def())
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .filter(transactions::Column::Kind.eq(TransactionKind::Expense.as_str()))
            .filter(transactions::Column::Category.eq(budget.category.clone()))
            .filter(transactions::Column::TransactionDate.between(start, end))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| MoneyCents::new(model.amount_minor));
        let total = MoneyCents::try_sum(amounts)?;

        Ok(BudgetAudit {
            budget_id: budget.id,
            stored_spent: budget.spent,
            recomputed_spent: total.floor_zero(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_cover_the_whole_month() {
        let (start, end) = month_bounds(2024, 2).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let (_, end) = month_bounds(2023, 12).unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }
}
