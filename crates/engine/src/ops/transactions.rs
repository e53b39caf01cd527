//! Transaction reads. Writes live in [`write`].

use chrono::NaiveDate;
use sea_orm::{Condition, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    Account, AccountSnapshot, EngineError, ResultEngine, Transaction, TransactionWithAccount,
    accounts, transactions,
};

use super::Engine;

mod write;

fn with_account(tx: Transaction, account: &Account) -> TransactionWithAccount {
    TransactionWithAccount {
        transaction: tx,
        account: AccountSnapshot::from(account),
    }
}

impl Engine {
    /// Newest transaction date first, ties broken by creation time.
    async fn list_joined(&self, condition: Condition) -> ResultEngine<Vec<TransactionWithAccount>> {
        let rows = transactions::Entity::find()
            .find_also_related(accounts::Entity)
            .filter(condition)
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for (tx_model, account_model) in rows {
            let account_model = account_model
                .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
            let account = Account::try_from(account_model)?;
            out.push(with_account(Transaction::try_from(tx_model)?, &account));
        }
        Ok(out)
    }

    pub async fn transaction(
        &self,
        transaction_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<TransactionWithAccount> {
        let (tx, account) = self
            .require_transaction_owned(&self.database, transaction_id, user_id)
            .await?;
        Ok(with_account(tx, &account))
    }

    pub async fn list_transactions(
        &self,
        user_id: Uuid,
    ) -> ResultEngine<Vec<TransactionWithAccount>> {
        self.list_joined(Condition::all().add(accounts::Column::UserId.eq(user_id.to_string())))
            .await
    }

    pub async fn list_transactions_for_account(
        &self,
        account_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<TransactionWithAccount>> {
        self.require_account_owned(&self.database, account_id, user_id)
            .await?;
        self.list_joined(
            Condition::all().add(transactions::Column::AccountId.eq(account_id.to_string())),
        )
        .await
    }

    /// Inclusive on both ends.
    pub async fn list_transactions_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Vec<TransactionWithAccount>> {
        if start > end {
            return Err(EngineError::InvalidDate(format!(
                "start date {start} is after end date {end}"
            )));
        }
        self.list_joined(
            Condition::all()
                .add(accounts::Column::UserId.eq(user_id.to_string()))
                .add(transactions::Column::TransactionDate.between(start, end)),
        )
        .await
    }
}
