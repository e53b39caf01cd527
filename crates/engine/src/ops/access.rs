//! Ownership guard.
//!
//! Every user-scoped read or write goes through one of these lookups first.
//! A missing row is `KeyNotFound`; a row owned by someone else is `Forbidden`.
//! Transactions carry no user id: they are resolved through their account.

use sea_orm::{ConnectionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, Budget, EngineError, ResultEngine, Transaction, User, accounts, budgets,
    transactions, users,
};

use super::Engine;

fn ensure_owner(owner: Uuid, user_id: Uuid, what: &str) -> ResultEngine<()> {
    if owner != user_id {
        tracing::warn!(%user_id, what, "ownership check failed");
        return Err(EngineError::Forbidden(format!(
            "{what} does not belong to the current user"
        )));
    }
    Ok(())
}

impl Engine {
    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        User::try_from(model)
    }

    pub(super) async fn find_account<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
    ) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }

    pub(super) async fn require_account_owned<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Account> {
        let account = self.find_account(db, account_id).await?;
        ensure_owner(account.user_id, user_id, "account")?;
        Ok(account)
    }

    /// Resolves the transaction and checks the chain transaction → account → user.
    pub(super) async fn require_transaction_owned<C: ConnectionTrait>(
        &self,
        db: &C,
        transaction_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<(Transaction, Account)> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        let tx = Transaction::try_from(model)?;
        let account = self.find_account(db, tx.account_id).await?;
        ensure_owner(account.user_id, user_id, "transaction")?;
        Ok((tx, account))
    }

    pub(super) async fn require_budget_owned<C: ConnectionTrait>(
        &self,
        db: &C,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Budget> {
        let model = budgets::Entity::find_by_id(budget_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))?;
        let budget = Budget::try_from(model)?;
        ensure_owner(budget.user_id, user_id, "budget")?;
        Ok(budget)
    }
}
