//! Transaction mutation engine.
//!
//! Create, update and delete are one rule: reverse the old effect (none on
//! create), then apply the new one (none on delete). Both steps run against
//! in-memory previews of the touched account and budget rows, so when old and
//! new share a row the two deltas land on the same value. Each preview is
//! written back once, inside the same DB transaction as the transaction row.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, AccountSnapshot, CreateTransactionCmd, EngineError, ResultEngine, Transaction,
    TransactionWithAccount, UpdateTransactionCmd, accounts,
    transactions::{self, ensure_positive},
    util::{normalize_optional_text, normalize_required_name},
};

use super::super::{Engine, budgets::BudgetPreviews, with_tx};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Apply,
    Reverse,
}

/// Rows touched by a single mutation.
#[derive(Default)]
struct Previews {
    accounts: HashMap<Uuid, Account>,
    budgets: BudgetPreviews,
}

impl Previews {
    fn track(&mut self, account: Account) {
        self.accounts.entry(account.id).or_insert(account);
    }

    fn snapshot(&self, account_id: Uuid) -> ResultEngine<AccountSnapshot> {
        self.accounts
            .get(&account_id)
            .map(AccountSnapshot::from)
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }
}

impl Engine {
    /// Applies or reverses `tx` on its account and, for expenses, on the
    /// matching budget. The account must already be tracked.
    async fn shift_effect(
        &self,
        db_tx: &DatabaseTransaction,
        previews: &mut Previews,
        user_id: Uuid,
        tx: &Transaction,
        direction: Direction,
    ) -> ResultEngine<()> {
        let account = previews
            .accounts
            .get_mut(&tx.account_id)
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        match direction {
            Direction::Apply => account.apply(tx.kind, tx.amount)?,
            Direction::Reverse => account.reverse(tx.kind, tx.amount)?,
        }

        if tx.kind.affects_budget() {
            let delta = match direction {
                Direction::Apply => tx.amount,
                Direction::Reverse => -tx.amount,
            };
            self.adjust_matching_budget(
                db_tx,
                &mut previews.budgets,
                user_id,
                &tx.category,
                tx.transaction_date,
                delta,
            )
            .await?;
        }
        Ok(())
    }

    async fn persist_accounts(
        &self,
        db_tx: &DatabaseTransaction,
        accounts: &HashMap<Uuid, Account>,
    ) -> ResultEngine<()> {
        let now = Utc::now();
        for account in accounts.values() {
            accounts::ActiveModel {
                id: ActiveValue::Unchanged(account.id.to_string()),
                balance_minor: ActiveValue::Set(account.balance.cents()),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .update(db_tx)
            .await?;
        }
        Ok(())
    }

    /// Creates a transaction and applies its effect.
    ///
    /// The date defaults to today (UTC) when omitted.
    pub async fn create_transaction(
        &self,
        cmd: CreateTransactionCmd,
    ) -> ResultEngine<TransactionWithAccount> {
        ensure_positive(cmd.amount)?;
        let category = normalize_required_name(&cmd.category, "category")?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let date = cmd
            .transaction_date
            .unwrap_or_else(|| Utc::now().date_naive());

        with_tx!(self, |db_tx| {
            let account = self
                .require_account_owned(&db_tx, cmd.account_id, cmd.user_id)
                .await?;
            let tx = Transaction::new(account.id, cmd.kind, cmd.amount, category, description, date)?;

            let mut previews = Previews::default();
            previews.track(account);
            self.shift_effect(&db_tx, &mut previews, cmd.user_id, &tx, Direction::Apply)
                .await?;

            self.persist_accounts(&db_tx, &previews.accounts).await?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            let snapshot = previews.snapshot(tx.account_id)?;
            self.persist_budgets(&db_tx, previews.budgets).await?;

            tracing::info!(
                transaction = %tx.id,
                account = %tx.account_id,
                kind = tx.kind.as_str(),
                amount = %tx.amount,
                "transaction created"
            );
            Ok(TransactionWithAccount {
                transaction: tx,
                account: snapshot,
            })
        })
    }

    /// Replaces a transaction's fields, moving its effect if account,
    /// category or date changed.
    pub async fn update_transaction(
        &self,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<TransactionWithAccount> {
        ensure_positive(cmd.amount)?;
        let category = normalize_required_name(&cmd.category, "category")?;
        let description = normalize_optional_text(cmd.description.as_deref());

        with_tx!(self, |db_tx| {
            let (old, old_account) = self
                .require_transaction_owned(&db_tx, cmd.transaction_id, cmd.user_id)
                .await?;

            let mut previews = Previews::default();
            previews.track(old_account);
            self.shift_effect(&db_tx, &mut previews, cmd.user_id, &old, Direction::Reverse)
                .await?;

            if cmd.account_id != old.account_id {
                let new_account = self
                    .require_account_owned(&db_tx, cmd.account_id, cmd.user_id)
                    .await?;
                previews.track(new_account);
            }

            let new = Transaction {
                account_id: cmd.account_id,
                kind: cmd.kind,
                amount: cmd.amount,
                category,
                description,
                transaction_date: cmd.transaction_date,
                ..old
            };
            self.shift_effect(&db_tx, &mut previews, cmd.user_id, &new, Direction::Apply)
                .await?;

            self.persist_accounts(&db_tx, &previews.accounts).await?;
            transactions::ActiveModel {
                id: ActiveValue::Unchanged(new.id.to_string()),
                account_id: ActiveValue::Set(new.account_id.to_string()),
                kind: ActiveValue::Set(new.kind.as_str().to_string()),
                amount_minor: ActiveValue::Set(new.amount.cents()),
                category: ActiveValue::Set(new.category.clone()),
                description: ActiveValue::Set(new.description.clone()),
                transaction_date: ActiveValue::Set(new.transaction_date),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            let snapshot = previews.snapshot(new.account_id)?;
            self.persist_budgets(&db_tx, previews.budgets).await?;

            tracing::info!(transaction = %new.id, account = %new.account_id, "transaction updated");
            Ok(TransactionWithAccount {
                transaction: new,
                account: snapshot,
            })
        })
    }

    /// Removes a transaction and reverses its effect.
    pub async fn delete_transaction(
        &self,
        transaction_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (tx, account) = self
                .require_transaction_owned(&db_tx, transaction_id, user_id)
                .await?;

            let mut previews = Previews::default();
            previews.track(account);
            self.shift_effect(&db_tx, &mut previews, user_id, &tx, Direction::Reverse)
                .await?;

            self.persist_accounts(&db_tx, &previews.accounts).await?;
            self.persist_budgets(&db_tx, previews.budgets).await?;
            transactions::Entity::delete_by_id(tx.id.to_string())
                .exec(&db_tx)
                .await?;

            tracing::info!(transaction = %tx.id, account = %tx.account_id, "transaction deleted");
            Ok(())
        })
    }
}
