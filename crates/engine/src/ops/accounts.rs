use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, MoneyCents, NewAccountCmd, ResultEngine, Transaction, UpdateAccountCmd, accounts,
    transactions, util::normalize_required_name,
};

use super::{Engine, budgets::BudgetPreviews, with_tx};

impl Engine {
    pub async fn create_account(&self, cmd: NewAccountCmd) -> ResultEngine<Account> {
        let name = normalize_required_name(&cmd.name, "account name")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, cmd.user_id).await?;
            let now = Utc::now();
            let account = Account {
                id: Uuid::new_v4(),
                user_id: cmd.user_id,
                name,
                kind: cmd.kind,
                balance: cmd.balance,
                currency: cmd.currency,
                created_at: now,
                updated_at: now,
            };
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            tracing::info!(account = %account.id, user = %account.user_id, "account created");
            Ok(account)
        })
    }

    pub async fn account(&self, account_id: Uuid, user_id: Uuid) -> ResultEngine<Account> {
        self.require_account_owned(&self.database, account_id, user_id)
            .await
    }

    pub async fn list_accounts(&self, user_id: Uuid) -> ResultEngine<Vec<Account>> {
        accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(accounts::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    /// Sum of every balance the user holds. Currencies are not converted.
    pub async fn total_balance(&self, user_id: Uuid) -> ResultEngine<MoneyCents> {
        let accounts = self.list_accounts(user_id).await?;
        MoneyCents::try_sum(accounts.iter().map(|a| a.balance))
    }

    /// Renames an account or changes its kind or currency.
    pub async fn update_account(&self, cmd: UpdateAccountCmd) -> ResultEngine<Account> {
        let name = cmd
            .name
            .as_deref()
            .map(|n| normalize_required_name(n, "account name"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let mut account = self
                .require_account_owned(&db_tx, cmd.account_id, cmd.user_id)
                .await?;
            if let Some(name) = name {
                account.name = name;
            }
            if let Some(kind) = cmd.kind {
                account.kind = kind;
            }
            if let Some(currency) = cmd.currency {
                account.currency = currency;
            }
            account.updated_at = Utc::now();
            accounts::ActiveModel {
                id: ActiveValue::Unchanged(account.id.to_string()),
                name: ActiveValue::Set(account.name.clone()),
                kind: ActiveValue::Set(account.kind.as_str().to_string()),
                currency: ActiveValue::Set(account.currency.code().to_string()),
                updated_at: ActiveValue::Set(account.updated_at),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(account)
        })
    }

    /// Deletes an account together with its transactions.
    ///
    /// Every removed expense is taken back out of its budget first, so budget
    /// totals keep matching the stored transactions.
    pub async fn delete_account(&self, account_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let account = self
                .require_account_owned(&db_tx, account_id, user_id)
                .await?;
            let owned: Vec<Transaction> = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account.id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<_>>()?;

            let mut budget_previews = BudgetPreviews::new();
            for tx in owned.iter().filter(|tx| tx.kind.affects_budget()) {
                self.adjust_matching_budget(
                    &db_tx,
                    &mut budget_previews,
                    user_id,
                    &tx.category,
                    tx.transaction_date,
                    -tx.amount,
                )
                .await?;
            }
            self.persist_budgets(&db_tx, budget_previews).await?;

            transactions::Entity::delete_many()
                .filter(transactions::Column::AccountId.eq(account.id.to_string()))
                .exec(&db_tx)
                .await?;
            accounts::Entity::delete_by_id(account.id.to_string())
                .exec(&db_tx)
                .await?;
            tracing::info!(account = %account.id, removed = owned.len(), "account deleted");
            Ok(())
        })
    }
}
