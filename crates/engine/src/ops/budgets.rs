//! Budget tracker: matching, spent adjustment and plain CRUD.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Budget, BudgetCmd, BudgetMonth, EngineError, MoneyCents, ResultEngine,
    budgets::{self, ensure_limit},
    util::normalize_required_name,
};

use super::{Engine, with_tx};

/// Budgets loaded during one mutation, keyed by id.
pub(super) type BudgetPreviews = HashMap<Uuid, Budget>;

fn by_key(user_id: Uuid, category: &str, period: BudgetMonth) -> sea_orm::Condition {
    sea_orm::Condition::all()
        .add(budgets::Column::UserId.eq(user_id.to_string()))
        .add(budgets::Column::Category.eq(category.to_string()))
        .add(budgets::Column::Month.eq(period.month() as i32))
        .add(budgets::Column::Year.eq(period.year()))
}

impl Engine {
    /// The budget for (user, category, month-of(date), year-of(date)), if any.
    pub(super) async fn find_matching_budget<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category: &str,
        date: NaiveDate,
    ) -> ResultEngine<Option<Budget>> {
        budgets::Entity::find()
            .filter(by_key(user_id, category, BudgetMonth::from_date(date)))
            .one(db)
            .await?
            .map(Budget::try_from)
            .transpose()
    }

    /// Applies `delta` to the matching budget's preview. No matching budget is
    /// not an error: the adjustment is skipped.
    pub(super) async fn adjust_matching_budget(
        &self,
        db_tx: &DatabaseTransaction,
        previews: &mut BudgetPreviews,
        user_id: Uuid,
        category: &str,
        date: NaiveDate,
        delta: MoneyCents,
    ) -> ResultEngine<()> {
        let Some(found) = self
            .find_matching_budget(db_tx, user_id, category, date)
            .await?
        else {
            tracing::debug!(%user_id, category, %date, "no budget for expense, skipping");
            return Ok(());
        };
        previews
            .entry(found.id)
            .or_insert(found)
            .adjust_spent(delta)
    }

    pub(super) async fn persist_budgets(
        &self,
        db_tx: &DatabaseTransaction,
        previews: BudgetPreviews,
    ) -> ResultEngine<()> {
        let now = Utc::now();
        for (id, budget) in previews {
            budgets::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                spent_minor: ActiveValue::Set(budget.spent.cents()),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .update(db_tx)
            .await?;
        }
        Ok(())
    }

    async fn ensure_budget_key_free(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: Uuid,
        category: &str,
        period: BudgetMonth,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = budgets::Entity::find().filter(by_key(user_id, category, period));
        if let Some(id) = except {
            query = query.filter(budgets::Column::Id.ne(id.to_string()));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::ExistingKey(format!(
                "budget for {category} in {period}"
            )));
        }
        Ok(())
    }

    /// Creates a budget with `spent = 0`. Existing transactions of the period
    /// are not counted.
    pub async fn create_budget(&self, cmd: BudgetCmd) -> ResultEngine<Budget> {
        let category = normalize_required_name(&cmd.category, "category")?;
        ensure_limit(cmd.limit)?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, cmd.user_id).await?;
            self.ensure_budget_key_free(&db_tx, cmd.user_id, &category, cmd.period, None)
                .await?;

            let now = Utc::now();
            let budget = Budget {
                id: Uuid::new_v4(),
                user_id: cmd.user_id,
                category,
                limit: cmd.limit,
                spent: MoneyCents::ZERO,
                period: cmd.period,
                created_at: now,
                updated_at: now,
            };
            budgets::ActiveModel::from(&budget).insert(&db_tx).await?;
            tracing::info!(budget = %budget.id, category = %budget.category, period = %budget.period, "budget created");
            Ok(budget)
        })
    }

    /// Changes category, limit and month. `spent` is left untouched.
    pub async fn update_budget(&self, budget_id: Uuid, cmd: BudgetCmd) -> ResultEngine<Budget> {
        let category = normalize_required_name(&cmd.category, "category")?;
        ensure_limit(cmd.limit)?;

        with_tx!(self, |db_tx| {
            let mut budget = self
                .require_budget_owned(&db_tx, budget_id, cmd.user_id)
                .await?;
            self.ensure_budget_key_free(
                &db_tx,
                cmd.user_id,
                &category,
                cmd.period,
                Some(budget_id),
            )
            .await?;

            budget.category = category;
            budget.limit = cmd.limit;
            budget.period = cmd.period;
            budget.updated_at = Utc::now();
            budgets::ActiveModel {
                id: ActiveValue::Unchanged(budget.id.to_string()),
                category: ActiveValue::Set(budget.category.clone()),
                limit_minor: ActiveValue::Set(budget.limit.cents()),
                month: ActiveValue::Set(budget.period.month() as i32),
                year: ActiveValue::Set(budget.period.year()),
                updated_at: ActiveValue::Set(budget.updated_at),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(budget)
        })
    }

    pub async fn delete_budget(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let budget = self.require_budget_owned(&db_tx, budget_id, user_id).await?;
            budgets::Entity::delete_by_id(budget.id.to_string())
                .exec(&db_tx)
                .await?;
            tracing::info!(budget = %budget.id, "budget deleted");
            Ok(())
        })
    }

    pub async fn budget(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<Budget> {
        self.require_budget_owned(&self.database, budget_id, user_id)
            .await
    }

    /// All budgets of the user, most recent period first.
    pub async fn list_budgets(&self, user_id: Uuid) -> ResultEngine<Vec<Budget>> {
        budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(budgets::Column::Year)
            .order_by_desc(budgets::Column::Month)
            .order_by_asc(budgets::Column::Category)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Budget::try_from)
            .collect()
    }

    pub async fn list_budgets_for_month(
        &self,
        user_id: Uuid,
        period: BudgetMonth,
    ) -> ResultEngine<Vec<Budget>> {
        budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .filter(budgets::Column::Month.eq(period.month() as i32))
            .filter(budgets::Column::Year.eq(period.year()))
            .order_by_asc(budgets::Column::Category)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Budget::try_from)
            .collect()
    }

    pub async fn current_month_budgets(&self, user_id: Uuid) -> ResultEngine<Vec<Budget>> {
        self.list_budgets_for_month(user_id, BudgetMonth::current())
            .await
    }
}
