//! Monthly category budgets.
//!
//! A budget caps spending for one category in one calendar month. `spent` is
//! a cached aggregate maintained incrementally by the mutation engine; it is
//! never recomputed on read.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

/// A calendar month, written `YYYY-MM` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BudgetMonth {
    year: i32,
    month: u32,
}

impl BudgetMonth {
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidMonth(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(EngineError::InvalidMonth(format!(
                "year out of range: {year}"
            )));
        }
        Ok(Self { year, month })
    }

    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[must_use]
    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.month
    }
}

impl fmt::Display for BudgetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BudgetMonth {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidMonth(format!("expected YYYY-MM, got \"{s}\""));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for BudgetMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BudgetMonth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub limit: MoneyCents,
    /// Never negative.
    pub spent: MoneyCents,
    pub period: BudgetMonth,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// `spent = max(0, spent + delta)`.
    pub fn adjust_spent(&mut self, delta: MoneyCents) -> ResultEngine<()> {
        let next = self.spent.try_add(delta)?.floor_zero();
        tracing::debug!(
            budget = %self.id,
            category = %self.category,
            period = %self.period,
            %delta,
            spent = %next,
            "budget adjust"
        );
        self.spent = next;
        Ok(())
    }

    #[must_use]
    pub fn remaining(&self) -> MoneyCents {
        self.limit - self.spent
    }
}

pub(crate) fn ensure_limit(limit: MoneyCents) -> ResultEngine<()> {
    if !limit.is_positive() {
        return Err(EngineError::InvalidAmount(
            "budget amount must be > 0".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub limit_minor: i64,
    pub spent_minor: i64,
    pub month: i32,
    pub year: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(budget: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(budget.id.to_string()),
            user_id: ActiveValue::Set(budget.user_id.to_string()),
            category: ActiveValue::Set(budget.category.clone()),
            limit_minor: ActiveValue::Set(budget.limit.cents()),
            spent_minor: ActiveValue::Set(budget.spent.cents()),
            month: ActiveValue::Set(budget.period.month() as i32),
            year: ActiveValue::Set(budget.period.year()),
            created_at: ActiveValue::Set(budget.created_at),
            updated_at: ActiveValue::Set(budget.updated_at),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let month = u32::try_from(model.month)
            .map_err(|_| EngineError::InvalidMonth(format!("stored month {}", model.month)))?;
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            category: model.category,
            limit: MoneyCents::new(model.limit_minor),
            spent: MoneyCents::new(model.spent_minor),
            period: BudgetMonth::new(model.year, month)?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(spent: i64) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category: "food".to_string(),
            limit: MoneyCents::new(20_000),
            spent: MoneyCents::new(spent),
            period: BudgetMonth::new(2024, 3).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn month_parses_and_pads() {
        let month: BudgetMonth = "2024-03".parse().unwrap();
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2024-03");
        assert_eq!(BudgetMonth::new(987, 11).unwrap().to_string(), "0987-11");
    }

    #[test]
    fn month_rejects_malformed_input() {
        for raw in ["2024-13", "2024-00", "2024-3", "24-03", "2024/03", "march", "2024-0a", ""] {
            assert!(
                matches!(raw.parse::<BudgetMonth>(), Err(EngineError::InvalidMonth(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn month_from_date() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(BudgetMonth::from_date(date).to_string(), "2024-12");
    }

    #[test]
    fn spent_is_floored_at_zero() {
        let mut b = budget(1_000);
        b.adjust_spent(MoneyCents::new(-2_500)).unwrap();
        assert_eq!(b.spent, MoneyCents::ZERO);
        b.adjust_spent(MoneyCents::new(700)).unwrap();
        assert_eq!(b.spent, MoneyCents::new(700));
        assert_eq!(b.remaining(), MoneyCents::new(19_300));
    }

    #[test]
    fn limit_must_be_positive() {
        assert!(ensure_limit(MoneyCents::new(1)).is_ok());
        assert!(matches!(
            ensure_limit(MoneyCents::ZERO),
            Err(EngineError::InvalidAmount(_))
        ));
    }
}
