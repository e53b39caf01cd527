use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, EngineError, NewCategoryCmd, ResultEngine, categories,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .order_by_asc(categories::Column::Kind)
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    pub async fn create_category(&self, cmd: NewCategoryCmd) -> ResultEngine<Category> {
        let name = normalize_required_name(&cmd.name, "category name")?;
        let category = Category {
            id: Uuid::new_v4(),
            name,
            kind: cmd.kind,
            icon: normalize_optional_text(cmd.icon.as_deref()),
            color: normalize_optional_text(cmd.color.as_deref()),
        };

        with_tx!(self, |db_tx| {
            let taken = categories::Entity::find()
                .filter(categories::Column::Name.eq(category.name.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(category.name));
            }
            categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;
            tracing::info!(category = %category.name, kind = category.kind.as_str(), "category created");
            Ok(category)
        })
    }
}
