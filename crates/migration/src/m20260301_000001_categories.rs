//! Category reference table, seeded with the default set.

use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    Kind,
    Icon,
    Color,
}

const DEFAULTS: &[(&str, &str, &str, &str)] = &[
    ("Food", "EXPENSE", "utensils", "#ef4444"),
    ("Transport", "EXPENSE", "car", "#f97316"),
    ("Shopping", "EXPENSE", "bag", "#eab308"),
    ("Bills", "EXPENSE", "receipt", "#84cc16"),
    ("Entertainment", "EXPENSE", "film", "#06b6d4"),
    ("Healthcare", "EXPENSE", "heart", "#3b82f6"),
    ("Education", "EXPENSE", "book", "#8b5cf6"),
    ("Other", "EXPENSE", "dots", "#6b7280"),
    ("Salary", "INCOME", "briefcase", "#10b981"),
    ("Freelance", "INCOME", "laptop", "#14b8a6"),
    ("Investment", "INCOME", "chart", "#22c55e"),
    ("Gift", "INCOME", "gift", "#ec4899"),
    ("Refund", "INCOME", "undo", "#a855f7"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Categories::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Categories::Kind).string().not_null())
                    .col(ColumnDef::new(Categories::Icon).string())
                    .col(ColumnDef::new(Categories::Color).string())
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(Categories::Table).columns([
            Categories::Id,
            Categories::Name,
            Categories::Kind,
            Categories::Icon,
            Categories::Color,
        ]);
        for (name, kind, icon, color) in DEFAULTS {
            seed.values([
                Uuid::new_v4().to_string().into(),
                (*name).into(),
                (*kind).into(),
                (*icon).into(),
                (*color).into(),
            ])
            .map_err(|err| DbErr::Migration(err.to_string()))?;
        }
        manager.exec_stmt(seed).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}
