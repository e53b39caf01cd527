use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod accounts;
mod balances;
mod budgets;
mod categories;
mod transactions;
mod users;

pub use balances::{AccountAudit, BudgetAudit};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The body must only talk to storage through the bound transaction.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Underlying connection, for callers that run their own migrations.
    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
