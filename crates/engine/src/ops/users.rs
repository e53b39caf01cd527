use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, RegisterUserCmd, ResultEngine, User,
    users::{self, new_active_model, verify_password},
    util::normalize_required_name,
};

use super::{Engine, with_tx};

fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(EngineError::InvalidName(format!("invalid email: {value}"))),
    }
}

impl Engine {
    /// Registers a user. Emails are unique, case-insensitively.
    pub async fn register_user(&self, cmd: RegisterUserCmd) -> ResultEngine<User> {
        let email = normalize_email(&cmd.email)?;
        let name = normalize_required_name(&cmd.name, "user name")?;
        if cmd.password.is_empty() {
            return Err(EngineError::InvalidName(
                "password must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(email));
            }
            let model = new_active_model(email, name, &cmd.password, cmd.role)
                .insert(&db_tx)
                .await?;
            let user = User::try_from(model)?;
            tracing::info!(user = %user.id, email = %user.email, "user registered");
            Ok(user)
        })
    }

    /// Checks credentials. Unknown email, wrong password and inactive users
    /// all fail the same way.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let denied = || EngineError::InvalidCredentials("bad email or password".to_string());
        let email = email.trim().to_lowercase();
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(denied)?;
        if !model.active || !verify_password(password, &model.password_hash)? {
            return Err(denied());
        }
        User::try_from(model)
    }

    /// Looks a user up by email, for operator tooling.
    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {email}")))?;
        User::try_from(model)
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        self.require_user(&self.database, user_id).await
    }
}
