//! Users and their credentials.
//!
//! A user is the root of every ownership chain: accounts and budgets point at
//! `users.id`, transactions reach it through their account.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl TryFrom<&str> for UserRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            other => Err(EngineError::InvalidName(format!("invalid role: {other}"))),
        }
    }
}

/// A registered user. The credential hash never leaves the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            email: model.email,
            name: model.name,
            role: UserRole::try_from(model.role.as_str())?,
            active: model.active,
            created_at: model.created_at,
        })
    }
}

/// SHA-256 rounds applied on top of the salted digest.
const HASH_ROUNDS: u32 = 10_000;

/// Hashes a password as `"<rounds>$<salt_b64>$<digest_b64>"`.
///
/// The digest is salted SHA-256 stretched over [`HASH_ROUNDS`] rounds. This is
/// bootstrap-grade key stretching, not a memory-hard password KDF. The round
/// count is stored with each hash so it can be raised without breaking old rows.
pub(crate) fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4();
    let digest = stretched_digest(salt.as_bytes(), password, HASH_ROUNDS);
    format!(
        "{HASH_ROUNDS}${}${}",
        STANDARD.encode(salt.as_bytes()),
        STANDARD.encode(digest)
    )
}

/// Checks `password` against a hash produced by [`hash_password`].
pub(crate) fn verify_password(password: &str, stored: &str) -> ResultEngine<bool> {
    let malformed = || EngineError::InvalidCredentials("malformed credential hash".to_string());
    let mut parts = stored.splitn(3, '$');
    let (Some(rounds), Some(salt_b64), Some(digest_b64)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };
    let rounds: u32 = rounds.parse().map_err(|_| malformed())?;
    if rounds == 0 {
        return Err(malformed());
    }
    let salt = STANDARD.decode(salt_b64).map_err(|_| malformed())?;
    let expected = STANDARD.decode(digest_b64).map_err(|_| malformed())?;
    let actual = stretched_digest(&salt, password, rounds);

    if expected.len() != actual.len() {
        return Ok(false);
    }
    let diff = expected
        .iter()
        .zip(actual.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));
    Ok(diff == 0)
}

fn stretched_digest(salt: &[u8], password: &str, rounds: u32) -> Vec<u8> {
    let mut digest = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..rounds {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(salt)
            .finalize();
    }
    digest.to_vec()
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
    #[sea_orm(has_many = "super::budgets::Entity")]
    Budgets,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn new_active_model(
    email: String,
    name: String,
    password: &str,
    role: UserRole,
) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        email: ActiveValue::Set(email),
        name: ActiveValue::Set(name),
        password_hash: ActiveValue::Set(hash_password(password)),
        role: ActiveValue::Set(role.as_str().to_string()),
        active: ActiveValue::Set(true),
        created_at: ActiveValue::Set(Utc::now()),
    }
}
