//! Account endpoints

use api_types::account::{AccountNew, AccountUpdate, AccountView, TotalBalance};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{MoneyCents, NewAccountCmd, UpdateAccountCmd, User};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{account_kind_from_api, account_view, currency_from_api},
    server::ServerState,
};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state.engine.list_accounts(user.id).await?;
    Ok(Json(accounts.iter().map(account_view).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let mut cmd = NewAccountCmd::new(user.id, payload.name, account_kind_from_api(payload.kind))
        .balance(MoneyCents::new(payload.balance_minor.unwrap_or(0)));
    if let Some(currency) = payload.currency {
        cmd = cmd.currency(currency_from_api(currency));
    }
    let account = state.engine.create_account(cmd).await?;
    Ok((StatusCode::CREATED, Json(account_view(&account))))
}

pub async fn total_balance(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<TotalBalance>, ServerError> {
    let total = state.engine.total_balance(user.id).await?;
    Ok(Json(TotalBalance {
        total_minor: total.cents(),
    }))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(id, user.id).await?;
    Ok(Json(account_view(&account)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    let mut cmd = UpdateAccountCmd::new(id, user.id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(account_kind_from_api(kind));
    }
    if let Some(currency) = payload.currency {
        cmd = cmd.currency(currency_from_api(currency));
    }
    let account = state.engine.update_account(cmd).await?;
    Ok(Json(account_view(&account)))
}

/// Removes the account and all of its transactions.
pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
