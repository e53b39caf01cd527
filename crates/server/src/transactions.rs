//! Transactions API endpoints

use api_types::transaction::{DateRange, TransactionRequest, TransactionView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    CreateTransactionCmd, EngineError, MoneyCents, TransactionWithAccount, UpdateTransactionCmd,
    User,
};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{transaction_view, tx_kind_from_api},
    server::ServerState,
};

fn views(items: Vec<TransactionWithAccount>) -> Json<Vec<TransactionView>> {
    Json(items.into_iter().map(transaction_view).collect())
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    Ok(views(state.engine.list_transactions(user.id).await?))
}

pub async fn by_account(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    Ok(views(
        state
            .engine
            .list_transactions_for_account(account_id, user.id)
            .await?,
    ))
}

pub async fn date_range(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    Ok(views(
        state
            .engine
            .list_transactions_in_range(user.id, range.start_date, range.end_date)
            .await?,
    ))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let item = state.engine.transaction(id, user.id).await?;
    Ok(Json(transaction_view(item)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = CreateTransactionCmd::new(
        user.id,
        payload.account_id,
        tx_kind_from_api(payload.kind),
        MoneyCents::new(payload.amount_minor),
        payload.category,
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(date) = payload.transaction_date {
        cmd = cmd.date(date);
    }
    let created = state.engine.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(transaction_view(created))))
}

/// Full replacement; `transaction_date` is mandatory here.
pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionRequest>,
) -> Result<Json<TransactionView>, ServerError> {
    let date = payload.transaction_date.ok_or_else(|| {
        EngineError::InvalidDate("transaction_date is required".to_string())
    })?;
    let mut cmd = UpdateTransactionCmd::new(
        id,
        user.id,
        payload.account_id,
        tx_kind_from_api(payload.kind),
        MoneyCents::new(payload.amount_minor),
        payload.category,
        date,
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    let updated = state.engine.update_transaction(cmd).await?;
    Ok(Json(transaction_view(updated)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
