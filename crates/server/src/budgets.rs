//! Budget endpoints

use api_types::budget::{BudgetRequest, BudgetView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Budget, BudgetCmd, BudgetMonth, MoneyCents, User};
use uuid::Uuid;

use crate::{ServerError, convert::budget_view, server::ServerState};

fn views(budgets: &[Budget]) -> Json<Vec<BudgetView>> {
    Json(budgets.iter().map(budget_view).collect())
}

fn command(user: &User, payload: BudgetRequest) -> Result<BudgetCmd, ServerError> {
    let period: BudgetMonth = payload.month.parse()?;
    Ok(BudgetCmd::new(
        user.id,
        payload.category,
        MoneyCents::new(payload.amount_minor),
        period,
    ))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    Ok(views(&state.engine.list_budgets(user.id).await?))
}

pub async fn current(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    Ok(views(&state.engine.current_month_budgets(user.id).await?))
}

pub async fn by_month(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((month, year)): Path<(u32, i32)>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let period = BudgetMonth::new(year, month)?;
    Ok(views(
        &state.engine.list_budgets_for_month(user.id, period).await?,
    ))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state.engine.budget(id, user.id).await?;
    Ok(Json(budget_view(&budget)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetRequest>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let budget = state.engine.create_budget(command(&user, payload)?).await?;
    Ok((StatusCode::CREATED, Json(budget_view(&budget))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BudgetRequest>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state
        .engine
        .update_budget(id, command(&user, payload)?)
        .await?;
    Ok(Json(budget_view(&budget)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
