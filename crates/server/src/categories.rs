use api_types::category::{CategoryNew, CategoryView};
use axum::{Json, extract::State, http::StatusCode};
use engine::NewCategoryCmd;

use crate::{
    ServerError,
    convert::{category_kind_from_api, category_view},
    server::ServerState,
};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.list_categories().await?;
    Ok(Json(categories.iter().map(category_view).collect()))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let mut cmd = NewCategoryCmd::new(payload.name, category_kind_from_api(payload.kind));
    if let Some(icon) = payload.icon {
        cmd = cmd.icon(icon);
    }
    if let Some(color) = payload.color {
        cmd = cmd.color(color);
    }
    let category = state.engine.create_category(cmd).await?;
    Ok((StatusCode::CREATED, Json(category_view(&category))))
}
