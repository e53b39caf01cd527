use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{ServerError, accounts, budgets, categories, transactions, user};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Identity resolver.
///
/// Resolves `Authorization: Basic base64(email:password)` to an active user
/// and stores it in the request extensions for the handlers.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(EngineError::InvalidCredentials("missing credentials".to_string()).into());
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(EngineError::InvalidCredentials("missing credentials".to_string()).into());
    }

    let user = state
        .engine
        .authenticate(credentials.username(), credentials.password())
        .await?;
    tracing::debug!(user = %user.id, path = %request.uri().path(), "authenticated");

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };
    Router::new()
        .route("/auth/profile", get(user::profile))
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route("/accounts/total-balance", get(accounts::total_balance))
        .route(
            "/accounts/{id}",
            get(accounts::get)
                .put(accounts::update)
                .delete(accounts::delete),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/date-range", get(transactions::date_range))
        .route(
            "/transactions/account/{account_id}",
            get(transactions::by_account),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route("/budgets/current", get(budgets::current))
        .route(
            "/budgets/month/{month}/year/{year}",
            get(budgets::by_month),
        )
        .route(
            "/budgets/{id}",
            get(budgets::get).put(budgets::update).delete(budgets::delete),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/auth/register", post(user::register))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}
