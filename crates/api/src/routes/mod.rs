//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::{auth_middleware, password_gate},
};

pub mod accounts;
pub mod advances;
pub mod health;
pub mod loans;
pub mod salaries;
pub mod statements;

/// Creates the API router.
///
/// `/health` is public. Account self-service needs a token; everything else
/// also needs the default password to have been changed.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let gated_routes = Router::new()
        .merge(salaries::routes(state.max_upload_bytes))
        .merge(statements::routes())
        .merge(advances::routes())
        .merge(loans::routes())
        .merge(accounts::managed_routes())
        .layer(middleware::from_fn_with_state(state.clone(), password_gate));

    let protected_routes = Router::new()
        .merge(accounts::self_routes())
        .merge(gated_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
