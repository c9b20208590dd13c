use axum::{
    Router,
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use super::handlers;
use crate::app::AppState;
use crate::auth::AuthGate;
use crate::health;
use crate::middleware::Interceptors;
use crate::organizations::InviteGate;

/// Unauthenticated account endpoints, mounted at `/auth`.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/signin", post(handlers::signin))
        .route("/refresh-token", post(handlers::refresh_token))
        .route("/revoke-refresh-token", post(handlers::revoke_refresh_token))
}

/// Organization endpoints behind the auth gate, mounted at `/api`.
///
/// Reading a single organization additionally requires an invitation.
pub fn organization_routes(state: &AppState) -> Router<AppState> {
    let auth_chain = Interceptors::new().with(AuthGate::new(state.tokens.clone()));
    let invite_chain = Interceptors::new().with(InviteGate::new(state.organization_store.clone()));

    Router::new()
        .route(
            "/organization",
            post(handlers::create_organization).get(handlers::list_organizations),
        )
        .route(
            "/organization/{organization_id}",
            get(handlers::get_organization
                .layer(from_fn_with_state(invite_chain, Interceptors::middleware)))
            .put(handlers::update_organization)
            .delete(handlers::delete_organization),
        )
        .route(
            "/organization/{organization_id}/invite",
            post(handlers::invite_user),
        )
        .route_layer(from_fn_with_state(auth_chain, Interceptors::middleware))
}

/// Every route, with state applied.
pub fn router(state: AppState) -> axum::Router {
    let api = organization_routes(&state);
    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/auth", auth_routes())
        .nest("/api", api)
        .with_state(state)
}
