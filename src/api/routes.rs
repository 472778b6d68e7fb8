//! API Route Definitions
//!
//! Wires the HTTP surface: public auth endpoints, and the rate-limited,
//! bearer-authenticated contact and user routes.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};

use super::contact_handlers::*;
use super::handlers::*;
use super::middleware::{auth_middleware, rate_limit_middleware};
use super::user_handlers::*;

/// Build the full application router.
///
/// Protected routes pass the rate limiter first, then token validation and
/// user resolution; the handlers only run for admitted, authenticated
/// requests.
pub fn create_routes(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh_token", get(refresh_token))
        .route("/confirmed_email/:token", get(confirmed_email))
        .route("/request_email", post(request_email));

    let contact_routes = Router::new()
        .route("/", get(list_contacts).post(create_contact))
        .route(
            "/:id",
            get(get_contact).put(update_contact).delete(remove_contact),
        )
        .route("/birthdays/", get(upcoming_birthdays))
        .route("/search/", get(search_contacts))
        // Ordering: the outermost layer runs first, so the limiter sees the
        // request before any token work happens.
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware));

    let user_routes = Router::new()
        .route("/me/", get(me))
        .route("/avatar", patch(update_avatar))
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware));

    Router::new()
        .route("/", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/contacts", contact_routes)
        .nest("/api/users", user_routes)
        .with_state(state)
}
