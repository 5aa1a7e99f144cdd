//! # qdesk_api
//!
//! HTTP API library for qdesk: citizen and account sign-in, department
//! management and service tokens.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use qdesk_core::auth::SessionIssuer;
use qdesk_core::models::Role;
use qdesk_core::store::Stores;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::handlers::{accounts, auth, departments, health, tokens, users};
use crate::middleware::auth::{AllowedRoles, require_auth, require_roles};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence handles.
    pub stores: Stores,
    /// API configuration.
    pub config: ApiConfig,
    /// Signs and verifies session tokens; built once from `config.session`.
    pub sessions: SessionIssuer,
}

impl AppState {
    pub fn new(stores: Stores, config: ApiConfig) -> Self {
        let sessions = SessionIssuer::new(&config.session);
        Self {
            stores,
            config,
            sessions,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `qdesk_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    qdesk_core::migrate::migrate(pool).await
}

const TOKEN_ISSUERS: AllowedRoles = AllowedRoles(&[Role::User, Role::Receptionist, Role::Admin]);
const TOKEN_READERS: AllowedRoles =
    AllowedRoles(&[Role::Staff, Role::Receptionist, Role::Admin, Role::User]);
const STATUS_UPDATERS: AllowedRoles = AllowedRoles(&[Role::Staff, Role::Admin, Role::User]);
const TOKEN_LISTERS: AllowedRoles = AllowedRoles(&[Role::Admin, Role::User]);

/// Restrict every route of `inner` to `allowed`.
fn guarded(inner: Router<AppState>, allowed: AllowedRoles) -> Router<AppState> {
    inner.route_layer(from_fn_with_state(allowed, require_roles))
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_API, get(health::health))
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::POST_AUTH_GET_ID, post(auth::get_id_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::POST_ACCOUNTS_SIGNUP, post(accounts::signup_handler))
        .route(routes::POST_ACCOUNTS_LOGIN, post(accounts::login_handler));

    // Any authenticated principal
    let authenticated = Router::new()
        .route(routes::GET_ACCOUNTS_PROFILE, get(accounts::profile_handler))
        .route(routes::GET_USERS_PROFILE, get(users::profile_handler))
        .route(
            routes::POST_USERS_UPDATE_PROFILE,
            post(users::update_profile_handler),
        )
        .route(routes::GET_DEPARTMENTS, get(departments::list_handler))
        .route(
            routes::GET_TOKENS_BY_NUMBER,
            get(tokens::get_by_number_handler),
        );

    let admin = guarded(
        Router::new()
            .route(
                routes::PATCH_ACCOUNTS_UPDATE_ROLE,
                patch(accounts::update_role_handler),
            )
            .route(routes::GET_USERS_ADMIN_USERS, get(users::list_handler))
            .route(
                routes::POST_USERS_ADMIN_MANAGE_USER,
                post(users::manage_handler),
            )
            .route(
                routes::PATCH_USERS_UPDATE_ROLE,
                patch(users::update_role_handler),
            )
            .route(
                routes::POST_DEPARTMENTS_MANAGE,
                post(departments::manage_handler),
            ),
        AllowedRoles::ADMIN,
    );

    let token_desk = Router::new()
        .merge(guarded(
            Router::new().route(routes::POST_TOKENS_GENERATE, post(tokens::generate_handler)),
            TOKEN_ISSUERS,
        ))
        .merge(guarded(
            Router::new().route(routes::GET_TOKENS_BY_ID, get(tokens::get_by_id_handler)),
            TOKEN_READERS,
        ))
        .merge(guarded(
            Router::new().route(
                routes::POST_TOKENS_UPDATE_STATUS,
                post(tokens::update_status_handler),
            ),
            STATUS_UPDATERS,
        ))
        .merge(guarded(
            Router::new().route(routes::GET_TOKENS, get(tokens::list_handler)),
            TOKEN_LISTERS,
        ));

    // Protected routes (require auth); role guards run inside the auth layer.
    let protected = Router::new()
        .merge(authenticated)
        .merge(admin)
        .merge(token_desk)
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .fallback(health::not_found)
        .layer(cors)
        .with_state(state)
}
