use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    Json,
    body::Body,
    extract::{FromRequestParts, Path, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use db::models::{user::Model as UserModel, user_module_role::Role};
use std::collections::HashMap;
use util::config;

#[derive(serde::Serialize, Default)]
pub struct Empty;

type GuardRejection = (StatusCode, Json<ApiResponse<Empty>>);

pub fn is_superuser(user_id: i64) -> bool {
    config::super_users().contains(&user_id)
}

/// Admin flag from the token, or membership of `SUPER_USERS`.
pub fn has_admin_capability(user: &AuthUser) -> bool {
    user.0.admin || is_superuser(user.id())
}

/// Extracts and validates the caller, then stores it in the request extensions.
async fn extract_and_insert_authuser(
    req: Request<Body>,
) -> Result<(Request<Body>, AuthUser), GuardRejection> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            ApiResponse::error("Authentication required").with_status(StatusCode::UNAUTHORIZED)
        })?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

/// Basic guard to ensure the request is authenticated.
pub async fn allow_authenticated(req: Request<Body>, next: Next) -> Result<Response, GuardRejection> {
    let (req, _user) = extract_and_insert_authuser(req).await?;
    Ok(next.run(req).await)
}

/// Base role guard: admins and superusers always pass, everyone else needs
/// one of `required_roles` in the module named by the `module_id` path param.
async fn allow_role_base(
    app_state: &AppState,
    params: &HashMap<String, String>,
    req: Request<Body>,
    next: Next,
    required_roles: &[Role],
    failure_msg: &str,
) -> Result<Response, GuardRejection> {
    let (req, user) = extract_and_insert_authuser(req).await?;

    let module_id = params
        .get("module_id")
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            ApiResponse::error("Missing or invalid module_id").with_status(StatusCode::BAD_REQUEST)
        })?;

    if has_admin_capability(&user) {
        return Ok(next.run(req).await);
    }

    match UserModel::has_any_role(app_state.db(), user.id(), module_id, required_roles).await {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => Err(ApiResponse::error(failure_msg).with_status(StatusCode::FORBIDDEN)),
        Err(e) => {
            tracing::warn!(
                error = %e,
                user_id = user.id(),
                module_id,
                "DB error while checking role; denying access"
            );
            Err(ApiResponse::error("Could not verify module access")
                .with_status(StatusCode::SERVICE_UNAVAILABLE))
        }
    }
}

/// Lecturers, assistant lecturers and admins.
pub async fn allow_instructor(
    State(app_state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardRejection> {
    allow_role_base(
        &app_state,
        &params,
        req,
        next,
        &Role::INSTRUCTORS,
        "Lecturer or assistant lecturer access required for this module",
    )
    .await
}
