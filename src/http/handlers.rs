use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::dto::{CreatedOrganization, InviteRequest, OrganizationRequest, OrganizationView};
use super::extract::{JsonBody, ValidatedJson};
use crate::app::AppState;
use crate::auth::CurrentUser;
use crate::auth::flows::{AuthResponse, MessageResponse, SigninRequest, SignupRequest, TokenRequest};
use crate::error::Result;

pub async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let pair = state.signup.signup(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("User created successfully", pair)),
    ))
}

pub async fn signin(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SigninRequest>,
) -> Result<Json<AuthResponse>> {
    let pair = state.signin.signin(req).await?;
    Ok(Json(AuthResponse::new("SignIn successful", pair)))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<TokenRequest>,
) -> Result<Json<AuthResponse>> {
    let pair = state.sessions.refresh(&req.token).await?;
    Ok(Json(AuthResponse::new("Tokens refreshed successfully", pair)))
}

pub async fn revoke_refresh_token(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<TokenRequest>,
) -> Result<Json<MessageResponse>> {
    state.sessions.revoke(&req.token).await?;
    Ok(Json(MessageResponse::new("Refresh token revoked")))
}

pub async fn create_organization(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ValidatedJson(req): ValidatedJson<OrganizationRequest>,
) -> Result<(StatusCode, Json<CreatedOrganization>)> {
    let organization_id = state
        .organizations
        .create(&req.name, &req.description)
        .await?;
    tracing::debug!(
        organization_id = %organization_id,
        username = %caller.username,
        "Organization created by caller"
    );
    Ok((
        StatusCode::CREATED,
        Json(CreatedOrganization { organization_id }),
    ))
}

pub async fn list_organizations(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrganizationView>>> {
    let orgs = state.organizations.list().await?;
    Ok(Json(orgs.into_iter().map(OrganizationView::from).collect()))
}

pub async fn get_organization(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
) -> Result<Json<OrganizationView>> {
    let org = state.organizations.get(&organization_id).await?;
    Ok(Json(org.into()))
}

pub async fn update_organization(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
    ValidatedJson(req): ValidatedJson<OrganizationRequest>,
) -> Result<Json<OrganizationView>> {
    let org = state
        .organizations
        .update(&organization_id, &req.name, &req.description)
        .await?;
    Ok(Json(org.into()))
}

pub async fn delete_organization(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.organizations.delete(&organization_id).await?;
    Ok(Json(MessageResponse::new("Organization deleted successfully")))
}

pub async fn invite_user(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
    ValidatedJson(req): ValidatedJson<InviteRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .organizations
        .invite(&organization_id, &req.user_email)
        .await?;
    Ok(Json(MessageResponse::new("User invited to organization")))
}
