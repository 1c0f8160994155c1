use super::{GroupShareResponse, ShareResponse};
use crate::access::{self, Permission};
use crate::api::{internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{groups, profiles, recipe_group_shares, recipe_shares};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListSharesResponse {
    pub shares: Vec<ShareResponse>,
    pub group_shares: Vec<GroupShareResponse>,
}

type ShareRow = (Uuid, Uuid, String, Option<String>, String, DateTime<Utc>);
type GroupShareRow = (Uuid, Uuid, String, String, DateTime<Utc>);

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/shares",
    tag = "shares",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Direct and group shares", body = ListSharesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Only the owner manages sharing", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_shares(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    if let Err(e) = access::require_owner(&mut conn, user.id, id) {
        return e.into_response();
    }

    let shares: Vec<ShareRow> = match recipe_shares::table
        .inner_join(profiles::table.on(profiles::id.eq(recipe_shares::shared_with)))
        .filter(recipe_shares::recipe_id.eq(id))
        .order(recipe_shares::created_at.asc())
        .select((
            recipe_shares::id,
            recipe_shares::shared_with,
            profiles::email,
            profiles::display_name,
            recipe_shares::permission,
            recipe_shares::created_at,
        ))
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => return internal_error("Failed to fetch shares", e),
    };

    let group_shares: Vec<GroupShareRow> = match recipe_group_shares::table
        .inner_join(groups::table)
        .filter(recipe_group_shares::recipe_id.eq(id))
        .order(recipe_group_shares::created_at.asc())
        .select((
            recipe_group_shares::id,
            recipe_group_shares::group_id,
            groups::name,
            recipe_group_shares::permission,
            recipe_group_shares::created_at,
        ))
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => return internal_error("Failed to fetch group shares", e),
    };

    let shares = shares
        .into_iter()
        .filter_map(|(id, user_id, email, display_name, permission, created_at)| {
            Some(ShareResponse {
                id,
                user_id,
                email,
                display_name,
                permission: Permission::parse(&permission)?,
                created_at,
            })
        })
        .collect();

    let group_shares = group_shares
        .into_iter()
        .filter_map(|(id, group_id, group_name, permission, created_at)| {
            Some(GroupShareResponse {
                id,
                group_id,
                group_name,
                permission: Permission::parse(&permission)?,
                created_at,
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(ListSharesResponse {
            shares,
            group_shares,
        }),
    )
        .into_response()
}
