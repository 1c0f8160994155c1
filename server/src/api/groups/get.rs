use super::{require_member, GroupRole, MemberResponse};
use crate::api::{internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{Group, GroupMember};
use crate::schema::{group_members, groups, profiles};
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
pub struct GroupDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub role: GroupRole,
    pub members: Vec<MemberResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/api/groups/{id}",
    tag = "groups",
    params(
        ("id" = Uuid, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Group with its members", body = GroupDetailResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_group(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let role = match require_member(&mut conn, id, user.id) {
        Ok(role) => role,
        Err(response) => return response,
    };

    let group: Group = match groups::table
        .find(id)
        .select(Group::as_select())
        .first(&mut conn)
    {
        Ok(group) => group,
        Err(e) => return internal_error("Failed to fetch group", e),
    };

    let members: Vec<(GroupMember, String, Option<String>)> = match group_members::table
        .inner_join(profiles::table)
        .filter(group_members::group_id.eq(id))
        .order(group_members::added_at.asc())
        .select((
            GroupMember::as_select(),
            profiles::email,
            profiles::display_name,
        ))
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => return internal_error("Failed to fetch group members", e),
    };

    let members = members
        .into_iter()
        .filter_map(|(member, email, display_name)| {
            Some(MemberResponse {
                role: GroupRole::parse(&member.role)?,
                user_id: member.user_id,
                email,
                display_name,
                added_at: member.added_at,
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(GroupDetailResponse {
            id: group.id,
            name: group.name,
            owner_id: group.owner_id,
            role,
            members,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }),
    )
        .into_response()
}
