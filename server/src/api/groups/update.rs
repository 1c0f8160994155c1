use super::create::GroupNameRequest;
use super::{member_count, require_group_owner, validate_name, GroupResponse, GroupRole};
use crate::api::{error_response, internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Group;
use crate::schema::groups;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    put,
    path = "/api/groups/{id}",
    tag = "groups",
    params(
        ("id" = Uuid, Path, description = "Group ID")
    ),
    request_body = GroupNameRequest,
    responses(
        (status = 200, description = "Group renamed", body = GroupResponse),
        (status = 400, description = "Invalid name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Only the group owner can rename it", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_group(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<GroupNameRequest>,
) -> impl IntoResponse {
    let name = match validate_name(&request.name) {
        Ok(name) => name,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let mut conn = get_conn!(pool);

    if let Err(response) = require_group_owner(&mut conn, id, user.id) {
        return response;
    }

    let group: Group = match diesel::update(groups::table.find(id))
        .set((groups::name.eq(&name), groups::updated_at.eq(diesel::dsl::now)))
        .returning(Group::as_returning())
        .get_result(&mut conn)
    {
        Ok(group) => group,
        Err(e) => return internal_error("Failed to update group", e),
    };

    let member_count = match member_count(&mut conn, id) {
        Ok(count) => count,
        Err(e) => return internal_error("Failed to count group members", e),
    };

    (
        StatusCode::OK,
        Json(GroupResponse {
            id: group.id,
            name: group.name,
            owner_id: group.owner_id,
            role: GroupRole::Owner,
            member_count,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }),
    )
        .into_response()
}
