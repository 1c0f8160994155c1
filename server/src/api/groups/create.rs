use super::{validate_name, GroupResponse, GroupRole};
use crate::api::{error_response, internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{Group, NewGroup, NewGroupMember, ROLE_OWNER};
use crate::schema::{group_members, groups};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GroupNameRequest {
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/groups",
    tag = "groups",
    request_body = GroupNameRequest,
    responses(
        (status = 201, description = "Group created; the caller is its owner", body = GroupResponse),
        (status = 400, description = "Invalid name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_group(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<GroupNameRequest>,
) -> impl IntoResponse {
    let name = match validate_name(&request.name) {
        Ok(name) => name,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let mut conn = get_conn!(pool);

    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let group: Group = diesel::insert_into(groups::table)
            .values(NewGroup {
                name: &name,
                owner_id: user.id,
            })
            .returning(Group::as_returning())
            .get_result(conn)?;

        diesel::insert_into(group_members::table)
            .values(NewGroupMember {
                group_id: group.id,
                user_id: user.id,
                role: ROLE_OWNER,
            })
            .execute(conn)?;

        Ok(group)
    });

    match result {
        Ok(group) => {
            tracing::info!(group_id = %group.id, "Created group");
            (
                StatusCode::CREATED,
                Json(GroupResponse {
                    id: group.id,
                    name: group.name,
                    owner_id: group.owner_id,
                    role: GroupRole::Owner,
                    member_count: 1,
                    created_at: group.created_at,
                    updated_at: group.updated_at,
                }),
            )
                .into_response()
        }
        Err(e) => internal_error("Failed to create group", e),
    }
}
