use super::{GroupResponse, GroupRole};
use crate::api::{internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Group;
use crate::schema::{group_members, groups};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListGroupsResponse {
    pub groups: Vec<GroupResponse>,
}

#[utoipa::path(
    get,
    path = "/api/groups",
    tag = "groups",
    responses(
        (status = 200, description = "Groups the caller belongs to", body = ListGroupsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_groups(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let mine: Vec<(Group, String)> = match groups::table
        .inner_join(group_members::table)
        .filter(group_members::user_id.eq(user.id))
        .order(groups::name.asc())
        .select((Group::as_select(), group_members::role))
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => return internal_error("Failed to fetch groups", e),
    };

    let ids: Vec<Uuid> = mine.iter().map(|(g, _)| g.id).collect();
    let counts: HashMap<Uuid, i64> = match group_members::table
        .filter(group_members::group_id.eq_any(ids))
        .group_by(group_members::group_id)
        .select((group_members::group_id, count_star()))
        .load::<(Uuid, i64)>(&mut conn)
    {
        Ok(rows) => rows.into_iter().collect(),
        Err(e) => return internal_error("Failed to count group members", e),
    };

    let groups = mine
        .into_iter()
        .filter_map(|(group, role)| {
            Some(GroupResponse {
                role: GroupRole::parse(&role)?,
                member_count: counts.get(&group.id).copied().unwrap_or(0),
                id: group.id,
                name: group.name,
                owner_id: group.owner_id,
                created_at: group.created_at,
                updated_at: group.updated_at,
            })
        })
        .collect();

    (StatusCode::OK, Json(ListGroupsResponse { groups })).into_response()
}
