pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod members;
pub mod update;

use crate::api::{error_response, internal_error};
use crate::models::{ROLE_MEMBER, ROLE_OWNER};
use crate::schema::group_members;
use crate::AppState;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

const MAX_GROUP_NAME_CHARS: usize = 100;

/// Returns the router for /api/groups endpoints (mounted at /api/groups)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_groups).post(create::create_group))
        .route(
            "/{id}",
            get(get::get_group)
                .put(update::update_group)
                .delete(delete::delete_group),
        )
        .route("/{id}/members", post(members::add_member))
        .route("/{id}/members/{user_id}", delete(members::remove_member))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_groups,
        create::create_group,
        get::get_group,
        update::update_group,
        delete::delete_group,
        members::add_member,
        members::remove_member,
    ),
    components(schemas(
        GroupRole,
        GroupResponse,
        MemberResponse,
        list::ListGroupsResponse,
        create::GroupNameRequest,
        get::GroupDetailResponse,
        members::AddMemberRequest,
    ))
)]
pub struct ApiDoc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Owner,
    Member,
}

impl GroupRole {
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            ROLE_OWNER => Some(GroupRole::Owner),
            ROLE_MEMBER => Some(GroupRole::Member),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    /// The caller's role in the group
    pub role: GroupRole,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberResponse {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub role: GroupRole,
    pub added_at: DateTime<Utc>,
}

/// Trimmed group name, or a 400 message.
pub(crate) fn validate_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Group name is required".to_string());
    }
    if name.chars().count() > MAX_GROUP_NAME_CHARS {
        return Err(format!(
            "Group name must be at most {} characters",
            MAX_GROUP_NAME_CHARS
        ));
    }
    Ok(name.to_string())
}

/// The caller's role in a group. Non-members get a 404 so group ids don't leak.
pub(crate) fn require_member(
    conn: &mut PgConnection,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<GroupRole, Response> {
    let role: Option<String> = group_members::table
        .filter(group_members::group_id.eq(group_id))
        .filter(group_members::user_id.eq(user_id))
        .select(group_members::role)
        .first(conn)
        .optional()
        .map_err(|e| internal_error("Failed to fetch group membership", e))?;

    role.as_deref()
        .and_then(GroupRole::parse)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Group not found"))
}

/// Like `require_member`, but members who aren't the owner get a 403.
pub(crate) fn require_group_owner(
    conn: &mut PgConnection,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<(), Response> {
    match require_member(conn, group_id, user_id)? {
        GroupRole::Owner => Ok(()),
        GroupRole::Member => Err(error_response(
            StatusCode::FORBIDDEN,
            "Only the group owner can do that",
        )),
    }
}

pub(crate) fn member_count(conn: &mut PgConnection, group_id: Uuid) -> QueryResult<i64> {
    group_members::table
        .filter(group_members::group_id.eq(group_id))
        .count()
        .get_result(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Family  ").unwrap(), "Family");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_GROUP_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(GroupRole::parse("owner"), Some(GroupRole::Owner));
        assert_eq!(GroupRole::parse("member"), Some(GroupRole::Member));
        assert_eq!(GroupRole::parse("admin"), None);
    }
}
