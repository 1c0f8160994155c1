use super::{require_group_owner, require_member, GroupRole, MemberResponse};
use crate::api::{error_response, internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::email_matches;
use crate::get_conn;
use crate::models::{GroupMember, NewGroupMember, Profile, ROLE_MEMBER};
use crate::schema::{group_members, profiles};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/api/groups/{id}/members",
    tag = "groups",
    params(
        ("id" = Uuid, Path, description = "Group ID")
    ),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MemberResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Only the group owner can add members", body = ErrorResponse),
        (status = 404, description = "Group or user not found", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_member(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddMemberRequest>,
) -> impl IntoResponse {
    let email = request.email.trim().to_string();
    if email.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Email is required");
    }

    let mut conn = get_conn!(pool);

    if let Err(response) = require_group_owner(&mut conn, id, user.id) {
        return response;
    }

    let profile: Profile = match profiles::table
        .filter(email_matches!(email))
        .select(Profile::as_select())
        .first(&mut conn)
        .optional()
    {
        Ok(Some(profile)) => profile,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "No user with that email"),
        Err(e) => return internal_error("Failed to look up user", e),
    };

    let member: GroupMember = match diesel::insert_into(group_members::table)
        .values(NewGroupMember {
            group_id: id,
            user_id: profile.id,
            role: ROLE_MEMBER,
        })
        .returning(GroupMember::as_returning())
        .get_result(&mut conn)
    {
        Ok(member) => member,
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return error_response(StatusCode::CONFLICT, "Already a member of this group")
        }
        Err(e) => return internal_error("Failed to add member", e),
    };

    tracing::info!(group_id = %id, user_id = %profile.id, "Added group member");
    (
        StatusCode::CREATED,
        Json(MemberResponse {
            user_id: member.user_id,
            email: profile.email,
            display_name: profile.display_name,
            role: GroupRole::Member,
            added_at: member.added_at,
        }),
    )
        .into_response()
}

/// Who may remove `target` from a group, given the caller's role.
fn check_removal(
    caller_role: GroupRole,
    caller_id: Uuid,
    target_id: Uuid,
) -> Result<(), (StatusCode, &'static str)> {
    match (caller_role, caller_id == target_id) {
        (GroupRole::Owner, true) => Err((
            StatusCode::BAD_REQUEST,
            "The owner cannot leave the group; delete it instead",
        )),
        (GroupRole::Owner, false) | (GroupRole::Member, true) => Ok(()),
        (GroupRole::Member, false) => Err((
            StatusCode::FORBIDDEN,
            "Only the group owner can remove other members",
        )),
    }
}

/// Remove a member, or leave the group when `user_id` is the caller.
#[utoipa::path(
    delete,
    path = "/api/groups/{id}/members/{user_id}",
    tag = "groups",
    params(
        ("id" = Uuid, Path, description = "Group ID"),
        ("user_id" = Uuid, Path, description = "Member's user ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 400, description = "The owner cannot leave", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Only the group owner can remove others", body = ErrorResponse),
        (status = 404, description = "Group or member not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_member(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let role = match require_member(&mut conn, id, user.id) {
        Ok(role) => role,
        Err(response) => return response,
    };

    if let Err((status, message)) = check_removal(role, user.id, member_id) {
        return error_response(status, message);
    }

    match diesel::delete(
        group_members::table
            .filter(group_members::group_id.eq(id))
            .filter(group_members::user_id.eq(member_id)),
    )
    .execute(&mut conn)
    {
        Ok(0) => error_response(StatusCode::NOT_FOUND, "Member not found"),
        Ok(_) => {
            tracing::info!(group_id = %id, user_id = %member_id, "Removed group member");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => internal_error("Failed to remove member", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_removes_others() {
        let (owner, other) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(check_removal(GroupRole::Owner, owner, other).is_ok());
    }

    #[test]
    fn test_owner_cannot_leave() {
        let owner = Uuid::new_v4();
        let (status, _) = check_removal(GroupRole::Owner, owner, owner).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_member_can_leave() {
        let member = Uuid::new_v4();
        assert!(check_removal(GroupRole::Member, member, member).is_ok());
    }

    #[test]
    fn test_member_cannot_remove_others() {
        let (member, other) = (Uuid::new_v4(), Uuid::new_v4());
        let (status, _) = check_removal(GroupRole::Member, member, other).unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
