use super::{GroupShareResponse, Upsert};
use crate::access::{self, Permission};
use crate::api::{error_response, internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::changes::{record_change, ChangeKind};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{GroupShare, NewGroupShare};
use crate::schema::{group_members, groups, recipe_group_shares};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateGroupShareRequest {
    pub group_id: Uuid,
    pub permission: Permission,
}

/// Share a recipe with a group the caller belongs to.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/group-shares",
    tag = "shares",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = CreateGroupShareRequest,
    responses(
        (status = 201, description = "Group share created", body = GroupShareResponse),
        (status = 200, description = "Existing group share updated", body = GroupShareResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Only the owner manages sharing", body = ErrorResponse),
        (status = 404, description = "Recipe or group not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_group_share(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateGroupShareRequest>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    if let Err(e) = access::require_owner(&mut conn, user.id, id) {
        return e.into_response();
    }

    // Only groups the caller is in; others look like they don't exist
    let group_name: String = match groups::table
        .inner_join(group_members::table)
        .filter(groups::id.eq(request.group_id))
        .filter(group_members::user_id.eq(user.id))
        .select(groups::name)
        .first(&mut conn)
        .optional()
    {
        Ok(Some(name)) => name,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Group not found"),
        Err(e) => return internal_error("Failed to fetch group", e),
    };

    let permission = request.permission.as_str();
    let summary = format!("Shared with group {} ({})", group_name, permission);

    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let inserted: Option<GroupShare> = diesel::insert_into(recipe_group_shares::table)
            .values(NewGroupShare {
                recipe_id: id,
                group_id: request.group_id,
                permission,
                created_by: user.id,
            })
            .on_conflict((recipe_group_shares::recipe_id, recipe_group_shares::group_id))
            .do_nothing()
            .returning(GroupShare::as_returning())
            .get_result(conn)
            .optional()?;

        let (share, outcome) = match inserted {
            Some(share) => (share, Upsert::Created),
            None => {
                let existing: GroupShare = recipe_group_shares::table
                    .filter(recipe_group_shares::recipe_id.eq(id))
                    .filter(recipe_group_shares::group_id.eq(request.group_id))
                    .select(GroupShare::as_select())
                    .for_update()
                    .first(conn)?;
                match Upsert::for_existing(&existing.permission, permission) {
                    Upsert::Unchanged => (existing, Upsert::Unchanged),
                    outcome => {
                        let share: GroupShare =
                            diesel::update(recipe_group_shares::table.find(existing.id))
                                .set(recipe_group_shares::permission.eq(permission))
                                .returning(GroupShare::as_returning())
                                .get_result(conn)?;
                        (share, outcome)
                    }
                }
            }
        };

        if outcome.records_change() {
            record_change(conn, id, user.id, ChangeKind::Shared, &[], Some(summary.as_str()))?;
        }
        Ok((share, outcome))
    });

    match result {
        Ok((share, outcome)) => {
            tracing::info!(recipe_id = %id, group_id = %share.group_id, permission, ?outcome, "Shared recipe with group");
            (
                outcome.status(),
                Json(GroupShareResponse {
                    id: share.id,
                    group_id: share.group_id,
                    group_name,
                    permission: request.permission,
                    created_at: share.created_at,
                }),
            )
                .into_response()
        }
        Err(e) => internal_error("Failed to share recipe with group", e),
    }
}
