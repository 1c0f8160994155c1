use super::require_group_owner;
use crate::api::{internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::changes::{record_change, ChangeKind};
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{groups, recipe_group_shares};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

/// Delete a group. Its memberships and recipe shares go with it.
#[utoipa::path(
    delete,
    path = "/api/groups/{id}",
    tag = "groups",
    params(
        ("id" = Uuid, Path, description = "Group ID")
    ),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Only the group owner can delete it", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_group(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    if let Err(response) = require_group_owner(&mut conn, id, user.id) {
        return response;
    }

    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let name: String = groups::table.find(id).select(groups::name).first(conn)?;

        let shared_recipes: Vec<Uuid> =
            diesel::delete(recipe_group_shares::table.filter(recipe_group_shares::group_id.eq(id)))
                .returning(recipe_group_shares::recipe_id)
                .get_results(conn)?;

        let summary = format!("Group {} was deleted", name);
        for recipe_id in &shared_recipes {
            record_change(
                conn,
                *recipe_id,
                user.id,
                ChangeKind::Unshared,
                &[],
                Some(summary.as_str()),
            )?;
        }

        // Memberships cascade
        diesel::delete(groups::table.find(id)).execute(conn)?;
        Ok(shared_recipes.len())
    });

    match result {
        Ok(unshared) => {
            tracing::info!(group_id = %id, unshared, "Deleted group");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => internal_error("Failed to delete group", e),
    }
}
