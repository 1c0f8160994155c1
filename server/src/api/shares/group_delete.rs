use crate::access;
use crate::api::{error_response, internal_error, ErrorResponse};
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

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/group-shares/{share_id}",
    tag = "shares",
    params(
        ("id" = Uuid, Path, description = "Recipe ID"),
        ("share_id" = Uuid, Path, description = "Group share ID")
    ),
    responses(
        (status = 204, description = "Group share removed"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Only the owner manages sharing", body = ErrorResponse),
        (status = 404, description = "Recipe or share not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_group_share(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path((id, share_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    if let Err(e) = access::require_owner(&mut conn, user.id, id) {
        return e.into_response();
    }

    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let group_id: Uuid = diesel::delete(
            recipe_group_shares::table
                .filter(recipe_group_shares::id.eq(share_id))
                .filter(recipe_group_shares::recipe_id.eq(id)),
        )
        .returning(recipe_group_shares::group_id)
        .get_result(conn)?;

        let name: String = groups::table
            .find(group_id)
            .select(groups::name)
            .first(conn)?;
        let summary = format!("Stopped sharing with group {}", name);
        record_change(conn, id, user.id, ChangeKind::Unshared, &[], Some(summary.as_str()))?;
        Ok(())
    });

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(diesel::result::Error::NotFound) => {
            error_response(StatusCode::NOT_FOUND, "Share not found")
        }
        Err(e) => internal_error("Failed to remove group share", e),
    }
}
