use crate::access;
use crate::api::{error_response, internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::changes::{record_change, ChangeKind};
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{profiles, recipe_shares};
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
    path = "/api/recipes/{id}/shares/{share_id}",
    tag = "shares",
    params(
        ("id" = Uuid, Path, description = "Recipe ID"),
        ("share_id" = Uuid, Path, description = "Share ID")
    ),
    responses(
        (status = 204, description = "Share removed"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Only the owner manages sharing", body = ErrorResponse),
        (status = 404, description = "Recipe or share not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_share(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path((id, share_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    if let Err(e) = access::require_owner(&mut conn, user.id, id) {
        return e.into_response();
    }

    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let shared_with: Uuid = diesel::delete(
            recipe_shares::table
                .filter(recipe_shares::id.eq(share_id))
                .filter(recipe_shares::recipe_id.eq(id)),
        )
        .returning(recipe_shares::shared_with)
        .get_result(conn)?;

        let email: String = profiles::table
            .find(shared_with)
            .select(profiles::email)
            .first(conn)?;
        let summary = format!("Stopped sharing with {}", email);
        record_change(conn, id, user.id, ChangeKind::Unshared, &[], Some(summary.as_str()))?;
        Ok(())
    });

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(diesel::result::Error::NotFound) => {
            error_response(StatusCode::NOT_FOUND, "Share not found")
        }
        Err(e) => internal_error("Failed to remove share", e),
    }
}
