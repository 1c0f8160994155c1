use super::{ShareResponse, Upsert};
use crate::access::{self, Permission};
use crate::api::{error_response, internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::changes::{record_change, ChangeKind};
use crate::db::DbPool;
use crate::email_matches;
use crate::get_conn;
use crate::models::{NewShare, Profile, Share};
use crate::schema::{profiles, recipe_shares};
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
pub struct CreateShareRequest {
    /// Email of the person to share with
    pub email: String,
    pub permission: Permission,
}

/// Share a recipe with one person, or change the permission of an existing share.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shares",
    tag = "shares",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = CreateShareRequest,
    responses(
        (status = 201, description = "Share created", body = ShareResponse),
        (status = 200, description = "Existing share updated", body = ShareResponse),
        (status = 400, description = "Cannot share with yourself", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Only the owner manages sharing", body = ErrorResponse),
        (status = 404, description = "Recipe or user not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_share(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateShareRequest>,
) -> impl IntoResponse {
    let email = request.email.trim().to_string();
    if email.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Email is required");
    }

    let mut conn = get_conn!(pool);

    if let Err(e) = access::require_owner(&mut conn, user.id, id) {
        return e.into_response();
    }

    let recipient: Profile = match profiles::table
        .filter(email_matches!(email.clone()))
        .select(Profile::as_select())
        .first(&mut conn)
        .optional()
    {
        Ok(Some(profile)) => profile,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "No user with that email"),
        Err(e) => return internal_error("Failed to look up user", e),
    };

    if recipient.id == user.id {
        return error_response(StatusCode::BAD_REQUEST, "You already own this recipe");
    }

    let permission = request.permission.as_str();
    let summary = format!("Shared with {} ({})", recipient.email, permission);

    // Insert first; a conflict means the grant exists, possibly from a
    // concurrent request, and is updated in place.
    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let inserted: Option<Share> = diesel::insert_into(recipe_shares::table)
            .values(NewShare {
                recipe_id: id,
                shared_with: recipient.id,
                permission,
                created_by: user.id,
            })
            .on_conflict((recipe_shares::recipe_id, recipe_shares::shared_with))
            .do_nothing()
            .returning(Share::as_returning())
            .get_result(conn)
            .optional()?;

        let (share, outcome) = match inserted {
            Some(share) => (share, Upsert::Created),
            None => {
                let existing: Share = recipe_shares::table
                    .filter(recipe_shares::recipe_id.eq(id))
                    .filter(recipe_shares::shared_with.eq(recipient.id))
                    .select(Share::as_select())
                    .for_update()
                    .first(conn)?;
                match Upsert::for_existing(&existing.permission, permission) {
                    Upsert::Unchanged => (existing, Upsert::Unchanged),
                    outcome => {
                        let share: Share = diesel::update(recipe_shares::table.find(existing.id))
                            .set(recipe_shares::permission.eq(permission))
                            .returning(Share::as_returning())
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
            tracing::info!(recipe_id = %id, shared_with = %recipient.id, permission, ?outcome, "Shared recipe");
            (
                outcome.status(),
                Json(ShareResponse {
                    id: share.id,
                    user_id: recipient.id,
                    email: recipient.email,
                    display_name: recipient.display_name,
                    permission: request.permission,
                    created_at: share.created_at,
                }),
            )
                .into_response()
        }
        Err(e) => internal_error("Failed to share recipe", e),
    }
}
