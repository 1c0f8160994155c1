use crate::access::{self, Permission};
use crate::api::{internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::RecipeChange;
use crate::schema::recipe_changes;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListChangesParams {
    /// Number of entries to return (default: 50, max: 200)
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChangeResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    /// created, updated, copied, photo_added, photo_removed, shared, unshared or deleted
    pub kind: String,
    pub changed_fields: Vec<String>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RecipeChange> for ChangeResponse {
    fn from(change: RecipeChange) -> Self {
        Self {
            id: change.id,
            user_id: change.user_id,
            kind: change.kind,
            changed_fields: change.changed_fields.into_iter().flatten().collect(),
            summary: change.summary,
            created_at: change.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListChangesResponse {
    pub changes: Vec<ChangeResponse>,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/changes",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID"),
        ListChangesParams
    ),
    responses(
        (status = 200, description = "Change history, newest first", body = ListChangesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_changes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListChangesParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);

    let mut conn = get_conn!(pool);

    if let Err(e) = access::require(&mut conn, user.id, id, Permission::View) {
        return e.into_response();
    }

    let changes: Vec<RecipeChange> = match recipe_changes::table
        .filter(recipe_changes::recipe_id.eq(id))
        .order((recipe_changes::created_at.desc(), recipe_changes::id.desc()))
        .limit(limit)
        .select(RecipeChange::as_select())
        .load(&mut conn)
    {
        Ok(changes) => changes,
        Err(e) => return internal_error("Failed to fetch changes", e),
    };

    (
        StatusCode::OK,
        Json(ListChangesResponse {
            changes: changes.into_iter().map(ChangeResponse::from).collect(),
        }),
    )
        .into_response()
}
