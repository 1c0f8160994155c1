use crate::api::{internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::raw_sql::DISTINCT_TAGS_QUERY;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use diesel::sql_types::Text;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

#[derive(QueryableByName)]
struct TagRow {
    #[diesel(sql_type = Text)]
    tag: String,
}

/// Distinct tags across the caller's own recipes, for autocomplete.
#[utoipa::path(
    get,
    path = "/api/recipes/tags",
    tag = "recipes",
    responses(
        (status = 200, description = "Tags in use, sorted", body = TagsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_tags(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let rows: Vec<TagRow> = match diesel::sql_query(DISTINCT_TAGS_QUERY)
        .bind::<diesel::sql_types::Uuid, _>(user.id)
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => return internal_error("Failed to fetch tags", e),
    };

    (
        StatusCode::OK,
        Json(TagsResponse {
            tags: rows.into_iter().map(|r| r.tag).collect(),
        }),
    )
        .into_response()
}
