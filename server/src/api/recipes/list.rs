use crate::access::{parse_permissions, resolve, AccessLevel};
use crate::api::{internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::{like_pattern, DbPool};
use crate::get_conn;
use crate::raw_sql::count_over;
use crate::schema::{group_members, recipe_group_shares, recipe_photos, recipe_shares, recipes};
use crate::storage::UrlSigner;
use crate::tag_in_array;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

/// Which recipes to list
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Owned recipes plus everything shared with the caller
    #[default]
    All,
    /// Only recipes the caller owns
    Owned,
    /// Only recipes other people shared, directly or through a group
    Shared,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// all (default), owned or shared
    #[serde(default)]
    pub scope: Scope,
    /// Case-insensitive search over title and description
    pub q: Option<String>,
    /// Only recipes carrying this tag (case-insensitive)
    pub tag: Option<String>,
    /// Number of items to return (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMetadata {
    /// Total number of items available
    pub total: i64,
    /// Number of items requested (limit)
    pub limit: i64,
    /// Number of items skipped (offset)
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub access: AccessLevel,
    /// Signed URL of the first photo's thumbnail, if any
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub pagination: PaginationMetadata,
}

#[derive(Queryable)]
struct RecipeForList {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    description: Option<String>,
    tags: Vec<Option<String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Total count of all matching rows (from window function)
    total_count: i64,
}

fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        offset.unwrap_or(0).max(0),
    )
}

/// Total matches as reported by the window count on the first row. An empty
/// page past the first has no row to carry it, so the caller must count.
fn window_total(first_row_total: Option<i64>, offset: i64) -> Option<i64> {
    match first_row_total {
        Some(total) => Some(total),
        None if offset > 0 => None,
        None => Some(0),
    }
}

/// Share permissions the caller holds on each of `recipe_ids`, direct and via groups.
fn shared_permissions(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_ids: &[Uuid],
) -> QueryResult<HashMap<Uuid, Vec<String>>> {
    let direct: Vec<(Uuid, String)> = recipe_shares::table
        .filter(recipe_shares::recipe_id.eq_any(recipe_ids.to_vec()))
        .filter(recipe_shares::shared_with.eq(user_id))
        .select((recipe_shares::recipe_id, recipe_shares::permission))
        .load(conn)?;

    let my_groups = group_members::table
        .filter(group_members::user_id.eq(user_id))
        .select(group_members::group_id);
    let via_groups: Vec<(Uuid, String)> = recipe_group_shares::table
        .filter(recipe_group_shares::recipe_id.eq_any(recipe_ids.to_vec()))
        .filter(recipe_group_shares::group_id.eq_any(my_groups))
        .select((
            recipe_group_shares::recipe_id,
            recipe_group_shares::permission,
        ))
        .load(conn)?;

    let mut permissions: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (recipe_id, permission) in direct.into_iter().chain(via_groups) {
        permissions.entry(recipe_id).or_default().push(permission);
    }
    Ok(permissions)
}

/// Thumbnail key of the lowest-positioned photo of each recipe.
fn first_thumbnails(
    conn: &mut PgConnection,
    recipe_ids: &[Uuid],
) -> QueryResult<HashMap<Uuid, String>> {
    let rows: Vec<(Uuid, String)> = recipe_photos::table
        .filter(recipe_photos::recipe_id.eq_any(recipe_ids.to_vec()))
        .order((
            recipe_photos::recipe_id,
            recipe_photos::position.asc(),
            recipe_photos::created_at.asc(),
        ))
        .select((recipe_photos::recipe_id, recipe_photos::thumbnail_key))
        .load(conn)?;

    let mut thumbnails = HashMap::new();
    for (recipe_id, key) in rows {
        thumbnails.entry(recipe_id).or_insert(key);
    }
    Ok(thumbnails)
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Recipes visible to the caller", body = ListRecipesResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(signer): State<Arc<UrlSigner>>,
    Query(params): Query<ListRecipesParams>,
) -> impl IntoResponse {
    let (limit, offset) = page_bounds(params.limit, params.offset);

    let text_pattern = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(like_pattern);
    let tag = params
        .tag
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let mut conn = get_conn!(pool);

    let user_id = user.id;
    let shared_directly = || {
        recipe_shares::table
            .filter(recipe_shares::shared_with.eq(user_id))
            .select(recipe_shares::recipe_id)
    };
    let shared_via_group = || {
        recipe_group_shares::table
            .filter(
                recipe_group_shares::group_id.eq_any(
                    group_members::table
                        .filter(group_members::user_id.eq(user_id))
                        .select(group_members::group_id),
                ),
            )
            .select(recipe_group_shares::recipe_id)
    };

    let scope = params.scope;
    let filtered = || {
        let mut query = recipes::table
            .filter(recipes::deleted_at.is_null())
            .into_boxed();

        query = match scope {
            Scope::Owned => query.filter(recipes::owner_id.eq(user_id)),
            Scope::Shared => query.filter(
                recipes::owner_id.ne(user_id).and(
                    recipes::id
                        .eq_any(shared_directly())
                        .or(recipes::id.eq_any(shared_via_group())),
                ),
            ),
            Scope::All => query.filter(
                recipes::owner_id
                    .eq(user_id)
                    .or(recipes::id.eq_any(shared_directly()))
                    .or(recipes::id.eq_any(shared_via_group())),
            ),
        };

        if let Some(ref pattern) = text_pattern {
            query = query.filter(
                recipes::title
                    .ilike(pattern.clone())
                    .or(recipes::description.ilike(pattern.clone())),
            );
        }

        if let Some(ref tag) = tag {
            query = query.filter(tag_in_array!(tag.clone()));
        }

        query
    };

    // COUNT(*) OVER() computes the total count across all matching rows
    let rows: Vec<RecipeForList> = match filtered()
        .order((recipes::updated_at.desc(), recipes::id.asc()))
        .select((
            recipes::id,
            recipes::owner_id,
            recipes::title,
            recipes::description,
            recipes::tags,
            recipes::created_at,
            recipes::updated_at,
            count_over(),
        ))
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => return internal_error("Failed to fetch recipes", e),
    };

    let total = match window_total(rows.first().map(|r| r.total_count), offset) {
        Some(total) => total,
        None => match filtered().count().get_result::<i64>(&mut conn) {
            Ok(total) => total,
            Err(e) => return internal_error("Failed to count recipes", e),
        },
    };
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let permissions = match shared_permissions(&mut conn, user_id, &ids) {
        Ok(permissions) => permissions,
        Err(e) => return internal_error("Failed to fetch recipe shares", e),
    };
    let thumbnails = match first_thumbnails(&mut conn, &ids) {
        Ok(thumbnails) => thumbnails,
        Err(e) => return internal_error("Failed to fetch photos", e),
    };

    let recipes = rows
        .into_iter()
        .filter_map(|r| {
            let granted = permissions
                .get(&r.id)
                .map(|p| parse_permissions(p))
                .unwrap_or_default();
            let access = resolve(r.owner_id, user_id, None, &granted)?;

            Some(RecipeSummary {
                id: r.id,
                owner_id: r.owner_id,
                title: r.title,
                description: r.description,
                tags: r.tags.into_iter().flatten().collect(),
                access: access.level(),
                thumbnail_url: thumbnails.get(&r.id).map(|key| signer.signed_url(key)),
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(ListRecipesResponse {
            recipes,
            pagination: PaginationMetadata {
                total,
                limit,
                offset,
            },
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds_defaults() {
        assert_eq!(page_bounds(None, None), (20, 0));
    }

    #[test]
    fn test_page_bounds_clamped() {
        assert_eq!(page_bounds(Some(0), Some(-3)), (1, 0));
        assert_eq!(page_bounds(Some(500), Some(40)), (100, 40));
    }

    #[test]
    fn test_window_total() {
        assert_eq!(window_total(Some(42), 40), Some(42));
        assert_eq!(window_total(None, 0), Some(0));
        // Offset beyond the last match still needs the real total
        assert_eq!(window_total(None, 100), None);
    }

    #[test]
    fn test_scope_parses() {
        let params: ListRecipesParams =
            serde_json::from_str(r#"{"scope": "shared", "tag": "soup"}"#).unwrap();
        assert_eq!(params.scope, Scope::Shared);
        assert_eq!(params.tag.as_deref(), Some("soup"));

        let params: ListRecipesParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.scope, Scope::All);
    }
}
