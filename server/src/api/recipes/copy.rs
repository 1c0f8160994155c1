use super::create::CreateRecipeResponse;
use crate::access::{self, Permission};
use crate::api::{internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::changes::{record_change, ChangeKind};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRecipe, Recipe, RecipeFields};
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

/// Copy a recipe the caller can see into their own collection.
///
/// The copy keeps the title and content; photos, shares and history stay
/// with the original.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/copy",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID to copy")
    ),
    responses(
        (status = 201, description = "Copy created", body = CreateRecipeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn copy_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    if let Err(e) = access::require(&mut conn, user.id, id, Permission::View) {
        return e.into_response();
    }

    let original: Recipe = match recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(recipe) => recipe,
        Err(e) => return internal_error("Failed to fetch recipe", e),
    };

    let content = match original.content() {
        Ok(content) => content,
        Err(e) => return internal_error("Failed to decode recipe", e),
    };
    let fields = match RecipeFields::from_content(&content) {
        Ok(fields) => fields,
        Err(e) => return internal_error("Failed to encode recipe", e),
    };
    let summary = format!("Copied from recipe {}", original.id);

    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let copy_id: Uuid = diesel::insert_into(recipes::table)
            .values(NewRecipe {
                owner_id: user.id,
                fields,
            })
            .returning(recipes::id)
            .get_result(conn)?;

        record_change(
            conn,
            copy_id,
            user.id,
            ChangeKind::Copied,
            &[],
            Some(summary.as_str()),
        )?;
        Ok(copy_id)
    });

    match result {
        Ok(copy_id) => {
            tracing::info!(recipe_id = %id, copy_id = %copy_id, "Copied recipe");
            (StatusCode::CREATED, Json(CreateRecipeResponse { id: copy_id })).into_response()
        }
        Err(e) => internal_error("Failed to copy recipe", e),
    }
}
