use crate::access::{self, Permission};
use crate::api::{error_response, internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::recipes;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use potluck_core::{factor_for_servings, scale_recipe, Ingredient, ScaleOptions, System};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ScaledParams {
    /// Multiply every amount by this factor
    pub factor: Option<f64>,
    /// Scale to this many servings instead of giving a factor
    pub servings: Option<i32>,
    /// Convert units into this system after scaling
    pub system: Option<System>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScaledRecipeResponse {
    pub factor: f64,
    /// Servings after scaling, when the recipe states a yield
    pub servings: Option<i32>,
    pub system: Option<System>,
    pub ingredients: Vec<Ingredient>,
}

/// Work out the factor from either `factor` or a target serving count.
fn resolve_factor(
    params: &ScaledParams,
    recipe_servings: Option<i32>,
) -> Result<(f64, Option<i32>), String> {
    match (params.factor, params.servings) {
        (Some(_), Some(_)) => Err("Give either factor or servings, not both".to_string()),
        (None, Some(target)) => {
            let servings = recipe_servings
                .ok_or_else(|| "Recipe has no servings to scale from".to_string())?;
            let factor = factor_for_servings(servings, target).map_err(|e| e.to_string())?;
            Ok((factor, Some(target)))
        }
        (factor, None) => {
            let factor = factor.unwrap_or(1.0);
            let servings = recipe_servings
                .map(|s| ((s as f64) * factor).round().max(1.0) as i32);
            Ok((factor, servings))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/scaled",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID"),
        ScaledParams
    ),
    responses(
        (status = 200, description = "Scaled ingredients", body = ScaledRecipeResponse),
        (status = 400, description = "Invalid factor or servings", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_scaled(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Query(params): Query<ScaledParams>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    if let Err(e) = access::require(&mut conn, user.id, id, Permission::View) {
        return e.into_response();
    }

    let recipe: Recipe = match recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(recipe) => recipe,
        Err(e) => return internal_error("Failed to fetch recipe", e),
    };
    let content = match recipe.content() {
        Ok(content) => content,
        Err(e) => return internal_error("Failed to decode recipe", e),
    };

    let (factor, servings) = match resolve_factor(&params, content.servings) {
        Ok(resolved) => resolved,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let options = ScaleOptions {
        factor,
        target: params.system,
    };
    let ingredients = match scale_recipe(&content.ingredients, options) {
        Ok(ingredients) => ingredients,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    (
        StatusCode::OK,
        Json(ScaledRecipeResponse {
            factor,
            servings,
            system: params.system,
            ingredients,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(factor: Option<f64>, servings: Option<i32>) -> ScaledParams {
        ScaledParams {
            factor,
            servings,
            system: None,
        }
    }

    #[test]
    fn test_defaults_to_factor_one() {
        assert_eq!(resolve_factor(&params(None, None), Some(4)), Ok((1.0, Some(4))));
    }

    #[test]
    fn test_factor_scales_servings() {
        assert_eq!(
            resolve_factor(&params(Some(1.5), None), Some(4)),
            Ok((1.5, Some(6)))
        );
        assert_eq!(resolve_factor(&params(Some(2.0), None), None), Ok((2.0, None)));
    }

    #[test]
    fn test_servings_target() {
        assert_eq!(
            resolve_factor(&params(None, Some(6)), Some(4)),
            Ok((1.5, Some(6)))
        );
    }

    #[test]
    fn test_servings_without_yield_rejected() {
        assert!(resolve_factor(&params(None, Some(6)), None).is_err());
    }

    #[test]
    fn test_both_rejected() {
        assert!(resolve_factor(&params(Some(2.0), Some(6)), Some(4)).is_err());
    }

    #[test]
    fn test_zero_target_rejected() {
        assert!(resolve_factor(&params(None, Some(0)), Some(4)).is_err());
    }

    #[test]
    fn test_system_parses_from_query() {
        let parsed: ScaledParams =
            serde_json::from_str(r#"{"factor": 2.0, "system": "metric"}"#).unwrap();
        assert_eq!(parsed.system, Some(System::Metric));
    }
}
