use crate::api::{error_response, ErrorResponse};
use crate::auth::AuthUser;
use axum::{http::StatusCode, response::IntoResponse, Json};
use potluck_core::{scale_recipe, Ingredient, ScaleOptions, System};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScaleIngredientsRequest {
    pub ingredients: Vec<Ingredient>,
    /// Defaults to 1, i.e. convert only
    pub factor: Option<f64>,
    pub system: Option<System>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScaleIngredientsResponse {
    pub factor: f64,
    pub system: Option<System>,
    pub ingredients: Vec<Ingredient>,
}

/// Scale and convert an ingredient list without saving it
#[utoipa::path(
    post,
    path = "/api/ingredients/scale",
    tag = "ingredients",
    request_body = ScaleIngredientsRequest,
    responses(
        (status = 200, description = "Scaled ingredients", body = ScaleIngredientsResponse),
        (status = 400, description = "Invalid factor", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn scale_ingredients(
    AuthUser(_user): AuthUser,
    Json(request): Json<ScaleIngredientsRequest>,
) -> impl IntoResponse {
    let factor = request.factor.unwrap_or(1.0);
    let options = ScaleOptions {
        factor,
        target: request.system,
    };

    match scale_recipe(&request.ingredients, options) {
        Ok(ingredients) => (
            StatusCode::OK,
            Json(ScaleIngredientsResponse {
                factor,
                system: request.system,
                ingredients,
            }),
        )
            .into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Profile;
    use axum::body::to_bytes;
    use uuid::Uuid;

    fn caller() -> AuthUser {
        AuthUser(Profile {
            id: Uuid::new_v4(),
            email: "cook@example.com".to_string(),
            display_name: None,
            created_at: chrono::Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_scale_doubles_amounts() {
        let request = ScaleIngredientsRequest {
            ingredients: vec![Ingredient::new("eggs").with_amount("2", None)],
            factor: Some(2.0),
            system: None,
        };
        let response = scale_ingredients(caller(), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["ingredients"][0]["amount"], "4");
        assert_eq!(json["ingredients"][0]["item"], "eggs");
    }

    #[tokio::test]
    async fn test_scale_rejects_zero_factor() {
        let request = ScaleIngredientsRequest {
            ingredients: vec![Ingredient::new("salt")],
            factor: Some(0.0),
            system: None,
        };
        let response = scale_ingredients(caller(), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
