pub mod create;
pub mod delete;
pub mod group_create;
pub mod group_delete;
pub mod list;

use crate::access::Permission;
use crate::AppState;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Returns the sharing routes, merged into the /api/recipes router
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/shares",
            get(list::list_shares).post(create::create_share),
        )
        .route("/{id}/shares/{share_id}", delete(delete::delete_share))
        .route("/{id}/group-shares", post(group_create::create_group_share))
        .route(
            "/{id}/group-shares/{share_id}",
            delete(group_delete::delete_group_share),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_shares,
        create::create_share,
        delete::delete_share,
        group_create::create_group_share,
        group_delete::delete_group_share,
    ),
    components(schemas(
        ShareResponse,
        GroupShareResponse,
        list::ListSharesResponse,
        create::CreateShareRequest,
        group_create::CreateGroupShareRequest,
        crate::access::Permission,
    ))
)]
pub struct ApiDoc;

/// A direct share with one person.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShareResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub permission: Permission,
    pub created_at: DateTime<Utc>,
}

/// A share with every member of a group.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupShareResponse {
    pub id: Uuid,
    pub group_id: Uuid,
    pub group_name: String,
    pub permission: Permission,
    pub created_at: DateTime<Utc>,
}

/// What a share request did to the grant for its (recipe, grantee) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Upsert {
    Created,
    Updated,
    Unchanged,
}

impl Upsert {
    /// Outcome when the insert found a grant already in place.
    pub(crate) fn for_existing(current: &str, requested: &str) -> Self {
        if current == requested {
            Upsert::Unchanged
        } else {
            Upsert::Updated
        }
    }

    pub(crate) fn status(self) -> StatusCode {
        match self {
            Upsert::Created => StatusCode::CREATED,
            Upsert::Updated | Upsert::Unchanged => StatusCode::OK,
        }
    }

    pub(crate) fn records_change(self) -> bool {
        self != Upsert::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grant_is_created() {
        assert_eq!(Upsert::Created.status(), StatusCode::CREATED);
        assert!(Upsert::Created.records_change());
    }

    #[test]
    fn test_repeated_grant_is_unchanged() {
        // A concurrent duplicate lands here after its insert conflicts
        let outcome = Upsert::for_existing("view", "view");
        assert_eq!(outcome, Upsert::Unchanged);
        assert_eq!(outcome.status(), StatusCode::OK);
        assert!(!outcome.records_change());
    }

    #[test]
    fn test_changed_permission_is_updated() {
        let outcome = Upsert::for_existing("view", "edit");
        assert_eq!(outcome, Upsert::Updated);
        assert_eq!(outcome.status(), StatusCode::OK);
        assert!(outcome.records_change());
    }
}
