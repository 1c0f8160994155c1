//! Recipe access control.
//!
//! A caller's access to a recipe is the best of: ownership, a direct share,
//! and shares to any group they belong to. Callers with no access at all get
//! a 404 so that recipe ids don't leak; callers with too little get a 403.

use crate::api::error_response;
use crate::schema::{group_members, recipe_group_shares, recipe_shares, recipes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Edit,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::View => "view",
            Permission::Edit => "edit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(Permission::View),
            "edit" => Some(Permission::Edit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Owner,
    Shared(Permission),
}

/// Access as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Owner,
    Edit,
    View,
}

impl Access {
    pub fn allows(&self, needed: Permission) -> bool {
        match self {
            Access::Owner => true,
            Access::Shared(granted) => *granted >= needed,
        }
    }

    /// Deleting and sharing are reserved to the owner.
    pub fn can_manage(&self) -> bool {
        matches!(self, Access::Owner)
    }

    pub fn level(&self) -> AccessLevel {
        match self {
            Access::Owner => AccessLevel::Owner,
            Access::Shared(Permission::Edit) => AccessLevel::Edit,
            Access::Shared(Permission::View) => AccessLevel::View,
        }
    }
}

/// Combine ownership and share grants into the caller's effective access.
pub fn resolve(
    owner_id: Uuid,
    user_id: Uuid,
    direct: Option<Permission>,
    groups: &[Permission],
) -> Option<Access> {
    if owner_id == user_id {
        return Some(Access::Owner);
    }
    direct
        .into_iter()
        .chain(groups.iter().copied())
        .max()
        .map(Access::Shared)
}

#[derive(Debug)]
pub enum AccessError {
    NotFound,
    Forbidden,
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for AccessError {
    fn from(e: diesel::result::Error) -> Self {
        AccessError::Database(e)
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        match self {
            AccessError::NotFound => error_response(StatusCode::NOT_FOUND, "Recipe not found"),
            AccessError::Forbidden => error_response(
                StatusCode::FORBIDDEN,
                "You do not have permission to do that with this recipe",
            ),
            AccessError::Database(e) => {
                tracing::error!("Failed to check recipe access: {}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to check recipe access",
                )
            }
        }
    }
}

/// Permission strings from share rows; unknown values are ignored.
pub fn parse_permissions(values: &[String]) -> Vec<Permission> {
    values.iter().filter_map(|p| Permission::parse(p)).collect()
}

/// Resolve the caller's access to a live recipe.
///
/// Returns Ok(None) when the recipe doesn't exist, is deleted, or isn't
/// visible to the caller.
pub fn load_access(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_id: Uuid,
) -> QueryResult<Option<Access>> {
    let owner_id: Option<Uuid> = recipes::table
        .filter(recipes::id.eq(recipe_id))
        .filter(recipes::deleted_at.is_null())
        .select(recipes::owner_id)
        .first(conn)
        .optional()?;

    let Some(owner_id) = owner_id else {
        return Ok(None);
    };
    if owner_id == user_id {
        return Ok(Some(Access::Owner));
    }

    let direct: Option<String> = recipe_shares::table
        .filter(recipe_shares::recipe_id.eq(recipe_id))
        .filter(recipe_shares::shared_with.eq(user_id))
        .select(recipe_shares::permission)
        .first(conn)
        .optional()?;

    let my_groups = group_members::table
        .filter(group_members::user_id.eq(user_id))
        .select(group_members::group_id);
    let group_permissions: Vec<String> = recipe_group_shares::table
        .filter(recipe_group_shares::recipe_id.eq(recipe_id))
        .filter(recipe_group_shares::group_id.eq_any(my_groups))
        .select(recipe_group_shares::permission)
        .load(conn)?;

    Ok(resolve(
        owner_id,
        user_id,
        direct.as_deref().and_then(Permission::parse),
        &parse_permissions(&group_permissions),
    ))
}

/// Load access and check it grants `needed`.
pub fn require(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_id: Uuid,
    needed: Permission,
) -> Result<Access, AccessError> {
    let access = load_access(conn, user_id, recipe_id)?.ok_or(AccessError::NotFound)?;
    if !access.allows(needed) {
        return Err(AccessError::Forbidden);
    }
    Ok(access)
}

/// Load access and check the caller owns the recipe.
pub fn require_owner(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<Access, AccessError> {
    let access = load_access(conn, user_id, recipe_id)?.ok_or(AccessError::NotFound)?;
    if !access.can_manage() {
        return Err(AccessError::Forbidden);
    }
    Ok(access)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (Uuid, Uuid) {
        (Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn test_owner_wins() {
        let (owner, _) = ids();
        assert_eq!(
            resolve(owner, owner, Some(Permission::View), &[]),
            Some(Access::Owner)
        );
    }

    #[test]
    fn test_no_grants_means_no_access() {
        let (owner, user) = ids();
        assert_eq!(resolve(owner, user, None, &[]), None);
    }

    #[test]
    fn test_highest_grant_wins() {
        let (owner, user) = ids();
        assert_eq!(
            resolve(owner, user, Some(Permission::View), &[Permission::Edit]),
            Some(Access::Shared(Permission::Edit))
        );
        assert_eq!(
            resolve(owner, user, None, &[Permission::View, Permission::View]),
            Some(Access::Shared(Permission::View))
        );
        assert_eq!(
            resolve(owner, user, Some(Permission::Edit), &[Permission::View]),
            Some(Access::Shared(Permission::Edit))
        );
    }

    #[test]
    fn test_allows() {
        assert!(Access::Owner.allows(Permission::Edit));
        assert!(Access::Shared(Permission::Edit).allows(Permission::View));
        assert!(Access::Shared(Permission::View).allows(Permission::View));
        assert!(!Access::Shared(Permission::View).allows(Permission::Edit));
    }

    #[test]
    fn test_only_owner_manages() {
        assert!(Access::Owner.can_manage());
        assert!(!Access::Shared(Permission::Edit).can_manage());
    }

    #[test]
    fn test_permission_round_trip_and_order() {
        assert!(Permission::View < Permission::Edit);
        assert_eq!(Permission::parse("edit"), Some(Permission::Edit));
        assert_eq!(Permission::parse("admin"), None);
        assert_eq!(Permission::View.as_str(), "view");
    }

    #[test]
    fn test_level() {
        assert_eq!(Access::Owner.level(), AccessLevel::Owner);
        assert_eq!(
            Access::Shared(Permission::View).level(),
            AccessLevel::View
        );
    }
}
