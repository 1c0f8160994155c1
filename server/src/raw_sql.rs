//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! # Safety
//!
//! User input is ALWAYS passed via `.bind()` parameters, never interpolated.

use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::sql_types::BigInt;

/// Window function for counting total rows across the full result set.
///
/// Returns `COUNT(*) OVER()` which gives the total count before LIMIT/OFFSET.
/// Diesel doesn't support window functions natively.
pub fn count_over() -> SqlLiteral<BigInt> {
    sql::<BigInt>("COUNT(*) OVER()")
}

/// Filter expression for case-insensitive tag containment in `recipes.tags`.
///
/// # Why raw SQL?
/// Diesel has no DSL for comparing against the elements of an unnested array.
#[macro_export]
macro_rules! tag_in_array {
    ($tag:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>("lower(")
            .bind::<diesel::sql_types::Text, _>($tag)
            .sql(") IN (SELECT lower(t) FROM unnest(recipes.tags) AS t)")
    };
}

/// Case-insensitive match on `profiles.email`.
#[macro_export]
macro_rules! email_matches {
    ($email:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>("lower(profiles.email) = lower(")
            .bind::<diesel::sql_types::Text, _>($email)
            .sql(")")
    };
}

/// Distinct tags across a user's own live recipes, case-folded.
///
/// Uses `unnest()` to expand the tags array, which isn't in Diesel's DSL.
///
/// # Safety
/// The user_id MUST be passed via `.bind()`, not interpolated.
pub const DISTINCT_TAGS_QUERY: &str = "SELECT DISTINCT lower(t) AS tag \
    FROM recipes r, unnest(r.tags) AS t \
    WHERE r.owner_id = $1 AND r.deleted_at IS NULL AND t IS NOT NULL AND t <> '' \
    ORDER BY tag";
