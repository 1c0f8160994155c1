use crate::db::DbPool;
use crate::models::Profile;
use crate::schema::{profiles, sessions};
use chrono::Utc;
use diesel::prelude::*;

use super::crypto::hash_token;

/// Look up the profile behind a live session.
///
/// Returns Ok(None) when the token is unknown or expired.
pub fn get_profile_from_token(
    pool: &DbPool,
    token: &str,
) -> Result<Option<Profile>, Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let token_hash = hash_token(token);

    let profile = sessions::table
        .inner_join(profiles::table)
        .filter(sessions::token_hash.eq(&token_hash))
        .filter(sessions::expires_at.gt(Utc::now()))
        .select(Profile::as_select())
        .first(&mut conn)
        .optional()?;

    Ok(profile)
}
