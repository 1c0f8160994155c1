use chrono::{DateTime, Utc};
use diesel::prelude::*;
use potluck_core::{Ingredient, Nutrition, RecipeContent};
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Recipe {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: serde_json::Value,
    pub instructions: String,
    pub servings: Option<i32>,
    pub prep_minutes: Option<i32>,
    pub cook_minutes: Option<i32>,
    pub tags: Vec<Option<String>>,
    pub nutrition: Option<serde_json::Value>,
    pub source_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Recipe {
    /// The editable part of the row. Errors if a JSON column no longer decodes.
    pub fn content(&self) -> Result<RecipeContent, serde_json::Error> {
        let ingredients: Vec<Ingredient> = serde_json::from_value(self.ingredients.clone())
            .inspect_err(|e| {
                tracing::warn!(recipe_id = %self.id, error = %e, "Undecodable ingredients");
            })?;
        let nutrition: Option<Nutrition> = self
            .nutrition
            .clone()
            .map(serde_json::from_value)
            .transpose()
            .inspect_err(|e| {
                tracing::warn!(recipe_id = %self.id, error = %e, "Undecodable nutrition");
            })?;

        Ok(RecipeContent {
            title: self.title.clone(),
            description: self.description.clone(),
            ingredients,
            instructions: self.instructions.clone(),
            servings: self.servings,
            prep_minutes: self.prep_minutes,
            cook_minutes: self.cook_minutes,
            tags: self.tags.iter().flatten().cloned().collect(),
            nutrition,
            source_url: self.source_url.clone(),
            notes: self.notes.clone(),
        })
    }
}

/// Recipe columns written on insert and update.
#[derive(Insertable, AsChangeset, Debug)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(treat_none_as_null = true)]
pub struct RecipeFields {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: serde_json::Value,
    pub instructions: String,
    pub servings: Option<i32>,
    pub prep_minutes: Option<i32>,
    pub cook_minutes: Option<i32>,
    pub tags: Vec<Option<String>>,
    pub nutrition: Option<serde_json::Value>,
    pub source_url: Option<String>,
    pub notes: Option<String>,
}

impl RecipeFields {
    pub fn from_content(content: &RecipeContent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            title: content.title.clone(),
            description: content.description.clone(),
            ingredients: serde_json::to_value(&content.ingredients)?,
            instructions: content.instructions.clone(),
            servings: content.servings,
            prep_minutes: content.prep_minutes,
            cook_minutes: content.cook_minutes,
            tags: content.tags.iter().cloned().map(Some).collect(),
            nutrition: content
                .nutrition
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
            source_url: content.source_url.clone(),
            notes: content.notes.clone(),
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe {
    pub owner_id: Uuid,
    #[diesel(embed)]
    pub fields: RecipeFields,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::recipe_photos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Photo {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub uploaded_by: Uuid,
    pub storage_key: String,
    pub thumbnail_key: String,
    pub content_type: String,
    pub byte_size: i64,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_photos)]
pub struct NewPhoto<'a> {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub uploaded_by: Uuid,
    pub storage_key: &'a str,
    pub thumbnail_key: &'a str,
    pub content_type: &'a str,
    pub byte_size: i64,
    pub position: i32,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipe_shares)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Share {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub shared_with: Uuid,
    pub permission: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_shares)]
pub struct NewShare<'a> {
    pub recipe_id: Uuid,
    pub shared_with: Uuid,
    pub permission: &'a str,
    pub created_by: Uuid,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::groups)]
pub struct NewGroup<'a> {
    pub name: &'a str,
    pub owner_id: Uuid,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::group_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GroupMember {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::group_members)]
pub struct NewGroupMember<'a> {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: &'a str,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipe_group_shares)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GroupShare {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub group_id: Uuid,
    pub permission: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_group_shares)]
pub struct NewGroupShare<'a> {
    pub recipe_id: Uuid,
    pub group_id: Uuid,
    pub permission: &'a str,
    pub created_by: Uuid,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipe_changes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecipeChange {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub changed_fields: Vec<Option<String>>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_changes)]
pub struct NewRecipeChange<'a> {
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub kind: &'a str,
    pub changed_fields: Vec<Option<String>>,
    pub summary: Option<&'a str>,
}

/// Group roles stored in group_members.role.
pub const ROLE_OWNER: &str = "owner";
pub const ROLE_MEMBER: &str = "member";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipe(ingredients: serde_json::Value, nutrition: Option<serde_json::Value>) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Pancakes".to_string(),
            description: None,
            ingredients,
            instructions: "Mix and fry.".to_string(),
            servings: Some(4),
            prep_minutes: None,
            cook_minutes: None,
            tags: vec![Some("breakfast".to_string()), None],
            nutrition,
            source_url: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_content_decodes_json_columns() {
        let row = recipe(
            json!([{"amount": "2", "unit": "cups", "item": "flour"}]),
            None,
        );
        let content = row.content().unwrap();
        assert_eq!(content.ingredients.len(), 1);
        assert_eq!(content.ingredients[0].item, "flour");
        assert_eq!(content.tags, vec!["breakfast".to_string()]);
        assert!(content.nutrition.is_none());
    }

    #[test]
    fn test_corrupt_ingredients_are_an_error() {
        let row = recipe(json!({"not": "a list"}), None);
        assert!(row.content().is_err());
    }

    #[test]
    fn test_corrupt_nutrition_is_an_error() {
        let row = recipe(json!([]), Some(json!("lots of calories")));
        assert!(row.content().is_err());
    }
}
