pub mod enrichment;
pub mod ideas;
pub mod image;
pub mod ingredient_parser;
pub mod llm;
pub mod quantity;
pub mod scaling;
pub mod types;
pub mod units;

pub use ideas::{suggest_recipe_ideas, IdeasError, MAX_IDEAS};
pub use image::{validate_image, ALLOWED_FORMATS, MAX_FILE_SIZE};
pub use ingredient_parser::{parse_ingredient, parse_ingredients};
pub use quantity::{format_amount, parse_amount, AmountStyle, Quantity};
pub use scaling::{
    classify, convert_ingredient, factor_for_servings, scale_ingredient, scale_recipe, Matter,
    ScaleError, ScaleOptions,
};
pub use types::{Ingredient, Nutrition, RecipeContent, RecipeIdea};
pub use units::{unit_kind, System, Unit, UnitKind};
