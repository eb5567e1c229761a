/// Recipe model: composer, filtering and read projections
///
/// A recipe is a parent row plus two association sets: tags (recipe_tags)
/// and ingredient amounts (recipe_ingredients). The composer validates and
/// persists all of it in one transaction — a half-written recipe is never
/// visible. On update the association sets are replaced wholesale, not
/// merged.
///
/// # Example
///
/// ```no_run
/// use ladle_shared::models::recipe::{IngredientAmount, NewRecipe, Recipe};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let recipe = Recipe::create(
///     &pool,
///     1,
///     NewRecipe {
///         name: "Borscht".to_string(),
///         image: None,
///         text: Some("Simmer slowly.".to_string()),
///         cooking_time: 90,
///         tags: vec![1, 2],
///         ingredients: vec![IngredientAmount { id: 3, amount: 500 }],
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};

use crate::models::ingredient::Ingredient;
use crate::models::relation::RecipeMark;
use crate::models::tag::Tag;
use crate::models::user::{User, UserProfile};

/// Maximum recipe name length
pub const MAX_NAME_LENGTH: usize = 200;

/// Cooking time bounds, in minutes
pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 1440;

/// Ingredient amount bounds
pub const MIN_AMOUNT: i32 = 1;
pub const MAX_AMOUNT: i32 = 10_000;

/// Characters counted as punctuation for the all-punctuation name check
const PUNCTUATION: &str = "/!*@#$%^&*()_+={}[]|:;\"<>,.?-";

/// Recipe row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    /// Unique recipe id
    pub id: i64,

    /// Owning user
    pub author_id: i64,

    /// Recipe name
    pub name: String,

    /// Optional image, carried as opaque text (URL or inline data)
    pub image: Option<String>,

    /// Optional description
    pub text: Option<String>,

    /// Cooking time in minutes, 1..=MAX_COOKING_TIME
    pub cooking_time: i32,

    /// Publication timestamp; recipes list newest first
    pub pub_date: DateTime<Utc>,
}

/// One (ingredient, amount) entry of a recipe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientAmount {
    /// Ingredient id
    pub id: i64,

    /// Amount in the ingredient's measurement unit, 1..=MAX_AMOUNT
    pub amount: i32,
}

/// Input for creating a recipe
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: i32,
    pub tags: Vec<i64>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Input for updating a recipe
///
/// An absent field means "leave unchanged". For the nullable `image` and
/// `text` columns an explicit JSON null is distinguished from absence and
/// clears the stored value. A present-but-empty tag or ingredient list is
/// rejected the same as on create.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub text: Option<Option<String>>,
    pub cooking_time: Option<i32>,
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<IngredientAmount>>,
}

/// Wraps a deserialized value in an outer Some so that a field that was
/// present as JSON null comes out as Some(None), not None
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Error type for the recipe composer
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// A field failed validation; carries field name and message
    #[error("{field}: {message}")]
    Invalid { field: String, message: String },

    /// A referenced tag id does not exist
    #[error("One or more tags do not exist")]
    UnknownTag,

    /// A referenced ingredient id does not exist
    #[error("One or more ingredients do not exist")]
    UnknownIngredient,

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ComposeError {
    fn invalid(field: &str, message: &str) -> Self {
        ComposeError::Invalid {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Validates a recipe name
///
/// Rejects empty or overlong names, and names consisting entirely of
/// digits or entirely of punctuation.
pub fn validate_name(name: &str) -> Result<(), ComposeError> {
    if name.is_empty() {
        return Err(ComposeError::invalid("name", "Name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ComposeError::invalid(
            "name",
            "Name cannot be longer than 200 characters",
        ));
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return Err(ComposeError::invalid(
            "name",
            "Name cannot consist only of digits",
        ));
    }
    if name.chars().all(|c| PUNCTUATION.contains(c)) {
        return Err(ComposeError::invalid(
            "name",
            "Name cannot consist only of punctuation",
        ));
    }
    Ok(())
}

fn validate_cooking_time(cooking_time: i32) -> Result<(), ComposeError> {
    if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&cooking_time) {
        return Err(ComposeError::invalid(
            "cooking_time",
            "Cooking time must be between 1 and 1440 minutes",
        ));
    }
    Ok(())
}

fn validate_amounts(ingredients: &[IngredientAmount]) -> Result<(), ComposeError> {
    for entry in ingredients {
        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&entry.amount) {
            return Err(ComposeError::invalid(
                "ingredients",
                "Ingredient amount must be between 1 and 10000",
            ));
        }
    }
    Ok(())
}

fn validate_tag_list(tags: &[i64]) -> Result<(), ComposeError> {
    if tags.is_empty() {
        return Err(ComposeError::invalid(
            "tags",
            "At least one tag is required",
        ));
    }
    let unique: HashSet<i64> = tags.iter().copied().collect();
    if unique.len() != tags.len() {
        return Err(ComposeError::invalid("tags", "Tags must be unique"));
    }
    Ok(())
}

fn validate_ingredient_list(ingredients: &[IngredientAmount]) -> Result<(), ComposeError> {
    if ingredients.is_empty() {
        return Err(ComposeError::invalid(
            "ingredients",
            "At least one ingredient is required",
        ));
    }
    let unique: HashSet<i64> = ingredients.iter().map(|i| i.id).collect();
    if unique.len() != ingredients.len() {
        return Err(ComposeError::invalid(
            "ingredients",
            "Ingredients must not repeat within a recipe",
        ));
    }
    Ok(())
}

impl NewRecipe {
    /// Validates all fields in order: name, cooking time and amounts,
    /// tag list, ingredient list
    pub fn validate(&self) -> Result<(), ComposeError> {
        validate_name(&self.name)?;
        validate_cooking_time(self.cooking_time)?;
        validate_amounts(&self.ingredients)?;
        validate_tag_list(&self.tags)?;
        validate_ingredient_list(&self.ingredients)?;
        Ok(())
    }
}

impl RecipeUpdate {
    /// Validates provided fields; omitted fields are left unchecked
    pub fn validate(&self) -> Result<(), ComposeError> {
        if let Some(ref name) = self.name {
            validate_name(name)?;
        }
        if let Some(cooking_time) = self.cooking_time {
            validate_cooking_time(cooking_time)?;
        }
        if let Some(ref ingredients) = self.ingredients {
            validate_amounts(ingredients)?;
        }
        if let Some(ref tags) = self.tags {
            validate_tag_list(tags)?;
        }
        if let Some(ref ingredients) = self.ingredients {
            validate_ingredient_list(ingredients)?;
        }
        Ok(())
    }
}

/// Composable recipe list filters; all present filters AND together
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Exact author id
    pub author: Option<i64>,

    /// Tag slugs, any-of semantics: a recipe matches if it carries at
    /// least one of the slugs
    pub tag_slugs: Option<Vec<String>>,

    /// Restrict to recipes favorited by this user
    pub favorited_by: Option<i64>,

    /// Restrict to recipes in this user's shopping cart
    pub in_cart_of: Option<i64>,
}

const RECIPE_COLUMNS: &str = "id, author_id, name, image, text, cooking_time, pub_date";

const FILTER_CONDITIONS: &str = r#"
    ($1::BIGINT IS NULL OR author_id = $1)
    AND ($2::TEXT[] IS NULL OR id IN (
        SELECT rt.recipe_id FROM recipe_tags rt
        JOIN tags t ON t.id = rt.tag_id
        WHERE t.slug = ANY($2)))
    AND ($3::BIGINT IS NULL OR id IN (
        SELECT recipe_id FROM favorites WHERE user_id = $3))
    AND ($4::BIGINT IS NULL OR id IN (
        SELECT recipe_id FROM shopping_cart WHERE user_id = $4))
"#;

impl Recipe {
    /// Creates a recipe together with its tag and ingredient associations
    ///
    /// Validates first, verifies the referenced tags and ingredients
    /// exist, then writes the parent row and both association sets in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// - `ComposeError::Invalid` on any validation failure
    /// - `ComposeError::UnknownTag` / `UnknownIngredient` for dangling ids
    /// - `ComposeError::Database` if any write fails (nothing persists)
    pub async fn create(
        pool: &PgPool,
        author_id: i64,
        data: NewRecipe,
    ) -> Result<Self, ComposeError> {
        data.validate()?;
        check_tags_exist(pool, &data.tags).await?;
        check_ingredients_exist(pool, &data.ingredients).await?;

        let mut tx = pool.begin().await?;

        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            INSERT INTO recipes (author_id, name, image, text, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(author_id)
        .bind(&data.name)
        .bind(&data.image)
        .bind(&data.text)
        .bind(data.cooking_time)
        .fetch_one(&mut *tx)
        .await?;

        insert_tags(&mut tx, recipe.id, &data.tags).await?;
        insert_ingredients(&mut tx, recipe.id, &data.ingredients).await?;

        tx.commit().await?;

        Ok(recipe)
    }

    /// Applies a partial update to a recipe
    ///
    /// Scalar fields are updated only when present. A present tag or
    /// ingredient list replaces the whole association set: prior rows are
    /// deleted and the new set inserted, all within the same transaction
    /// as the parent update.
    pub async fn update(
        pool: &PgPool,
        recipe_id: i64,
        data: RecipeUpdate,
    ) -> Result<Self, ComposeError> {
        data.validate()?;
        if let Some(ref tags) = data.tags {
            check_tags_exist(pool, tags).await?;
        }
        if let Some(ref ingredients) = data.ingredients {
            check_ingredients_exist(pool, ingredients).await?;
        }

        let mut tx = pool.begin().await?;

        // Omitted scalars keep their stored value; an explicit null image
        // or text clears it
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes
            SET name = COALESCE($2, name),
                image = CASE WHEN $3 THEN $4 ELSE image END,
                text = CASE WHEN $5 THEN $6 ELSE text END,
                cooking_time = COALESCE($7, cooking_time)
            WHERE id = $1
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(recipe_id)
        .bind(&data.name)
        .bind(data.image.is_some())
        .bind(data.image.as_ref().and_then(|v| v.as_deref()))
        .bind(data.text.is_some())
        .bind(data.text.as_ref().and_then(|v| v.as_deref()))
        .bind(data.cooking_time)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(ref tags) = data.tags {
            sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
                .bind(recipe_id)
                .execute(&mut *tx)
                .await?;
            insert_tags(&mut tx, recipe_id, tags).await?;
        }

        if let Some(ref ingredients) = data.ingredients {
            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
                .bind(recipe_id)
                .execute(&mut *tx)
                .await?;
            insert_ingredients(&mut tx, recipe_id, ingredients).await?;
        }

        tx.commit().await?;

        Ok(recipe)
    }

    /// Finds a recipe by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a recipe; association rows cascade
    ///
    /// # Returns
    ///
    /// True if the recipe existed
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists recipes matching the filter, newest first, paginated
    pub async fn list(
        pool: &PgPool,
        filter: &RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Recipe>(&format!(
            r#"
            SELECT {RECIPE_COLUMNS} FROM recipes
            WHERE {FILTER_CONDITIONS}
            ORDER BY pub_date DESC, id DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(filter.author)
        .bind(filter.tag_slugs.as_deref())
        .bind(filter.favorited_by)
        .bind(filter.in_cart_of)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts recipes matching the filter
    pub async fn count(pool: &PgPool, filter: &RecipeFilter) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM recipes WHERE {FILTER_CONDITIONS}"
        ))
        .bind(filter.author)
        .bind(filter.tag_slugs.as_deref())
        .bind(filter.favorited_by)
        .bind(filter.in_cart_of)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Lists an author's recipes in minified form, newest first
    ///
    /// Used by the subscription profile; `limit` of None returns all.
    pub async fn list_minified_by_author(
        pool: &PgPool,
        author_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeMinified>, sqlx::Error> {
        sqlx::query_as::<_, RecipeMinified>(
            r#"
            SELECT id, name, image, cooking_time
            FROM recipes
            WHERE author_id = $1
            ORDER BY pub_date DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Counts an author's recipes
    pub async fn count_by_author(pool: &PgPool, author_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

async fn check_tags_exist(pool: &PgPool, tags: &[i64]) -> Result<(), ComposeError> {
    if Tag::count_existing(pool, tags).await? != tags.len() as i64 {
        return Err(ComposeError::UnknownTag);
    }
    Ok(())
}

async fn check_ingredients_exist(
    pool: &PgPool,
    ingredients: &[IngredientAmount],
) -> Result<(), ComposeError> {
    let ids: Vec<i64> = ingredients.iter().map(|i| i.id).collect();
    if Ingredient::count_existing(pool, &ids).await? != ids.len() as i64 {
        return Err(ComposeError::UnknownIngredient);
    }
    Ok(())
}

async fn insert_tags(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    recipe_id: i64,
    tags: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO recipe_tags (recipe_id, tag_id)
         SELECT $1, tag_id FROM UNNEST($2::BIGINT[]) AS tag_id",
    )
    .bind(recipe_id)
    .bind(tags)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_ingredients(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    recipe_id: i64,
    ingredients: &[IngredientAmount],
) -> Result<(), sqlx::Error> {
    let ids: Vec<i64> = ingredients.iter().map(|i| i.id).collect();
    let amounts: Vec<i32> = ingredients.iter().map(|i| i.amount).collect();

    sqlx::query(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
         SELECT $1, ingredient_id, amount
         FROM UNNEST($2::BIGINT[], $3::INT[]) AS entries(ingredient_id, amount)",
    )
    .bind(recipe_id)
    .bind(&ids)
    .bind(&amounts)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Minified recipe, used inside subscription profiles
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeMinified {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

/// One expanded ingredient line of a recipe read representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredientView {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full read representation of a recipe
///
/// Tags, author and ingredients are expanded; `is_favorited` and
/// `is_in_shopping_cart` are viewer-dependent and always false for
/// anonymous viewers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    recipe_id: i64,
    id: i64,
    name: String,
    color: String,
    slug: String,
}

#[derive(Debug, sqlx::FromRow)]
struct IngredientRow {
    recipe_id: i64,
    id: i64,
    name: String,
    measurement_unit: String,
    amount: i32,
}

impl RecipeDetail {
    /// Builds the read representation of a single recipe
    pub async fn load(
        pool: &PgPool,
        recipe: &Recipe,
        viewer: Option<i64>,
    ) -> Result<Self, sqlx::Error> {
        let mut details = Self::load_many(pool, std::slice::from_ref(recipe), viewer).await?;
        Ok(details.remove(0))
    }

    /// Builds read representations for a page of recipes
    ///
    /// Runs one batched query per expansion (tags, ingredients, authors,
    /// viewer flags) instead of per recipe.
    pub async fn load_many(
        pool: &PgPool,
        recipes: &[Recipe],
        viewer: Option<i64>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();

        let tag_rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT rt.recipe_id, t.id, t.name, t.color, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.id
            "#,
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut tags_by_recipe: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in tag_rows {
            tags_by_recipe.entry(row.recipe_id).or_default().push(Tag {
                id: row.id,
                name: row.name,
                color: row.color,
                slug: row.slug,
            });
        }

        let ingredient_rows = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY ri.id
            "#,
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut ingredients_by_recipe: HashMap<i64, Vec<RecipeIngredientView>> = HashMap::new();
        for row in ingredient_rows {
            ingredients_by_recipe
                .entry(row.recipe_id)
                .or_default()
                .push(RecipeIngredientView {
                    id: row.id,
                    name: row.name,
                    measurement_unit: row.measurement_unit,
                    amount: row.amount,
                });
        }

        let (favorited, in_cart) = match viewer {
            Some(viewer_id) => (
                marked_of(pool, RecipeMark::Favorite, viewer_id, &ids).await?,
                marked_of(pool, RecipeMark::ShoppingCart, viewer_id, &ids).await?,
            ),
            None => Default::default(),
        };

        let author_ids: Vec<i64> = {
            let unique: HashSet<i64> = recipes.iter().map(|r| r.author_id).collect();
            unique.into_iter().collect()
        };
        let authors = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, first_name, last_name, password_hash,
                   is_staff, created_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(&author_ids)
        .fetch_all(pool)
        .await?;

        let profiles = UserProfile::load_many(pool, &authors, viewer).await?;
        let profile_by_id: HashMap<i64, UserProfile> =
            profiles.into_iter().map(|p| (p.id, p)).collect();

        recipes
            .iter()
            .map(|recipe| {
                let author = profile_by_id
                    .get(&recipe.author_id)
                    .cloned()
                    .ok_or(sqlx::Error::RowNotFound)?;

                Ok(RecipeDetail {
                    id: recipe.id,
                    tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                    author,
                    ingredients: ingredients_by_recipe
                        .remove(&recipe.id)
                        .unwrap_or_default(),
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                    name: recipe.name.clone(),
                    image: recipe.image.clone(),
                    text: recipe.text.clone(),
                    cooking_time: recipe.cooking_time,
                })
            })
            .collect()
    }
}

async fn marked_of(
    pool: &PgPool,
    mark: RecipeMark,
    user_id: i64,
    recipe_ids: &[i64],
) -> Result<HashSet<i64>, sqlx::Error> {
    let ids = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT recipe_id FROM {} WHERE user_id = $1 AND recipe_id = ANY($2)",
        mark.table()
    ))
    .bind(user_id)
    .bind(recipe_ids)
    .fetch_all(pool)
    .await?;

    Ok(ids.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_recipe() -> NewRecipe {
        NewRecipe {
            name: "Borscht".to_string(),
            image: None,
            text: None,
            cooking_time: 90,
            tags: vec![1, 2],
            ingredients: vec![
                IngredientAmount { id: 1, amount: 500 },
                IngredientAmount { id: 2, amount: 3 },
            ],
        }
    }

    #[test]
    fn test_valid_recipe_passes() {
        assert!(valid_recipe().validate().is_ok());
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("Borscht").is_ok());
        assert!(validate_name("Recipe 42").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("12345").is_err());
        assert!(validate_name("!!!...").is_err());
        assert!(validate_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_cooking_time_bounds() {
        let mut recipe = valid_recipe();
        recipe.cooking_time = 0;
        assert!(recipe.validate().is_err());

        recipe.cooking_time = MAX_COOKING_TIME + 1;
        assert!(recipe.validate().is_err());

        recipe.cooking_time = MAX_COOKING_TIME;
        assert!(recipe.validate().is_ok());
    }

    #[test]
    fn test_amount_bounds() {
        let mut recipe = valid_recipe();
        recipe.ingredients[0].amount = 0;
        assert!(recipe.validate().is_err());

        recipe.ingredients[0].amount = MAX_AMOUNT + 1;
        assert!(recipe.validate().is_err());
    }

    #[test]
    fn test_empty_and_duplicate_tags_rejected() {
        let mut recipe = valid_recipe();
        recipe.tags = vec![];
        assert!(recipe.validate().is_err());

        recipe.tags = vec![1, 1];
        assert!(recipe.validate().is_err());
    }

    #[test]
    fn test_empty_and_duplicate_ingredients_rejected() {
        let mut recipe = valid_recipe();
        recipe.ingredients = vec![];
        assert!(recipe.validate().is_err());

        recipe.ingredients = vec![
            IngredientAmount { id: 1, amount: 10 },
            IngredientAmount { id: 1, amount: 20 },
        ];
        assert!(recipe.validate().is_err());
    }

    #[test]
    fn test_update_with_nothing_provided_is_valid() {
        assert!(RecipeUpdate::default().validate().is_ok());
    }

    #[test]
    fn test_update_distinguishes_absent_from_null() {
        let update: RecipeUpdate = serde_json::from_str(r#"{"cooking_time": 20}"#).unwrap();
        assert_eq!(update.image, None);
        assert_eq!(update.text, None);

        let update: RecipeUpdate =
            serde_json::from_str(r#"{"image": null, "text": null}"#).unwrap();
        assert_eq!(update.image, Some(None));
        assert_eq!(update.text, Some(None));

        let update: RecipeUpdate = serde_json::from_str(r#"{"image": "pic.png"}"#).unwrap();
        assert_eq!(update.image, Some(Some("pic.png".to_string())));
    }

    #[test]
    fn test_update_rejects_present_but_empty_lists() {
        let update = RecipeUpdate {
            tags: Some(vec![]),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = RecipeUpdate {
            ingredients: Some(vec![]),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_validation_order_reports_name_first() {
        let recipe = NewRecipe {
            name: "123".to_string(),
            image: None,
            text: None,
            cooking_time: 0,
            tags: vec![],
            ingredients: vec![],
        };

        match recipe.validate() {
            Err(ComposeError::Invalid { field, .. }) => assert_eq!(field, "name"),
            other => panic!("Expected name error, got {:?}", other),
        }
    }
}
