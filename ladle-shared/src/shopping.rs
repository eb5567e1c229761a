/// Shopping list aggregation
///
/// Reduces a user's cart (a set of recipes) into one total per ingredient.
/// The same ingredient appearing in several cart recipes is summed into a
/// single line keyed by (name, measurement unit). Aggregation happens
/// database-side with GROUP BY; ordering by name keeps the output stable.
///
/// # Example
///
/// ```no_run
/// use ladle_shared::shopping::{render_shopping_list, shopping_list};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let items = shopping_list(&pool, 1).await?;
/// let text = render_shopping_list(&items, chrono::Utc::now().date_naive());
/// println!("{}", text);
/// # Ok(())
/// # }
/// ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// One aggregated line of the shopping list
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShoppingListItem {
    /// Ingredient name
    pub name: String,

    /// Measurement unit
    pub measurement_unit: String,

    /// Total amount across all cart recipes
    pub total: i64,
}

impl ShoppingListItem {
    /// Presentation label: "name (unit)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.measurement_unit)
    }
}

/// Aggregates the user's cart into ingredient totals
///
/// Sums `recipe_ingredients.amount` across every recipe in the user's
/// shopping cart, grouped by (ingredient name, measurement unit). An empty
/// cart yields an empty list.
pub async fn shopping_list(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<ShoppingListItem>, sqlx::Error> {
    sqlx::query_as::<_, ShoppingListItem>(
        r#"
        SELECT i.name, i.measurement_unit, SUM(ri.amount)::BIGINT AS total
        FROM shopping_cart sc
        JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE sc.user_id = $1
        GROUP BY i.name, i.measurement_unit
        ORDER BY i.name, i.measurement_unit
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Renders the shopping list as the plain-text attachment body
///
/// ```text
/// Shopping list:
///
/// Date: 2024-05-01
///
/// - Flour (g): 150
/// - Sugar (g): 10
/// ```
pub fn render_shopping_list(items: &[ShoppingListItem], date: NaiveDate) -> String {
    let mut content = format!("Shopping list:\n\nDate: {}\n\n", date.format("%Y-%m-%d"));

    for item in items {
        content.push_str(&format!("- {}: {}\n", item.label(), item.total));
    }

    content
}
