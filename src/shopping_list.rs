//! Aggregates the ingredients of every recipe in a user's cart into a
//! plain-text purchase list.

use std::collections::BTreeMap;

use sqlx::FromRow;

pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// One `recipe_ingredients` row of a recipe sitting in the cart.
#[derive(Debug, Clone, FromRow)]
pub struct CartIngredientRow {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    pub amount: i64,
    pub measurement_unit: String,
}

/// Totals keyed by ingredient name. The unit of the first occurrence wins.
#[derive(Debug, Default)]
pub struct ShoppingList {
    lines: BTreeMap<String, ShoppingListLine>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, measurement_unit: &str, amount: i32) {
        self.lines
            .entry(name.to_string())
            .and_modify(|line| line.amount += i64::from(amount))
            .or_insert_with(|| ShoppingListLine {
                amount: i64::from(amount),
                measurement_unit: measurement_unit.to_string(),
            });
    }

    pub(crate) fn len(&self) -> usize {
        self.lines.len()
    }

    /// `"<name>: <amount> <unit>"` lines sorted by name, joined with `\n`.
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|(name, line)| format!("{name}: {} {}", line.amount, line.measurement_unit))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FromIterator<CartIngredientRow> for ShoppingList {
    fn from_iter<I: IntoIterator<Item = CartIngredientRow>>(rows: I) -> Self {
        let mut list = ShoppingList::new();
        for row in rows {
            list.add(&row.name, &row.measurement_unit, row.amount);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, unit: &str, amount: i32) -> CartIngredientRow {
        CartIngredientRow {
            name: name.into(),
            measurement_unit: unit.into(),
            amount,
        }
    }

    #[test]
    fn sums_amounts_across_recipes() {
        // Recipe A: flour 200 g, egg 2 pcs. Recipe B: flour 100 g.
        let list: ShoppingList = vec![
            row("flour", "g", 200),
            row("egg", "pcs", 2),
            row("flour", "g", 100),
        ]
        .into_iter()
        .collect();

        assert_eq!(list.len(), 2);
        assert_eq!(list.lines.get("flour").map(|l| l.amount), Some(300));
        assert!(list.render().lines().any(|line| line == "flour: 300 g"));
    }

    #[test]
    fn renders_sorted_lines() {
        let list: ShoppingList = vec![row("sugar", "g", 50), row("butter", "g", 20)]
            .into_iter()
            .collect();
        assert_eq!(list.render(), "butter: 20 g\nsugar: 50 g");
    }

    #[test]
    fn empty_cart_renders_empty_body() {
        let list: ShoppingList = Vec::new().into_iter().collect();
        assert!(list.lines.is_empty());
        assert_eq!(list.render(), "");
    }

    #[test]
    fn first_unit_wins() {
        let mut list = ShoppingList::new();
        list.add("salt", "g", 5);
        list.add("salt", "pinch", 1);
        let line = list.lines.get("salt").unwrap();
        assert_eq!(line.amount, 6);
        assert_eq!(line.measurement_unit, "g");
    }

    #[test]
    fn large_totals_do_not_overflow_i32() {
        let mut list = ShoppingList::new();
        for _ in 0..100_000 {
            list.add("water", "ml", 32_000);
        }
        assert_eq!(list.lines.get("water").unwrap().amount, 3_200_000_000);
    }
}
