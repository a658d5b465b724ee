pub mod favorites;
pub mod ingredients;
pub mod recipe_ingredients;
pub mod recipe_short_urls;
pub mod recipe_tags;
pub mod recipes;
pub mod shopping_cart_items;
pub mod subscriptions;
pub mod tags;
pub mod users;

pub use favorites::Entity as Favorites;
pub use ingredients::Entity as Ingredients;
pub use recipe_ingredients::Entity as RecipeIngredients;
pub use recipe_short_urls::Entity as RecipeShortUrls;
pub use recipe_tags::Entity as RecipeTags;
pub use recipes::Entity as Recipes;
pub use shopping_cart_items::Entity as ShoppingCartItems;
pub use subscriptions::Entity as Subscriptions;
pub use tags::Entity as Tags;
pub use users::Entity as Users;
