pub mod auth_service;
pub mod cart_service;
pub mod favorite_service;
pub mod ingredient_service;
pub mod recipe_service;
pub mod short_link_service;
pub mod subscription_service;
pub mod tag_service;
pub mod user_service;
