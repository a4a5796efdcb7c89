//! Services behind each endpoint group.
//!
//! Managers take raw JSON, clean it with the operation's explicit cleaning map, validate
//! the result and call the stores. Anything that must stay consistent across the recipe
//! and spice stores is delegated to the [`SpiceBridge`](crate::bridge::SpiceBridge).

mod ingredients;
mod recipes;
mod spices;

pub use ingredients::IngredientManager;
pub use recipes::RecipeManager;
pub use spices::SpiceManager;
