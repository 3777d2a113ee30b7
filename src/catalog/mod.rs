// Public API
pub use errors::CatalogError;
pub use models::{Item, ItemId, Recipe, RecipeShape};
pub use service::RecipeCatalog;

// Internal modules
mod errors;
pub mod models;
mod service;

#[cfg(test)]
pub(crate) use service::tests::sample_catalog;

/// Where rounds get their recipes from
///
/// The catalog draws at random; tests substitute scripted sequences.
pub trait RecipeSource: Send + Sync {
    /// Returns a recipe with a playable shape, or None when none is available
    fn draw_recipe(&self) -> Option<Recipe>;

    fn resolve_item(&self, id: ItemId) -> Item;
}
