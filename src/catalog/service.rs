use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use super::{
    errors::CatalogError,
    models::{Item, ItemId, ItemRecord, Recipe, RecipeRecord, UNKNOWN_ITEM_NAME},
    RecipeSource,
};

pub const ITEMS_FILE: &str = "items.json";
pub const RECIPES_FILE: &str = "recipes.json";
pub const TRANSLATIONS_FILE: &str = "fr.json";

/// Read-only lookup of items and recipes, loaded once at startup
#[derive(Debug, Clone)]
pub struct RecipeCatalog {
    items: HashMap<ItemId, Item>,
    recipes: Vec<Recipe>,
    images_dir: PathBuf,
}

impl RecipeCatalog {
    /// Builds the catalog from already-parsed data files.
    ///
    /// Only the first variant registered for each recipe key is kept. Fails when
    /// no recipe has a playable shape, since selection would never terminate.
    pub fn new(
        item_records: Vec<ItemRecord>,
        translations: HashMap<String, String>,
        recipe_records: HashMap<String, Vec<RecipeRecord>>,
        images_dir: impl Into<PathBuf>,
    ) -> Result<Self, CatalogError> {
        let images_dir = images_dir.into();

        let items: HashMap<ItemId, Item> = item_records
            .into_iter()
            .map(|record| {
                let localized = translations
                    .get(&record.name)
                    .cloned()
                    .unwrap_or_else(|| record.display_name.clone());
                let item = Item {
                    id: record.id,
                    image_ref: image_path(&images_dir, &record.name),
                    internal_name: record.name,
                    display_name: record.display_name,
                    localized_display_name: localized,
                };
                (item.id, item)
            })
            .collect();

        let mut catalog = Self {
            items,
            recipes: Vec::new(),
            images_dir,
        };

        let mut keys: Vec<String> = recipe_records.keys().cloned().collect();
        keys.sort();

        for key in keys {
            let Some(first) = recipe_records.get(&key).and_then(|variants| variants.first()) else {
                continue;
            };
            let result = catalog.resolve_item(first.result.id);
            catalog.recipes.push(Recipe {
                key,
                shape: first.in_shape.clone(),
                result,
            });
        }

        if !catalog.recipes.iter().any(Recipe::is_valid) {
            return Err(CatalogError::NoValidRecipe);
        }

        info!(
            items = catalog.items.len(),
            recipes = catalog.recipes.len(),
            "Recipe catalog ready"
        );

        Ok(catalog)
    }

    /// Loads items.json, recipes.json and fr.json from `data_dir`
    #[instrument(skip_all, fields(data_dir = %data_dir.as_ref().display()))]
    pub async fn load(
        data_dir: impl AsRef<Path>,
        images_dir: impl Into<PathBuf>,
    ) -> Result<Self, CatalogError> {
        let data_dir = data_dir.as_ref();

        let items: Vec<ItemRecord> = read_json(&data_dir.join(ITEMS_FILE)).await?;
        let recipes: HashMap<String, Vec<RecipeRecord>> =
            read_json(&data_dir.join(RECIPES_FILE)).await?;
        let translations: HashMap<String, String> =
            read_json(&data_dir.join(TRANSLATIONS_FILE)).await?;

        Self::new(items, translations, recipes, images_dir)
    }

    /// Never fails: ids missing from items.json resolve to the "unknown item" sentinel
    pub fn resolve_item(&self, id: ItemId) -> Item {
        match self.items.get(&id) {
            Some(item) => item.clone(),
            None => {
                debug!(item_id = id, "Unknown item id, using sentinel");
                Item::unknown(id, image_path(&self.images_dir, UNKNOWN_ITEM_NAME))
            }
        }
    }

    /// Shuffles the recipe order and returns the first recipe with a playable shape
    pub fn select_random_valid_recipe<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Recipe> {
        let mut order: Vec<usize> = (0..self.recipes.len()).collect();
        order.shuffle(rng);

        order
            .into_iter()
            .map(|index| &self.recipes[index])
            .find(|recipe| recipe.is_valid())
    }

    pub fn recipe(&self, key: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.key == key)
    }

    #[cfg(test)]
    pub(crate) fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}

impl RecipeSource for RecipeCatalog {
    fn draw_recipe(&self) -> Option<Recipe> {
        let mut rng = rand::rng();
        self.select_random_valid_recipe(&mut rng).cloned()
    }

    fn resolve_item(&self, id: ItemId) -> Item {
        RecipeCatalog::resolve_item(self, id)
    }
}

fn image_path(images_dir: &Path, internal_name: &str) -> String {
    images_dir
        .join(format!("{}.png", internal_name))
        .to_string_lossy()
        .into_owned()
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let display = path.display().to_string();
    let raw = tokio::fs::read(path).await.map_err(|source| CatalogError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| CatalogError::Parse {
        path: display,
        source,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub(crate) fn item(id: ItemId, name: &str, display_name: &str) -> ItemRecord {
        ItemRecord {
            id,
            name: name.to_string(),
            display_name: display_name.to_string(),
        }
    }

    fn shaped(shape: Vec<Vec<Option<ItemId>>>, result: ItemId) -> RecipeRecord {
        RecipeRecord {
            in_shape: Some(shape),
            result: super::super::models::RecipeResultRecord { id: result, count: 1 },
        }
    }

    fn shapeless(result: ItemId) -> RecipeRecord {
        RecipeRecord {
            in_shape: None,
            result: super::super::models::RecipeResultRecord { id: result, count: 1 },
        }
    }

    /// Planks -> stick recipe plus a shapeless recipe that must never be drawn
    pub(crate) fn sample_catalog() -> RecipeCatalog {
        let items = vec![
            item(5, "oak_planks", "Oak Planks"),
            item(280, "stick", "Stick"),
            item(58, "crafting_table", "Crafting Table"),
            item(351, "dye", "Dye"),
        ];
        let translations = HashMap::from([
            ("stick".to_string(), "Bâton".to_string()),
            ("oak_planks".to_string(), "Planches de chêne".to_string()),
        ]);
        let recipes = HashMap::from([
            (
                "280".to_string(),
                vec![shaped(vec![vec![Some(5)], vec![Some(5)]], 280), shapeless(280)],
            ),
            (
                "58".to_string(),
                vec![shaped(
                    vec![vec![Some(5), Some(5)], vec![Some(5), Some(5)]],
                    58,
                )],
            ),
            ("351".to_string(), vec![shapeless(351)]),
        ]);

        RecipeCatalog::new(items, translations, recipes, "Images").unwrap()
    }

    #[test]
    fn resolves_known_item_with_translation() {
        let catalog = sample_catalog();
        let stick = catalog.resolve_item(280);

        assert_eq!(stick.display_name, "Stick");
        assert_eq!(stick.localized_display_name, "Bâton");
        assert_eq!(stick.internal_name, "stick");
        assert!(stick.image_ref.ends_with("stick.png"));
    }

    #[test]
    fn untranslated_item_falls_back_to_display_name() {
        let catalog = sample_catalog();
        let table = catalog.resolve_item(58);

        assert_eq!(table.localized_display_name, "Crafting Table");
    }

    #[test]
    fn unknown_item_resolves_to_sentinel() {
        let catalog = sample_catalog();
        let unknown = catalog.resolve_item(9999);

        assert!(unknown.is_unknown());
        assert_eq!(unknown.display_name, "unknown item");
        assert_eq!(unknown.internal_name, "unknown");
    }

    #[test]
    fn keeps_only_the_first_variant_per_key() {
        let catalog = sample_catalog();

        assert_eq!(catalog.recipe_count(), 3);
        assert!(catalog.recipe("280").unwrap().is_valid());
    }

    #[test]
    fn selection_never_returns_invalid_recipes() {
        let catalog = sample_catalog();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let recipe = catalog.select_random_valid_recipe(&mut rng).unwrap();
            assert!(recipe.is_valid());
            assert_ne!(recipe.key, "351");
        }
    }

    #[test]
    fn selection_reaches_every_valid_recipe() {
        let catalog = sample_catalog();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..200 {
            seen.insert(catalog.select_random_valid_recipe(&mut rng).unwrap().key.clone());
        }

        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn rejects_catalog_without_playable_recipe() {
        let recipes = HashMap::from([("351".to_string(), vec![shapeless(351)])]);
        let result = RecipeCatalog::new(
            vec![item(351, "dye", "Dye")],
            HashMap::new(),
            recipes,
            "Images",
        );

        assert!(matches!(result, Err(CatalogError::NoValidRecipe)));
    }

    #[tokio::test]
    async fn load_reports_missing_files() {
        let result = RecipeCatalog::load("/nonexistent/guessthecraft", "Images").await;

        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
