use serde::{Deserialize, Serialize};

pub type ItemId = u32;

/// Sparse recipe pattern: rows of optional item ids, as authored in the data files
pub type RecipeShape = Vec<Vec<Option<ItemId>>>;

pub const UNKNOWN_ITEM_NAME: &str = "unknown";
pub const UNKNOWN_ITEM_DISPLAY_NAME: &str = "unknown item";

/// Item metadata resolved from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub internal_name: String,
    pub display_name: String,
    pub localized_display_name: String,
    pub image_ref: String,
}

impl Item {
    /// Placeholder returned for ids missing from the catalog
    pub fn unknown(id: ItemId, image_ref: String) -> Self {
        Self {
            id,
            internal_name: UNKNOWN_ITEM_NAME.to_string(),
            display_name: UNKNOWN_ITEM_DISPLAY_NAME.to_string(),
            localized_display_name: UNKNOWN_ITEM_DISPLAY_NAME.to_string(),
            image_ref,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_unknown(&self) -> bool {
        self.internal_name == UNKNOWN_ITEM_NAME
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Key of the recipe in the catalog (the result id as written in recipes.json)
    pub key: String,
    pub shape: Option<RecipeShape>,
    pub result: Item,
}

impl Recipe {
    /// A recipe can be played only when it has a shape containing at least one item
    pub fn is_valid(&self) -> bool {
        self.shape
            .as_ref()
            .is_some_and(|shape| shape.iter().flatten().any(|cell| cell.is_some()))
    }
}

/// Raw entry of items.json
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Raw entry of recipes.json
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeRecord {
    #[serde(rename = "inShape", default)]
    pub in_shape: Option<RecipeShape>,
    pub result: RecipeResultRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeResultRecord {
    pub id: ItemId,
    #[serde(default)]
    /// Part of the data format, the quantity is not guessed
    pub count: u32,
}
