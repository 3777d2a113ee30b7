use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use guessthecraft::{
    catalog::{
        models::{ItemRecord, RecipeRecord, RecipeResultRecord},
        Item, ItemId, Recipe,
    },
    render::JsonGridRenderer,
    session::SessionTiming,
    stats::{InMemoryStatsRepository, PlayerStats, StatsRepository},
    AppState, ChannelHub, RecipeCatalog, RecipeSource, StatsAggregator,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// Draws recipes in a fixed order so simulated players know the answer;
/// falls back to the stick once the queue runs dry
pub struct ScriptedRecipes {
    catalog: RecipeCatalog,
    queue: Mutex<VecDeque<&'static str>>,
}

impl RecipeSource for ScriptedRecipes {
    fn draw_recipe(&self) -> Option<Recipe> {
        let key = self.queue.lock().unwrap().pop_front().unwrap_or(STICK);
        self.catalog.recipe(key).cloned()
    }

    fn resolve_item(&self, id: ItemId) -> Item {
        self.catalog.resolve_item(id)
    }
}

pub const STICK: &str = "280";
pub const CRAFTING_TABLE: &str = "58";

fn workbench_catalog() -> RecipeCatalog {
    let items = vec![
        ItemRecord {
            id: 5,
            name: "oak_planks".to_string(),
            display_name: "Oak Planks".to_string(),
        },
        ItemRecord {
            id: 280,
            name: "stick".to_string(),
            display_name: "Stick".to_string(),
        },
        ItemRecord {
            id: 58,
            name: "crafting_table".to_string(),
            display_name: "Crafting Table".to_string(),
        },
    ];
    let translations = HashMap::from([("stick".to_string(), "Bâton".to_string())]);
    let recipes = HashMap::from([
        (
            STICK.to_string(),
            vec![RecipeRecord {
                in_shape: Some(vec![vec![Some(5)], vec![Some(5)]]),
                result: RecipeResultRecord { id: 280, count: 4 },
            }],
        ),
        (
            CRAFTING_TABLE.to_string(),
            vec![RecipeRecord {
                in_shape: Some(vec![vec![Some(5), Some(5)], vec![Some(5), Some(5)]]),
                result: RecipeResultRecord { id: 58, count: 1 },
            }],
        ),
    ]);

    RecipeCatalog::new(items, translations, recipes, "Images").expect("valid catalog")
}

pub struct TestSetup {
    pub state: AppState,
    pub hub: ChannelHub,
    pub repository: Arc<InMemoryStatsRepository>,
}

impl TestSetup {
    pub async fn stats_of(&self, player_id: &str) -> PlayerStats {
        self.repository
            .get_player_stats(player_id)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("no stats for player {}", player_id))
    }
}

pub struct TestSetupBuilder {
    round_duration: Duration,
    recipe_sequence: Vec<&'static str>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            round_duration: Duration::from_millis(300),
            recipe_sequence: Vec::new(),
        }
    }

    /// Recipe keys drawn one per round, in order
    pub fn with_recipe_sequence(mut self, keys: &[&'static str]) -> Self {
        self.recipe_sequence = keys.to_vec();
        self
    }

    pub fn build(self) -> TestSetup {
        let hub = ChannelHub::new();
        let repository = Arc::new(InMemoryStatsRepository::new());

        let state = AppState::new(
            Arc::new(ScriptedRecipes {
                catalog: workbench_catalog(),
                queue: Mutex::new(self.recipe_sequence.into_iter().collect()),
            }),
            Arc::new(JsonGridRenderer::new()),
            hub.clone(),
            Arc::new(StatsAggregator::new(repository.clone())),
            SessionTiming {
                round_duration: self.round_duration,
                inter_round_pause: Duration::from_millis(10),
                room_start_delay: Duration::from_millis(10),
            },
            3,
        );

        TestSetup {
            state,
            hub,
            repository,
        }
    }
}
