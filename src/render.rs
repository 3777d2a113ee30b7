use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::grid::NormalizedGrid;

pub const GRID_ATTACHMENT_NAME: &str = "crafting_grid.json";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to encode grid: {0}")]
    Encoding(String),

    #[error("Renderer unavailable: {0}")]
    Unavailable(String),
}

/// Turns a crafting grid into an attachment for the round announcement
#[async_trait]
pub trait GridRenderer: Send + Sync {
    async fn render(&self, grid: &NormalizedGrid) -> Result<Vec<u8>, RenderError>;

    /// File name the rendered bytes are attached under
    fn attachment_name(&self) -> &'static str;

    fn content_type(&self) -> &'static str;
}

/// Describes the grid as JSON so clients can draw it from the image references
#[derive(Debug, Default, Clone)]
pub struct JsonGridRenderer;

#[derive(Serialize)]
struct GridLayout<'a> {
    size: usize,
    cells: &'a NormalizedGrid,
}

impl JsonGridRenderer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GridRenderer for JsonGridRenderer {
    async fn render(&self, grid: &NormalizedGrid) -> Result<Vec<u8>, RenderError> {
        serde_json::to_vec(&GridLayout {
            size: crate::grid::GRID_SIZE,
            cells: grid,
        })
        .map_err(|e| RenderError::Encoding(e.to_string()))
    }

    fn attachment_name(&self) -> &'static str {
        GRID_ATTACHMENT_NAME
    }

    fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }
}
