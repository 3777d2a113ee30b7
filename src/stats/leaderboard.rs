use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumString};
use tracing::debug;

use super::{
    models::{LeaderboardEntry, LeaderboardMetric, LEADERBOARD_PAGE_SIZE},
    service::StatsAggregator,
    StatsError,
};

/// Buttons of the leaderboard view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaderboardAction {
    Open,
    /// Previous metric
    Left,
    /// Next metric
    Right,
    /// Previous page
    Up,
    /// Next page
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub metric: LeaderboardMetric,
    pub title: String,
    pub offset: i64,
    pub entries: Vec<LeaderboardEntry>,
    pub can_page_up: bool,
    pub can_page_down: bool,
}

/// Navigation state of one leaderboard interaction
///
/// Owned by whoever drives the interaction (one per WebSocket connection), so
/// two viewers never share a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardBrowser {
    metric: LeaderboardMetric,
    offset: i64,
    last_page_len: usize,
}

impl Default for LeaderboardBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardBrowser {
    pub fn new() -> Self {
        Self {
            metric: LeaderboardMetric::Wins,
            offset: 0,
            last_page_len: 0,
        }
    }

    pub fn metric(&self) -> LeaderboardMetric {
        self.metric
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Moves the cursor and fetches the page it now points at
    ///
    /// Changing metric goes back to the first page. Paging beyond either end
    /// leaves the cursor where it was.
    pub async fn navigate(
        &mut self,
        action: LeaderboardAction,
        aggregator: &StatsAggregator,
    ) -> Result<LeaderboardPage, StatsError> {
        match action {
            LeaderboardAction::Open => {
                self.metric = LeaderboardMetric::Wins;
                self.offset = 0;
            }
            LeaderboardAction::Left => {
                self.metric = cycle_metric(self.metric, -1);
                self.offset = 0;
            }
            LeaderboardAction::Right => {
                self.metric = cycle_metric(self.metric, 1);
                self.offset = 0;
            }
            LeaderboardAction::Up => {
                self.offset = (self.offset - LEADERBOARD_PAGE_SIZE).max(0);
            }
            LeaderboardAction::Down => {
                if self.has_next_page() {
                    let next_offset = self.offset + LEADERBOARD_PAGE_SIZE;
                    let entries = aggregator.leaderboard(next_offset, self.metric).await?;
                    if !entries.is_empty() {
                        self.offset = next_offset;
                        return Ok(self.page(entries));
                    }
                    // The previous page was exactly full and nothing follows it
                    let entries = aggregator.leaderboard(self.offset, self.metric).await?;
                    let mut page = self.page(entries);
                    page.can_page_down = false;
                    return Ok(page);
                }
            }
        }

        let entries = aggregator.leaderboard(self.offset, self.metric).await?;
        Ok(self.page(entries))
    }

    fn has_next_page(&self) -> bool {
        self.last_page_len as i64 == LEADERBOARD_PAGE_SIZE
    }

    fn page(&mut self, entries: Vec<LeaderboardEntry>) -> LeaderboardPage {
        self.last_page_len = entries.len();
        debug!(
            metric = %self.metric,
            offset = self.offset,
            entries = entries.len(),
            "Leaderboard page fetched"
        );

        LeaderboardPage {
            metric: self.metric,
            title: self.metric.title().to_string(),
            offset: self.offset,
            can_page_up: self.offset > 0,
            can_page_down: self.has_next_page(),
            entries,
        }
    }
}

fn cycle_metric(current: LeaderboardMetric, step: i64) -> LeaderboardMetric {
    let metrics: Vec<LeaderboardMetric> = LeaderboardMetric::iter().collect();
    let len = metrics.len() as i64;
    let index = metrics
        .iter()
        .position(|metric| *metric == current)
        .unwrap_or_default() as i64;
    metrics[(index + step).rem_euclid(len) as usize]
}
