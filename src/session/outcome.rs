use super::models::{PlayerResult, RankingEntry, SessionKind, SessionState};
use crate::stats::GameOutcome;

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// Players by descending score; equal scores keep join order
pub fn rank(state: &SessionState) -> Vec<RankingEntry> {
    let mut ranked: Vec<_> = state
        .players
        .iter()
        .map(|player| (player.clone(), state.score(&player.id)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, (player, score))| RankingEntry {
            place: index + 1,
            player,
            score,
        })
        .collect()
}

/// Session outcome of every participant, in ranking order
///
/// Solo: a win needs at least one point. Otherwise a unique top score wins
/// and everybody else loses; a shared top score is a draw for every tied
/// player and a loss for the rest.
pub fn decide(kind: SessionKind, ranking: &[RankingEntry]) -> Vec<PlayerResult> {
    let top_score = ranking.iter().map(|entry| entry.score).max().unwrap_or_default();
    let tied_at_top = ranking
        .iter()
        .filter(|entry| entry.score == top_score)
        .count();

    ranking
        .iter()
        .map(|entry| {
            let outcome = match kind {
                SessionKind::Solo if entry.score > 0 => GameOutcome::Win,
                SessionKind::Solo => GameOutcome::Lose,
                _ if entry.score < top_score => GameOutcome::Lose,
                _ if tied_at_top > 1 => GameOutcome::Draw,
                _ => GameOutcome::Win,
            };
            PlayerResult {
                player: entry.player.clone(),
                score: entry.score,
                outcome,
            }
        })
        .collect()
}

pub fn medal(place: usize) -> &'static str {
    place
        .checked_sub(1)
        .and_then(|index| MEDALS.get(index))
        .copied()
        .unwrap_or("")
}

/// Final standings as posted at the end of a game
pub fn format_ranking(ranking: &[RankingEntry]) -> String {
    let lines: Vec<String> = ranking
        .iter()
        .map(|entry| {
            format!(
                "{} {}: **{}** points",
                medal(entry.place),
                entry.player.mention(),
                entry.score
            )
            .trim_start()
            .to_string()
        })
        .collect();

    format!("🎉 **Game over! Results:**\n{}", lines.join("\n"))
}

/// Headline announcing who won the session
pub fn format_result(kind: SessionKind, results: &[PlayerResult]) -> String {
    if kind == SessionKind::Solo {
        return match results.first() {
            Some(result) if result.outcome == GameOutcome::Win => format!(
                "🎉 {} finished with **{}** points!",
                result.player.mention(),
                result.score
            ),
            Some(result) => format!(
                "😔 {} did not find any recipe this time.",
                result.player.mention()
            ),
            None => String::new(),
        };
    }

    let winners: Vec<&PlayerResult> = results
        .iter()
        .filter(|result| result.outcome == GameOutcome::Win)
        .collect();
    if let [winner] = winners.as_slice() {
        return format!(
            "🎉 {} won the game with **{}** points!",
            winner.player.mention(),
            winner.score
        );
    }

    let tied: Vec<&PlayerResult> = results
        .iter()
        .filter(|result| result.outcome == GameOutcome::Draw)
        .collect();
    let mentions: Vec<String> = tied.iter().map(|result| result.player.mention()).collect();
    format!(
        "🤝 It's a tie between {} with **{}** points each!",
        mentions.join(" and "),
        tied.first().map(|result| result.score).unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::models::SessionConfig;
    use crate::transport::Player;
    use std::time::Duration;

    fn state_with_scores(kind: SessionKind, scores: &[(&str, u32)]) -> SessionState {
        let players: Vec<Player> = scores.iter().map(|(id, _)| Player::new(*id, *id)).collect();
        let config = match kind {
            SessionKind::Solo => {
                SessionConfig::solo(players[0].clone(), "c", 3, Duration::from_secs(1))
            }
            SessionKind::Duel => SessionConfig::duel(
                players[0].clone(),
                players[1].clone(),
                "c",
                3,
                Duration::from_secs(1),
            ),
            SessionKind::Room => {
                SessionConfig::room(players, 10, "c", None, 3, Duration::from_secs(1))
            }
        }
        .unwrap();

        let mut state = SessionState::new(&config);
        for (id, score) in scores {
            state.scores.insert(id.to_string(), *score);
        }
        state
    }

    fn outcomes(kind: SessionKind, scores: &[(&str, u32)]) -> Vec<(String, GameOutcome)> {
        let state = state_with_scores(kind, scores);
        decide(kind, &rank(&state))
            .into_iter()
            .map(|result| (result.player.id, result.outcome))
            .collect()
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let state = state_with_scores(
            SessionKind::Room,
            &[("a", 1), ("b", 3), ("c", 1), ("d", 0)],
        );

        let ids: Vec<String> = rank(&state).into_iter().map(|e| e.player.id).collect();
        assert_eq!(ids, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn one_round_each_is_a_draw() {
        assert_eq!(
            outcomes(SessionKind::Duel, &[("a", 1), ("b", 1)]),
            vec![
                ("a".to_string(), GameOutcome::Draw),
                ("b".to_string(), GameOutcome::Draw)
            ]
        );
    }

    #[test]
    fn three_way_tie_draws_only_the_tied_players() {
        assert_eq!(
            outcomes(
                SessionKind::Room,
                &[("a", 2), ("b", 2), ("c", 0), ("d", 2)]
            ),
            vec![
                ("a".to_string(), GameOutcome::Draw),
                ("b".to_string(), GameOutcome::Draw),
                ("d".to_string(), GameOutcome::Draw),
                ("c".to_string(), GameOutcome::Lose)
            ]
        );
    }

    #[test]
    fn unique_top_score_wins() {
        assert_eq!(
            outcomes(SessionKind::Room, &[("a", 1), ("b", 3), ("c", 2)]),
            vec![
                ("b".to_string(), GameOutcome::Win),
                ("c".to_string(), GameOutcome::Lose),
                ("a".to_string(), GameOutcome::Lose)
            ]
        );
    }

    #[test]
    fn solo_needs_a_point_to_win() {
        assert_eq!(
            outcomes(SessionKind::Solo, &[("a", 0)]),
            vec![("a".to_string(), GameOutcome::Lose)]
        );
        assert_eq!(
            outcomes(SessionKind::Solo, &[("a", 2)]),
            vec![("a".to_string(), GameOutcome::Win)]
        );
    }

    #[test]
    fn medals_for_top_three() {
        let state = state_with_scores(
            SessionKind::Room,
            &[("a", 4), ("b", 3), ("c", 2), ("d", 1)],
        );

        let text = format_ranking(&rank(&state));

        assert!(text.contains("🥇 <@a>: **4** points"));
        assert!(text.contains("🥉 <@c>: **2** points"));
        assert!(text.contains("\n<@d>: **1** points"));
    }

    #[test]
    fn tie_headline_lists_every_tied_player() {
        let state = state_with_scores(SessionKind::Room, &[("a", 1), ("b", 1), ("c", 1)]);
        let results = decide(SessionKind::Room, &rank(&state));

        assert_eq!(
            format_result(SessionKind::Room, &results),
            "🤝 It's a tie between <@a> and <@b> and <@c> with **1** points each!"
        );
    }
}
