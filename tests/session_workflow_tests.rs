use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use guessthecraft::{
    build_router,
    session::{SessionConfig, SessionKind},
    stats::{GameOutcome, StatsRepository},
    transport::{AnnouncementKind, OutboundEvent, Player},
};
use tower::ServiceExt; // for `oneshot`

mod utils;

use utils::*;

fn says(channel: &'static str, player: &'static str, content: &'static str) -> Answer {
    Answer::Says {
        channel,
        player,
        content,
    }
}

#[tokio::test]
async fn solo_game_follows_the_recipe_of_each_round() {
    let setup = TestSetupBuilder::new()
        .with_recipe_sequence(&[STICK, CRAFTING_TABLE, STICK])
        .build();
    let config = SessionConfig::solo(
        Player::new("1", "alice"),
        "solo",
        3,
        setup.state.timing.round_duration,
    )
    .unwrap();

    let players = answer_rounds(
        setup.hub.clone(),
        setup.hub.subscribe_channel("solo").await,
        vec![
            vec![says("solo", "1", "planks"), says("solo", "1", "  STICK ")],
            // Last round's answer no longer counts
            vec![says("solo", "1", "stick")],
            vec![says("solo", "1", "Bâton")],
        ],
    );

    let summary = setup.state.coordinator().run(config).await;
    players.abort();

    assert_eq!(summary.kind, SessionKind::Solo);
    assert_eq!(summary.rounds_played, 3);
    let result = summary.result_for("1").unwrap();
    assert_eq!(result.score, 2);
    assert_eq!(result.outcome, GameOutcome::Win);
    assert!(summary.warnings.is_empty());

    let stats = setup.stats_of("1").await;
    assert_eq!(stats.total_games_played, 1);
    assert_eq!(stats.total_wins, 1);
    assert_eq!(stats.total_rounds_played, 3);
    assert_eq!(stats.total_wins_rounds, 2);
    assert_eq!(stats.total_losses_rounds, 1);
    assert_eq!(stats.current_win_streak_round, 1);
    assert_eq!(stats.longest_loss_streak_round, 1);
    assert_eq!(stats.total_guesses, 4);
    assert_eq!(stats.total_good_guesses, 2);
    assert_eq!(stats.total_bad_guesses, 2);
}

#[tokio::test]
async fn duel_started_over_http_ends_in_a_draw() {
    let setup = TestSetupBuilder::new().build();
    let players = answer_rounds(
        setup.hub.clone(),
        setup.hub.subscribe_channel("duel").await,
        vec![
            vec![says("duel", "1", "stick")],
            vec![says("duel", "2", "stick")],
        ],
    );

    let request = Request::builder()
        .method("POST")
        .uri("/games/duel")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{
                "challenger": {"player_id": "1", "username": "alice"},
                "opponent": {"player_id": "2", "username": "bob"},
                "channel_id": "duel",
                "rounds": 2
            }"#,
        ))
        .unwrap();
    let response = build_router(setup.state.clone())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // The session runs in the background; wait for both commits
    let mut committed = false;
    for _ in 0..100 {
        let alice = setup.repository.get_player_stats("1").await.unwrap();
        let bob = setup.repository.get_player_stats("2").await.unwrap();
        if alice.is_some_and(|s| s.total_games_played == 1)
            && bob.is_some_and(|s| s.total_games_played == 1)
        {
            committed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    players.abort();
    assert!(committed, "duel never finished");

    for player_id in ["1", "2"] {
        let stats = setup.stats_of(player_id).await;
        assert_eq!(stats.total_draws, 1);
        assert_eq!(stats.total_wins, 0);
        assert_eq!(stats.total_losses, 0);
        assert_eq!(stats.total_wins_rounds, 1);
        assert_eq!(stats.total_losses_rounds, 1);
    }

    let request = Request::builder()
        .uri("/players/2")
        .body(Body::empty())
        .unwrap();
    let response = build_router(setup.state.clone())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn room_merges_answers_from_channel_and_thread() {
    let setup = TestSetupBuilder::new().build();
    let config = SessionConfig::room(
        vec![
            Player::new("a", "alice"),
            Player::new("b", "bob"),
            Player::new("c", "carol"),
        ],
        4,
        "room",
        Some("room-thread".to_string()),
        3,
        setup.state.timing.round_duration,
    )
    .unwrap();

    let mut channel = setup.hub.subscribe_channel("room").await;
    let players = answer_rounds(
        setup.hub.clone(),
        setup.hub.subscribe_channel("room-thread").await,
        vec![
            // An outsider answering first does not take the round
            vec![
                says("room", "x", "stick"),
                says("room", "a", "stick"),
                says("room-thread", "b", "stick"),
            ],
            vec![says("room-thread", "b", "stick"), says("room", "a", "stick")],
            vec![says("room-thread", "c", "nope"), says("room-thread", "a", "stick")],
        ],
    );

    let summary = setup.state.coordinator().run(config).await;
    players.abort();

    let ranking: Vec<(&str, u32)> = summary
        .ranking
        .iter()
        .map(|entry| (entry.player.id.as_str(), entry.score))
        .collect();
    assert_eq!(ranking, vec![("a", 2), ("b", 1), ("c", 0)]);
    assert_eq!(summary.result_for("a").unwrap().outcome, GameOutcome::Win);
    assert_eq!(summary.result_for("b").unwrap().outcome, GameOutcome::Lose);
    assert_eq!(summary.result_for("c").unwrap().outcome, GameOutcome::Lose);

    let carol = setup.stats_of("c").await;
    assert_eq!(carol.total_losses_rounds, 3);
    assert_eq!(carol.total_bad_guesses, 1);
    assert!(setup.repository.get_player_stats("x").await.unwrap().is_none());

    // Start and result go to the main channel, rounds to the thread
    let mut kinds = Vec::new();
    while let Ok(event) = channel.try_recv() {
        if let OutboundEvent::Announced { announcement, .. } = event {
            kinds.push(announcement.kind);
        }
    }
    assert_eq!(
        kinds,
        vec![
            AnnouncementKind::SessionStarting,
            AnnouncementKind::SessionResult,
            AnnouncementKind::SessionSummary,
        ]
    );
}
