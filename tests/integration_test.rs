use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use techingo::api;
use techingo::protocol::{ClientMessage, PlayerView, PublicGame, ServerMessage};
use techingo::state::{AppState, ClaimResult, RevealOutcome};
use techingo::types::{ClueDraft, GameConfig, GameStatus, Player};
use techingo::ws::handlers::handle_message;
use tower::ServiceExt;

/// State whose timers never fire during a test; reveals are driven by hand
fn manual_state() -> Arc<AppState> {
    Arc::new(AppState::with_config(
        GameConfig {
            reveal_interval_secs: 3600,
            ..GameConfig::default()
        },
        None,
    ))
}

fn languages() -> Vec<ClueDraft> {
    [
        ("Rust", "Memory safety without a garbage collector"),
        ("Go", "Goroutines and channels"),
        ("Python", "Significant whitespace and batteries included"),
        ("Haskell", "Lazy and purely functional"),
        ("Erlang", "Let it crash"),
        ("C", "The language of the Unix kernel"),
        ("Java", "Write once, run anywhere"),
        ("Ruby", "Rails was built with it"),
    ]
    .into_iter()
    .map(|(answer, text)| ClueDraft::new(answer, text))
    .collect()
}

/// Id of the cell on the player's ticket that carries the given clue
fn cell_for_clue(player: &Player, clue_id: u32) -> usize {
    player
        .ticket
        .cells()
        .find(|c| c.clue_id == Some(clue_id))
        .map(|c| c.id)
        .expect("3x3 ticket holds every clue of an 8-clue pool")
}

/// End-to-end flow: create, join, start, mark, failed claim, complete a row, win
#[tokio::test]
async fn test_full_game_flow() {
    let state = manual_state();

    // 1. Create a 3x3 game with exactly 8 clues
    let game = state
        .create_game(languages(), "Programming Languages", 3)
        .await
        .expect("8 clues fill a 3x3 ticket");
    assert_eq!(game.status, GameStatus::Lobby);

    // 2. Join one player
    let player = state
        .join_game("Alice", &game.game_code)
        .await
        .expect("Join should succeed");
    assert_eq!(player.ticket.size(), 3);
    assert!(player.ticket.is_complete());

    // 3. Start: clue #1 is revealed right away
    state.start_game().await.expect("Start should succeed");
    let running = state.get_game().await.unwrap();
    assert_eq!(running.status, GameStatus::InProgress);
    assert_eq!(running.revealed_clues.len(), 1);
    let epoch = running.timer_epoch;

    // 4. Mark the cell matching the first clue
    let first_cell = cell_for_clue(&player, running.revealed_clues[0].id);
    state.mark_cell(&player.id, first_cell).await;
    let alice = state.get_player(&player.id).await.unwrap();
    assert_eq!(alice.score, 10);
    assert!(!alice.can_claim_bingo);

    // 5. Claiming now fails and changes nothing
    let before = state.get_game().await.unwrap();
    assert_eq!(state.claim_bingo(&player.id).await, ClaimResult::NotEligible);
    let after = state.get_game().await.unwrap();
    assert_eq!(after.players, before.players);
    assert_eq!(after.status, GameStatus::InProgress);

    // 6. Reveal everything, then complete the row containing the first mark
    for _ in 1..8 {
        assert!(matches!(
            state.reveal_next_clue(epoch).await,
            RevealOutcome::Revealed { .. }
        ));
    }
    let row = first_cell / 3;
    let mut marks = 1;
    for cell in row * 3..row * 3 + 3 {
        let is_free = alice.ticket.cell(cell).unwrap().is_free_space;
        if cell != first_cell && !is_free {
            state.mark_cell(&player.id, cell).await;
            marks += 1;
        }
    }
    let alice = state.get_player(&player.id).await.unwrap();
    assert!(alice.can_claim_bingo);
    assert_eq!(alice.score, 10 * marks);

    // 7. Claim succeeds
    match state.claim_bingo(&player.id).await {
        ClaimResult::Won { winner, .. } => {
            assert_eq!(winner.id, player.id);
            assert_eq!(winner.score, 10 * marks + 100);
        }
        other => panic!("Expected win, got {:?}", other),
    }
    let finished = state.get_game().await.unwrap();
    assert_eq!(finished.status, GameStatus::Finished);
    assert_eq!(finished.winner.unwrap().id, player.id);
    assert!(!state.timers_active());
}

/// Scores [30, 30, 10] in join order [A, B, C]: A wins at exhaustion
#[tokio::test]
async fn test_exhaustion_tie_break() {
    let state = manual_state();
    let game = state.create_game(languages(), "Languages", 3).await.unwrap();

    let mut players = Vec::new();
    for name in ["A", "B", "C"] {
        players.push(state.join_game(name, &game.game_code).await.unwrap());
    }
    state.start_game().await.unwrap();
    let epoch = state.get_game().await.unwrap().timer_epoch;
    for _ in 1..8 {
        state.reveal_next_clue(epoch).await;
    }

    // Three marks each for A and B, one for C
    let plan: [&[u32]; 3] = [&[0, 1, 2], &[0, 1, 2], &[0]];
    for (player, clue_ids) in players.iter().zip(plan) {
        for clue_id in clue_ids {
            state
                .mark_cell(&player.id, cell_for_clue(player, *clue_id))
                .await;
        }
    }

    // Nobody claims, even if a pattern happened to form
    let scores: Vec<u32> = state
        .get_game()
        .await
        .unwrap()
        .players
        .iter()
        .map(|p| p.score)
        .collect();
    assert_eq!(scores, vec![30, 30, 10]);

    let outcome = state.reveal_next_clue(epoch).await;
    match outcome {
        RevealOutcome::Finished { winner } => {
            assert_eq!(winner.unwrap().name, "A");
        }
        other => panic!("Expected exhaustion, got {:?}", other),
    }
    let game = state.get_game().await.unwrap();
    assert_eq!(game.status, GameStatus::Finished);
    assert_eq!(game.winner.unwrap().name, "A");
}

/// The only player leaving tears the session down
#[tokio::test]
async fn test_leave_empties_session() {
    let state = manual_state();
    let code = match handle_message(
        ClientMessage::CreateGame {
            topic: "Languages".to_string(),
            grid_size: 3,
            clues: Some(languages()),
        },
        &state,
    )
    .await
    {
        Some(ServerMessage::GameCreated { game }) => game.game_code,
        other => panic!("Expected GameCreated, got {:?}", other),
    };

    let player_id = match handle_message(
        ClientMessage::JoinGame {
            name: "Solo".to_string(),
            code,
        },
        &state,
    )
    .await
    {
        Some(ServerMessage::Joined { player }) => player.player.id,
        other => panic!("Expected Joined, got {:?}", other),
    };
    handle_message(ClientMessage::StartGame, &state).await;
    assert!(state.timers_active());

    let mut rx = state.broadcast.subscribe();
    handle_message(ClientMessage::LeaveGame { player_id }, &state).await;

    assert!(state.get_game().await.is_none());
    assert!(!state.timers_active());
    assert!(matches!(rx.recv().await, Ok(ServerMessage::PlayerLeft { remaining: 0, .. })));
    assert!(matches!(rx.recv().await, Ok(ServerMessage::GameDiscarded)));
}

/// A join queued behind the last leave must not land in the discarded session
#[tokio::test]
async fn test_join_racing_last_leave_is_rejected() {
    let state = manual_state();
    let game = state.create_game(languages(), "Languages", 3).await.unwrap();
    let solo = state.join_game("Solo", &game.game_code).await.unwrap();
    state.start_game().await.unwrap();
    let mut rx = state.broadcast.subscribe();

    // Hold the session so both requests queue up in order
    let guard = state.game.write().await;
    let leave = tokio::spawn({
        let state = state.clone();
        async move {
            handle_message(ClientMessage::LeaveGame { player_id: solo.id }, &state).await
        }
    });
    tokio::task::yield_now().await;
    let join = tokio::spawn({
        let state = state.clone();
        let code = game.game_code.clone();
        async move {
            handle_message(
                ClientMessage::JoinGame {
                    name: "Late".to_string(),
                    code,
                },
                &state,
            )
            .await
        }
    });
    tokio::task::yield_now().await;
    drop(guard);

    assert!(leave.await.unwrap().is_none());
    match join.await.unwrap() {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "NO_ACTIVE_GAME"),
        other => panic!("Expected NO_ACTIVE_GAME, got {:?}", other),
    }

    assert!(state.get_game().await.is_none());
    assert!(!state.timers_active());
    assert!(matches!(rx.recv().await, Ok(ServerMessage::PlayerLeft { remaining: 0, .. })));
    assert!(matches!(rx.recv().await, Ok(ServerMessage::GameDiscarded)));
    while let Ok(msg) = rx.try_recv() {
        assert!(!matches!(msg, ServerMessage::PlayerJoined { .. }));
    }
}

/// The join reply always carries the joiner's ticket
#[tokio::test]
async fn test_join_reply_carries_ticket() {
    let state = manual_state();
    let game = state.create_game(languages(), "Languages", 3).await.unwrap();

    let reply = handle_message(
        ClientMessage::JoinGame {
            name: "Alice".to_string(),
            code: game.game_code.to_lowercase(),
        },
        &state,
    )
    .await;
    let view = match reply {
        Some(ServerMessage::Joined { player }) => player,
        other => panic!("Expected Joined, got {:?}", other),
    };
    assert_eq!(view.player.name, "Alice");
    assert_eq!(view.game_code, game.game_code);
    let stored = state.get_player(&view.player.id).await.unwrap();
    assert_eq!(view.ticket.len(), stored.ticket.size());
}

/// A rejected claim leaves score, status and roster untouched
#[tokio::test]
async fn test_claim_gating() {
    let state = manual_state();
    let game = state.create_game(languages(), "Languages", 3).await.unwrap();
    let alice = state.join_game("Alice", &game.game_code).await.unwrap();
    let bob = state.join_game("Bob", &game.game_code).await.unwrap();
    state.start_game().await.unwrap();
    state
        .mark_cell(&alice.id, cell_for_clue(&alice, 0))
        .await;

    let before = state.get_game().await.unwrap();
    for id in [&alice.id, &bob.id] {
        let result = handle_message(
            ClientMessage::ClaimBingo {
                player_id: id.clone(),
            },
            &state,
        )
        .await;
        assert!(matches!(result, Some(ServerMessage::ClaimRejected { .. })));
    }
    let after = state.get_game().await.unwrap();

    assert_eq!(after.players, before.players);
    assert_eq!(after.status, before.status);
    assert_eq!(after.version, before.version);
    assert!(after.winner.is_none());
}

fn app(state: Arc<AppState>) -> Router {
    Router::new().merge(api::routes()).with_state(state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_http_state_endpoint() {
    let state = manual_state();

    let (status, json) = get_json(app(state.clone()), "/api/state").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.is_null());

    state.create_game(languages(), "Languages", 3).await.unwrap();
    let (status, json) = get_json(app(state.clone()), "/api/state").await;
    assert_eq!(status, StatusCode::OK);
    let game: PublicGame = serde_json::from_value(json).unwrap();
    assert_eq!(game.topic, "Languages");
    assert_eq!(game.status, GameStatus::Lobby);
    assert_eq!(game.total_clues, 8);
}

#[tokio::test]
async fn test_http_topics_endpoint() {
    let (status, json) = get_json(app(manual_state()), "/api/topics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!json["topics"].as_array().unwrap().is_empty());
    assert_eq!(json["providers"], serde_json::json!([]));
    assert_eq!(json["min_grid_size"], 3);
    assert_eq!(json["max_grid_size"], 7);
}

#[tokio::test]
async fn test_http_player_endpoint() {
    let state = manual_state();
    let game = state.create_game(languages(), "Languages", 3).await.unwrap();
    let alice = state.join_game("Alice", &game.game_code).await.unwrap();

    let (status, json) = get_json(app(state.clone()), &format!("/api/players/{}", alice.id)).await;
    assert_eq!(status, StatusCode::OK);
    let view: PlayerView = serde_json::from_value(json).unwrap();
    assert_eq!(view.player.name, "Alice");
    assert_eq!(view.ticket.len(), 3);
    assert!(view.ticket[1][1].as_ref().unwrap().is_free_space);

    let (status, _) = get_json(app(state), "/api/players/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
