mod common;

use std::time::Duration;

use battle_core::{BattleOutcome, BattlePhase, Position};
use battle_runtime::{
    BattleError, ClickOutcome, DamageIndicator, Event, InteractionMode, PresentationEvent,
    RejectReason, Tone, Topic, TurnEvent,
};
use client_transport::{Endpoint, MockChannel, NetworkError};
use common::{entities, entity, lines, player_turn, presentation, session};
use serde_json::json;

#[tokio::test(start_paused = true)]
async fn ai_actions_replay_in_order_before_end_turn_returns() {
    let mock = MockChannel::new();
    let session = session(&mock);
    let _animator = session.spawn_animator();
    player_turn(&mock, &session).await;
    mock.respond(
        Endpoint::EndTurn,
        json!({
            "current_turn": "P1",
            "battle_state": "Ongoing",
            "narrative": "The bear lumbers forward.",
            "ai_actions": [
                {"actor_id": "E1", "action": "Move", "from": [5, 5], "to": [4, 4]},
                {"actor_id": "E1", "action": "Attack", "target": "P1", "damage": 5, "type": "Meat"}
            ]
        }),
    )
    .respond(
        Endpoint::Entities,
        entities(&[entity("P1", 3, 3, 2), entity("E1", 4, 4, 2)]),
    );
    let mut shown = session.subscribe(Topic::Presentation);
    let mut narration = session.subscribe(Topic::Narration);

    let state = session.turns().end_turn().await.unwrap();

    assert_eq!(state.phase, BattlePhase::PlayerTurn);
    assert_eq!(
        presentation(&mut shown),
        vec![
            PresentationEvent::MoveAnimated {
                actor: "E1".into(),
                destination: Position::new(4, 4),
                reached: true,
            },
            PresentationEvent::Indicator(DamageIndicator {
                position: Position::new(3, 3),
                amount: 5,
                tone: Tone::Red,
                label: None,
            }),
        ]
    );
    assert_eq!(
        lines(&mut narration),
        vec!["The bear lumbers forward.".to_string(), "Turn: P1".to_string()]
    );
    assert_eq!(
        mock.endpoints(),
        vec![
            Endpoint::BattleState,
            Endpoint::Entities,
            Endpoint::EndTurn,
            Endpoint::Entities,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_attack_skips_reconciliation() {
    let mock = MockChannel::new();
    let session = session(&mock);
    player_turn(&mock, &session).await;
    mock.respond(
        Endpoint::Attack,
        json!({"result": {"success": false, "message": "Out of range"}}),
    );
    let mut narration = session.subscribe(Topic::Narration);

    session.router().start_targeting("Physical").unwrap();
    let outcome = session.router().resolve_click(Position::new(5, 5)).await;

    assert_eq!(
        outcome,
        ClickOutcome::Failed {
            message: "Out of range".into()
        }
    );
    assert!(lines(&mut narration).contains(&"Attack Failed: Out of range".to_string()));
    assert_eq!(mock.count(Endpoint::Entities), 1);
    assert_eq!(session.router().mode(), InteractionMode::Normal);

    let attack = mock
        .calls()
        .into_iter()
        .find(|call| call.endpoint == Endpoint::Attack)
        .unwrap();
    assert_eq!(attack.body, Some(json!({"actor_id": "P1", "target_id": "E1"})));
}

#[tokio::test(start_paused = true)]
async fn victory_blocks_every_later_request() {
    let mock = MockChannel::new();
    let session = session(&mock);
    player_turn(&mock, &session).await;
    mock.respond(
        Endpoint::Attack,
        json!({
            "result": {"success": true, "mechanics": {"damage_amount": 7, "damage_type": "Meat"}},
            "battle_state": "Victory"
        }),
    )
    .respond_always(Endpoint::BattleState, json!({"current_turn": "P1"}))
    .respond_always(Endpoint::Entities, entities(&[entity("P1", 3, 3, 1)]));
    let mut turn_events = session.subscribe(Topic::Turn);

    session.router().start_targeting("Physical").unwrap();
    let outcome = session.router().resolve_click(Position::new(5, 5)).await;

    assert_eq!(outcome, ClickOutcome::Attacked { target: "E1".into() });
    assert_eq!(session.turns().phase(), BattlePhase::Victory);
    assert_eq!(session.turns().state().current_turn, None);
    assert!(
        common::drain(&mut turn_events)
            .contains(&Event::Turn(TurnEvent::BattleEnded(BattleOutcome::Victory)))
    );

    let calls_before = mock.calls().len();
    assert!(matches!(
        session.turns().end_turn().await,
        Err(BattleError::BattleOver {
            phase: BattlePhase::Victory
        })
    ));
    assert_eq!(
        session.router().resolve_click(Position::new(1, 1)).await,
        ClickOutcome::Rejected(RejectReason::BattleOver)
    );
    assert!(session.router().start_targeting("Physical").is_err());
    assert_eq!(mock.calls().len(), calls_before);
    assert_eq!(mock.count(Endpoint::EndTurn), 0);
}

#[tokio::test(start_paused = true)]
async fn concurrent_end_turns_send_one_request() {
    let mock = MockChannel::new();
    let session = session(&mock);
    player_turn(&mock, &session).await;
    mock.respond_always(Endpoint::EndTurn, json!({"current_turn": "P1"}))
        .respond_always(Endpoint::Entities, entities(&[entity("P1", 3, 3, 2)]))
        .with_latency(Endpoint::EndTurn, Duration::from_millis(200));

    let turns = session.turns();
    let (first, second) = tokio::join!(turns.end_turn(), turns.end_turn());

    assert!(first.is_ok());
    assert!(matches!(second, Err(BattleError::EndTurnPending)));
    assert_eq!(mock.count(Endpoint::EndTurn), 1);
    assert!(turns.controls_enabled());
}

#[tokio::test(start_paused = true)]
async fn end_turn_is_refused_during_opponent_turn() {
    let mock = MockChannel::new();
    let session = session(&mock);
    mock.respond(Endpoint::BattleState, json!({"current_turn": "E1"}));
    session.turns().poll_state().await.unwrap();

    let err = session.turns().end_turn().await.unwrap_err();

    assert!(matches!(
        err,
        BattleError::NotPlayerTurn {
            phase: BattlePhase::OpponentTurn
        }
    ));
    assert!(err.is_local_refusal());
    assert_eq!(mock.count(Endpoint::EndTurn), 0);
}

#[tokio::test(start_paused = true)]
async fn auto_end_fires_once_per_turn() {
    let mock = MockChannel::new();
    let session = session(&mock);
    mock.respond_always(Endpoint::BattleState, json!({"current_turn": "P1"}))
        .respond_always(Endpoint::Entities, entities(&[entity("P1", 3, 3, 0)]))
        .fail(
            Endpoint::EndTurn,
            NetworkError::Protocol {
                status: 500,
                message: "server hiccup".into(),
            },
        );

    session.turns().refresh().await.unwrap();
    session.turns().refresh().await.unwrap();

    // The failed end-turn left the epoch alone, so the rule stays spent.
    assert_eq!(mock.count(Endpoint::EndTurn), 1);
    assert_eq!(session.turns().phase(), BattlePhase::PlayerTurn);
}

#[tokio::test(start_paused = true)]
async fn auto_end_rearms_on_a_new_turn() {
    let mock = MockChannel::new();
    let session = session(&mock);
    mock.respond_always(Endpoint::BattleState, json!({"current_turn": "P1"}))
        .respond(Endpoint::Entities, entities(&[entity("P1", 3, 3, 0)]))
        .respond(Endpoint::Entities, entities(&[entity("P1", 3, 3, 2)]))
        .respond(Endpoint::Entities, entities(&[entity("P1", 3, 3, 0)]))
        .respond_always(Endpoint::Entities, entities(&[entity("P1", 3, 3, 2)]))
        .respond_always(Endpoint::EndTurn, json!({"current_turn": "P1"}));

    session.turns().refresh().await.unwrap();
    let after_first = session.turns().epoch();
    session.turns().refresh().await.unwrap();

    assert_eq!(mock.count(Endpoint::EndTurn), 2);
    assert!(session.turns().epoch() > after_first);
}

#[tokio::test(start_paused = true)]
async fn start_without_action_points_ends_the_turn() {
    let mock = MockChannel::new();
    let session = session(&mock);
    mock.respond(
        Endpoint::BattleStart,
        json!({"current_turn": "P1", "turn_order": ["P1", "E1"], "battle_state": "Ongoing"}),
    )
    .respond(
        Endpoint::Entities,
        entities(&[entity("P1", 3, 3, 0), entity("E1", 5, 5, 2)]),
    )
    .respond_always(
        Endpoint::Entities,
        entities(&[entity("P1", 3, 3, 2), entity("E1", 5, 5, 2)]),
    )
    .respond(Endpoint::EndTurn, json!({"current_turn": "E1"}))
    .respond(Endpoint::BattleState, json!({"current_turn": "P1"}));

    let state = session.turns().start_battle().await.unwrap();

    assert_eq!(state.phase, BattlePhase::PlayerTurn);
    assert_eq!(mock.count(Endpoint::EndTurn), 1);
    assert_eq!(
        mock.endpoints(),
        vec![
            Endpoint::BattleStart,
            Endpoint::Entities,
            Endpoint::EndTurn,
            Endpoint::Entities,
            Endpoint::Entities,
            Endpoint::BattleState,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn targeting_an_empty_cell_cancels_without_request() {
    let mock = MockChannel::new();
    let session = session(&mock);
    player_turn(&mock, &session).await;
    let calls_before = mock.calls().len();

    session.router().start_targeting("Gravity__Crush").unwrap();
    assert!(session.router().mode().is_targeting());

    let outcome = session.router().resolve_click(Position::new(9, 9)).await;

    assert_eq!(outcome, ClickOutcome::Cancelled);
    assert_eq!(session.router().mode(), InteractionMode::Normal);
    assert_eq!(mock.calls().len(), calls_before);
}

#[tokio::test(start_paused = true)]
async fn targeting_lapses_when_the_turn_changes() {
    let mock = MockChannel::new();
    let session = session(&mock);
    player_turn(&mock, &session).await;
    session.router().start_targeting("Gravity__Crush").unwrap();

    mock.respond(Endpoint::BattleState, json!({"current_turn": "E1"}));
    session.turns().poll_state().await.unwrap();

    assert_eq!(session.router().mode(), InteractionMode::Normal);
}

#[tokio::test(start_paused = true)]
async fn move_outside_turn_is_rejected_locally() {
    let mock = MockChannel::new();
    let session = session(&mock);
    mock.respond(Endpoint::BattleState, json!({"current_turn": "E1"}));
    session.turns().poll_state().await.unwrap();
    let mut narration = session.subscribe(Topic::Narration);

    let outcome = session.router().resolve_click(Position::new(1, 1)).await;

    assert_eq!(outcome, ClickOutcome::Rejected(RejectReason::NotYourTurn));
    assert_eq!(lines(&mut narration), vec!["Not your turn!".to_string()]);
    assert_eq!(mock.count(Endpoint::Move), 0);
}

#[tokio::test(start_paused = true)]
async fn refused_move_shows_blocked_cue() {
    let mock = MockChannel::new();
    let session = session(&mock);
    player_turn(&mock, &session).await;
    mock.fail(
        Endpoint::Move,
        NetworkError::Protocol {
            status: 400,
            message: "Cell occupied".into(),
        },
    );
    let mut narration = session.subscribe(Topic::Narration);
    let mut shown = session.subscribe(Topic::Presentation);

    let outcome = session.router().resolve_click(Position::new(5, 5)).await;

    assert_eq!(
        outcome,
        ClickOutcome::Failed {
            message: "Cell occupied".into()
        }
    );
    assert_eq!(lines(&mut narration), vec!["Move Failed: Cell occupied".to_string()]);
    assert_eq!(
        presentation(&mut shown),
        vec![PresentationEvent::Rejection {
            actor: "P1".into(),
            position: Position::new(3, 3),
            label: "Blocked!".into(),
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn accepted_move_refreshes_the_board() {
    let mock = MockChannel::new();
    let session = session(&mock);
    player_turn(&mock, &session).await;
    mock.respond(Endpoint::Move, json!({"narrative": "You step forward."}))
        .respond(Endpoint::BattleState, json!({"current_turn": "P1"}))
        .respond(
            Endpoint::Entities,
            entities(&[entity("P1", 3, 4, 1), entity("E1", 5, 5, 2)]),
        );

    let outcome = session.router().resolve_click(Position::new(3, 4)).await;

    assert_eq!(outcome, ClickOutcome::Moved { to: Position::new(3, 4) });
    assert_eq!(
        session.reconciler().position_of(&"P1".into()),
        Some(Position::new(3, 4))
    );
    let body = mock.calls()[2].body.clone();
    assert_eq!(body, Some(json!({"actor_id": "P1", "target_pos": [3, 4]})));
}

#[tokio::test(start_paused = true)]
async fn ability_miss_shows_gray_miss_indicator() {
    let mock = MockChannel::new();
    let session = session(&mock);
    player_turn(&mock, &session).await;
    mock.respond(
        Endpoint::Ability,
        json!({
            "result": {"success": true, "mechanics": {"damage_amount": 0, "damage_type": "Burn"}},
            "narrative": {"narrative": "The flames fizzle."},
            "battle_state": null
        }),
    )
    .respond_always(Endpoint::BattleState, json!({"current_turn": "P1"}))
    .respond_always(
        Endpoint::Entities,
        entities(&[entity("P1", 3, 3, 1), entity("E1", 5, 5, 2)]),
    );
    let mut shown = session.subscribe(Topic::Presentation);
    let mut narration = session.subscribe(Topic::Narration);

    session.router().start_targeting("Solar_Flare").unwrap();
    let outcome = session.router().resolve_click(Position::new(5, 5)).await;

    assert_eq!(
        outcome,
        ClickOutcome::AbilityUsed {
            target: "E1".into(),
            ability_id: "Solar_Flare".into()
        }
    );
    assert_eq!(
        presentation(&mut shown),
        vec![PresentationEvent::Indicator(DamageIndicator {
            position: Position::new(5, 5),
            amount: 0,
            tone: Tone::Gray,
            label: Some("Miss".into()),
        })]
    );
    assert!(lines(&mut narration).contains(&"The flames fizzle.".to_string()));
    let ability = mock
        .calls()
        .into_iter()
        .find(|call| call.endpoint == Endpoint::Ability)
        .unwrap();
    assert_eq!(
        ability.body,
        Some(json!({"actor_id": "P1", "target_id": "E1", "ability_id": "Solar_Flare"}))
    );
}

#[tokio::test(start_paused = true)]
async fn start_during_opponent_turn_polls_until_player_turn() {
    let mock = MockChannel::new();
    let session = session(&mock);
    mock.respond(
        Endpoint::BattleStart,
        json!({"current_turn": "E1", "turn_order": ["E1", "P1"], "battle_state": "Ongoing"}),
    )
    .respond(Endpoint::BattleState, json!({"current_turn": "E1"}))
    .respond(Endpoint::BattleState, json!({"current_turn": "P1"}))
    .respond_always(Endpoint::Entities, entities(&[entity("P1", 3, 3, 2)]));
    let mut narration = session.subscribe(Topic::Narration);
    let started = tokio::time::Instant::now();

    let state = session.turns().start_battle().await.unwrap();

    assert_eq!(state.phase, BattlePhase::PlayerTurn);
    assert_eq!(mock.count(Endpoint::BattleState), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(2));
    assert_eq!(lines(&mut narration), vec!["Your Turn!".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn terminal_state_stops_opponent_polling() {
    let mock = MockChannel::new();
    let session = session(&mock);
    mock.respond(Endpoint::BattleState, json!({"current_turn": "E1"}))
        .respond_always(Endpoint::BattleState, json!({"current_turn": "E1"}))
        .respond_always(Endpoint::Entities, entities(&[]));
    session.turns().poll_state().await.unwrap();

    let turns = session.turns().clone();
    let waiter = tokio::spawn(async move { turns.wait_for_player_turn().await });

    tokio::time::sleep(Duration::from_millis(2500)).await;
    session.turns().apply_battle_state(Some("Defeat"));
    let state = waiter.await.unwrap();

    assert_eq!(state.phase, BattlePhase::Defeat);
    let polls = mock.count(Endpoint::BattleState);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(mock.count(Endpoint::BattleState), polls);
}

#[tokio::test(start_paused = true)]
async fn end_turn_replays_then_waits_for_the_opponent() {
    let mock = MockChannel::new();
    let session = session(&mock);
    let _animator = session.spawn_animator();
    mock.respond(Endpoint::BattleState, json!({"current_turn": "P1"}))
        .respond(
            Endpoint::Entities,
            entities(&[entity("P1", 3, 3, 2), entity("AI1", 5, 5, 2)]),
        );
    session.turns().poll_state().await.unwrap();
    session.turns().sync_entities().await.unwrap();
    mock.respond(
        Endpoint::EndTurn,
        json!({
            "current_turn": "AI1",
            "battle_state": "Ongoing",
            "ai_actions": [
                {"actor_id": "AI1", "action": "Move", "from": [5, 5], "to": [4, 4]},
                {"actor_id": "AI1", "action": "Attack", "target": "P1", "damage": 5, "type": "Meat"}
            ]
        }),
    )
    .respond_always(
        Endpoint::Entities,
        entities(&[entity("P1", 3, 3, 2), entity("AI1", 4, 4, 2)]),
    )
    .respond(Endpoint::BattleState, json!({"current_turn": "P1"}));
    let mut shown = session.subscribe(Topic::Presentation);
    let mut narration = session.subscribe(Topic::Narration);
    let mut turn_events = session.subscribe(Topic::Turn);

    let state = session.turns().end_turn().await.unwrap();

    assert_eq!(state.phase, BattlePhase::PlayerTurn);
    assert_eq!(
        presentation(&mut shown),
        vec![
            PresentationEvent::MoveAnimated {
                actor: "AI1".into(),
                destination: Position::new(4, 4),
                reached: true,
            },
            PresentationEvent::Indicator(DamageIndicator {
                position: Position::new(3, 3),
                amount: 5,
                tone: Tone::Red,
                label: None,
            }),
        ]
    );
    let phases: Vec<BattlePhase> = common::drain(&mut turn_events)
        .into_iter()
        .filter_map(|event| match event {
            Event::Turn(TurnEvent::PhaseChanged { to, .. }) => Some(to),
            _ => None,
        })
        .collect();
    assert_eq!(phases, vec![BattlePhase::OpponentTurn, BattlePhase::PlayerTurn]);
    assert_eq!(
        lines(&mut narration),
        vec!["Turn: AI1".to_string(), "Your Turn!".to_string()]
    );
    // State is only polled once the replay and its reconcile are done.
    assert_eq!(
        mock.endpoints(),
        vec![
            Endpoint::BattleState,
            Endpoint::Entities,
            Endpoint::EndTurn,
            Endpoint::Entities,
            Endpoint::Entities,
            Endpoint::BattleState,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn late_state_reply_does_not_undo_end_turn() {
    let mock = MockChannel::new();
    let session = session(&mock);
    player_turn(&mock, &session).await;
    mock.respond(Endpoint::Move, json!({"narrative": "You step forward."}))
        .respond(Endpoint::BattleState, json!({"current_turn": "P1"}))
        .respond(Endpoint::BattleState, json!({"current_turn": "E1"}))
        .respond(Endpoint::BattleState, json!({"current_turn": "P1"}))
        .respond(Endpoint::EndTurn, json!({"current_turn": "E1"}))
        .respond_always(
            Endpoint::Entities,
            entities(&[entity("P1", 3, 4, 2), entity("E1", 5, 5, 2)]),
        )
        .with_latency(Endpoint::BattleState, Duration::from_millis(300));

    // The move's follow-up state poll is still out when the turn is ended.
    let router = session.router().clone();
    let click = tokio::spawn(async move { router.resolve_click(Position::new(3, 4)).await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    let turns = session.turns().clone();
    let ending = tokio::spawn(async move { turns.end_turn().await });

    tokio::time::sleep(Duration::from_millis(390)).await;
    assert_eq!(session.turns().phase(), BattlePhase::OpponentTurn);
    assert_eq!(session.turns().state().current_turn, Some("E1".into()));
    assert!(!session.turns().controls_enabled());

    let state = ending.await.unwrap().unwrap();
    assert_eq!(click.await.unwrap(), ClickOutcome::Moved { to: Position::new(3, 4) });
    assert_eq!(state.phase, BattlePhase::PlayerTurn);
    assert_eq!(mock.count(Endpoint::BattleState), 4);
}

#[tokio::test(start_paused = true)]
async fn targeting_is_refused_during_opponent_turn() {
    let mock = MockChannel::new();
    let session = session(&mock);
    mock.respond(Endpoint::BattleState, json!({"current_turn": "E1"}))
        .respond(
            Endpoint::Entities,
            entities(&[entity("P1", 3, 3, 2), entity("E1", 5, 5, 2)]),
        );
    session.turns().poll_state().await.unwrap();
    session.turns().sync_entities().await.unwrap();
    let mut narration = session.subscribe(Topic::Narration);

    let err = session.router().start_targeting("Physical").unwrap_err();
    let outcome = session.router().resolve_click(Position::new(5, 5)).await;

    assert!(matches!(
        err,
        BattleError::NotPlayerTurn {
            phase: BattlePhase::OpponentTurn
        }
    ));
    assert_eq!(outcome, ClickOutcome::Rejected(RejectReason::NotYourTurn));
    assert_eq!(session.router().mode(), InteractionMode::Normal);
    assert_eq!(
        lines(&mut narration),
        vec!["Not your turn!".to_string(), "Not your turn!".to_string()]
    );
    assert_eq!(mock.count(Endpoint::Attack), 0);
}

#[tokio::test(start_paused = true)]
async fn refresh_reconciles_even_when_state_poll_fails() {
    let mock = MockChannel::new();
    let session = session(&mock);
    player_turn(&mock, &session).await;
    mock.fail(
        Endpoint::BattleState,
        NetworkError::Protocol {
            status: 500,
            message: "state unavailable".into(),
        },
    )
    .respond(
        Endpoint::Entities,
        entities(&[entity("P1", 3, 4, 1), entity("E1", 5, 5, 2)]),
    );

    session.turns().refresh().await.unwrap();

    assert_eq!(
        session.reconciler().position_of(&"P1".into()),
        Some(Position::new(3, 4))
    );
    assert_eq!(session.turns().phase(), BattlePhase::PlayerTurn);
}
