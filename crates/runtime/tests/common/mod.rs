#![allow(dead_code)]

use std::sync::Arc;

use battle_runtime::{
    BattleSession, Event, HeadlessView, NarrationEvent, PresentationEvent, SessionConfig,
};
use client_transport::{Endpoint, MockChannel};
use serde_json::{Value, json};
use tokio::sync::broadcast;

pub fn session(mock: &MockChannel) -> BattleSession {
    let view = Arc::new(HeadlessView::default());
    BattleSession::new(
        Arc::new(mock.clone()),
        view.clone(),
        view,
        SessionConfig::default(),
    )
}

pub fn entity(id: &str, x: i32, y: i32, ap: i32) -> Value {
    json!({"id": id, "x": x, "y": y, "hp": 20, "max_hp": 20, "ap": ap})
}

pub fn entities(list: &[Value]) -> Value {
    json!({ "entities": list })
}

/// Puts the session in P1's turn with P1 at (3,3) and E1 at (5,5).
pub async fn player_turn(mock: &MockChannel, session: &BattleSession) {
    mock.respond(Endpoint::BattleState, json!({"current_turn": "P1"}))
        .respond(
            Endpoint::Entities,
            entities(&[entity("P1", 3, 3, 2), entity("E1", 5, 5, 2)]),
        );
    session.turns().poll_state().await.unwrap();
    session.turns().sync_entities().await.unwrap();
}

pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

pub fn lines(rx: &mut broadcast::Receiver<Event>) -> Vec<String> {
    drain(rx)
        .into_iter()
        .filter_map(|event| match event {
            Event::Narration(NarrationEvent { text, .. }) => Some(text),
            _ => None,
        })
        .collect()
}

pub fn presentation(rx: &mut broadcast::Receiver<Event>) -> Vec<PresentationEvent> {
    drain(rx)
        .into_iter()
        .filter_map(|event| match event {
            Event::Presentation(event) => Some(event),
            _ => None,
        })
        .collect()
}
