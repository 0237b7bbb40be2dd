//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{MessageLevel, NarrationEvent, PresentationEvent, TurnEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Narration lines for the message log
    Narration,
    /// Move animations, damage indicators and rejection cues
    Presentation,
    /// Phase changes, control enablement, battle end
    Turn,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Narration(NarrationEvent),
    Presentation(PresentationEvent),
    Turn(TurnEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Narration(_) => Topic::Narration,
            Event::Presentation(_) => Topic::Presentation,
            Event::Turn(_) => Topic::Turn,
        }
    }
}

/// Topic-based event bus
///
/// Consumers subscribe to the topics they care about. Publishing never
/// blocks; events sent while a topic has no subscriber are dropped.
#[derive(Clone)]
pub struct EventBus {
    narration: broadcast::Sender<Event>,
    presentation: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            narration: broadcast::channel(capacity).0,
            presentation: broadcast::channel(capacity).0,
            turn: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Narration => &self.narration,
            Topic::Presentation => &self.presentation,
            Topic::Turn => &self.turn,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Publish an info-level narration line.
    pub fn narrate(&self, text: impl Into<String>) {
        self.narrate_at(MessageLevel::Info, text);
    }

    pub fn narrate_at(&self, level: MessageLevel, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(%level, "narration: {text}");
        self.publish(Event::Narration(NarrationEvent { level, text }));
    }

    pub fn present(&self, event: PresentationEvent) {
        self.publish(Event::Presentation(event));
    }

    pub fn turn(&self, event: TurnEvent) {
        self.publish(Event::Turn(event));
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
