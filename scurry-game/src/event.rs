//! Structured narration events emitted by the turn engine.
//!
//! Events are the engine's only side channel: each command appends the
//! events it produced, and the presentation layer renders them as the game
//! log. The `kind` is a mechanical descriptor; `message` is a ready-made
//! narration line; `payload` carries the raw numbers for tooling.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Stable, deterministic identifier for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    /// One-based round counter when the event occurred.
    pub round: u32,
    /// Per-round sequence number (0-based) within the emitted stream.
    pub seq: u16,
}

impl EventId {
    #[must_use]
    pub const fn new(round: u32, seq: u16) -> Self {
        Self { round, seq }
    }
}

/// Mechanical event kind emitted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    MouseMoved,
    TrapSprung,
    TrapEvaded,
    CheeseClaimed,
    MouseEscaped,
    BalloonBoost,
    BananaDropped,
    CatMoved,
    BananaSlip,
    CatTurnSkipped,
    TrapSet,
    TrapRefused,
    BroomSwing,
    CatAttack,
    MouseDown,
}

impl EventKind {
    /// Severity tier used when no override is supplied.
    #[must_use]
    pub const fn default_severity(self) -> EventSeverity {
        match self {
            Self::TrapSprung | Self::CatAttack | Self::BananaSlip => EventSeverity::Warning,
            Self::MouseEscaped | Self::MouseDown => EventSeverity::Critical,
            _ => EventSeverity::Info,
        }
    }
}

/// Severity tier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Info,
    Warning,
    Critical,
}

/// Structured event emitted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub kind: EventKind,
    pub severity: EventSeverity,
    /// Ready-to-display narration line.
    pub message: String,
    /// Structured numbers behind the narration, for debugging and replays.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl Event {
    #[must_use]
    pub fn new(id: EventId, kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            payload: serde_json::Value::Null,
        }
    }

    /// Attach a structured payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Append-only, most-recent-first event log.
///
/// Unbounded in the model; display truncation is a presentation concern
/// served by [`EventLog::recent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct EventLog {
    entries: VecDeque<Event>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event as the newest entry.
    pub fn record(&mut self, event: Event) {
        self.entries.push_front(event);
    }

    /// Iterate newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }

    /// The newest entry, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&Event> {
        self.entries.front()
    }

    /// The `n` newest entries, newest-first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Event> {
        self.entries.iter().take(n)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(round: u32, seq: u16, kind: EventKind) -> Event {
        Event::new(EventId::new(round, seq), kind, format!("event {round}/{seq}"))
    }

    #[test]
    fn log_orders_newest_first() {
        let mut log = EventLog::new();
        log.record(sample(1, 0, EventKind::MouseMoved));
        log.record(sample(1, 1, EventKind::CatMoved));
        log.record(sample(2, 0, EventKind::MouseMoved));

        let ids: Vec<EventId> = log.iter().map(|event| event.id).collect();
        assert_eq!(
            ids,
            vec![
                EventId::new(2, 0),
                EventId::new(1, 1),
                EventId::new(1, 0),
            ]
        );
        assert_eq!(log.latest().map(|event| event.id), Some(EventId::new(2, 0)));
    }

    #[test]
    fn recent_truncates_without_dropping_entries() {
        let mut log = EventLog::new();
        for seq in 0..5 {
            log.record(sample(1, seq, EventKind::MouseMoved));
        }
        assert_eq!(log.recent(2).count(), 2);
        assert_eq!(log.len(), 5);
    }

    #[test]
    fn severity_defaults_follow_kind() {
        assert_eq!(
            EventKind::TrapSprung.default_severity(),
            EventSeverity::Warning
        );
        assert_eq!(
            EventKind::MouseEscaped.default_severity(),
            EventSeverity::Critical
        );
        assert_eq!(EventKind::TrapSet.default_severity(), EventSeverity::Info);
    }

    #[test]
    fn event_roundtrips_through_serde() {
        let event = sample(3, 2, EventKind::CatAttack)
            .with_payload(serde_json::json!({ "distance": 1, "range": 2 }));
        let json = serde_json::to_string(&event).expect("serialize");
        let restored: Event = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, event);
        assert_eq!(restored.severity, EventSeverity::Warning);
    }

    #[test]
    fn null_payload_is_omitted_from_json() {
        let event = sample(1, 0, EventKind::MouseMoved);
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(!json.contains("payload"));
    }
}
