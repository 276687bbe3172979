//! Tracing utilities for asserting on log events in tests.

use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// Captured event information.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    /// The event target (e.g., "tabula::retry")
    pub target: String,
    /// The `message` field
    pub message: String,
    /// Other field values as strings
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }
    }
}

struct EventCaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for EventCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("tabula") {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let captured = CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

/// Collector for events emitted by tabula crates.
#[derive(Clone)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    dispatch: Dispatch,
}

impl EventCollector {
    pub fn new() -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let layer = EventCaptureLayer {
            events: events.clone(),
        };
        let dispatch = Dispatch::new(Registry::default().with(layer));
        Self { events, dispatch }
    }

    /// Makes this collector the thread's default until the guard drops.
    ///
    /// Use with a current-thread runtime so every task logs on this thread.
    pub fn set_default(&self) -> tracing::dispatcher::DefaultGuard {
        tracing::dispatcher::set_default(&self.dispatch)
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events at `level`, in emission order.
    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .collect()
    }
}

impl Default for EventCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_tabula_events_only() {
        let collector = EventCollector::new();
        tracing::dispatcher::with_default(&collector.dispatch, || {
            tracing::warn!(target: "tabula::retry", attempt = 1, "Retrying");
            tracing::warn!(target: "other", "Ignored");
        });

        let events = collector.at_level(Level::WARN);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "Retrying");
        assert_eq!(events[0].field("attempt"), Some("1"));
    }
}
