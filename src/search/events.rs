// src/search/events.rs
//
// Search events. The driver publishes, the binary drains them into a
// JSON-lines report.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::warn;

use super::driver::{Status, Termination};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchEvent {
    Evaluated {
        generation: u32,
        scenario: String,
        status: Status,
        fitness: f64,
        steps: usize,
    },

    Improved {
        generation: u32,
        scenario: String,
        fitness: f64,
    },

    Rejected {
        generation: u32,
        scenario: String,
        reason: String,
    },

    Terminated {
        termination: Termination,
        generations: u32,
        best_fitness: Option<f64>,
    },
}

pub struct EventBus {
    events: VecDeque<SearchEvent>,
    max_pending: usize,
}

impl EventBus {
    pub fn new(max_pending: usize) -> Self {
        let max_pending = max_pending.max(1);
        Self {
            events: VecDeque::with_capacity(max_pending),
            max_pending,
        }
    }

    pub fn publish(&mut self, event: SearchEvent) {
        if self.events.len() >= self.max_pending {
            warn!(
                "Event bus full ({} events), dropping oldest",
                self.max_pending
            );
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<SearchEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn improved(generation: u32) -> SearchEvent {
        SearchEvent::Improved {
            generation,
            scenario: format!("s_{}", generation),
            fitness: 1.0,
        }
    }

    #[test]
    fn test_bus_drops_oldest_when_full() {
        let mut bus = EventBus::new(2);
        bus.publish(improved(1));
        bus.publish(improved(2));
        bus.publish(improved(3));
        assert_eq!(bus.pending_count(), 2);
        let drained = bus.drain();
        assert_eq!(drained, vec![improved(2), improved(3)]);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serde_json::to_string(&SearchEvent::Terminated {
            termination: Termination::BudgetExhausted,
            generations: 10,
            best_fitness: Some(4.5),
        })
        .unwrap();
        assert!(json.contains(r#""event":"terminated""#), "{}", json);
        assert!(json.contains(r#""termination":"budget_exhausted""#), "{}", json);
    }
}
