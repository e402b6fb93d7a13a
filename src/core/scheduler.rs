//! Time-ordered event queue.
//!
//! Events pop in `(execute_at, insertion sequence)` order so equal timestamps
//! resolve FIFO. The queue is generic over its payload and serializes as a
//! sorted list, which keeps snapshots stable.

use super::error::{BattleError, Result};
use ordered_float::OrderedFloat;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// An event waiting in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent<E> {
    pub execute_at: f64,
    pub sequence: u64,
    pub event: E,
}

impl<E> ScheduledEvent<E> {
    fn key(&self) -> (OrderedFloat<f64>, u64) {
        (OrderedFloat(self.execute_at), self.sequence)
    }
}

impl<E: PartialEq> Eq for ScheduledEvent<E> {}

impl<E: PartialEq> PartialOrd for ScheduledEvent<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E: PartialEq> Ord for ScheduledEvent<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

#[derive(Debug, Clone)]
pub struct EventScheduler<E: PartialEq> {
    heap: BinaryHeap<Reverse<ScheduledEvent<E>>>,
    next_sequence: u64,
}

impl<E: PartialEq> Default for EventScheduler<E> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }
}

impl<E: PartialEq> EventScheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `event` at `execute_at`. Rejects times before `now`.
    pub fn schedule(&mut self, execute_at: f64, event: E, now: f64) -> Result<u64> {
        if execute_at < now || execute_at.is_nan() {
            return Err(BattleError::ScheduleInPast {
                at: execute_at,
                now,
            });
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(ScheduledEvent {
            execute_at,
            sequence,
            event,
        }));
        Ok(sequence)
    }

    pub fn pop_next(&mut self) -> Option<ScheduledEvent<E>> {
        self.heap.pop().map(|Reverse(entry)| entry)
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(entry)| entry.execute_at)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Pending events in pop order.
    pub fn pending(&self) -> Vec<&ScheduledEvent<E>> {
        let mut entries: Vec<&ScheduledEvent<E>> =
            self.heap.iter().map(|Reverse(entry)| entry).collect();
        entries.sort();
        entries
    }
}

#[derive(Deserialize)]
struct SchedulerRepr<E> {
    next_sequence: u64,
    pending: Vec<ScheduledEvent<E>>,
}

impl<E: PartialEq + Serialize> Serialize for EventScheduler<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Borrowed<'a, E> {
            next_sequence: u64,
            pending: Vec<&'a ScheduledEvent<E>>,
        }
        Borrowed {
            next_sequence: self.next_sequence,
            pending: self.pending(),
        }
        .serialize(serializer)
    }
}

impl<'de, E: PartialEq + DeserializeOwned> Deserialize<'de> for EventScheduler<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = SchedulerRepr::<E>::deserialize(deserializer)?;
        if let Some(bad) = repr
            .pending
            .iter()
            .find(|entry| entry.sequence >= repr.next_sequence)
        {
            return Err(serde::de::Error::custom(format!(
                "event sequence {} is not below next_sequence {}",
                bad.sequence, repr.next_sequence
            )));
        }
        Ok(Self {
            heap: repr.pending.into_iter().map(Reverse).collect(),
            next_sequence: repr.next_sequence,
        })
    }
}
