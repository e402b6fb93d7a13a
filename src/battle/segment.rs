//! Segment ledger: per-window combat aggregates for replay and analytics.
//!
//! Windows sit on a fixed grid of `segment_seconds`. A window opens at the
//! first event inside it and closes once time passes its grid end (or on an
//! explicit flush). Because boundaries come from the grid and not from how
//! the caller steps time, stepping online and fast-forwarding offline close
//! identical segments.

use crate::combat::buff::TagRecorder;
use crate::core::rng::RngContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSegment {
    pub index: u64,
    pub start_time: f64,
    pub end_time: f64,
    /// Damage dealt by the player
    pub total_damage: f64,
    pub damage_taken: f64,
    pub event_count: u64,
    pub kills: u64,
    pub damage_by_source: BTreeMap<String, f64>,
    pub tag_counters: BTreeMap<String, u64>,
    pub rng_index_start: u64,
    pub rng_index_end: u64,
}

impl CombatSegment {
    fn open(index: u64, start_time: f64, end_time: f64, rng_index: u64) -> Self {
        Self {
            index,
            start_time,
            end_time,
            total_damage: 0.0,
            damage_taken: 0.0,
            event_count: 0,
            kills: 0,
            damage_by_source: BTreeMap::new(),
            tag_counters: BTreeMap::new(),
            rng_index_start: rng_index,
            rng_index_end: rng_index,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn tag_count(&self, tag: &str) -> u64 {
        self.tag_counters.get(tag).copied().unwrap_or(0)
    }

    fn is_empty(&self) -> bool {
        self.event_count == 0
            && self.rng_index_start == self.rng_index_end
            && self.total_damage == 0.0
            && self.damage_taken == 0.0
            && self.kills == 0
            && self.tag_counters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentCollector {
    segment_seconds: f64,
    open: Option<CombatSegment>,
    closed: Vec<CombatSegment>,
    next_index: u64,
    last_closed_end: f64,
}

impl SegmentCollector {
    pub fn new(segment_seconds: f64) -> Self {
        assert!(
            segment_seconds > 0.0,
            "segment_seconds must be positive, got {}",
            segment_seconds
        );
        Self {
            segment_seconds,
            open: None,
            closed: Vec::new(),
            next_index: 0,
            last_closed_end: 0.0,
        }
    }

    pub fn segment_seconds(&self) -> f64 {
        self.segment_seconds
    }

    /// Called before each event executes at `now`.
    pub fn begin_event(&mut self, now: f64, rng: &RngContext) {
        self.close_expired(now, rng);
        if self.open.is_none() {
            let window = (now / self.segment_seconds).floor();
            let grid_start = window * self.segment_seconds;
            let grid_end = (window + 1.0) * self.segment_seconds;
            let start = grid_start.max(self.last_closed_end);
            self.open = Some(CombatSegment::open(
                self.next_index,
                start,
                grid_end,
                rng.index(),
            ));
        }
    }

    /// Close the open window if `now` has reached its end.
    pub fn close_expired(&mut self, now: f64, rng: &RngContext) {
        let expired = self
            .open
            .as_ref()
            .map_or(false, |segment| now >= segment.end_time);
        if expired {
            self.close_open(None, rng);
        }
    }

    /// Close the open window early at `now`.
    pub fn flush(&mut self, now: f64, rng: &RngContext) {
        if self.open.is_some() {
            self.close_open(Some(now), rng);
        }
    }

    fn close_open(&mut self, end_override: Option<f64>, rng: &RngContext) {
        let Some(mut segment) = self.open.take() else {
            return;
        };
        if let Some(end) = end_override {
            segment.end_time = end.max(segment.start_time);
        }
        segment.rng_index_end = rng.index();
        self.last_closed_end = segment.end_time;
        if segment.is_empty() {
            return;
        }
        self.next_index += 1;
        self.closed.push(segment);
    }

    pub fn record_event(&mut self) {
        if let Some(segment) = self.open.as_mut() {
            segment.event_count += 1;
        }
    }

    pub fn record_damage(&mut self, source: &str, amount: f64) {
        if let Some(segment) = self.open.as_mut() {
            segment.total_damage += amount;
            *segment
                .damage_by_source
                .entry(source.to_string())
                .or_insert(0.0) += amount;
        }
    }

    pub fn record_damage_taken(&mut self, amount: f64) {
        if let Some(segment) = self.open.as_mut() {
            segment.damage_taken += amount;
        }
    }

    pub fn record_kill(&mut self) {
        if let Some(segment) = self.open.as_mut() {
            segment.kills += 1;
        }
    }

    /// Closed segments not yet drained.
    pub fn segments(&self) -> &[CombatSegment] {
        &self.closed
    }

    pub fn open_segment(&self) -> Option<&CombatSegment> {
        self.open.as_ref()
    }

    pub fn drain(&mut self) -> Vec<CombatSegment> {
        std::mem::take(&mut self.closed)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.segment_seconds > 0.0) {
            return Err("segment_seconds must be positive".to_string());
        }
        for pair in self.closed.windows(2) {
            if pair[0].rng_index_end > pair[1].rng_index_start {
                return Err(format!(
                    "segments {} and {} overlap in rng range",
                    pair[0].index, pair[1].index
                ));
            }
        }
        Ok(())
    }
}

impl TagRecorder for SegmentCollector {
    fn record_tag(&mut self, tag: &str) {
        if let Some(segment) = self.open.as_mut() {
            *segment.tag_counters.entry(tag.to_string()).or_insert(0) += 1;
        }
    }
}
