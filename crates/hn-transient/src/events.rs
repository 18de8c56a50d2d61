//! Scheduled boundary and equipment changes.

use hn_core::{NodeId, PipeId};

/// The quantity an event drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// Valve opening fraction of a pipe, 0..=1.
    ValveOpening,
    /// Pump throttle fraction, 0 = off, 1 = nominal. On a pipe it scales the
    /// curve multiplier; on a pump node it scales the ratio above unity.
    PumpRamp,
    /// Demand of a sink node, m^3/s.
    DemandChange,
    /// Fixed boundary pressure of a source node, Pa.
    PressureChange,
}

/// What the event applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventTarget {
    Node(NodeId),
    Pipe(PipeId),
}

/// A scheduled change, ramped linearly from `start_value` to `end_value`
/// over `duration` seconds beginning at `start`. Zero duration switches
/// instantly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransientEvent {
    pub target: EventTarget,
    pub kind: EventKind,
    /// Simulation time the ramp begins, s.
    pub start: f64,
    /// Ramp length, s.
    pub duration: f64,
    pub start_value: f64,
    pub end_value: f64,
}

impl TransientEvent {
    pub fn new(
        target: EventTarget,
        kind: EventKind,
        start: f64,
        duration: f64,
        start_value: f64,
        end_value: f64,
    ) -> Self {
        Self {
            target,
            kind,
            start,
            duration,
            start_value,
            end_value,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Interpolated value at simulation time `t`. Holds the start value
    /// before the ramp and the end value after it.
    pub fn value_at(&self, t: f64) -> f64 {
        if t <= self.start {
            return self.start_value;
        }
        if self.duration <= 0.0 || t >= self.end() {
            return self.end_value;
        }
        let frac = (t - self.start) / self.duration;
        self.start_value + (self.end_value - self.start_value) * frac
    }
}
