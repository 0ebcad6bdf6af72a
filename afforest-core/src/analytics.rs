//! Optional analytics sink.
//!
//! The engine reports the start, completion or failure of each calculation to
//! a caller supplied sink. Payloads only carry counts and durations, never the
//! project inputs. A sink can fail (by returning an error or panicking) without
//! affecting the calculation: failures are logged and dropped.

use crate::errors::{AfforestError, AfforestResult};
use crate::FloatValue;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;

/// Which engine path produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    Single,
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPhase {
    Start,
    Complete,
    Error,
}

/// Name of an engine event, e.g. `forest_multi_calculation_complete`.
pub fn event_name(kind: CalculationKind, phase: EventPhase) -> String {
    let kind = match kind {
        CalculationKind::Single => "single",
        CalculationKind::Multi => "multi",
    };
    let phase = match phase {
        EventPhase::Start => "start",
        EventPhase::Complete => "complete",
        EventPhase::Error => "error",
    };
    format!("forest_{kind}_calculation_{phase}")
}

/// Counts and durations attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub species_count: usize,
    /// Number of annual results emitted.
    pub result_count: Option<usize>,
    /// Number of offending fields when the calculation failed validation.
    pub error_count: Option<usize>,
    /// Wall clock time spent in the calculation.
    pub elapsed_ms: Option<FloatValue>,
}

/// Receiver of engine events.
pub trait AnalyticsSink {
    fn emit(&self, event: &str, payload: &EventPayload) -> AfforestResult<()>;
}

impl<F> AnalyticsSink for F
where
    F: Fn(&str, &EventPayload) -> AfforestResult<()>,
{
    fn emit(&self, event: &str, payload: &EventPayload) -> AfforestResult<()> {
        self(event, payload)
    }
}

impl fmt::Debug for dyn AnalyticsSink + Send + Sync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AnalyticsSink")
    }
}

/// Deliver an event to `sink`, logging and discarding any failure.
pub fn emit_guarded(sink: Option<&dyn AnalyticsSink>, event: &str, payload: &EventPayload) {
    let Some(sink) = sink else {
        return;
    };

    let outcome = catch_unwind(AssertUnwindSafe(|| sink.emit(event, payload)));
    let error = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "sink panicked".to_string());
            AfforestError::SinkFailure(message)
        }
    };
    warn!("Dropping analytics event {event}: {error}");
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<(String, EventPayload)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<(String, EventPayload)> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events().into_iter().map(|(name, _)| name).collect()
    }
}

impl AnalyticsSink for MemorySink {
    fn emit(&self, event: &str, payload: &EventPayload) -> AfforestResult<()> {
        self.events
            .lock()
            .map_err(|e| AfforestError::SinkFailure(e.to_string()))?
            .push((event.to_string(), payload.clone()));
        Ok(())
    }
}
