use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::SimConfig;
use super::profile::{FlightKind, FlightProfile};

// ---------------------------------------------------------------------------
// Flight events
// ---------------------------------------------------------------------------

/// Milestones of a flight, in the order they occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Ignition,
    Liftoff,
    Burnout,
    Apogee,
    Ejection,
    Landing,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Ignition => "Motor ignition",
            EventKind::Liftoff => "Liftoff",
            EventKind::Burnout => "Motor burnout",
            EventKind::Apogee => "Apogee",
            EventKind::Ejection => "Recovery deployment",
            EventKind::Landing => "Landing",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightEvent {
    pub kind: EventKind,
    pub time: f64, // s since ignition
}

impl fmt::Display for FlightEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T+{:>6.2}s  {}", self.time, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Milestone schedule
// ---------------------------------------------------------------------------

/// The full, time-ordered event schedule of one flight profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Milestones {
    events: Vec<FlightEvent>,
    ejection_clamped: bool,
}

impl Milestones {
    pub fn derive(profile: &FlightProfile, config: &SimConfig) -> Milestones {
        let mut events = Vec::with_capacity(6);
        let mut ejection_clamped = false;
        let at = |kind, time| FlightEvent { kind, time };

        match profile.kind {
            FlightKind::Unpowered => {}
            FlightKind::Grounded => {
                events.push(at(EventKind::Ignition, 0.0));
                events.push(at(EventKind::Burnout, profile.burn_time));
            }
            FlightKind::Flight => {
                let t_burnout = profile.burn_time;
                let t_apogee = profile.apogee_time();
                let t_landing = profile.landing_time();

                let mut t_ejection = t_apogee + config.ejection_delay.max(0.0);
                if t_ejection > t_landing {
                    warn!(
                        requested = t_ejection,
                        landing = t_landing,
                        "ejection delay runs past landing, deploying at touchdown"
                    );
                    t_ejection = t_landing;
                    ejection_clamped = true;
                }

                events.push(at(EventKind::Ignition, 0.0));
                events.push(at(EventKind::Liftoff, config.liftoff_delay.clamp(0.0, t_burnout)));
                events.push(at(EventKind::Burnout, t_burnout));
                events.push(at(EventKind::Apogee, t_apogee));
                events.push(at(EventKind::Ejection, t_ejection));
                events.push(at(EventKind::Landing, t_landing));
            }
        }

        Milestones { events, ejection_clamped }
    }

    pub fn events(&self) -> &[FlightEvent] {
        &self.events
    }

    /// Events with `time <= t`, in order.
    pub fn up_to(&self, t: f64) -> &[FlightEvent] {
        let n = self.events.partition_point(|e| e.time <= t);
        &self.events[..n]
    }

    pub fn time_of(&self, kind: EventKind) -> Option<f64> {
        self.events.iter().find(|e| e.kind == kind).map(|e| e.time)
    }

    /// True when the configured ejection delay would have fired after landing.
    pub fn ejection_clamped(&self) -> bool {
        self.ejection_clamped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Events of `milestones` that have occurred by time `t`.
pub fn events_up_to_time(milestones: &Milestones, t: f64) -> &[FlightEvent] {
    milestones.up_to(t)
}
