use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::{analyze, FlightSummary, StabilityReport};
use crate::assembly::Assembly;
use crate::config::SimConfig;
use crate::error::Result;
use super::conditions::LaunchConditions;
use super::event::{FlightEvent, Milestones};
use super::profile::{FlightProfile, FlightSample};

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Outcome of one [`SimulationController::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Kinematics at the new time; `None` when no run is active.
    pub sample: Option<FlightSample>,
    /// Events that became due during this tick, in order.
    pub new_events: Vec<FlightEvent>,
    pub state: RunState,
}

/// Frozen inputs and derived schedule of the current run.
#[derive(Debug, Clone)]
struct Run {
    conditions: LaunchConditions,
    profile: FlightProfile,
    milestones: Milestones,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives playback of a flight through simulated time.
///
/// The host calls [`tick`](Self::tick) with the wall-clock interval since the
/// previous call; the controller owns the clock, the run state and the event
/// log. Kinematics are closed form, so a run is fully determined by the
/// assembly and conditions given to [`start`](Self::start).
#[derive(Debug, Clone)]
pub struct SimulationController {
    assembly: Assembly,
    config: SimConfig,
    state: RunState,
    time: f64,
    run: Option<Run>,
}

impl SimulationController {
    pub fn new(assembly: Assembly) -> Self {
        Self::with_config(assembly, SimConfig::default())
    }

    pub fn with_config(assembly: Assembly, config: SimConfig) -> Self {
        Self { assembly, config, state: RunState::Idle, time: 0.0, run: None }
    }

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    /// Swap the design. Any active run is discarded.
    pub fn set_assembly(&mut self, assembly: Assembly) {
        self.assembly = assembly;
        self.reset();
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Validate `conditions`, derive the flight and begin playback at t = 0.
    ///
    /// On error the controller is left untouched. Starting while a run is
    /// active restarts it from zero.
    pub fn start(&mut self, conditions: LaunchConditions) -> Result<()> {
        conditions.validate()?;

        let profile = FlightProfile::new(&self.assembly, &conditions);
        let milestones = Milestones::derive(&profile, &self.config);

        info!(
            rocket = %self.assembly.name,
            kind = ?profile.kind,
            apogee = profile.apogee,
            landing = profile.landing_time(),
            "simulation started"
        );

        self.time = 0.0;
        self.run = Some(Run { conditions, profile, milestones });
        self.state = RunState::Running;
        if self.landing_time() <= 0.0 {
            self.complete();
        }
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
            debug!(time = self.time, "simulation paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.state = RunState::Running;
            debug!(time = self.time, "simulation resumed");
        }
    }

    /// Back to idle at t = 0; the run and its log are discarded.
    pub fn reset(&mut self) {
        self.state = RunState::Idle;
        self.time = 0.0;
        self.run = None;
        info!("simulation reset");
    }

    /// Advance simulated time by `dt` seconds while running.
    ///
    /// Negative or non-finite `dt` advances nothing. Time stops at landing,
    /// which completes the run.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        if self.state != RunState::Running {
            return TickReport { sample: self.sample(), new_events: Vec::new(), state: self.state };
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let before = self.event_log().len();

        self.time = (self.time + dt).min(self.landing_time());
        if self.time >= self.landing_time() {
            self.complete();
        }

        let new_events = self.event_log()[before..].to_vec();
        for e in &new_events {
            debug!(event = %e.kind, time = e.time, "flight event");
        }

        TickReport { sample: self.sample(), new_events, state: self.state }
    }

    fn complete(&mut self) {
        self.time = self.landing_time();
        self.state = RunState::Completed;
        info!(time = self.time, "simulation completed");
    }

    fn landing_time(&self) -> f64 {
        self.run.as_ref().map_or(0.0, |r| r.profile.landing_time())
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Simulated seconds since ignition.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Events that have occurred so far in the current run.
    pub fn event_log(&self) -> &[FlightEvent] {
        match &self.run {
            Some(run) => run.milestones.up_to(self.time),
            None => &[],
        }
    }

    pub fn sample(&self) -> Option<FlightSample> {
        self.run.as_ref().map(|r| r.profile.sample(self.time))
    }

    pub fn profile(&self) -> Option<&FlightProfile> {
        self.run.as_ref().map(|r| &r.profile)
    }

    pub fn milestones(&self) -> Option<&Milestones> {
        self.run.as_ref().map(|r| &r.milestones)
    }

    pub fn conditions(&self) -> Option<&LaunchConditions> {
        self.run.as_ref().map(|r| &r.conditions)
    }

    /// Stability of the current design.
    pub fn report(&self) -> StabilityReport {
        analyze(&self.assembly)
    }

    /// Performance summary of the current run.
    pub fn summary(&self) -> Option<FlightSummary> {
        self.run.as_ref().map(|r| FlightSummary::from_profile(&r.profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{presets, ComponentBuilder};
    use crate::error::SimError;
    use crate::sim::event::EventKind;
    use crate::sim::profile::Phase;

    fn run_to_end(ctl: &mut SimulationController, dt: f64) -> Vec<FlightEvent> {
        let mut seen = Vec::new();
        for _ in 0..100_000 {
            let report = ctl.tick(dt);
            seen.extend(report.new_events);
            if report.state == RunState::Completed {
                break;
            }
        }
        seen
    }

    /// Samples of every tick until the run completes.
    fn run_samples(ctl: &mut SimulationController, dt: f64) -> Vec<FlightSample> {
        let mut samples = Vec::new();
        for _ in 0..100_000 {
            let report = ctl.tick(dt);
            samples.extend(report.sample);
            if report.state == RunState::Completed {
                break;
            }
        }
        samples
    }

    #[test]
    fn default_flight_runs_to_landing() {
        let mut ctl = SimulationController::new(presets::sport_c6());
        ctl.start(LaunchConditions::default()).unwrap();
        assert_eq!(ctl.state(), RunState::Running);

        let ticked = run_to_end(&mut ctl, 0.1);
        assert_eq!(ctl.state(), RunState::Completed);

        let log = ctl.event_log();
        let kinds: Vec<EventKind> = log.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Ignition,
                EventKind::Liftoff,
                EventKind::Burnout,
                EventKind::Apogee,
                EventKind::Ejection,
                EventKind::Landing,
            ]
        );
        assert!(log.windows(2).all(|w| w[0].time <= w[1].time));
        // ignition is already logged by start
        assert_eq!(ticked.len(), 5);

        let s = ctl.sample().unwrap();
        assert_eq!(s.phase, Phase::Landed);
        assert_eq!(s.altitude, 0.0);
        assert_eq!(ctl.time(), ctl.profile().unwrap().landing_time());
    }

    #[test]
    fn invalid_conditions_leave_controller_idle() {
        let mut ctl = SimulationController::new(presets::sport_c6());
        let err = ctl
            .start(LaunchConditions { wind_speed: -1.0, ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidCondition { field: "wind_speed", .. }));
        assert_eq!(ctl.state(), RunState::Idle);
        assert!(ctl.event_log().is_empty());
        assert!(ctl.sample().is_none());
    }

    #[test]
    fn failed_restart_keeps_the_active_run() {
        let mut ctl = SimulationController::new(presets::sport_c6());
        ctl.start(LaunchConditions::default()).unwrap();
        ctl.tick(1.0);
        assert!(ctl.start(LaunchConditions { launch_angle: 10.0, ..Default::default() }).is_err());
        assert_eq!(ctl.state(), RunState::Running);
        assert_eq!(ctl.time(), 1.0);
    }

    #[test]
    fn reset_then_rerun_is_deterministic() {
        let mut ctl = SimulationController::new(presets::sport_c6());
        ctl.start(LaunchConditions::default()).unwrap();
        let first_samples = run_samples(&mut ctl, 0.1);
        let first: Vec<FlightEvent> = ctl.event_log().to_vec();

        ctl.reset();
        assert_eq!(ctl.state(), RunState::Idle);
        assert_eq!(ctl.time(), 0.0);
        assert!(ctl.event_log().is_empty());

        ctl.start(LaunchConditions::default()).unwrap();
        let second_samples = run_samples(&mut ctl, 0.1);
        assert_eq!(ctl.event_log(), &first[..]);

        assert!(first_samples.len() > 100);
        assert_eq!(second_samples.len(), first_samples.len());
        for (a, b) in first_samples.iter().zip(&second_samples) {
            assert_eq!(a, b, "diverged at t={}", a.time);
        }
    }

    #[test]
    fn pause_freezes_time() {
        let mut ctl = SimulationController::new(presets::sport_c6());
        ctl.start(LaunchConditions::default()).unwrap();
        ctl.tick(0.5);
        ctl.pause();
        assert_eq!(ctl.state(), RunState::Paused);
        let report = ctl.tick(10.0);
        assert_eq!(report.state, RunState::Paused);
        assert!(report.new_events.is_empty());
        assert_eq!(ctl.time(), 0.5);

        ctl.resume();
        ctl.tick(0.5);
        assert_eq!(ctl.state(), RunState::Running);
        assert_eq!(ctl.time(), 1.0);
    }

    #[test]
    fn tick_while_idle_does_nothing() {
        let mut ctl = SimulationController::new(presets::sport_c6());
        let report = ctl.tick(1.0);
        assert_eq!(report.state, RunState::Idle);
        assert!(report.sample.is_none());
        assert_eq!(ctl.time(), 0.0);
    }

    #[test]
    fn bad_dt_does_not_move_the_clock() {
        let mut ctl = SimulationController::new(presets::sport_c6());
        ctl.start(LaunchConditions::default()).unwrap();
        ctl.tick(-1.0);
        ctl.tick(f64::NAN);
        ctl.tick(f64::INFINITY);
        assert_eq!(ctl.time(), 0.0);
        assert_eq!(ctl.state(), RunState::Running);
    }

    #[test]
    fn large_tick_clamps_at_landing_and_reports_all_events() {
        let mut ctl = SimulationController::new(presets::sport_c6());
        ctl.start(LaunchConditions::default()).unwrap();
        let report = ctl.tick(1.0e6);
        assert_eq!(report.state, RunState::Completed);
        assert_eq!(report.new_events.len(), 5);
        assert_eq!(ctl.time(), ctl.profile().unwrap().landing_time());
        // further ticks are inert
        assert!(ctl.tick(1.0).new_events.is_empty());
    }

    #[test]
    fn unpowered_assembly_completes_immediately() {
        let glider = Assembly::new("glider")
            .with(ComponentBuilder::nose_cone("Ogive"))
            .with(ComponentBuilder::body_tube("Standard Tube"));
        let mut ctl = SimulationController::new(glider);
        ctl.start(LaunchConditions::default()).unwrap();
        assert_eq!(ctl.state(), RunState::Completed);
        assert!(ctl.event_log().is_empty());
        assert_eq!(ctl.sample().unwrap().altitude, 0.0);
    }

    #[test]
    fn assembly_swap_discards_the_run() {
        let mut ctl = SimulationController::new(presets::sport_c6());
        ctl.start(LaunchConditions::default()).unwrap();
        ctl.tick(2.0);
        let apogee = ctl.profile().unwrap().apogee;

        ctl.set_assembly(presets::streamer_dart());
        assert_eq!(ctl.state(), RunState::Idle);
        assert_eq!(ctl.time(), 0.0);
        assert!(ctl.profile().is_none());

        ctl.start(LaunchConditions::default()).unwrap();
        assert_ne!(ctl.profile().unwrap().apogee, apogee);
    }

    #[test]
    fn summary_and_report_are_available() {
        let mut ctl = SimulationController::new(presets::sport_c6());
        assert!(ctl.summary().is_none());
        assert!(ctl.report().stability.is_stable());
        ctl.start(LaunchConditions::default()).unwrap();
        let summary = ctl.summary().unwrap();
        assert!(summary.apogee > 0.0);
    }
}
