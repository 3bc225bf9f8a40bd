use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rocket_flight::analysis::TARGET_DESCENT_RATE;
use rocket_flight::sim::Milestones;
use rocket_flight::{presets, LaunchConditions, RunState, SimError, SimulationController};

fn main() -> Result<(), SimError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // -----------------------------------------------------------------------
    // Rocket: single-stage sport model on a C6-5
    // -----------------------------------------------------------------------
    let rocket = presets::sport_c6();
    let conditions = LaunchConditions::default();

    let mut ctl = SimulationController::new(rocket);
    let report = ctl.report();

    println!();
    println!("====================================================================");
    println!("  MODEL ROCKET FLIGHT — {}", ctl.assembly().name);
    println!("====================================================================");
    println!();
    println!("  Components");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  {:>4}  {:<12}  {:<16}  {:>8}  {:>8}", "id", "kind", "name", "pos(mm)", "mass(g)");
    for c in ctl.assembly().components() {
        println!(
            "  {:>4}  {:<12}  {:<16}  {:>8.1}  {:>8.1}",
            c.id.to_string(),
            c.kind.to_string(),
            c.name,
            c.position,
            c.mass()
        );
    }
    println!();

    println!("  Stability");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Loaded mass:   {:>8.1} g     Empty mass:   {:>8.1} g",
        report.total_mass, report.empty_mass
    );
    println!("  CG:            {:>8.1} mm    CP:           {:>8.1} mm", report.cg, report.cp);
    println!(
        "  Margin:        {:>8.2} cal   Verdict:      {:?}",
        report.static_margin, report.stability
    );
    for r in &report.recommendations {
        println!("  Recommendation: {r:?}");
    }
    println!();

    // -----------------------------------------------------------------------
    // Fly it
    // -----------------------------------------------------------------------
    ctl.start(conditions)?;
    let dt = ctl.config().tick_interval;

    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>9}  {:>9}  {:>9}  {:>9}  {:>8}",
        "t (s)", "alt (m)", "vel (m/s)", "acc(m/s2)", "drift (m)", "phase"
    );
    println!("  {}", "─".repeat(62));

    let mut ticks = 0usize;
    loop {
        let tick = ctl.tick(dt);
        ticks += 1;
        let print = ticks % 20 == 0
            || !tick.new_events.is_empty()
            || tick.state == RunState::Completed;
        if let (true, Some(s)) = (print, tick.sample) {
            println!(
                "  {:>7.2}  {:>9.1}  {:>9.1}  {:>9.1}  {:>9.1}  {:>8}",
                s.time, s.altitude, s.velocity, s.acceleration, s.downrange, s.phase.to_string()
            );
        }
        if tick.state != RunState::Running {
            break;
        }
    }
    println!();

    println!("  Flight Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for e in ctl.event_log() {
        println!("  {e}");
    }
    if ctl.milestones().is_some_and(Milestones::ejection_clamped) {
        println!("  (ejection delay ran past landing)");
    }
    println!();

    if let Some(summary) = ctl.summary() {
        println!("  Performance Summary");
        println!("  ──────────────────────────────────────────────────────────────────");
        println!("  Apogee:        {:>8.1} m   at T+{:.2} s", summary.apogee, summary.apogee_time);
        println!(
            "  Max speed:     {:>8.1} m/s (Mach {:.2})",
            summary.max_velocity, summary.max_mach
        );
        println!(
            "  Max accel:     {:>8.1} m/s^2 ({:.1} g)",
            summary.max_acceleration, summary.max_acceleration_g
        );
        println!(
            "  Descent rate:  {:>8.1} m/s (a {:.0} mm chute gives {:.0} m/s)",
            summary.descent_rate, summary.recommended_canopy_diameter, TARGET_DESCENT_RATE
        );
        println!("  Drift:         {:>8.1} m", summary.landing_drift);
        println!("  Flight time:   {:>8.1} s", summary.flight_time);
        if let Some(err) = summary.delay_error() {
            println!(
                "  Motor delay:   {:>8.1} s   (ideal {:.1} s, {:+.1} s)",
                summary.motor_delay.unwrap_or_default(),
                summary.recommended_delay,
                err
            );
        }
    }

    println!();
    println!("  Playback: {} ticks, dt={} s, {} events", ticks, dt, ctl.event_log().len());
    println!("====================================================================");
    println!();
    Ok(())
}
