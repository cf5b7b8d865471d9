//! Main robot-side executable entry point.
//!
//! # Architecture
//!
//! A match is made of three phases, each of which owns the robot while it
//! runs:
//!
//!     - Pre-autonomous selection: the operator cycles through the profile's
//!       routines with the selector button
//!     - Autonomous: the selected routine's script is executed by the
//!       sequencer
//!     - Driver: the operator control loop runs each cycle:
//!         - Input sampling
//!         - Drive control
//!         - Toggle processing
//!         - Subsystem arbitration
//!
//! The selection and driver phases show their name on the display, and the
//! driver phase also shows the drive motors' diagnostics. The telemetry
//! reporter runs alongside every phase on its own thread.
//!
//! # Usage
//!
//! ```text
//! tiger_exec [--profile <file>] [--verbose] <auto [--routine NAME] | driver [--inputs FILE] | match [--inputs FILE]>
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::{path::PathBuf, sync::Arc};
use structopt::StructOpt;

// Internal
use tiger_if::motion::MotionController;
use tiger_lib::{
    auto_select::AutonSelector,
    auto_seq::{AutoScript, Sequencer},
    input::InputSampler,
    opcontrol::OpControl,
    params::TigerExecParams,
    phase::{self, Robot},
    profile::RobotProfile,
    sim::{InputScript, SimHardware, SimMotion},
    tlm_reporter::{CsvSink, LogSink, SinkSet, TlmReporter},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
    time::{Clock, SysClock},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Targets whose per-cycle records are only logged in verbose mode.
const CYCLE_TARGETS: [&str; 4] = [
    "tiger_lib::opcontrol",
    "tiger_lib::drive_ctrl",
    "tiger_lib::toggle",
    "tiger_lib::arbiter",
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tiger robot executable.
#[derive(Debug, StructOpt)]
#[structopt(name = "tiger_exec")]
struct Opt {
    /// Profile to load, relative to `params/profiles`. Defaults to the one in
    /// `tiger_exec.toml`.
    #[structopt(long)]
    profile: Option<String>,

    /// Log the per-cycle output of the control loop.
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    cmd: Command,
}

/// The phase(s) to run.
#[derive(Debug, StructOpt)]
enum Command {
    /// Run one autonomous routine.
    #[structopt(name = "auto")]
    Auto {
        /// Name of the routine, defaults to the profile's first routine.
        #[structopt(long)]
        routine: Option<String>,
    },

    /// Run the driver phase.
    #[structopt(name = "driver")]
    Driver {
        /// Controller input script to replay.
        #[structopt(long, parse(from_os_str))]
        inputs: Option<PathBuf>,
    },

    /// Run a full match: selection, autonomous, then driver.
    #[structopt(name = "match")]
    Match {
        /// Controller input script to replay.
        #[structopt(long, parse(from_os_str))]
        inputs: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("tiger_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger, keeping the per-cycle trace quiet unless asked for
    let overrides: Vec<(&'static str, LevelFilter)> = if opt.verbose {
        Vec::new()
    }
    else {
        CYCLE_TARGETS.iter().map(|t| (*t, LevelFilter::Info)).collect()
    };
    logger_init(LevelFilter::Trace, &overrides, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Tiger Robot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let exec_params: TigerExecParams =
        util::params::load("tiger_exec.toml").wrap_err("Could not load exec params")?;
    exec_params.validate().wrap_err("Invalid exec params")?;

    let profile_file = opt.profile.clone().unwrap_or_else(|| exec_params.profile.clone());
    let profile = RobotProfile::load(&profile_file)
        .wrap_err_with(|| format!("Could not load the profile {:?}", profile_file))?;

    // Every routine is loaded now so that a broken script stops the robot
    // before the match rather than during it
    let scripts = profile
        .autonomous
        .routines
        .iter()
        .map(|r| {
            AutoScript::load(&r.name, &r.script)
                .wrap_err_with(|| format!("Could not load the script of routine {:?}", r.name))
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!("Exec parameters loaded");

    // ---- INITIALISE BACKEND ----

    info!("Initialising backend...");

    let clock: Arc<dyn Clock> = Arc::new(SysClock::new());

    let mut hw = SimHardware::new(clock.clone());
    hw.set_recording(false);

    match &opt.cmd {
        Command::Driver { inputs: Some(path) } | Command::Match { inputs: Some(path) } => {
            let script = InputScript::load(path)
                .wrap_err_with(|| format!("Could not load the input script {:?}", path))?;
            info!(
                "Loaded input script lasting {:.02} s with {} frames",
                script.duration_ms() as f64 * 0.001,
                script.num_frames()
            );
            hw.set_input_script(script);
        }
        _ => (),
    }

    let motion = Arc::new(SimMotion::new(&profile, clock.clone()));
    motion.calibrate();

    info!("Backend initialisation complete\n");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let sampler = InputSampler::new(&profile.axes);
    let sequencer = Sequencer::new(&profile.drivetrain);
    let mut opcontrol = OpControl::new(&profile).wrap_err("Failed to initialise OpControl")?;
    let mut selector = AutonSelector::new(&profile.autonomous);

    info!("Module initialisation complete\n");

    // ---- START TELEMETRY ----

    let mut sinks = SinkSet::new().with(Box::new(LogSink));
    if exec_params.csv_telemetry {
        let csv_path = session.arch_path("pose.csv");
        sinks = sinks.with(Box::new(
            CsvSink::new(&csv_path).wrap_err("Could not create the pose CSV")?,
        ));
    }

    let reporter = TlmReporter::start(
        motion.clone(),
        Box::new(sinks),
        clock.clone(),
        exec_params.telemetry_period_ms,
    )
    .wrap_err("Failed to start the telemetry reporter")?;

    // ---- RUN PHASES ----

    let mut display = LogSink;

    let mut robot = Robot {
        hw: &mut hw,
        motion: motion.as_ref(),
        clock: clock.as_ref(),
    };

    match &opt.cmd {
        Command::Auto { routine } => {
            let script = match routine {
                Some(name) => scripts
                    .iter()
                    .find(|s| &s.name == name)
                    .ok_or_else(|| eyre!("Profile {:?} has no routine {:?}", profile.name, name))?,
                None => scripts
                    .first()
                    .ok_or_else(|| eyre!("Profile {:?} has no routines", profile.name))?,
            };

            phase::run_auto(&mut robot, &sequencer, script, exec_params.auto_duration_ms());
        }
        Command::Driver { .. } => {
            let stats = phase::run_driver(
                &mut robot,
                &mut opcontrol,
                &mut display,
                exec_params.control_period_ms,
                exec_params.driver_duration_ms(),
            )
            .wrap_err("Error in the driver phase")?;

            info!("Driver phase complete: {} cycles, {} overruns", stats.cycles, stats.overruns);
        }
        Command::Match { .. } => {
            let selected = phase::run_selection(
                &mut robot,
                &mut selector,
                &sampler,
                &mut display,
                exec_params.control_period_ms,
                exec_params.select_window_ms,
            );

            let script = scripts
                .get(selected)
                .ok_or_else(|| eyre!("Selected routine {} does not exist", selected))?;
            phase::run_auto(&mut robot, &sequencer, script, exec_params.auto_duration_ms());

            let stats = phase::run_driver(
                &mut robot,
                &mut opcontrol,
                &mut display,
                exec_params.control_period_ms,
                exec_params.driver_duration_ms(),
            )
            .wrap_err("Error in the driver phase")?;

            info!("Driver phase complete: {} cycles, {} overruns", stats.cycles, stats.overruns);
        }
    }

    // ---- SHUTDOWN ----

    let tlm_stats = reporter.stop().wrap_err("Failed to stop the telemetry reporter")?;
    if tlm_stats.sink_failures > 0 {
        warn!("{} telemetry sample(s) could not be published", tlm_stats.sink_failures);
    }

    info!("Final pose: {:?}", motion.get_pose());
    info!("End of execution");

    session.exit();

    Ok(())
}
