//! camctl — camera capture controller.
//!
//! Discovers cameras exposed by the capture core, optionally runs a single
//! capture session against one of them, and keeps an event loop alive while
//! captures or hotplug monitoring are outstanding.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use log::info;

use camera_capture_core::{
    App, CameraSelector, CaptureError, CaptureLimit, RunPlan, SimulatedHub, StreamConfig,
};

#[derive(Parser)]
#[command(name = "camctl", version, about = "Camera capture controller")]
struct Cli {
    /// Camera to operate on, by id or 1-based index
    #[arg(long, value_name = "ID|INDEX")]
    camera: Option<String>,

    /// Capture until interrupted, or until COUNT frames complete
    #[arg(long, value_name = "COUNT", num_args = 0..=1)]
    capture: Option<Option<u64>>,

    /// Stream configuration as key=value pairs (width, height, pixelformat)
    #[arg(long, value_name = "KEY=VALUE[,...]")]
    stream: Vec<String>,

    /// Fail instead of adjusting unsupported stream formats
    #[arg(long)]
    strict_formats: bool,

    /// Print per-frame sensor metadata during capture
    #[arg(long)]
    metadata: bool,

    /// List all cameras
    #[arg(long)]
    list: bool,

    /// List the selected camera's controls
    #[arg(long)]
    list_controls: bool,

    /// List the selected camera's properties
    #[arg(long)]
    list_properties: bool,

    /// Display information about the configured stream(s)
    #[arg(long)]
    info: bool,

    /// Monitor camera hotplug and unplug events
    #[arg(long)]
    monitor: bool,

    /// Enable verbose logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    // Invoked with no options at all there is nothing to do; print usage
    // and fail, matching the behavior of similar inspection tools.
    if std::env::args().len() <= 1 {
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    }

    let plan = match build_plan(&cli) {
        Ok(plan) => plan,
        Err(err) => {
            eprintln!("camctl: {err}");
            return ExitCode::FAILURE;
        }
    };

    let hub = Arc::new(SimulatedHub::with_default_cameras());
    let mut app = App::new(hub, plan);

    // The ctrlc closure runs on a dedicated handler thread, not in signal
    // context; requesting loop exit is the only thing it does.
    let interrupt = app.loop_handle();
    if let Err(err) = ctrlc::set_handler(move || {
        info!("interrupt received, exiting");
        interrupt.exit(0);
    }) {
        eprintln!("camctl: failed to install interrupt handler: {err}");
        return ExitCode::FAILURE;
    }

    match app.run() {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            eprintln!("camctl: {err}");
            ExitCode::FAILURE
        }
    }
}

fn build_plan(cli: &Cli) -> Result<RunPlan, CaptureError> {
    let camera = cli
        .camera
        .as_deref()
        .map(|selector| selector.parse::<CameraSelector>())
        .transpose()?;

    let streams = cli
        .stream
        .iter()
        .map(|spec| StreamConfig::parse_spec(spec))
        .collect::<Result<Vec<_>, _>>()?;

    let capture = cli
        .capture
        .map(|count| match count {
            Some(0) => Err(CaptureError::InvalidArgument(
                "capture count must be positive".into(),
            )),
            Some(frames) => Ok(CaptureLimit::Bounded(frames)),
            None => Ok(CaptureLimit::Unbounded),
        })
        .transpose()?;

    Ok(RunPlan {
        list: cli.list,
        camera,
        streams,
        strict_formats: cli.strict_formats,
        capture,
        print_metadata: cli.metadata,
        list_controls: cli.list_controls,
        list_properties: cli.list_properties,
        info: cli.info,
        monitor: cli.monitor,
    })
}

/// Initialize env_logger from the verbosity flags; `RUST_LOG` wins.
fn init_logging(verbose: bool, quiet: bool) {
    let env = env_logger::Env::default();
    let env = if quiet {
        env.default_filter_or("error")
    } else if verbose {
        env.default_filter_or("debug")
    } else {
        env.default_filter_or("info")
    };
    env_logger::Builder::from_env(env).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn capture_flag_without_value_is_unbounded() {
        let cli = parse(&["camctl", "--camera", "1", "--capture"]);
        let plan = build_plan(&cli).unwrap();
        assert_eq!(plan.capture, Some(CaptureLimit::Unbounded));
    }

    #[test]
    fn capture_flag_with_value_is_bounded() {
        let cli = parse(&["camctl", "--camera", "1", "--capture", "5"]);
        let plan = build_plan(&cli).unwrap();
        assert_eq!(plan.capture, Some(CaptureLimit::Bounded(5)));
    }

    #[test]
    fn capture_of_zero_frames_is_rejected() {
        let cli = parse(&["camctl", "--camera", "1", "--capture", "0"]);
        assert!(matches!(
            build_plan(&cli),
            Err(CaptureError::InvalidArgument(_))
        ));
    }

    #[test]
    fn numeric_camera_argument_selects_by_index() {
        let cli = parse(&["camctl", "--camera", "2"]);
        let plan = build_plan(&cli).unwrap();
        assert_eq!(plan.camera, Some(CameraSelector::Index(2)));
    }

    #[test]
    fn stream_specs_are_parsed_in_order() {
        let cli = parse(&[
            "camctl",
            "--camera",
            "1",
            "--stream",
            "width=1280,height=720",
            "--stream",
            "pixelformat=NV12",
        ]);
        let plan = build_plan(&cli).unwrap();
        assert_eq!(plan.streams.len(), 2);
        assert_eq!(plan.streams[0].width, 1280);
        assert_eq!(plan.streams[1].pixel_format, "NV12");
    }

    #[test]
    fn bad_stream_spec_is_rejected() {
        let cli = parse(&["camctl", "--camera", "1", "--stream", "fps=30"]);
        assert!(matches!(
            build_plan(&cli),
            Err(CaptureError::InvalidArgument(_))
        ));
    }
}
