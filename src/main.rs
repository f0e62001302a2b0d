#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod animation;
mod autostart;
mod collector;
mod config;
mod cpu;
mod error;
mod frames;
mod lifecycle;
mod rate;
mod signals;
mod state;
mod timer;
mod tray;

use autostart::AutoLaunch;
use config::{Config, APP_NAME};
use cpu::{CpuMonitor, LoadSource};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::tty::IsTty;
use crossterm::execute;
use error::BounceResult;
use frames::FrameSequence;
use lifecycle::{Lifecycle, Windows};
use std::io;
use std::process::ExitCode;
use timer::TimerResolution;
use tray::{ProxySink, TrayApp, TrayEvent, TraySink};
use winit::event_loop::{ControlFlow, EventLoop};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            report_fatal(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> BounceResult<()> {
    let mut lifecycle = Lifecycle::new();

    tray::platform_init()?;
    let event_loop = EventLoop::<TrayEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let sink = ProxySink::new(event_loop.create_proxy());
    let slot = sink.frame_slot();
    let frames = launch(config, &mut lifecycle, sink, CpuMonitor::new)?;

    let timer = TimerResolution::raise();
    signals::install();
    tray::forward_menu_events(event_loop.create_proxy());

    let mut app = TrayApp::new(
        &frames,
        slot,
        config.strings.clone(),
        lifecycle.state(),
        AutoLaunch::for_current_exe(),
    )?;

    let outcome = event_loop.run_app(&mut app);

    // Ordered teardown: workers, then the icon, then the timer
    lifecycle.request_stop();
    lifecycle.shutdown();
    app.teardown();
    drop(timer);
    log::info!("{} {:?}", APP_NAME, lifecycle.phase());

    outcome?;
    match app.take_failure() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Decodes the animation, then starts the worker threads feeding `sink`.
/// If decoding fails the lifecycle is aborted and `sink` is never touched.
fn launch<S, L, F>(
    config: &Config,
    lifecycle: &mut Lifecycle,
    sink: S,
    new_source: F,
) -> BounceResult<FrameSequence>
where
    S: TraySink + Clone + 'static,
    L: LoadSource + 'static,
    F: FnMut() -> L,
{
    let frames = match FrameSequence::load(&config.animation_path, config.icon_size) {
        Ok(frames) => frames,
        Err(err) => {
            lifecycle.abort();
            return Err(err);
        }
    };
    let (width, height) = frames.get(0).dimensions();
    log::info!(
        "loaded {} {}x{} frames from {}",
        frames.len(),
        width,
        height,
        config.animation_path.display()
    );

    let windows = Windows {
        load: config.load_window,
        title: config.title_window,
    };
    lifecycle.start(frames.len(), windows, config.strings.clone(), sink, new_source)?;
    Ok(frames)
}

/// Prints startup failures in red when someone is watching the terminal.
fn report_fatal(err: &error::Error) {
    let mut stderr = io::stderr();
    if !stderr.is_tty() {
        eprintln!("{}: {}", APP_NAME, err);
        return;
    }
    let styled = execute!(
        stderr,
        SetForegroundColor(Color::Red),
        SetAttribute(Attribute::Bold),
        Print(format!("{}: ", APP_NAME)),
        SetAttribute(Attribute::Reset),
        SetForegroundColor(Color::Red),
        Print(format!("{}\n", err)),
        ResetColor
    );
    if styled.is_err() {
        eprintln!("{}: {}", APP_NAME, err);
    }
}
