//! Tray host.
//!
//! `TrayIcon` must stay on the thread that created it, so the worker loops
//! talk to it through `TraySink`, which forwards `TrayEvent`s into the winit
//! event loop on the main thread. Frames are coalesced through a `FrameSlot`:
//! at most one frame wake-up is queued at a time, and the main thread always
//! shows the newest index.

use crate::autostart::AutoLaunch;
use crate::config::Strings;
use crate::error::{BounceResult, Error};
use crate::frames::FrameSequence;
use crate::signals;
use crate::state::SharedState;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tray_icon::menu::{CheckMenuItem, Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};
use winit::application::ApplicationHandler;
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoopProxy};
use winit::window::WindowId;

/// How often the event loop wakes up on its own to check for signals.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Updates delivered to the main thread
#[derive(Debug, Clone)]
pub enum TrayEvent {
    /// A new frame is waiting in the `FrameSlot`.
    FrameReady,
    Title(String),
    Menu(MenuEvent),
}

/// Where the worker loops send what the tray should display.
pub trait TraySink: Send {
    fn show_frame(&self, index: usize);
    fn set_title(&self, text: String);
}

/// Latest frame index plus a flag saying a wake-up is already queued.
#[derive(Debug, Default)]
pub struct FrameSlot {
    latest: AtomicUsize,
    pending: AtomicBool,
}

impl FrameSlot {
    /// Stores `index`; returns true when the caller has to wake the main
    /// thread, false when a wake-up is already on its way.
    pub fn offer(&self, index: usize) -> bool {
        self.latest.store(index, Ordering::Release);
        !self.pending.swap(true, Ordering::AcqRel)
    }

    /// Clears the pending flag before reading, so an offer racing with this
    /// call queues a fresh wake-up instead of being lost.
    pub fn take(&self) -> usize {
        self.pending.store(false, Ordering::Release);
        self.latest.load(Ordering::Acquire)
    }
}

#[derive(Clone)]
pub struct ProxySink {
    proxy: EventLoopProxy<TrayEvent>,
    slot: Arc<FrameSlot>,
}

impl ProxySink {
    pub fn new(proxy: EventLoopProxy<TrayEvent>) -> Self {
        ProxySink {
            proxy,
            slot: Arc::new(FrameSlot::default()),
        }
    }

    pub fn frame_slot(&self) -> Arc<FrameSlot> {
        self.slot.clone()
    }
}

impl TraySink for ProxySink {
    // Sends fail once the event loop has exited; nothing left to show then
    fn show_frame(&self, index: usize) {
        if self.slot.offer(index) {
            let _ = self.proxy.send_event(TrayEvent::FrameReady);
        }
    }

    fn set_title(&self, text: String) {
        let _ = self.proxy.send_event(TrayEvent::Title(text));
    }
}

/// Routes menu clicks into the event loop.
pub fn forward_menu_events(proxy: EventLoopProxy<TrayEvent>) {
    MenuEvent::set_event_handler(Some(move |event| {
        let _ = proxy.send_event(TrayEvent::Menu(event));
    }));
}

/// Prepares the platform toolkit the tray depends on.
pub fn platform_init() -> BounceResult<()> {
    #[cfg(target_os = "linux")]
    gtk::init().map_err(|e| Error::Tray(e.to_string()))?;
    Ok(())
}

pub struct TrayApp {
    icons: Vec<Icon>,
    slot: Arc<FrameSlot>,
    strings: Strings,
    state: Arc<SharedState>,
    autostart: Option<AutoLaunch>,
    autostart_item: CheckMenuItem,
    exit_item: MenuItem,
    tray: Option<TrayIcon>,
    failure: Option<Error>,
}

impl TrayApp {
    pub fn new(
        frames: &FrameSequence,
        slot: Arc<FrameSlot>,
        strings: Strings,
        state: Arc<SharedState>,
        autostart: Option<AutoLaunch>,
    ) -> BounceResult<Self> {
        let size = frames.size();
        let icons = frames
            .iter()
            .map(|frame| Icon::from_rgba(frame.as_raw().clone(), size, size))
            .collect::<Result<Vec<_>, _>>()?;

        let enabled = autostart.as_ref().is_some_and(AutoLaunch::is_enabled);
        let autostart_item =
            CheckMenuItem::new(strings.autostart_label, autostart.is_some(), enabled, None);
        let exit_item = MenuItem::new(strings.exit_label, true, None);

        Ok(TrayApp {
            icons,
            slot,
            strings,
            state,
            autostart,
            autostart_item,
            exit_item,
            tray: None,
            failure: None,
        })
    }

    /// The error that stopped the tray from coming up, if any.
    pub fn take_failure(&mut self) -> Option<Error> {
        self.failure.take()
    }

    /// Removes the icon from the notification area.
    pub fn teardown(&mut self) {
        MenuEvent::set_event_handler(None::<fn(MenuEvent)>);
        if self.tray.take().is_some() {
            log::debug!("tray icon removed");
        }
    }

    fn build_tray(&self) -> BounceResult<TrayIcon> {
        let menu = Menu::new();
        menu.append_items(&[
            &self.autostart_item,
            &PredefinedMenuItem::separator(),
            &self.exit_item,
        ])?;

        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip(self.strings.initial_title)
            .with_icon(self.icons[0].clone())
            .build()?;
        Ok(tray)
    }

    fn request_exit(&self, event_loop: &ActiveEventLoop) {
        if self.state.request_stop() {
            log::info!("exit requested");
        }
        event_loop.exit();
    }

    fn toggle_autostart(&self) {
        match &self.autostart {
            Some(launch) => match launch.toggle() {
                Ok(true) => log::info!("auto-launch enabled"),
                Ok(false) => log::info!("auto-launch disabled"),
                Err(err) => log::warn!("could not change auto-launch: {}", err),
            },
            None => log::warn!("auto-launch is not available on this system"),
        }
        let enabled = self.autostart.as_ref().is_some_and(AutoLaunch::is_enabled);
        self.autostart_item.set_checked(enabled);
    }
}

impl ApplicationHandler<TrayEvent> for TrayApp {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        // Tray icons must be created once the loop runs (macOS requirement)
        if !matches!(cause, StartCause::Init) {
            return;
        }
        match self.build_tray() {
            Ok(tray) => {
                log::info!("tray icon registered");
                self.tray = Some(tray);
            }
            Err(err) => {
                log::error!("could not create tray icon: {}", err);
                self.failure = Some(err);
                self.request_exit(event_loop);
            }
        }
    }

    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, _event: WindowEvent) {}

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: TrayEvent) {
        match event {
            TrayEvent::FrameReady => {
                let index = self.slot.take();
                if let (Some(tray), Some(icon)) = (&self.tray, self.icons.get(index)) {
                    if let Err(err) = tray.set_icon(Some(icon.clone())) {
                        log::debug!("frame {} not shown: {}", index, err);
                    }
                }
            }
            TrayEvent::Title(text) => {
                if let Some(tray) = &self.tray {
                    if let Err(err) = tray.set_tooltip(Some(&text)) {
                        log::debug!("title not updated: {}", err);
                    }
                }
            }
            TrayEvent::Menu(event) => {
                if event.id == *self.exit_item.id() {
                    self.request_exit(event_loop);
                } else if event.id == *self.autostart_item.id() {
                    self.toggle_autostart();
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        #[cfg(target_os = "linux")]
        while gtk::events_pending() {
            gtk::main_iteration_do(false);
        }

        if signals::exit_requested() {
            log::info!("termination signal received");
            self.request_exit(event_loop);
            return;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + POLL_INTERVAL));
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// What a sink was asked to display.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Shown {
        Frame(usize),
        Title(String),
    }

    /// Records everything the loops would have shown.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        events: Arc<Mutex<Vec<Shown>>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<Shown> {
            self.events.lock().unwrap().clone()
        }

        pub fn titles(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|event| match event {
                    Shown::Title(text) => Some(text),
                    Shown::Frame(_) => None,
                })
                .collect()
        }
    }

    impl TraySink for RecordingSink {
        fn show_frame(&self, index: usize) {
            self.events.lock().unwrap().push(Shown::Frame(index));
        }

        fn set_title(&self, text: String) {
            self.events.lock().unwrap().push(Shown::Title(text));
        }
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::default();
        sink.show_frame(2);
        sink.set_title("CPU Usage: 5%".to_string());
        sink.show_frame(3);
        assert_eq!(
            sink.events(),
            vec![
                Shown::Frame(2),
                Shown::Title("CPU Usage: 5%".to_string()),
                Shown::Frame(3),
            ]
        );
        assert_eq!(sink.titles(), vec!["CPU Usage: 5%".to_string()]);
    }

    #[test]
    fn test_frame_slot_queues_one_wake_up() {
        let slot = FrameSlot::default();
        assert!(slot.offer(1));
        for index in 2..200 {
            assert!(!slot.offer(index), "second wake-up queued for {index}");
        }
        assert_eq!(slot.take(), 199);
        assert!(slot.offer(5));
        assert_eq!(slot.take(), 5);
    }

    #[test]
    fn test_frame_slot_under_a_fast_producer() {
        let slot = Arc::new(FrameSlot::default());
        let wakes = {
            let slot = slot.clone();
            std::thread::spawn(move || (0..10_000).filter(|&i| slot.offer(i % 12)).count())
        };
        let mut taken = 0;
        while !wakes.is_finished() {
            slot.take();
            taken += 1;
            std::thread::sleep(Duration::from_millis(1));
        }
        let wakes = wakes.join().unwrap();
        // Every wake-up needs a take before the next one can be queued
        assert!(wakes <= taken + 1, "{wakes} wake-ups for {taken} takes");
        assert_eq!(slot.take(), 9_999 % 12);
    }
}
