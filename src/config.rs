use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "DadoBounce";
pub const ANIMATION_FILE: &str = "dado.gif";

/// Edge length of every tray frame, in pixels.
pub const ICON_SIZE: u32 = 32;

/// Window the load sampler averages CPU usage over.
pub const LOAD_WINDOW: Duration = Duration::from_millis(100);
/// Window the title reporter averages CPU usage over.
pub const TITLE_WINDOW: Duration = Duration::from_secs(1);

/// UI text shown by the tray, chosen from the user's locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strings {
    pub initial_title: &'static str,
    /// `{cpu}` is replaced by the rounded CPU percentage.
    pub title_template: &'static str,
    pub autostart_label: &'static str,
    pub exit_label: &'static str,
}

pub const ENGLISH: Strings = Strings {
    initial_title: "Monitoring CPU speed",
    title_template: "CPU Usage: {cpu}%",
    autostart_label: "Start at login",
    exit_label: "Exit",
};

pub const TRADITIONAL_CHINESE: Strings = Strings {
    initial_title: "CPU 速度監控中",
    title_template: "CPU 使用率: {cpu}%",
    autostart_label: "開機啟動",
    exit_label: "退出",
};

impl Strings {
    /// Picks strings for a POSIX-style locale name such as `zh_TW.UTF-8`.
    pub fn for_locale(locale: &str) -> Self {
        if locale.to_ascii_lowercase().starts_with("zh") {
            TRADITIONAL_CHINESE
        } else {
            ENGLISH
        }
    }

    pub fn from_env() -> Self {
        let locale = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|key| env::var(key).ok())
            .find(|value| !value.is_empty())
            .unwrap_or_default();
        Self::for_locale(&locale)
    }

    pub fn title(&self, cpu: f32) -> String {
        self.title_template
            .replace("{cpu}", &format!("{:.0}", cpu))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub animation_path: PathBuf,
    pub icon_size: u32,
    pub load_window: Duration,
    pub title_window: Duration,
    pub strings: Strings,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            animation_path: locate_animation(),
            icon_size: ICON_SIZE,
            load_window: LOAD_WINDOW,
            title_window: TITLE_WINDOW,
            strings: Strings::from_env(),
        }
    }
}

/// The animation ships next to the executable; the working directory and its
/// `assets/` folder are also searched so `cargo run` finds the bundled copy.
fn locate_animation() -> PathBuf {
    let beside_exe = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(ANIMATION_FILE)));
    let candidates = beside_exe.iter().cloned().chain([
        PathBuf::from(ANIMATION_FILE),
        Path::new("assets").join(ANIMATION_FILE),
    ]);
    first_existing(candidates)
        .or(beside_exe)
        .unwrap_or_else(|| PathBuf::from(ANIMATION_FILE))
}

fn first_existing(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|path| path.is_file())
}
