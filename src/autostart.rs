//! Launch-at-login entries.
//!
//! Each platform keeps a single per-user file that starts the current
//! executable at logon: a Startup-folder shortcut on Windows, an XDG autostart
//! desktop entry on Linux and a LaunchAgent plist on macOS. The entry existing
//! is what "enabled" means.

use crate::config::APP_NAME;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AutoLaunch {
    entry: PathBuf,
    executable: PathBuf,
}

impl AutoLaunch {
    pub fn new(entry: PathBuf, executable: PathBuf) -> Self {
        AutoLaunch { entry, executable }
    }

    /// Entry for the running executable in the platform's usual location.
    pub fn for_current_exe() -> Option<Self> {
        let executable = std::env::current_exe().ok()?;
        Some(Self::new(default_entry_path()?, executable))
    }

    pub fn is_enabled(&self) -> bool {
        self.entry.exists()
    }

    pub fn enable(&self) -> io::Result<()> {
        if let Some(dir) = self.entry.parent() {
            fs::create_dir_all(dir)?;
        }
        write_entry(&self.entry, &self.executable)
    }

    pub fn disable(&self) -> io::Result<()> {
        match fs::remove_file(&self.entry) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }

    /// Flips the current state and returns whether it is now enabled.
    pub fn toggle(&self) -> io::Result<bool> {
        if self.is_enabled() {
            self.disable()?;
            Ok(false)
        } else {
            self.enable()?;
            Ok(true)
        }
    }
}

#[cfg(target_os = "windows")]
fn default_entry_path() -> Option<PathBuf> {
    let startup = dirs::config_dir()?
        .join("Microsoft")
        .join("Windows")
        .join("Start Menu")
        .join("Programs")
        .join("Startup");
    Some(startup.join(format!("{}.lnk", APP_NAME)))
}

#[cfg(target_os = "macos")]
fn default_entry_path() -> Option<PathBuf> {
    Some(
        dirs::home_dir()?
            .join("Library")
            .join("LaunchAgents")
            .join(format!("com.{}.agent.plist", APP_NAME.to_lowercase())),
    )
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn default_entry_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("autostart").join("dado-bounce.desktop"))
}

/// `.lnk` files are a binary COM format; let the shell write it.
#[cfg(target_os = "windows")]
fn write_entry(entry: &Path, executable: &Path) -> io::Result<()> {
    use std::process::Command;

    let working_dir = executable.parent().unwrap_or(Path::new("."));
    let script = format!(
        "$s=(New-Object -ComObject WScript.Shell).CreateShortcut('{}');\
         $s.TargetPath='{}';\
         $s.WorkingDirectory='{}';\
         $s.Description='{} CPU Monitor';\
         $s.Save()",
        entry.display(),
        executable.display(),
        working_dir.display(),
        APP_NAME,
    );
    let status = Command::new("powershell")
        .args(["-NoProfile", "-NonInteractive", "-Command", &script])
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("powershell exited with {}", status)))
    }
}

#[cfg(not(target_os = "windows"))]
fn write_entry(entry: &Path, executable: &Path) -> io::Result<()> {
    fs::write(entry, entry_contents(executable))
}

#[cfg(target_os = "macos")]
fn entry_contents(executable: &Path) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>com.{label}.agent</string>
    <key>ProgramArguments</key>
    <array>
        <string>{exe}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#,
        label = APP_NAME.to_lowercase(),
        exe = executable.display(),
    )
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn entry_contents(executable: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name={name}\n\
         Comment={name} CPU Monitor\n\
         Exec=\"{exe}\"\n\
         Terminal=false\n\
         X-GNOME-Autostart-enabled=true\n",
        name = APP_NAME,
        exe = executable.display(),
    )
}

#[cfg(all(test, not(target_os = "windows")))]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dado-bounce-autostart-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_toggle_creates_and_removes_entry() {
        let dir = scratch_dir("toggle");
        let entry = dir.join("nested").join("entry");
        let launch = AutoLaunch::new(entry.clone(), PathBuf::from("/opt/dado/dado-bounce"));

        assert!(!launch.is_enabled());
        assert!(launch.toggle().unwrap());
        assert!(launch.is_enabled());
        let contents = fs::read_to_string(&entry).unwrap();
        assert!(contents.contains("/opt/dado/dado-bounce"));

        assert!(!launch.toggle().unwrap());
        assert!(!launch.is_enabled());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_disable_when_absent_is_ok() {
        let launch = AutoLaunch::new(scratch_dir("absent").join("entry"), PathBuf::from("/bin/true"));
        assert!(launch.disable().is_ok());
        assert!(!launch.is_enabled());
    }

    #[test]
    fn test_default_location_is_per_user() {
        if let Some(path) = default_entry_path() {
            assert!(path.is_absolute());
        }
    }
}
