// PageShade platform abstraction
// Resolves where the native host keeps its persistent store.
//
// Uses `cfg(target_os)` to select the platform-specific implementation.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific data directory for PageShade.
///
/// - **Linux**: `~/.local/share/pageshade` (or `$XDG_DATA_HOME/pageshade`)
/// - **macOS**: `~/Library/Application Support/PageShade`
/// - **Windows**: `%APPDATA%/PageShade`
/// - anything else: `./pageshade`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        PathBuf::from("pageshade")
    }
}
