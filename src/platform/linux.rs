// PageShade platform paths for Linux
// Data: ~/.local/share/pageshade

use std::env;
use std::path::PathBuf;

/// Uses `$XDG_DATA_HOME/pageshade` if set, otherwise `~/.local/share/pageshade`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("pageshade"),
        _ => {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            PathBuf::from(home).join(".local").join("share").join("pageshade")
        }
    }
}
