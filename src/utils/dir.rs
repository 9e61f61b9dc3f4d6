use std::{env, io, path::PathBuf};

use anyhow::Result;
use tracing::warn;

/// Default application data directory. `APPDATA` on Windows, `XDG_STATE_HOME`
/// or `$HOME/.local/state` elsewhere.
pub fn application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path =
                PathBuf::from(env::var("APPDATA").expect("APPDATA should be present on Windows"));
            path.push("habitline");
            path
        }
        #[cfg(not(windows))]
        {
            let mut path = env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .expect("Couldn't find neither XDG_STATE_HOME nor HOME");
            path.push("habitline");
            path
        }
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

/// Resolves the data directory, degrading to a directory under the system temp
/// dir when the primary medium is unavailable. State written to the fallback
/// survives the session but not a cleanup of temp storage.
pub fn resolve_data_dir() -> PathBuf {
    match application_default_path() {
        Ok(path) => path,
        Err(e) => {
            let fallback = env::temp_dir().join("habitline");
            warn!("Couldn't use the application data directory, falling back to {fallback:?}: {e:#}");
            if let Err(e) = std::fs::create_dir_all(&fallback) {
                warn!("Couldn't create the fallback directory either: {e}");
            }
            fallback
        }
    }
}
