//! Database path resolution.
//!
//! Order: explicit path, `THINGSDB`, then the app's group container. Things
//! 3.12.6/3.13.1 relocated the store and left a one-line text file behind at
//! the old location; a path pointing at such a file resolves to the default.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "THINGSDB";

const DEFAULT_DB_SUFFIX: &str = "Library/Group Containers/JLMPQHK86H.com.culturedcode.ThingsMac/\
                                 Things Database.thingsdatabase/main.sqlite";

const MOVED_MARKER: &str = "Your database file has been moved there";

/// The store location used by current versions of the app.
pub fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    PathBuf::from(home).join(DEFAULT_DB_SUFFIX)
}

/// Resolve the database path from an explicit override, `THINGSDB`, or the default.
pub fn resolve_db_path(explicit: Option<&Path>) -> PathBuf {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(ENV_DB_PATH).map(PathBuf::from))
        .unwrap_or_else(default_db_path);
    if is_moved_marker(&path) {
        log::info!(
            "{} is a relocation notice; using {}",
            path.display(),
            default_db_path().display()
        );
        return default_db_path();
    }
    path
}

/// True if the file's first line is the relocation notice.
/// Missing, unreadable and binary files are not markers.
fn is_moved_marker(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut line = Vec::new();
    if BufReader::new(file.take(4096))
        .read_until(b'\n', &mut line)
        .is_err()
    {
        return false;
    }
    String::from_utf8_lossy(&line).contains(MOVED_MARKER)
}
