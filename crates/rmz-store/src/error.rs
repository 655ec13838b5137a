use std::fmt;
use std::path::PathBuf;

use rmz_core::RecordId;
use thiserror::Error;

/// Record families, one per kind of database entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    Maps,
    Actors,
    Classes,
    Skills,
    Enemies,
    Troops,
    CommonEvents,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Family::Maps => "maps",
            Family::Actors => "actors",
            Family::Classes => "classes",
            Family::Skills => "skills",
            Family::Enemies => "enemies",
            Family::Troops => "troops",
            Family::CommonEvents => "common_events",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data directory not found at {}", .0.display())]
    MissingDataDir(PathBuf),

    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{file} has an unexpected shape, expected {expected}")]
    Shape { file: String, expected: &'static str },

    #[error("{file}: record id {id} leaves no room for another record")]
    IdOutOfRange { file: String, id: u64 },

    #[error("map {0} not found")]
    MapNotFound(RecordId),

    #[error("record family `{0}` is unavailable")]
    Unavailable(Family),
}
