use std::io;

use thiserror::Error;

/// Errors encountered while walking root paths.
///
/// Only root paths produce errors: a root that cannot be examined or opened
/// ends the walk. Problems below a root are reported through the warning sink
/// and the walk continues.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A root path could not be examined.
    #[error("invalid root {path:?}: {source}")]
    InvalidRoot {
        /// The root path as supplied by the caller.
        path: String,

        /// The error reported when examining the path.
        #[source]
        source: io::Error,
    },

    /// A root directory exists but could not be opened for reading.
    #[error("could not open root {path:?}: {source}")]
    OpenRoot {
        /// The root path as supplied by the caller.
        path: String,

        /// The error reported when opening the directory.
        #[source]
        source: io::Error,
    },
}
