//! Resumable, depth-first traversal of the file system.
//!
//! A [`Walk`] visits one or more root paths and produces exactly one entry per
//! call to [`Walk::advance`], suspending between calls with its open directory
//! handles intact. Roots are visited in list order; within a root, entries are
//! emitted in depth-first pre-order (a directory before its contents), in
//! whatever order the platform directory iterator yields them.
//!
//! A root that turns out to be a regular file (or a symlink, which is never
//! followed) is emitted as a single entry. A directory that cannot be opened
//! mid-walk is emitted as an entry, reported to the warning sink, and not
//! descended into; the walk continues with its siblings.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

use std::{fmt::Display, io, path::PathBuf};

use getset::Getters;
use typed_builder::TypedBuilder;

mod entry;
mod error;
mod frame;
pub mod paths;
mod walk;

pub use entry::{Entry, FileType};
pub use error::Error;
pub use walk::Walk;

/// Receives [`Warning`]s for non-fatal problems encountered mid-walk.
pub type WarningSink = Box<dyn FnMut(Warning) + Send>;

/// Options for a walk.
#[derive(TypedBuilder)]
pub struct Options {
    /// Root paths to visit, in order.
    ///
    /// Each root starts an independent depth-first sub-traversal. An empty
    /// list produces an empty walk.
    #[builder(setter(into))]
    roots: Vec<String>,

    /// Sink for non-fatal warnings.
    ///
    /// When absent, warnings are emitted through [`log::warn!`].
    #[builder(default, setter(strip_option))]
    warnings: Option<WarningSink>,
}

/// A non-fatal problem encountered mid-walk.
///
/// Warnings never terminate a walk: the affected subtree is skipped and the
/// traversal continues with whatever remains.
#[derive(Debug, Getters)]
pub struct Warning {
    /// The path of the directory or entry that could not be read.
    #[getset(get = "pub")]
    path: PathBuf,

    /// The underlying I/O error.
    #[getset(get = "pub")]
    error: io::Error,
}

impl Warning {
    pub(crate) fn new(path: PathBuf, error: io::Error) -> Self {
        Self { path, error }
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "skipping {:?}: {}", self.path, self.error)
    }
}
