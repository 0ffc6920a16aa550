//! SkillSync - install AI assistant skills and agents from a repository
//!
//! Copies skill directories and agent definition files from a checkout into
//! the assistant's configuration directory, keeping the installed copy in
//! step with the source: new units are copied, changed units replaced, and
//! orphans optionally removed. Re-running with no source changes writes
//! nothing.

pub mod catalog;
pub mod compare;
pub mod config;
pub mod error;
pub mod fs;
pub mod hooks;
pub mod init;
pub mod sync;
pub mod unit;

pub use compare::{ByteComparator, ContentComparator, HashComparator};
pub use config::{CompareMode, Config};
pub use error::SyncError;
pub use sync::{SyncAction, SyncEntry, SyncOptions, SyncReport, Synchronizer};
pub use unit::{Unit, UnitKind};
