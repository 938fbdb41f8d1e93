//! filesorter - sort a directory's files into category folders
//!
//! This library classifies files by sniffed content type or by extension,
//! optionally renames them with a year-month prefix, and moves them into
//! category subfolders of a target directory, reconciling name collisions by
//! content and modification time.

pub mod classifier;
pub mod cli;
pub mod collision;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod naming;
pub mod observer;
pub mod output;
pub mod sniff;

pub use classifier::{Classification, Classifier, FileEntry, SortMode};
pub use collision::{CollisionDecision, MovePlan};
pub use config::{ConfigError, Settings};
pub use file_category::{Category, FileMapper, Folder};
pub use file_organizer::{OrganizeError, OrganizeOptions, OrganizeReport, Organizer};
pub use observer::{OrganizeEvent, OrganizeObserver, SilentObserver, TracingObserver};

pub use cli::{Cli, run_cli};
