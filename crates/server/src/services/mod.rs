//! Business logic services.
//!
//! # Services
//!
//! - `install` - OAuth callback verification and installation persistence
//! - `events` - Monthly event feed from event products
//! - `calendar` - Single-event `.ics` documents

pub mod calendar;
pub mod events;
pub mod install;

pub use calendar::{CalendarEvent, InvalidStart};
pub use install::{InstallError, complete_installation};
