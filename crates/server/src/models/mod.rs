//! Domain models for the Xmas Events server.

mod installation;

pub use installation::Installation;
