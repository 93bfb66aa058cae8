//! CLI commands

pub mod check;
pub mod init;
pub mod license;
pub mod schedule;
