//! Data models for admission form extraction.

pub mod config;
pub mod intake;
pub mod recognized;
