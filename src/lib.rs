pub mod application;
pub mod archive;
pub mod checksum;
pub mod error;
pub mod package;
pub mod plan;
pub mod platform;
pub mod runtime;
