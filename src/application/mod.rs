//! Application layer - use cases that coordinate the packaging stages.
//!
//! This layer sits between the CLI and the planning/archiving/checksum
//! modules, and is the only place where a plan is turned into side effects.

mod package;

pub use package::{PackageOutcome, PackageUseCase};
