//! # sitepub-site
//!
//! Site build and test stages, run inside the provisioned container.
//!
//! Call [`build`] to stage inputs and run the generator incrementally; it
//! skips work when the [`fingerprint`] of the declared inputs is unchanged and
//! the declared outputs still exist. Call [`test`] to run the generator's test
//! task against the built artifact.

pub mod builder;
pub mod error;
pub mod fingerprint;
pub mod plan;
pub mod tester;

pub use builder::{build, BuildReport, BuildStatus};
pub use error::{BuildError, TestError};
pub use fingerprint::{Fingerprint, Staleness};
pub use plan::SitePlan;
pub use tester::{test, TestResult};
