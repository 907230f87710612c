//! Dependency Contract
//!
//! A dependency is a parameterized remote query that an external polling loop
//! fetches repeatedly. Each fetch returns a fresh, deterministically ordered
//! [`Snapshot`] plus the consistency point of the read, or an error. Stopping a
//! dependency makes every later fetch fail fast with
//! [`DependencyError::Stopped`](crate::error::DependencyError::Stopped).
//!
//! Stopping is checked before the backend call and again after it returns; a
//! backend call already in flight is not interrupted, so cancellation is
//! bounded by the backend client's own timeout.

use crate::client::ClientSet;
use crate::error::DependencyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod options;
pub mod query;
pub mod selector;
pub mod snapshot;
pub mod stop;

pub use options::{Consistency, QueryOptions};
pub use query::NodeQuery;
pub use selector::{QueryKind, Selector};
pub use snapshot::{NodeRecord, ResponseMetadata, Snapshot, ADVERTISE_ADDRESS_ATTR};
pub use stop::StopSignal;

/// Backend family a dependency reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Nomad,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::Nomad => "nomad",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract the polling loop relies on.
///
/// `Display` gives the human-readable identity used in diagnostics and error
/// context; it is never used for equality.
#[async_trait]
pub trait Dependency: fmt::Display + Send + Sync {
    /// Run one read against the backend.
    async fn fetch(
        &self,
        clients: &ClientSet,
        opts: &QueryOptions,
    ) -> Result<Snapshot, DependencyError>;

    /// Whether results may be reused across identical dependencies.
    fn can_share(&self) -> bool;

    /// Make this and every later fetch fail with `Stopped`. Idempotent.
    fn stop(&self);

    /// Signal closed by [`stop`](Dependency::stop), so a driver can wait on it.
    fn stop_signal(&self) -> Option<&StopSignal> {
        None
    }

    fn dependency_type(&self) -> DependencyType;
}
