//! nodewatch: cancelable node dependency queries for Nomad clusters
//!
//! A [`dependency::NodeQuery`] names a node or node list with a compact
//! selector, fetches it through a [`client::NodeClient`], and returns a
//! deterministically ordered [`dependency::Snapshot`]. The [`poll::Poller`]
//! drives a query as a blocking-query loop.

pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod dependency;
pub mod error;
pub mod logging;
pub mod poll;
