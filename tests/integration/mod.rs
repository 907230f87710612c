//! Integration tests for nodewatch queries, polling and configuration

mod cancellation;
mod config_integration;
mod node_query;
mod poller;
