//! Selector grammar: what a query string asks the cluster for.
//!
//! Three grammars share one token alphabet (`[A-Za-z0-9._-]`):
//!
//! - node: `""` or `<name>`
//! - datacenter: `""` or `@<datacenter>`
//! - region: `""` or `@<region>`
//!
//! The `@token` form does not say whether it names a datacenter or a region;
//! the constructor the caller picks decides.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use super::options::QueryOptions;
use crate::error::DependencyError;

static NODE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(?P<name>[A-Za-z0-9._\-]+)\z").unwrap());

static AT_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A@(?P<token>[A-Za-z0-9._\-]+)\z").unwrap());

/// Parsed, typed filter of a query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    None,
    Identifier(String),
    Datacenter(String),
    Region(String),
}

impl Selector {
    /// The selector value, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Selector::None => None,
            Selector::Identifier(v) | Selector::Datacenter(v) | Selector::Region(v) => Some(v),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selector::None)
    }

    /// Options carrying only the field this selector governs.
    pub fn overlay(&self) -> QueryOptions {
        match self {
            Selector::Datacenter(dc) => {
                QueryOptions::new().with_filter(format!("Datacenter == {}", dc))
            }
            Selector::Region(region) => QueryOptions::new().with_region(region.clone()),
            Selector::Identifier(_) | Selector::None => QueryOptions::new(),
        }
    }
}

/// Which grammar built a query; also names the query in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Single node by identifier.
    Node,
    /// Node list filtered by datacenter.
    NodesByDatacenter,
    /// Node list scoped to a region.
    NodesByRegion,
}

impl QueryKind {
    /// Base name used in `Display` and error context.
    pub fn name(&self) -> &'static str {
        match self {
            QueryKind::Node => "nomad.node",
            QueryKind::NodesByDatacenter | QueryKind::NodesByRegion => "nomad.nodes",
        }
    }

    /// Parse `input` with this kind's grammar.
    pub fn parse(&self, input: &str) -> Result<Selector, DependencyError> {
        if input.is_empty() {
            return Ok(Selector::None);
        }

        let invalid = || DependencyError::InvalidSelector {
            kind: self.name(),
            input: input.to_string(),
        };

        match self {
            QueryKind::Node => NODE_NAME_PATTERN
                .captures(input)
                .map(|caps| Selector::Identifier(caps["name"].to_string()))
                .ok_or_else(invalid),
            QueryKind::NodesByDatacenter => AT_TOKEN_PATTERN
                .captures(input)
                .map(|caps| Selector::Datacenter(caps["token"].to_string()))
                .ok_or_else(invalid),
            QueryKind::NodesByRegion => AT_TOKEN_PATTERN
                .captures(input)
                .map(|caps| Selector::Region(caps["token"].to_string()))
                .ok_or_else(invalid),
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
