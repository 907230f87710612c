//! Snapshot codec registry.
//!
//! Callers that persist or ship snapshots pick an encoding per dependency
//! type once at startup. The registry is frozen after `build()`; nothing is
//! registered implicitly.

use crate::dependency::{DependencyType, Snapshot};
use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wire encoding for snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Json,
    Bincode,
}

impl Encoding {
    pub fn encode(&self, snapshot: &Snapshot) -> Result<Vec<u8>, CodecError> {
        match self {
            Encoding::Json => Ok(serde_json::to_vec(snapshot)?),
            Encoding::Bincode => Ok(bincode::serialize(snapshot)?),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Snapshot, CodecError> {
        match self {
            Encoding::Json => Ok(serde_json::from_slice(bytes)?),
            Encoding::Bincode => Ok(bincode::deserialize(bytes)?),
        }
    }
}

/// Frozen mapping from dependency type to snapshot encoding.
#[derive(Debug, Clone, Default)]
pub struct CodecRegistry {
    encodings: HashMap<DependencyType, Encoding>,
}

/// Builder for [`CodecRegistry`]. Later registrations replace earlier ones.
#[derive(Debug, Default)]
pub struct CodecRegistryBuilder {
    encodings: HashMap<DependencyType, Encoding>,
}

impl CodecRegistryBuilder {
    pub fn register(mut self, dependency_type: DependencyType, encoding: Encoding) -> Self {
        self.encodings.insert(dependency_type, encoding);
        self
    }

    pub fn build(self) -> CodecRegistry {
        CodecRegistry {
            encodings: self.encodings,
        }
    }
}

impl CodecRegistry {
    pub fn builder() -> CodecRegistryBuilder {
        CodecRegistryBuilder::default()
    }

    pub fn encoding(&self, dependency_type: DependencyType) -> Option<Encoding> {
        self.encodings.get(&dependency_type).copied()
    }

    fn require(&self, dependency_type: DependencyType) -> Result<Encoding, CodecError> {
        self.encoding(dependency_type)
            .ok_or(CodecError::Unregistered(dependency_type.as_str()))
    }

    pub fn encode(
        &self,
        dependency_type: DependencyType,
        snapshot: &Snapshot,
    ) -> Result<Vec<u8>, CodecError> {
        self.require(dependency_type)?.encode(snapshot)
    }

    pub fn decode(
        &self,
        dependency_type: DependencyType,
        bytes: &[u8],
    ) -> Result<Snapshot, CodecError> {
        self.require(dependency_type)?.decode(bytes)
    }
}
