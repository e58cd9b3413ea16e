//! JSON and binary encoding of all derived artifacts.

use serde::{Deserialize, Serialize};

use crate::{RuleSet, TransformModel, TypeModel};

/// Error while decoding a bundle.
#[derive(Debug)]
pub enum BundleError {
    Json(serde_json::Error),
    Binary(postcard::Error),
}

impl std::fmt::Display for BundleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "JSON decode error: {e}"),
            Self::Binary(e) => write!(f, "binary decode error: {e}"),
        }
    }
}

impl std::error::Error for BundleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Binary(e) => Some(e),
        }
    }
}

/// Everything derived from one set of grammars.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelBundle {
    pub rule_sets: Vec<RuleSet>,
    pub types: TypeModel,
    pub transforms: TransformModel,
}

impl ModelBundle {
    pub fn from_json(json: &str) -> Result<Self, BundleError> {
        serde_json::from_str(json).map_err(BundleError::Json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialization should not fail")
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).expect("serialization should not fail")
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, BundleError> {
        postcard::from_bytes(bytes).map_err(BundleError::Binary)
    }

    pub fn to_binary(&self) -> Vec<u8> {
        postcard::to_allocvec(self).expect("serialization should not fail")
    }
}
