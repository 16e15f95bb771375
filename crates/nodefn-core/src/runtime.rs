use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Runtime used when a function does not name one.
pub const DEFAULT_RUNTIME: &str = "nodejs20.x";

/// First Node.js major whose managed runtime ships the v3 AWS SDK.
const SDK_V3_MIN_MAJOR: u32 = 18;

/// Runtime family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeFamily {
    Nodejs,
    Other,
}

/// A serverless runtime identifier such as `nodejs20.x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runtime {
    name: String,
    family: RuntimeFamily,
    node_major: Option<u32>,
}

impl Runtime {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn family(&self) -> RuntimeFamily {
        self.family
    }

    /// Node.js major version, when the name carries one.
    #[must_use]
    pub fn node_major(&self) -> Option<u32> {
        self.node_major
    }

    /// Whether the managed runtime bundles the v3 AWS SDK (which reuses
    /// connections on its own).
    #[must_use]
    pub fn bundles_sdk_v3(&self) -> bool {
        self.node_major.is_some_and(|m| m >= SDK_V3_MIN_MAJOR)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            name: DEFAULT_RUNTIME.to_string(),
            family: RuntimeFamily::Nodejs,
            node_major: Some(20),
        }
    }
}

impl FromStr for Runtime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err("runtime name must not be empty".to_string());
        }

        // Any `nodejs` name is Node.js; the major runs up to the first dot
        // (`nodejs20.x`, `nodejs8.10`, `nodejs4.3`).
        let (family, node_major) = match name.strip_prefix("nodejs") {
            Some(rest) => {
                let major = rest.split('.').next().and_then(|m| m.parse::<u32>().ok());
                (RuntimeFamily::Nodejs, major)
            }
            None => (RuntimeFamily::Other, None),
        };

        Ok(Self {
            name: name.to_string(),
            family,
            node_major,
        })
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
