// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Format version parsing and minimum-version negotiation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{GltfError, Result};

/// A `major.minor` format version
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

/// Versions this implementation knows how to read and write
pub const KNOWN_VERSIONS: &[Version] = &[Version::new(2, 0)];

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = GltfError;

    /// Accepts exactly `<digits>.<digits>` with each component fitting u32.
    /// Signs, hex prefixes, patch segments and missing components all fail.
    fn from_str(s: &str) -> Result<Self> {
        let bad = || GltfError::format(format!("Invalid version string '{s}'"));

        let (major, minor) = s.split_once('.').ok_or_else(bad)?;
        for part in [major, minor] {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad());
            }
        }

        Ok(Version {
            major: major.parse().map_err(|_| bad())?,
            minor: minor.parse().map_err(|_| bad())?,
        })
    }
}

/// Check whether a requested minimum version is satisfied by any supported
/// version (same major, supported minor >= requested minor)
///
/// An empty supported list is a configuration error and takes precedence
/// even when no minimum is requested.
pub fn is_min_version_satisfied(min_version: Option<&str>, supported: &[Version]) -> Result<bool> {
    if supported.is_empty() {
        return Err(GltfError::usage(
            "No supported versions configured for min-version check",
        ));
    }

    let min = match min_version {
        None | Some("") => return Ok(true),
        Some(text) => text.parse::<Version>()?,
    };

    Ok(supported
        .iter()
        .any(|v| v.major == min.major && v.minor >= min.minor))
}
