//! Stack file layout versions.

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};

/// The two on-disk layouts of the stack format.
///
/// Version 1 was written by HyperCard 1.x, version 2 by HyperCard 2.x. Most
/// version 1 fields sit 4 bytes earlier than their version 2 counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileVersion {
    V1,
    V2,
}

impl FileVersion {
    /// Detect the layout from the format number of the stack block.
    pub fn from_format(format: u32) -> Result<Self> {
        match format {
            1..=8 => Ok(FileVersion::V1),
            9 | 10 => Ok(FileVersion::V2),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }
}
