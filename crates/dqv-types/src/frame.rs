//! Boundary to the tabular-frame libraries.
//!
//! Frames themselves live in the host application; the kwargs only carry a
//! [`FrameHandle`] naming one. The only property the policies care about is
//! which frame library produced it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The frame library a handle belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Pandas,
    SparkDf,
}

impl FrameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pandas => "pandas",
            Self::SparkDf => "spark_df",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque reference to an in-memory frame registered with the host.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle {
    pub kind: FrameKind,
    pub name: String,
}

impl FrameHandle {
    pub fn new(kind: FrameKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn pandas(name: impl Into<String>) -> Self {
        Self::new(FrameKind::Pandas, name)
    }

    pub fn spark(name: impl Into<String>) -> Self {
        Self::new(FrameKind::SparkDf, name)
    }
}

impl fmt::Display for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} frame {}>", self.kind, self.name)
    }
}
