//! Options for building an occlusion saliency pipeline.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use crate::data::{DefaultFill, ExecutionType, Fill};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOcclusion {
    /// Workers used to apply masks. Zero or negative runs inline on the calling thread.
    pub threads: i64,
    /// Explicit color for occluded pixels.
    pub fill: Option<Fill>,
    /// Color policy used when `fill` is not set.
    pub default_fill: DefaultFill,
    /// Log per-stage timings at info level after each run.
    pub profile: bool,
}

impl Default for ConfigOcclusion {
    fn default() -> Self {
        Self {
            threads: 0,
            fill: None,
            default_fill: DefaultFill::Zero,
            profile: false,
        }
    }
}

#[allow(dead_code)]
impl ConfigOcclusion {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_threads(mut self, n: i64) -> Self {
        self.threads = n;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionType) -> Self {
        self.threads = execution.threads() as i64;
        self
    }

    pub fn with_fill(mut self, fill: impl Into<Fill>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn without_fill(mut self) -> Self {
        self.fill = None;
        self
    }

    pub fn with_default_fill(mut self, default_fill: DefaultFill) -> Self {
        self.default_fill = default_fill;
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn execution(&self) -> ExecutionType {
        ExecutionType::from_threads(self.threads)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_string(&self) -> String {
        format!("Execution: {} ({} workers)\n\
        Fill: {:?}\n\
        Default Fill: {}\n\
        Profile: {}",
                self.execution().as_str(), self.execution().threads(),
                self.fill, self.default_fill.as_str(), self.profile)
    }
}
