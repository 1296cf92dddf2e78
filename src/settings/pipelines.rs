// src/settings/pipelines.rs

use std::collections::BTreeMap;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Pipeline short-name (e.g. `"LRT"`) to numeric pipeline id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineMap(BTreeMap<String, u32>);

impl PipelineMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.0.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: u32) -> Option<u32> {
        self.0.insert(name.into(), id)
    }

    pub fn remove(&mut self, name: &str) -> Option<u32> {
        self.0.remove(name)
    }

    /// Merge `other` into `self`; entries in `other` win.
    pub fn merge(&mut self, other: PipelineMap) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Add for PipelineMap {
    type Output = PipelineMap;

    fn add(mut self, rhs: PipelineMap) -> PipelineMap {
        self.merge(rhs);
        self
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for PipelineMap {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Pipeline short-name for a run directory name: its leading letters,
/// uppercased. `"lrt_2024_01"` maps to `"LRT"`.
pub fn pipeline_key(run_name: &str) -> Option<String> {
    let key: String = run_name
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    (!key.is_empty()).then_some(key)
}
