//! Crossing Grouping
//!
//! Buckets discovered images into crossing groups keyed by the first match of
//! the group pattern against the file name. Files without a match all share
//! the `ungrouped` bucket.

pub mod roles;

use crate::error::BatchError;
use crate::scan::ImageFile;
use regex::Regex;
use std::collections::BTreeMap;

pub use roles::{Role, RolePatterns, RoleSplit};

/// Key of the bucket holding files the group pattern does not match
pub const UNGROUPED: &str = "ungrouped";

/// Compile an unanchored search-mode pattern, naming its role on failure
pub(crate) fn compile_pattern(role: &'static str, pattern: &str) -> Result<Regex, BatchError> {
    Regex::new(pattern).map_err(|source| BatchError::InvalidPattern {
        role,
        pattern: pattern.to_string(),
        source,
    })
}

/// Pattern that extracts the crossing key from a file name
#[derive(Debug, Clone)]
pub struct GroupPattern {
    regex: Regex,
}

impl GroupPattern {
    pub fn new(pattern: &str) -> Result<Self, BatchError> {
        Ok(Self {
            regex: compile_pattern("group", pattern)?,
        })
    }

    /// First match in `name`, or `ungrouped`
    pub fn key_for(&self, name: &str) -> String {
        self.regex
            .find(name)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| UNGROUPED.to_string())
    }
}

/// One crossing: its key and files in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: String,
    pub files: Vec<ImageFile>,
}

/// Groups keyed by crossing key, iterated in key order
#[derive(Debug, Clone, Default)]
pub struct GroupMap {
    groups: BTreeMap<String, Vec<ImageFile>>,
}

impl GroupMap {
    /// Partition files by group key. Every file lands in exactly one group.
    pub fn partition<I>(files: I, pattern: &GroupPattern) -> Self
    where
        I: IntoIterator<Item = ImageFile>,
    {
        let mut groups: BTreeMap<String, Vec<ImageFile>> = BTreeMap::new();
        for file in files {
            let key = pattern.key_for(&file.name);
            groups.entry(key).or_default().push(file);
        }
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[ImageFile]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Total number of files across all groups
    pub fn file_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
            .into_iter()
            .map(|(key, files)| Group { key, files })
            .collect()
    }
}
