//! Camera role classification
//!
//! Overview wins over front, front wins over rear. The rear list only
//! excludes overview files, so a name matching both front and rear shows up
//! in both display lists while the request carries it as front.

use super::compile_pattern;
use crate::error::BatchError;
use crate::scan::ImageFile;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Front,
    Rear,
    Overview,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Front => "front",
            Role::Rear => "rear",
            Role::Overview => "overview",
        }
    }
}

/// The three role patterns, all unanchored search-mode
#[derive(Debug, Clone)]
pub struct RolePatterns {
    front: Regex,
    rear: Regex,
    overview: Regex,
}

impl RolePatterns {
    pub fn new(front: &str, rear: &str, overview: &str) -> Result<Self, BatchError> {
        Ok(Self {
            front: compile_pattern(Role::Front.as_str(), front)?,
            rear: compile_pattern(Role::Rear.as_str(), rear)?,
            overview: compile_pattern(Role::Overview.as_str(), overview)?,
        })
    }

    /// Single role for one file name, by fixed precedence
    pub fn classify(&self, name: &str) -> Option<Role> {
        if self.overview.is_match(name) {
            Some(Role::Overview)
        } else if self.front.is_match(name) {
            Some(Role::Front)
        } else if self.rear.is_match(name) {
            Some(Role::Rear)
        } else {
            None
        }
    }

    /// Role lists for a group, preserving the group's file order
    pub fn split<'a>(&self, files: &'a [ImageFile]) -> RoleSplit<'a> {
        let overview: Vec<&ImageFile> = files
            .iter()
            .filter(|f| self.overview.is_match(&f.name))
            .collect();
        let not_overview = |f: &&ImageFile| !overview.iter().any(|o| o.path == f.path);

        let front = files
            .iter()
            .filter(|f| self.front.is_match(&f.name))
            .filter(not_overview)
            .collect();
        let rear = files
            .iter()
            .filter(|f| self.rear.is_match(&f.name))
            .filter(not_overview)
            .collect();

        RoleSplit {
            front,
            rear,
            overview,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoleSplit<'a> {
    pub front: Vec<&'a ImageFile>,
    pub rear: Vec<&'a ImageFile>,
    pub overview: Vec<&'a ImageFile>,
}

impl<'a> RoleSplit<'a> {
    pub fn files(&self, role: Role) -> &[&'a ImageFile] {
        match role {
            Role::Front => &self.front,
            Role::Rear => &self.rear,
            Role::Overview => &self.overview,
        }
    }

    /// File names of one role joined with `separator`
    pub fn joined_names(&self, role: Role, separator: &str) -> String {
        self.files(role)
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}
