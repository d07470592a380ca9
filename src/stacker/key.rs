//! Grouping key and role derivation
//!
//! The grouping key is what remains of a filename once every match of the
//! match pattern is deleted, so `IMG_0001.jpg` and `IMG_0001_2.jpg` share a
//! stem when the pattern matches the `_2` variant marker.

use crate::source::Asset;
use chrono::Local;
use regex::Regex;

/// Role an asset plays inside its candidate stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Parent,
    Member,
}

/// Compiled matching rules for one run
#[derive(Debug, Clone)]
pub struct MatchRules {
    /// Selects assets eligible for grouping; its matches are stripped to form the key
    pub match_pattern: Regex,
    /// Selects the primary asset of a group
    pub parent_pattern: Regex,
    /// Suffix the key with the local creation time
    pub compare_created: bool,
}

/// Where an asset lands in the candidate map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub key: String,
    pub role: Role,
}

/// Removes every match of `pattern` from `filename`
pub fn derive_key(filename: &str, pattern: &Regex) -> String {
    pattern.replace_all(filename, "").into_owned()
}

impl MatchRules {
    pub fn new(match_pattern: Regex, parent_pattern: Regex) -> Self {
        Self {
            match_pattern,
            parent_pattern,
            compare_created: false,
        }
    }

    pub fn with_compare_created(mut self, compare_created: bool) -> Self {
        self.compare_created = compare_created;
        self
    }

    pub fn matches(&self, filename: &str) -> bool {
        self.match_pattern.is_match(filename)
    }

    pub fn role(&self, filename: &str) -> Role {
        if self.parent_pattern.is_match(filename) {
            Role::Parent
        } else {
            Role::Member
        }
    }

    /// Grouping key for a matched asset
    pub fn grouping_key(&self, asset: &Asset) -> String {
        let stem = derive_key(&asset.original_file_name, &self.match_pattern);
        match (self.compare_created, asset.file_created_at) {
            (true, Some(created)) => format!("{}_{}", stem, created.with_timezone(&Local)),
            _ => stem,
        }
    }

    /// Key and role for `asset`, or `None` when the match pattern rejects it
    pub fn place(&self, asset: &Asset) -> Option<Placement> {
        if !self.matches(&asset.original_file_name) {
            return None;
        }

        Some(Placement {
            key: self.grouping_key(asset),
            role: self.role(&asset.original_file_name),
        })
    }
}
