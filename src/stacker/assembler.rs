//! Stack Assembler: candidate accumulation, classification and apply
//!
//! Candidates live in a `BTreeMap` so runs log in a stable key order;
//! nothing else depends on that order. Apply is sequential and each
//! candidate's outcome is independent: a failed call is counted and the
//! next candidate is processed.

use super::candidate::CandidateStack;
use super::key::{MatchRules, Role};
use super::stats::RunStats;
use crate::api::{ApiError, AssetBulkUpdateRequest, PhotoApi, StackCreateRequest};
use crate::source::Asset;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

/// Which stacking protocol the server speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackMode {
    /// `POST stacks` with the parent first
    #[default]
    Create,
    /// Legacy `PUT assets` with a `stackParentId`
    Update,
}

impl FromStr for StackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(StackMode::Create),
            "update" => Ok(StackMode::Update),
            other => Err(format!(
                "Invalid stack mode: {}. Valid options: create, update",
                other
            )),
        }
    }
}

impl fmt::Display for StackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackMode::Create => write!(f, "create"),
            StackMode::Update => write!(f, "update"),
        }
    }
}

/// Candidates built from one asset listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    pub stacks: BTreeMap<String, CandidateStack>,
    /// Assets accepted by the match pattern
    pub matched: usize,
    /// Assets rejected by the match pattern
    pub ignored: usize,
    /// Parent ids overwritten by a later parent in the same group
    pub parent_conflicts: usize,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&CandidateStack> {
        self.stacks.get(key)
    }
}

pub struct StackAssembler {
    rules: MatchRules,
    mode: StackMode,
    read_only: bool,
}

impl StackAssembler {
    pub fn new(rules: MatchRules, mode: StackMode, read_only: bool) -> Self {
        Self {
            rules,
            mode,
            read_only,
        }
    }

    pub fn mode(&self) -> StackMode {
        self.mode
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Groups matched assets by key and assigns each its role
    pub fn build_candidates<'a>(
        &self,
        assets: impl IntoIterator<Item = &'a Asset>,
    ) -> CandidateSet {
        let mut set = CandidateSet::default();

        for asset in assets {
            let Some(placement) = self.rules.place(asset) else {
                set.ignored += 1;
                continue;
            };
            set.matched += 1;

            let candidate = set.stacks.entry(placement.key.clone()).or_default();
            match placement.role {
                Role::Parent => {
                    if let Some(previous) = candidate.set_parent(asset.id) {
                        set.parent_conflicts += 1;
                        warn!(
                            key = %placement.key,
                            kept = %asset.id,
                            dropped = %previous,
                            "Multiple parents matched, keeping the last one"
                        );
                    }
                }
                Role::Member => {
                    if !candidate.add_member(asset.id) {
                        debug!(key = %placement.key, id = %asset.id, "Duplicate member skipped");
                    }
                }
            }
        }

        info!(
            matched = set.matched,
            ignored = set.ignored,
            candidates = set.len(),
            "Built candidate stacks"
        );

        set
    }

    /// Classifies every candidate and applies the stackable ones
    pub async fn classify_and_apply(&self, api: &dyn PhotoApi, set: &CandidateSet) -> RunStats {
        let mut stats = RunStats::default();

        if self.read_only {
            info!("Read-only run, no stacks will be written");
        }

        for (key, candidate) in &set.stacks {
            if !candidate.is_stackable() {
                debug!(filename = %key, "Skipped");
                stats.not_stackable += 1;
                continue;
            }

            stats.stackable += 1;
            debug!(filename = %key, "Stacking");

            if self.read_only {
                continue;
            }

            match self.apply(api, candidate).await {
                Ok(()) => {
                    info!(filename = %key, mode = %self.mode, "Created stack");
                    stats.succeeded += 1;
                }
                Err(e) => {
                    error!(filename = %key, status = ?e.status_code(), "Failed to stack: {}", e);
                    stats.failed += 1;
                }
            }
        }

        stats
    }

    /// Issues the single mutating call for a stackable candidate
    pub async fn apply(
        &self,
        api: &dyn PhotoApi,
        candidate: &CandidateStack,
    ) -> Result<(), ApiError> {
        let Some(parent) = candidate.parent else {
            return Ok(());
        };

        match self.mode {
            StackMode::Create => {
                api.create_stack(StackCreateRequest {
                    asset_ids: candidate.ordered_ids(),
                })
                .await
            }
            StackMode::Update => {
                api.update_assets(AssetBulkUpdateRequest {
                    ids: candidate.children(),
                    stack_parent_id: parent,
                })
                .await
            }
        }
    }
}
