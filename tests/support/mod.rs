//! Shared helpers for integration tests
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use immich_stacker::api::{AssetResponse, AssetStackSummary, MockPhotoApi};
use immich_stacker::{ListingStrategy, MatchRules, StackAssembler, StackMode, Stacker};
use regex::Regex;
use std::sync::Arc;
use uuid::Uuid;

/// Strips an optional `_2` burst suffix along with the extension
pub const MATCH_PATTERN: &str = r"(_2)?\.jpg$";

/// Only the unsuffixed file is the primary asset
pub const PARENT_PATTERN: &str = r"^IMG_\d+\.jpg$";

pub fn asset(name: &str) -> (Uuid, AssetResponse) {
    let id = Uuid::new_v4();
    let response = AssetResponse {
        id: id.to_string(),
        original_file_name: name.to_string(),
        file_created_at: None,
        stack: None,
        stack_count: None,
        stack_parent_id: None,
    };
    (id, response)
}

pub fn asset_created(name: &str, created: DateTime<Utc>) -> (Uuid, AssetResponse) {
    let (id, mut response) = asset(name);
    response.file_created_at = Some(created);
    (id, response)
}

pub fn stacked_asset(name: &str) -> (Uuid, AssetResponse) {
    let (id, mut response) = asset(name);
    response.stack = Some(AssetStackSummary {
        id: Some(Uuid::new_v4().to_string()),
        asset_count: 2,
        primary_asset_id: Some(id.to_string()),
    });
    (id, response)
}

pub struct StackerBuilder {
    mode: StackMode,
    read_only: bool,
    compare_created: bool,
    listing: ListingStrategy,
    page_size: u32,
}

impl StackerBuilder {
    pub fn new() -> Self {
        Self {
            mode: StackMode::Create,
            read_only: false,
            compare_created: false,
            listing: ListingStrategy::Timeline,
            page_size: 1000,
        }
    }

    pub fn mode(mut self, mode: StackMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn compare_created(mut self) -> Self {
        self.compare_created = true;
        self
    }

    pub fn search(mut self, page_size: u32) -> Self {
        self.listing = ListingStrategy::Search;
        self.page_size = page_size;
        self
    }

    pub fn build(self, api: Arc<MockPhotoApi>) -> Stacker {
        let rules = MatchRules::new(
            Regex::new(MATCH_PATTERN).unwrap(),
            Regex::new(PARENT_PATTERN).unwrap(),
        )
        .with_compare_created(self.compare_created);
        let assembler = StackAssembler::new(rules, self.mode, self.read_only);
        Stacker::new(api, assembler, self.listing, self.page_size)
    }
}
