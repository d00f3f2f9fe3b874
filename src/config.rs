//! Build configuration for the generation pipeline.
//!
//! One immutable [`GenerationConfig`] is constructed up front and passed into
//! every component; there is no process-wide mutable state. Collection-valued
//! options can be ingested from a raw JSON value so that validation errors
//! name the offending index before any node is built.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::compound::CompoundKind;
use crate::error::GenerationError;
use crate::listing::{self, ExclusionSpec, ListingPolicy};

/// Smallest common maximum filename length across target filesystems.
pub const MAXIMUM_FILENAME_LENGTH: usize = 255;

/// Which tree-view encoding the renderer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeViewMode {
    /// Plain nested RST bullet list.
    #[default]
    Off,
    /// Collapsible HTML `<ul>`/`<li>` list.
    Collapsible,
    /// Script-driven tree data for a client-side widget.
    Script,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Platform constant; not user-tunable in normal operation.
    pub max_filename_length: usize,
    /// Patterns hiding matching nodes from per-container listings.
    pub listing_exclude: Vec<ExclusionSpec>,
    /// Kinds removed from the full-API listing entirely.
    pub unabridged_orphan_kinds: BTreeSet<CompoundKind>,
    pub tree_view: TreeViewMode,
    /// Collapse tree-view output to one line per top-level container
    /// (collapsible and script encodings only).
    pub minify_tree_view: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_filename_length: MAXIMUM_FILENAME_LENGTH,
            listing_exclude: Vec::new(),
            unabridged_orphan_kinds: [CompoundKind::Dir, CompoundKind::File, CompoundKind::Page]
                .into_iter()
                .collect(),
            tree_view: TreeViewMode::Off,
            minify_tree_view: false,
        }
    }
}

impl GenerationConfig {
    /// Ingest a raw configuration object, validating the collection-valued
    /// options item by item.
    pub fn from_json(value: &Value) -> Result<Self, GenerationError> {
        let map = value.as_object().ok_or_else(|| {
            GenerationError::configuration("config", 0, "configuration must be an object")
        })?;

        let mut config = GenerationConfig::default();
        if let Some(raw) = map.get("max_filename_length") {
            config.max_filename_length = raw.as_u64().ok_or_else(|| {
                GenerationError::configuration(
                    "max_filename_length",
                    0,
                    "must be a non-negative integer",
                )
            })? as usize;
        }
        if let Some(raw) = map.get("listing_exclude") {
            let items = raw.as_array().ok_or_else(|| {
                GenerationError::configuration("listing_exclude", 0, "must be a sequence")
            })?;
            config.listing_exclude = items
                .iter()
                .enumerate()
                .map(|(index, item)| ExclusionSpec::from_value(index, item))
                .collect::<Result<_, _>>()?;
        }
        if let Some(raw) = map.get("unabridged_orphan_kinds") {
            let items = raw.as_array().ok_or_else(|| {
                GenerationError::configuration("unabridged_orphan_kinds", 0, "must be a sequence")
            })?;
            config.unabridged_orphan_kinds = listing::parse_orphan_kinds(items)?;
        }
        if let Some(raw) = map.get("tree_view") {
            config.tree_view = serde_json::from_value(raw.clone()).map_err(|err| {
                GenerationError::configuration("tree_view", 0, err.to_string())
            })?;
        }
        if let Some(raw) = map.get("minify_tree_view") {
            config.minify_tree_view = raw.as_bool().ok_or_else(|| {
                GenerationError::configuration("minify_tree_view", 0, "must be a boolean")
            })?;
        }
        Ok(config)
    }

    /// Compile the listing policy. All pattern and kind validation happens
    /// here, before any node exists.
    pub fn compile_policy(&self) -> Result<ListingPolicy, GenerationError> {
        ListingPolicy::compile(&self.listing_exclude, &self.unabridged_orphan_kinds)
    }
}
