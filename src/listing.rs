//! Listing exclusion policy.
//!
//! Two independent axes decide what shows up where:
//!
//! 1. Regex specifiers (`listing_exclude`) hide matching nodes from
//!    per-container listing pages while the node's own page still exists.
//! 2. `unabridged_orphan_kinds` removes whole kinds from the comprehensive
//!    full-API listing; those nodes remain reachable through their own pages
//!    and the hierarchy views.
//!
//! Both are validated up front, before any node is built, with errors naming
//! the offending index.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::compound::CompoundKind;
use crate::error::GenerationError;

/// Regex flag bits accepted in `(pattern, flags)` specifiers. The numeric
/// values mirror the upstream configuration surface this crate replaces.
pub mod flags {
    pub const IGNORECASE: u64 = 2;
    pub const MULTILINE: u64 = 8;
    pub const DOTALL: u64 = 16;
    /// Accepted for compatibility; patterns are always unicode-aware here.
    pub const UNICODE: u64 = 32;
    pub const VERBOSE: u64 = 64;

    pub const ALL: u64 = IGNORECASE | MULTILINE | DOTALL | UNICODE | VERBOSE;
}

/// One user-supplied exclusion specifier: a bare pattern (implicit flags 0)
/// or a `(pattern, flags)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExclusionSpec {
    Pattern(String),
    PatternWithFlags(String, u64),
}

impl ExclusionSpec {
    pub fn pattern(&self) -> &str {
        match self {
            ExclusionSpec::Pattern(pattern) => pattern,
            ExclusionSpec::PatternWithFlags(pattern, _) => pattern,
        }
    }

    pub fn flag_bits(&self) -> u64 {
        match self {
            ExclusionSpec::Pattern(_) => 0,
            ExclusionSpec::PatternWithFlags(_, bits) => *bits,
        }
    }

    /// Validate one raw specifier value at `index`: either a pattern string,
    /// or a sequence unpackable as exactly `pattern` or `pattern, flags`.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, GenerationError> {
        match value {
            Value::String(pattern) => Ok(ExclusionSpec::Pattern(pattern.clone())),
            Value::Array(items) => {
                if items.is_empty() || items.len() > 2 {
                    return Err(GenerationError::configuration(
                        "listing_exclude",
                        index,
                        format!(
                            "cannot unpack {} element(s) as `pattern` or `pattern, flags`",
                            items.len()
                        ),
                    ));
                }
                let pattern = items[0].as_str().ok_or_else(|| {
                    GenerationError::configuration(
                        "listing_exclude",
                        index,
                        "pattern is not a string",
                    )
                })?;
                match items.get(1) {
                    None => Ok(ExclusionSpec::Pattern(pattern.to_string())),
                    Some(flag_value) => {
                        let bits = flag_value.as_u64().ok_or_else(|| {
                            GenerationError::configuration(
                                "listing_exclude",
                                index,
                                "flags is not a non-negative integer",
                            )
                        })?;
                        Ok(ExclusionSpec::PatternWithFlags(pattern.to_string(), bits))
                    }
                }
            }
            other => Err(GenerationError::configuration(
                "listing_exclude",
                index,
                format!("expected a pattern string or `(pattern, flags)` pair, got {other}"),
            )),
        }
    }
}

/// Parse and validate raw orphan-kind names against the closed vocabulary.
pub fn parse_orphan_kinds(values: &[Value]) -> Result<BTreeSet<CompoundKind>, GenerationError> {
    let mut kinds = BTreeSet::new();
    for (index, value) in values.iter().enumerate() {
        let name = value.as_str().ok_or_else(|| {
            GenerationError::configuration(
                "unabridged_orphan_kinds",
                index,
                "kind name is not a string",
            )
        })?;
        let kind = CompoundKind::from_name(name).ok_or_else(|| {
            GenerationError::configuration(
                "unabridged_orphan_kinds",
                index,
                format!("unknown kind `{name}`"),
            )
        })?;
        kinds.insert(kind);
    }
    Ok(kinds)
}

/// The compiled, immutable policy consulted during resolution.
#[derive(Debug, Default)]
pub struct ListingPolicy {
    exclusions: Vec<Regex>,
    orphan_kinds: BTreeSet<CompoundKind>,
}

impl ListingPolicy {
    pub fn compile(
        specs: &[ExclusionSpec],
        orphan_kinds: &BTreeSet<CompoundKind>,
    ) -> Result<Self, GenerationError> {
        let mut exclusions = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            exclusions.push(compile_spec(index, spec)?);
        }
        Ok(Self {
            exclusions,
            orphan_kinds: orphan_kinds.clone(),
        })
    }

    /// Whether a node with this qualified name is hidden from per-container
    /// listing pages.
    pub fn excludes(&self, qualified_name: &str) -> bool {
        self.exclusions.iter().any(|re| re.is_match(qualified_name))
    }

    /// Whether every node of `kind` is diverted out of the full-API listing.
    pub fn orphans_kind(&self, kind: CompoundKind) -> bool {
        self.orphan_kinds.contains(&kind)
    }
}

fn compile_spec(index: usize, spec: &ExclusionSpec) -> Result<Regex, GenerationError> {
    let bits = spec.flag_bits();
    let unknown = bits & !flags::ALL;
    if unknown != 0 {
        return Err(GenerationError::configuration(
            "listing_exclude",
            index,
            format!("unknown flag bits 0x{unknown:x}"),
        ));
    }
    // Patterns match from the start of the qualified name, matching the
    // semantics of the upstream configuration they are migrated from.
    let anchored = format!("^(?:{})", spec.pattern());
    RegexBuilder::new(&anchored)
        .case_insensitive(bits & flags::IGNORECASE != 0)
        .multi_line(bits & flags::MULTILINE != 0)
        .dot_matches_new_line(bits & flags::DOTALL != 0)
        .ignore_whitespace(bits & flags::VERBOSE != 0)
        .build()
        .map_err(|err| {
            GenerationError::configuration(
                "listing_exclude",
                index,
                format!("unable to compile `{}`: {err}", spec.pattern()),
            )
        })
}
