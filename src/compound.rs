//! Compound kinds and the immutable input records.
//!
//! A [`CompoundRecord`] is one documented C/C++ entity as reported by the
//! external documentation-comment parser. Records arrive flat; the hierarchy
//! is reconstructed from their qualified names by [`crate::graph::ApiGraph`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of compound kinds the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundKind {
    Class,
    Struct,
    Namespace,
    File,
    Dir,
    Union,
    Enum,
    Typedef,
    Variable,
    Define,
    Function,
    Page,
}

impl CompoundKind {
    /// Every accepted kind, in declaration order.
    pub const ALL: [CompoundKind; 12] = [
        CompoundKind::Class,
        CompoundKind::Struct,
        CompoundKind::Namespace,
        CompoundKind::File,
        CompoundKind::Dir,
        CompoundKind::Union,
        CompoundKind::Enum,
        CompoundKind::Typedef,
        CompoundKind::Variable,
        CompoundKind::Define,
        CompoundKind::Function,
        CompoundKind::Page,
    ];

    /// The lowercase wire name of this kind, as the external parser reports it.
    pub fn name(&self) -> &'static str {
        match self {
            CompoundKind::Class => "class",
            CompoundKind::Struct => "struct",
            CompoundKind::Namespace => "namespace",
            CompoundKind::File => "file",
            CompoundKind::Dir => "dir",
            CompoundKind::Union => "union",
            CompoundKind::Enum => "enum",
            CompoundKind::Typedef => "typedef",
            CompoundKind::Variable => "variable",
            CompoundKind::Define => "define",
            CompoundKind::Function => "function",
            CompoundKind::Page => "page",
        }
    }

    /// Parse a wire name back into a kind. Returns `None` for anything
    /// outside the closed vocabulary.
    pub fn from_name(name: &str) -> Option<CompoundKind> {
        CompoundKind::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Human-readable qualifier used in page titles and tree-view labels,
    /// e.g. `Class`, `Directory`.
    pub fn qualifier(&self) -> &'static str {
        match self {
            CompoundKind::Class => "Class",
            CompoundKind::Struct => "Struct",
            CompoundKind::Namespace => "Namespace",
            CompoundKind::File => "File",
            CompoundKind::Dir => "Directory",
            CompoundKind::Union => "Union",
            CompoundKind::Enum => "Enum",
            CompoundKind::Typedef => "Typedef",
            CompoundKind::Variable => "Variable",
            CompoundKind::Define => "Define",
            CompoundKind::Function => "Function",
            CompoundKind::Page => "Page",
        }
    }

    /// Classes and structs.
    pub fn is_class_like(&self) -> bool {
        matches!(self, CompoundKind::Class | CompoundKind::Struct)
    }

    /// Kinds that live in the file hierarchy rather than the class-like one.
    pub fn is_file_like(&self) -> bool {
        matches!(self, CompoundKind::File | CompoundKind::Dir)
    }

    /// Kinds whose qualified names use `::` scoping and that never form a
    /// hierarchy of their own: they attach to whatever textually encloses
    /// them.
    pub fn is_leaf_like(&self) -> bool {
        matches!(
            self,
            CompoundKind::Enum
                | CompoundKind::Typedef
                | CompoundKind::Variable
                | CompoundKind::Define
                | CompoundKind::Function
        )
    }
}

impl fmt::Display for CompoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One flat compound record from the external parser. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundRecord {
    pub kind: CompoundKind,
    /// Fully-qualified name (`::`-delimited) for class-like entities, or a
    /// `/`-delimited path for files and directories.
    pub name: String,
    /// Parser-assigned identifier, unique per record.
    pub refid: String,
    /// Source location (path of the defining file), when the parser found one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Raw signature text for functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_signature: Option<String>,
}

impl CompoundRecord {
    pub fn new(kind: CompoundKind, name: impl Into<String>, refid: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            refid: refid.into(),
            location: None,
            raw_signature: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.raw_signature = Some(signature.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in CompoundKind::ALL {
            assert_eq!(CompoundKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(CompoundKind::from_name("interface"), None);
        assert_eq!(CompoundKind::from_name("Class"), None);
    }

    #[test]
    fn test_kind_qualifier() {
        assert_eq!(CompoundKind::Dir.qualifier(), "Directory");
        assert_eq!(CompoundKind::Class.qualifier(), "Class");
        assert_eq!(CompoundKind::Enum.qualifier(), "Enum");
    }

    #[test]
    fn test_kind_serde_names() {
        let kind: CompoundKind = serde_json::from_str("\"dir\"").unwrap();
        assert_eq!(kind, CompoundKind::Dir);
        assert_eq!(serde_json::to_string(&CompoundKind::Struct).unwrap(), "\"struct\"");
    }

    #[test]
    fn test_record_builders() {
        let record = CompoundRecord::new(CompoundKind::Class, "nested::one", "class_nested_one")
            .with_location("include/nested.hpp");
        assert_eq!(record.location.as_deref(), Some("include/nested.hpp"));
        assert!(record.raw_signature.is_none());
    }
}
