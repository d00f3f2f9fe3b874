//! Doxytree
//!
//! Hierarchy resolution, identity allocation, and tree rendering for
//! Doxygen-derived C/C++ API documentation.
//!
//! The crate consumes the flat compound records produced by an external
//! documentation-comment parser, rebuilds the class-like and file
//! hierarchies from their qualified names, assigns every node a unique
//! filesystem-safe identity, and renders the resolved trees into
//! render-ready listing fragments for an external document-assembly stage.

pub mod compound;
pub mod config;
pub mod error;
pub mod graph;
pub mod identity;
pub mod listing;
pub mod template;
pub mod treeview;
pub mod unabridged;

pub use compound::{CompoundKind, CompoundRecord};
pub use config::{GenerationConfig, TreeViewMode, MAXIMUM_FILENAME_LENGTH};
pub use error::GenerationError;
pub use graph::{AncestorMatch, ApiGraph, Node, NodeId};
pub use identity::{IdentityAllocator, NodeIdentity};
pub use listing::{ExclusionSpec, ListingPolicy};
pub use template::Token;
pub use treeview::{render_hierarchy, Hierarchy};
pub use unabridged::{render_full_api, UnabridgedApi};
