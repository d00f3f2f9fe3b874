//! Full-API listing fragments.
//!
//! Some compounds never show up in either hierarchy view — a namespace whose
//! only member is a variable, for example. The full-API listing enumerates
//! everything in a fixed kind order so every page is reachable from at least
//! one generated document. Kinds named by `unabridged_orphan_kinds` are
//! diverted to a separate orphan fragment that keeps their pages reachable
//! without cluttering the main listing.

use crate::compound::CompoundKind;
use crate::graph::{ApiGraph, NodeId};
use crate::listing::ListingPolicy;
use crate::treeview::heading_mark;

const FULL_API_TITLE: &str = "Full API";
const FULL_TOCTREE_MAX_DEPTH: usize = 5;

/// Enumeration order for the listing sections. Classes and structs fold into
/// one section.
const DUMP_ORDER: &[(&str, &[CompoundKind])] = &[
    ("Namespaces", &[CompoundKind::Namespace]),
    ("Classes and Structs", &[CompoundKind::Class, CompoundKind::Struct]),
    ("Enums", &[CompoundKind::Enum]),
    ("Unions", &[CompoundKind::Union]),
    ("Functions", &[CompoundKind::Function]),
    ("Variables", &[CompoundKind::Variable]),
    ("Defines", &[CompoundKind::Define]),
    ("Typedefs", &[CompoundKind::Typedef]),
    ("Directories", &[CompoundKind::Dir]),
    ("Files", &[CompoundKind::File]),
    ("Pages", &[CompoundKind::Page]),
];

/// The rendered full-API fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnabridgedApi {
    /// Main listing, included from the library root document.
    pub full: String,
    /// Orphaned kinds; empty when no kind is diverted.
    pub orphans: String,
}

/// Render the full-API listing and its orphan companion.
///
/// Pattern-excluded nodes still appear here: the full-API listing is their
/// remaining point of discovery. Nodes nested inside a class-like parent are
/// skipped, since their documentation is embedded in the parent's page.
pub fn render_full_api(graph: &ApiGraph, policy: &ListingPolicy) -> UnabridgedApi {
    let mut full = format!(
        "{}\n{}\n\n",
        FULL_API_TITLE,
        heading_mark(FULL_API_TITLE, '-')
    );
    let mut orphans = format!(
        ":orphan:\n\n{}\n{}\n\n",
        FULL_API_TITLE,
        heading_mark(FULL_API_TITLE, '=')
    );
    let mut any_orphans = false;

    for (section, kinds) in DUMP_ORDER {
        let mut ids: Vec<NodeId> = kinds
            .iter()
            .flat_map(|kind| graph.all_of_kind(*kind))
            .filter(|id| !embedded_in_parent_page(graph, *id))
            .collect();
        if ids.is_empty() {
            continue;
        }
        ids.sort_by(|a, b| graph.node(*a).name.cmp(&graph.node(*b).name));

        let diverted = kinds.iter().any(|kind| policy.orphans_kind(*kind));
        let dest = if diverted {
            any_orphans = true;
            &mut orphans
        } else {
            &mut full
        };

        dest.push_str(&format!("{}\n{}\n\n", section, heading_mark(section, '*')));
        for id in ids {
            let node = graph.node(id);
            let stem = node
                .file_name
                .strip_suffix(".rst")
                .unwrap_or(&node.file_name);
            dest.push_str(&format!(
                ".. toctree::\n   :maxdepth: {FULL_TOCTREE_MAX_DEPTH}\n\n   {stem}\n\n"
            ));
        }
    }

    UnabridgedApi {
        full,
        orphans: if any_orphans { orphans } else { String::new() },
    }
}

/// Compounds nested in a class-like container are documented inline on the
/// container's page.
fn embedded_in_parent_page(graph: &ApiGraph, id: NodeId) -> bool {
    match graph.node(id).parent {
        Some(parent) => matches!(
            graph.node(parent).kind,
            CompoundKind::Class | CompoundKind::Struct | CompoundKind::Union
        ),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::CompoundRecord;
    use crate::config::GenerationConfig;

    fn graph_and_policy(config: &GenerationConfig) -> (ApiGraph, ListingPolicy) {
        let records = [
            CompoundRecord::new(CompoundKind::Namespace, "nested", "ns_nested"),
            CompoundRecord::new(CompoundKind::Struct, "nested::one", "s_one"),
            CompoundRecord::new(CompoundKind::Union, "nested::one::payload", "u_payload"),
            CompoundRecord::new(CompoundKind::Enum, "nested::Color", "e_color"),
            CompoundRecord::new(CompoundKind::File, "nested.hpp", "f_nested")
                .with_location("include/nested.hpp"),
            CompoundRecord::new(CompoundKind::Dir, "include", "d_include"),
        ];
        let graph = ApiGraph::resolve(&records, config).unwrap();
        let policy = config.compile_policy().unwrap();
        (graph, policy)
    }

    #[test]
    fn test_sections_in_dump_order() {
        let config = GenerationConfig::default();
        let (graph, policy) = graph_and_policy(&config);
        let api = render_full_api(&graph, &policy);

        let namespaces = api.full.find("Namespaces").unwrap();
        let classes = api.full.find("Classes and Structs").unwrap();
        let enums = api.full.find("Enums").unwrap();
        assert!(namespaces < classes && classes < enums);
    }

    #[test]
    fn test_default_orphan_kinds_divert_files_and_dirs() {
        let config = GenerationConfig::default();
        let (graph, policy) = graph_and_policy(&config);
        let api = render_full_api(&graph, &policy);

        assert!(!api.full.contains("Files"));
        assert!(!api.full.contains("Directories"));
        assert!(api.orphans.starts_with(":orphan:"));
        assert!(api.orphans.contains("Files"));
        assert!(api.orphans.contains("Directories"));
    }

    #[test]
    fn test_nested_union_is_embedded_not_listed() {
        let config = GenerationConfig::default();
        let (graph, policy) = graph_and_policy(&config);
        let api = render_full_api(&graph, &policy);

        assert!(!api.full.contains("Unions"));
        assert!(!api.full.contains("payload"));
        // The namespace-level struct is listed.
        assert!(api.full.contains("struct_nested_3a_3aone"));
    }

    #[test]
    fn test_pattern_excluded_nodes_still_listed() {
        let mut config = GenerationConfig::default();
        config
            .listing_exclude
            .push(crate::listing::ExclusionSpec::Pattern(".*Color$".into()));
        let (graph, policy) = graph_and_policy(&config);
        let api = render_full_api(&graph, &policy);

        let color = graph.find(CompoundKind::Enum, "nested::Color").unwrap();
        assert!(graph.node(color).excluded_from_listing);
        // Exclusion hides it from container listings, not from the full API.
        assert!(api.full.contains("enum_nested_3a_3aColor"));
    }

    #[test]
    fn test_no_orphans_when_no_kind_diverted() {
        let mut config = GenerationConfig::default();
        config.unabridged_orphan_kinds.clear();
        let (graph, policy) = graph_and_policy(&config);
        let api = render_full_api(&graph, &policy);

        assert!(api.orphans.is_empty());
        assert!(api.full.contains("Files"));
    }
}
