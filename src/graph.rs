//! Flat-record to hierarchy resolution.
//!
//! The external parser reports compounds as a flat list with qualified names;
//! structural parent links are not part of its data model. [`ApiGraph`]
//! rebuilds two disjoint trees from the names alone: the class-like hierarchy
//! (namespaces, classes, structs, unions, enums) and the file hierarchy
//! (directories, files). Ancestry is inferred by stripping qualifying
//! segments and taking the longest registered prefix; a genuine tie aborts
//! the build rather than guessing.
//!
//! Nodes are created once, mutated only during the resolution pass, and never
//! deleted: a node hidden by the listing policy stays in the graph as an
//! orphan. After [`ApiGraph::resolve`] returns, the graph is read-only.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

use crate::compound::{CompoundKind, CompoundRecord};
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::identity::IdentityAllocator;
use crate::listing::ListingPolicy;
use crate::template::{self, Token};

/// Index of a node inside the graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// One resolved API entity.
///
/// `parent` and `def_in_file` are plain ids — existence lookups into the
/// arena, never owning references. A file's `children` may contain nodes
/// whose `parent` points elsewhere: compounds belong to the class-like tree
/// through `parent` and to their defining file through membership only.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: CompoundKind,
    /// Fully-qualified name, or path for files and directories.
    pub name: String,
    pub refid: String,
    pub location: Option<String>,
    pub raw_signature: Option<String>,
    pub parent: Option<NodeId>,
    /// Discovery order; rendering steps re-sort their own views.
    pub children: Vec<NodeId>,
    /// The file node holding this compound's textual definition.
    pub def_in_file: Option<NodeId>,
    /// File nodes only: namespaces contributing members to this file.
    pub namespaces_used: Vec<NodeId>,
    /// Present when the name carries template arguments.
    pub template_tokens: Option<Vec<Token>>,
    pub link_name: String,
    pub file_name: String,
    pub program_link_name: Option<String>,
    pub program_file_name: Option<String>,
    /// Title qualifier, e.g. `Class` or `Template Struct`.
    pub qualifier: String,
    /// Local display name used in tree views and page titles.
    pub display_name: String,
    /// Hidden from per-container listings by the exclusion policy.
    pub excluded_from_listing: bool,
}

impl Node {
    /// Last `::` component of the qualified name.
    pub fn local_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }

    /// Path identifying this node on disk; files prefer their parsed
    /// location, directories are named by their path.
    pub fn path(&self) -> &str {
        match self.kind {
            CompoundKind::File => self.location.as_deref().unwrap_or(&self.name),
            _ => &self.name,
        }
    }

    /// Full page title, e.g. `Struct one` or `Template Class Foo`.
    pub fn title(&self) -> String {
        if self.qualifier.is_empty() {
            self.display_name.clone()
        } else {
            format!("{} {}", self.qualifier, self.display_name)
        }
    }
}

/// Outcome of longest-qualifying-prefix ancestor resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestorMatch {
    Found(NodeId),
    /// Two candidates matched a prefix of equal length; the caller must
    /// flag this, never silently pick one.
    Ambiguous(NodeId, NodeId),
    None,
}

/// Strip successive qualifying segments from `name` and return the longest
/// registered ancestor. `candidates` maps qualified names to the nodes
/// claiming them.
pub fn resolve_ancestor(
    candidates: &HashMap<String, Vec<NodeId>>,
    name: &str,
) -> AncestorMatch {
    let parts: Vec<&str> = name.split("::").collect();
    if parts.len() < 2 {
        return AncestorMatch::None;
    }
    for take in (1..parts.len()).rev() {
        let prefix = parts[..take].join("::");
        match candidates.get(&prefix).map(Vec::as_slice) {
            Some([only]) => return AncestorMatch::Found(*only),
            Some([first, second, ..]) => return AncestorMatch::Ambiguous(*first, *second),
            _ => {}
        }
    }
    AncestorMatch::None
}

/// The resolved node arena plus the top-level bucket per kind.
#[derive(Debug, Default)]
pub struct ApiGraph {
    nodes: Vec<Node>,
    /// Unparented nodes per kind, in discovery order.
    roots: IndexMap<CompoundKind, Vec<NodeId>>,
    by_refid: HashMap<String, NodeId>,
}

impl ApiGraph {
    fn new() -> Self {
        let mut roots = IndexMap::new();
        for kind in CompoundKind::ALL {
            roots.insert(kind, Vec::new());
        }
        Self {
            nodes: Vec::new(),
            roots,
            by_refid: HashMap::new(),
        }
    }

    /// Run the whole resolution pass over a flat record list.
    ///
    /// Configuration is validated first; any error in it, in a template
    /// name, in ancestor resolution, or in identity allocation aborts the
    /// build with the first failure.
    pub fn resolve(records: &[CompoundRecord], config: &GenerationConfig) -> Result<ApiGraph> {
        let policy = config
            .compile_policy()
            .context("invalid listing configuration")?;

        let mut graph = ApiGraph::new();
        graph
            .classify(records)
            .context("classifying compound records")?;
        graph
            .reparent_kind_set(
                &[CompoundKind::Union],
                &[
                    CompoundKind::Namespace,
                    CompoundKind::Class,
                    CompoundKind::Struct,
                    CompoundKind::Union,
                ],
            )
            .context("reparenting unions")?;
        graph
            .reparent_kind_set(
                &[CompoundKind::Class, CompoundKind::Struct],
                &[CompoundKind::Namespace, CompoundKind::Class, CompoundKind::Struct],
            )
            .context("reparenting classes and structs")?;
        graph
            .reparent_kind_set(
                &[
                    CompoundKind::Enum,
                    CompoundKind::Typedef,
                    CompoundKind::Variable,
                    CompoundKind::Define,
                    CompoundKind::Function,
                ],
                &[
                    CompoundKind::Namespace,
                    CompoundKind::Class,
                    CompoundKind::Struct,
                    CompoundKind::Union,
                ],
            )
            .context("attaching scoped members")?;
        graph.reparent_directories();
        graph.attach_files_to_directories();
        graph.link_definition_files();
        graph.rename_to_namespace_scopes();
        graph
            .reparent_kind_set(
                &[CompoundKind::Namespace],
                &[CompoundKind::Namespace, CompoundKind::Class, CompoundKind::Struct],
            )
            .context("reparenting namespaces")?;
        graph.dedup_children();
        graph
            .allocate_identities(config)
            .context("allocating output identities")?;
        graph.derive_titles();
        graph.annotate_visibility(&policy);
        Ok(graph)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Top-level (unparented) nodes of `kind`, in discovery order.
    pub fn top_level(&self, kind: CompoundKind) -> &[NodeId] {
        self.roots.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every node of `kind`, parented or not, in discovery order.
    pub fn all_of_kind(&self, kind: CompoundKind) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.kind == kind)
            .map(|n| n.id)
            .collect()
    }

    pub fn find(&self, kind: CompoundKind, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.kind == kind && n.name == name)
            .map(|n| n.id)
    }

    pub fn by_refid(&self, refid: &str) -> Option<NodeId> {
        self.by_refid.get(refid).copied()
    }

    // ------------------------------------------------------------------
    // Hierarchy views
    // ------------------------------------------------------------------

    /// Whether a node shows up in the class-like hierarchy view: it is a
    /// struct/class/enum/union not hidden by the exclusion policy, or a
    /// namespace with at least one such descendant.
    pub fn in_class_hierarchy(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match node.kind {
            CompoundKind::Namespace => node
                .children
                .iter()
                .any(|child| self.in_class_hierarchy(*child)),
            CompoundKind::Class
            | CompoundKind::Struct
            | CompoundKind::Enum
            | CompoundKind::Union => !node.excluded_from_listing,
            _ => false,
        }
    }

    /// Whether a node shows up in the file hierarchy view.
    pub fn in_file_hierarchy(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match node.kind {
            CompoundKind::File => !node.excluded_from_listing,
            CompoundKind::Dir => node
                .children
                .iter()
                .any(|child| self.in_file_hierarchy(*child)),
            _ => false,
        }
    }

    /// Direct descendants presented under `id` in the class hierarchy view,
    /// grouped (nested namespaces, then class-like, then enums, then unions)
    /// and sorted by name within each group.
    pub fn class_view_children(&self, id: NodeId) -> Vec<NodeId> {
        let node = self.node(id);
        match node.kind {
            CompoundKind::Class | CompoundKind::Struct => {
                let mut class_like = Vec::new();
                let mut enums = Vec::new();
                let mut unions = Vec::new();
                for &child in &node.children {
                    if !self.in_class_hierarchy(child) {
                        continue;
                    }
                    match self.node(child).kind {
                        CompoundKind::Class | CompoundKind::Struct => class_like.push(child),
                        CompoundKind::Enum => enums.push(child),
                        CompoundKind::Union => unions.push(child),
                        _ => {}
                    }
                }
                self.sort_by_name(&mut class_like);
                self.sort_by_name(&mut enums);
                self.sort_by_name(&mut unions);
                class_like.into_iter().chain(enums).chain(unions).collect()
            }
            CompoundKind::Namespace => {
                let mut nested = Vec::new();
                let mut members = Vec::new();
                for &child in &node.children {
                    if !self.in_class_hierarchy(child) {
                        continue;
                    }
                    if self.node(child).kind == CompoundKind::Namespace {
                        nested.push(child);
                    } else {
                        members.push(child);
                    }
                }
                self.sort_by_name(&mut nested);
                self.sort_by_name(&mut members);
                nested.into_iter().chain(members).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Direct descendants presented under `id` in the file hierarchy view:
    /// nested directories first, then files; files are terminal.
    pub fn file_view_children(&self, id: NodeId) -> Vec<NodeId> {
        let node = self.node(id);
        if node.kind != CompoundKind::Dir {
            return Vec::new();
        }
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for &child in &node.children {
            if !self.in_file_hierarchy(child) {
                continue;
            }
            match self.node(child).kind {
                CompoundKind::Dir => dirs.push(child),
                CompoundKind::File => files.push(child),
                _ => {}
            }
        }
        self.sort_by_name(&mut dirs);
        self.sort_by_name(&mut files);
        dirs.into_iter().chain(files).collect()
    }

    /// Roots of the class hierarchy view: top-level namespaces, then
    /// class-like nodes, enums, and unions that never found a class-like
    /// parent, each group sorted by name.
    pub fn class_view_roots(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for kinds in [
            &[CompoundKind::Namespace][..],
            &[CompoundKind::Class, CompoundKind::Struct][..],
            &[CompoundKind::Enum][..],
            &[CompoundKind::Union][..],
        ] {
            let mut group: Vec<NodeId> = kinds
                .iter()
                .flat_map(|kind| self.top_level(*kind).iter().copied())
                .filter(|id| self.in_class_hierarchy(*id))
                .collect();
            self.sort_by_name(&mut group);
            out.extend(group);
        }
        out
    }

    /// Roots of the file hierarchy view: top-level directories, then
    /// top-level files, sorted by name.
    pub fn file_view_roots(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for kind in [CompoundKind::Dir, CompoundKind::File] {
            let mut group: Vec<NodeId> = self
                .top_level(kind)
                .iter()
                .copied()
                .filter(|id| self.in_file_hierarchy(*id))
                .collect();
            self.sort_by_name(&mut group);
            out.extend(group);
        }
        out
    }

    fn sort_by_name(&self, ids: &mut [NodeId]) {
        ids.sort_by(|a, b| {
            let left = self.node(*a);
            let right = self.node(*b);
            left.name.cmp(&right.name).then(left.kind.cmp(&right.kind))
        });
    }

    // ------------------------------------------------------------------
    // Resolution passes
    // ------------------------------------------------------------------

    fn classify(&mut self, records: &[CompoundRecord]) -> Result<(), GenerationError> {
        for record in records {
            if self.by_refid.contains_key(&record.refid) {
                warn!("duplicate refid `{}` ignored", record.refid);
                continue;
            }
            // Operator overloads legitimately carry unbalanced angle
            // brackets (`operator<<`); everything else must tokenize.
            let operator_overload =
                record.kind == CompoundKind::Function && record.name.contains("operator");
            let template_tokens = if record.name.contains('<') && !operator_overload {
                Some(template::tokenize(&record.name)?)
            } else {
                None
            };

            let id = NodeId(self.nodes.len());
            self.nodes.push(Node {
                id,
                kind: record.kind,
                name: record.name.clone(),
                refid: record.refid.clone(),
                location: record.location.clone(),
                raw_signature: record.raw_signature.clone(),
                parent: None,
                children: Vec::new(),
                def_in_file: None,
                namespaces_used: Vec::new(),
                template_tokens,
                link_name: String::new(),
                file_name: String::new(),
                program_link_name: None,
                program_file_name: None,
                qualifier: String::new(),
                display_name: String::new(),
                excluded_from_listing: false,
            });
            self.roots.entry(record.kind).or_default().push(id);
            self.by_refid.insert(record.refid.clone(), id);
        }
        debug!("classified {} compound records", self.nodes.len());
        Ok(())
    }

    /// Reparent every node of `targets` under its longest registered
    /// qualifying prefix among `ancestor_kinds`, then prune the parented
    /// nodes from their top-level buckets.
    fn reparent_kind_set(
        &mut self,
        targets: &[CompoundKind],
        ancestor_kinds: &[CompoundKind],
    ) -> Result<(), GenerationError> {
        let candidates = self.name_index(ancestor_kinds);
        let ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| targets.contains(&n.kind))
            .map(|n| n.id)
            .collect();

        for id in ids {
            let (kind, name) = {
                let node = &self.nodes[id.0];
                (node.kind, node.name.clone())
            };
            match resolve_ancestor(&candidates, &name) {
                AncestorMatch::Found(parent) => self.wire(parent, id),
                AncestorMatch::Ambiguous(first, second) => {
                    return Err(GenerationError::AmbiguousAncestor {
                        kind,
                        name,
                        first: self.nodes[first.0].name.clone(),
                        second: self.nodes[second.0].name.clone(),
                    });
                }
                AncestorMatch::None => {
                    if name.contains("::") {
                        debug!(
                            "{kind} `{name}` is scope-qualified but no registered ancestor was found"
                        );
                    }
                }
            }
        }
        for kind in targets {
            self.prune_parented_roots(*kind);
        }
        Ok(())
    }

    /// Directories nest by longest registered proper path prefix.
    fn reparent_directories(&mut self) {
        let dirs: Vec<(NodeId, String)> = self
            .nodes
            .iter()
            .filter(|n| n.kind == CompoundKind::Dir)
            .map(|n| (n.id, n.name.clone()))
            .collect();

        for (id, path) in &dirs {
            let mut best: Option<(usize, NodeId)> = None;
            for (candidate, candidate_path) in &dirs {
                if candidate == id {
                    continue;
                }
                let is_prefix = path
                    .strip_prefix(candidate_path)
                    .is_some_and(|rest| rest.starts_with('/'));
                if is_prefix && best.map_or(true, |(len, _)| candidate_path.len() > len) {
                    best = Some((candidate_path.len(), *candidate));
                }
            }
            if let Some((_, parent)) = best {
                self.wire(parent, *id);
            }
        }
        self.prune_parented_roots(CompoundKind::Dir);
    }

    /// Files attach to the directory matching their location's directory
    /// component; top-level files stay in the bucket.
    fn attach_files_to_directories(&mut self) {
        let dir_index: HashMap<String, NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.kind == CompoundKind::Dir)
            .map(|n| (n.name.clone(), n.id))
            .collect();
        let files: Vec<NodeId> = self.all_of_kind(CompoundKind::File);

        for id in files {
            let Some(path) = self.nodes[id.0].location.clone() else {
                warn!(
                    "cannot place file `{}`: its location was not discovered",
                    self.nodes[id.0].name
                );
                continue;
            };
            let Some((dirname, _)) = path.rsplit_once('/') else {
                debug!("file `{path}` sits at the top level");
                continue;
            };
            match dir_index.get(dirname) {
                Some(&parent) => self.wire(parent, id),
                None => warn!(
                    "could not find the directory parent of file `{}` (location `{path}`)",
                    self.nodes[id.0].name
                ),
            }
        }
        self.prune_parented_roots(CompoundKind::File);
    }

    /// Wire every located compound to its defining file node, and fan the
    /// namespace relation out to each contributing file.
    ///
    /// File membership never touches `parent`: a struct inside a namespace
    /// keeps the namespace as its parent while also being listed by the
    /// file that defines it.
    fn link_definition_files(&mut self) {
        let file_index: HashMap<String, NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.kind == CompoundKind::File)
            .map(|n| (n.path().to_string(), n.id))
            .collect();

        let located: Vec<(NodeId, String)> = self
            .nodes
            .iter()
            .filter(|n| {
                !n.kind.is_file_like()
                    && n.kind != CompoundKind::Namespace
                    && n.kind != CompoundKind::Page
            })
            .filter_map(|n| n.location.clone().map(|loc| (n.id, loc)))
            .collect();

        for (id, location) in located {
            match file_index.get(&location) {
                Some(&file) => {
                    self.nodes[id.0].def_in_file = Some(file);
                    self.attach_child(file, id);
                }
                None => warn!(
                    "definition file `{location}` for {} `{}` is not a registered file node",
                    self.nodes[id.0].kind, self.nodes[id.0].name
                ),
            }
        }

        // A file "uses" a namespace when it defines any of its members.
        let namespaces: Vec<NodeId> = self.all_of_kind(CompoundKind::Namespace);
        for ns in namespaces {
            let mut contributing: Vec<NodeId> = Vec::new();
            if let Some(location) = self.nodes[ns.0].location.clone() {
                if let Some(&file) = file_index.get(&location) {
                    contributing.push(file);
                }
            }
            for child in self.nodes[ns.0].children.clone() {
                if let Some(file) = self.nodes[child.0].def_in_file {
                    if !contributing.contains(&file) {
                        contributing.push(file);
                    }
                }
            }
            for file in contributing {
                if !self.nodes[file.0].namespaces_used.contains(&ns) {
                    self.nodes[file.0].namespaces_used.push(ns);
                }
            }
        }
    }

    /// Prepend the enclosing namespace scope to any child name that lacks
    /// it, so display and ancestry stay consistent even when the parser
    /// reported an unqualified member name.
    fn rename_to_namespace_scopes(&mut self) {
        let namespaces: Vec<NodeId> = self.all_of_kind(CompoundKind::Namespace);
        for ns in namespaces {
            let prefix = format!("{}::", self.nodes[ns.0].name);
            for child in self.nodes[ns.0].children.clone() {
                if !self.nodes[child.0].name.starts_with(&prefix) {
                    let renamed = format!("{}{}", prefix, self.nodes[child.0].name);
                    debug!(
                        "renaming `{}` to `{}` to carry its namespace scope",
                        self.nodes[child.0].name, renamed
                    );
                    self.nodes[child.0].name = renamed;
                }
            }
        }
    }

    fn dedup_children(&mut self) {
        for node in &mut self.nodes {
            let mut seen = HashSet::new();
            node.children.retain(|child| seen.insert(*child));
        }
    }

    fn allocate_identities(&mut self, config: &GenerationConfig) -> Result<(), GenerationError> {
        let mut allocator = IdentityAllocator::new(config.max_filename_length);
        for index in 0..self.nodes.len() {
            let kind = self.nodes[index].kind;
            let source = self.nodes[index].path().to_string();
            let identity = allocator.allocate(kind, &source)?;
            let node = &mut self.nodes[index];
            node.link_name = identity.link_name;
            node.file_name = identity.file_name;
            node.program_link_name = identity.program_link_name;
            node.program_file_name = identity.program_file_name;
        }
        Ok(())
    }

    fn derive_titles(&mut self) {
        for index in 0..self.nodes.len() {
            let (qualifier, display) = self.title_parts(NodeId(index));
            let node = &mut self.nodes[index];
            node.qualifier = qualifier;
            node.display_name = display;
        }
    }

    fn title_parts(&self, id: NodeId) -> (String, String) {
        let node = self.node(id);
        match node.kind {
            CompoundKind::File => {
                let base = node
                    .path()
                    .rsplit('/')
                    .next()
                    .unwrap_or(node.path())
                    .to_string();
                (node.kind.qualifier().to_string(), base)
            }
            CompoundKind::Dir => {
                let base = node
                    .name
                    .rsplit('/')
                    .next()
                    .unwrap_or(&node.name)
                    .to_string();
                (node.kind.qualifier().to_string(), base)
            }
            CompoundKind::Namespace => (
                node.kind.qualifier().to_string(),
                node.local_name().to_string(),
            ),
            CompoundKind::Page => (String::new(), node.name.clone()),
            _ => {
                let mut display = match &node.template_tokens {
                    Some(tokens) => template::display_name(tokens)
                        .unwrap_or_else(|| node.local_name().to_string()),
                    None => node.local_name().to_string(),
                };

                // Nested types read better with their immediate parent.
                let nested_kind = matches!(
                    node.kind,
                    CompoundKind::Class
                        | CompoundKind::Struct
                        | CompoundKind::Enum
                        | CompoundKind::Union
                );
                if nested_kind {
                    if let Some(parent) = node.parent {
                        let parent = self.node(parent);
                        if parent.kind.is_class_like() {
                            display = format!("{}::{}", parent.local_name(), display);
                        }
                    }
                }

                // Variables and typedefs keep their full qualification for
                // clarity, since the scope is not implied by a parent page.
                if matches!(node.kind, CompoundKind::Variable | CompoundKind::Typedef) {
                    display = node.name.clone();
                }

                let mut qualifier = node.kind.qualifier().to_string();
                if node.template_tokens.is_some() {
                    qualifier = format!("Template {qualifier}");
                }
                (qualifier, display)
            }
        }
    }

    fn annotate_visibility(&mut self, policy: &ListingPolicy) {
        for node in &mut self.nodes {
            node.excluded_from_listing = policy.excludes(&node.name);
        }
    }

    // ------------------------------------------------------------------
    // Wiring helpers
    // ------------------------------------------------------------------

    fn wire(&mut self, parent: NodeId, child: NodeId) {
        if !self.nodes[parent.0].children.contains(&child) {
            self.nodes[parent.0].children.push(child);
        }
        self.nodes[child.0].parent = Some(parent);
    }

    /// Membership without ownership: used for file children.
    fn attach_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.nodes[parent.0].children.contains(&child) {
            self.nodes[parent.0].children.push(child);
        }
    }

    fn prune_parented_roots(&mut self, kind: CompoundKind) {
        let nodes = &self.nodes;
        if let Some(bucket) = self.roots.get_mut(&kind) {
            bucket.retain(|id| nodes[id.0].parent.is_none());
        }
    }

    fn name_index(&self, kinds: &[CompoundKind]) -> HashMap<String, Vec<NodeId>> {
        let mut index: HashMap<String, Vec<NodeId>> = HashMap::new();
        for node in &self.nodes {
            if kinds.contains(&node.kind) {
                index.entry(node.name.clone()).or_default().push(node.id);
            }
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::CompoundRecord;

    fn record(kind: CompoundKind, name: &str) -> CompoundRecord {
        CompoundRecord::new(kind, name, format!("{}_{}", kind.name(), name))
    }

    fn resolve(records: &[CompoundRecord]) -> ApiGraph {
        ApiGraph::resolve(records, &GenerationConfig::default()).unwrap()
    }

    #[test]
    fn test_two_structs_share_one_namespace() {
        let graph = resolve(&[
            record(CompoundKind::Namespace, "nested"),
            record(CompoundKind::Struct, "nested::one"),
            record(CompoundKind::Struct, "nested::two"),
        ]);

        let ns = graph.find(CompoundKind::Namespace, "nested").unwrap();
        assert_eq!(graph.node(ns).children.len(), 2);
        for name in ["nested::one", "nested::two"] {
            let id = graph.find(CompoundKind::Struct, name).unwrap();
            let parent = graph.node(id).parent.unwrap();
            assert_eq!(graph.node(parent).name, "nested");
        }
        // Parented structs leave the top-level bucket.
        assert!(graph.top_level(CompoundKind::Struct).is_empty());
        assert_eq!(graph.top_level(CompoundKind::Namespace).len(), 1);
    }

    #[test]
    fn test_nested_class_prefers_longest_prefix() {
        let graph = resolve(&[
            record(CompoundKind::Namespace, "outer"),
            record(CompoundKind::Class, "outer::Shape"),
            record(CompoundKind::Class, "outer::Shape::Vertex"),
        ]);
        let vertex = graph.find(CompoundKind::Class, "outer::Shape::Vertex").unwrap();
        let parent = graph.node(vertex).parent.unwrap();
        assert_eq!(graph.node(parent).name, "outer::Shape");
        // Only the namespace remains top-level in the class-like grouping.
        assert!(graph.top_level(CompoundKind::Class).is_empty());
    }

    #[test]
    fn test_union_reparents_into_class() {
        let graph = resolve(&[
            record(CompoundKind::Class, "Packet"),
            record(CompoundKind::Union, "Packet::Payload"),
        ]);
        let union_id = graph.find(CompoundKind::Union, "Packet::Payload").unwrap();
        let parent = graph.node(union_id).parent.unwrap();
        assert_eq!(graph.node(parent).kind, CompoundKind::Class);
        assert!(graph.top_level(CompoundKind::Union).is_empty());
    }

    #[test]
    fn test_ambiguous_ancestor_is_fatal() {
        let records = [
            record(CompoundKind::Namespace, "a"),
            record(CompoundKind::Struct, "a"),
            record(CompoundKind::Class, "a::b"),
        ];
        let err = ApiGraph::resolve(&records, &GenerationConfig::default()).unwrap_err();
        let err = err.downcast_ref::<GenerationError>().unwrap();
        assert!(matches!(err, GenerationError::AmbiguousAncestor { .. }));
    }

    #[test]
    fn test_directory_nesting_by_path_prefix() {
        let graph = resolve(&[
            record(CompoundKind::Dir, "include"),
            record(CompoundKind::Dir, "include/detail"),
            record(CompoundKind::File, "detail.hpp")
                .with_location("include/detail/detail.hpp"),
            record(CompoundKind::File, "top.hpp").with_location("top.hpp"),
        ]);

        let detail = graph.find(CompoundKind::Dir, "include/detail").unwrap();
        let include = graph.find(CompoundKind::Dir, "include").unwrap();
        assert_eq!(graph.node(detail).parent, Some(include));
        // Nested directory left the top-level list.
        assert_eq!(graph.top_level(CompoundKind::Dir), &[include]);

        let header = graph.find(CompoundKind::File, "detail.hpp").unwrap();
        assert_eq!(graph.node(header).parent, Some(detail));
        // The root-level file stays top-level.
        let top = graph.find(CompoundKind::File, "top.hpp").unwrap();
        assert_eq!(graph.top_level(CompoundKind::File), &[top]);
    }

    #[test]
    fn test_def_in_file_and_namespaces_used() {
        let graph = resolve(&[
            record(CompoundKind::Dir, "include"),
            record(CompoundKind::File, "nested.hpp").with_location("include/nested.hpp"),
            record(CompoundKind::Namespace, "nested"),
            record(CompoundKind::Struct, "nested::one").with_location("include/nested.hpp"),
        ]);

        let file = graph.find(CompoundKind::File, "nested.hpp").unwrap();
        let ns = graph.find(CompoundKind::Namespace, "nested").unwrap();
        let one = graph.find(CompoundKind::Struct, "nested::one").unwrap();

        assert_eq!(graph.node(one).def_in_file, Some(file));
        // The struct stays owned by the namespace but is listed by the file.
        assert_eq!(graph.node(one).parent, Some(ns));
        assert!(graph.node(file).children.contains(&one));
        // The namespace itself is not a file child; it is recorded as used.
        assert!(!graph.node(file).children.contains(&ns));
        assert_eq!(graph.node(file).namespaces_used, vec![ns]);
    }

    #[test]
    fn test_unknown_definition_file_is_left_null() {
        let graph = resolve(&[
            record(CompoundKind::Struct, "stray").with_location("never/registered.hpp"),
        ]);
        let id = graph.find(CompoundKind::Struct, "stray").unwrap();
        assert_eq!(graph.node(id).def_in_file, None);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let records = [
            record(CompoundKind::Namespace, "nested"),
            record(CompoundKind::Namespace, "nested::dual_nested"),
            record(CompoundKind::Struct, "nested::one"),
            record(CompoundKind::Struct, "nested::dual_nested::two"),
            record(CompoundKind::Dir, "include"),
            record(CompoundKind::File, "nested.hpp").with_location("include/nested.hpp"),
        ];
        let snapshot = |graph: &ApiGraph| {
            graph
                .iter()
                .map(|n| {
                    (
                        n.name.clone(),
                        n.link_name.clone(),
                        n.parent.map(|p| graph.node(p).name.clone()),
                        n.children
                            .iter()
                            .map(|c| graph.node(*c).name.clone())
                            .collect::<Vec<_>>(),
                    )
                })
                .collect::<Vec<_>>()
        };
        let first = resolve(&records);
        let second = resolve(&records);
        assert_eq!(snapshot(&first), snapshot(&second));
    }

    #[test]
    fn test_link_names_are_unique() {
        let graph = resolve(&[
            record(CompoundKind::Namespace, "nested"),
            record(CompoundKind::Struct, "nested::one"),
            record(CompoundKind::Enum, "nested::Color"),
            record(CompoundKind::Class, "nested::Color2"),
        ]);
        let mut links: Vec<&str> = graph.iter().map(|n| n.link_name.as_str()).collect();
        links.sort_unstable();
        let before = links.len();
        links.dedup();
        assert_eq!(links.len(), before);
    }

    #[test]
    fn test_nested_namespace_reparenting() {
        let graph = resolve(&[
            record(CompoundKind::Namespace, "nested"),
            record(CompoundKind::Namespace, "nested::dual_nested"),
            record(CompoundKind::Struct, "nested::dual_nested::one"),
        ]);
        let dual = graph
            .find(CompoundKind::Namespace, "nested::dual_nested")
            .unwrap();
        let nested = graph.find(CompoundKind::Namespace, "nested").unwrap();
        assert_eq!(graph.node(dual).parent, Some(nested));
        assert_eq!(graph.top_level(CompoundKind::Namespace), &[nested]);

        let one = graph
            .find(CompoundKind::Struct, "nested::dual_nested::one")
            .unwrap();
        assert_eq!(graph.node(one).parent, Some(dual));
    }

    #[test]
    fn test_template_names_tokenize_during_classification() {
        let graph = resolve(&[record(CompoundKind::Struct, "ns::Foo< 12 >")]);
        let id = graph.find(CompoundKind::Struct, "ns::Foo< 12 >").unwrap();
        let node = graph.node(id);
        assert!(node.template_tokens.is_some());
        assert_eq!(node.qualifier, "Template Struct");
        assert_eq!(node.display_name, "Foo< 12 >");
    }

    #[test]
    fn test_operator_overloads_skip_tokenization() {
        let graph = resolve(&[record(CompoundKind::Function, "ns::operator<<")]);
        let id = graph.find(CompoundKind::Function, "ns::operator<<").unwrap();
        assert!(graph.node(id).template_tokens.is_none());
    }

    #[test]
    fn test_malformed_template_name_is_fatal() {
        let records = [record(CompoundKind::Struct, "broken< int")];
        let err = ApiGraph::resolve(&records, &GenerationConfig::default()).unwrap_err();
        let err = err.downcast_ref::<GenerationError>().unwrap();
        assert!(matches!(err, GenerationError::Tokenize { .. }));
    }

    #[test]
    fn test_class_view_membership_honors_exclusion() {
        let mut config = GenerationConfig::default();
        config
            .listing_exclude
            .push(crate::listing::ExclusionSpec::PatternWithFlags(
                ".*Impl$".into(),
                0,
            ));
        let graph = ApiGraph::resolve(
            &[
                record(CompoundKind::Namespace, "pimpl"),
                record(CompoundKind::Class, "pimpl::Earth"),
                record(CompoundKind::Class, "pimpl::EarthImpl"),
            ],
            &config,
        )
        .unwrap();

        let earth = graph.find(CompoundKind::Class, "pimpl::Earth").unwrap();
        let hidden = graph.find(CompoundKind::Class, "pimpl::EarthImpl").unwrap();
        assert!(graph.in_class_hierarchy(earth));
        assert!(!graph.in_class_hierarchy(hidden));
        // The orphan still exists with its own page identifiers.
        assert!(!graph.node(hidden).link_name.is_empty());
        assert!(graph.node(hidden).excluded_from_listing);

        let ns = graph.find(CompoundKind::Namespace, "pimpl").unwrap();
        assert_eq!(graph.class_view_children(ns), vec![earth]);
    }
}
