//! Tree-view rendering for the resolved hierarchies.
//!
//! Walks a resolved hierarchy depth-first and emits one of three encodings:
//! a plain RST bullet list, a collapsible HTML `<ul>`/`<li>` list wrapped in
//! raw-HTML markers, or script-driven tree data returned from a named
//! accessor function. Rendering never mutates the graph, and two renders of
//! the same graph with the same configuration are byte-identical.

use crate::config::{GenerationConfig, TreeViewMode};
use crate::graph::{ApiGraph, NodeId};

/// Which resolved hierarchy to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hierarchy {
    Class,
    File,
}

impl Hierarchy {
    pub fn title(&self) -> &'static str {
        match self {
            Hierarchy::Class => "Class Hierarchy",
            Hierarchy::File => "File Hierarchy",
        }
    }

    /// Id of the HTML element the client-side widget binds to.
    fn element_id(&self) -> &'static str {
        match self {
            Hierarchy::Class => "class-treeView",
            Hierarchy::File => "file-treeView",
        }
    }

    /// Name of the script accessor function holding the tree data.
    fn accessor(&self) -> &'static str {
        match self {
            Hierarchy::Class => "getClassHierarchyTree",
            Hierarchy::File => "getFileHierarchyTree",
        }
    }
}

/// Heading underline: `len(title)` repetitions of `mark`.
pub fn heading_mark(title: &str, mark: char) -> String {
    std::iter::repeat(mark).take(title.chars().count()).collect()
}

/// Render one hierarchy view as an RST fragment.
///
/// Returns the empty string when the hierarchy has no visible nodes, so the
/// caller can skip emitting the section entirely.
pub fn render_hierarchy(graph: &ApiGraph, hierarchy: Hierarchy, config: &GenerationConfig) -> String {
    let roots = match hierarchy {
        Hierarchy::Class => graph.class_view_roots(),
        Hierarchy::File => graph.file_view_roots(),
    };

    let mut body = String::new();
    let last = roots.len().saturating_sub(1);
    for (index, root) in roots.iter().enumerate() {
        match config.tree_view {
            TreeViewMode::Off => write_plain(graph, hierarchy, *root, 0, &mut body),
            TreeViewMode::Collapsible => {
                write_html(graph, hierarchy, *root, 0, index == last, &mut body)
            }
            TreeViewMode::Script => write_script(graph, hierarchy, *root, 0, &mut body),
        }
    }
    if body.is_empty() {
        return String::new();
    }

    let content = match config.tree_view {
        TreeViewMode::Off => body,
        TreeViewMode::Collapsible => {
            wrap_collapsible(hierarchy, &prepare_data(body, config.minify_tree_view, false))
        }
        TreeViewMode::Script => {
            wrap_script(hierarchy, &prepare_data(body, config.minify_tree_view, true))
        }
    };

    let title = hierarchy.title();
    let mut out = format!("{}\n{}\n\n", title, heading_mark(title, '-'));
    out.push_str(&content);
    out.push_str("\n\n");
    out
}

fn view_children(graph: &ApiGraph, hierarchy: Hierarchy, id: NodeId) -> Vec<NodeId> {
    match hierarchy {
        Hierarchy::Class => graph.class_view_children(id),
        Hierarchy::File => graph.file_view_children(id),
    }
}

fn write_plain(graph: &ApiGraph, hierarchy: Hierarchy, id: NodeId, level: usize, out: &mut String) {
    let node = graph.node(id);
    out.push_str(&format!(
        "{}- :ref:`{}`\n",
        "    ".repeat(level),
        node.link_name
    ));
    for child in view_children(graph, hierarchy, id) {
        write_plain(graph, hierarchy, child, level + 1, out);
    }
}

/// Anchor slug inside the generated page: double underscores fold to one,
/// then underscores become hyphens.
fn anchor(link_name: &str) -> String {
    link_name.replace("__", "_").replace('_', "-")
}

fn href(graph: &ApiGraph, id: NodeId) -> String {
    let node = graph.node(id);
    let stem = node
        .file_name
        .strip_suffix(".rst")
        .unwrap_or(&node.file_name);
    format!("{}.html#{}", stem, anchor(&node.link_name))
}

fn write_html(
    graph: &ApiGraph,
    hierarchy: Hierarchy,
    id: NodeId,
    level: usize,
    last_child: bool,
    out: &mut String,
) {
    let node = graph.node(id);
    let children = view_children(graph, hierarchy, id);

    let indent = "  ".repeat(level * 2);
    let next_indent = format!("  {indent}");
    let opening_li = if last_child {
        "<li class=\"lastChild\">"
    } else {
        "<li>"
    };
    let link_title = html_escape::encode_text(&node.display_name);
    let li_text = format!(
        "{} <a href=\"{}\">{}</a>",
        node.qualifier,
        href(graph, id),
        link_title
    );

    if children.is_empty() {
        out.push_str(&format!("{indent}{opening_li}{li_text}</li>\n"));
        return;
    }

    out.push_str(&format!(
        "{indent}{opening_li}\n{next_indent}{li_text}\n{next_indent}<ul>\n"
    ));
    let last = children.len() - 1;
    for (index, child) in children.iter().enumerate() {
        write_html(graph, hierarchy, *child, level + 1, index == last, out);
    }
    out.push_str(&format!("{next_indent}</ul>\n{indent}</li>\n"));
}

fn write_script(graph: &ApiGraph, hierarchy: Hierarchy, id: NodeId, level: usize, out: &mut String) {
    let node = graph.node(id);
    let children = view_children(graph, hierarchy, id);

    let indent = "  ".repeat(level * 2);
    let next_indent = format!("  {indent}");
    let text_html = format!(
        "<span class=\"text-muted\">{}</span> {}",
        node.qualifier,
        html_escape::encode_text(&node.display_name)
    );
    // serde_json handles the quoting and escaping of the display text.
    let text_literal = serde_json::to_string(&text_html).unwrap();

    out.push_str(&format!("{indent}{{\n{next_indent}text: {text_literal},\n"));
    out.push_str(&format!(
        "{next_indent}href: \"{}\",\n{next_indent}selectable: false,\n",
        href(graph, id)
    ));
    if children.is_empty() {
        out.push_str(&format!("{indent}}},\n"));
        return;
    }

    out.push_str(&format!("{next_indent}tags: ['{}'],\n", children.len()));
    out.push_str(&format!("\n{next_indent}nodes: [\n"));
    for child in &children {
        write_script(graph, hierarchy, *child, level + 1, out);
    }
    out.push_str(&format!("{next_indent}]\n{indent}}},\n"));
}

/// Minify (when requested) and indent the encoded data to sit under the
/// raw-HTML marker.
fn prepare_data(data: String, minify: bool, script: bool) -> String {
    let data = if minify {
        let mut flat: String = data.lines().map(str::trim).collect();
        if script {
            // Separator cleanup; the commas removed here are redundant in
            // the array grammar, so the logical tree is unchanged.
            flat = flat
                .replace(": ", ":")
                .replace(",}", "}")
                .replace(",,", ",")
                .replace(",]", "]");
        }
        flat
    } else {
        data
    };

    let indent = " ".repeat(9);
    let mut out = String::new();
    for line in data.lines() {
        if !line.is_empty() {
            out.push_str(&indent);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

fn wrap_collapsible(hierarchy: Hierarchy, data: &str) -> String {
    let idx = hierarchy.element_id();
    let mut out = String::new();
    out.push_str("\n.. raw:: html\n\n");
    out.push_str(&format!("   <ul class=\"treeView\" id=\"{idx}\">\n"));
    out.push_str("     <li>\n");
    out.push_str("       <ul class=\"collapsibleList\">\n");
    out.push_str(data);
    out.push_str("       </ul>\n");
    out.push_str("     </li><!-- only tree view element -->\n");
    out.push_str(&format!("   </ul><!-- /treeView {idx} -->\n"));
    out.push_str("\n.. end raw html for treeView\n");
    out
}

fn wrap_script(hierarchy: Hierarchy, data: &str) -> String {
    let idx = hierarchy.element_id();
    let accessor = hierarchy.accessor();
    let mut out = String::new();
    out.push_str("\n.. raw:: html\n\n");
    out.push_str(&format!("   <div id=\"{idx}\"></div>\n"));
    out.push_str("   <script type=\"text/javascript\">\n");
    out.push_str(&format!("     function {accessor}() {{\n"));
    out.push_str("        return [\n");
    out.push_str(data);
    out.push_str("        ]\n");
    out.push_str("     }\n");
    out.push_str(&format!("   </script><!-- end {accessor}() function -->\n"));
    out.push_str("\n.. end raw html for treeView\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::{CompoundKind, CompoundRecord};

    fn sample_graph(config: &GenerationConfig) -> ApiGraph {
        let records = [
            CompoundRecord::new(CompoundKind::Namespace, "nested", "ns_nested"),
            CompoundRecord::new(CompoundKind::Struct, "nested::one", "s_one"),
            CompoundRecord::new(CompoundKind::Struct, "nested::two", "s_two"),
            CompoundRecord::new(CompoundKind::Dir, "include", "d_include"),
            CompoundRecord::new(CompoundKind::File, "nested.hpp", "f_nested")
                .with_location("include/nested.hpp"),
        ];
        ApiGraph::resolve(&records, config).unwrap()
    }

    #[test]
    fn test_plain_class_view() {
        let config = GenerationConfig::default();
        let graph = sample_graph(&config);
        let out = render_hierarchy(&graph, Hierarchy::Class, &config);

        let expected_body = "\
- :ref:`namespace_nested`
    - :ref:`struct_nested_3a_3aone`
    - :ref:`struct_nested_3a_3atwo`
";
        assert!(out.starts_with("Class Hierarchy\n---------------\n\n"));
        assert!(out.contains(expected_body));
    }

    #[test]
    fn test_plain_file_view() {
        let config = GenerationConfig::default();
        let graph = sample_graph(&config);
        let out = render_hierarchy(&graph, Hierarchy::File, &config);
        assert!(out.contains("- :ref:`dir_include`\n    - :ref:`file_include_2fnested_2ehpp`\n"));
    }

    #[test]
    fn test_collapsible_structure() {
        let mut config = GenerationConfig::default();
        config.tree_view = TreeViewMode::Collapsible;
        let graph = sample_graph(&config);
        let out = render_hierarchy(&graph, Hierarchy::Class, &config);

        assert!(out.contains(".. raw:: html"));
        assert!(out.contains("<ul class=\"treeView\" id=\"class-treeView\">"));
        assert!(out.contains(".. end raw html for treeView"));
        // The namespace wraps its two structs in a nested list; the second
        // struct is the last child at its level.
        assert!(out.contains("Namespace <a href="));
        assert!(out.contains("<li class=\"lastChild\">Struct <a href="));
        assert_eq!(out.matches("<ul>").count(), 1);
        assert_eq!(out.matches("</ul>").count(), 3); // nested + two wrapper lists
    }

    #[test]
    fn test_script_structure() {
        let mut config = GenerationConfig::default();
        config.tree_view = TreeViewMode::Script;
        let graph = sample_graph(&config);
        let out = render_hierarchy(&graph, Hierarchy::File, &config);

        assert!(out.contains("function getFileHierarchyTree() {"));
        assert!(out.contains("text: \"<span class=\\\"text-muted\\\">Directory</span> include\""));
        assert!(out.contains("selectable: false"));
        assert!(out.contains("tags: ['1']"));
        assert!(out.contains("nodes: ["));
    }

    #[test]
    fn test_minified_collapsible_is_one_line() {
        let mut config = GenerationConfig::default();
        config.tree_view = TreeViewMode::Collapsible;
        config.minify_tree_view = true;
        let graph = sample_graph(&config);
        let out = render_hierarchy(&graph, Hierarchy::Class, &config);

        // The whole tree collapses onto a single line, order unchanged.
        let line = out
            .lines()
            .find(|line| line.contains("struct_nested_3a_3aone"))
            .unwrap();
        assert!(line.contains("namespace_nested"));
        let one = line.find("struct_nested_3a_3aone").unwrap();
        let two = line.find("struct_nested_3a_3atwo").unwrap();
        assert!(one < two);
        assert_eq!(
            out.lines().filter(|l| l.contains("</li>")).count(),
            2,
            "one minified data line plus the wrapper list element"
        );
    }

    #[test]
    fn test_minified_script_separator_cleanup() {
        let mut config = GenerationConfig::default();
        config.tree_view = TreeViewMode::Script;
        config.minify_tree_view = true;
        let graph = sample_graph(&config);
        let out = render_hierarchy(&graph, Hierarchy::File, &config);

        let data_line = out
            .lines()
            .find(|line| line.contains("text:"))
            .unwrap();
        assert!(data_line.contains("selectable:false"));
        assert!(!data_line.contains(",]"));
        assert!(!data_line.contains(",}"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let mut config = GenerationConfig::default();
        config.tree_view = TreeViewMode::Script;
        let graph = sample_graph(&config);
        let first = render_hierarchy(&graph, Hierarchy::Class, &config);
        let second = render_hierarchy(&graph, Hierarchy::Class, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_hierarchy_renders_nothing() {
        let config = GenerationConfig::default();
        let graph = ApiGraph::resolve(&[], &config).unwrap();
        assert_eq!(render_hierarchy(&graph, Hierarchy::Class, &config), "");
    }
}
