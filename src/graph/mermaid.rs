//! Mermaid serialization
//!
//! Walks the finished graph depth-first and emits a `graph TB` flowchart
//! description. Output is a pure function of the graph: identical input
//! produces byte-identical text, which is what the snapshot tests rely on.
//!
//! Layout per container block: member declarations (and nested blocks)
//! first, then the container's own relation lines, then `end`. Relation
//! lines live in the block of the node that carries them, so edges between
//! members of the same container stay inside that container's block and
//! never straddle an unrelated header/footer.

use std::fmt::Write;

use crate::graph::{Container, Graph, Member, Resource};
use crate::models::ResourceKind;

/// The fixed style palette, always declared whether used or not
const STYLE_CLASSES: &[(&str, &str)] = &[
    ("svc", "red"),
    ("pod", "blue"),
    ("dep", "green"),
    ("rset", "yellow"),
    ("sset", "magenta"),
    ("job", "purple"),
];

/// Serialize the whole graph to Mermaid flowchart text
pub fn to_mermaid(graph: &Graph) -> String {
    let mut out = String::from("graph TB\n");
    for namespace in graph.namespaces() {
        write_container(&mut out, namespace);
    }
    for (class, color) in STYLE_CLASSES {
        // Infallible on String
        let _ = writeln!(out, "classDef {class} fill:{color}");
    }
    out
}

fn write_container(out: &mut String, container: &Container) {
    let _ = writeln!(out, "subgraph \"{}: {}\"", container.kind.label(), container.name);
    for member in container.members() {
        match member {
            Member::Leaf(resource) => write_node_decl(out, resource),
            Member::Group(child) => write_container(out, child),
        }
    }
    for member in container.members() {
        if let Member::Leaf(resource) = member {
            if let Some(line) = relation_line(resource) {
                out.push_str(&line);
                out.push('\n');
            }
        }
    }
    out.push_str("end\n");
}

fn write_node_decl(out: &mut String, resource: &Resource) {
    let meta = resource.meta();
    match meta.style_class() {
        Some(class) => {
            let _ = writeln!(out, "{}(\"{}\"):::{}", meta.id, meta.name, class);
        }
        None => {
            let _ = writeln!(out, "{}(\"{}\")", meta.id, meta.name);
        }
    }
}

/// One relation line per node that has related nodes
///
/// A service lists its pods on the left of the arrow (traffic flows pod to
/// service); every other owner lists itself on the left (ownership flows
/// owner to child).
fn relation_line(resource: &Resource) -> Option<String> {
    let meta = resource.meta();
    if meta.related.is_empty() {
        return None;
    }
    let targets = meta.related.join(" & ");
    match meta.kind {
        ResourceKind::Service => Some(format!("{} --> {}", targets, meta.id)),
        _ => Some(format!("{} --> {}", meta.id, targets)),
    }
}
