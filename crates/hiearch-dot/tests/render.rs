use hiearch_core::{Document, ErrorKind, Model, resolve_documents};
use hiearch_dot::{render_model, render_view};
use pretty_assertions::assert_eq;

fn model(yaml: &str) -> Model {
    let document: Document = serde_yaml::from_str(yaml).unwrap();
    resolve_documents([document]).unwrap()
}

const SYSTEM: &str = r#"
nodes:
  - id: [System, sys]
  - id: [Service, svc]
    scope: sys
    substitutions:
      owner: team-a
  - id: [Database, db]
    scope: svc
    graphviz:
      shape: cylinder
  - id: [Client, client]
edges:
  - link: [client, svc]
    label: queries
    graphviz:
      label_format: "<{label}>"
  - link: [svc, db]
    label: [open, "", close]
"#;

#[test]
fn scopes_become_clusters_and_edges_attach_to_them() {
    let model = model(&format!(
        "{SYSTEM}{}",
        r#"
views:
  - id: overview
    nodes: [client, sys, svc, db]
    graphviz:
      graph:
        rankdir: LR
      node:
        shape: box
        node_label_format: "{label} ({id})"
        scope_label_format: "[{label}]"
"#
    ));
    let dot = render_view(model.view("overview").unwrap(), &model.graph).unwrap();

    assert!(dot.starts_with("digraph \"overview\" {\n"), "{dot}");
    for expected in [
        "  rankdir=\"LR\";\n",
        "  compound=\"true\";\n",
        "  node [shape=\"box\"];\n",
        "  subgraph \"cluster_sys\" {\n",
        "    subgraph \"cluster_sys.svc\" {\n",
        "      label=\"[Service]\";\n",
        "      cluster=\"true\";\n",
        "      \"sys.svc.db\" [label=\"Database (db)\", shape=\"cylinder\"];\n",
        "  \"client\" [label=\"Client (client)\"];\n",
        "  \"client\" -> \"sys.svc.db\" [label=\"<queries>\", lhead=\"cluster_sys.svc\", headclip=\"false\"];\n",
    ] {
        assert!(dot.contains(expected), "missing {expected:?} in\n{dot}");
    }
    assert!(!dot.contains("node_label_format"));
}

#[test]
fn edge_label_slots_are_filled_when_non_empty() {
    let model = model(&format!(
        "{SYSTEM}{}",
        "views:\n  - id: inner\n    nodes: [svc, db]\n"
    ));
    let dot = render_view(model.view("inner").unwrap(), &model.graph).unwrap();

    let edge = dot
        .lines()
        .find(|line| line.contains("->"))
        .unwrap()
        .trim()
        .to_string();
    assert_eq!(
        edge,
        "\"svc.db\" -> \"svc.db\" [headlabel=\"close\", taillabel=\"open\", ltail=\"cluster_svc\", tailclip=\"false\"];"
    );
}

#[test]
fn unknown_placeholder_fails_rendering() {
    let model = model(&format!(
        "{SYSTEM}{}",
        r#"
views:
  - id: broken
    nodes: [db]
    graphviz:
      node:
        node_label_format: "{label} owned by {owner}"
"#
    ));
    let err = render_view(model.view("broken").unwrap(), &model.graph).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatFailed);
    assert_eq!(err.context_value("node"), Some("db"));
}

#[test]
fn expanded_views_can_name_their_origin() {
    let model = model(&format!(
        "{SYSTEM}{}",
        r#"
views:
  - id: flow
    nodes: [client, svc]
    expand: [recursive_out]
    graphviz:
      node:
        node_label_format: "{label} ({expanded_from})"
"#
    ));
    let rendered = render_model(&model).unwrap();
    let ids: Vec<&str> = rendered.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["flow", "flow_client_recursive_out", "flow_svc_recursive_out"]
    );
    assert!(rendered[1].dot.contains("[label=\"Client (flow)\"]"));
}

#[test]
fn empty_views_are_not_rendered() {
    let model = model(&format!(
        "{SYSTEM}{}",
        "views:\n  - id: empty\n    tags: [nothing]\n  - id: full\n    nodes: [db]\n"
    ));
    let rendered = render_model(&model).unwrap();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].id, "full");
}
