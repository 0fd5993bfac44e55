//! Integration tests for the complete Ontograph pipeline
//!
//! These tests drive the public API end to end:
//! - sheet snapshot + context payload → built graph (pruning, depth, selection)
//! - built graph → display filters → hierarchy trees
//!
//! Run with: cargo test --test integration_tests

use serde_json::json;

use ontograph_core::{
    apply_filters, build_hierarchy_trees, parse_current_terms, resolve_terms, BuildConfig,
    BuildError, DependencyPayload, Diagnostic, DiagnosticKind, EdgeKind, FilterOptions, Graph,
    GraphBuilder, HierarchyNode, Provenance, RelationPalette, SheetRow, SheetSnapshot,
};

// ============================================================================
// Fixtures
// ============================================================================

fn sheet(header: &[&str], rows: serde_json::Value) -> SheetSnapshot {
    let rows: Vec<SheetRow> = serde_json::from_value(rows).expect("rows");
    SheetSnapshot::new(
        "animals",
        header.iter().map(|h| h.to_string()).collect(),
        rows,
    )
}

fn payload(value: serde_json::Value) -> DependencyPayload {
    serde_json::from_value(value).expect("payload")
}

fn build(sheet: &SheetSnapshot, payload: &DependencyPayload, selected: &[usize]) -> Graph {
    GraphBuilder::default()
        .build(sheet, payload, selected)
        .expect("build")
        .graph
}

fn ids(graph: &Graph) -> Vec<&str> {
    graph.nodes().map(|n| n.id.as_str()).collect()
}

fn depth(graph: &Graph, id: &str) -> Option<i32> {
    graph.node(id).and_then(|n| n.visual_depth)
}

fn animals() -> SheetSnapshot {
    sheet(
        &["ID", "Label", "Parent"],
        json!([
            { "ID": "A:1", "Label": "Animal", "Parent": "" },
            { "ID": "A:2", "Label": "Dog", "Parent": "Animal" }
        ]),
    )
}

// ============================================================================
// Graph building
// ============================================================================

#[test]
fn test_animal_dog_worked_example() {
    let graph = build(&animals(), &DependencyPayload::default(), &[]);

    assert_eq!(ids(&graph), vec!["A_1", "A_2"]);
    assert_eq!(graph.edge_count(), 1);
    let edge = &graph.edges()[0];
    assert_eq!((edge.source.as_str(), edge.target.as_str()), ("A_1", "A_2"));
    assert_eq!(edge.kind, EdgeKind::Hierarchy);
    assert_eq!(depth(&graph, "A_1"), Some(1));
    assert_eq!(depth(&graph, "A_2"), Some(2));
}

#[test]
fn test_isolated_dependency_is_pruned() {
    let context = payload(json!({
        "dependencies": [
            { "id": "UP:1", "label": "Organism" },
            { "id": "UP:2", "label": "Mineral" }
        ]
    }));
    let rows = sheet(
        &["ID", "Label", "Parent"],
        json!([{ "ID": "A:1", "Label": "Animal", "Parent": "Organism" }]),
    );
    let report = GraphBuilder::default()
        .build(&rows, &context, &[])
        .expect("build");

    assert_eq!(ids(&report.graph), vec!["A_1", "UP_1"]);
    assert_eq!(report.pruned, 1);
    assert_eq!(depth(&report.graph, "UP_1"), Some(0));
    assert_eq!(depth(&report.graph, "A_1"), Some(1));
}

#[test]
fn test_context_on_both_sides_of_the_sheet() {
    let context = payload(json!({
        "dependencies": [
            { "id": "UP:0", "label": "Entity" },
            { "id": "UP:1", "label": "Organism", "subClassOf": [{ "label": "Entity" }] }
        ],
        "derived": [
            { "id": "DN:1", "label": "Beagle", "subClassOf": [{ "id": "A:2" }] },
            { "id": "DN:2", "label": "Oak", "subClassOf": [{ "id": "P:9" }] }
        ]
    }));
    let rows = sheet(
        &["ID", "Label", "Parent"],
        json!([
            { "ID": "A:1", "Label": "Animal", "Parent": "Organism" },
            { "ID": "A:2", "Label": "Dog", "Parent": "Animal" }
        ]),
    );
    let graph = build(&rows, &context, &[]);

    assert_eq!(ids(&graph), vec!["A_1", "A_2", "DN_1", "UP_0", "UP_1"]);
    assert_eq!(depth(&graph, "UP_0"), Some(-1));
    assert_eq!(depth(&graph, "UP_1"), Some(0));
    assert_eq!(depth(&graph, "A_1"), Some(1));
    assert_eq!(depth(&graph, "A_2"), Some(2));
    // Derived leaf below the sheet inherits its parent's depth.
    assert_eq!(depth(&graph, "DN_1"), Some(2));
    assert_eq!(
        graph.node("DN_1").map(|n| n.provenance),
        Some(Provenance::Derived)
    );
    assert_eq!(graph.depth_range(), Some((-1, 2)));
}

#[test]
fn test_selection_keeps_lineage_only() {
    let rows = sheet(
        &["ID", "Label", "Parent"],
        json!([
            { "ID": "A:1", "Label": "Animal" },
            { "ID": "A:2", "Label": "Dog", "Parent": "Animal" },
            { "ID": "P:1", "Label": "Plant" },
            { "ID": "P:2", "Label": "Tree", "Parent": "Plant" }
        ]),
    );
    let graph = build(&rows, &DependencyPayload::default(), &[0]);
    assert_eq!(ids(&graph), vec!["A_1", "A_2"]);
    assert_eq!(graph.node("A_1").map(|n| n.is_selected), Some(true));
    assert_eq!(graph.node("A_2").map(|n| n.is_selected), Some(false));

    let report = GraphBuilder::default()
        .build(&rows, &DependencyPayload::default(), &[7])
        .expect("build");
    assert!(report.graph.is_empty());
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::new(DiagnosticKind::SelectionOutOfRange { row: 7 })]
    );
}

#[test]
fn test_unresolved_references_degrade_gracefully() {
    let rows = sheet(
        &["ID", "Label", "Parent", "REL 'part of'"],
        json!([
            { "ID": "A:1", "Label": "Animal", "Parent": "Ghost", "REL 'part of'": "Nowhere" },
            { "Label": "Half-typed row" }
        ]),
    );
    let report = GraphBuilder::default()
        .build(&rows, &DependencyPayload::default(), &[])
        .expect("build");

    assert_eq!(ids(&report.graph), vec!["A_1"]);
    assert_eq!(report.graph.edge_count(), 0);
    let kinds: Vec<&DiagnosticKind> = report.diagnostics.iter().map(|d| &d.kind).collect();
    assert!(kinds.contains(&&DiagnosticKind::MissingId { row: 1 }));
    assert!(kinds.contains(&&DiagnosticKind::UnresolvedParent {
        term_id: "A:1".to_string(),
        parent_label: "Ghost".to_string(),
    }));
    assert!(kinds.contains(&&DiagnosticKind::UnresolvedRelationTarget {
        term_id: "A:1".to_string(),
        relation: "part of".to_string(),
        target_label: "Nowhere".to_string(),
    }));
    assert_eq!(report.warnings().count(), 2);
}

#[test]
fn test_current_sheet_shadows_context_labels() {
    let context = payload(json!({
        "dependencies": [{ "id": "UP:9", "label": "Animal" }]
    }));
    let report = GraphBuilder::default()
        .build(&animals(), &context, &[])
        .expect("build");

    assert_eq!(ids(&report.graph), vec!["A_1", "A_2"]);
    assert!(report.diagnostics.iter().any(|d| matches!(
        &d.kind,
        DiagnosticKind::ShadowedLabel { kept_id, shadowed_id, .. }
            if kept_id == "A:1" && shadowed_id == "UP:9"
    )));
    assert_eq!(report.warnings().count(), 0);
}

#[test]
fn test_missing_id_column_fails_fast() {
    let rows = sheet(&["Label"], json!([{ "Label": "Animal" }]));
    let err = GraphBuilder::default()
        .build(&rows, &DependencyPayload::default(), &[])
        .expect_err("missing column");
    assert!(matches!(err, BuildError::MissingColumn { .. }));
}

#[test]
fn test_custom_columns_and_palette() {
    let config = BuildConfig {
        id_column: "Term ID".to_string(),
        parent_column: "Is A".to_string(),
        ..BuildConfig::default()
    }
    .with_palette(RelationPalette::neutral().with_color("eats", "#ff0000"));
    let rows = sheet(
        &["Term ID", "Label", "Is A", "REL 'eats'", "REL 'chases'"],
        json!([
            { "Term ID": "A:1", "Label": "Cat" },
            { "Term ID": "A:2", "Label": "Mouse", "Is A": "Cat", "REL 'chases'": "Cat" },
            { "Term ID": "A:3", "Label": "Cheese", "REL 'eats'": "Mouse" }
        ]),
    );
    let graph = GraphBuilder::new(config)
        .build(&rows, &DependencyPayload::default(), &[])
        .expect("build")
        .graph;

    let colors: Vec<(&str, Option<&str>)> = graph
        .edges_of_kind(false)
        .map(|e| (e.label.as_deref().unwrap_or(""), e.color.as_deref()))
        .collect();
    assert_eq!(colors, vec![("chases", Some("#999999")), ("eats", Some("#ff0000"))]);
    assert_eq!(graph.edges_of_kind(true).count(), 1);
}

#[test]
fn test_builds_are_deterministic() {
    let context = payload(json!({
        "dependencies": [{ "id": "UP:1", "label": "Organism" }],
        "derived": [{ "id": "DN:1", "label": "Beagle", "subClassOf": [{ "label": "Dog" }] }]
    }));
    let first = build(&animals(), &context, &[1]);
    let second = build(&animals(), &context, &[1]);
    assert_eq!(first, second);

    let options = FilterOptions::permissive(&first);
    assert_eq!(
        apply_filters(&first, &options),
        apply_filters(&second, &options)
    );
}

#[test]
fn test_graph_clone_is_independent() {
    let original = build(&animals(), &DependencyPayload::default(), &[]);
    let mut copy = original.clone();
    copy.remove_node("A_1");
    assert_eq!(original.node_count(), 2);
    assert_eq!(original.edge_count(), 1);
    assert_eq!(copy.node_count(), 1);
    assert_eq!(copy.edge_count(), 0);
}

// ============================================================================
// Resolution without building
// ============================================================================

#[test]
fn test_parse_and_resolve_standalone() {
    let parsed = parse_current_terms(&animals(), &BuildConfig::default()).expect("parse");
    assert_eq!(parsed.terms.len(), 2);

    let resolved = resolve_terms(parsed.terms, Vec::new(), Vec::new());
    assert_eq!(resolved.id_for_label("Dog"), Some("A:2"));
    assert_eq!(
        resolved.get("A:2").map(|t| t.parent_ids.clone()),
        Some(vec!["A:1".to_string()])
    );
}

// ============================================================================
// Filters and trees
// ============================================================================

fn flatten(forest: &[HierarchyNode]) -> Vec<String> {
    forest
        .iter()
        .flat_map(|t| t.preorder_ids())
        .map(str::to_string)
        .collect()
}

#[test]
fn test_filter_then_tree_places_multi_parent_once() {
    let rows = sheet(
        &["ID", "Label", "Parent", "Curation Status"],
        json!([
            { "ID": "A:1", "Label": "Animal", "Curation Status": "Released" },
            { "ID": "A:2", "Label": "Pet", "Curation Status": "Obsolete" },
            { "ID": "A:3", "Label": "Dog", "Parent": "Animal;Pet", "Curation Status": "Released" }
        ]),
    );
    let graph = build(&rows, &DependencyPayload::default(), &[]);

    let everything = apply_filters(&graph, &FilterOptions::permissive(&graph));
    let forest = build_hierarchy_trees(&everything.nodes, &everything.hierarchy_edges);
    assert_eq!(flatten(&forest), vec!["A_1", "A_3", "A_2"]);
    assert!(forest[1].children.is_empty());

    let released = FilterOptions {
        curation_statuses: ["Released".to_string()].into_iter().collect(),
        ..FilterOptions::permissive(&graph)
    };
    let visible = apply_filters(&graph, &released);
    assert_eq!(visible.hierarchy_edges.len(), 1);
    let forest = build_hierarchy_trees(&visible.nodes, &visible.hierarchy_edges);
    assert_eq!(forest.len(), 1);
    assert_eq!(flatten(&forest), vec!["A_1", "A_3"]);
}

#[test]
fn test_other_sheet_visibility_and_depth_limit() {
    let context = payload(json!({
        "dependencies": [
            { "id": "UP:0", "label": "Entity", "curationStatus": "Released" },
            {
                "id": "UP:1",
                "label": "Organism",
                "curationStatus": "Released",
                "subClassOf": [{ "label": "Entity" }]
            }
        ],
        "derived": [
            {
                "id": "DN:1",
                "label": "Beagle",
                "curationStatus": "Released",
                "subClassOf": [{ "label": "Dog" }]
            }
        ]
    }));
    let rows = sheet(
        &["ID", "Label", "Parent", "Curation Status"],
        json!([
            { "ID": "A:1", "Label": "Animal", "Parent": "Organism", "Curation Status": "Released" },
            { "ID": "A:2", "Label": "Dog", "Parent": "Animal", "Curation Status": "Released" }
        ]),
    );
    let graph = build(&rows, &context, &[]);

    let hidden_context = FilterOptions {
        curation_statuses: ["Released".to_string()].into_iter().collect(),
        ..FilterOptions::default()
    };
    let visible = apply_filters(&graph, &hidden_context);
    let ids: Vec<&str> = visible.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["A_1", "A_2", "UP_1"]);

    let shallow = FilterOptions {
        max_child_depth: Some(1),
        ..FilterOptions::permissive(&graph)
    };
    let visible = apply_filters(&graph, &shallow);
    let ids: Vec<&str> = visible.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["A_1", "UP_0", "UP_1"]);
    assert_eq!(visible.hierarchy_edges.len(), 2);
}
