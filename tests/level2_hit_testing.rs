//! Level 2: Hit Testing
//!
//! Priority between overlapping targets, the zoom-dependent click area of
//! small nodes, groups, and spatial index freshness.

mod common;

use common::{geometry, geometry_with, io_edge, io_node, pair_graph, viewport};
use flow_canvas::{
    CanvasSnapshot, EdgeEnd, FlowCanvasSettings, Graph, HitResult, HitTester, Node, PortHit, Rect,
    ResizeHandle, Shape,
};
use proptest::prelude::*;

// ============================================================================
// Overlap and priority
// ============================================================================

#[test]
fn test_later_node_wins_overlap() {
    let mut graph = Graph::new();
    graph.add_node(Node::new(1, 0.0, 0.0).with_size(200.0, 200.0));
    graph.add_node(Node::new(2, 50.0, 50.0).with_size(200.0, 200.0));
    let (vp, geo) = (viewport(1.0), geometry());
    let snap = CanvasSnapshot::new(&graph, &vp, &geo);
    let mut hits = HitTester::new();

    assert_eq!(hits.hit_test_node(&snap, 100.0, 100.0), Some(2));
    assert_eq!(hits.hit_test_node(&snap, 20.0, 20.0), Some(1));
}

#[test]
fn test_combined_priority_on_pair() {
    let mut graph = pair_graph();
    let (vp, geo) = (viewport(1.0), geometry());
    let mut hits = HitTester::new();

    {
        let snap = CanvasSnapshot::new(&graph, &vp, &geo);
        // Output port of node 1 sits at (200, 130)
        assert_eq!(
            hits.hit_test(&snap, 200.0, 130.0),
            Some(HitResult::Port(PortHit { node_id: 1, port_id: 11, is_output: true, index: 0 }))
        );
        assert_eq!(hits.hit_test(&snap, 150.0, 130.0), Some(HitResult::Node(1)));
        assert_eq!(hits.hit_test(&snap, 300.0, 130.0), Some(HitResult::Edge(1)));
        assert_eq!(hits.hit_test(&snap, 300.0, 400.0), None);
    }

    // Selected edges expose endpoint handles above the port
    graph.set_edge_selected(1, true);
    let snap = CanvasSnapshot::new(&graph, &vp, &geo);
    assert_eq!(
        hits.hit_test(&snap, 200.0, 130.0),
        Some(HitResult::EdgeEndpoint { edge_id: 1, end: EdgeEnd::Source })
    );
    assert_eq!(
        hits.hit_test(&snap, 400.0, 130.0),
        Some(HitResult::EdgeEndpoint { edge_id: 1, end: EdgeEnd::Target })
    );
}

#[test]
fn test_resize_handle_beats_node_body() {
    let mut graph = pair_graph();
    if let Some(node) = graph.node_mut(1) {
        node.is_selected = true;
        node.is_resizable = true;
    }
    let (vp, geo) = (viewport(1.0), geometry());
    let snap = CanvasSnapshot::new(&graph, &vp, &geo);
    let mut hits = HitTester::new();

    assert_eq!(
        hits.hit_test(&snap, 101.0, 101.0),
        Some(HitResult::ResizeHandle { node_id: 1, handle: ResizeHandle::TopLeft })
    );
    assert_eq!(
        hits.hit_test(&snap, 150.0, 160.0),
        Some(HitResult::ResizeHandle { node_id: 1, handle: ResizeHandle::Bottom })
    );
    // Unselected node 2 shows no handles
    assert_eq!(hits.hit_test(&snap, 401.0, 101.0), Some(HitResult::Node(2)));
}

#[test]
fn test_shape_beats_node() {
    let mut graph = pair_graph();
    graph.add_shape(Shape::new(7, Rect::new(120.0, 110.0, 40.0, 20.0), 0));
    let (vp, geo) = (viewport(1.0), geometry());
    let snap = CanvasSnapshot::new(&graph, &vp, &geo);
    let mut hits = HitTester::new();

    assert_eq!(hits.hit_test(&snap, 140.0, 120.0), Some(HitResult::Shape(7)));
    assert_eq!(hits.hit_test(&snap, 140.0, 150.0), Some(HitResult::Node(1)));
}

#[test]
fn test_higher_z_shape_wins() {
    let mut graph = Graph::new();
    graph.add_shape(Shape::new(1, Rect::new(0.0, 0.0, 100.0, 100.0), 5));
    graph.add_shape(Shape::new(2, Rect::new(0.0, 0.0, 100.0, 100.0), 1));
    let (vp, geo) = (viewport(1.0), geometry());
    let snap = CanvasSnapshot::new(&graph, &vp, &geo);

    assert_eq!(HitTester::new().hit_test_shape(&snap, 50.0, 50.0), Some(1));
}

// ============================================================================
// Small-node click area
// ============================================================================

#[test]
fn test_tiny_node_accepts_only_core() {
    // 100x100 at zoom 0.3 is 30px on screen: half of the 60px threshold,
    // so the accepted ratio is 0.4 + 0.5 * 0.6 = 0.7
    let mut graph = Graph::new();
    graph.add_node(Node::new(1, 0.0, 0.0).with_size(100.0, 100.0));
    let (vp, geo) = (viewport(0.3), geometry());
    let snap = CanvasSnapshot::new(&graph, &vp, &geo);
    let mut hits = HitTester::new();

    // Canvas (90, 50): normalized distance 0.8
    assert_eq!(hits.hit_test_node(&snap, 27.0, 15.0), None);
    // Canvas (80, 50): normalized distance 0.6
    assert_eq!(hits.hit_test_node(&snap, 24.0, 15.0), Some(1));
}

#[test]
fn test_large_node_accepts_corners() {
    let mut graph = Graph::new();
    graph.add_node(Node::new(1, 0.0, 0.0).with_size(100.0, 100.0));
    let (vp, geo) = (viewport(1.0), geometry());
    let snap = CanvasSnapshot::new(&graph, &vp, &geo);

    assert_eq!(HitTester::new().hit_test_node(&snap, 99.0, 99.0), Some(1));
}

// ============================================================================
// Groups
// ============================================================================

fn grouped_graph() -> Graph {
    let mut graph = Graph::new();
    graph.add_node(Node::group(10, 0.0, 0.0, 600.0, 400.0));
    graph.add_node(Node::group(11, 50.0, 50.0, 300.0, 200.0).in_group(10));
    graph.add_node(io_node(1, 100.0, 100.0).in_group(11));
    graph
}

#[test]
fn test_regular_node_beats_enclosing_groups() {
    let graph = grouped_graph();
    let (vp, geo) = (viewport(1.0), geometry());
    let snap = CanvasSnapshot::new(&graph, &vp, &geo);
    let mut hits = HitTester::new();

    assert_eq!(hits.hit_test(&snap, 150.0, 130.0), Some(HitResult::Node(1)));
    assert_eq!(hits.hit_test(&snap, 300.0, 220.0), Some(HitResult::Group(11)));
    assert_eq!(hits.hit_test(&snap, 500.0, 350.0), Some(HitResult::Group(10)));
}

#[test]
fn test_collapse_button_inside_header() {
    let graph = grouped_graph();
    let (vp, geo) = (viewport(1.0), geometry());
    let button = graph.node(10).map(|g| geo.collapse_button_bounds(g)).unwrap();
    let center = button.center();
    let snap = CanvasSnapshot::new(&graph, &vp, &geo);

    assert_eq!(
        HitTester::new().hit_test(&snap, center.x, center.y),
        Some(HitResult::CollapseButton(10))
    );
}

#[test]
fn test_collapsed_group_hides_descendants() {
    let mut graph = grouped_graph();
    graph.add_node(io_node(2, 450.0, 300.0));
    graph.add_edge(io_edge(1, 1, 2));
    let (vp, geo) = (viewport(1.0), geometry());
    let mut hits = HitTester::new();

    {
        let snap = CanvasSnapshot::new(&graph, &vp, &geo);
        assert_eq!(hits.hit_test_node(&snap, 150.0, 130.0), Some(1));
        assert_eq!(hits.hit_test_edge(&snap, 325.0, 230.0), Some(1));
    }

    graph.set_collapsed(10, true);
    let snap = CanvasSnapshot::new(&graph, &vp, &geo);
    assert_eq!(hits.hit_test_node(&snap, 150.0, 130.0), None);
    assert_eq!(hits.hit_test_edge(&snap, 325.0, 230.0), None);
    // The collapsed group is one header tall
    assert_eq!(hits.hit_test_node(&snap, 300.0, 20.0), Some(10));
    assert_eq!(hits.hit_test_node(&snap, 300.0, 60.0), None);
}

// ============================================================================
// Index freshness
// ============================================================================

#[test]
fn test_resize_visible_to_next_query() {
    let mut graph = Graph::new();
    graph.add_node(Node::new(1, 0.0, 0.0).with_size(100.0, 60.0));
    let (vp, geo) = (viewport(1.0), geometry());
    let mut hits = HitTester::new();

    assert_eq!(hits.hit_test_node(&CanvasSnapshot::new(&graph, &vp, &geo), 150.0, 30.0), None);
    graph.resize_node(1, 200.0, 60.0);
    assert_eq!(hits.hit_test_node(&CanvasSnapshot::new(&graph, &vp, &geo), 150.0, 30.0), Some(1));
}

#[test]
fn test_shrink_visible_to_next_query() {
    let mut graph = Graph::new();
    graph.add_node(Node::new(1, 0.0, 0.0).with_size(200.0, 60.0));
    let (vp, geo) = (viewport(1.0), geometry());
    let mut hits = HitTester::new();

    assert_eq!(hits.hit_test_node(&CanvasSnapshot::new(&graph, &vp, &geo), 150.0, 30.0), Some(1));
    graph.resize_node(1, 100.0, 60.0);
    assert_eq!(hits.hit_test_node(&CanvasSnapshot::new(&graph, &vp, &geo), 150.0, 30.0), None);
}

#[test]
fn test_switching_graphs_at_same_revision() {
    let base = Graph::new();
    let mut left = base.clone();
    let mut right = base.clone();
    left.add_node(Node::new(1, 0.0, 0.0).with_size(100.0, 100.0));
    right.add_node(Node::new(2, 0.0, 0.0).with_size(100.0, 100.0));
    assert_eq!(left.revision(), right.revision());

    let (vp, geo) = (viewport(1.0), geometry());
    let mut hits = HitTester::new();
    assert_eq!(hits.hit_test_node(&CanvasSnapshot::new(&left, &vp, &geo), 50.0, 50.0), Some(1));
    assert_eq!(hits.hit_test_node(&CanvasSnapshot::new(&right, &vp, &geo), 50.0, 50.0), Some(2));
    assert_eq!(hits.hit_test_node(&CanvasSnapshot::new(&left, &vp, &geo), 50.0, 50.0), Some(1));
}

#[test]
fn test_removed_node_not_hit() {
    let mut graph = pair_graph();
    let (vp, geo) = (viewport(1.0), geometry());
    let mut hits = HitTester::new();

    assert_eq!(hits.hit_test_node(&CanvasSnapshot::new(&graph, &vp, &geo), 450.0, 130.0), Some(2));
    graph.remove_node(2);
    let snap = CanvasSnapshot::new(&graph, &vp, &geo);
    assert_eq!(hits.hit_test_node(&snap, 450.0, 130.0), None);
    // The edge now dangles and is skipped
    assert_eq!(hits.hit_test_edge(&snap, 300.0, 130.0), None);
}

// ============================================================================
// Edges
// ============================================================================

#[test]
fn test_edge_tolerance_is_screen_constant() {
    let graph = pair_graph();
    let geo = geometry();
    let mut hits = HitTester::new();

    // Default hit width 10 -> 5px either side, at any zoom
    for zoom in [0.5, 1.0, 2.0] {
        let vp = viewport(zoom);
        let snap = CanvasSnapshot::new(&graph, &vp, &geo);
        let mid = vp.canvas_to_screen(flow_canvas::Point::new(300.0, 130.0));
        assert_eq!(hits.hit_test_edge(&snap, mid.x, mid.y + 4.5), Some(1), "zoom {}", zoom);
        assert_eq!(hits.hit_test_edge(&snap, mid.x, mid.y + 5.5), None, "zoom {}", zoom);
    }
}

#[test]
fn test_selection_box_queries() {
    let graph = pair_graph();
    let (vp, geo) = (viewport(1.0), geometry());
    let snap = CanvasSnapshot::new(&graph, &vp, &geo);
    let mut hits = HitTester::new();

    assert_eq!(hits.nodes_in_selection_box(&snap, Rect::new(0.0, 0.0, 250.0, 250.0)), vec![1]);
    assert_eq!(hits.edges_in_selection_box(&snap, Rect::new(0.0, 0.0, 250.0, 250.0)), vec![1]);
    assert!(hits.edges_in_selection_box(&snap, Rect::new(250.0, 0.0, 100.0, 250.0)).is_empty());
}

proptest! {
    #[test]
    fn prop_wider_hit_width_never_loses_hits(
        width in 1.0f64..30.0,
        x in 150.0f64..450.0,
        y in 0.0f64..150.0,
        zoom in 0.5f64..2.0,
    ) {
        let mut graph = Graph::new();
        graph.add_node(io_node(1, 0.0, 0.0));
        graph.add_node(io_node(2, 400.0, 40.0));
        graph.add_edge(io_edge(1, 1, 2));
        let vp = viewport(zoom);

        let narrow = geometry_with(FlowCanvasSettings { edge_hit_width: width, ..Default::default() });
        let wide = geometry_with(FlowCanvasSettings { edge_hit_width: width * 2.0, ..Default::default() });
        let narrow_hit = HitTester::new().hit_test_edge(&CanvasSnapshot::new(&graph, &vp, &narrow), x, y);
        let wide_hit = HitTester::new().hit_test_edge(&CanvasSnapshot::new(&graph, &vp, &wide), x, y);

        if narrow_hit.is_some() {
            prop_assert_eq!(wide_hit, narrow_hit);
        }
    }
}
