//! Common fixtures for integration tests.

#![allow(dead_code)]

use flow_canvas::{Edge, FlowCanvasSettings, GeometryModel, Graph, Node, Viewport};

pub const NODE_WIDTH: f64 = 100.0;
pub const NODE_HEIGHT: f64 = 60.0;

pub fn geometry() -> GeometryModel {
    GeometryModel::new(FlowCanvasSettings::default())
}

pub fn geometry_with(settings: FlowCanvasSettings) -> GeometryModel {
    GeometryModel::new(settings)
}

/// 1000x800 viewport at `zoom`, no pan.
pub fn viewport(zoom: f64) -> Viewport {
    Viewport::new(zoom, 0.0, 0.0, 1000.0, 800.0).unwrap()
}

/// Node with one input (id * 10) and one output (id * 10 + 1).
pub fn io_node(id: i32, x: f64, y: f64) -> Node {
    Node::new(id, x, y)
        .with_size(NODE_WIDTH, NODE_HEIGHT)
        .with_inputs([id * 10])
        .with_outputs([id * 10 + 1])
}

/// Edge from `from`'s output to `to`'s input, using the `io_node` port ids.
pub fn io_edge(id: i32, from: i32, to: i32) -> Edge {
    Edge::new(id, from, from * 10 + 1, to, to * 10)
}

/// Two nodes side by side joined by edge 1:
/// node 1 at (100, 100), node 2 at (400, 100).
pub fn pair_graph() -> Graph {
    let mut graph = Graph::new();
    graph.add_node(io_node(1, 100.0, 100.0));
    graph.add_node(io_node(2, 400.0, 100.0));
    graph.add_edge(io_edge(1, 1, 2));
    graph
}

/// `cols` x `rows` grid of io nodes, each row chained left to right.
///
/// Node ids start at 1 in row-major order; edge ids match the source node.
pub fn grid_graph(cols: usize, rows: usize, spacing: f64) -> Graph {
    let mut graph = Graph::new();
    for row in 0..rows {
        for col in 0..cols {
            let id = (row * cols + col + 1) as i32;
            graph.add_node(io_node(id, col as f64 * spacing, row as f64 * spacing));
            if col > 0 {
                graph.add_edge(io_edge(id - 1, id - 1, id));
            }
        }
    }
    graph
}

/// Numbers in a path command string, in order.
pub fn path_numbers(commands: &str) -> Vec<f64> {
    commands
        .split_whitespace()
        .filter_map(|token| token.parse::<f64>().ok())
        .collect()
}
