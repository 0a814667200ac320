//! Dijkstra step generator.
//!
//! Nodes are settled in order of tentative distance, ties going to the node
//! listed first in the graph. A binary heap keyed on `(distance, position)`
//! yields exactly that order, so the trace is the same one a naive scan of the
//! unvisited set would produce.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::step::{NodeId, Step, StepKind, Variant};

/// A reconstructed shortest path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Nodes from start to target.
    pub nodes: Vec<NodeId>,
    /// Sum of edge weights along the path.
    pub cost: u64,
}

/// The trace of one shortest-path run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTrace {
    pub steps: Vec<Step>,
    pub route: Option<Route>,
}

/// Frontier of unsettled nodes with finite distance.
struct Frontier {
    heap: BinaryHeap<Reverse<(u64, usize)>>,
}

impl Frontier {
    fn new() -> Self {
        Self { heap: BinaryHeap::new() }
    }

    fn push(&mut self, distance: u64, position: usize) {
        self.heap.push(Reverse((distance, position)));
    }

    /// Drop entries that are settled or superseded by a shorter distance.
    fn prune(&mut self, distances: &[Option<u64>], settled: &[bool]) {
        while let Some(&Reverse((distance, position))) = self.heap.peek() {
            if settled[position] || distances[position] != Some(distance) {
                self.heap.pop();
            } else {
                break;
            }
        }
    }

    fn peek(&mut self, distances: &[Option<u64>], settled: &[bool]) -> Option<usize> {
        self.prune(distances, settled);
        self.heap.peek().map(|&Reverse((_, position))| position)
    }

    fn pop(&mut self, distances: &[Option<u64>], settled: &[bool]) -> Option<usize> {
        self.prune(distances, settled);
        self.heap.pop().map(|Reverse((_, position))| position)
    }
}

/// Run Dijkstra from the graph's start to its target, recording every
/// settle, relaxation and improvement, then the reconstructed path.
pub fn shortest_path(graph: &Graph) -> RouteTrace {
    let nodes = graph.nodes();
    let count = nodes.len();

    let mut distances: Vec<Option<u64>> = vec![None; count];
    let mut previous: Vec<Option<usize>> = vec![None; count];
    let mut settled = vec![false; count];
    let mut frontier = Frontier::new();
    let mut steps = Vec::new();

    let start = graph.start();
    let (Some(origin), Some(goal)) = (graph.position(start), graph.position(graph.target())) else {
        return RouteTrace { steps: vec![Step::not_found("No path found")], route: None };
    };

    distances[origin] = Some(0);
    frontier.push(0, origin);
    steps.push(Step::new(
        StepKind::ActivateNode { id: start.clone() },
        format!("Start at {start}"),
    ));

    while let Some(current) = frontier.pop(&distances, &settled) {
        settled[current] = true;
        let here = &nodes[current].id;
        steps.push(Step::new(
            StepKind::VisitNode { id: here.clone() },
            format!("Visit {here}"),
        ));
        if current == goal {
            steps.push(Step::note("Target reached"));
            break;
        }

        let base = distances[current].unwrap_or_default();
        for (edge, neighbor) in graph.incident(here) {
            let Some(next) = graph.position(neighbor) else {
                continue;
            };
            if settled[next] {
                continue;
            }

            // Bounded by the total edge weight, which `Graph::new` caps at u64::MAX
            let candidate = base + edge.weight;
            steps.push(Step::new(
                StepKind::Edge { from: here.clone(), to: neighbor.clone() },
                format!("Cost from {here} → {neighbor}: {candidate}"),
            ));
            if distances[next].map_or(true, |known| candidate < known) {
                distances[next] = Some(candidate);
                previous[next] = Some(current);
                frontier.push(candidate, next);
                steps.push(Step::note(format!(
                    "New shorter path to {neighbor} with cost {candidate}"
                )));
            }
        }

        if let Some(next) = frontier.peek(&distances, &settled) {
            let candidate = &nodes[next].id;
            steps.push(Step::new(
                StepKind::ActivateNode { id: candidate.clone() },
                format!("Pick next candidate {candidate}"),
            ));
        }
    }

    let route = reconstruct(graph, &previous, &distances, origin, goal);
    match &route {
        Some(route) => {
            for pair in route.nodes.windows(2) {
                let (from, to) = (&pair[0], &pair[1]);
                steps.push(
                    Step::new(
                        StepKind::Path { from: from.clone(), to: to.clone() },
                        format!("Path segment {from} → {to}"),
                    )
                    .with_variant(Variant::Success),
                );
            }
        }
        None => steps.push(Step::not_found("No path found")),
    }

    RouteTrace { steps, route }
}

fn reconstruct(
    graph: &Graph,
    previous: &[Option<usize>],
    distances: &[Option<u64>],
    origin: usize,
    goal: usize,
) -> Option<Route> {
    let cost = distances[goal]?;
    let nodes = graph.nodes();

    let mut path = vec![goal];
    let mut cursor = goal;
    while let Some(prior) = previous[cursor] {
        path.push(prior);
        cursor = prior;
    }
    if cursor != origin {
        return None;
    }

    path.reverse();
    Some(Route {
        nodes: path.into_iter().map(|p| nodes[p].id.clone()).collect(),
        cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphEdge, GraphNode};
    use proptest::prelude::*;

    fn kinds(trace: &RouteTrace) -> Vec<&StepKind> {
        trace.steps.iter().map(|s| &s.kind).collect()
    }

    fn path_pairs(trace: &RouteTrace) -> Vec<(String, String)> {
        trace
            .steps
            .iter()
            .filter_map(|s| match &s.kind {
                StepKind::Path { from, to } => Some((from.to_string(), to.to_string())),
                _ => None,
            })
            .collect()
    }

    fn visit_order(trace: &RouteTrace) -> Vec<String> {
        trace
            .steps
            .iter()
            .filter_map(|s| match &s.kind {
                StepKind::VisitNode { id } => Some(id.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn example_route_is_minimal() {
        let trace = shortest_path(&Graph::example());
        let route = trace.route.clone().unwrap();

        // A-B-F-C = 6 + 2 + 3
        assert_eq!(route.cost, 11);
        assert_eq!(
            route.nodes.iter().map(NodeId::as_str).collect::<Vec<_>>(),
            vec!["A", "B", "F", "C"]
        );
        assert_eq!(
            path_pairs(&trace),
            vec![
                ("A".to_string(), "B".to_string()),
                ("B".to_string(), "F".to_string()),
                ("F".to_string(), "C".to_string()),
            ]
        );
        assert!(trace
            .steps
            .iter()
            .filter(|s| matches!(s.kind, StepKind::Path { .. }))
            .all(|s| s.variant == Some(Variant::Success)));
    }

    #[test]
    fn example_visit_order() {
        let trace = shortest_path(&Graph::example());
        // distances: A0 D4 B6 F8 E9 C11
        assert_eq!(visit_order(&trace), vec!["A", "D", "B", "F", "E", "C"]);
    }

    #[test]
    fn example_trace_opening() {
        let trace = shortest_path(&Graph::example());
        let opening: Vec<&str> = trace.steps.iter().take(8).map(|s| s.message.as_str()).collect();
        assert_eq!(
            opening,
            vec![
                "Start at A",
                "Visit A",
                "Cost from A → D: 4",
                "New shorter path to D with cost 4",
                "Cost from A → B: 6",
                "New shorter path to B with cost 6",
                "Pick next candidate D",
                "Visit D",
            ]
        );
    }

    #[test]
    fn relaxation_without_improvement_has_no_note() {
        let trace = shortest_path(&Graph::example());
        // Visiting D offers B at 7, worse than 6.
        let at = trace
            .steps
            .iter()
            .position(|s| s.message == "Cost from D → B: 7")
            .unwrap();
        assert_eq!(trace.steps[at + 1].message, "Cost from D → E: 9");
    }

    #[test]
    fn target_reached_stops_exploration() {
        let trace = shortest_path(&Graph::example());
        let reached = trace.steps.iter().position(|s| s.message == "Target reached").unwrap();
        assert_eq!(trace.steps[reached - 1].kind, StepKind::VisitNode { id: "C".into() });
        assert!(trace.steps[reached + 1..]
            .iter()
            .all(|s| matches!(s.kind, StepKind::Path { .. })));
    }

    #[test]
    fn ties_follow_node_order() {
        let nodes = vec![
            GraphNode::new("S", 0.0, 0.0),
            GraphNode::new("Y", 0.0, 0.0),
            GraphNode::new("X", 0.0, 0.0),
            GraphNode::new("T", 0.0, 0.0),
        ];
        let edges = vec![
            GraphEdge::new("S", "X", 1),
            GraphEdge::new("S", "Y", 1),
            GraphEdge::new("X", "T", 5),
            GraphEdge::new("Y", "T", 5),
        ];
        let graph = Graph::new(nodes, edges, "S".into(), "T".into()).unwrap();
        let trace = shortest_path(&graph);

        // Y is listed before X, so it settles first and claims T.
        assert_eq!(visit_order(&trace), vec!["S", "Y", "X", "T"]);
        assert_eq!(
            trace.route.unwrap().nodes,
            vec![NodeId::from("S"), NodeId::from("Y"), NodeId::from("T")]
        );
    }

    #[test]
    fn unreachable_target_ends_in_not_found() {
        let nodes = vec![
            GraphNode::new("A", 0.0, 0.0),
            GraphNode::new("B", 0.0, 0.0),
            GraphNode::new("C", 0.0, 0.0),
        ];
        let graph = Graph::new(nodes, vec![GraphEdge::new("A", "B", 2)], "A".into(), "C".into()).unwrap();
        let trace = shortest_path(&graph);

        assert_eq!(trace.route, None);
        assert_eq!(visit_order(&trace), vec!["A", "B"]);
        let last = trace.steps.last().unwrap();
        assert_eq!(last.kind, StepKind::NotFound);
        assert_eq!(last.variant, Some(Variant::Warning));
        assert_eq!(trace.steps.iter().filter(|s| s.is_terminal()).count(), 1);
    }

    #[test]
    fn two_node_trace() {
        let nodes = vec![GraphNode::new("A", 0.0, 0.0), GraphNode::new("B", 0.0, 0.0)];
        let graph = Graph::new(nodes, vec![GraphEdge::new("A", "B", 1)], "A".into(), "B".into()).unwrap();
        let trace = shortest_path(&graph);

        assert_eq!(
            kinds(&trace),
            vec![
                &StepKind::ActivateNode { id: "A".into() },
                &StepKind::VisitNode { id: "A".into() },
                &StepKind::Edge { from: "A".into(), to: "B".into() },
                &StepKind::Note,
                &StepKind::ActivateNode { id: "B".into() },
                &StepKind::VisitNode { id: "B".into() },
                &StepKind::Note,
                &StepKind::Path { from: "A".into(), to: "B".into() },
            ]
        );
    }

    #[test]
    fn heaviest_representable_route() {
        let nodes = vec![
            GraphNode::new("A", 0.0, 0.0),
            GraphNode::new("B", 0.0, 0.0),
            GraphNode::new("C", 0.0, 0.0),
        ];
        let edges = vec![
            GraphEdge::new("A", "B", u64::MAX / 2),
            GraphEdge::new("B", "C", u64::MAX / 2 + 1),
        ];
        let graph = Graph::new(nodes, edges, "A".into(), "C".into()).unwrap();
        let trace = shortest_path(&graph);

        assert_eq!(trace.route.as_ref().unwrap().cost, u64::MAX);
        assert_eq!(visit_order(&trace), vec!["A", "B", "C"]);
    }

    #[test]
    fn trace_is_deterministic() {
        let graph = Graph::example();
        assert_eq!(shortest_path(&graph), shortest_path(&graph));
    }

    /// Cheapest simple path by exhaustive search.
    fn brute_force(graph: &Graph) -> Option<u64> {
        fn walk(graph: &Graph, at: &NodeId, seen: &mut Vec<NodeId>, cost: u64, best: &mut Option<u64>) {
            if at == graph.target() {
                *best = Some(best.map_or(cost, |b| b.min(cost)));
                return;
            }
            for (edge, next) in graph.incident(at) {
                if seen.contains(next) {
                    continue;
                }
                seen.push(next.clone());
                walk(graph, next, seen, cost + edge.weight, best);
                seen.pop();
            }
        }

        let mut best = None;
        let mut seen = vec![graph.start().clone()];
        walk(graph, graph.start(), &mut seen, 0, &mut best);
        best
    }

    /// Settle order of the textbook scan: repeatedly take the unvisited node
    /// with the smallest finite distance, first in list order on ties.
    fn scan_order(graph: &Graph) -> Vec<String> {
        let nodes = graph.nodes();
        let mut distances: Vec<Option<u64>> = vec![None; nodes.len()];
        let mut visited = vec![false; nodes.len()];
        let mut order = Vec::new();
        distances[graph.position(graph.start()).unwrap()] = Some(0);

        loop {
            let mut best: Option<(usize, u64)> = None;
            for (i, distance) in distances.iter().enumerate() {
                if let (false, Some(d)) = (visited[i], *distance) {
                    if best.map_or(true, |(_, b)| d < b) {
                        best = Some((i, d));
                    }
                }
            }
            let Some((current, base)) = best else {
                break;
            };
            visited[current] = true;
            order.push(nodes[current].id.to_string());
            if nodes[current].id == *graph.target() {
                break;
            }
            for (edge, neighbor) in graph.incident(&nodes[current].id) {
                let next = graph.position(neighbor).unwrap();
                let candidate = base + edge.weight;
                if !visited[next] && distances[next].map_or(true, |known| candidate < known) {
                    distances[next] = Some(candidate);
                }
            }
        }
        order
    }

    fn random_graph() -> impl Strategy<Value = Graph> {
        (2usize..7)
            .prop_flat_map(|n| {
                let edge = (0..n, 0..n, 0u64..10);
                (Just(n), proptest::collection::vec(edge, 0..12))
            })
            .prop_map(|(n, raw)| {
                let names: Vec<String> = (0..n).map(|i| format!("N{i}")).collect();
                let nodes = names.iter().map(|id| GraphNode::new(id.as_str(), 0.0, 0.0)).collect();
                let edges = raw
                    .into_iter()
                    .filter(|(a, b, _)| a != b)
                    .map(|(a, b, w)| GraphEdge::new(&names[a], &names[b], w))
                    .collect();
                Graph::new(nodes, edges, NodeId::new(&names[0]), NodeId::new(&names[n - 1])).unwrap()
            })
    }

    proptest! {
        #[test]
        fn route_cost_matches_brute_force(graph in random_graph()) {
            let trace = shortest_path(&graph);
            prop_assert_eq!(trace.route.as_ref().map(|r| r.cost), brute_force(&graph));
        }

        #[test]
        fn visit_order_matches_linear_scan(graph in random_graph()) {
            let trace = shortest_path(&graph);
            prop_assert_eq!(visit_order(&trace), scan_order(&graph));
        }

        #[test]
        fn route_steps_sum_to_cost(graph in random_graph()) {
            let trace = shortest_path(&graph);
            if let Some(route) = &trace.route {
                let mut total = 0;
                for pair in route.nodes.windows(2) {
                    total += graph
                        .edges()
                        .iter()
                        .filter(|e| e.joins(&pair[0], &pair[1]))
                        .map(|e| e.weight)
                        .min()
                        .unwrap();
                }
                prop_assert_eq!(total, route.cost);
                prop_assert!(!trace.steps.iter().any(|s| s.is_terminal()));
            } else {
                prop_assert_eq!(&trace.steps.last().unwrap().kind, &StepKind::NotFound);
            }
        }
    }
}
