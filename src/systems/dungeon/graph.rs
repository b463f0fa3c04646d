// corridor graph, minimum spanning tree over the triangulation edges

use std::collections::HashMap;

use petgraph::algo::min_spanning_tree;
use petgraph::data::Element;
use petgraph::graph::{NodeIndex, UnGraph};

use super::room::{Room, RoomId};
use super::triangulation::Triangulation;

/// One weighted corridor between two rooms
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corridor {
    pub from: RoomId,
    pub to: RoomId,
    pub weight: f32,
}

pub trait GraphMst {
    /// Re-adding an existing edge replaces its weight
    fn add_edge(&mut self, a: RoomId, b: RoomId, weight: f32);
    fn spanning_tree(&self) -> Vec<Corridor>;
}

/// Undirected room graph backed by petgraph
#[derive(Default)]
pub struct PetgraphMst {
    graph: UnGraph<RoomId, f32>,
    nodes: HashMap<RoomId, NodeIndex>,
}

impl PetgraphMst {
    fn node(&mut self, id: RoomId) -> NodeIndex {
        *self.nodes.entry(id).or_insert_with(|| self.graph.add_node(id))
    }
}

impl GraphMst for PetgraphMst {
    fn add_edge(&mut self, a: RoomId, b: RoomId, weight: f32) {
        let a = self.node(a);
        let b = self.node(b);
        self.graph.update_edge(a, b, weight);
    }

    fn spanning_tree(&self) -> Vec<Corridor> {
        min_spanning_tree(&self.graph)
            .filter_map(|element| match element {
                Element::Edge { source, target, weight, .. } => Some(Corridor {
                    from: self.graph[NodeIndex::new(source)],
                    to: self.graph[NodeIndex::new(target)],
                    weight,
                }),
                Element::Node { .. } => None,
            })
            .collect()
    }
}

/// Feeds every triangulation edge into `graph`, weighted by the squared
/// distance between the two room centers. `selected` must be in the same
/// order as the points that were triangulated.
pub fn build_graph<G: GraphMst>(graph: &mut G, triangulation: &Triangulation, selected: &[&Room]) {
    for (p, q) in triangulation.edges() {
        let (a, b) = (selected[p], selected[q]);
        graph.add_edge(a.id, b.id, a.center().distance_squared(b.center()));
    }
}

pub fn total_weight(corridors: &[Corridor]) -> f32 {
    corridors.iter().map(|c| c.weight).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::dungeon::physics::BodyHandle;
    use approx::assert_relative_eq;
    use bevy::prelude::*;

    fn has_edge(corridors: &[Corridor], a: u32, b: u32) -> bool {
        corridors.iter().any(|c| {
            (c.from, c.to) == (RoomId(a), RoomId(b)) || (c.from, c.to) == (RoomId(b), RoomId(a))
        })
    }

    #[test]
    fn test_square_tree_skips_diagonals() {
        let mut graph = PetgraphMst::default();
        // 10 x 10 square, sides weigh 100, diagonals 200
        graph.add_edge(RoomId(0), RoomId(1), 100.0);
        graph.add_edge(RoomId(1), RoomId(2), 100.0);
        graph.add_edge(RoomId(2), RoomId(3), 100.0);
        graph.add_edge(RoomId(3), RoomId(0), 100.0);
        graph.add_edge(RoomId(0), RoomId(2), 200.0);
        graph.add_edge(RoomId(1), RoomId(3), 200.0);

        let tree = graph.spanning_tree();
        assert_eq!(tree.len(), 3);
        assert!(!has_edge(&tree, 0, 2));
        assert!(!has_edge(&tree, 1, 3));
        assert_relative_eq!(total_weight(&tree), 300.0);
    }

    #[test]
    fn test_readding_edge_replaces_weight() {
        let mut graph = PetgraphMst::default();
        graph.add_edge(RoomId(0), RoomId(1), 50.0);
        graph.add_edge(RoomId(1), RoomId(0), 5.0);

        let tree = graph.spanning_tree();
        assert_eq!(tree.len(), 1);
        assert_relative_eq!(tree[0].weight, 5.0);
    }

    #[test]
    fn test_empty_graph_has_empty_tree() {
        assert!(PetgraphMst::default().spanning_tree().is_empty());
    }

    #[test]
    fn test_build_graph_uses_room_ids_and_squared_distance() {
        let rooms = [
            Room::new(RoomId(7), BodyHandle(0), Vec2::new(0.0, 0.0), 60.0, 64.0),
            Room::new(RoomId(9), BodyHandle(1), Vec2::new(100.0, 0.0), 60.0, 64.0),
            Room::new(RoomId(12), BodyHandle(2), Vec2::new(50.0, 100.0), 60.0, 64.0),
        ];
        let selected: Vec<&Room> = rooms.iter().collect();
        let triangulation = Triangulation {
            triangles: vec![0, 1, 2],
            half_edges: vec![None, None, None],
        };

        let mut graph = PetgraphMst::default();
        build_graph(&mut graph, &triangulation, &selected);
        let tree = graph.spanning_tree();

        assert_eq!(tree.len(), 2);
        assert!(has_edge(&tree, 7, 9));
        // the other two sides tie at 12500, either one completes the tree
        assert_relative_eq!(total_weight(&tree), 10000.0 + 12500.0);
    }
}
