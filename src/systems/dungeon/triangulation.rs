// triangulation adapter
// selected room centers in, flat triangle / half-edge arrays out

use std::collections::HashMap;

use bevy::prelude::*;
use spade::handles::FixedDirectedEdgeHandle;
use spade::{DelaunayTriangulation, Point2, Triangulation as _};

use super::error::{GenerationError, GenerationResult};

/// Flat half-edge triangulation.
///
/// Slot `i` is one directed edge. `triangles[i]` is the input point the edge
/// starts at, so triangle `t` owns slots `3t..3t + 3`. `half_edges[i]` is the
/// opposite slot in the neighbouring triangle, `None` on the hull.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triangulation {
    pub triangles: Vec<usize>,
    pub half_edges: Vec<Option<usize>>,
}

/// Next slot within the same triangle
pub fn next_half_edge(e: usize) -> usize {
    if e % 3 == 2 { e - 2 } else { e + 1 }
}

impl Triangulation {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Every undirected edge exactly once, as a pair of input point indices.
    ///
    /// An interior edge is owned by the higher of its two slots; a hull edge has
    /// a single slot and is always emitted.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.half_edges
            .iter()
            .enumerate()
            .filter(|&(i, twin)| twin.is_none_or(|t| i > t))
            .map(|(i, _)| (self.triangles[i], self.triangles[next_half_edge(i)]))
    }
}

pub trait Triangulator {
    fn triangulate(&self, points: &[Vec2]) -> GenerationResult<Triangulation>;
}

/// Delaunay triangulation backed by spade
#[derive(Default)]
pub struct SpadeTriangulator;

impl Triangulator for SpadeTriangulator {
    fn triangulate(&self, points: &[Vec2]) -> GenerationResult<Triangulation> {
        if points.len() < 3 {
            return Ok(Triangulation::default());
        }

        let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();

        // spade vertex index -> input point index
        // a duplicate position collapses onto the vertex that was inserted first
        let mut vertex_to_point = Vec::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            let handle = triangulation
                .insert(Point2::new(p.x as f64, p.y as f64))
                .map_err(|err| GenerationError::TriangulationFailed {
                    reason: format!("point {} at {:?}: {:?}", i, p, err),
                })?;
            if handle.index() == vertex_to_point.len() {
                vertex_to_point.push(i);
            }
        }

        // first pass: give every inner directed edge a slot
        let mut slots: HashMap<FixedDirectedEdgeHandle, usize> = HashMap::new();
        let mut triangles = Vec::with_capacity(triangulation.num_inner_faces() * 3);
        let mut edges = Vec::with_capacity(triangulation.num_inner_faces() * 3);
        for face in triangulation.inner_faces() {
            // counterclockwise, each edge ends where the next one starts
            for edge in face.adjacent_edges() {
                slots.insert(edge.fix(), triangles.len());
                triangles.push(vertex_to_point[edge.from().fix().index()]);
                edges.push(edge);
            }
        }

        // second pass: pair each slot with its twin, hull edges have none
        let half_edges = edges
            .iter()
            .map(|edge| slots.get(&edge.rev().fix()).copied())
            .collect();

        Ok(Triangulation {
            triangles,
            half_edges,
        })
    }
}
