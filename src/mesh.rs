//! Triangulated hull surface with static adjacency and a dynamic region.
//!
//! The static part (nodes, edges, facets, adjacency) is built once from a
//! triangle list. The dynamic suffix holds the vertices, edges and facets
//! created when the free surface splits partially-immersed facets; it is
//! reset to the static baseline before every intersection pass, so no
//! dynamic data survives across simulation steps.

use std::collections::HashMap;

use faer::Mat;
use itertools::Itertools;

use crate::error::{SimError, SimResult};
use crate::kinematics::Transform;
use crate::util::{cross, norm, scale, sub};

/// An ordered pair of vertex indices into the mesh nodes.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub vertex: [usize; 2],
}

impl Edge {
    pub fn new(v0: usize, v1: usize) -> Self {
        Self { vertex: [v0, v1] }
    }

    /// First vertex encountered when running the edge in a given direction.
    pub fn first_vertex(&self, reversed: bool) -> usize {
        self.vertex[reversed as usize]
    }

    pub fn second_vertex(&self, reversed: bool) -> usize {
        self.vertex[1 - reversed as usize]
    }
}

/// Reference to an edge with a running direction, used to describe the
/// boundary of a facet.
#[derive(Debug, Clone, Copy)]
pub struct OrientedEdge {
    pub edge: usize,
    pub reversed: bool,
}

/// 2-bit immersion classification of an edge, plus a flag for the boundary
/// case of a vertex lying exactly on the free surface.
///
/// Bit 0: first vertex immersed; bit 1: second vertex immersed; bit 2: one
/// of the vertices touches the surface (keeps tie-break splits degenerate-free).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeImmersionStatus {
    status: u8,
}

impl EdgeImmersionStatus {
    /// Classify from the relative immersions of the two endpoints
    /// (positive = underwater).
    pub fn new(z0: f64, z1: f64) -> Self {
        let mut status = 0u8;
        if z0 >= 0. {
            status |= 1;
        }
        if z1 >= 0. {
            status |= 2;
        }
        if z0 == 0. || z1 == 0. {
            status |= 4;
        }
        Self { status }
    }

    /// True only for a strict sign change: a vertex exactly on the surface
    /// never triggers a split.
    pub fn crosses_free_surface(&self) -> bool {
        !self.touches_free_surface() && matches!(self.status & 3, 1 | 2)
    }

    pub fn is_emerged(&self) -> bool {
        self.status & 3 == 0
    }

    pub fn is_immersed(&self) -> bool {
        self.status & 3 == 3
    }

    pub fn touches_free_surface(&self) -> bool {
        self.status & 4 != 0
    }

    /// True when the first vertex of the edge is underwater.
    pub fn first_vertex_immersed(&self) -> bool {
        self.status & 1 != 0
    }
}

/// A facet holds indices into the mesh nodes rather than copies of the
/// coordinates; normal, barycenter and area are recomputed on build and on
/// every split.
#[derive(Debug, Clone)]
pub struct Facet {
    pub vertex_index: Vec<usize>,
    pub unit_normal: [f64; 3],
    pub barycenter: [f64; 3],
    pub area: f64,
}

/// Area of a planar polygon by fan triangulation from the first vertex.
pub fn polygon_area(points: &[[f64; 3]]) -> f64 {
    let mut a = 0.;
    for i in 2..points.len() {
        let c = cross(&sub(&points[i - 1], &points[0]), &sub(&points[i], &points[0]));
        a += 0.5 * norm(&c);
    }
    a
}

/// Barycenter as the vertex average (exact for triangles).
pub fn polygon_barycenter(points: &[[f64; 3]]) -> [f64; 3] {
    let n = points.len() as f64;
    let mut b = [0.; 3];
    for p in points {
        b[0] += p[0];
        b[1] += p[1];
        b[2] += p[2];
    }
    scale(&b, 1. / n)
}

pub struct Mesh {
    /// Coordinates of all vertices, one column per node. Capacity covers the
    /// static nodes plus one potential waterline vertex per static edge.
    pub nodes: Mat<f64>,
    pub edges: Vec<Edge>,
    pub facets: Vec<Facet>,
    /// For each static edge, the facets it belongs to.
    pub facets_per_edge: Vec<Vec<usize>>,
    /// For each static facet, its boundary edges with running direction.
    pub oriented_edges_per_facet: Vec<Vec<OrientedEdge>>,
    pub static_nodes: usize,
    pub static_edges: usize,
    pub static_facets: usize,
    /// Number of nodes in use, including dynamically added ones.
    pub node_count: usize,
    /// -1 if the facets are oriented clockwise, +1 otherwise.
    pub orientation_factor: f64,
}

impl Mesh {
    pub fn node(&self, i: usize) -> [f64; 3] {
        [
            self.nodes[(0, i)],
            self.nodes[(1, i)],
            self.nodes[(2, i)],
        ]
    }

    pub fn facet_points(&self, facet: &Facet) -> Vec<[f64; 3]> {
        facet.vertex_index.iter().map(|&i| self.node(i)).collect()
    }

    /// Drop every vertex, edge and facet added by a previous intersection
    /// pass. Guarantees idempotent, side-effect-free repeated intersections
    /// from the same static state.
    pub fn reset_dynamic_data(&mut self) {
        self.node_count = self.static_nodes;
        self.edges.truncate(self.static_edges);
        self.facets.truncate(self.static_facets);
    }

    /// Append a vertex to the dynamic region.
    pub fn add_vertex(&mut self, coords: &[f64; 3]) -> usize {
        let i = self.node_count;
        self.nodes[(0, i)] = coords[0];
        self.nodes[(1, i)] = coords[1];
        self.nodes[(2, i)] = coords[2];
        self.node_count += 1;
        i
    }

    /// Append an edge to the dynamic region.
    pub fn add_edge(&mut self, first_vertex: usize, second_vertex: usize) -> usize {
        self.edges.push(Edge::new(first_vertex, second_vertex));
        self.edges.len() - 1
    }

    /// Create a facet from a vertex loop. The unit normal is passed in: on a
    /// split it is reused from the original facet, never recomputed from the
    /// (possibly degenerate) sub-polygon.
    pub fn create_facet(&mut self, vertex_index: Vec<usize>, unit_normal: [f64; 3]) -> usize {
        let points = vertex_index.iter().map(|&i| self.node(i)).collect_vec();
        self.facets.push(Facet {
            vertex_index,
            unit_normal,
            barycenter: polygon_barycenter(&points),
            area: polygon_area(&points),
        });
        self.facets.len() - 1
    }

    /// Re-express every static node and facet in another frame (used once at
    /// body build time to move the mesh into the body frame).
    pub fn apply_transform(&mut self, t: &Transform) {
        for i in 0..self.static_nodes {
            let p = t.apply_raw(&self.node(i));
            self.nodes[(0, i)] = p[0];
            self.nodes[(1, i)] = p[1];
            self.nodes[(2, i)] = p[2];
        }
        for facet in &mut self.facets {
            facet.barycenter = t.apply_raw(&facet.barycenter);
            facet.unit_normal = t.rotate(&facet.unit_normal);
        }
    }
}

/// Builds the static part of a [`Mesh`] from a triangle list (as produced by
/// an external STL reader): deduplicated vertices, edge table and adjacency.
pub struct MeshBuilder {
    triangles: Vec<[[f64; 3]; 3]>,
    clockwise: bool,
}

impl MeshBuilder {
    pub fn new(triangles: Vec<[[f64; 3]; 3]>) -> Self {
        Self {
            triangles,
            clockwise: false,
        }
    }

    pub fn clockwise(mut self, clockwise: bool) -> Self {
        self.clockwise = clockwise;
        self
    }

    pub fn build(self) -> SimResult<Mesh> {
        let mut coords: Vec<[f64; 3]> = vec![];
        let mut node_of: HashMap<[u64; 3], usize> = HashMap::new();
        let mut edges: Vec<Edge> = vec![];
        let mut edge_of: HashMap<(usize, usize), usize> = HashMap::new();
        let mut facets: Vec<Facet> = vec![];
        let mut facets_per_edge: Vec<Vec<usize>> = vec![];
        let mut oriented_edges_per_facet: Vec<Vec<OrientedEdge>> = vec![];

        for triangle in &self.triangles {
            let n = cross(
                &sub(&triangle[1], &triangle[0]),
                &sub(&triangle[2], &triangle[0]),
            );
            let n_norm = norm(&n);
            if n_norm < 1000. * f64::EPSILON {
                log::warn!("skipping degenerate triangle {:?}", triangle);
                continue;
            }
            let vertex_index = triangle
                .iter()
                .map(|p| {
                    let key = [p[0].to_bits(), p[1].to_bits(), p[2].to_bits()];
                    *node_of.entry(key).or_insert_with(|| {
                        coords.push(*p);
                        coords.len() - 1
                    })
                })
                .collect_vec();
            let facet_index = facets.len();
            let mut boundary = Vec::with_capacity(3);
            for i in 0..3 {
                let (a, b) = (vertex_index[i], vertex_index[(i + 1) % 3]);
                let key = (a.min(b), a.max(b));
                let edge = *edge_of.entry(key).or_insert_with(|| {
                    edges.push(Edge::new(key.0, key.1));
                    facets_per_edge.push(vec![]);
                    edges.len() - 1
                });
                facets_per_edge[edge].push(facet_index);
                boundary.push(OrientedEdge {
                    edge,
                    reversed: a > b,
                });
            }
            oriented_edges_per_facet.push(boundary);
            let points = vertex_index.iter().map(|&i| coords[i]).collect_vec();
            facets.push(Facet {
                vertex_index,
                unit_normal: scale(&n, 1. / n_norm),
                barycenter: polygon_barycenter(&points),
                area: polygon_area(&points),
            });
        }

        if facets.is_empty() {
            return Err(SimError::invalid_mesh("no usable triangle in input"));
        }

        let static_nodes = coords.len();
        let static_edges = edges.len();
        // Room for at most one waterline vertex per edge.
        let capacity = static_nodes + static_edges;
        let mut nodes = Mat::<f64>::zeros(3, capacity);
        for (i, p) in coords.iter().enumerate() {
            nodes[(0, i)] = p[0];
            nodes[(1, i)] = p[1];
            nodes[(2, i)] = p[2];
        }

        Ok(Mesh {
            nodes,
            static_facets: facets.len(),
            edges,
            facets,
            facets_per_edge,
            oriented_edges_per_facet,
            static_nodes,
            static_edges,
            node_count: static_nodes,
            orientation_factor: if self.clockwise { -1. } else { 1. },
        })
    }
}

/// Closed unit-cube triangulation centred on the origin, outward normals.
/// Shared by tests and the demo binary.
pub fn unit_cube() -> Vec<[[f64; 3]; 3]> {
    let v = |x: f64, y: f64, z: f64| [x - 0.5, y - 0.5, z - 0.5];
    let quads: [[[f64; 3]; 4]; 6] = [
        // z = -0.5 face, normal -z (up in NED)
        [v(0., 0., 0.), v(0., 1., 0.), v(1., 1., 0.), v(1., 0., 0.)],
        // z = +0.5 face, normal +z
        [v(0., 0., 1.), v(1., 0., 1.), v(1., 1., 1.), v(0., 1., 1.)],
        // x = -0.5 face, normal -x
        [v(0., 0., 0.), v(0., 0., 1.), v(0., 1., 1.), v(0., 1., 0.)],
        // x = +0.5 face, normal +x
        [v(1., 0., 0.), v(1., 1., 0.), v(1., 1., 1.), v(1., 0., 1.)],
        // y = -0.5 face, normal -y
        [v(0., 0., 0.), v(1., 0., 0.), v(1., 0., 1.), v(0., 0., 1.)],
        // y = +0.5 face, normal +y
        [v(0., 1., 0.), v(0., 1., 1.), v(1., 1., 1.), v(1., 1., 0.)],
    ];
    let mut triangles = vec![];
    for q in &quads {
        triangles.push([q[0], q[1], q[2]]);
        triangles.push([q[0], q[2], q[3]]);
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_triangle() -> Vec<[[f64; 3]; 3]> {
        vec![[[0., 0., 0.], [1., 0., 0.], [0., 1., 0.]]]
    }

    #[test]
    fn builder_deduplicates_shared_vertices() {
        let mesh = MeshBuilder::new(unit_cube()).build().unwrap();
        assert_eq!(mesh.static_nodes, 8);
        assert_eq!(mesh.static_facets, 12);
        assert_eq!(mesh.static_edges, 18);
    }

    #[test]
    fn facet_geometry_is_computed() {
        let mesh = MeshBuilder::new(single_triangle()).build().unwrap();
        let f = &mesh.facets[0];
        assert_relative_eq!(f.area, 0.5);
        assert_eq!(f.unit_normal, [0., 0., 1.]);
        assert_relative_eq!(f.barycenter[0], 1. / 3.);
        assert_relative_eq!(f.barycenter[1], 1. / 3.);
    }

    #[test]
    fn adjacency_links_edges_and_facets() {
        let mesh = MeshBuilder::new(unit_cube()).build().unwrap();
        // Every edge belongs to one or two facets, every facet has 3 edges.
        for facets in &mesh.facets_per_edge {
            assert!(!facets.is_empty() && facets.len() <= 2);
        }
        for boundary in &mesh.oriented_edges_per_facet {
            assert_eq!(boundary.len(), 3);
        }
    }

    #[test]
    fn dynamic_region_resets_to_static_baseline() {
        let mut mesh = MeshBuilder::new(single_triangle()).build().unwrap();
        let v = mesh.add_vertex(&[0.5, 0.5, 0.]);
        mesh.add_edge(0, v);
        mesh.create_facet(vec![0, 1, v], [0., 0., 1.]);
        assert_eq!(mesh.node_count, mesh.static_nodes + 1);
        mesh.reset_dynamic_data();
        assert_eq!(mesh.node_count, mesh.static_nodes);
        assert_eq!(mesh.edges.len(), mesh.static_edges);
        assert_eq!(mesh.facets.len(), mesh.static_facets);
    }

    #[test]
    fn degenerate_triangles_are_skipped() {
        let mut triangles = single_triangle();
        triangles.push([[0., 0., 0.], [1., 0., 0.], [2., 0., 0.]]);
        let mesh = MeshBuilder::new(triangles).build().unwrap();
        assert_eq!(mesh.static_facets, 1);
    }

    #[test]
    fn edge_immersion_status_classification() {
        assert!(EdgeImmersionStatus::new(-1., -2.).is_emerged());
        assert!(EdgeImmersionStatus::new(1., 2.).is_immersed());
        assert!(EdgeImmersionStatus::new(-1., 2.).crosses_free_surface());
        assert!(EdgeImmersionStatus::new(1., -2.).crosses_free_surface());
        // A vertex exactly on the surface never triggers a split.
        let touching = EdgeImmersionStatus::new(0., -1.);
        assert!(touching.touches_free_surface());
        assert!(!touching.crosses_free_surface());
    }
}
