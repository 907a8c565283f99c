//! Intersection of a hull mesh with the instantaneous free surface.
//!
//! Given the relative immersion of every static vertex, partitions the
//! facets into fully-immersed and fully-emerged lists, replacing each
//! partially-immersed facet by an emerged and an immersed sub-facet split
//! along the waterline. All split geometry lives in the mesh's dynamic
//! region and is rebuilt from scratch on every call; nothing persists
//! across simulation steps.

use std::collections::HashMap;

use itertools::Itertools;

use crate::error::{SimError, SimResult};
use crate::hydrostatic::intersection;
use crate::mesh::{EdgeImmersionStatus, Mesh};

pub struct MeshIntersector {
    pub mesh: Mesh,
    /// Immersions of all nodes, including the dynamically added ones
    /// (waterline vertices carry zero immersion by construction).
    pub all_immersions: Vec<f64>,
    /// Fully immersed facets, split halves included.
    pub index_of_immersed_facets: Vec<usize>,
    /// Fully emerged facets, split halves included.
    pub index_of_emerged_facets: Vec<usize>,
}

impl MeshIntersector {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            all_immersions: vec![],
            index_of_immersed_facets: vec![],
            index_of_emerged_facets: vec![],
        }
    }

    /// Recompute the intersection with the free surface from fresh per-node
    /// immersions (positive = underwater). Resets the dynamic region first,
    /// so repeated calls from the same static state are side-effect free.
    pub fn update_intersection(&mut self, immersions: &[f64]) -> SimResult<()> {
        if immersions.len() != self.mesh.static_nodes {
            return Err(SimError::invalid_input(format!(
                "expected one immersion per static node ({}), got {}",
                self.mesh.static_nodes,
                immersions.len()
            )));
        }
        self.mesh.reset_dynamic_data();
        self.all_immersions.clear();
        self.all_immersions.extend_from_slice(immersions);
        self.index_of_immersed_facets.clear();
        self.index_of_emerged_facets.clear();

        // Split every crossing edge exactly once; the waterline vertex is
        // shared by the two facets adjacent to the edge.
        let mut split_vertex: HashMap<usize, usize> = HashMap::new();
        for edge_index in 0..self.mesh.static_edges {
            let edge = self.mesh.edges[edge_index];
            let [v0, v1] = edge.vertex;
            let status = EdgeImmersionStatus::new(immersions[v0], immersions[v1]);
            if !status.crosses_free_surface() {
                continue;
            }
            let p = intersection(
                &self.mesh.node(v0),
                immersions[v0],
                &self.mesh.node(v1),
                immersions[v1],
            )?;
            let vi = self.mesh.add_vertex(&p);
            self.all_immersions.push(0.);
            self.mesh.add_edge(v0, vi);
            self.mesh.add_edge(vi, v1);
            split_vertex.insert(edge_index, vi);
        }

        for facet_index in 0..self.mesh.static_facets {
            let dz = self.facet_immersions(facet_index);
            let has_strictly_immersed = dz.iter().any(|&z| z > 0.);
            let has_strictly_emerged = dz.iter().any(|&z| z < 0.);
            if has_strictly_immersed && has_strictly_emerged {
                self.split_partially_immersed_facet(facet_index, &split_vertex)?;
            } else if dz.iter().all(|&z| z >= 0.) {
                self.index_of_immersed_facets.push(facet_index);
            } else {
                self.index_of_emerged_facets.push(facet_index);
            }
        }
        Ok(())
    }

    /// Split one facet along the waterline into an emerged and an immersed
    /// sub-facet, both appended to the dynamic region with the parent's unit
    /// normal (never recomputed from the possibly thin sub-polygons).
    fn split_partially_immersed_facet(
        &mut self,
        facet_index: usize,
        split_vertex: &HashMap<usize, usize>,
    ) -> SimResult<()> {
        let vertices = self.mesh.facets[facet_index].vertex_index.clone();
        let normal = self.mesh.facets[facet_index].unit_normal;
        let boundary = self.mesh.oriented_edges_per_facet[facet_index].clone();
        let n = vertices.len();

        let mut immersed = vec![];
        let mut emerged = vec![];
        let mut waterline = vec![];
        for i in 0..n {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            let za = self.all_immersions[a];
            let zb = self.all_immersions[b];
            if za >= 0. {
                immersed.push(a);
            }
            if za <= 0. {
                emerged.push(a);
            }
            if za * zb < 0. {
                let vi = *split_vertex.get(&boundary[i].edge).ok_or_else(|| {
                    SimError::geometry(format!(
                        "facet {facet_index}: crossing edge {} was not split",
                        boundary[i].edge
                    ))
                })?;
                immersed.push(vi);
                emerged.push(vi);
                waterline.push(vi);
            }
        }
        if immersed.len() < 3 || emerged.len() < 3 {
            return Err(SimError::geometry(format!(
                "facet {facet_index} is not genuinely partially immersed"
            )));
        }
        if waterline.len() == 2 {
            self.mesh.add_edge(waterline[0], waterline[1]);
        }
        let sub = self.mesh.create_facet(immersed, normal);
        self.index_of_immersed_facets.push(sub);
        let sub = self.mesh.create_facet(emerged, normal);
        self.index_of_emerged_facets.push(sub);
        Ok(())
    }

    /// Coordinates of a facet's vertices, one point per entry.
    pub fn facet_coordinates(&self, facet_index: usize) -> Vec<[f64; 3]> {
        self.mesh.facets[facet_index]
            .vertex_index
            .iter()
            .map(|&i| self.mesh.node(i))
            .collect_vec()
    }

    /// Relative immersions of a facet's vertices.
    pub fn facet_immersions(&self, facet_index: usize) -> Vec<f64> {
        self.mesh.facets[facet_index]
            .vertex_index
            .iter()
            .map(|&i| self.all_immersions[i])
            .collect_vec()
    }

    pub fn immersed_facets(&self) -> impl Iterator<Item = (usize, &crate::mesh::Facet)> {
        self.index_of_immersed_facets
            .iter()
            .map(move |&i| (i, &self.mesh.facets[i]))
    }

    pub fn emerged_facets(&self) -> impl Iterator<Item = (usize, &crate::mesh::Facet)> {
        self.index_of_emerged_facets
            .iter()
            .map(move |&i| (i, &self.mesh.facets[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{unit_cube, MeshBuilder};
    use approx::assert_relative_eq;

    fn cube_intersector() -> MeshIntersector {
        MeshIntersector::new(MeshBuilder::new(unit_cube()).build().unwrap())
    }

    fn triangle_intersector() -> MeshIntersector {
        let mesh = MeshBuilder::new(vec![[[0., 0., 0.], [1., 0., 0.], [0., 1., 0.]]])
            .build()
            .unwrap();
        MeshIntersector::new(mesh)
    }

    #[test]
    fn fully_immersed_mesh_keeps_every_facet() {
        let mut intersector = cube_intersector();
        let immersions = vec![2.; intersector.mesh.static_nodes];
        intersector.update_intersection(&immersions).unwrap();
        assert_eq!(intersector.index_of_immersed_facets.len(), 12);
        assert!(intersector.index_of_emerged_facets.is_empty());
        assert_eq!(intersector.mesh.facets.len(), 12);
        assert_eq!(intersector.mesh.node_count, intersector.mesh.static_nodes);
    }

    #[test]
    fn fully_emerged_mesh_keeps_every_facet() {
        let mut intersector = cube_intersector();
        let immersions = vec![-2.; intersector.mesh.static_nodes];
        intersector.update_intersection(&immersions).unwrap();
        assert_eq!(intersector.index_of_emerged_facets.len(), 12);
        assert!(intersector.index_of_immersed_facets.is_empty());
        assert_eq!(intersector.mesh.facets.len(), 12);
    }

    #[test]
    fn one_emerged_vertex_produces_one_immersed_subfacet() {
        let mut intersector = triangle_intersector();
        intersector.update_intersection(&[-1., 1., 1.]).unwrap();
        assert_eq!(intersector.index_of_immersed_facets.len(), 1);
        assert_eq!(intersector.index_of_emerged_facets.len(), 1);
        let original = &intersector.mesh.facets[0];
        let (_, immersed) = intersector.immersed_facets().next().unwrap();
        assert!(immersed.area < original.area);
        assert_eq!(immersed.unit_normal, original.unit_normal);
        assert_relative_eq!(immersed.area, 0.375);
        // Two waterline vertices were added.
        assert_eq!(
            intersector.mesh.node_count,
            intersector.mesh.static_nodes + 2
        );
    }

    #[test]
    fn emerged_and_immersed_areas_sum_to_parent() {
        let mut intersector = triangle_intersector();
        intersector.update_intersection(&[-1., 1., 1.]).unwrap();
        let (_, immersed) = intersector.immersed_facets().next().unwrap();
        let (_, emerged) = intersector.emerged_facets().next().unwrap();
        assert_relative_eq!(immersed.area + emerged.area, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn repeated_updates_are_idempotent() {
        let mut intersector = cube_intersector();
        let mut immersions = vec![0.; intersector.mesh.static_nodes];
        for i in 0..intersector.mesh.static_nodes {
            // Waterline through the cube: z of each node (NED, z down).
            immersions[i] = intersector.mesh.node(i)[2];
        }
        intersector.update_intersection(&immersions).unwrap();
        let facets_after_first = intersector.mesh.facets.len();
        let immersed_after_first = intersector.index_of_immersed_facets.len();
        intersector.update_intersection(&immersions).unwrap();
        assert_eq!(intersector.mesh.facets.len(), facets_after_first);
        assert_eq!(
            intersector.index_of_immersed_facets.len(),
            immersed_after_first
        );
    }

    #[test]
    fn half_immersed_cube_wetted_area() {
        let mut intersector = cube_intersector();
        let immersions = (0..intersector.mesh.static_nodes)
            .map(|i| intersector.mesh.node(i)[2])
            .collect::<Vec<_>>();
        intersector.update_intersection(&immersions).unwrap();
        // Wetted surface: bottom face (1 m²) + half of each side (4 × 0.5 m²).
        let wetted: f64 = intersector.immersed_facets().map(|(_, f)| f.area).sum();
        assert_relative_eq!(wetted, 3., epsilon = 1e-12);
    }

    #[test]
    fn vertex_exactly_on_surface_does_not_split() {
        let mut intersector = triangle_intersector();
        intersector.update_intersection(&[0., 1., 1.]).unwrap();
        // All immersions >= 0: the facet counts as immersed, no split.
        assert_eq!(intersector.index_of_immersed_facets, vec![0]);
        assert_eq!(intersector.mesh.facets.len(), 1);
        assert_eq!(intersector.mesh.node_count, intersector.mesh.static_nodes);
    }

    #[test]
    fn wrong_immersion_count_is_rejected() {
        let mut intersector = triangle_intersector();
        assert!(intersector.update_intersection(&[0., 1.]).is_err());
    }
}
