//! Conforming refinement of tagged cells
//!
//! Selected cells are split red (1 → 4 through the edge midpoints). Closure
//! keeps the mesh conforming: a neighbor left with two or more split edges is
//! promoted to red, a neighbor with exactly one split edge is bisected green
//! from the opposite vertex. Children inherit their parent's tag.

use std::collections::{HashMap, HashSet};
use tracing::debug;
use super::fields::CellTags;
use super::geometry::Mesh;
use super::topology::Edge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Split {
    Keep,
    Green(usize),
    Red,
}

/// Refine every cell whose tag satisfies `predicate`
pub fn refine<P>(mesh: &Mesh, tags: &CellTags, predicate: P) -> (Mesh, CellTags)
where
    P: Fn(u32) -> bool,
{
    let num_cells = mesh.num_cells();
    let mut red: Vec<bool> = tags.iter().map(&predicate).collect();
    let mut marked: HashSet<Edge> = HashSet::new();
    for (c, cell) in mesh.cells.iter().enumerate() {
        if red[c] {
            for k in 0..3 {
                marked.insert(Edge::of_cell(cell, k));
            }
        }
    }

    // Closure: promote cells with two or more marked edges until stable
    loop {
        let mut changed = false;
        for (c, cell) in mesh.cells.iter().enumerate() {
            if red[c] {
                continue;
            }
            let count = (0..3).filter(|&k| marked.contains(&Edge::of_cell(cell, k))).count();
            if count >= 2 {
                red[c] = true;
                for k in 0..3 {
                    marked.insert(Edge::of_cell(cell, k));
                }
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let splits: Vec<Split> = mesh
        .cells
        .iter()
        .enumerate()
        .map(|(c, cell)| {
            if red[c] {
                Split::Red
            } else {
                (0..3)
                    .find(|&k| marked.contains(&Edge::of_cell(cell, k)))
                    .map_or(Split::Keep, Split::Green)
            }
        })
        .collect();

    // Midpoints are numbered in cell order so the result is deterministic
    let mut refined = mesh.clone();
    let mut midpoints: HashMap<Edge, usize> = HashMap::with_capacity(marked.len());
    let mut midpoint = |refined: &mut Mesh, a: usize, b: usize| -> usize {
        *midpoints.entry(Edge::new(a, b)).or_insert_with(|| {
            let m = nalgebra::center(&refined.nodes[a], &refined.nodes[b]);
            refined.add_node(m.x, m.y)
        })
    };

    let mut cells = Vec::with_capacity(num_cells * 2);
    let mut child_tags = Vec::with_capacity(num_cells * 2);
    for (c, &[a, b, d]) in mesh.cells.iter().enumerate() {
        let tag = tags.get(c);
        match splits[c] {
            Split::Keep => {
                cells.push([a, b, d]);
                child_tags.push(tag);
            }
            Split::Green(k) => {
                let v = [a, b, d];
                let (p, q, opp) = (v[k], v[(k + 1) % 3], v[(k + 2) % 3]);
                let m = midpoint(&mut refined, p, q);
                cells.push([p, m, opp]);
                cells.push([m, q, opp]);
                child_tags.extend([tag, tag]);
            }
            Split::Red => {
                let mab = midpoint(&mut refined, a, b);
                let mbd = midpoint(&mut refined, b, d);
                let mda = midpoint(&mut refined, d, a);
                cells.push([a, mab, mda]);
                cells.push([mab, b, mbd]);
                cells.push([mda, mbd, d]);
                cells.push([mab, mbd, mda]);
                child_tags.extend([tag; 4]);
            }
        }
    }
    refined.cells = cells;

    let num_red = splits.iter().filter(|&&s| s == Split::Red).count();
    let num_green = splits.iter().filter(|s| matches!(s, Split::Green(_))).count();
    debug!(
        "Refined {} red / {} green of {} cells -> {} cells",
        num_red,
        num_green,
        num_cells,
        refined.num_cells()
    );

    (refined, CellTags::new(child_tags))
}

/// Apply [`refine`] `count` times in sequence
pub fn refine_n<P>(mesh: &Mesh, tags: &CellTags, predicate: P, count: usize) -> (Mesh, CellTags)
where
    P: Fn(u32) -> bool,
{
    let mut current = (mesh.clone(), tags.clone());
    for _ in 0..count {
        current = refine(&current.0, &current.1, &predicate);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;
    use crate::fem::Tri3Basis;

    /// 2x2 squares split into 8 triangles; left column tagged 1
    fn grid() -> (Mesh, CellTags) {
        let mut nodes = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                nodes.push(Point2::new(i as f64 * 0.5, j as f64 * 0.5));
            }
        }
        let n = |i: usize, j: usize| j * 3 + i;
        let mut cells = Vec::new();
        let mut tags = Vec::new();
        for j in 0..2 {
            for i in 0..2 {
                cells.push([n(i, j), n(i + 1, j), n(i + 1, j + 1)]);
                cells.push([n(i, j), n(i + 1, j + 1), n(i, j + 1)]);
                let tag = if i == 0 { 1 } else { 0 };
                tags.extend([tag, tag]);
            }
        }
        (Mesh::new(nodes, cells), CellTags::new(tags))
    }

    fn assert_conforming(mesh: &Mesh) {
        let map = mesh.edge_map();
        assert_eq!(map.num_overshared(), 0);
        // No hanging nodes: every node on a boundary edge is a unit square boundary node
        for [a, b] in mesh.boundary_edges() {
            for p in [mesh.nodes[a], mesh.nodes[b]] {
                let on_square = p.x.abs() < 1e-12
                    || (p.x - 1.0).abs() < 1e-12
                    || p.y.abs() < 1e-12
                    || (p.y - 1.0).abs() < 1e-12;
                assert!(on_square, "hanging node at {:?}", p);
            }
        }
        for c in 0..mesh.num_cells() {
            assert!(Tri3Basis::signed_area(&mesh.cell_vertices(c)) > 0.0);
        }
    }

    #[test]
    fn test_refine_tagged_cells() {
        let (mesh, tags) = grid();
        let (fine, fine_tags) = refine(&mesh, &tags, |t| t != 0);

        assert_conforming(&fine);
        assert_relative_eq!(fine.total_area(), 1.0, epsilon = 1e-12);
        assert_eq!(fine.num_cells(), fine_tags.len());

        // Tagged area is preserved and only tag-1 cells were split red
        let areas = fine.area_by_tag(&fine_tags);
        assert_relative_eq!(areas[&1], 0.5, epsilon = 1e-12);
        assert!(fine_tags.count(1) >= 16);
    }

    #[test]
    fn test_nothing_selected_is_identity() {
        let (mesh, tags) = grid();
        let (same, same_tags) = refine(&mesh, &tags, |t| t == 7);
        assert_eq!(same, mesh);
        assert_eq!(same_tags, tags);
    }

    #[test]
    fn test_refine_all_quadruples() {
        let (mesh, tags) = grid();
        let (fine, fine_tags) = refine_n(&mesh, &tags, |_| true, 2);

        assert_eq!(fine.num_cells(), 8 * 16);
        assert_eq!(fine.num_nodes(), 9 * 9);
        assert_eq!(fine_tags.count(1), 64);
        assert_conforming(&fine);
    }
}
