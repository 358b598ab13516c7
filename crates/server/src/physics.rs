//! Mass conversions and elastic separation between overlapping cells.

use crate::entity::CellData;
use crate::geometry::VectorExt;
use glam::Vec2;
use std::f32::consts::PI;

/// Mass of a cell with the given radius (its area).
#[inline]
pub fn radius_to_mass(radius: f32) -> f32 {
    PI * radius * radius
}

/// Radius of a cell with the given mass.
#[inline]
pub fn mass_to_radius(mass: f32) -> f32 {
    (mass.max(0.0) / PI).sqrt()
}

/// Push two overlapping cells apart along the line between their centers.
///
/// Half the overlap is removed per call, and each cell moves in proportion
/// to the other's share of the combined mass, so the heavier cell moves
/// less. Centers too close to define a normal are left alone.
pub fn resolve_collision(a: &mut CellData, b: &mut CellData) {
    let delta = b.position - a.position;
    let Some(normal) = delta.normal() else {
        return;
    };

    let distance = delta.length();
    let overlap = (a.radius() + b.radius() - distance) / 2.0;
    if overlap <= 0.0 {
        return;
    }

    let (mass_a, mass_b) = (a.mass(), b.mass());
    let total = mass_a + mass_b;
    if total <= 0.0 {
        return;
    }

    a.position -= normal * (overlap * mass_b / total);
    b.position += normal * (overlap * mass_a / total);
}

/// Mass-weighted mean position of a set of cells.
///
/// Returns `None` for an empty set or one whose total mass is zero.
pub fn center_of_mass<'a>(cells: impl IntoIterator<Item = &'a CellData>) -> Option<Vec2> {
    let (weighted, total) = cells
        .into_iter()
        .fold((Vec2::ZERO, 0.0f32), |(sum, mass), cell| {
            let m = cell.mass();
            (sum + cell.position * m, mass + m)
        });

    (total > 0.0).then(|| weighted / total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: u32, x: f32, y: f32, radius: f32) -> CellData {
        CellData::new(id, Vec2::new(x, y), radius)
    }

    #[test]
    fn test_mass_radius_conversion() {
        let radius = mass_to_radius(2000.0);
        assert!((radius_to_mass(radius) - 2000.0).abs() < 0.01);
        assert_eq!(mass_to_radius(-5.0), 0.0);
    }

    #[test]
    fn test_heavier_cell_moves_less() {
        let mut big = cell(1, 0.0, 0.0, 20.0);
        let mut small = cell(2, 25.0, 0.0, 10.0);

        resolve_collision(&mut big, &mut small);

        let big_moved = big.position.x.abs();
        let small_moved = small.position.x - 25.0;
        assert!(big.position.x < 0.0);
        assert!(small_moved > 0.0);
        assert!(big_moved < small_moved);
        // Half of the 5 unit overlap is removed.
        assert!((big_moved + small_moved - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_coincident_centers_are_untouched() {
        let mut a = cell(1, 5.0, 5.0, 10.0);
        let mut b = cell(2, 5.0, 5.0, 10.0);
        resolve_collision(&mut a, &mut b);
        assert_eq!(a.position, Vec2::new(5.0, 5.0));
        assert_eq!(b.position, Vec2::new(5.0, 5.0));

        // Distinct centers whose distance underflows are treated the same.
        let mut a = cell(1, 0.0, 0.0, 10.0);
        let mut b = cell(2, 1e-30, 0.0, 10.0);
        resolve_collision(&mut a, &mut b);
        assert_eq!(a.position, Vec2::ZERO);
        assert_eq!(b.position, Vec2::new(1e-30, 0.0));
    }

    #[test]
    fn test_separated_cells_are_untouched() {
        let mut a = cell(1, 0.0, 0.0, 10.0);
        let mut b = cell(2, 30.0, 0.0, 10.0);
        resolve_collision(&mut a, &mut b);
        assert_eq!(a.position, Vec2::ZERO);
        assert_eq!(b.position, Vec2::new(30.0, 0.0));
    }

    #[test]
    fn test_center_of_mass() {
        let cells = [cell(1, 0.0, 0.0, 10.0), cell(2, 10.0, 0.0, 10.0)];
        let com = center_of_mass(&cells).unwrap();
        assert!((com - Vec2::new(5.0, 0.0)).length() < 1e-4);

        let weighted = [cell(1, 0.0, 0.0, 30.0), cell(2, 10.0, 0.0, 10.0)];
        let com = center_of_mass(&weighted).unwrap();
        assert!(com.x > 0.0 && com.x < 5.0);

        assert_eq!(center_of_mass(std::iter::empty::<&CellData>()), None);
        assert_eq!(center_of_mass(&[cell(1, 3.0, 3.0, 0.0)]), None);
    }
}
