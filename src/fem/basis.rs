use nalgebra::{Matrix2, Point2};

/// Tri3 (3-node linear triangle) element basis functions
///
/// Node numbering (counter-clockwise):
///   Node 0: (1, 0, 0) at origin
///   Node 1: (0, 1, 0) at (1, 0)
///   Node 2: (0, 0, 1) at (0, 1)
///
/// Shape functions are the barycentric coordinates themselves, so gradients
/// are constant over the element.
pub struct Tri3Basis;

impl Tri3Basis {
    /// Evaluate the 3 shape functions at barycentric coordinates
    #[allow(non_snake_case)]
    pub fn shape_functions(L: &[f64; 3]) -> [f64; 3] {
        *L
    }

    /// Jacobian of the map from the reference triangle
    ///
    /// J = [x1-x0  x2-x0]
    ///     [y1-y0  y2-y0]
    pub fn jacobian(vertices: &[Point2<f64>; 3]) -> Matrix2<f64> {
        let e1 = vertices[1] - vertices[0];
        let e2 = vertices[2] - vertices[0];
        Matrix2::new(e1.x, e2.x, e1.y, e2.y)
    }

    /// Signed area (positive for counter-clockwise vertices)
    pub fn signed_area(vertices: &[Point2<f64>; 3]) -> f64 {
        0.5 * Self::jacobian(vertices).determinant()
    }

    pub fn area(vertices: &[Point2<f64>; 3]) -> f64 {
        Self::signed_area(vertices).abs()
    }

    /// Cartesian shape function gradients `[∂N_i/∂x, ∂N_i/∂y]`
    ///
    /// Returns `None` for a degenerate (zero-area) triangle.
    #[allow(non_snake_case)]
    pub fn shape_derivatives_cartesian(vertices: &[Point2<f64>; 3]) -> Option<[[f64; 2]; 3]> {
        let two_A = 2.0 * Self::signed_area(vertices);
        if two_A.abs() < f64::EPSILON * Self::scale(vertices) {
            return None;
        }

        let mut dN = [[0.0; 2]; 3];
        for i in 0..3 {
            let pj = vertices[(i + 1) % 3];
            let pk = vertices[(i + 2) % 3];
            dN[i] = [(pj.y - pk.y) / two_A, (pk.x - pj.x) / two_A];
        }
        Some(dN)
    }

    /// Physical point at barycentric coordinates
    #[allow(non_snake_case)]
    pub fn map_point(L: &[f64; 3], vertices: &[Point2<f64>; 3]) -> Point2<f64> {
        Point2::new(
            L[0] * vertices[0].x + L[1] * vertices[1].x + L[2] * vertices[2].x,
            L[0] * vertices[0].y + L[1] * vertices[1].y + L[2] * vertices[2].y,
        )
    }

    pub fn centroid(vertices: &[Point2<f64>; 3]) -> Point2<f64> {
        let c = 1.0 / 3.0;
        Self::map_point(&[c, c, c], vertices)
    }

    fn scale(vertices: &[Point2<f64>; 3]) -> f64 {
        let e1 = (vertices[1] - vertices[0]).norm_squared();
        let e2 = (vertices[2] - vertices[0]).norm_squared();
        e1.max(e2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference() -> [Point2<f64>; 3] {
        [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)]
    }

    #[test]
    fn test_reference_area_and_gradients() {
        let v = reference();
        assert_relative_eq!(Tri3Basis::area(&v), 0.5);

        let dN = Tri3Basis::shape_derivatives_cartesian(&v).unwrap();
        assert_relative_eq!(dN[0][0], -1.0);
        assert_relative_eq!(dN[0][1], -1.0);
        assert_relative_eq!(dN[1][0], 1.0);
        assert_relative_eq!(dN[1][1], 0.0);
        assert_relative_eq!(dN[2][0], 0.0);
        assert_relative_eq!(dN[2][1], 1.0);
    }

    #[test]
    fn test_gradients_reproduce_linear_field() {
        let v = [Point2::new(0.3, 0.1), Point2::new(1.2, 0.4), Point2::new(0.5, 0.9)];
        let dN = Tri3Basis::shape_derivatives_cartesian(&v).unwrap();

        // f(x, y) = 2x - 3y + 1 has gradient (2, -3)
        let f: Vec<f64> = v.iter().map(|p| 2.0 * p.x - 3.0 * p.y + 1.0).collect();
        let gx: f64 = (0..3).map(|i| dN[i][0] * f[i]).sum();
        let gy: f64 = (0..3).map(|i| dN[i][1] * f[i]).sum();
        assert_relative_eq!(gx, 2.0, epsilon = 1e-12);
        assert_relative_eq!(gy, -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_partition_of_unity_and_degenerate() {
        let n = Tri3Basis::shape_functions(&[0.2, 0.3, 0.5]);
        assert_relative_eq!(n.iter().sum::<f64>(), 1.0);

        let flat = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
        assert!(Tri3Basis::shape_derivatives_cartesian(&flat).is_none());
    }
}
