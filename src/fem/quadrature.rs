/// Gauss-Legendre rules on the unit segment `[0, 1]`
///
/// Cell integrals of linear triangles have constant integrands and need no
/// rule; only boundary tractions are integrated numerically.
pub struct EdgeQuadrature {
    /// Parametric positions along the edge
    pub points: Vec<f64>,
    /// Weights (sum to 1)
    pub weights: Vec<f64>,
}

impl EdgeQuadrature {
    /// 2-point rule (degree 3 exactness)
    pub fn gauss_2point() -> Self {
        let d = 0.5 / 3f64.sqrt();
        Self {
            points: vec![0.5 - d, 0.5 + d],
            weights: vec![0.5, 0.5],
        }
    }

    /// Get the number of integration points
    pub fn num_points(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weights_sum() {
        let edge = EdgeQuadrature::gauss_2point();
        assert_eq!(edge.num_points(), 2);
        assert_relative_eq!(edge.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_polynomial_exactness() {
        // ∫ t^3 dt over [0, 1] = 1/4
        let edge = EdgeQuadrature::gauss_2point();
        let cubic: f64 = edge
            .points
            .iter()
            .zip(edge.weights.iter())
            .map(|(&t, &w)| w * t * t * t)
            .sum();
        assert_relative_eq!(cubic, 0.25, epsilon = 1e-14);
    }
}
