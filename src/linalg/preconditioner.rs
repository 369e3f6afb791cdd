use sprs::CsMat;

/// Approximate inverse applied once per CG iteration: `z = M⁻¹ r`
pub trait Preconditioner {
    fn apply(&self, r: &[f64]) -> Vec<f64>;
}

/// Diagonal scaling by `1 / A_ii`
///
/// Stiffness diagonals span the phase contrast, so scaling them out matters
/// far more than anything fancier. Zero diagonals scale by 1.
pub struct JacobiPreconditioner {
    scale: Vec<f64>,
}

impl JacobiPreconditioner {
    #[allow(non_snake_case)]
    pub fn new(A: &CsMat<f64>) -> Self {
        let scale = (0..A.rows())
            .map(|i| match A.get(i, i) {
                Some(&d) if d.abs() > f64::MIN_POSITIVE => d.recip(),
                _ => 1.0,
            })
            .collect();
        Self { scale }
    }
}

impl Preconditioner for JacobiPreconditioner {
    fn apply(&self, r: &[f64]) -> Vec<f64> {
        r.iter().zip(&self.scale).map(|(ri, si)| ri * si).collect()
    }
}

/// Plain CG
pub struct IdentityPreconditioner;

impl Preconditioner for IdentityPreconditioner {
    fn apply(&self, r: &[f64]) -> Vec<f64> {
        r.to_vec()
    }
}
