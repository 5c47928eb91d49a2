use nalgebra::{DMatrix, DVector};
use sonar_calib_core::Real;

/// Generic non-linear least squares problem with dense parameter/residual
/// vectors.
///
/// The default Jacobian uses central finite differences on [`residuals`];
/// the problems in this crate have at most 6 parameters, where numeric
/// differentiation is both accurate and cheap.
///
/// [`residuals`]: NllsProblem::residuals
pub trait NllsProblem {
    /// Number of parameters in the optimization vector.
    fn num_params(&self) -> usize;
    /// Number of residual rows in the problem.
    fn num_residuals(&self) -> usize;

    /// Residual vector for the current parameters.
    fn residuals(&self, x: &DVector<Real>) -> DVector<Real>;

    /// Jacobian for the current parameters (central differences).
    fn jacobian(&self, x: &DVector<Real>) -> DMatrix<Real> {
        let mut jac = DMatrix::zeros(self.num_residuals(), self.num_params());
        let mut probe = x.clone();
        for col in 0..self.num_params() {
            let step = 1e-6 * x[col].abs().max(1.0);

            probe[col] = x[col] + step;
            let r_plus = self.residuals(&probe);
            probe[col] = x[col] - step;
            let r_minus = self.residuals(&probe);
            probe[col] = x[col];

            jac.set_column(col, &((r_plus - r_minus) / (2.0 * step)));
        }
        jac
    }
}

/// Termination controls for one solver attempt.
#[derive(Debug, Clone, Copy)]
pub struct SolveOptions {
    /// Maximum number of solver iterations per attempt.
    ///
    /// Backends may interpret this as a function-evaluation cap.
    pub max_iters: usize,
    /// Relative tolerance on the objective (cost) reduction.
    pub ftol: Real,
    /// Orthogonality/gradient tolerance.
    pub gtol: Real,
    /// Relative tolerance on parameter updates.
    pub xtol: Real,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_iters: crate::extrinsics::MAX_SOLVER_ITERATIONS,
            ftol: 1e-10,
            gtol: 1e-10,
            xtol: 1e-10,
        }
    }
}

/// Outcome of one solver attempt.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub iterations: usize,
    pub final_cost: Real,
    pub converged: bool,
}

/// A backend able to minimize an [`NllsProblem`] from a starting point.
pub trait NllsSolverBackend {
    fn solve<P: NllsProblem>(
        &self,
        problem: &P,
        x0: DVector<Real>,
        opts: &SolveOptions,
    ) -> (DVector<Real>, SolveReport);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quadratic;

    impl NllsProblem for Quadratic {
        fn num_params(&self) -> usize {
            2
        }

        fn num_residuals(&self) -> usize {
            2
        }

        fn residuals(&self, x: &DVector<Real>) -> DVector<Real> {
            nalgebra::dvector![x[0] * x[0] - 4.0, x[0] * x[1]]
        }
    }

    #[test]
    fn numeric_jacobian_matches_analytic() {
        let p = Quadratic;
        let x = nalgebra::dvector![3.0, -2.0];
        let jac = p.jacobian(&x);

        // d(x0^2 - 4)/dx0 = 2 x0, d(x0 x1)/dx0 = x1, d(x0 x1)/dx1 = x0.
        assert!((jac[(0, 0)] - 6.0).abs() < 1e-5);
        assert!(jac[(0, 1)].abs() < 1e-5);
        assert!((jac[(1, 0)] + 2.0).abs() < 1e-5);
        assert!((jac[(1, 1)] - 3.0).abs() < 1e-5);
    }
}
