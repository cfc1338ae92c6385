//! A general optimizer for smooth problems under equality and inequality constraints:
//!
//!   minimize f(x)  subject to  h(x) = 0 and g(x) >= 0
//!
//! Constraint functions come with explicit jacobians (stored as sparse matrices).
//! We use the augmented lagrangian method of Powell-Hestenes-Rockafellar. Each sub problem
//! is an unconstrained C1 minimization solved with L-BFGS and a backtracking (Armijo) line search.
//!
//! See Nocedal-Wright Numerical Optimization chap. 7 and 17, Birgin-Martinez Practical Augmented Lagrangian Methods 2014.
//!
//! Convergence is reported, not enforced: the last iterate is returned in any case.

use std::collections::VecDeque;

use anyhow::anyhow;

use ndarray::Array1;
use sprs::{CsMat, TriMatI};

use super::params::OptimParams;


// sufficient decrease constant in Armijo rule
const ARMIJO : f64 = 1.0E-4;
//
const MAX_BACKTRACK : usize = 60;


/// The problem to solve.
/// jacobians have one row by constraint and dim() columns.
pub trait ConstrainedProblem {
    /// dimension of x
    fn dim(&self) -> usize;
    ///
    fn objective(&self, x : &Array1<f64>) -> f64;
    ///
    fn gradient(&self, x : &Array1<f64>) -> Array1<f64>;
    /// h(x), null at solution
    fn eq_constraints(&self, x : &Array1<f64>) -> Array1<f64>;
    ///
    fn eq_jacobian(&self, x : &Array1<f64>) -> CsMat<f64>;
    /// g(x), non negative at solution
    fn ineq_constraints(&self, x : &Array1<f64>) -> Array1<f64>;
    ///
    fn ineq_jacobian(&self, x : &Array1<f64>) -> CsMat<f64>;
} // end of trait ConstrainedProblem



/// result of the optimization
#[derive(Debug, Clone)]
pub struct OptimResult {
    /// last iterate
    pub x : Array1<f64>,
    /// objective at x
    pub objective : f64,
    /// true if constraints and complementarity were satisfied within tolerance with a solved sub problem
    pub converged : bool,
    /// number of multiplier updates done
    pub nb_outer : usize,
    /// last measure of constraint violation and complementarity
    pub violation : f64,
} // end of OptimResult



/// builds a compressed row matrix from (row, col, value) triplets
pub fn sparse_from_triplets(shape : (usize, usize), triplets : &[(usize, usize, f64)]) -> CsMat<f64> {
    let rows : Vec<usize> = triplets.iter().map(|t| t.0).collect();
    let cols : Vec<usize> = triplets.iter().map(|t| t.1).collect();
    let values : Vec<f64> = triplets.iter().map(|t| t.2).collect();
    let trimat = TriMatI::<f64, usize>::from_triplets(shape, rows, cols, values);
    let csr_mat : CsMat<f64> = trimat.to_csr();
    csr_mat
} // end of sparse_from_triplets


// returns transpose(jac) * v, shapes are checked by minimize
fn jacobian_transpose_mul(jac : &CsMat<f64>, v : &Array1<f64>) -> Array1<f64> {
    debug_assert_eq!(jac.rows(), v.len());
    let mut res = Array1::<f64>::zeros(jac.cols());
    let mut iter = jac.iter();
    while let Some((val, (row, col))) = iter.next() {
        res[col] += *val * v[row];
    }
    res
} // end of jacobian_transpose_mul


fn sup_norm(v : &Array1<f64>) -> f64 {
    v.iter().fold(0., |acc : f64, x| acc.max(x.abs()))
}



// L_rho(x) = f(x) + lambda.h(x) + rho/2 |h(x)|^2 + 1/(2 rho) sum (max(0, mu - rho g(x))^2 - mu^2)
struct AugmentedLagrangian<'a, P> {
    problem : &'a P,
    lambda : Array1<f64>,
    mu : Array1<f64>,
    rho : f64,
}


impl <'a, P> AugmentedLagrangian<'a, P> where P : ConstrainedProblem {

    fn value_grad(&self, x : &Array1<f64>) -> (f64, Array1<f64>) {
        let mut value = self.problem.objective(x);
        let mut grad = self.problem.gradient(x);
        // equality part
        let h = self.problem.eq_constraints(x);
        value += self.lambda.dot(&h) + 0.5 * self.rho * h.dot(&h);
        let weight_h = &self.lambda + &(&h * self.rho);
        grad += &jacobian_transpose_mul(&self.problem.eq_jacobian(x), &weight_h);
        // inequality part
        let g = self.problem.ineq_constraints(x);
        let shifted = (&self.mu - &(&g * self.rho)).mapv(|v| v.max(0.));
        value += (shifted.dot(&shifted) - self.mu.dot(&self.mu)) / (2. * self.rho);
        grad -= &jacobian_transpose_mul(&self.problem.ineq_jacobian(x), &shifted);
        (value, grad)
    } // end of value_grad

    // max of |h| and |min(g, mu/rho)|
    fn violation(&self, x : &Array1<f64>) -> f64 {
        let h = self.problem.eq_constraints(x);
        let g = self.problem.ineq_constraints(x);
        let violation = sup_norm(&h);
        g.iter().zip(self.mu.iter()).fold(violation, |acc, (gi, mi)| acc.max(gi.min(mi / self.rho).abs()))
    }

    fn update_multipliers(&mut self, x : &Array1<f64>) {
        let h = self.problem.eq_constraints(x);
        let g = self.problem.ineq_constraints(x);
        self.lambda.scaled_add(self.rho, &h);
        self.mu = (&self.mu - &(&g * self.rho)).mapv(|v| v.max(0.));
    }
} // end of impl AugmentedLagrangian



#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum InnerStatus {
    /// gradient below tolerance
    Converged,
    /// no more decrease possible at machine precision
    Stalled,
    MaxIter,
}


// minimize an unconstrained C1 function given by value and gradient
fn lbfgs_minimize<F>(fun : F, x0 : Array1<f64>, params : &OptimParams) -> (Array1<f64>, InnerStatus, usize)
    where F : Fn(&Array1<f64>) -> (f64, Array1<f64>) {
    //
    let mut x = x0;
    let (mut fx, mut gx) = fun(&x);
    let memory = params.memory;
    let mut s_hist = VecDeque::<Array1<f64>>::with_capacity(memory);
    let mut y_hist = VecDeque::<Array1<f64>>::with_capacity(memory);
    let mut rho_hist = VecDeque::<f64>::with_capacity(memory);
    //
    for iter in 0..params.max_inner {
        let gnorm = sup_norm(&gx);
        if gnorm <= params.grad_tol {
            return (x, InnerStatus::Converged, iter);
        }
        if !gnorm.is_finite() || !fx.is_finite() {
            log::error!("lbfgs_minimize : non finite value or gradient at iteration {}", iter);
            return (x, InnerStatus::Stalled, iter);
        }
        // two loop recursion
        let k = s_hist.len();
        let mut q = gx.clone();
        let mut alphas = vec![0.; k];
        for i in (0..k).rev() {
            alphas[i] = rho_hist[i] * s_hist[i].dot(&q);
            q.scaled_add(-alphas[i], &y_hist[i]);
        }
        let gamma = match k {
            0 => 1. / gnorm.max(1.),
            _ => s_hist[k-1].dot(&y_hist[k-1]) / y_hist[k-1].dot(&y_hist[k-1]),
        };
        let mut direction = q * gamma;
        for i in 0..k {
            let beta = rho_hist[i] * y_hist[i].dot(&direction);
            direction.scaled_add(alphas[i] - beta, &s_hist[i]);
        }
        direction.mapv_inplace(|v| -v);
        let mut slope = gx.dot(&direction);
        if !(slope < 0.) {
            // not a descent direction, restart from steepest descent
            s_hist.clear();
            y_hist.clear();
            rho_hist.clear();
            direction = gx.mapv(|v| -v / gnorm.max(1.));
            slope = gx.dot(&direction);
        }
        // backtracking
        let mut step = 1.;
        let mut accepted : Option<(Array1<f64>, f64, Array1<f64>)> = None;
        for _ in 0..MAX_BACKTRACK {
            let trial = &x + &(&direction * step);
            let (f_trial, g_trial) = fun(&trial);
            if f_trial <= fx + ARMIJO * step * slope {
                accepted = Some((trial, f_trial, g_trial));
                break;
            }
            step *= 0.5;
        }
        let (x_new, f_new, g_new) = match accepted {
            Some(triple) => triple,
            None => {
                log::trace!("lbfgs_minimize : line search failed at iteration {}, gradient norm {:.3e}", iter, gnorm);
                return (x, InnerStatus::Stalled, iter);
            },
        };
        let s = &x_new - &x;
        let y = &g_new - &gx;
        let sy = s.dot(&y);
        if memory > 0 && sy > f64::EPSILON * y.dot(&y) {
            if s_hist.len() == memory {
                s_hist.pop_front();
                y_hist.pop_front();
                rho_hist.pop_front();
            }
            s_hist.push_back(s);
            y_hist.push_back(y);
            rho_hist.push_back(1. / sy);
        }
        let decrease = fx - f_new;
        x = x_new;
        fx = f_new;
        gx = g_new;
        if decrease <= f64::EPSILON * fx.abs().max(1.) {
            return (x, InnerStatus::Stalled, iter + 1);
        }
    } // end of for iter
    //
    (x, InnerStatus::MaxIter, params.max_inner)
} // end of lbfgs_minimize



/// minimize problem starting from x0.
/// Fails only on inconsistent dimensions or parameters. Non convergence is reported in OptimResult.
pub fn minimize<P>(problem : &P, x0 : Array1<f64>, params : &OptimParams) -> anyhow::Result<OptimResult>
    where P : ConstrainedProblem {
    //
    let dim = problem.dim();
    if x0.len() != dim {
        return Err(anyhow!("minimize : initial point has dimension {}, problem has dimension {}", x0.len(), dim));
    }
    if !(params.rho_init > 0.) || params.rho_max < params.rho_init {
        return Err(anyhow!("minimize : bad penalty parameters rho_init {:.3e}, rho_max {:.3e}", params.rho_init, params.rho_max));
    }
    let nb_eq = problem.eq_constraints(&x0).len();
    let nb_ineq = problem.ineq_constraints(&x0).len();
    if problem.eq_jacobian(&x0).shape() != (nb_eq, dim) {
        return Err(anyhow!("minimize : equality jacobian shape {:?}, expected {:?}", problem.eq_jacobian(&x0).shape(), (nb_eq, dim)));
    }
    if problem.ineq_jacobian(&x0).shape() != (nb_ineq, dim) {
        return Err(anyhow!("minimize : inequality jacobian shape {:?}, expected {:?}", problem.ineq_jacobian(&x0).shape(), (nb_ineq, dim)));
    }
    log::debug!("minimize : dim {}, nb equalities {}, nb inequalities {}", dim, nb_eq, nb_ineq);
    //
    let mut lagrangian = AugmentedLagrangian{ problem, lambda : Array1::zeros(nb_eq), mu : Array1::zeros(nb_ineq), rho : params.rho_init};
    let mut x = x0;
    let mut converged = false;
    let mut nb_outer = 0;
    let mut violation = f64::INFINITY;
    let mut previous_violation = f64::INFINITY;
    //
    for outer in 0..params.max_outer {
        nb_outer = outer + 1;
        let (x_new, status, nb_inner) = lbfgs_minimize(|z| lagrangian.value_grad(z), x, params);
        x = x_new;
        violation = lagrangian.violation(&x);
        log::trace!("outer iter {}, rho {:.3e}, inner iters {}, status {:?}, violation {:.3e}, objective {:.6e}",
                outer, lagrangian.rho, nb_inner, status, violation, problem.objective(&x));
        lagrangian.update_multipliers(&x);
        if violation <= params.tol && status != InnerStatus::MaxIter {
            converged = true;
            break;
        }
        if violation > 0.25 * previous_violation {
            lagrangian.rho = (10. * lagrangian.rho).min(params.rho_max);
        }
        previous_violation = violation;
    }
    //
    let objective = problem.objective(&x);
    if converged {
        log::debug!("minimize converged after {} outer iterations, objective {:.6e}, violation {:.3e}", nb_outer, objective, violation);
    }
    else {
        log::warn!("minimize did not converge after {} outer iterations, violation {:.3e}, returning last iterate", nb_outer, violation);
    }
    Ok(OptimResult{ x, objective, converged, nb_outer, violation})
} // end of minimize



//=====================================================================================


#[cfg(test)]
mod tests {

use super::*;

use ndarray::array;

fn log_init_test() {
    let _ = env_logger::builder().is_test(true).try_init();
}


// projection of target on the line x + y = 1, possibly restricted to the positive quadrant
struct Projection {
    target : Array1<f64>,
    positive : bool,
}


impl ConstrainedProblem for Projection {
    fn dim(&self) -> usize { 2 }

    fn objective(&self, x : &Array1<f64>) -> f64 {
        let d = x - &self.target;
        d.dot(&d)
    }

    fn gradient(&self, x : &Array1<f64>) -> Array1<f64> {
        (x - &self.target) * 2.
    }

    fn eq_constraints(&self, x : &Array1<f64>) -> Array1<f64> {
        array![x[0] + x[1] - 1.]
    }

    fn eq_jacobian(&self, _x : &Array1<f64>) -> CsMat<f64> {
        sparse_from_triplets((1, 2), &[(0, 0, 1.), (0, 1, 1.)])
    }

    fn ineq_constraints(&self, x : &Array1<f64>) -> Array1<f64> {
        match self.positive {
            true => x.clone(),
            false => Array1::zeros(0),
        }
    }

    fn ineq_jacobian(&self, _x : &Array1<f64>) -> CsMat<f64> {
        match self.positive {
            true => sparse_from_triplets((2, 2), &[(0, 0, 1.), (1, 1, 1.)]),
            false => sparse_from_triplets((0, 2), &[]),
        }
    }
} // end of impl ConstrainedProblem for Projection


#[test]
fn test_equality_only() {
    log_init_test();
    let problem = Projection{ target : array![1., 2.], positive : false};
    let res = minimize(&problem, array![1., 1.], &OptimParams::default()).unwrap();
    log::info!("result : {:?}", res);
    assert!(res.converged);
    assert!((res.x[0] - 0.).abs() < 1.0E-5);
    assert!((res.x[1] - 1.).abs() < 1.0E-5);
    assert!((res.objective - 2.).abs() < 1.0E-5);
} // end of test_equality_only


#[test]
fn test_active_inequality() {
    log_init_test();
    // without bounds the projection would be (-0.25, 1.25)
    let problem = Projection{ target : array![-1., 0.5], positive : false};
    let res = minimize(&problem, array![1., 1.], &OptimParams::default()).unwrap();
    assert!((res.x[0] + 0.25).abs() < 1.0E-5);
    assert!((res.x[1] - 1.25).abs() < 1.0E-5);
    //
    let problem = Projection{ target : array![-1., 0.5], positive : true};
    let res = minimize(&problem, array![1., 1.], &OptimParams::default()).unwrap();
    log::info!("result : {:?}", res);
    assert!(res.converged);
    assert!(res.x[0].abs() < 1.0E-5);
    assert!((res.x[1] - 1.).abs() < 1.0E-5);
} // end of test_active_inequality


#[test]
fn test_iteration_budget() {
    log_init_test();
    let problem = Projection{ target : array![-1., 0.5], positive : true};
    let params = OptimParams{ max_outer : 1, max_inner : 1, ..Default::default()};
    let res = minimize(&problem, array![1., 1.], &params).unwrap();
    assert!(!res.converged);
    assert_eq!(res.nb_outer, 1);
} // end of test_iteration_budget


#[test]
fn test_bad_dimension() {
    log_init_test();
    let problem = Projection{ target : array![1., 2.], positive : true};
    assert!(minimize(&problem, array![1., 1., 1.], &OptimParams::default()).is_err());
    let params = OptimParams{ rho_init : 0., ..Default::default()};
    assert!(minimize(&problem, array![1., 1.], &params).is_err());
} // end of test_bad_dimension


#[test]
fn test_jacobian_transpose_mul() {
    let jac = sparse_from_triplets((3, 2), &[(0, 0, -1.), (1, 1, -2.), (2, 0, 1.)]);
    let res = jacobian_transpose_mul(&jac, &array![1., 2., 3.]);
    assert_eq!(res, array![2., -4.]);
} // end of test_jacobian_transpose_mul


// jacobian with a missing row, must be reported as an error and never reach the products
struct ShortJacobian;

impl ConstrainedProblem for ShortJacobian {
    fn dim(&self) -> usize { 2 }
    fn objective(&self, x : &Array1<f64>) -> f64 { x.dot(x) }
    fn gradient(&self, x : &Array1<f64>) -> Array1<f64> { x * 2. }
    fn eq_constraints(&self, x : &Array1<f64>) -> Array1<f64> { array![x[0] - 1., x[1] - 1.] }
    fn eq_jacobian(&self, _x : &Array1<f64>) -> CsMat<f64> { sparse_from_triplets((1, 2), &[(0, 0, 1.)]) }
    fn ineq_constraints(&self, _x : &Array1<f64>) -> Array1<f64> { Array1::zeros(0) }
    fn ineq_jacobian(&self, _x : &Array1<f64>) -> CsMat<f64> { sparse_from_triplets((0, 2), &[]) }
}


#[test]
fn test_bad_jacobian_shape() {
    log_init_test();
    let res = minimize(&ShortJacobian, array![0., 0.], &OptimParams::default());
    assert!(res.is_err());
} // end of test_bad_jacobian_shape

}  // end of mod tests
