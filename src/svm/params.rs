//! Kernel SVC and constrained optimizer parameters
//!

use serde::{Deserialize, Serialize};


/// What to do when no dual coefficient lies strictly inside ]epsilon, C - epsilon[
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarginPolicy {
    /// fit fails with NoMarginPoints
    Strict,
    /// offset is set to 0.
    ZeroOffset,
}


/// per sample weights used in the linear term of the dual and in box constraints
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleWeighting {
    /// all weights are 1.
    Uniform,
    /// weight of a sample is N / (2 * size of its class)
    Balanced,
}


/// Parameters of the augmented lagrangian optimizer
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimParams {
    /// max number of multiplier updates
    pub max_outer : usize,
    /// max number of L-BFGS iterations in each sub problem
    pub max_inner : usize,
    /// tolerance on constraint violation and complementarity
    pub tol : f64,
    /// tolerance on sup norm of the sub problem gradient
    pub grad_tol : f64,
    /// initial penalty
    pub rho_init : f64,
    ///
    pub rho_max : f64,
    /// number of pairs kept in L-BFGS
    pub memory : usize,
} // end of OptimParams


impl Default for OptimParams {
    fn default() -> Self {
        OptimParams{ max_outer : 100, max_inner : 2000, tol : 1.0E-7, grad_tol : 1.0E-9,
                    rho_init : 10., rho_max : 1.0E10, memory : 10}
    }
}



#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvcParams {
    /// box bound on dual coefficients
    pub c : f64,
    /// dual coefficients below epsilon are considered null
    pub epsilon : f64,
    ///
    pub margin_policy : MarginPolicy,
    ///
    pub weighting : SampleWeighting,
    ///
    pub optim : OptimParams,
} // end of SvcParams


impl SvcParams {

    pub fn new(c : f64, epsilon : f64) -> Self {
        SvcParams{ c, epsilon, ..Default::default()}
    }

    pub fn get_c(&self) -> f64 { self.c }

    pub fn get_epsilon(&self) -> f64 { self.epsilon }

    pub fn get_margin_policy(&self) -> MarginPolicy { self.margin_policy }

    pub fn get_weighting(&self) -> SampleWeighting { self.weighting }

    pub fn get_optim_params(&self) -> &OptimParams { &self.optim }

    pub fn with_margin_policy(mut self, policy : MarginPolicy) -> Self {
        self.margin_policy = policy;
        self
    }

    pub fn with_weighting(mut self, weighting : SampleWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_optim_params(mut self, optim : OptimParams) -> Self {
        self.optim = optim;
        self
    }
} // end of impl SvcParams


impl Default for SvcParams {
    fn default() -> Self {
        SvcParams{ c : 1., epsilon : 1.0E-3, margin_policy : MarginPolicy::Strict,
                weighting : SampleWeighting::Uniform, optim : OptimParams::default()}
    }
}


// end of mod tests
