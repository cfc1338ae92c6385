//! Kernel Support Vector Classifier solved in its dual form on a precomputed Gram matrix.
//!
//! With y in {-1,1}, K the Gram matrix of training graphs and w per sample weights we minimize
//!
//!   1/2 (alpha * y)' K (alpha * y) - w.alpha   subject to  alpha.y = 0  and  0 <= w * alpha <= C
//!
//! (* is the component-wise product). Support vectors are samples with alpha > epsilon, margin points
//! those with epsilon < alpha < C / w - epsilon. The offset is the mean over margin points of y - K (alpha * y).
//!
//! Fitting returns an immutable [SvcModel] that holds what prediction needs.

use std::time::SystemTime;
use cpu_time::ProcessTime;

use ndarray::{Array1, Array2};
use sprs::CsMat;

use crate::errors::GraphKernelError;
use crate::gkernel::GramKernel;
use super::params::*;
use super::optim::*;


// the dual problem as seen by the optimizer
struct DualProblem<'a> {
    gram : &'a Array2<f64>,
    /// labels in {-1, 1}
    y : &'a Array1<f64>,
    weights : &'a Array1<f64>,
    c : f64,
}


impl <'a> ConstrainedProblem for DualProblem<'a> {

    fn dim(&self) -> usize {
        self.y.len()
    }

    fn objective(&self, alpha : &Array1<f64>) -> f64 {
        // component-wise product avoids building diag(y) K diag(y)
        let lamda = self.y * alpha;
        0.5 * lamda.dot(&self.gram.dot(&lamda)) - self.weights.dot(alpha)
    }

    fn gradient(&self, alpha : &Array1<f64>) -> Array1<f64> {
        let lamda = self.y * alpha;
        self.y * &self.gram.dot(&lamda) - self.weights
    }

    fn eq_constraints(&self, alpha : &Array1<f64>) -> Array1<f64> {
        Array1::from_elem(1, alpha.dot(self.y))
    }

    fn eq_jacobian(&self, _alpha : &Array1<f64>) -> CsMat<f64> {
        let triplets : Vec<(usize, usize, f64)> = self.y.iter().enumerate().map(|(i, yi)| (0, i, *yi)).collect();
        sparse_from_triplets((1, self.dim()), &triplets)
    }

    // C - w * alpha >= 0 stacked over w * alpha >= 0
    fn ineq_constraints(&self, alpha : &Array1<f64>) -> Array1<f64> {
        let walpha = self.weights * alpha;
        walpha.iter().map(|v| self.c - v).chain(walpha.iter().cloned()).collect()
    }

    fn ineq_jacobian(&self, _alpha : &Array1<f64>) -> CsMat<f64> {
        let n = self.dim();
        let mut triplets = Vec::<(usize, usize, f64)>::with_capacity(2 * n);
        for (i, w) in self.weights.iter().enumerate() {
            triplets.push((i, i, -w));
            triplets.push((n + i, i, *w));
        }
        sparse_from_triplets((2 * n, n), &triplets)
    }
} // end of impl ConstrainedProblem for DualProblem



fn sample_weights(labels : &[u8], weighting : SampleWeighting) -> Array1<f64> {
    let nb_samples = labels.len();
    match weighting {
        SampleWeighting::Uniform => Array1::<f64>::ones(nb_samples),
        SampleWeighting::Balanced => {
            let nb_ones = labels.iter().filter(|l| **l == 1).count();
            let nb_zeros = nb_samples - nb_ones;
            labels.iter().map(|l| {
                    let class_size = if *l == 1 { nb_ones } else { nb_zeros };
                    nb_samples as f64 / (2. * class_size as f64)
                }).collect()
        },
    }
} // end of sample_weights



/// The classifier before fitting: a kernel and parameters.
pub struct KernelSvc<K> {
    kernel : K,
    params : SvcParams,
}


impl <K> KernelSvc<K> {

    pub fn new(kernel : K, params : SvcParams) -> Self {
        KernelSvc{kernel, params}
    }

    pub fn get_params(&self) -> &SvcParams {
        &self.params
    }

    fn check_input<G>(&self, graphs : &[G], labels : &[u8]) -> Result<(), GraphKernelError> {
        if graphs.is_empty() {
            return Err(GraphKernelError::ShapeMismatch(String::from("empty training set")));
        }
        if graphs.len() != labels.len() {
            return Err(GraphKernelError::ShapeMismatch(format!("{} graphs and {} labels", graphs.len(), labels.len())));
        }
        if let Some((rank, label)) = labels.iter().enumerate().find(|(_, l)| **l > 1) {
            return Err(GraphKernelError::InvalidLabel{rank, label : *label});
        }
        if !(self.params.get_c() > 0.) {
            return Err(GraphKernelError::InvalidParameter(format!("C must be positive, got {}", self.params.get_c())));
        }
        if !(self.params.get_epsilon() >= 0.) {
            return Err(GraphKernelError::InvalidParameter(format!("epsilon must be non negative, got {}", self.params.get_epsilon())));
        }
        Ok(())
    } // end of check_input


    /// fits the classifier on graphs with labels in {0,1}.
    pub fn fit<G>(&self, graphs : &[G], labels : &[u8]) -> Result<SvcModel<G, K>, GraphKernelError>
        where G : Clone,
              K : GramKernel<G> + Clone {
        //
        self.check_input(graphs, labels)?;
        let nb_samples = graphs.len();
        let c = self.params.get_c();
        let epsilon = self.params.get_epsilon();
        //
        log::info!("Start of the computation of the gram matrix, nb graphs : {}", nb_samples);
        let gram = self.kernel.gram(graphs, graphs, true)?;
        log::info!("End of the computation of the gram matrix");
        //
        let weights = sample_weights(labels, self.params.get_weighting());
        // from {0,1} to {-1,1}
        let y : Array1<f64> = labels.iter().map(|l| 2. * (*l as f64) - 1.).collect();
        //
        let problem = DualProblem{ gram : &gram, y : &y, weights : &weights, c};
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        let res = minimize(&problem, Array1::<f64>::ones(nb_samples), self.params.get_optim_params())?;
        log::info!("End of the minimization, converged : {}, objective : {:.6e}, sys time(s) {:.3e} cpu time(s) {:.3e}",
                res.converged, res.objective, sys_start.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.), cpu_start.elapsed().as_secs_f64());
        if !res.converged {
            log::warn!("dual optimization did not converge (violation {:.3e}), keeping last iterate", res.violation);
        }
        let alpha = res.x;
        //
        let lamda = &y * &alpha;
        let k_lamda = gram.dot(&lamda);
        // points strictly inside their box [0, C / w_i] lie on the margin
        let margin : Vec<usize> = (0..nb_samples).filter(|i| alpha[*i] > epsilon && alpha[*i] < c / weights[*i] - epsilon).collect();
        log::debug!("nb margin points : {}", margin.len());
        let offset = match margin.len() {
            0 => match self.params.get_margin_policy() {
                MarginPolicy::Strict => {
                    log::error!("no margin point, cannot compute offset");
                    return Err(GraphKernelError::NoMarginPoints);
                },
                MarginPolicy::ZeroOffset => {
                    log::warn!("no margin point, offset set to 0.");
                    0.
                },
            },
            nb_margin => margin.iter().map(|i| y[*i] - k_lamda[*i]).sum::<f64>() / nb_margin as f64,
        };
        // RKHS norm of the separating function
        let norm_f = lamda.dot(&k_lamda);
        //
        let support_indices : Vec<usize> = (0..nb_samples).filter(|i| alpha[*i] > epsilon).collect();
        let support : Vec<G> = support_indices.iter().map(|i| graphs[*i].clone()).collect();
        let support_labels : Array1<f64> = support_indices.iter().map(|i| y[*i]).collect();
        let support_alpha : Array1<f64> = support_indices.iter().map(|i| alpha[*i]).collect();
        log::info!("nb support vectors : {}, offset : {:.6e}, norm_f : {:.6e}", support_indices.len(), offset, norm_f);
        if support_indices.is_empty() {
            log::warn!("empty support, classifier will predict 0 for every graph");
        }
        //
        Ok(SvcModel{ kernel : self.kernel.clone(), gram_matrix : gram, alpha : support_alpha, support, support_labels,
                support_indices, offset, norm_f, converged : res.converged})
    } // end of fit

} // end of impl KernelSvc



/// A fitted classifier. It keeps the support graphs and is not modified by prediction.
pub struct SvcModel<G, K> {
    kernel : K,
    /// gram matrix of training graphs
    gram_matrix : Array2<f64>,
    /// dual coefficients of support vectors
    alpha : Array1<f64>,
    support : Vec<G>,
    /// labels of support vectors in {-1,1}
    support_labels : Array1<f64>,
    /// rank of support vectors in training set
    support_indices : Vec<usize>,
    offset : f64,
    norm_f : f64,
    converged : bool,
}


impl <G, K> SvcModel<G, K>
    where K : GramKernel<G> {

    /// returns f(x) = sum alpha_i y_i k(x, x_i) over support vectors, for each graph.
    /// With an empty support this is 0. everywhere.
    pub fn separating_function(&self, graphs : &[G]) -> Result<Array1<f64>, GraphKernelError> {
        let kmat = self.kernel.gram(graphs, &self.support, false)?;
        Ok(kmat.dot(&(&self.alpha * &self.support_labels)))
    }

    /// f(x) + offset
    pub fn decision_function(&self, graphs : &[G]) -> Result<Array1<f64>, GraphKernelError> {
        let offset = self.offset;
        Ok(self.separating_function(graphs)?.mapv(|f| f + offset))
    }

    /// predicts labels in {0,1}
    pub fn predict(&self, graphs : &[G]) -> Result<Vec<u8>, GraphKernelError> {
        let decision = self.decision_function(graphs)?;
        Ok(decision.iter().map(|d| if *d > 0. { 1 } else { 0 }).collect())
    }

    pub fn get_offset(&self) -> f64 { self.offset }

    /// RKHS norm of the separating function
    pub fn get_norm_f(&self) -> f64 { self.norm_f }

    pub fn get_alpha(&self) -> &Array1<f64> { &self.alpha }

    pub fn get_support(&self) -> &[G] { &self.support }

    pub fn get_support_labels(&self) -> &Array1<f64> { &self.support_labels }

    pub fn get_support_indices(&self) -> &[usize] { &self.support_indices }

    pub fn get_gram_matrix(&self) -> &Array2<f64> { &self.gram_matrix }

    pub fn nb_support(&self) -> usize { self.support.len() }

    /// true if the dual optimization converged
    pub fn is_converged(&self) -> bool { self.converged }
} // end of impl SvcModel



//=====================================================================================


// end of mod tests
