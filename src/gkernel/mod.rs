//! This module implements the n-th order walk kernel between labeled graphs.
//!
//! The kernel value between G1 and G2 is the number of walks of length n in the tensor product of G1 and G2,
//! that is the number of simultaneous walks of length n in G1 and G2 going through label compatible node pairs.
//! It is computed as the sum of entries of A^n, A being the (sparse) adjacency matrix of the product graph.
//!
//! Some References on Graph Kernels are :
//!
//! - On Graph Kernels: Hardness Results and Efficient Alternatives. Gärtner, Flach, Wrobel 2003
//!
//! - Graph Kernels : A survey. Nikolentzos-Siglidis-Vazirgiannis 2021
//

use ndarray::Array2;

use crate::errors::GraphKernelError;

/// Defines the labeled graph capabilities used by products, and a petgraph implementation.
pub mod pgraph;

/// Tensor product of labeled graphs.
pub mod product;

/// walk kernel and kernel matrices.
pub mod walk;

/// Defines kernel parameters.
pub mod params;


/// A kernel between collections of items (here graphs).
/// The kernel SVC only sees its kernel through this trait.
pub trait GramKernel<G> {
    /// returns the matrix of kernel values between a[i] and b[j].
    /// same_set is set when a and b are the same collection, the result is then symetric.
    fn gram(&self, a : &[G], b : &[G], same_set : bool) -> Result<Array2<f64>, GraphKernelError>;
}
