//! To ease access to most frequently items
//! 


pub use crate::errors::GraphKernelError;
pub use crate::init_log;

pub use crate::gkernel::GramKernel;
pub use crate::gkernel::pgraph::*;
pub use crate::gkernel::product::{tensor_product, ProductGraph, ProductNode, ProductEdge};
pub use crate::gkernel::walk::*;
pub use crate::gkernel::params::*;

pub use crate::svm::params::*;
pub use crate::svm::dual::{KernelSvc, SvcModel};
pub use crate::svm::optim::{minimize, ConstrainedProblem, OptimResult};
