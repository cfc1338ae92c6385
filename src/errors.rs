//! Errors raised by graph products, walk kernels and the kernel SVC.
//!
//! Structural errors (directedness, multigraph, shapes, labels) are fatal.
//! [GraphKernelError::EmptyProduct] is the only one swallowed locally: the walk kernel maps it to a 0 kernel value.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphKernelError {
    /// both graphs of a product must be directed or both undirected
    #[error("G and H must be both directed or both undirected (G directed : {g_directed}, H directed : {h_directed})")]
    DirectednessMismatch { g_directed: bool, h_directed: bool },

    /// products of multigraphs are not implemented
    #[error("multigraph input is not supported in tensor product")]
    Multigraph,

    /// no label compatible node pair, the adjacency matrix is degenerate
    #[error("tensor product has an empty node set")]
    EmptyProduct,

    /// every node must carry at least one label
    #[error("node must have at least one label")]
    EmptyLabels,

    #[error("node rank {rank} out of range, nb nodes : {nb_nodes}")]
    NodeOutOfRange { rank: usize, nb_nodes: usize },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// training labels must be 0 or 1
    #[error("invalid label {label} at rank {rank}, expecting 0 or 1")]
    InvalidLabel { rank: usize, label: u8 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// no dual coefficient strictly inside the box, the offset cannot be computed
    #[error("no margin points: no dual coefficient in ]epsilon, C - epsilon[, cannot compute offset")]
    NoMarginPoints,

    #[error(transparent)]
    Optimizer(#[from] anyhow::Error),
} // end of GraphKernelError
