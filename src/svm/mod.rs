//! This module implements a binary kernel Support Vector Classifier working on a precomputed Gram matrix.
//!
//! The dual problem is a quadratic program with one equality constraint and box constraints.
//! It is solved by an augmented lagrangian method (see [optim]) whose sub problems are minimized by L-BFGS.
//!
//! Labels are 0 or 1 outside the module and are mapped to -1 and 1 for the optimization.
//!
//! Reference :
//! - Learning with Kernels. Scholkopf, Smola 2002

/// Defines classifier and optimizer parameters.
pub mod params;

/// Augmented lagrangian minimizer for smooth problems with equality and inequality constraints.
pub mod optim;

/// Dual formulation of the SVC, fit and predict.
pub mod dual;
