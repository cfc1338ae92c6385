//! Graph kernels between labeled graphs and a kernel Support Vector Classifier built on them.
//!
//! - [gkernel] : tensor product of labeled graphs, n-th order walk kernel and kernel matrices.
//! - [svm] : binary kernel SVC solved in its dual form.


use env_logger::{Builder};

#[macro_use]
extern crate  lazy_static;

lazy_static! {
    static ref LOG: bool = {
        let res = install_logger();
        res
    };
}

// install a logger facility, returns false if a logger was already installed
fn install_logger() -> bool {
    let res = Builder::from_default_env().try_init();
    if res.is_ok() {
        println!("\n ************** initializing logger *****************\n");
    }
    res.is_ok()
}

/// Installs an env_logger logger configured by RUST_LOG. Only the first call has an effect.
/// Returns true if this crate installed the logger.
pub fn init_log() -> bool {
    *LOG
}

pub mod errors;

pub mod gkernel;

pub mod svm;

pub mod prelude;



// end of mod tests
