//! Walk kernel parameters
//!
//!
//!
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkKernelParams {
    /// length of walks counted in the product graph. Must be at least 1
    pub order : usize,
    /// parallel mode for kernel matrices
    pub parallel : bool,
} // end of WalkKernelParams


impl WalkKernelParams {

    pub fn new(order : usize, parallel : bool) -> Self {
        WalkKernelParams{order, parallel}
    }

    ///
    pub fn get_order(&self) -> usize { self.order }

    ///
    pub fn get_parallel(&self) -> bool { self.parallel }

    ///
    pub fn set_parallel(&mut self, parallel : bool) { self.parallel = parallel}

} // end of impl WalkKernelParams


impl Default for WalkKernelParams {
    fn default() -> Self {
        WalkKernelParams{ order : 3, parallel : true}
    }
}


// end of mod tests
