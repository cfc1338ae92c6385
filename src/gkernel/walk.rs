//! n-th order walk kernel and kernel (Gram) matrices over graph collections.
//!
//! Each kernel value builds its own product graph and adjacency matrix, so the pairwise evaluations
//! of a kernel matrix are independent and dispatched with rayon, each value written at its own index.

use std::time::SystemTime;
use cpu_time::ProcessTime;

use ndarray::Array2;
use rayon::prelude::*;
use sprs::CsMat;

use crate::errors::GraphKernelError;
use super::pgraph::*;
use super::product::*;
use super::params::*;
use super::GramKernel;


/// returns the number of walks of length n in the tensor product of g1 and g2.
/// If the product has no node (no label compatible pair) the kernel value is 0.
pub fn nth_order_kernel<G, H>(g1 : &G, g2 : &H, n : usize) -> Result<f64, GraphKernelError>
    where G : LabeledGraphT,
          H : LabeledGraphT<Label = G::Label> {
    //
    if n == 0 {
        return Err(GraphKernelError::InvalidParameter(String::from("walk order must be at least 1")));
    }
    let product = tensor_product(g1, g2)?;
    let adjacency = match product.adjacency() {
        Ok(adjacency) => adjacency,
        Err(GraphKernelError::EmptyProduct) => {
            log::debug!("nth_order_kernel : empty product, kernel value set to 0");
            return Ok(0.);
        },
        Err(e) => { return Err(e); },
    };
    drop(product);
    let power = matrix_power(&adjacency, n);
    Ok(power.data().iter().sum::<f64>())
} // end of nth_order_kernel


// adjacency^n with n-1 sparse products
fn matrix_power(adjacency : &CsMat<f64>, n : usize) -> CsMat<f64> {
    let mut power = adjacency.clone();
    for _ in 1..n {
        power = &power * adjacency;
    }
    power
} // end of matrix_power



/// returns the matrix (kernel_values(x[i], y[j])).
/// If same_set is true, x and y are the same collection, only the lower triangle (with diagonal) is computed
/// then mirrored.
pub fn kernel_matrix<G>(x : &[G], y : &[G], same_set : bool, params : &WalkKernelParams) -> Result<Array2<f64>, GraphKernelError>
    where G : LabeledGraphT + Sync {
    //
    let order = params.get_order();
    if order == 0 {
        return Err(GraphKernelError::InvalidParameter(String::from("walk order must be at least 1")));
    }
    if same_set && x.len() != y.len() {
        return Err(GraphKernelError::ShapeMismatch(format!("same set kernel matrix with collections of size {} and {}", x.len(), y.len())));
    }
    let cpu_start = ProcessTime::now();
    let sys_start = SystemTime::now();
    //
    let cells : Vec<(usize, usize)> = match same_set {
        true  => { (0..x.len()).flat_map(|i| (0..=i).map(move |j| (i,j))).collect() },
        false => { (0..x.len()).flat_map(|i| (0..y.len()).map(move |j| (i,j))).collect() },
    };
    log::debug!("kernel_matrix : {} x {}, same set : {}, nb kernel evaluations : {}", x.len(), y.len(), same_set, cells.len());
    //
    let values : Vec<f64> = if params.get_parallel() {
        cells.par_iter().map(|(i,j)| nth_order_kernel(&x[*i], &y[*j], order)).collect::<Result<Vec<f64>, GraphKernelError>>()?
    }
    else {
        cells.iter().map(|(i,j)| nth_order_kernel(&x[*i], &y[*j], order)).collect::<Result<Vec<f64>, GraphKernelError>>()?
    };
    //
    let mut kmat = Array2::<f64>::zeros((x.len(), y.len()));
    for ((i,j), value) in cells.iter().zip(values) {
        kmat[[*i, *j]] = value;
        if same_set && i != j {
            kmat[[*j, *i]] = value;
        }
    }
    //
    log::info!("kernel_matrix ({} x {}) sys time(s) {:.3e} cpu time(s) {:.3e}", x.len(), y.len(),
            sys_start.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.), cpu_start.elapsed().as_secs_f64());
    Ok(kmat)
} // end of kernel_matrix



/// The n-th order walk kernel, usable as a [GramKernel] by the kernel SVC.
#[derive(Debug, Copy, Clone, Default)]
pub struct WalkKernel {
    params : WalkKernelParams,
}

impl WalkKernel {
    pub fn new(params : WalkKernelParams) -> Self {
        WalkKernel{params}
    }

    pub fn get_params(&self) -> &WalkKernelParams {
        &self.params
    }

    /// kernel value between 2 graphs
    pub fn eval<G, H>(&self, g1 : &G, g2 : &H) -> Result<f64, GraphKernelError>
        where G : LabeledGraphT,
              H : LabeledGraphT<Label = G::Label> {
        nth_order_kernel(g1, g2, self.params.get_order())
    }
} // end of impl WalkKernel


impl <G> GramKernel<G> for WalkKernel
    where G : LabeledGraphT + Sync {
    fn gram(&self, a : &[G], b : &[G], same_set : bool) -> Result<Array2<f64>, GraphKernelError> {
        kernel_matrix(a, b, same_set, &self.params)
    }
} // end of impl GramKernel for WalkKernel



//=====================================================================================


#[cfg(test)]
mod tests {

use super::*;

use petgraph::{Directed, EdgeType, Undirected};
use proptest::prelude::*;

fn log_init_test() {
    let _ = env_logger::builder().is_test(true).try_init();
}


fn build_graph<Ty : EdgeType>(labels : &[u8], edges : &[(usize, usize)]) -> LabeledGraph<u8, Ty> {
    let mut graph = LabeledGraph::<u8, Ty>::simple();
    for l in labels {
        graph.add_node(vec![*l], AttrMap::new()).unwrap();
    }
    for (a, b) in edges {
        graph.add_edge(*a, *b, AttrMap::new()).unwrap();
    }
    graph
}


fn triangle(label : u8) -> LabeledGraph<u8, Undirected> {
    build_graph::<Undirected>(&[label; 3], &[(0,1), (1,2), (2,0)])
}


// dense adjacency of an undirected graph, self loops on the diagonal
fn dense_adjacency(g : &LabeledGraph<u8, Undirected>) -> Vec<Vec<u64>> {
    let n = g.node_count();
    let mut a = vec![vec![0u64; n]; n];
    for (s, t, _) in g.edges() {
        a[s][t] = 1;
        a[t][s] = 1;
    }
    a
}


// counts label compatible simultaneous walks of length n in g and h by enumerating walks
fn brute_force_walks(g : &LabeledGraph<u8, Undirected>, h : &LabeledGraph<u8, Undirected>, n : usize) -> u64 {
    let (ag, ah) = (dense_adjacency(g), dense_adjacency(h));
    let mut walks : Vec<(usize, usize)> = Vec::new();
    for u in 0..g.node_count() {
        for v in 0..h.node_count() {
            if g.get_first_label(u) == h.get_first_label(v) {
                walks.push((u,v));
            }
        }
    }
    // walks only need their current end point
    for _ in 0..n {
        let mut next = Vec::new();
        for (u, v) in &walks {
            for x in 0..g.node_count() {
                for y in 0..h.node_count() {
                    if ag[*u][x] == 1 && ah[*v][y] == 1 && g.get_first_label(x) == h.get_first_label(y) {
                        next.push((x,y));
                    }
                }
            }
        }
        walks = next;
    }
    walks.len() as u64
} // end of brute_force_walks


#[test]
fn test_single_nodes() {
    log_init_test();
    let g = build_graph::<Undirected>(&[4], &[]);
    let h = build_graph::<Undirected>(&[4], &[]);
    assert_eq!(nth_order_kernel(&g, &h, 1).unwrap(), 0.);
} // end of test_single_nodes


#[test]
fn test_triangles() {
    log_init_test();
    let g = triangle(1);
    let h = triangle(1);
    // A^3 of a triangle sums to 24, the product adjacency is A x A
    let value = nth_order_kernel(&g, &h, 3).unwrap();
    assert_eq!(value, 576.);
    assert_eq!(value, brute_force_walks(&g, &h, 3) as f64);
} // end of test_triangles


#[test]
fn test_no_compatible_pair() {
    log_init_test();
    let g = triangle(1);
    let h = triangle(2);
    assert_eq!(nth_order_kernel(&g, &h, 2).unwrap(), 0.);
} // end of test_no_compatible_pair


#[test]
fn test_zero_order_rejected() {
    log_init_test();
    let g = triangle(1);
    assert!(matches!(nth_order_kernel(&g, &g, 0), Err(GraphKernelError::InvalidParameter(_))));
} // end of test_zero_order_rejected


#[test]
fn test_structural_errors_propagate() {
    log_init_test();
    let g = build_graph::<Directed>(&[1, 1], &[(0,1)]);
    let h = triangle(1);
    assert!(matches!(nth_order_kernel(&g, &h, 2), Err(GraphKernelError::DirectednessMismatch{..})));
    let mut m = LabeledGraph::<u8, Undirected>::new(true);
    m.add_node(vec![1], AttrMap::new()).unwrap();
    let x = vec![triangle(1), m];
    let params = WalkKernelParams::new(2, false);
    assert!(matches!(kernel_matrix(&x, &x, true, &params), Err(GraphKernelError::Multigraph)));
} // end of test_structural_errors_propagate


#[test]
fn test_directed_kernel() {
    log_init_test();
    // directed 3-cycle a -> b -> c -> a against itself, distinct labels
    let g = build_graph::<Directed>(&[1, 2, 3], &[(0,1), (1,2), (2,0)]);
    // product is a directed 3-cycle : 3 walks of any length
    for n in 1..5 {
        assert_eq!(nth_order_kernel(&g, &g, n).unwrap(), 3.);
    }
} // end of test_directed_kernel


#[test]
fn test_monotone_in_order() {
    log_init_test();
    let g = triangle(0);
    let h = build_graph::<Undirected>(&[0, 0, 0, 0], &[(0,1), (1,2), (2,3), (3,0), (0,2)]);
    let mut previous = 0.;
    for n in 1..6 {
        let value = nth_order_kernel(&g, &h, n).unwrap();
        assert!(value >= previous);
        assert_eq!(value, brute_force_walks(&g, &h, n) as f64);
        previous = value;
    }
    assert!(previous > 0.);
} // end of test_monotone_in_order


fn small_collection() -> Vec<LabeledGraph<u8, Undirected>> {
    vec![
        triangle(0),
        build_graph::<Undirected>(&[0, 1, 0], &[(0,1), (1,2)]),
        build_graph::<Undirected>(&[1, 1, 0, 0], &[(0,1), (1,2), (2,3), (3,0)]),
        build_graph::<Undirected>(&[2], &[]),
        build_graph::<Undirected>(&[0, 0], &[(0,1)]),
    ]
}


#[test]
fn test_kernel_matrix_same_set() {
    log_init_test();
    let x = small_collection();
    for parallel in [false, true] {
        let params = WalkKernelParams::new(3, parallel);
        let kmat = kernel_matrix(&x, &x, true, &params).unwrap();
        assert_eq!(kmat.dim(), (x.len(), x.len()));
        for i in 0..x.len() {
            for j in 0..x.len() {
                assert_eq!(kmat[[i,j]], kmat[[j,i]]);
                assert_eq!(kmat[[i,j]], nth_order_kernel(&x[i], &x[j], 3).unwrap());
                assert!(kmat[[i,j]] >= 0.);
            }
        }
        // brute force double loop
        let full = kernel_matrix(&x, &x, false, &params).unwrap();
        assert_eq!(kmat, full);
    }
    // single node labeled 2 has no edge
    let kmat = kernel_matrix(&x, &x, true, &WalkKernelParams::default()).unwrap();
    assert!(kmat.row(3).iter().all(|v| *v == 0.));
} // end of test_kernel_matrix_same_set


#[test]
fn test_kernel_matrix_rectangular() {
    log_init_test();
    let x = small_collection();
    let y = vec![triangle(0), triangle(1)];
    let kernel = WalkKernel::new(WalkKernelParams::new(2, true));
    let kmat = kernel.gram(&x, &y, false).unwrap();
    assert_eq!(kmat.dim(), (5, 2));
    for i in 0..x.len() {
        for j in 0..y.len() {
            assert_eq!(kmat[[i,j]], kernel.eval(&x[i], &y[j]).unwrap());
        }
    }
    assert!(matches!(kernel.gram(&x, &y, true), Err(GraphKernelError::ShapeMismatch(_))));
    // empty collections give empty matrices
    let empty : Vec<LabeledGraph<u8, Undirected>> = Vec::new();
    assert_eq!(kernel.gram(&x, &empty, false).unwrap().dim(), (5, 0));
    assert_eq!(kernel.gram(&empty, &empty, true).unwrap().dim(), (0, 0));
} // end of test_kernel_matrix_rectangular


#[test]
fn test_kernel_matrix_deterministic() {
    log_init_test();
    let x = small_collection();
    let params = WalkKernelParams::new(4, true);
    let first = kernel_matrix(&x, &x, true, &params).unwrap();
    let second = kernel_matrix(&x, &x, true, &params).unwrap();
    let serial = kernel_matrix(&x, &x, true, &WalkKernelParams::new(4, false)).unwrap();
    for ((a, b), c) in first.iter().zip(second.iter()).zip(serial.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(a.to_bits(), c.to_bits());
    }
} // end of test_kernel_matrix_deterministic


fn arb_graph() -> impl Strategy<Value = LabeledGraph<u8, Undirected>> {
    (1usize..5).prop_flat_map(|nb_nodes| {
        (proptest::collection::vec(0u8..2, nb_nodes), proptest::collection::vec((0..nb_nodes, 0..nb_nodes), 0..6))
    }).prop_map(|(labels, edges)| build_graph::<Undirected>(&labels, &edges))
}


proptest! {

#[test]
fn prop_kernel_swap_invariant(g in arb_graph(), h in arb_graph(), n in 1usize..4) {
    let gh = nth_order_kernel(&g, &h, n).unwrap();
    let hg = nth_order_kernel(&h, &g, n).unwrap();
    prop_assert!(gh >= 0.);
    prop_assert_eq!(gh, hg);
    prop_assert_eq!(gh, brute_force_walks(&g, &h, n) as f64);
}

#[test]
fn prop_gram_symmetric(x in proptest::collection::vec(arb_graph(), 1..5)) {
    let params = WalkKernelParams::new(2, true);
    let kmat = kernel_matrix(&x, &x, true, &params).unwrap();
    let full = kernel_matrix(&x, &x, false, &params).unwrap();
    prop_assert_eq!(kmat.clone(), kmat.t().to_owned());
    prop_assert_eq!(kmat, full);
}

} // end of proptest!

}  // end of mod tests
