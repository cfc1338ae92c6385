//! Tensor (categorical) product of 2 labeled graphs, restricted to label compatible node pairs.
//!
//! The product P of G and H has a node (u,v) for each u in G and v in H having the same first label.
//! P has an edge ((u,x),(v,y)) if (u,v) is an edge of G, (x,y) an edge of H and the end points labels match.
//! As an edge (u,v) can also be read as (v,u) we also emit ((u,y),(v,x)) when labels match crosswise.
//! This double emission is done whatever the directedness of the graphs.
//!
//! Node and edge attributes of P are the key by key pairing of source attributes, see [pair_attributes].

use std::collections::HashMap;

use petgraph::graph::{Graph, NodeIndex};
use petgraph::{EdgeType, Directed, Undirected};

use sprs::{CsMat, TriMatI};

use crate::errors::GraphKernelError;
use super::pgraph::*;


/// data attached to a node of the product graph
#[derive(Clone, Debug)]
pub struct ProductNode<Nlabel> {
    /// ranks of the node in first and second graph
    pair : (usize, usize),
    /// common first label
    label : Nlabel,
    ///
    attributes : PairedAttrs,
}

impl <Nlabel> ProductNode<Nlabel> {
    pub fn get_pair(&self) -> (usize, usize) { self.pair }

    pub fn get_label(&self) -> &Nlabel { &self.label }

    pub fn get_attributes(&self) -> &PairedAttrs { &self.attributes }
} // end of impl ProductNode


/// data attached to an edge of the product graph
#[derive(Clone, Debug)]
pub struct ProductEdge {
    attributes : PairedAttrs,
}

impl ProductEdge {
    pub fn get_attributes(&self) -> &PairedAttrs { &self.attributes }
}


/// The product graph is directed iff its factors are.
/// It is built for one kernel evaluation and dropped once its adjacency matrix is extracted.
#[derive(Debug)]
pub enum ProductGraph<Nlabel> {
    Directed(Graph<ProductNode<Nlabel>, ProductEdge, Directed>),
    Undirected(Graph<ProductNode<Nlabel>, ProductEdge, Undirected>),
}


impl <Nlabel> ProductGraph<Nlabel> {

    pub fn is_directed(&self) -> bool {
        matches!(self, ProductGraph::Directed(_))
    }

    pub fn node_count(&self) -> usize {
        match self {
            ProductGraph::Directed(g) => g.node_count(),
            ProductGraph::Undirected(g) => g.node_count(),
        }
    }

    pub fn edge_count(&self) -> usize {
        match self {
            ProductGraph::Directed(g) => g.edge_count(),
            ProductGraph::Undirected(g) => g.edge_count(),
        }
    }

    /// returns the pairs (u,v) of nodes, in node index order
    pub fn get_pairs(&self) -> Vec<(usize, usize)> {
        match self {
            ProductGraph::Directed(g) => g.raw_nodes().iter().map(|n| n.weight.get_pair()).collect(),
            ProductGraph::Undirected(g) => g.raw_nodes().iter().map(|n| n.weight.get_pair()).collect(),
        }
    }

    /// adjacency matrix in compressed row storage, one entry 1. per directed edge.
    /// An undirected edge gives 2 symetric entries, a self loop one diagonal entry.
    /// Fails with EmptyProduct if there is no node.
    pub fn adjacency(&self) -> Result<CsMat<f64>, GraphKernelError> {
        match self {
            ProductGraph::Directed(g) => adjacency_csr(g),
            ProductGraph::Undirected(g) => adjacency_csr(g),
        }
    }
} // end of impl ProductGraph



fn adjacency_csr<N, E, Ty>(graph : &Graph<N, E, Ty>) -> Result<CsMat<f64>, GraphKernelError>
    where Ty : EdgeType {
    //
    let nb_nodes = graph.node_count();
    if nb_nodes == 0 {
        return Err(GraphKernelError::EmptyProduct);
    }
    let nb_edges = graph.edge_count();
    let mut rows = Vec::<usize>::with_capacity(2 * nb_edges);
    let mut cols = Vec::<usize>::with_capacity(2 * nb_edges);
    let mut values = Vec::<f64>::with_capacity(2 * nb_edges);
    for edge in graph.raw_edges() {
        let (source, target) = (edge.source().index(), edge.target().index());
        rows.push(source);
        cols.push(target);
        values.push(1.);
        if !Ty::is_directed() && source != target {
            rows.push(target);
            cols.push(source);
            values.push(1.);
        }
    }
    let trimat = TriMatI::<f64, usize>::from_triplets((nb_nodes, nb_nodes), rows, cols, values);
    let csr_mat : CsMat<f64> = trimat.to_csr();
    Ok(csr_mat)
} // end of adjacency_csr



/// check both graphs can enter a product
fn check_product_input<G, H>(g : &G, h : &H) -> Result<(), GraphKernelError>
    where G : LabeledGraphT,
          H : LabeledGraphT {
    if g.is_directed() != h.is_directed() {
        log::error!("G and H must be both directed or both undirected");
        return Err(GraphKernelError::DirectednessMismatch{ g_directed : g.is_directed(), h_directed : h.is_directed()});
    }
    if g.is_multigraph() || h.is_multigraph() {
        log::error!("tensor product of multigraphs not implemented");
        return Err(GraphKernelError::Multigraph);
    }
    Ok(())
} // end of check_product_input


// first label of each node, in rank order
fn first_labels<G>(g : &G) -> Result<Vec<&G::Label>, GraphKernelError>
    where G : LabeledGraphT {
    (0..g.node_count()).map(|rank| g.get_first_label(rank).ok_or(GraphKernelError::EmptyLabels)).collect()
}


type PairIndex = HashMap<(usize, usize), NodeIndex, ahash::RandomState>;


fn add_product_edge<Nlabel, Ty>(graph : &mut Graph<ProductNode<Nlabel>, ProductEdge, Ty>, index : &PairIndex,
                from : (usize, usize), to : (usize, usize), c : &AttrMap, d : &AttrMap)
    where Ty : EdgeType {
    match (index.get(&from), index.get(&to)) {
        (Some(a), Some(b)) => {
            graph.update_edge(*a, *b, ProductEdge{ attributes : pair_attributes(c, d)});
        },
        _ => {
            // cannot happen, end points were checked label compatible
            log::error!("product edge {:?} -> {:?} has an end point not in product", from, to);
        },
    }
} // end of add_product_edge



fn fill_product<G, H, Ty>(g : &G, h : &H, graph : &mut Graph<ProductNode<G::Label>, ProductEdge, Ty>) -> Result<(), GraphKernelError>
    where G : LabeledGraphT,
          H : LabeledGraphT<Label = G::Label>,
          Ty : EdgeType {
    //
    let g_labels = first_labels(g)?;
    let h_labels = first_labels(h)?;
    let mut index = PairIndex::default();
    // nodes
    for u in 0..g_labels.len() {
        for v in 0..h_labels.len() {
            if g_labels[u] != h_labels[v] {
                continue;
            }
            let node = ProductNode{ pair : (u,v), label : g_labels[u].clone(),
                        attributes : pair_attributes(g.get_node_attributes(u), h.get_node_attributes(v))};
            let nidx = graph.add_node(node);
            index.insert((u,v), nidx);
        }
    }
    // edges
    let h_edges : Vec<(usize, usize, &AttrMap)> = h.edges().collect();
    for (u, v, c) in g.edges() {
        for (x, y, d) in &h_edges {
            let (x, y) = (*x, *y);
            if g_labels[u] == h_labels[x] && g_labels[v] == h_labels[y] {
                add_product_edge(graph, &index, (u,x), (v,y), c, d);
            }
            // the edge is (u,v) but it can also be described as (v,u)
            if g_labels[u] == h_labels[y] && g_labels[v] == h_labels[x] {
                add_product_edge(graph, &index, (u,y), (v,x), c, d);
            }
        }
    }
    log::trace!("product graph nb nodes : {}, nb edges : {}", graph.node_count(), graph.edge_count());
    Ok(())
} // end of fill_product



/// Returns the tensor product of G and H.
/// Fails if G and H are not both directed or both undirected, or if one of them is a multigraph.
pub fn tensor_product<G, H>(g : &G, h : &H) -> Result<ProductGraph<G::Label>, GraphKernelError>
    where G : LabeledGraphT,
          H : LabeledGraphT<Label = G::Label> {
    //
    check_product_input(g, h)?;
    if g.is_directed() {
        let mut graph = Graph::<ProductNode<G::Label>, ProductEdge, Directed>::new();
        fill_product(g, h, &mut graph)?;
        Ok(ProductGraph::Directed(graph))
    }
    else {
        let mut graph = Graph::<ProductNode<G::Label>, ProductEdge, Undirected>::new_undirected();
        fill_product(g, h, &mut graph)?;
        Ok(ProductGraph::Undirected(graph))
    }
} // end of tensor_product



//=====================================================================================


// end of mod tests
