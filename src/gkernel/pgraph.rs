//! This module describes Node and Edge data of labeled graphs fed to graph products and walk kernels.
//! Nodes carry a non empty ordered vector of discrete labels, only the first one is used for compatibility
//! between nodes of two graphs. Nodes and edges can also carry a mapping of attributes.
//!
//! The product and kernel code only see a graph through the capability trait [LabeledGraphT],
//! [LabeledGraph] is an implementation on top of petgraph.
//!
use std::hash::Hash;

use indexmap::IndexMap;

use petgraph::graph::{Graph, NodeIndex};
use petgraph::{EdgeType, Undirected};

use crate::errors::GraphKernelError;

/// Our labels must satisfy:
/// Eq + Hash to compare nodes of 2 graphs, Send + Sync as kernel matrices are computed in parallel.
pub trait LabelT : Send + Sync + Eq + Hash + Clone + Default + std::fmt::Debug {}

impl LabelT for u8 {}
impl LabelT for u16 {}
impl LabelT for u32 {}
impl LabelT for u64 {}
impl LabelT for i32 {}
impl LabelT for i16 {}
impl LabelT for String {}


/// value of a node or edge attribute
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// attributes of a node or an edge, keeps insertion order
pub type AttrMap = IndexMap<String, AttrValue>;

/// attributes of a product node or edge. For each key present in one of the 2 source mappings
/// we get the couple of values, None standing for a key absent from one side.
pub type PairedAttrs = IndexMap<String, (Option<AttrValue>, Option<AttrValue>)>;


/// pairs 2 attribute mappings key by key. Keys of d1 come first in their order, then keys only in d2.
pub fn pair_attributes(d1 : &AttrMap, d2 : &AttrMap) -> PairedAttrs {
    let mut paired = PairedAttrs::with_capacity(d1.len() + d2.len());
    for (key, value) in d1 {
        paired.insert(key.clone(), (Some(value.clone()), d2.get(key).cloned()));
    }
    for (key, value) in d2 {
        if !d1.contains_key(key) {
            paired.insert(key.clone(), (None, Some(value.clone())));
        }
    }
    paired
} // end of pair_attributes


//===================================================================================

/// The capabilities a graph must provide to enter a tensor product.
/// Nodes are addressed by their rank in 0..node_count().
pub trait LabeledGraphT {
    type Label : LabelT;
    ///
    fn is_directed(&self) -> bool;
    /// true if many edges can join the same 2 nodes
    fn is_multigraph(&self) -> bool;
    ///
    fn node_count(&self) -> usize;
    /// labels of node of rank rank. Should not be empty
    fn get_labels(&self, rank : usize) -> &[Self::Label];
    ///
    fn get_node_attributes(&self, rank : usize) -> &AttrMap;
    /// iterator on edges as (source rank, target rank, attributes)
    fn edges(&self) -> Box<dyn Iterator<Item = (usize, usize, &AttrMap)> + '_>;

    /// the label used to match nodes of 2 graphs
    fn get_first_label(&self, rank : usize) -> Option<&Self::Label> {
        self.get_labels(rank).first()
    }
} // end of trait LabeledGraphT



/// defines associated data to a Node.
/// A node can have many labels, the first one is the one used in products.
#[derive(Clone, Debug)]
pub struct Nweight<Nlabel> {
    /// memberships
    labels : Vec<Nlabel>,
    ///
    attributes : AttrMap,
}


impl <Nlabel>  Nweight<Nlabel>
    where Nlabel : LabelT {
    /// fails if labels is empty
    pub fn new(labels : Vec<Nlabel>, attributes : AttrMap) -> Result<Self, GraphKernelError> {
        if labels.is_empty() {
            return Err(GraphKernelError::EmptyLabels);
        }
        Ok(Nweight{labels, attributes})
    }
    /// has_label ?
    pub fn has_label(&self, label : &Nlabel) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn get_labels(&self) -> &[Nlabel] {
        &self.labels
    }

    pub fn get_attributes(&self) -> &AttrMap {
        &self.attributes
    }
} // end of Nweight


//===================================================================================

/// Our edge data. Called Eweight as petgraph items attached to an entity is called a weight
#[derive(Clone, Debug, Default)]
pub struct Eweight {
    attributes : AttrMap,
}

impl Eweight {

    pub fn new(attributes : AttrMap) -> Self {
        Eweight{ attributes }
    }

    pub fn get_attributes(&self) -> &AttrMap {
        &self.attributes
    }
}  // end of Eweight


//=============================================================================

/// A labeled graph stored in a petgraph Graph.
/// Ty is Undirected (default) or Directed.
/// In a simple graph (multigraph = false) adding an edge between 2 already joined nodes replaces its attributes.
#[derive(Clone, Debug)]
pub struct LabeledGraph<Nlabel, Ty = Undirected>
    where Nlabel : LabelT,
          Ty : EdgeType {
    graph : Graph<Nweight<Nlabel>, Eweight, Ty>,
    multigraph : bool,
}


impl <Nlabel, Ty> LabeledGraph<Nlabel, Ty>
    where Nlabel : LabelT,
          Ty : EdgeType {

    pub fn new(multigraph : bool) -> Self {
        LabeledGraph{ graph : Graph::<Nweight<Nlabel>, Eweight, Ty>::default(), multigraph}
    }

    /// a simple graph
    pub fn simple() -> Self {
        Self::new(false)
    }

    /// adds a node and returns its rank
    pub fn add_node(&mut self, labels : Vec<Nlabel>, attributes : AttrMap) -> Result<usize, GraphKernelError> {
        let nweight = Nweight::new(labels, attributes)?;
        Ok(self.graph.add_node(nweight).index())
    }

    /// adds an edge between nodes of rank a and b
    pub fn add_edge(&mut self, a : usize, b : usize, attributes : AttrMap) -> Result<(), GraphKernelError> {
        let nb_nodes = self.graph.node_count();
        for rank in [a, b] {
            if rank >= nb_nodes {
                return Err(GraphKernelError::NodeOutOfRange{rank, nb_nodes});
            }
        }
        let (na, nb) = (NodeIndex::new(a), NodeIndex::new(b));
        if self.multigraph {
            self.graph.add_edge(na, nb, Eweight::new(attributes));
        }
        else {
            self.graph.update_edge(na, nb, Eweight::new(attributes));
        }
        Ok(())
    } // end of add_edge

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// access to petgraph structure
    pub fn get_graph(&self) -> &Graph<Nweight<Nlabel>, Eweight, Ty> {
        &self.graph
    }
} // end of impl LabeledGraph



impl <Nlabel, Ty> LabeledGraphT for LabeledGraph<Nlabel, Ty>
    where Nlabel : LabelT,
          Ty : EdgeType {
    type Label = Nlabel;

    fn is_directed(&self) -> bool {
        self.graph.is_directed()
    }

    fn is_multigraph(&self) -> bool {
        self.multigraph
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn get_labels(&self, rank : usize) -> &[Nlabel] {
        self.graph[NodeIndex::new(rank)].get_labels()
    }

    fn get_node_attributes(&self, rank : usize) -> &AttrMap {
        self.graph[NodeIndex::new(rank)].get_attributes()
    }

    fn edges(&self) -> Box<dyn Iterator<Item = (usize, usize, &AttrMap)> + '_> {
        Box::new(self.graph.raw_edges().iter().map(|e| (e.source().index(), e.target().index(), e.weight.get_attributes())))
    }
} // end of impl LabeledGraphT for LabeledGraph


//=====================================================================================


// end of mod tests
