//! Sentence graph builder
//!
//! Nodes are sentences (one per input sentence, in order); edges carry the
//! similarity between two sentences. Candidate pairs come from an inverted
//! term index, so sentences that share nothing are never compared.

use super::similarity::{distinct_terms, SimilarityMeasure};
use crate::types::Sentence;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Below this many sentences rows are computed sequentially
const PARALLEL_MIN_SENTENCES: usize = 256;

/// A node in the graph builder
#[derive(Debug, Clone)]
pub struct BuilderNode {
    /// Corpus index of the sentence behind this node
    pub sentence_index: usize,
    /// Adjacency list: target node ID -> edge weight
    pub edges: FxHashMap<u32, f64>,
}

impl BuilderNode {
    /// Create a new node
    pub fn new(sentence_index: usize) -> Self {
        Self {
            sentence_index,
            edges: FxHashMap::default(),
        }
    }
}

/// A mutable graph builder optimized for incremental construction
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<BuilderNode>,
}

impl GraphBuilder {
    /// Create a new empty graph builder
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create a graph builder with pre-allocated capacity
    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(node_capacity),
        }
    }

    /// Append a node for a sentence, returning its ID
    pub fn add_node(&mut self, sentence_index: usize) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(BuilderNode::new(sentence_index));
        id
    }

    /// Set the weight of the undirected edge between two nodes
    ///
    /// Self-loops and non-positive weights are ignored.
    pub fn set_edge(&mut self, from: u32, to: u32, weight: f64) {
        if from == to || weight <= 0.0 {
            return;
        }
        if (from as usize) >= self.nodes.len() || (to as usize) >= self.nodes.len() {
            return;
        }

        self.nodes[from as usize].edges.insert(to, weight);
        self.nodes[to as usize].edges.insert(from, weight);
    }

    /// Build the similarity graph for a run of sentences
    pub fn from_sentences(sentences: &[Sentence], measure: SimilarityMeasure) -> Self {
        Self::build(sentences, measure, false)
    }

    fn build(sentences: &[Sentence], measure: SimilarityMeasure, parallel: bool) -> Self {
        let mut builder = Self::with_capacity(sentences.len());
        for sentence in sentences {
            builder.add_node(sentence.index);
        }
        if sentences.len() < 2 {
            return builder;
        }

        let index = TermIndex::new(sentences);
        let rows: Vec<Vec<(u32, f64)>> = if parallel {
            (0..sentences.len())
                .into_par_iter()
                .map(|i| index.row(i, measure))
                .collect()
        } else {
            (0..sentences.len()).map(|i| index.row(i, measure)).collect()
        };

        for (i, row) in rows.into_iter().enumerate() {
            for (j, weight) in row {
                builder.set_edge(i as u32, j, weight);
            }
        }

        builder
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of edges (counting each undirected edge once)
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum::<usize>() / 2
    }

    /// Get a node by ID
    pub fn get_node(&self, id: u32) -> Option<&BuilderNode> {
        self.nodes.get(id as usize)
    }

    /// Iterate over all nodes
    pub fn nodes(&self) -> impl Iterator<Item = (u32, &BuilderNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as u32, n))
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Distinct terms per sentence plus postings lists (ascending node IDs)
struct TermIndex<'a> {
    sets: Vec<Vec<&'a str>>,
    postings: FxHashMap<&'a str, Vec<u32>>,
}

impl<'a> TermIndex<'a> {
    fn new(sentences: &'a [Sentence]) -> Self {
        let sets: Vec<Vec<&'a str>> = sentences
            .iter()
            .map(|s| distinct_terms(s.terms.as_slice()))
            .collect();
        let mut postings: FxHashMap<&'a str, Vec<u32>> = FxHashMap::default();
        for (i, set) in sets.iter().enumerate() {
            for &term in set {
                postings.entry(term).or_default().push(i as u32);
            }
        }
        Self { sets, postings }
    }

    /// Edges from node `i` to every later node sharing at least one term
    fn row(&self, i: usize, measure: SimilarityMeasure) -> Vec<(u32, f64)> {
        let mut overlaps: FxHashMap<u32, usize> = FxHashMap::default();
        for term in &self.sets[i] {
            if let Some(list) = self.postings.get(term) {
                let start = list.partition_point(|&j| j as usize <= i);
                for &j in &list[start..] {
                    *overlaps.entry(j).or_insert(0) += 1;
                }
            }
        }

        let len_i = self.sets[i].len();
        let mut row: Vec<(u32, f64)> = overlaps
            .into_iter()
            .map(|(j, overlap)| (j, measure.score(overlap, len_i, self.sets[j as usize].len())))
            .filter(|&(_, w)| w > 0.0)
            .collect();
        row.sort_by_key(|&(j, _)| j);
        row
    }
}

/// Build the sentence graph in parallel (for large corpora)
///
/// Rows are computed concurrently and merged in node order, so the result is
/// identical to [`GraphBuilder::from_sentences`].
pub fn build_graph_parallel(sentences: &[Sentence], measure: SimilarityMeasure) -> GraphBuilder {
    // For small corpora, sequential is faster
    let parallel = sentences.len() >= PARALLEL_MIN_SENTENCES;
    GraphBuilder::build(sentences, measure, parallel)
}
