//! Summarization components
//!
//! Extractive summaries come from TextRank over the sentence similarity graph
//! followed by redundancy-aware top-K selection. Cluster reports reuse the
//! same ranking on each cluster's sentences and add distinguishing keywords.

pub mod cluster;
pub mod keywords;
pub mod ranker;
pub mod selector;
