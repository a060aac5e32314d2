//! Dimensionality reduction ahead of clustering

pub mod pca;

pub use pca::Pca;
