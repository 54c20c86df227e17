//! Topic modeling algorithms
//!
//! This module provides an implementation of
//! LDA (Latent Dirichlet Allocation) with deterministic document assignment.

pub mod lda;

pub use lda::{dominant_topic, LdaConfig, LdaError, LdaTopic, TrainedLda, LDA};
