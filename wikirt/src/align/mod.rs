//! Mapping source ranges onto DOM nodes
//!
//! - [`length`]: how many source characters a span-less text or comment
//!   node consumed
//! - [`encapsulation`]: treating transclusion/extension output as one unit
//! - [`matcher`]: the recursive range-to-node-set alignment

pub mod encapsulation;
pub mod length;
pub mod matcher;

pub use matcher::{find_matching_nodes, MatchResult, MatchState, NodeMatcher};
