//! Resource record definitions for the kube-fzf cache.
//!
//! One record type per resource kind, each a compact normalized view of a
//! cluster object carrying only the fields surfaced in its dump line.

pub mod configmap;
pub mod daemonset;
pub mod deployment;
pub mod meta;
pub mod namespace;
pub mod node;
pub mod pod;
pub mod record;
pub mod service;
pub mod statefulset;

pub use configmap::*;
pub use daemonset::*;
pub use deployment::*;
pub use meta::*;
pub use namespace::*;
pub use node::*;
pub use pod::*;
pub use record::*;
pub use service::*;
pub use statefulset::*;

#[cfg(test)]
mod node_test;
