//! Cache-builder error types.
//!
//! This module defines the error taxonomy of the daemon. Startup errors are
//! fatal and surface through the supervisor; stream and dump-write errors
//! are handled locally by the loops and never reach this far.

use kube::config::KubeconfigError;
use thiserror::Error;

/// Errors that can occur in the cache builder.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Kubeconfig could not be read or interpreted
    #[error("kubeconfig error: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    /// Dump file I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Kubeconfig does not select a context
    #[error("kubeconfig has no current context")]
    NoCurrentContext,

    /// Selected context is missing from the kubeconfig
    #[error("context not found in kubeconfig: {0}")]
    ContextNotFound(String),
}
