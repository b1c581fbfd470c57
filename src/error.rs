use std::io;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("error loading kubeconfig")]
    Kubeconfig(#[source] BoxError),

    #[error("error creating Kubernetes client")]
    Client(#[source] kube::Error),

    #[error("error fetching {resource}")]
    List {
        resource: &'static str,
        #[source]
        source: BoxError,
    },
}

impl ClusterError {
    pub fn list(resource: &'static str, source: impl Into<BoxError>) -> Self {
        Self::List {
            resource,
            source: source.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("terminal error during selection")]
    Terminal(#[from] io::Error),
}

/// Failure of the plugin's follow-on action.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} exited with {status}")]
    Exit {
        command: String,
        status: std::process::ExitStatus,
    },

    #[error("invalid filter pattern")]
    Pattern(#[from] regex::Error),

    #[error("failed to write output")]
    Output(#[from] io::Error),
}
