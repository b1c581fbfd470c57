//! Namespace-then-resource selection shared by every plugin.

use tracing::debug;

use crate::error::{ClusterError, PipelineError};
use crate::selector::{SelectionOutcome, SelectorTerminal, select};

pub const NAMESPACE_PROMPT: &str = "Select namespace > ";

/// A selectable item: the text the operator filters on plus what it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<T> {
    pub label: String,
    pub payload: T,
}

impl<T> Candidate<T> {
    pub fn new(label: impl Into<String>, payload: T) -> Self {
        Self {
            label: label.into(),
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Namespace,
    Resource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptySource {
    Namespaces,
    Resources { namespace: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<R> {
    Selected { namespace: String, resource: R },
    Cancelled(Stage),
    Empty(EmptySource),
}

pub struct SelectionPipeline<T> {
    terminal: T,
    resource_prompt: String,
}

impl<T: SelectorTerminal> SelectionPipeline<T> {
    pub fn new(terminal: T, resource_prompt: impl Into<String>) -> Self {
        Self {
            terminal,
            resource_prompt: resource_prompt.into(),
        }
    }

    pub fn into_terminal(self) -> T {
        self.terminal
    }

    /// Runs both stages. Listing calls are issued fresh on every run and the
    /// resource listing only happens after a namespace was confirmed.
    pub async fn select_namespace_and_resource<R, N, NFut, L, LFut>(
        &mut self,
        list_namespaces: N,
        list_resources: L,
    ) -> Result<Selection<R>, PipelineError>
    where
        N: FnOnce() -> NFut,
        NFut: Future<Output = Result<Vec<String>, ClusterError>>,
        L: FnOnce(String) -> LFut,
        LFut: Future<Output = Result<Vec<Candidate<R>>, ClusterError>>,
    {
        let namespaces = list_namespaces().await?;
        debug!(count = namespaces.len(), "namespaces listed");
        if namespaces.is_empty() {
            return Ok(Selection::Empty(EmptySource::Namespaces));
        }

        let namespace = match select(&mut self.terminal, NAMESPACE_PROMPT, &namespaces)? {
            SelectionOutcome::Selected(index) => namespaces.into_iter().nth(index),
            SelectionOutcome::Cancelled => return Ok(Selection::Cancelled(Stage::Namespace)),
            SelectionOutcome::EmptySource => {
                return Ok(Selection::Empty(EmptySource::Namespaces));
            }
        };
        let Some(namespace) = namespace else {
            return Ok(Selection::Empty(EmptySource::Namespaces));
        };

        let candidates = list_resources(namespace.clone()).await?;
        debug!(%namespace, count = candidates.len(), "resources listed");
        let labels = candidates
            .iter()
            .map(|candidate| candidate.label.clone())
            .collect::<Vec<_>>();

        match select(&mut self.terminal, &self.resource_prompt, &labels)? {
            SelectionOutcome::Selected(index) => match candidates.into_iter().nth(index) {
                Some(candidate) => Ok(Selection::Selected {
                    namespace,
                    resource: candidate.payload,
                }),
                None => Ok(Selection::Empty(EmptySource::Resources { namespace })),
            },
            SelectionOutcome::Cancelled => Ok(Selection::Cancelled(Stage::Resource)),
            SelectionOutcome::EmptySource => {
                Ok(Selection::Empty(EmptySource::Resources { namespace }))
            }
        }
    }
}
