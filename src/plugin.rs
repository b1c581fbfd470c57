//! Shared entry point: parse flags, connect, run the pipeline, hand the pick
//! to the plugin's action.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use kube::ResourceExt;
use tracing::debug;

use crate::cli;
use crate::config::PluginConfig;
use crate::error::{ActionError, ClusterError, PipelineError};
use crate::k8s::{ClusterClient, KubeGateway};
use crate::logging::init_tracing;
use crate::pipeline::{Candidate, EmptySource, Selection, SelectionPipeline, Stage};
use crate::selector::SelectorTerminal;
use crate::terminal::CrosstermTerminal;

/// One kubectl plugin: which resources it offers and what it does with the pick.
#[allow(async_fn_in_trait)]
pub trait Plugin: Sized {
    type Args: clap::Args + std::fmt::Debug + Clone;
    type Resource: kube::Resource;

    /// Subcommand name as typed after `kubectl`.
    const NAME: &'static str;
    const ABOUT: &'static str;
    /// Resource noun for the prompt, e.g. "ConfigMap".
    const NOUN: &'static str;
    /// Plural used when a namespace has none, e.g. "ConfigMaps".
    const PLURAL: &'static str;

    /// Validates flags before the cluster is contacted.
    fn new(args: Self::Args, config: &PluginConfig) -> Result<Self, ActionError>;

    async fn list<C: ClusterClient>(
        cluster: &C,
        namespace: &str,
    ) -> Result<Vec<Self::Resource>, ClusterError>;

    async fn act(&self, namespace: &str, resource: Self::Resource) -> Result<(), ActionError>;

    /// Printed once the flags are accepted, before the cluster is contacted.
    fn announce(&self, _out: &mut impl Write) -> io::Result<()> {
        Ok(())
    }

    fn resource_prompt() -> String {
        format!("Select {} > ", Self::NOUN)
    }
}

/// What to tell the operator when the pipeline ends without a pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Aborted(String),
}

pub fn notice<P: Plugin, R>(selection: &Selection<R>) -> Option<Notice> {
    match selection {
        Selection::Selected { .. } => None,
        Selection::Cancelled(Stage::Namespace) => {
            Some(Notice::Aborted("Namespace selection aborted".to_string()))
        }
        Selection::Cancelled(Stage::Resource) => {
            Some(Notice::Aborted(format!("{} selection aborted", P::NOUN)))
        }
        Selection::Empty(EmptySource::Namespaces) => {
            Some(Notice::Info("No namespaces found".to_string()))
        }
        Selection::Empty(EmptySource::Resources { namespace }) => Some(Notice::Info(format!(
            "No {} found in namespace: {namespace}",
            P::PLURAL
        ))),
    }
}

/// Runs both selection stages for `P` against `cluster`.
pub async fn pick<P, C, T>(
    cluster: &C,
    terminal: T,
) -> Result<Selection<P::Resource>, PipelineError>
where
    P: Plugin,
    C: ClusterClient,
    T: SelectorTerminal,
{
    let mut pipeline = SelectionPipeline::new(terminal, P::resource_prompt());
    pipeline
        .select_namespace_and_resource(
            || cluster.list_namespaces(),
            |namespace| async move {
                let items = P::list(cluster, &namespace).await?;
                Ok::<_, ClusterError>(
                    items
                        .into_iter()
                        .map(|item| Candidate::new(item.name_any(), item))
                        .collect(),
                )
            },
        )
        .await
}

pub async fn main<P: Plugin>() -> ExitCode {
    match run::<P>(std::env::args_os().collect()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn run<P: Plugin>(argv: Vec<OsString>) -> Result<()> {
    let args = match cli::parse::<P>(argv) {
        Ok(Some(args)) => args,
        Ok(None) => return Ok(()),
        Err(error) => error.exit(),
    };
    init_tracing(&args.common.log_filter)?;

    let config = PluginConfig::discover()?;
    if let Some(source) = &config.source {
        debug!(config = %source.display(), "loaded config");
    }
    let plugin = P::new(args.plugin, &config).context("invalid arguments")?;
    plugin
        .announce(&mut io::stdout().lock())
        .context("failed to write output")?;

    let context = args.common.context.or_else(|| config.context.clone());
    let gateway = KubeGateway::connect(context).await?;
    debug!(context = gateway.context(), plugin = P::NAME, "starting selection");

    let mut terminal = CrosstermTerminal::new();
    let pick_result = pick::<P, _, _>(&gateway, &mut terminal).await;
    let restore_result = terminal.restore();

    let selection = match (pick_result, restore_result) {
        (Err(pick_error), Err(restore_error)) => {
            return Err(anyhow::anyhow!(
                "{:#}\nterminal restore error: {restore_error:#}",
                anyhow::Error::from(pick_error)
            ));
        }
        (Err(error), _) => return Err(error.into()),
        (_, Err(error)) => return Err(error),
        (Ok(selection), Ok(())) => selection,
    };

    if let Some(notice) = notice::<P, _>(&selection) {
        match notice {
            Notice::Info(message) => println!("{message}"),
            Notice::Aborted(message) => eprintln!("{message}"),
        }
        return Ok(());
    }

    if let Selection::Selected {
        namespace,
        resource,
    } = selection
    {
        debug!(%namespace, resource = %resource.name_any(), "selected");
        plugin
            .act(&namespace, resource)
            .await
            .with_context(|| format!("{} failed", P::NAME))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Notice, notice, pick};
    use crate::k8s::tests::{FakeCluster, named};
    use crate::pipeline::{EmptySource, Selection, Stage};
    use crate::plugins::{CatConfigMap, CatSecret, PodExec};
    use crate::selector::tests::ScriptedTerminal;
    use crossterm::event::KeyCode;
    use k8s_openapi::api::core::v1::{ConfigMap, Pod};
    use kube::ResourceExt;

    #[tokio::test]
    async fn configmap_pick_lists_only_the_chosen_namespace() {
        let mut cluster = FakeCluster::with_namespaces(&["default", "payments"]);
        cluster.config_maps.insert(
            "payments".to_string(),
            vec![named::<ConfigMap>("kube-root-ca.crt"), named::<ConfigMap>("billing-env")],
        );

        let mut terminal = ScriptedTerminal::typing("pay");
        terminal.push(KeyCode::Enter);
        terminal.push_str("env").push(KeyCode::Enter);

        let selection = pick::<CatConfigMap, _, _>(&cluster, &mut terminal)
            .await
            .expect("pick");
        match selection {
            Selection::Selected {
                namespace,
                resource,
            } => {
                assert_eq!(namespace, "payments");
                assert_eq!(resource.name_any(), "billing-env");
            }
            other => panic!("expected a selection, got {other:?}"),
        }
        assert_eq!(
            cluster.calls.borrow().as_slice(),
            ["namespaces".to_string(), "configmaps/payments".to_string()]
        );
    }

    #[tokio::test]
    async fn empty_pod_namespace_yields_informational_notice() {
        let cluster = FakeCluster::with_namespaces(&["dev"]);
        let mut terminal = ScriptedTerminal::default();
        terminal.push(KeyCode::Enter);

        let selection = pick::<PodExec, _, _>(&cluster, &mut terminal)
            .await
            .expect("pick");
        assert_eq!(
            selection,
            Selection::Empty(EmptySource::Resources {
                namespace: "dev".to_string()
            })
        );
        assert_eq!(
            notice::<PodExec, _>(&selection),
            Some(Notice::Info("No pods found in namespace: dev".to_string()))
        );
    }

    #[tokio::test]
    async fn namespace_failure_is_fatal_and_stops_listing() {
        let mut cluster = FakeCluster::with_namespaces(&["dev"]);
        cluster.fail_namespaces = true;
        cluster
            .pods
            .insert("dev".to_string(), vec![named::<Pod>("web-0")]);

        let error = pick::<PodExec, _, _>(&cluster, ScriptedTerminal::default())
            .await
            .expect_err("listing fails");
        assert_eq!(error.to_string(), "error fetching namespaces");
        assert_eq!(cluster.calls.borrow().len(), 1);
    }

    #[test]
    fn cancel_notices_name_the_stage() {
        assert_eq!(
            notice::<CatSecret, ()>(&Selection::Cancelled(Stage::Namespace)),
            Some(Notice::Aborted("Namespace selection aborted".to_string()))
        );
        assert_eq!(
            notice::<CatSecret, ()>(&Selection::Cancelled(Stage::Resource)),
            Some(Notice::Aborted("secret selection aborted".to_string()))
        );
        assert_eq!(
            notice::<CatSecret, ()>(&Selection::Empty(EmptySource::Namespaces)),
            Some(Notice::Info("No namespaces found".to_string()))
        );
    }

    #[test]
    fn prompts_follow_the_resource_noun() {
        use super::Plugin;
        assert_eq!(CatConfigMap::resource_prompt(), "Select ConfigMap > ");
        assert_eq!(PodExec::resource_prompt(), "Select pod > ");
    }
}
