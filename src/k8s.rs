use std::fmt::Debug;
use std::io;

use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod, Secret};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::{Api, Client, Config, ResourceExt};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClusterError;

const PAGE_SIZE: u32 = 500;

/// Read side of the cluster the plugins browse.
#[allow(async_fn_in_trait)]
pub trait ClusterClient {
    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError>;

    async fn list_config_maps(&self, namespace: &str) -> Result<Vec<ConfigMap>, ClusterError>;

    async fn list_secrets(&self, namespace: &str) -> Result<Vec<Secret>, ClusterError>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ClusterError>;
}

#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
    context: String,
}

impl KubeGateway {
    /// Connects using the default kubeconfig, optionally pinned to `context`.
    /// Without any kubeconfig the in-cluster environment is tried instead.
    pub async fn connect(context: Option<String>) -> Result<Self, ClusterError> {
        let kubeconfig = existing_kubeconfig(Kubeconfig::read())?;

        let config = if let Some(kubeconfig_value) = kubeconfig.clone() {
            let options = KubeConfigOptions {
                context: context.clone(),
                cluster: None,
                user: None,
            };
            Config::from_custom_kubeconfig(kubeconfig_value, &options)
                .await
                .map_err(|error| ClusterError::Kubeconfig(error.into()))?
        } else {
            if let Some(context) = &context {
                return Err(ClusterError::Kubeconfig(
                    format!("kubeconfig not found; cannot select context '{context}'").into(),
                ));
            }
            Config::infer()
                .await
                .map_err(|error| ClusterError::Kubeconfig(error.into()))?
        };

        let client = Client::try_from(config).map_err(ClusterError::Client)?;
        let active_context = context
            .or_else(|| kubeconfig.and_then(|cfg| cfg.current_context))
            .unwrap_or_else(|| "in-cluster".to_string());
        debug!(context = %active_context, "connected to cluster");

        Ok(Self {
            client,
            context: active_context,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    async fn list_all<K>(&self, api: Api<K>, resource: &'static str) -> Result<Vec<K>, ClusterError>
    where
        K: Clone + DeserializeOwned + Debug,
    {
        let mut items = Vec::new();
        let mut params = ListParams::default().limit(PAGE_SIZE);

        loop {
            let page = api
                .list(&params)
                .await
                .map_err(|error| ClusterError::list(resource, error))?;
            items.extend(page.items);

            match page.metadata.continue_ {
                Some(token) if !token.is_empty() => params = params.continue_token(&token),
                _ => break,
            }
        }

        debug!(resource, count = items.len(), "listed");
        Ok(items)
    }
}

/// A missing kubeconfig is `None`; one that exists but cannot be read or
/// parsed is an error.
fn existing_kubeconfig(
    read: Result<Kubeconfig, KubeconfigError>,
) -> Result<Option<Kubeconfig>, ClusterError> {
    match read {
        Ok(kubeconfig) => Ok(Some(kubeconfig)),
        Err(KubeconfigError::FindPath) => Ok(None),
        Err(KubeconfigError::ReadConfig(source, _)) if source.kind() == io::ErrorKind::NotFound => {
            Ok(None)
        }
        Err(error) => Err(ClusterError::Kubeconfig(error.into())),
    }
}

impl ClusterClient for KubeGateway {
    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let items = self.list_all(namespaces, "namespaces").await?;
        Ok(items.iter().map(|namespace| namespace.name_any()).collect())
    }

    async fn list_config_maps(&self, namespace: &str) -> Result<Vec<ConfigMap>, ClusterError> {
        let configmaps: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        self.list_all(configmaps, "ConfigMaps").await
    }

    async fn list_secrets(&self, namespace: &str) -> Result<Vec<Secret>, ClusterError> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        self.list_all(secrets, "secrets").await
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ClusterError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        self.list_all(pods, "pods").await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{ClusterClient, existing_kubeconfig};
    use kube::config::{KubeconfigError, Kubeconfig};
    use std::path::PathBuf;
    use crate::error::ClusterError;
    use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret};
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::io;

    /// In-memory cluster that records every listing call.
    #[derive(Debug, Default)]
    pub(crate) struct FakeCluster {
        pub namespaces: Vec<String>,
        pub config_maps: BTreeMap<String, Vec<ConfigMap>>,
        pub secrets: BTreeMap<String, Vec<Secret>>,
        pub pods: BTreeMap<String, Vec<Pod>>,
        pub fail_namespaces: bool,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeCluster {
        pub fn with_namespaces(namespaces: &[&str]) -> Self {
            Self {
                namespaces: namespaces.iter().map(|ns| ns.to_string()).collect(),
                ..Self::default()
            }
        }

        fn record(&self, call: String) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl ClusterClient for FakeCluster {
        async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError> {
            self.record("namespaces".to_string());
            if self.fail_namespaces {
                return Err(ClusterError::list(
                    "namespaces",
                    io::Error::new(io::ErrorKind::PermissionDenied, "forbidden"),
                ));
            }
            Ok(self.namespaces.clone())
        }

        async fn list_config_maps(&self, namespace: &str) -> Result<Vec<ConfigMap>, ClusterError> {
            self.record(format!("configmaps/{namespace}"));
            Ok(self.config_maps.get(namespace).cloned().unwrap_or_default())
        }

        async fn list_secrets(&self, namespace: &str) -> Result<Vec<Secret>, ClusterError> {
            self.record(format!("secrets/{namespace}"));
            Ok(self.secrets.get(namespace).cloned().unwrap_or_default())
        }

        async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ClusterError> {
            self.record(format!("pods/{namespace}"));
            Ok(self.pods.get(namespace).cloned().unwrap_or_default())
        }
    }

    pub(crate) fn named<K: kube::Resource + Default>(name: &str) -> K {
        let mut object = K::default();
        object.meta_mut().name = Some(name.to_string());
        object
    }

    #[tokio::test]
    async fn fake_cluster_reports_missing_namespace_as_empty() {
        let cluster = FakeCluster::with_namespaces(&["dev"]);
        let pods = cluster.list_pods("dev").await.expect("listing");
        assert!(pods.is_empty());
        assert_eq!(cluster.calls.borrow().as_slice(), ["pods/dev".to_string()]);
    }

    #[test]
    fn absent_kubeconfig_falls_through_to_in_cluster() {
        assert!(matches!(existing_kubeconfig(Err(KubeconfigError::FindPath)), Ok(None)));

        let missing = KubeconfigError::ReadConfig(
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
            PathBuf::from("/home/op/.kube/config"),
        );
        assert!(matches!(existing_kubeconfig(Err(missing)), Ok(None)));
    }

    #[test]
    fn unreadable_or_malformed_kubeconfig_is_reported() {
        let denied = KubeconfigError::ReadConfig(
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            PathBuf::from("/home/op/.kube/config"),
        );
        let error = existing_kubeconfig(Err(denied)).expect_err("read failure surfaces");
        assert_eq!(error.to_string(), "error loading kubeconfig");

        let malformed = Kubeconfig::from_yaml("clusters: [").map(|_| ());
        let parse_error = malformed.expect_err("yaml is truncated");
        let error = existing_kubeconfig(Err(parse_error)).expect_err("parse failure surfaces");
        assert!(matches!(error, ClusterError::Kubeconfig(_)));
    }

    #[test]
    fn list_errors_name_the_resource() {
        let error = ClusterError::list("pods", io::Error::other("connection refused"));
        assert_eq!(error.to_string(), "error fetching pods");
        let source = std::error::Error::source(&error).expect("source kept");
        assert_eq!(source.to_string(), "connection refused");
    }
}
