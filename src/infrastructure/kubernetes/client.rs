// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::infrastructure::constants::FIELD_MANAGER;
use crate::infrastructure::kubernetes::resources::{ingress_ip, load_balancer_ip};
use crate::shared::error::StackError;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Service};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{DeleteParams, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::runtime::wait::await_condition;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::time::Duration;

/// Hand-off point to the API server, which owns diffing and convergence.
#[async_trait::async_trait]
pub trait StackKubeClient: Send + Sync {
    async fn apply_namespace(&self, namespace: &Namespace) -> Result<(), StackError>;

    async fn apply_deployment(&self, deployment: &Deployment) -> Result<(), StackError>;

    async fn apply_service(&self, service: &Service) -> Result<(), StackError>;

    async fn apply_ingress(&self, ingress: &Ingress) -> Result<(), StackError>;

    /// Current state of the service, without waiting.
    async fn get_service(&self, name: &str) -> Result<Service, StackError>;

    /// Current state of the ingress, without waiting.
    async fn get_ingress(&self, name: &str) -> Result<Ingress, StackError>;

    /// Wait until the service has a load balancer IP.
    async fn wait_for_service_ip(&self, name: &str, timeout: Duration)
        -> Result<String, StackError>;

    /// Wait until the ingress has a load balancer IP.
    async fn wait_for_ingress_ip(&self, name: &str, timeout: Duration)
        -> Result<String, StackError>;

    async fn delete_deployment(&self, name: &str) -> Result<(), StackError>;

    async fn delete_service(&self, name: &str) -> Result<(), StackError>;

    async fn delete_ingress(&self, name: &str) -> Result<(), StackError>;

    async fn delete_namespace(&self, name: &str) -> Result<(), StackError>;
}

pub struct StackKubeClientImpl {
    client: Client,
    namespace: String,
}

impl StackKubeClientImpl {
    pub async fn new_with_config(
        namespace: String,
        kubeconfig_path: Option<String>,
        context: Option<String>,
    ) -> Result<Self, StackError> {
        let kubeconfig = if let Some(path) = kubeconfig_path {
            Kubeconfig::read_from(path)
                .map_err(|e| StackError::KubeError(format!("Failed to load kubeconfig: {}", e)))?
        } else {
            Kubeconfig::read()
                .map_err(|e| StackError::KubeError(format!("Failed to load kubeconfig: {}", e)))?
        };

        Self::from_kubeconfig(namespace, kubeconfig, context).await
    }

    /// Client for a kubeconfig document rendered in memory.
    pub async fn from_kubeconfig_yaml(namespace: String, yaml: &str) -> Result<Self, StackError> {
        let kubeconfig = Kubeconfig::from_yaml(yaml)
            .map_err(|e| StackError::KubeError(format!("Failed to parse kubeconfig: {}", e)))?;

        Self::from_kubeconfig(namespace, kubeconfig, None).await
    }

    async fn from_kubeconfig(
        namespace: String,
        kubeconfig: Kubeconfig,
        context: Option<String>,
    ) -> Result<Self, StackError> {
        let config_options = KubeConfigOptions {
            context,
            cluster: None,
            user: None,
        };

        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &config_options)
            .await
            .map_err(|e| {
                StackError::KubeError(format!("Failed to create Kubernetes config: {}", e))
            })?;

        let client = Client::try_from(config).map_err(|e| {
            StackError::KubeError(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self { client, namespace })
    }

    fn namespaced<K>(&self) -> Api<K>
    where
        K: Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    async fn get_resource<K>(&self, api: Api<K>, kind: &str, name: &str) -> Result<K, StackError>
    where
        K: Resource + Clone + DeserializeOwned + Debug,
    {
        api.get(name).await.map_err(|e| match e {
            kube::Error::Api(ae) if ae.code == 404 => {
                StackError::not_found(kind, name, &self.namespace)
            }
            kube::Error::Api(ae) => StackError::KubeError(ae.message),
            e => StackError::KubeError(e.to_string()),
        })
    }
}

async fn server_side_apply<K>(api: &Api<K>, resource: &K, kind: &str) -> Result<(), StackError>
where
    K: Resource + Clone + DeserializeOwned + Serialize + Debug,
{
    let name = resource
        .meta()
        .name
        .as_ref()
        .ok_or_else(|| StackError::ConfigError(format!("{} name is required", kind)))?;

    let params = PatchParams::apply(FIELD_MANAGER).force();
    api.patch(name, &params, &Patch::Apply(resource)).await?;
    tracing::info!("Applied {} {}", kind, name);
    Ok(())
}

/// Deleting something that is already gone is not an error.
async fn delete_ignoring_missing<K>(api: &Api<K>, kind: &str, name: &str) -> Result<(), StackError>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            tracing::info!("Deleted {} {}", kind, name);
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            tracing::debug!("{} {} already absent", kind, name);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn wait_for_ip<K, F>(
    api: Api<K>,
    kind: &str,
    name: &str,
    timeout: Duration,
    extract: F,
) -> Result<String, StackError>
where
    K: Resource + Clone + DeserializeOwned + Debug + Send + 'static,
    F: Fn(&K) -> Option<String> + Send + Sync + Copy + 'static,
{
    let condition = move |obj: Option<&K>| obj.and_then(extract).is_some();

    let resolved = tokio::time::timeout(timeout, await_condition(api, name, condition))
        .await
        .map_err(|_| {
            StackError::Timeout(format!(
                "{} {} has no load balancer IP after {}s",
                kind,
                name,
                timeout.as_secs()
            ))
        })?
        .map_err(|e| StackError::KubeError(e.to_string()))?;

    resolved
        .as_ref()
        .and_then(extract)
        .ok_or_else(|| StackError::Unresolved(format!("{} {} was deleted", kind, name)))
}

#[async_trait::async_trait]
impl StackKubeClient for StackKubeClientImpl {
    async fn apply_namespace(&self, namespace: &Namespace) -> Result<(), StackError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        server_side_apply(&api, namespace, "Namespace").await
    }

    async fn apply_deployment(&self, deployment: &Deployment) -> Result<(), StackError> {
        server_side_apply(&self.namespaced::<Deployment>(), deployment, "Deployment").await
    }

    async fn apply_service(&self, service: &Service) -> Result<(), StackError> {
        server_side_apply(&self.namespaced::<Service>(), service, "Service").await
    }

    async fn apply_ingress(&self, ingress: &Ingress) -> Result<(), StackError> {
        server_side_apply(&self.namespaced::<Ingress>(), ingress, "Ingress").await
    }

    async fn get_service(&self, name: &str) -> Result<Service, StackError> {
        self.get_resource(self.namespaced(), "Service", name).await
    }

    async fn get_ingress(&self, name: &str) -> Result<Ingress, StackError> {
        self.get_resource(self.namespaced(), "Ingress", name).await
    }

    async fn wait_for_service_ip(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<String, StackError> {
        wait_for_ip(self.namespaced::<Service>(), "Service", name, timeout, load_balancer_ip).await
    }

    async fn wait_for_ingress_ip(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<String, StackError> {
        wait_for_ip(self.namespaced::<Ingress>(), "Ingress", name, timeout, ingress_ip).await
    }

    async fn delete_deployment(&self, name: &str) -> Result<(), StackError> {
        delete_ignoring_missing(&self.namespaced::<Deployment>(), "Deployment", name).await
    }

    async fn delete_service(&self, name: &str) -> Result<(), StackError> {
        delete_ignoring_missing(&self.namespaced::<Service>(), "Service", name).await
    }

    async fn delete_ingress(&self, name: &str) -> Result<(), StackError> {
        delete_ignoring_missing(&self.namespaced::<Ingress>(), "Ingress", name).await
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), StackError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        delete_ignoring_missing(&api, "Namespace", name).await
    }
}
