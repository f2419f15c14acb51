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

use crate::domain::cluster::descriptor::{StackDescriptor, StackNode};
use crate::domain::cluster::exports::StackExports;
use crate::domain::cluster::validator::StackValidator;
use crate::infrastructure::kubernetes::client::{StackKubeClient, StackKubeClientImpl};
use crate::infrastructure::kubernetes::resources::{ingress_ip, load_balancer_ip};
use crate::shared::error::StackError;
use std::time::Duration;

/// Applies a [`StackDescriptor`] through a Kubernetes client.
///
/// The GKE cluster and the ingress controller chart are provisioned by
/// external tools; they are reported and skipped here.
pub struct StackDeployer {
    client: Box<dyn StackKubeClient>,
}

impl StackDeployer {
    pub fn with_client(client: Box<dyn StackKubeClient>) -> Self {
        Self { client }
    }

    pub async fn new_with_config(
        namespace: String,
        kubeconfig_path: Option<String>,
        context: Option<String>,
    ) -> Result<Self, StackError> {
        let client =
            StackKubeClientImpl::new_with_config(namespace, kubeconfig_path, context).await?;
        Ok(Self::with_client(Box::new(client)))
    }

    pub async fn from_kubeconfig_yaml(namespace: String, yaml: &str) -> Result<Self, StackError> {
        let client = StackKubeClientImpl::from_kubeconfig_yaml(namespace, yaml).await?;
        Ok(Self::with_client(Box::new(client)))
    }

    pub async fn deploy(&self, stack: &StackDescriptor) -> Result<(), StackError> {
        StackValidator::validate(stack)?;

        for node in StackDescriptor::apply_order() {
            match node {
                StackNode::Cluster => {
                    tracing::info!(
                        "Cluster {} is provisioned externally, skipping",
                        stack.cluster_name()
                    );
                }
                StackNode::Namespace => {
                    self.client.apply_namespace(&stack.namespace).await?;
                    println!("✓ Namespace applied");
                }
                StackNode::Deployment => {
                    self.client.apply_deployment(&stack.deployment).await?;
                    println!(
                        "✓ Deployment applied (pods selected by {})",
                        stack.labels().selector_string()
                    );
                }
                StackNode::Service => {
                    self.client.apply_service(&stack.service).await?;
                    println!("✓ Service applied");
                }
                StackNode::IngressController => {
                    let chart = &stack.ingress_chart;
                    println!(
                        "ℹ️  Install ingress controller chart {}/{} {} into namespace {} before routing traffic",
                        chart.repo, chart.chart, chart.version, chart.namespace
                    );
                }
                StackNode::Ingress => {
                    self.client.apply_ingress(&stack.ingress).await?;
                    println!("✓ Ingress applied");
                }
            }
        }

        Ok(())
    }

    /// Remove the applied objects in reverse dependency order.
    pub async fn delete(
        &self,
        stack: &StackDescriptor,
        delete_namespace: bool,
    ) -> Result<(), StackError> {
        for node in StackDescriptor::apply_order().into_iter().rev() {
            match node {
                StackNode::Ingress => self.client.delete_ingress(stack.ingress_name()).await?,
                StackNode::Service => self.client.delete_service(stack.service_name()).await?,
                StackNode::Deployment => {
                    self.client
                        .delete_deployment(stack.deployment_name())
                        .await?
                }
                StackNode::Namespace if delete_namespace => {
                    self.client
                        .delete_namespace(stack.namespace_name())
                        .await?
                }
                _ => {}
            }
        }

        println!("✓ Stack {} deleted", stack.cluster_name());
        Ok(())
    }

    /// Exports with load balancer addresses filled in where they appear within `timeout`.
    ///
    /// A zero timeout reads the current status once instead of waiting.
    pub async fn resolve_exports(
        &self,
        stack: &StackDescriptor,
        kubeconfig: Option<String>,
        timeout: Duration,
    ) -> Result<StackExports, StackError> {
        if timeout.is_zero() {
            return self.current_exports(stack, kubeconfig).await;
        }

        let mut exports = StackExports::from_descriptor(stack);
        exports.kubeconfig = kubeconfig;

        let (service_ip, ingress_ip) = futures::future::join(
            self.client.wait_for_service_ip(stack.service_name(), timeout),
            self.client.wait_for_ingress_ip(stack.ingress_name(), timeout),
        )
        .await;

        exports.service_public_ip = resolved_or_pending(service_ip)?;
        exports.ingress_public_ip = resolved_or_pending(ingress_ip)?;
        Ok(exports)
    }

    /// Exports from the live objects as they are now; missing objects or
    /// unassigned addresses leave the value unresolved.
    pub async fn current_exports(
        &self,
        stack: &StackDescriptor,
        kubeconfig: Option<String>,
    ) -> Result<StackExports, StackError> {
        let mut exports = StackExports::from_descriptor(stack);
        exports.kubeconfig = kubeconfig;

        let (service, ingress) = futures::future::join(
            self.client.get_service(stack.service_name()),
            self.client.get_ingress(stack.ingress_name()),
        )
        .await;

        exports.service_public_ip = present_or_missing(service)?
            .as_ref()
            .and_then(load_balancer_ip);
        exports.ingress_public_ip = present_or_missing(ingress)?
            .as_ref()
            .and_then(ingress_ip);
        Ok(exports)
    }
}

/// An object that does not exist yet is not an error for exports.
fn present_or_missing<K>(result: Result<K, StackError>) -> Result<Option<K>, StackError> {
    match result {
        Ok(object) => Ok(Some(object)),
        Err(StackError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// A timeout leaves the address unresolved; any other failure is returned.
fn resolved_or_pending(result: Result<String, StackError>) -> Result<Option<String>, StackError> {
    match result {
        Ok(ip) => Ok(Some(ip)),
        Err(StackError::Timeout(msg)) => {
            tracing::warn!("{}", msg);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
