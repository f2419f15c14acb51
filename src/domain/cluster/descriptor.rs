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

use crate::domain::config::StackConf;
use crate::infrastructure::gke::GkeClusterSpec;
use crate::infrastructure::kubernetes::resources::{
    AppLabels, DeploymentBuilder, IngressBuilder, IngressChart, NamespaceBuilder, ServiceBuilder,
};
use crate::shared::error::Result;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Service};
use k8s_openapi::api::networking::v1::Ingress;
use serde::Serialize;
use std::fmt;

/// A node in the stack's dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StackNode {
    Cluster,
    Namespace,
    Deployment,
    Service,
    IngressController,
    Ingress,
}

impl StackNode {
    pub const ALL: [StackNode; 6] = [
        StackNode::Cluster,
        StackNode::Namespace,
        StackNode::Deployment,
        StackNode::Service,
        StackNode::IngressController,
        StackNode::Ingress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StackNode::Cluster => "cluster",
            StackNode::Namespace => "namespace",
            StackNode::Deployment => "deployment",
            StackNode::Service => "service",
            StackNode::IngressController => "ingress-controller",
            StackNode::Ingress => "ingress",
        }
    }
}

impl fmt::Display for StackNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every descriptor of the stack, cross-referenced and ready to hand to the
/// provisioner and the API server.
#[derive(Debug, Clone)]
pub struct StackDescriptor {
    pub cluster: GkeClusterSpec,
    pub namespace: Namespace,
    pub deployment: Deployment,
    pub service: Service,
    pub ingress_chart: IngressChart,
    pub ingress: Ingress,
    labels: AppLabels,
    project: String,
    zone: String,
}

impl StackDescriptor {
    pub fn from_conf(conf: &StackConf) -> Result<Self> {
        let labels = AppLabels::new(conf.name.clone());
        let cluster = GkeClusterSpec::from_conf(conf);

        let namespace = NamespaceBuilder::new(conf.name.clone()).build();
        let namespace_name = namespace.metadata.name.clone().unwrap_or_default();

        let deployment = DeploymentBuilder::new(
            conf.name.clone(),
            namespace_name.clone(),
            &labels,
            conf.app.clone(),
        )
        .build()?;

        let service = ServiceBuilder::new(
            conf.name.clone(),
            namespace_name.clone(),
            &labels,
            conf.service.clone(),
            conf.app.container_port,
        )
        .build()?;
        let service_name = service.metadata.name.clone().unwrap_or_default();

        let ingress_chart = IngressChart::new(&conf.ingress, namespace_name.clone());

        let ingress = IngressBuilder::new(
            conf.name.clone(),
            namespace_name,
            &labels,
            conf.ingress.class.clone(),
        )
        .with_backend(service_name, conf.service.port)
        .build()?;

        tracing::debug!("Built stack descriptors for {}", conf.name);

        Ok(Self {
            cluster,
            namespace,
            deployment,
            service,
            ingress_chart,
            ingress,
            labels,
            project: conf.gcp.project.clone(),
            zone: conf.gcp.zone.clone(),
        })
    }

    pub fn labels(&self) -> &AppLabels {
        &self.labels
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster.name
    }

    pub fn namespace_name(&self) -> &str {
        self.namespace.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn deployment_name(&self) -> &str {
        self.deployment.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn service_name(&self) -> &str {
        self.service.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn ingress_name(&self) -> &str {
        self.ingress.metadata.name.as_deref().unwrap_or_default()
    }

    /// Edges as `(dependency, dependent)`.
    pub fn dependency_graph() -> Vec<(StackNode, StackNode)> {
        vec![
            (StackNode::Cluster, StackNode::Namespace),
            (StackNode::Namespace, StackNode::Deployment),
            (StackNode::Namespace, StackNode::Service),
            (StackNode::Namespace, StackNode::IngressController),
            (StackNode::Service, StackNode::Ingress),
            (StackNode::IngressController, StackNode::Ingress),
        ]
    }

    /// Topological order of [`Self::dependency_graph`]; ties go to the
    /// earlier node in [`StackNode::ALL`].
    pub fn apply_order() -> Vec<StackNode> {
        let edges = Self::dependency_graph();
        let mut remaining: Vec<StackNode> = StackNode::ALL.to_vec();
        let mut order = Vec::with_capacity(remaining.len());

        loop {
            let ready = remaining.iter().position(|node| {
                edges
                    .iter()
                    .filter(|(_, dependent)| dependent == node)
                    .all(|(dependency, _)| order.contains(dependency))
            });

            match ready {
                Some(pos) => order.push(remaining.remove(pos)),
                None => break,
            }
        }

        order
    }

    /// Render every descriptor as one multi-document YAML stream, in apply order.
    pub fn to_yaml(&self) -> Result<String> {
        let mut documents = Vec::new();

        for node in Self::apply_order() {
            let document = match node {
                StackNode::Cluster => serde_yaml::to_string(&self.cluster)?,
                StackNode::Namespace => serde_yaml::to_string(&self.namespace)?,
                StackNode::Deployment => serde_yaml::to_string(&self.deployment)?,
                StackNode::Service => serde_yaml::to_string(&self.service)?,
                StackNode::IngressController => serde_yaml::to_string(&self.ingress_chart)?,
                StackNode::Ingress => serde_yaml::to_string(&self.ingress)?,
            };
            documents.push(format!("# {}\n{}", node, document));
        }

        Ok(documents.join("---\n"))
    }

    /// Same content as [`Self::to_yaml`], keyed by node name.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();

        for node in Self::apply_order() {
            let value = match node {
                StackNode::Cluster => serde_json::to_value(&self.cluster)?,
                StackNode::Namespace => serde_json::to_value(&self.namespace)?,
                StackNode::Deployment => serde_json::to_value(&self.deployment)?,
                StackNode::Service => serde_json::to_value(&self.service)?,
                StackNode::IngressController => serde_json::to_value(&self.ingress_chart)?,
                StackNode::Ingress => serde_json::to_value(&self.ingress)?,
            };
            map.insert(node.as_str().to_string(), value);
        }

        Ok(serde_json::Value::Object(map))
    }
}
