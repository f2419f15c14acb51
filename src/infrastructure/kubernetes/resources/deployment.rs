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

use crate::domain::config::AppConf;
use crate::infrastructure::constants::{PORT_NAME_HTTP, PROTOCOL_TCP};
use crate::infrastructure::kubernetes::resources::AppLabels;
use crate::shared::error::{Result, StackError};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, ContainerPort, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};

pub struct DeploymentBuilder<'a> {
    name: String,
    namespace: String,
    labels: &'a AppLabels,
    app: AppConf,
}

impl<'a> DeploymentBuilder<'a> {
    pub fn new(name: String, namespace: String, labels: &'a AppLabels, app: AppConf) -> Self {
        Self {
            name,
            namespace,
            labels,
            app,
        }
    }

    pub fn build(&self) -> Result<Deployment> {
        if self.app.image.trim().is_empty() {
            return Err(StackError::InvalidResource(format!(
                "Deployment '{}' has no container image",
                self.name
            )));
        }

        let replicas = i32::try_from(self.app.replicas).map_err(|_| {
            StackError::InvalidResource(format!(
                "Deployment '{}' replicas {} exceeds {}",
                self.name,
                self.app.replicas,
                i32::MAX
            ))
        })?;

        let container = Container {
            name: self.name.clone(),
            image: Some(self.app.image.clone()),
            ports: Some(vec![ContainerPort {
                name: Some(PORT_NAME_HTTP.to_string()),
                container_port: self.app.container_port,
                protocol: Some(PROTOCOL_TCP.to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };

        let deployment = Deployment {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                labels: Some(self.labels.as_map()),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(replicas),
                selector: LabelSelector {
                    match_labels: Some(self.labels.as_map()),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(self.labels.as_map()),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        containers: vec![container],
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        };

        Ok(deployment)
    }
}
