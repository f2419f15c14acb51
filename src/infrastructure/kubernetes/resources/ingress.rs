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

use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::resources::AppLabels;
use crate::shared::error::{Result, StackError};
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Routes every path on the ingress controller to one backend service.
pub struct IngressBuilder<'a> {
    name: String,
    namespace: String,
    labels: &'a AppLabels,
    ingress_class: String,
    service_name: String,
    service_port: i32,
}

impl<'a> IngressBuilder<'a> {
    pub fn new(
        name: String,
        namespace: String,
        labels: &'a AppLabels,
        ingress_class: String,
    ) -> Self {
        Self {
            name,
            namespace,
            labels,
            ingress_class,
            service_name: String::new(),
            service_port: DEFAULT_SERVICE_PORT,
        }
    }

    pub fn with_backend(mut self, service_name: String, service_port: i32) -> Self {
        self.service_name = service_name;
        self.service_port = service_port;
        self
    }

    pub fn build(&self) -> Result<Ingress> {
        if self.service_name.is_empty() {
            return Err(StackError::InvalidResource(format!(
                "Ingress '{}' has no backend service",
                self.name
            )));
        }

        let mut annotations = BTreeMap::new();
        annotations.insert(
            ANNOTATION_INGRESS_CLASS.to_string(),
            self.ingress_class.clone(),
        );

        let path = HTTPIngressPath {
            path: Some(INGRESS_CATCH_ALL_PATH.to_string()),
            path_type: INGRESS_PATH_TYPE_PREFIX.to_string(),
            backend: IngressBackend {
                service: Some(IngressServiceBackend {
                    name: self.service_name.clone(),
                    port: Some(ServiceBackendPort {
                        number: Some(self.service_port),
                        ..Default::default()
                    }),
                }),
                ..Default::default()
            },
        };

        let ingress = Ingress {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                labels: Some(self.labels.as_map()),
                annotations: Some(annotations),
                ..Default::default()
            },
            spec: Some(IngressSpec {
                rules: Some(vec![IngressRule {
                    http: Some(HTTPIngressRuleValue { paths: vec![path] }),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };

        Ok(ingress)
    }
}

/// Backend service name and port of the single catch-all rule.
pub fn ingress_backend(ingress: &Ingress) -> Option<(String, i32)> {
    let rules = ingress.spec.as_ref()?.rules.as_ref()?;
    let path = rules.first()?.http.as_ref()?.paths.first()?;
    let service = path.backend.service.as_ref()?;
    let number = service.port.as_ref()?.number?;
    Some((service.name.clone(), number))
}

/// First load balancer IP reported in the ingress status, if any.
pub fn ingress_ip(ingress: &Ingress) -> Option<String> {
    ingress
        .status
        .as_ref()?
        .load_balancer
        .as_ref()?
        .ingress
        .as_ref()?
        .first()?
        .ip
        .clone()
}
