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

use crate::domain::config::ServiceConf;
use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::resources::AppLabels;
use crate::shared::error::Result;
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

pub struct ServiceBuilder<'a> {
    name: String,
    namespace: String,
    labels: &'a AppLabels,
    service_config: ServiceConf,
    target_port: i32,
}

impl<'a> ServiceBuilder<'a> {
    pub fn new(
        name: String,
        namespace: String,
        labels: &'a AppLabels,
        service_config: ServiceConf,
        target_port: i32,
    ) -> Self {
        Self {
            name,
            namespace,
            labels,
            service_config,
            target_port,
        }
    }

    pub fn build(&self) -> Result<Service> {
        let annotations = if self.service_config.neg_ingress {
            let mut annotations = BTreeMap::new();
            annotations.insert(
                ANNOTATION_GKE_NEG.to_string(),
                GKE_NEG_INGRESS_ENABLED.to_string(),
            );
            Some(annotations)
        } else {
            None
        };

        let service = Service {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                labels: Some(self.labels.as_map()),
                annotations,
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                type_: Some(SERVICE_TYPE_LOAD_BALANCER.to_string()),
                ports: Some(vec![self.create_service_port()]),
                publish_not_ready_addresses: Some(
                    self.service_config.publish_not_ready_addresses,
                ),
                selector: Some(self.labels.as_map()),
                ..Default::default()
            }),
            ..Default::default()
        };

        Ok(service)
    }

    fn create_service_port(&self) -> ServicePort {
        ServicePort {
            name: Some(PORT_NAME_HTTP.to_string()),
            port: self.service_config.port,
            target_port: Some(IntOrString::Int(self.target_port)),
            protocol: Some(PROTOCOL_TCP.to_string()),
            ..Default::default()
        }
    }
}

/// First load balancer IP reported in the service status, if any.
pub fn load_balancer_ip(service: &Service) -> Option<String> {
    service
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

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{LoadBalancerIngress, LoadBalancerStatus, ServiceStatus};

    fn build(config: ServiceConf) -> Service {
        let labels = AppLabels::new("dreamin-k8s");
        ServiceBuilder::new(
            "dreamin-k8s".to_string(),
            "dreamin-k8s".to_string(),
            &labels,
            config,
            8080,
        )
        .build()
        .unwrap()
    }

    #[test]
    fn test_service_is_load_balancer() {
        let service = build(ServiceConf::default());
        let spec = service.spec.unwrap();
        assert_eq!(spec.type_.as_deref(), Some("LoadBalancer"));
        assert_eq!(spec.publish_not_ready_addresses, Some(true));

        let port = &spec.ports.unwrap()[0];
        assert_eq!(port.port, 8080);
        assert_eq!(port.protocol.as_deref(), Some("TCP"));
        assert_eq!(port.target_port, Some(IntOrString::Int(8080)));
    }

    #[test]
    fn test_neg_annotation() {
        let service = build(ServiceConf::default());
        let annotations = service.metadata.annotations.unwrap();
        assert_eq!(
            annotations.get("cloud.google.com/neg").map(String::as_str),
            Some(r#"{"ingress": true}"#)
        );

        let without = build(ServiceConf {
            neg_ingress: false,
            ..ServiceConf::default()
        });
        assert!(without.metadata.annotations.is_none());
    }

    #[test]
    fn test_load_balancer_ip() {
        let mut service = build(ServiceConf::default());
        assert_eq!(load_balancer_ip(&service), None);

        service.status = Some(ServiceStatus {
            load_balancer: Some(LoadBalancerStatus {
                ingress: Some(vec![LoadBalancerIngress {
                    ip: Some("34.1.2.3".to_string()),
                    ..Default::default()
                }]),
            }),
            ..Default::default()
        });
        assert_eq!(load_balancer_ip(&service).as_deref(), Some("34.1.2.3"));
    }
}
