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

use dreamin_kube::*;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{
    LoadBalancerIngress, LoadBalancerStatus, Namespace, Service, ServiceStatus,
};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod test_utils {
    use super::*;

    pub fn demo_conf() -> StackConf {
        let mut conf = StackConf::default();
        conf.name = "demo".to_string();
        conf.gcp.project = "proj".to_string();
        conf.gcp.zone = "asia-1".to_string();
        conf
    }

    /// Records every call instead of talking to an API server.
    #[derive(Clone, Default)]
    pub struct RecordingClient {
        pub calls: Arc<Mutex<Vec<String>>>,
        pub service_ip: Option<String>,
    }

    impl RecordingClient {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl StackKubeClient for RecordingClient {
        async fn apply_namespace(&self, namespace: &Namespace) -> Result<()> {
            self.record(format!("apply namespace {}", namespace.metadata.name.clone().unwrap()));
            Ok(())
        }

        async fn apply_deployment(&self, deployment: &Deployment) -> Result<()> {
            self.record(format!(
                "apply deployment {}",
                deployment.metadata.name.clone().unwrap()
            ));
            Ok(())
        }

        async fn apply_service(&self, service: &Service) -> Result<()> {
            self.record(format!("apply service {}", service.metadata.name.clone().unwrap()));
            Ok(())
        }

        async fn apply_ingress(&self, ingress: &Ingress) -> Result<()> {
            self.record(format!("apply ingress {}", ingress.metadata.name.clone().unwrap()));
            Ok(())
        }

        async fn get_service(&self, name: &str) -> Result<Service> {
            self.record(format!("get service {}", name));
            let ip = self
                .service_ip
                .clone()
                .ok_or_else(|| StackError::not_found("Service", name, "demo"))?;
            Ok(Service {
                status: Some(ServiceStatus {
                    load_balancer: Some(LoadBalancerStatus {
                        ingress: Some(vec![LoadBalancerIngress {
                            ip: Some(ip),
                            ..Default::default()
                        }]),
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            })
        }

        async fn get_ingress(&self, name: &str) -> Result<Ingress> {
            self.record(format!("get ingress {}", name));
            // created but no address assigned yet
            Ok(Ingress::default())
        }

        async fn wait_for_service_ip(&self, name: &str, _timeout: Duration) -> Result<String> {
            self.service_ip
                .clone()
                .ok_or_else(|| StackError::Timeout(format!("Service {} has no IP", name)))
        }

        async fn wait_for_ingress_ip(&self, name: &str, _timeout: Duration) -> Result<String> {
            Err(StackError::Timeout(format!("Ingress {} has no IP", name)))
        }

        async fn delete_deployment(&self, name: &str) -> Result<()> {
            self.record(format!("delete deployment {}", name));
            Ok(())
        }

        async fn delete_service(&self, name: &str) -> Result<()> {
            self.record(format!("delete service {}", name));
            Ok(())
        }

        async fn delete_ingress(&self, name: &str) -> Result<()> {
            self.record(format!("delete ingress {}", name));
            Ok(())
        }

        async fn delete_namespace(&self, name: &str) -> Result<()> {
            self.record(format!("delete namespace {}", name));
            Ok(())
        }
    }
}

use test_utils::*;

#[test]
fn test_kubeconfig_demo_scenario() {
    let cluster = ClusterEndpoint::new("demo", "1.2.3.4", "QkFTRTY0");
    let yaml = render_kubeconfig("proj", "asia-1", &cluster).unwrap();
    let doc: AuthDocument = serde_yaml::from_str(&yaml).unwrap();

    assert_eq!(doc.current_context, "proj_asia-1_demo");
    assert_eq!(doc.clusters.len(), 1);
    assert_eq!(doc.contexts.len(), 1);
    assert_eq!(doc.users.len(), 1);
    for id in [&doc.clusters[0].name, &doc.contexts[0].name, &doc.users[0].name] {
        assert_eq!(id, "proj_asia-1_demo");
    }
    assert_eq!(doc.clusters[0].cluster.server, "https://1.2.3.4");
    assert_eq!(doc.clusters[0].cluster.certificate_authority_data, "QkFTRTY0");
}

#[test]
fn test_kubeconfig_context_follows_stack_conf() {
    let conf = demo_conf();
    let stack = StackDescriptor::from_conf(&conf).unwrap();
    let cluster = ClusterEndpoint::new(stack.cluster_name(), "10.0.0.1", "Q0E=");

    let doc: AuthDocument = serde_yaml::from_str(
        &render_kubeconfig(stack.project(), stack.zone(), &cluster).unwrap(),
    )
    .unwrap();
    assert_eq!(doc.current_context, conf.context_name("demo"));
}

#[test]
fn test_label_sets_identical() {
    let stack = StackDescriptor::from_conf(&StackConf::default()).unwrap();
    let deployment = stack.deployment.spec.as_ref().unwrap();
    let service = stack.service.spec.as_ref().unwrap();

    let selector = deployment.selector.match_labels.clone().unwrap();
    let template = deployment
        .template
        .metadata
        .as_ref()
        .and_then(|m| m.labels.clone())
        .unwrap();
    let service_selector = service.selector.clone().unwrap();

    assert_eq!(selector, template);
    assert_eq!(selector, service_selector);
    assert_eq!(selector, stack.labels().as_map());
}

#[test]
fn test_ports_line_up() {
    let stack = StackDescriptor::from_conf(&StackConf::default()).unwrap();
    let deployment = stack.deployment.spec.as_ref().unwrap();
    assert_eq!(deployment.replicas, Some(4));

    let container_port = deployment.template.spec.as_ref().unwrap().containers[0]
        .ports
        .as_ref()
        .unwrap()[0]
        .container_port;
    let service_port = &stack.service.spec.as_ref().unwrap().ports.as_ref().unwrap()[0];

    assert_eq!(container_port, 8080);
    assert_eq!(service_port.port, 8080);
    assert_eq!(service_port.target_port, Some(IntOrString::Int(container_port)));
}

#[test]
fn test_overridden_ports_still_validate() {
    let mut conf = StackConf::default();
    conf.app.container_port = 3000;
    conf.service.port = 80;

    let stack = StackDescriptor::from_conf(&conf).unwrap();
    StackValidator::validate(&stack).unwrap();

    let rules = stack.ingress.spec.as_ref().unwrap().rules.as_ref().unwrap();
    let backend = rules[0].http.as_ref().unwrap().paths[0]
        .backend
        .service
        .as_ref()
        .unwrap();
    assert_eq!(backend.port.as_ref().unwrap().number, Some(80));
}

#[tokio::test]
async fn test_deploy_applies_in_dependency_order() {
    let client = RecordingClient::default();
    let deployer = StackDeployer::with_client(Box::new(client.clone()));
    let stack = StackDescriptor::from_conf(&demo_conf()).unwrap();

    deployer.deploy(&stack).await.unwrap();

    assert_eq!(
        client.calls(),
        vec![
            "apply namespace demo",
            "apply deployment demo",
            "apply service demo",
            "apply ingress demo",
        ]
    );
}

#[tokio::test]
async fn test_deploy_refuses_inconsistent_stack() {
    let client = RecordingClient::default();
    let deployer = StackDeployer::with_client(Box::new(client.clone()));
    let mut stack = StackDescriptor::from_conf(&demo_conf()).unwrap();
    stack.service.metadata.namespace = Some("default".to_string());

    let err = deployer.deploy(&stack).await.unwrap_err();
    assert!(matches!(err, StackError::ValidationError(_)));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_delete_reverses_order() {
    let client = RecordingClient::default();
    let deployer = StackDeployer::with_client(Box::new(client.clone()));
    let stack = StackDescriptor::from_conf(&demo_conf()).unwrap();

    deployer.delete(&stack, true).await.unwrap();
    assert_eq!(
        client.calls(),
        vec![
            "delete ingress demo",
            "delete service demo",
            "delete deployment demo",
            "delete namespace demo",
        ]
    );

    let keep_ns = RecordingClient::default();
    StackDeployer::with_client(Box::new(keep_ns.clone()))
        .delete(&stack, false)
        .await
        .unwrap();
    assert_eq!(keep_ns.calls().len(), 3);
}

#[tokio::test]
async fn test_exports_resolve_available_addresses() {
    let client = RecordingClient {
        service_ip: Some("34.1.2.3".to_string()),
        ..Default::default()
    };
    let deployer = StackDeployer::with_client(Box::new(client));
    let stack = StackDescriptor::from_conf(&demo_conf()).unwrap();

    let exports = deployer
        .resolve_exports(&stack, Some("kubeconfig".to_string()), Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(exports.cluster_name, "demo");
    assert_eq!(exports.namespace_name, "demo");
    assert_eq!(exports.deployment_name, "demo");
    assert_eq!(exports.service_name, "demo");
    assert_eq!(exports.service_public_ip.as_deref(), Some("34.1.2.3"));
    assert_eq!(exports.ingress_public_ip, None);
    assert!(!exports.is_fully_resolved());
}

#[tokio::test]
async fn test_zero_timeout_reads_current_status() {
    let client = RecordingClient {
        service_ip: Some("34.1.2.3".to_string()),
        ..Default::default()
    };
    let deployer = StackDeployer::with_client(Box::new(client.clone()));
    let stack = StackDescriptor::from_conf(&demo_conf()).unwrap();

    let exports = deployer
        .resolve_exports(&stack, None, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(exports.service_public_ip.as_deref(), Some("34.1.2.3"));
    assert_eq!(exports.ingress_public_ip, None);

    let mut calls = client.calls();
    calls.sort();
    assert_eq!(calls, vec!["get ingress demo", "get service demo"]);
}

#[tokio::test]
async fn test_current_exports_tolerate_missing_objects() {
    let client = RecordingClient::default();
    let deployer = StackDeployer::with_client(Box::new(client));
    let stack = StackDescriptor::from_conf(&demo_conf()).unwrap();

    let exports = deployer
        .current_exports(&stack, Some("kubeconfig".to_string()))
        .await
        .unwrap();

    assert_eq!(exports.kubeconfig.as_deref(), Some("kubeconfig"));
    assert_eq!(exports.service_public_ip, None);
    assert_eq!(exports.ingress_public_ip, None);
}

#[tokio::test]
#[ignore] // Requires Kubernetes cluster
async fn test_apply_against_cluster() {
    let deployer = StackDeployer::new_with_config("dreamin-k8s".to_string(), None, None)
        .await
        .expect("Failed to connect");
    let stack = StackDescriptor::from_conf(&StackConf::default()).unwrap();
    deployer.deploy(&stack).await.unwrap();
}
