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

//! Consistency checks run before anything is rendered or applied.
//!
//! The API server would accept most of these mistakes and the stack would
//! simply not route traffic, so they are rejected here instead.

use crate::domain::cluster::descriptor::StackDescriptor;
use crate::domain::config::StackConf;
use crate::infrastructure::kubernetes::resources::ingress_backend;
use crate::shared::error::{Result, StackError};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use regex::Regex;
use std::collections::BTreeMap;

const DNS_LABEL_PATTERN: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$";
const DNS_LABEL_MAX_LEN: usize = 63;

pub struct StackValidator;

impl StackValidator {
    pub fn validate_conf(conf: &StackConf) -> Result<()> {
        validate_dns_label("stack name", &conf.name)?;

        for (field, value) in [
            ("gcp.project", &conf.gcp.project),
            ("gcp.zone", &conf.gcp.zone),
            ("gcp.region", &conf.gcp.region),
        ] {
            if value.trim().is_empty() {
                return Err(StackError::config_error(format!("{} must be set", field)));
            }
        }

        if conf.app.replicas == 0 || i32::try_from(conf.app.replicas).is_err() {
            return Err(StackError::validation_error(format!(
                "app.replicas must be in 1..={}, got {}",
                i32::MAX,
                conf.app.replicas
            )));
        }

        if conf.cluster.initial_node_count == 0 {
            return Err(StackError::validation_error(
                "cluster.initial_node_count must be > 0",
            ));
        }

        validate_port("app.container_port", conf.app.container_port)?;
        validate_port("service.port", conf.service.port)?;

        let autoscaling = &conf.cluster.autoscaling;
        validate_range("cpu", autoscaling.cpu_min, autoscaling.cpu_max)?;
        validate_range("memory", autoscaling.memory_min, autoscaling.memory_max)?;

        Ok(())
    }

    /// Check the cross-references between the emitted descriptors.
    pub fn validate(stack: &StackDescriptor) -> Result<()> {
        let expected = stack.labels().as_map();
        let namespace = stack.namespace_name();

        let deployment_spec = stack
            .deployment
            .spec
            .as_ref()
            .ok_or_else(|| StackError::InvalidResource("Deployment has no spec".to_string()))?;
        let service_spec = stack
            .service
            .spec
            .as_ref()
            .ok_or_else(|| StackError::InvalidResource("Service has no spec".to_string()))?;

        let template_labels = deployment_spec
            .template
            .metadata
            .as_ref()
            .and_then(|m| m.labels.as_ref());

        check_labels(
            "deployment selector",
            deployment_spec.selector.match_labels.as_ref(),
            &expected,
        )?;
        check_labels("pod template labels", template_labels, &expected)?;
        check_labels("service selector", service_spec.selector.as_ref(), &expected)?;

        // Ports: service target must be a declared container port
        let container_ports: Vec<(Option<&str>, i32)> = deployment_spec
            .template
            .spec
            .as_ref()
            .map(|pod| {
                pod.containers
                    .iter()
                    .flat_map(|c| c.ports.iter().flatten())
                    .map(|p| (p.name.as_deref(), p.container_port))
                    .collect()
            })
            .unwrap_or_default();

        let service_ports = service_spec.ports.as_deref().unwrap_or_default();
        if service_ports.is_empty() {
            return Err(StackError::validation_error("Service declares no ports"));
        }

        for port in service_ports {
            let target = port.target_port.clone().unwrap_or(IntOrString::Int(port.port));
            let matched = container_ports.iter().any(|(name, number)| match &target {
                IntOrString::Int(n) => n == number,
                IntOrString::String(s) => *name == Some(s.as_str()),
            });
            if !matched {
                return Err(StackError::validation_error(format!(
                    "Service port {} targets {:?}, which no container exposes",
                    port.port, target
                )));
            }
        }

        // Ingress must route to the emitted service on one of its ports
        let (backend_name, backend_port) = ingress_backend(&stack.ingress).ok_or_else(|| {
            StackError::validation_error("Ingress has no catch-all service backend")
        })?;
        if backend_name != stack.service_name() {
            return Err(StackError::validation_error(format!(
                "Ingress routes to service '{}', expected '{}'",
                backend_name,
                stack.service_name()
            )));
        }
        if !service_ports.iter().any(|p| p.port == backend_port) {
            return Err(StackError::validation_error(format!(
                "Ingress routes to port {}, which service '{}' does not expose",
                backend_port,
                stack.service_name()
            )));
        }

        // Namespace references
        for (kind, object_namespace) in [
            ("Deployment", stack.deployment.metadata.namespace.as_deref()),
            ("Service", stack.service.metadata.namespace.as_deref()),
            ("Ingress", stack.ingress.metadata.namespace.as_deref()),
            ("Ingress controller", Some(stack.ingress_chart.namespace.as_str())),
        ] {
            if object_namespace != Some(namespace) {
                return Err(StackError::validation_error(format!(
                    "{} is in namespace {:?}, expected '{}'",
                    kind, object_namespace, namespace
                )));
            }
        }

        tracing::debug!("Stack {} passed validation", stack.cluster_name());
        Ok(())
    }
}

fn check_labels(
    what: &str,
    actual: Option<&BTreeMap<String, String>>,
    expected: &BTreeMap<String, String>,
) -> Result<()> {
    if actual != Some(expected) {
        return Err(StackError::validation_error(format!(
            "{} {:?} does not match app labels {:?}",
            what, actual, expected
        )));
    }
    Ok(())
}

pub(crate) fn validate_dns_label(what: &str, name: &str) -> Result<()> {
    let re = Regex::new(DNS_LABEL_PATTERN)
        .map_err(|e| StackError::config_error(format!("Invalid name pattern: {}", e)))?;

    if name.len() > DNS_LABEL_MAX_LEN || !re.is_match(name) {
        return Err(StackError::config_error(format!(
            "Invalid {}: '{}' (lowercase alphanumerics and '-', max {} chars)",
            what, name, DNS_LABEL_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_port(what: &str, port: i32) -> Result<()> {
    if !(1..=65535).contains(&port) {
        return Err(StackError::validation_error(format!(
            "{} out of range: {}",
            what, port
        )));
    }
    Ok(())
}

fn validate_range(resource: &str, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(StackError::validation_error(format!(
            "Autoscaling {} limits must be finite: minimum {} maximum {}",
            resource, min, max
        )));
    }
    if min < 0.0 || min > max {
        return Err(StackError::validation_error(format!(
            "Autoscaling {} limits invalid: minimum {} maximum {}",
            resource, min, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> StackDescriptor {
        StackDescriptor::from_conf(&StackConf::default()).unwrap()
    }

    #[test]
    fn test_default_stack_is_valid() {
        StackValidator::validate_conf(&StackConf::default()).unwrap();
        StackValidator::validate(&stack()).unwrap();
    }

    #[test]
    fn test_dns_label() {
        assert!(validate_dns_label("name", "dreamin-k8s").is_ok());
        assert!(validate_dns_label("name", "Dreamin").is_err());
        assert!(validate_dns_label("name", "-lead").is_err());
        assert!(validate_dns_label("name", "trail-").is_err());
        assert!(validate_dns_label("name", &"a".repeat(64)).is_err());
    }

    #[test]
    fn test_conf_rejects_zero_replicas() {
        let mut conf = StackConf::default();
        conf.app.replicas = 0;
        assert!(StackValidator::validate_conf(&conf).is_err());
    }

    #[test]
    fn test_conf_rejects_replicas_beyond_i32() {
        let mut conf = StackConf::default();
        conf.app.replicas = u32::MAX;
        let err = StackValidator::validate_conf(&conf).unwrap_err();
        assert!(err.to_string().contains("app.replicas"));

        conf.app.replicas = i32::MAX as u32;
        StackValidator::validate_conf(&conf).unwrap();
    }

    #[test]
    fn test_conf_rejects_non_finite_autoscaling() {
        let mut conf = StackConf::default();
        conf.cluster.autoscaling.cpu_min = f64::NAN;
        let err = StackValidator::validate_conf(&conf).unwrap_err();
        assert!(err.to_string().contains("cpu"));

        let mut conf = StackConf::default();
        conf.cluster.autoscaling.memory_max = f64::INFINITY;
        let err = StackValidator::validate_conf(&conf).unwrap_err();
        assert!(err.to_string().contains("memory"));
    }

    #[test]
    fn test_conf_rejects_inverted_autoscaling() {
        let mut conf = StackConf::default();
        conf.cluster.autoscaling.memory_min = 2.0;
        let err = StackValidator::validate_conf(&conf).unwrap_err();
        assert!(err.to_string().contains("memory"));
    }

    #[test]
    fn test_conf_rejects_missing_project() {
        let mut conf = StackConf::default();
        conf.gcp.project = String::new();
        assert!(matches!(
            StackValidator::validate_conf(&conf),
            Err(StackError::ConfigError(_))
        ));
    }

    #[test]
    fn test_detects_selector_drift() {
        let mut stack = stack();
        let selector = stack.service.spec.as_mut().unwrap().selector.as_mut().unwrap();
        selector.insert("appClass".to_string(), "other".to_string());

        let err = StackValidator::validate(&stack).unwrap_err();
        assert!(err.to_string().contains("service selector"));
    }

    #[test]
    fn test_detects_template_label_drift() {
        let mut stack = stack();
        let template = stack.deployment.spec.as_mut().unwrap().template.metadata.as_mut().unwrap();
        template.labels = None;

        let err = StackValidator::validate(&stack).unwrap_err();
        assert!(err.to_string().contains("pod template labels"));
    }

    #[test]
    fn test_detects_port_mismatch() {
        let mut conf = StackConf::default();
        conf.app.container_port = 9000;
        let mut stack = StackDescriptor::from_conf(&conf).unwrap();
        // service targets the container port it was built with; break it
        let port = &mut stack.service.spec.as_mut().unwrap().ports.as_mut().unwrap()[0];
        port.target_port = Some(IntOrString::Int(8080));

        assert!(StackValidator::validate(&stack).is_err());
    }

    #[test]
    fn test_named_target_port() {
        let mut stack = stack();
        let port = &mut stack.service.spec.as_mut().unwrap().ports.as_mut().unwrap()[0];
        port.target_port = Some(IntOrString::String("http".to_string()));

        StackValidator::validate(&stack).unwrap();
    }

    #[test]
    fn test_detects_namespace_mismatch() {
        let mut stack = stack();
        stack.ingress.metadata.namespace = Some("default".to_string());

        let err = StackValidator::validate(&stack).unwrap_err();
        assert!(err.to_string().contains("Ingress"));
    }
}
