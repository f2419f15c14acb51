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

//! Ingress controller chart reference
//!
//! The chart is installed by an external tool; this module only describes
//! which chart to install and post-processes its rendered manifests.

use crate::domain::config::IngressConf;
use crate::shared::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngressChart {
    pub release: String,
    pub chart: String,
    pub version: String,
    pub repo: String,
    pub namespace: String,
    pub values: Value,
}

impl IngressChart {
    pub fn new(conf: &IngressConf, namespace: String) -> Self {
        Self {
            release: conf.release.clone(),
            chart: conf.chart.clone(),
            version: conf.chart_version.clone(),
            repo: conf.chart_repo.clone(),
            namespace,
            values: publish_service_values(conf.publish_service),
        }
    }

    /// Rewrite `metadata.namespace` of every object in a rendered
    /// multi-document chart manifest to the chart namespace.
    ///
    /// Documents without `metadata` are passed through unchanged; empty
    /// documents are dropped.
    pub fn transform_manifests(&self, rendered: &str) -> Result<Vec<Value>> {
        let mut objects = Vec::new();

        for document in serde_yaml::Deserializer::from_str(rendered) {
            let mut object = Value::deserialize(document)?;
            if object.is_null() {
                continue;
            }

            let mapping = object.as_mapping_mut().ok_or_else(|| {
                StackError::InvalidResource("Chart manifest document is not a mapping".to_string())
            })?;

            if let Some(metadata) = mapping.get_mut("metadata") {
                let metadata = metadata.as_mapping_mut().ok_or_else(|| {
                    StackError::InvalidResource("Chart object metadata is not a mapping".to_string())
                })?;
                metadata.insert(
                    Value::String("namespace".to_string()),
                    Value::String(self.namespace.clone()),
                );
            }

            objects.push(object);
        }

        tracing::debug!(
            "Moved {} chart objects into namespace {}",
            objects.len(),
            self.namespace
        );
        Ok(objects)
    }

    /// [`Self::transform_manifests`] rendered back to a multi-document stream.
    pub fn transform_manifests_yaml(&self, rendered: &str) -> Result<String> {
        let documents = self
            .transform_manifests(rendered)?
            .iter()
            .map(serde_yaml::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(documents.join("---\n"))
    }
}

fn publish_service_values(enabled: bool) -> Value {
    let mut publish_service = Mapping::new();
    publish_service.insert("enabled".into(), Value::Bool(enabled));

    let mut controller = Mapping::new();
    controller.insert("publishService".into(), Value::Mapping(publish_service));

    let mut values = Mapping::new();
    values.insert("controller".into(), Value::Mapping(controller));
    Value::Mapping(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> IngressChart {
        IngressChart::new(&IngressConf::default(), "dreamin-k8s".to_string())
    }

    #[test]
    fn test_chart_reference() {
        let chart = chart();
        assert_eq!(chart.release, "nginx");
        assert_eq!(chart.chart, "nginx-ingress");
        assert_eq!(chart.version, "1.24.4");
        assert_eq!(chart.repo, "stable");
        assert_eq!(
            chart.values["controller"]["publishService"]["enabled"],
            Value::Bool(true)
        );
    }

    #[test]
    fn test_transform_sets_namespace() {
        let rendered = r#"
apiVersion: v1
kind: ServiceAccount
metadata:
  name: nginx-ingress
---
apiVersion: v1
kind: Service
metadata:
  name: nginx-ingress-controller
  namespace: default
---
apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRole
"#;
        let objects = chart().transform_manifests(rendered).unwrap();
        assert_eq!(objects.len(), 3);
        assert_eq!(objects[0]["metadata"]["namespace"].as_str(), Some("dreamin-k8s"));
        assert_eq!(objects[1]["metadata"]["namespace"].as_str(), Some("dreamin-k8s"));
        assert!(objects[2].get("metadata").is_none());
    }

    #[test]
    fn test_transform_yaml_stream() {
        let rendered = "kind: ConfigMap\nmetadata:\n  name: a\n---\nkind: Secret\nmetadata:\n  name: b\n";
        let yaml = chart().transform_manifests_yaml(rendered).unwrap();

        let documents: Vec<Value> = serde_yaml::Deserializer::from_str(&yaml)
            .map(|d| Value::deserialize(d).unwrap())
            .collect();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1]["metadata"]["namespace"].as_str(), Some("dreamin-k8s"));
    }

    #[test]
    fn test_transform_rejects_scalar_document() {
        assert!(chart().transform_manifests("just a string").is_err());
    }
}
