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

use crate::domain::cluster::descriptor::StackDescriptor;
use serde::Serialize;

/// Values published once the stack is up.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StackExports {
    pub cluster_name: String,
    pub namespace_name: String,
    pub deployment_name: String,
    pub service_name: String,
    pub kubeconfig: Option<String>,
    #[serde(rename = "servicePublicIP")]
    pub service_public_ip: Option<String>,
    #[serde(rename = "ingressPublicIP")]
    pub ingress_public_ip: Option<String>,
}

impl StackExports {
    /// Exports known without contacting anything; addresses stay unresolved.
    pub fn from_descriptor(stack: &StackDescriptor) -> Self {
        Self {
            cluster_name: stack.cluster_name().to_string(),
            namespace_name: stack.namespace_name().to_string(),
            deployment_name: stack.deployment_name().to_string(),
            service_name: stack.service_name().to_string(),
            ..Default::default()
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("clusterName", Some(self.cluster_name.as_str())),
            ("namespaceName", Some(self.namespace_name.as_str())),
            ("deploymentName", Some(self.deployment_name.as_str())),
            ("serviceName", Some(self.service_name.as_str())),
            ("kubeconfig", self.kubeconfig.as_deref()),
            ("servicePublicIP", self.service_public_ip.as_deref()),
            ("ingressPublicIP", self.ingress_public_ip.as_deref()),
        ]
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.entries().iter().all(|(_, value)| value.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::StackConf;

    #[test]
    fn test_exports_from_descriptor() {
        let stack = StackDescriptor::from_conf(&StackConf::default()).unwrap();
        let exports = StackExports::from_descriptor(&stack);

        assert_eq!(exports.cluster_name, "dreamin-k8s");
        assert_eq!(exports.service_name, "dreamin-k8s");
        assert!(exports.service_public_ip.is_none());
        assert!(!exports.is_fully_resolved());
    }

    #[test]
    fn test_export_keys() {
        let exports = StackExports {
            service_public_ip: Some("34.1.2.3".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&exports).unwrap();
        assert_eq!(json["servicePublicIP"], "34.1.2.3");
        assert!(json["ingressPublicIP"].is_null());
        assert!(json.get("clusterName").is_some());
    }
}
