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

//! GKE-style kubeconfig generation.
//!
//! GKE clusters authenticate through `gcloud` rather than a static client
//! certificate, so the generated user entry delegates token refresh to the
//! `gcp` auth provider and its `config-helper` command.

use crate::infrastructure::constants::*;
use crate::shared::error::{Result, StackError};
use crate::shared::output::{all3, Output};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Connection details reported for a provisioned cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEndpoint {
    pub name: String,
    /// Host or IP of the control plane, without scheme
    pub endpoint: String,
    /// Base64 encoded CA certificate, used verbatim
    pub ca_certificate: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribedCluster {
    name: String,
    endpoint: String,
    master_auth: MasterAuth,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MasterAuth {
    cluster_ca_certificate: String,
}

impl ClusterEndpoint {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        ca_certificate: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            ca_certificate: ca_certificate.into(),
        }
    }

    /// Parse `gcloud container clusters describe --format=json` output.
    pub fn from_describe_json(json: &str) -> Result<Self> {
        let described: DescribedCluster = serde_json::from_str(json)?;
        Ok(Self {
            name: described.name,
            endpoint: described.endpoint,
            ca_certificate: described.master_auth.cluster_ca_certificate,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthDocument {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub clusters: Vec<NamedCluster>,
    pub contexts: Vec<NamedContext>,
    #[serde(rename = "current-context")]
    pub current_context: String,
    pub kind: String,
    pub preferences: BTreeMap<String, String>,
    pub users: Vec<NamedUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedCluster {
    pub cluster: ClusterEntry,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterEntry {
    #[serde(rename = "certificate-authority-data")]
    pub certificate_authority_data: String,
    pub server: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedContext {
    pub context: ContextEntry,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextEntry {
    pub cluster: String,
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedUser {
    pub name: String,
    pub user: UserEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserEntry {
    #[serde(rename = "auth-provider")]
    pub auth_provider: AuthProvider,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthProvider {
    pub config: AuthProviderConfig,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthProviderConfig {
    #[serde(rename = "cmd-args")]
    pub cmd_args: String,
    #[serde(rename = "cmd-path")]
    pub cmd_path: String,
    #[serde(rename = "expiry-key")]
    pub expiry_key: String,
    #[serde(rename = "token-key")]
    pub token_key: String,
}

impl AuthDocument {
    pub fn for_cluster(project: &str, zone: &str, cluster: &ClusterEndpoint) -> Self {
        let context = format!("{}_{}_{}", project, zone, cluster.name);

        Self {
            api_version: "v1".to_string(),
            clusters: vec![NamedCluster {
                cluster: ClusterEntry {
                    certificate_authority_data: cluster.ca_certificate.clone(),
                    server: format!("https://{}", cluster.endpoint),
                },
                name: context.clone(),
            }],
            contexts: vec![NamedContext {
                context: ContextEntry {
                    cluster: context.clone(),
                    user: context.clone(),
                },
                name: context.clone(),
            }],
            current_context: context.clone(),
            kind: "Config".to_string(),
            preferences: BTreeMap::new(),
            users: vec![NamedUser {
                name: context,
                user: UserEntry {
                    auth_provider: AuthProvider {
                        config: AuthProviderConfig {
                            cmd_args: GCLOUD_CMD_ARGS.to_string(),
                            cmd_path: GCLOUD_CMD_PATH.to_string(),
                            expiry_key: GCLOUD_EXPIRY_KEY.to_string(),
                            token_key: GCLOUD_TOKEN_KEY.to_string(),
                        },
                        name: AUTH_PROVIDER_GCP.to_string(),
                    },
                },
            }],
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Render the kubeconfig document for `cluster`.
pub fn render_kubeconfig(project: &str, zone: &str, cluster: &ClusterEndpoint) -> Result<String> {
    if cluster.name.is_empty() || cluster.endpoint.is_empty() {
        return Err(StackError::InvalidResource(
            "Cluster name and endpoint are required to render a kubeconfig".to_string(),
        ));
    }

    tracing::debug!(
        "Rendering kubeconfig for cluster {} at {}",
        cluster.name,
        cluster.endpoint
    );
    AuthDocument::for_cluster(project, zone, cluster).to_yaml()
}

/// Kubeconfig that renders once name, endpoint and CA material are all known.
pub fn kubeconfig_output(
    project: String,
    zone: String,
    name: Output<String>,
    endpoint: Output<String>,
    ca_certificate: Output<String>,
) -> Output<String> {
    all3(name, endpoint, ca_certificate).apply(move |(name, endpoint, ca_certificate)| {
        render_kubeconfig(
            &project,
            &zone,
            &ClusterEndpoint::new(name, endpoint, ca_certificate),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> ClusterEndpoint {
        ClusterEndpoint::new("demo", "1.2.3.4", "QkFTRTY0")
    }

    fn parse(yaml: &str) -> AuthDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_demo_document() {
        let doc = parse(&render_kubeconfig("proj", "asia-1", &demo()).unwrap());

        assert_eq!(doc.current_context, "proj_asia-1_demo");
        assert_eq!(doc.clusters.len(), 1);
        assert_eq!(doc.contexts.len(), 1);
        assert_eq!(doc.users.len(), 1);
        assert_eq!(doc.clusters[0].name, "proj_asia-1_demo");
        assert_eq!(doc.contexts[0].name, "proj_asia-1_demo");
        assert_eq!(doc.contexts[0].context.cluster, "proj_asia-1_demo");
        assert_eq!(doc.contexts[0].context.user, "proj_asia-1_demo");
        assert_eq!(doc.users[0].name, "proj_asia-1_demo");
        assert_eq!(doc.clusters[0].cluster.server, "https://1.2.3.4");
        assert_eq!(doc.clusters[0].cluster.certificate_authority_data, "QkFTRTY0");
    }

    #[test]
    fn test_top_level_keys() {
        let yaml = render_kubeconfig("proj", "asia-1", &demo()).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let mapping = value.as_mapping().unwrap();

        let keys: Vec<&str> = mapping.keys().filter_map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "apiVersion",
                "clusters",
                "contexts",
                "current-context",
                "kind",
                "preferences",
                "users"
            ]
        );
        assert_eq!(value["kind"].as_str(), Some("Config"));
        assert_eq!(value["apiVersion"].as_str(), Some("v1"));
        assert!(value["preferences"].as_mapping().unwrap().is_empty());
    }

    #[test]
    fn test_auth_provider_delegates_to_gcloud() {
        let doc = parse(&render_kubeconfig("proj", "asia-1", &demo()).unwrap());
        let provider = &doc.users[0].user.auth_provider;

        assert_eq!(provider.name, "gcp");
        assert_eq!(provider.config.cmd_path, "gcloud");
        assert_eq!(provider.config.cmd_args, "config config-helper --format=json");
        assert_eq!(provider.config.expiry_key, "{.credential.token_expiry}");
        assert_eq!(provider.config.token_key, "{.credential.access_token}");
    }

    #[test]
    fn test_values_kept_verbatim() {
        let ca = "LS0tLS1CRUdJTiBDRVJUSUZJQ0FURS0tLS0t+/==";
        let cluster = ClusterEndpoint::new("edge", "34.87.1.10:443", ca);
        let doc = parse(&render_kubeconfig("p", "z", &cluster).unwrap());

        assert_eq!(doc.clusters[0].cluster.server, "https://34.87.1.10:443");
        assert_eq!(doc.clusters[0].cluster.certificate_authority_data, ca);
    }

    #[test]
    fn test_readable_by_kube_client() {
        let yaml = render_kubeconfig("proj", "asia-1", &demo()).unwrap();
        let kubeconfig = kube::config::Kubeconfig::from_yaml(&yaml).unwrap();

        assert_eq!(kubeconfig.current_context.as_deref(), Some("proj_asia-1_demo"));
        assert_eq!(kubeconfig.clusters.len(), 1);
        assert_eq!(kubeconfig.contexts.len(), 1);
        assert_eq!(kubeconfig.auth_infos.len(), 1);
    }

    #[test]
    fn test_missing_endpoint_rejected() {
        let cluster = ClusterEndpoint::new("demo", "", "QkFTRTY0");
        assert!(render_kubeconfig("proj", "asia-1", &cluster).is_err());
    }

    #[test]
    fn test_from_describe_json() {
        let json = r#"{
            "name": "dreamin-k8s",
            "endpoint": "34.1.2.3",
            "location": "asia-southeast1",
            "masterAuth": { "clusterCaCertificate": "QkFTRTY0" }
        }"#;

        let cluster = ClusterEndpoint::from_describe_json(json).unwrap();
        assert_eq!(cluster, ClusterEndpoint::new("dreamin-k8s", "34.1.2.3", "QkFTRTY0"));
    }

    #[tokio::test]
    async fn test_kubeconfig_output_joins_inputs() {
        let endpoint = Output::new(async {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            Ok("1.2.3.4".to_string())
        });

        let yaml = kubeconfig_output(
            "proj".to_string(),
            "asia-1".to_string(),
            Output::ready("demo".to_string()),
            endpoint,
            Output::ready("QkFTRTY0".to_string()),
        )
        .resolve()
        .await
        .unwrap();

        assert_eq!(parse(&yaml).current_context, "proj_asia-1_demo");
    }
}
