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

//! Stack configuration loaded from TOML

use crate::infrastructure::constants::*;
use crate::shared::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;

// ============================================================================
// Top-level stack configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StackConf {
    /// Base name shared by the cluster, namespace, workload, service and ingress
    pub name: String,
    pub gcp: GcpConf,
    pub cluster: ClusterConf,
    pub app: AppConf,
    pub service: ServiceConf,
    pub ingress: IngressConf,
}

impl Default for StackConf {
    fn default() -> Self {
        Self {
            name: DEFAULT_STACK_NAME.to_string(),
            gcp: GcpConf::default(),
            cluster: ClusterConf::default(),
            app: AppConf::default(),
            service: ServiceConf::default(),
            ingress: IngressConf::default(),
        }
    }
}

impl StackConf {
    /// Load configuration from TOML file
    pub fn from<T: AsRef<str>>(path: T) -> Result<Self> {
        let content = read_to_string(path.as_ref()).map_err(|e| {
            StackError::config_error(format!(
                "Failed to read config file {}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let conf: Self = toml::from_str(&content)?;
        Ok(conf)
    }

    /// Explicit path, then the environment variable, then built-in defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from(path);
        }

        match std::env::var(STACK_CONF_ENV) {
            Ok(env_path) if !env_path.is_empty() => Self::from(env_path),
            _ => {
                tracing::debug!("No stack configuration file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Context identifier used in generated kubeconfigs: `project_zone_name`
    pub fn context_name(&self, cluster_name: &str) -> String {
        format!("{}_{}_{}", self.gcp.project, self.gcp.zone, cluster_name)
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GcpConf {
    pub project: String,
    pub zone: String,
    pub region: String,
}

impl Default for GcpConf {
    fn default() -> Self {
        Self {
            project: "saltyaom-casual".to_string(),
            zone: "asia-southeast1-a".to_string(),
            region: "asia-southeast1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterConf {
    pub initial_node_count: u32,
    /// `latest` leaves the choice of engine version to the provisioner
    pub version: String,
    pub machine_type: String,
    pub shielded_nodes: bool,
    pub autoscaling: AutoscalingConf,
}

impl Default for ClusterConf {
    fn default() -> Self {
        Self {
            initial_node_count: DEFAULT_INITIAL_NODE_COUNT,
            version: LATEST_ENGINE_VERSION.to_string(),
            machine_type: DEFAULT_MACHINE_TYPE.to_string(),
            shielded_nodes: true,
            autoscaling: AutoscalingConf::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutoscalingConf {
    pub enabled: bool,
    pub cpu_min: f64,
    pub cpu_max: f64,
    pub memory_min: f64,
    pub memory_max: f64,
}

impl Default for AutoscalingConf {
    fn default() -> Self {
        Self {
            enabled: true,
            cpu_min: DEFAULT_CPU_MIN,
            cpu_max: DEFAULT_CPU_MAX,
            memory_min: DEFAULT_MEMORY_MIN,
            memory_max: DEFAULT_MEMORY_MAX,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConf {
    pub image: String,
    pub replicas: u32,
    pub container_port: i32,
}

impl Default for AppConf {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            replicas: DEFAULT_REPLICAS,
            container_port: DEFAULT_CONTAINER_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConf {
    pub port: i32,
    /// Adds the GKE network endpoint group annotation
    pub neg_ingress: bool,
    pub publish_not_ready_addresses: bool,
}

impl Default for ServiceConf {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVICE_PORT,
            neg_ingress: true,
            publish_not_ready_addresses: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IngressConf {
    pub class: String,
    pub release: String,
    pub chart: String,
    pub chart_version: String,
    pub chart_repo: String,
    pub publish_service: bool,
}

impl Default for IngressConf {
    fn default() -> Self {
        Self {
            class: DEFAULT_INGRESS_CLASS.to_string(),
            release: INGRESS_CHART_RELEASE.to_string(),
            chart: INGRESS_CHART_NAME.to_string(),
            chart_version: INGRESS_CHART_VERSION.to_string(),
            chart_repo: INGRESS_CHART_REPO.to_string(),
            publish_service: true,
        }
    }
}
