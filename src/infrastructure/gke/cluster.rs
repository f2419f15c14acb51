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

//! GKE cluster descriptor handed to the external provisioner.
//!
//! Creating the cluster is not done here; the descriptor is serialized and the
//! provisioner reports back name, endpoint and CA material.

use crate::domain::config::{ClusterConf, StackConf};
use crate::infrastructure::constants::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GkeClusterSpec {
    pub name: String,
    pub initial_node_count: u32,
    pub min_master_version: String,
    pub node_version: String,
    pub enable_shielded_nodes: bool,
    pub location: String,
    pub cluster_autoscaling: ClusterAutoscaling,
    pub node_config: NodeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterAutoscaling {
    pub enabled: bool,
    pub resource_limits: Vec<ResourceLimit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLimit {
    pub resource_type: String,
    pub minimum: f64,
    pub maximum: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    pub machine_type: String,
    pub oauth_scopes: Vec<String>,
}

impl GkeClusterSpec {
    pub fn from_conf(conf: &StackConf) -> Self {
        let cluster: &ClusterConf = &conf.cluster;
        let autoscaling = &cluster.autoscaling;

        Self {
            name: conf.name.clone(),
            initial_node_count: cluster.initial_node_count,
            min_master_version: cluster.version.clone(),
            node_version: cluster.version.clone(),
            enable_shielded_nodes: cluster.shielded_nodes,
            location: conf.gcp.region.clone(),
            cluster_autoscaling: ClusterAutoscaling {
                enabled: autoscaling.enabled,
                resource_limits: vec![
                    ResourceLimit {
                        resource_type: RESOURCE_TYPE_CPU.to_string(),
                        minimum: autoscaling.cpu_min,
                        maximum: autoscaling.cpu_max,
                    },
                    ResourceLimit {
                        resource_type: RESOURCE_TYPE_MEMORY.to_string(),
                        minimum: autoscaling.memory_min,
                        maximum: autoscaling.memory_max,
                    },
                ],
            },
            node_config: NodeConfig {
                machine_type: cluster.machine_type.clone(),
                oauth_scopes: OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    pub fn resource_limit(&self, resource_type: &str) -> Option<&ResourceLimit> {
        self.cluster_autoscaling
            .resource_limits
            .iter()
            .find(|l| l.resource_type == resource_type)
    }
}
