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

use crate::domain::config::StackConf;
use crate::shared::error::{Result, StackError};
use std::collections::HashMap;
use std::str::FromStr;

/// Split `-D key=value` properties into a map.
pub fn parse_dynamic_configs(configs: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();

    for config in configs {
        let (key, value) = config.split_once('=').ok_or_else(|| {
            StackError::config_error(format!(
                "Invalid config format: '{}'. Expected 'key=value'",
                config
            ))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(StackError::config_error(format!(
                "Empty key in config: '{}'",
                config
            )));
        }

        map.insert(key.to_string(), value.trim().to_string());
    }

    Ok(map)
}

pub fn apply_to_stack_conf(configs: &HashMap<String, String>, conf: &mut StackConf) -> Result<()> {
    // Sorted so the first reported error does not depend on hash order
    let mut keys: Vec<&String> = configs.keys().collect();
    keys.sort();

    for key in keys {
        let value = &configs[key];
        match key.as_str() {
            "stack.name" => conf.name = value.clone(),
            "gcp.project" => conf.gcp.project = value.clone(),
            "gcp.zone" => conf.gcp.zone = value.clone(),
            "gcp.region" => conf.gcp.region = value.clone(),
            "cluster.node-count" => conf.cluster.initial_node_count = parse_value(key, value)?,
            "cluster.machine-type" => conf.cluster.machine_type = value.clone(),
            "cluster.version" => conf.cluster.version = value.clone(),
            "cluster.autoscaling" => conf.cluster.autoscaling.enabled = parse_value(key, value)?,
            "app.image" => conf.app.image = value.clone(),
            "app.replicas" => conf.app.replicas = parse_value(key, value)?,
            "app.container-port" => conf.app.container_port = parse_value(key, value)?,
            "service.port" => conf.service.port = parse_value(key, value)?,
            "service.neg" => conf.service.neg_ingress = parse_value(key, value)?,
            "ingress.class" => conf.ingress.class = value.clone(),
            "ingress.chart-version" => conf.ingress.chart_version = value.clone(),
            "ingress.chart-repo" => conf.ingress.chart_repo = value.clone(),
            _ => {
                return Err(StackError::config_error(format!(
                    "Unknown dynamic property: '{}'",
                    key
                )))
            }
        }
        tracing::debug!("Applied dynamic property {}={}", key, value);
    }

    Ok(())
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        StackError::config_error(format!("Invalid value for '{}': '{}'", key, value))
    })
}
