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

/// Stack identity
pub const DEFAULT_STACK_NAME: &str = "dreamin-k8s";
pub const FIELD_MANAGER: &str = "dreamin-kube";

/// Workload defaults
pub const DEFAULT_IMAGE: &str = "asia.gcr.io/saltyaom-casual/dreamin-graphql:latest";
pub const DEFAULT_REPLICAS: u32 = 4;
pub const DEFAULT_CONTAINER_PORT: i32 = 8080;
pub const DEFAULT_SERVICE_PORT: i32 = 8080;

/// Port names and protocols
pub const PORT_NAME_HTTP: &str = "http";
pub const PROTOCOL_TCP: &str = "TCP";

/// Shared label key
pub const LABEL_APP_CLASS: &str = "appClass";

/// Service exposure
pub const SERVICE_TYPE_LOAD_BALANCER: &str = "LoadBalancer";
pub const ANNOTATION_GKE_NEG: &str = "cloud.google.com/neg";
pub const GKE_NEG_INGRESS_ENABLED: &str = r#"{"ingress": true}"#;

/// Ingress
pub const ANNOTATION_INGRESS_CLASS: &str = "kubernetes.io/ingress.class";
pub const DEFAULT_INGRESS_CLASS: &str = "nginx";
pub const INGRESS_CATCH_ALL_PATH: &str = "/";
pub const INGRESS_PATH_TYPE_PREFIX: &str = "Prefix";

/// Ingress controller chart
pub const INGRESS_CHART_RELEASE: &str = "nginx";
pub const INGRESS_CHART_NAME: &str = "nginx-ingress";
pub const INGRESS_CHART_VERSION: &str = "1.24.4";
pub const INGRESS_CHART_REPO: &str = "stable";

/// GKE cluster defaults
pub const DEFAULT_INITIAL_NODE_COUNT: u32 = 1;
pub const DEFAULT_MACHINE_TYPE: &str = "e2-medium";
pub const LATEST_ENGINE_VERSION: &str = "latest";
pub const RESOURCE_TYPE_CPU: &str = "cpu";
pub const RESOURCE_TYPE_MEMORY: &str = "memory";
pub const DEFAULT_CPU_MIN: f64 = 1.0;
pub const DEFAULT_CPU_MAX: f64 = 2.0;
pub const DEFAULT_MEMORY_MIN: f64 = 0.5;
pub const DEFAULT_MEMORY_MAX: f64 = 1.0;

/// Node oauth scopes
pub const OAUTH_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/compute",
    "https://www.googleapis.com/auth/devstorage.read_only",
    "https://www.googleapis.com/auth/logging.write",
    "https://www.googleapis.com/auth/monitoring",
];

/// GCP auth provider for generated kubeconfigs
pub const AUTH_PROVIDER_GCP: &str = "gcp";
pub const GCLOUD_CMD_PATH: &str = "gcloud";
pub const GCLOUD_CMD_ARGS: &str = "config config-helper --format=json";
pub const GCLOUD_EXPIRY_KEY: &str = "{.credential.token_expiry}";
pub const GCLOUD_TOKEN_KEY: &str = "{.credential.access_token}";

/// Config file environment variable
pub const STACK_CONF_ENV: &str = "DREAMIN_STACK_CONF";
