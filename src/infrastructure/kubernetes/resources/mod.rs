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

pub mod chart;
pub mod deployment;
pub mod ingress;
pub mod labels;
pub mod namespace;
pub mod service;

pub use chart::IngressChart;
pub use deployment::DeploymentBuilder;
pub use ingress::{ingress_backend, ingress_ip, IngressBuilder};
pub use labels::AppLabels;
pub use namespace::NamespaceBuilder;
pub use service::{load_balancer_ip, ServiceBuilder};
