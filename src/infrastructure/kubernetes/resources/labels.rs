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

use crate::infrastructure::constants::LABEL_APP_CLASS;
use std::collections::BTreeMap;

/// The label set that ties the workload, its pods and the service together.
///
/// Built once per stack and handed by reference to every builder that needs
/// it, so the selector and the selected labels cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLabels {
    key: String,
    value: String,
}

impl AppLabels {
    pub fn new(app_class: impl Into<String>) -> Self {
        Self {
            key: LABEL_APP_CLASS.to_string(),
            value: app_class.into(),
        }
    }

    pub fn as_map(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(self.key.clone(), self.value.clone());
        labels
    }

    /// Label selector string for list queries
    pub fn selector_string(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}
