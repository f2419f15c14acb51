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

//! Stack domain: descriptors, validation, deployment and exports

pub mod deployer;
pub mod descriptor;
pub mod exports;
pub mod validator;

pub use self::deployer::StackDeployer;
pub use self::descriptor::{StackDescriptor, StackNode};
pub use self::exports::StackExports;
pub use self::validator::StackValidator;
