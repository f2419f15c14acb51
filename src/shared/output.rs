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

//! Values that become known only after an external step completes.
//!
//! Cluster name, endpoint and CA material are reported by the provisioner once
//! the cluster exists; load balancer addresses appear once the cloud assigns
//! them. An [`Output`] wraps such a value. Combinators join several outputs
//! into one that resolves when all inputs have resolved, or fails with the
//! first error.

use crate::shared::error::{Result, StackError};
use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;

pub struct Output<T> {
    inner: BoxFuture<'static, Result<T>>,
}

impl<T: Send + 'static> Output<T> {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            inner: future.boxed(),
        }
    }

    /// An output whose value is already known.
    pub fn ready(value: T) -> Self {
        Self::new(future::ready(Ok(value)))
    }

    pub fn failed(err: StackError) -> Self {
        Self::new(future::ready(Err(err)))
    }

    /// Transform the resolved value. `f` runs at most once, after the value is available.
    pub fn apply<U, F>(self, f: F) -> Output<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let inner = self.inner;
        Output::new(async move {
            let value = inner.await?;
            f(value)
        })
    }

    pub async fn resolve(self) -> Result<T> {
        self.inner.await
    }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Output(<pending>)")
    }
}

/// Wait for three outputs of different types.
pub fn all3<A, B, C>(a: Output<A>, b: Output<B>, c: Output<C>) -> Output<(A, B, C)>
where
    A: Send + 'static,
    B: Send + 'static,
    C: Send + 'static,
{
    Output::new(future::try_join3(a.inner, b.inner, c.inner))
}

/// Wait for every output in `outputs`, preserving order.
pub fn all<T>(outputs: Vec<Output<T>>) -> Output<Vec<T>>
where
    T: Send + 'static,
{
    Output::new(future::try_join_all(outputs.into_iter().map(|o| o.inner)))
}
