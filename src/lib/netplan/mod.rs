// SPDX-License-Identifier: Apache-2.0

mod apply;
pub(crate) mod conf;

pub use apply::NetplanBackend;
