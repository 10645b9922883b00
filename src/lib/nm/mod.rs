// SPDX-License-Identifier: Apache-2.0

mod apply;
pub(crate) mod profile;

pub use apply::NmBackend;
