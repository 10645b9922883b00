// SPDX-License-Identifier: Apache-2.0

mod apply;
pub(crate) mod file;

pub use apply::IfcfgBackend;
