// SPDX-License-Identifier: Apache-2.0

mod ip;
mod route;
mod show;

pub(crate) use show::nispor_retrieve;
