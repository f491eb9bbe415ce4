// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node kinds.
//!
//! Each kind is a `static` [`NodeKind`](crate::node::NodeKind) looked up
//! through [`KindId::kind`](crate::node::KindId::kind).

pub mod inputs;
pub mod math;
pub mod output;
pub mod vector;
