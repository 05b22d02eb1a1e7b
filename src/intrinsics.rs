// Copyright 2025 Google LLC
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

//! Intrinsic call dispatch table
//!
//! Some resolved functions never become ordinary invocations: integer
//! addition lowers to the `+` operator, standard-library helpers lower to
//! runtime calls, and so on. The table maps a resolved callee id to a
//! lowering strategy; the strategies themselves (intrinsic bodies) are
//! defined by whoever populates the table, not by the lowering pass.

use crate::ir::FunctionId;
use crate::js::ast::{JsBinaryOp, JsUnaryOp};
use std::collections::HashMap;

/// How a registered intrinsic call is lowered, given its already-lowered
/// receivers and arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum IntrinsicLowering {
    /// Binary operator applied to the receiver (dispatch, else extension)
    /// and the first argument, or to the first two arguments when the call
    /// has no receiver.
    BinaryOp(JsBinaryOp),
    /// Unary operator applied to the receiver or sole argument.
    UnaryOp(JsUnaryOp),
    /// Call to a named runtime helper, receiver prepended to the arguments.
    /// Produces a value.
    RuntimeCall(String),
    /// Like `RuntimeCall`, but the result is discarded and the call is
    /// emitted as a statement.
    RuntimeStatement(String),
}

/// Lookup table from resolved callee identity to lowering strategy.
#[derive(Debug, Clone, Default)]
pub struct IntrinsicTable {
    entries: HashMap<FunctionId, IntrinsicLowering>,
}

impl IntrinsicTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, callee: FunctionId, lowering: IntrinsicLowering) {
        self.entries.insert(callee, lowering);
    }

    pub fn lookup(&self, callee: FunctionId) -> Option<&IntrinsicLowering> {
        self.entries.get(&callee)
    }
}
