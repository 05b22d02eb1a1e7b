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

//! Backend error types
//!
//! Every error in this module is an internal invariant violation: the IR
//! handed to the backend is produced by the type checker and resolver, so a
//! malformed tree is a compiler bug, not a user error. Lowering of the
//! current function body is aborted immediately and the partial output is
//! discarded by the caller. There is no retry and no partial success.

use crate::ir::IrType;
use thiserror::Error;

/// Fatal errors raised while lowering a function body to JavaScript.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// A break or continue was visited with no live registry entry for its
    /// target loop. The IR must never contain a jump outside its loop.
    #[error("break or continue targets no enclosing loop (loop id {loop_id})")]
    JumpOutsideLoop { loop_id: u32 },

    /// A catch clause's declared exception type does not resolve to a
    /// class. The type checker guarantees catch parameters are class types;
    /// this case exists because the match must be exhaustive, not because
    /// the backend validates it.
    #[error("catch clause type is not a class type: {ty:?}")]
    NonClassCatchType { ty: IrType },

    /// A constant literal kind the JavaScript encoder does not support.
    #[error("unsupported constant kind: {kind}")]
    UnsupportedConstant { kind: String },

    /// A value was required from a node whose lowering produced only
    /// statements. Catching this here keeps a gap in the visitor from
    /// silently dropping a value-producing node.
    #[error("expected a value from {context}, but lowering produced only statements")]
    MissingValue { context: &'static str },

    /// An IR node referenced a declaration id the symbol table does not
    /// contain.
    #[error("unknown {kind} symbol id {id}")]
    UnknownSymbol { kind: &'static str, id: u32 },
}
