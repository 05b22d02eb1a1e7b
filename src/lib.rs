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

//! JavaScript backend for the Kestrel programming language
//!
//! Takes the typed, symbol-resolved IR produced by the Kestrel front end and
//! lowers each function body into a statement-oriented JavaScript AST. The
//! interesting work is reification: the IR allows conditionals, try blocks
//! and block expressions to produce values, which JavaScript's statement
//! forms cannot, so the lowering introduces tail-value temporaries and
//! explicit sequencing while keeping evaluation order and side-effect timing
//! exactly as written.
//!
//! Name resolution, type checking and overload resolution happen upstream;
//! pretty-printing and bundling of the produced AST happen downstream.

pub mod error;
pub mod intrinsics;
pub mod ir;
pub mod js;
pub mod lower;
pub mod naming;

pub use error::BackendError;
pub use lower::{JsBackend, LoweredFunction};
