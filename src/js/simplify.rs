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

//! Local conditional-arm cleanup
//!
//! The conditional reifier builds every else arm as a block so that nested
//! branches always have a destination. This post-pass removes the arms that
//! turned out empty and unwraps single-statement arms, producing the
//! `else if` chains a human would write. It is idempotent: running it on an
//! already-collapsed tree changes nothing.

use super::ast::JsStatement;

/// Collapse empty and single-statement else arms throughout a statement
/// tree.
pub fn collapse_conditional_arms(stmt: &mut JsStatement) {
    match stmt {
        JsStatement::If {
            then_branch,
            else_branch,
            ..
        } => {
            collapse_conditional_arms(then_branch);
            if let Some(arm) = else_branch.take() {
                *else_branch = collapse_else_arm(*arm).map(Box::new);
            }
        }
        JsStatement::Block(statements) => {
            for statement in statements {
                collapse_conditional_arms(statement);
            }
        }
        JsStatement::While { body, .. }
        | JsStatement::DoWhile { body, .. }
        | JsStatement::Labeled { body, .. } => collapse_conditional_arms(body),
        JsStatement::Try {
            body,
            catch,
            finally,
        } => {
            for statement in body {
                collapse_conditional_arms(statement);
            }
            if let Some(catch) = catch {
                for statement in &mut catch.body {
                    collapse_conditional_arms(statement);
                }
            }
            if let Some(finally) = finally {
                for statement in finally {
                    collapse_conditional_arms(statement);
                }
            }
        }
        JsStatement::Expression(_)
        | JsStatement::VarDecl { .. }
        | JsStatement::Break { .. }
        | JsStatement::Continue { .. }
        | JsStatement::Return { .. }
        | JsStatement::Throw { .. } => {}
    }
}

/// Collapse one else arm: an empty block disappears, a single-statement
/// block is inlined, anything else is kept (after collapsing its children).
fn collapse_else_arm(arm: JsStatement) -> Option<JsStatement> {
    match arm {
        JsStatement::Block(mut statements) => match statements.len() {
            0 => None,
            1 => statements.pop().map(|mut only| {
                collapse_conditional_arms(&mut only);
                only
            }),
            _ => {
                for statement in &mut statements {
                    collapse_conditional_arms(statement);
                }
                Some(JsStatement::Block(statements))
            }
        },
        mut other => {
            collapse_conditional_arms(&mut other);
            Some(other)
        }
    }
}
