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

//! JavaScript AST node definitions and construction helpers

use crate::ir::LoopId;
use serde::{Deserialize, Serialize};

/// Target of a break or continue statement.
///
/// Jumps are emitted in two phases: while a loop's body is being lowered its
/// jumps carry a `Pending` target naming the loop; once the loop finishes
/// lowering, every pending target inside it is rewritten to the loop's final
/// label. A `Pending` target never survives a completed body lowering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JumpTarget {
    Pending(LoopId),
    Resolved(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsUnaryOp {
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    InstanceOf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JsLiteral {
    Null,
    Undefined,
    Boolean(bool),
    /// Integer literal. Wide-integer words are stored as unsigned 32-bit
    /// values, which a JavaScript number holds exactly.
    Int(i64),
    Double(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JsExpression {
    Name(String),
    This,
    Literal(JsLiteral),
    Unary {
        op: JsUnaryOp,
        operand: Box<JsExpression>,
    },
    Binary {
        op: JsBinaryOp,
        left: Box<JsExpression>,
        right: Box<JsExpression>,
    },
    Conditional {
        test: Box<JsExpression>,
        consequent: Box<JsExpression>,
        alternate: Box<JsExpression>,
    },
    Member {
        object: Box<JsExpression>,
        property: String,
    },
    Call {
        callee: Box<JsExpression>,
        arguments: Vec<JsExpression>,
    },
    New {
        callee: Box<JsExpression>,
        arguments: Vec<JsExpression>,
    },
    Assign {
        target: Box<JsExpression>,
        value: Box<JsExpression>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsCatch {
    pub parameter: String,
    pub body: Vec<JsStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JsStatement {
    Expression(JsExpression),
    VarDecl {
        name: String,
        init: Option<JsExpression>,
    },
    Block(Vec<JsStatement>),
    If {
        test: JsExpression,
        then_branch: Box<JsStatement>,
        else_branch: Option<Box<JsStatement>>,
    },
    While {
        test: JsExpression,
        body: Box<JsStatement>,
    },
    DoWhile {
        body: Box<JsStatement>,
        test: JsExpression,
    },
    Labeled {
        label: String,
        body: Box<JsStatement>,
    },
    Break {
        target: JumpTarget,
    },
    Continue {
        target: JumpTarget,
    },
    Return {
        value: Option<JsExpression>,
    },
    Throw {
        value: JsExpression,
    },
    Try {
        body: Vec<JsStatement>,
        catch: Option<JsCatch>,
        finally: Option<Vec<JsStatement>>,
    },
}

impl JsExpression {
    pub fn name(name: impl Into<String>) -> Self {
        JsExpression::Name(name.into())
    }

    pub fn undefined() -> Self {
        JsExpression::Literal(JsLiteral::Undefined)
    }

    pub fn null() -> Self {
        JsExpression::Literal(JsLiteral::Null)
    }

    pub fn boolean(value: bool) -> Self {
        JsExpression::Literal(JsLiteral::Boolean(value))
    }

    pub fn not(operand: JsExpression) -> Self {
        JsExpression::Unary {
            op: JsUnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: JsBinaryOp, left: JsExpression, right: JsExpression) -> Self {
        JsExpression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn conditional(
        test: JsExpression,
        consequent: JsExpression,
        alternate: JsExpression,
    ) -> Self {
        JsExpression::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }
    }

    pub fn member(object: JsExpression, property: impl Into<String>) -> Self {
        JsExpression::Member {
            object: Box::new(object),
            property: property.into(),
        }
    }

    pub fn call(callee: JsExpression, arguments: Vec<JsExpression>) -> Self {
        JsExpression::Call {
            callee: Box::new(callee),
            arguments,
        }
    }

    pub fn new_instance(callee: JsExpression, arguments: Vec<JsExpression>) -> Self {
        JsExpression::New {
            callee: Box::new(callee),
            arguments,
        }
    }

    pub fn assign(target: JsExpression, value: JsExpression) -> Self {
        JsExpression::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }
}

impl JsStatement {
    /// An assignment used in statement position.
    pub fn assignment(target: JsExpression, value: JsExpression) -> Self {
        JsStatement::Expression(JsExpression::assign(target, value))
    }
}
