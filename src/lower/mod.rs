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

//! IR to JavaScript lowering
//!
//! Converts the typed, resolved IR of a function body into statement-oriented
//! JavaScript. The source IR freely mixes expression-valued control flow (a
//! conditional or a try can yield a value; a block's last child is its value)
//! while JavaScript's control constructs are statements, so every
//! value-producing control construct is reified into a tail-value temporary
//! plus explicit statement sequencing. Evaluation order and side-effect
//! timing are preserved exactly; no statements are reordered across statement
//! boundaries beyond what reification requires.
//!
//! Each node visit returns `Option<JsExpression>`: `Some` when the node's
//! static type is non-void and its kind is directly expression-representable,
//! `None` when the node was fully discharged as statements appended to the
//! current sink.

use crate::error::BackendError;
use crate::intrinsics::{IntrinsicLowering, IntrinsicTable};
use crate::ir::{
    AccessorKind, ClassId, ConditionalBranch, ConstantValue, FieldId, Function, FunctionId,
    HandlerClause, IrNode, IrType, LoopId, SymbolTable, TypeOperatorKind, VariableId,
};
use crate::js::ast::{JsCatch, JsExpression, JsLiteral, JsStatement, JumpTarget};
use crate::js::{simplify, JsBinaryOp};
use crate::naming::NameGenerator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::mem;

/// Runtime constructor for 64-bit integer values.
const WIDE_INT_CONSTRUCTOR: &str = "Long";

/// Runtime helper raised by a failed checked cast.
const CLASS_CAST_HELPER: &str = "throwClassCastException";

/// Split a 64-bit integer into the `(low, high)` words of its two-word
/// JavaScript encoding. Both words are the unsigned reinterpretation of the
/// corresponding 32 bits.
pub fn split_long(value: i64) -> (u32, u32) {
    (value as u32, (value >> 32) as u32)
}

/// One lowered function body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoweredFunction {
    pub name: String,
    pub body: Vec<JsStatement>,
}

/// JavaScript backend state shared across the function bodies of one
/// compilation unit: resolved symbols, the fresh-name generator and the
/// intrinsic dispatch table.
#[derive(Debug)]
pub struct JsBackend {
    symbols: SymbolTable,
    names: NameGenerator,
    intrinsics: IntrinsicTable,
}

impl JsBackend {
    pub fn new(symbols: SymbolTable, intrinsics: IntrinsicTable) -> Self {
        Self {
            symbols,
            names: NameGenerator::new(),
            intrinsics,
        }
    }

    /// Lower a single function body. On error the partial output is
    /// discarded; a body either lowers completely or not at all.
    pub fn lower_body(&mut self, body: &IrNode) -> Result<Vec<JsStatement>, BackendError> {
        BodyLowering::new(self).run(body)
    }

    /// Lower every function of a compilation unit in definition order.
    pub fn lower_program(
        &mut self,
        functions: &[Function],
    ) -> Result<Vec<LoweredFunction>, BackendError> {
        functions
            .iter()
            .map(|function| {
                let name = self.symbols.function(function.function)?.name.clone();
                let body = self.lower_body(&function.body)?;
                Ok(LoweredFunction { name, body })
            })
            .collect()
    }
}

/// Per-loop bookkeeping: the label hint carried by the source loop and the
/// number of break/continue references collected while the loop's extent was
/// being lowered. Jumps themselves are emitted with pending targets and
/// patched once the loop statement is assembled.
#[derive(Debug)]
struct LoopEntry {
    loop_id: LoopId,
    label_hint: Option<String>,
    breaks: usize,
    continues: usize,
}

#[derive(Debug, Clone, Copy)]
enum LoopKind {
    While,
    DoWhile,
}

#[derive(Debug, Clone, Copy)]
enum JumpKind {
    Break,
    Continue,
}

/// Tail-value capture for one value-producing conditional or try construct.
///
/// The temporary is declared eagerly so it precedes the construct's
/// statements, and removed again by [`BodyLowering::finish_capture`] if no
/// branch ever assigned it. `begin_capture` and `finish_capture` must run at
/// the same sink depth; `decl_index` points into that sink.
#[derive(Debug)]
struct ResultCapture {
    temp: Option<TempSlot>,
}

#[derive(Debug)]
struct TempSlot {
    name: String,
    decl_index: usize,
    assigned: bool,
}

/// Mutable lowering state scoped to one function body: the current statement
/// sink, the loop registry stack and catch-binding aliases. Never reused
/// across bodies.
struct BodyLowering<'a> {
    backend: &'a mut JsBackend,
    out: Vec<JsStatement>,
    loops: Vec<LoopEntry>,
    aliases: HashMap<VariableId, String>,
}

impl<'a> BodyLowering<'a> {
    fn new(backend: &'a mut JsBackend) -> Self {
        Self {
            backend,
            out: Vec::new(),
            loops: Vec::new(),
            aliases: HashMap::new(),
        }
    }

    fn run(mut self, body: &IrNode) -> Result<Vec<JsStatement>, BackendError> {
        self.discharge(body)?;
        Ok(self.out)
    }

    fn emit(&mut self, statement: JsStatement) {
        self.out.push(statement);
    }

    /// Redirect the sink to a fresh buffer for the duration of `lower`,
    /// returning the buffer's contents. The previous sink is restored on
    /// every exit path, including errors.
    fn lower_into<T>(
        &mut self,
        lower: impl FnOnce(&mut Self) -> Result<T, BackendError>,
    ) -> Result<(Vec<JsStatement>, T), BackendError> {
        let saved = mem::take(&mut self.out);
        let result = lower(self);
        let produced = mem::replace(&mut self.out, saved);
        Ok((produced, result?))
    }

    /// Lower a node and discard its value, if any, as an expression
    /// statement.
    fn discharge(&mut self, node: &IrNode) -> Result<(), BackendError> {
        if let Some(value) = self.lower(node)? {
            self.emit(JsStatement::Expression(value));
        }
        Ok(())
    }

    /// Lower a node that must produce a value in this context.
    fn lower_value(
        &mut self,
        node: &IrNode,
        context: &'static str,
    ) -> Result<JsExpression, BackendError> {
        self.lower(node)?
            .ok_or(BackendError::MissingValue { context })
    }

    /// Lower one IR node. Returns `Some` exactly when the node's static type
    /// is non-void and its kind is expression-representable; otherwise the
    /// node's effect has been appended to the current sink as statements.
    fn lower(&mut self, node: &IrNode) -> Result<Option<JsExpression>, BackendError> {
        match node {
            IrNode::Call {
                callee,
                dispatch_receiver,
                extension_receiver,
                arguments,
                ty,
            } => self.lower_call(
                *callee,
                dispatch_receiver.as_deref(),
                extension_receiver.as_deref(),
                arguments,
                *ty,
            ),

            IrNode::DelegatingConstructorCall { class, arguments } => {
                self.lower_delegating_constructor_call(*class, arguments)
            }

            IrNode::TypeOperator {
                op,
                operand,
                target,
                ..
            } => self.lower_type_operator(*op, operand, *target),

            IrNode::Block { children, ty } => self.lower_block(children, *ty),

            IrNode::VariableDeclaration {
                variable,
                initializer,
            } => {
                let init = match initializer {
                    Some(node) => Some(self.lower_value(node, "variable initializer")?),
                    None => None,
                };
                let name = self.variable_name(*variable)?;
                self.emit(JsStatement::VarDecl { name, init });
                Ok(None)
            }

            IrNode::ValueRead { variable, .. } => {
                Ok(Some(JsExpression::Name(self.variable_name(*variable)?)))
            }

            IrNode::VariableWrite { variable, value } => {
                let value = self.lower_value(value, "variable write value")?;
                let name = self.variable_name(*variable)?;
                self.emit(JsStatement::assignment(JsExpression::Name(name), value));
                Ok(None)
            }

            IrNode::FieldRead {
                field, receiver, ..
            } => {
                let reference = self.field_reference(*field, receiver.as_deref())?;
                Ok(Some(reference))
            }

            IrNode::FieldWrite {
                field,
                receiver,
                value,
            } => {
                let reference = self.field_reference(*field, receiver.as_deref())?;
                let value = self.lower_value(value, "field write value")?;
                self.emit(JsStatement::assignment(reference, value));
                Ok(None)
            }

            IrNode::WhileLoop {
                loop_id,
                label,
                condition,
                body,
            } => self.lower_loop(
                LoopKind::While,
                *loop_id,
                label.clone(),
                condition,
                body.as_deref(),
            ),

            IrNode::DoWhileLoop {
                loop_id,
                label,
                condition,
                body,
            } => self.lower_loop(
                LoopKind::DoWhile,
                *loop_id,
                label.clone(),
                condition,
                body.as_deref(),
            ),

            IrNode::MultiBranchConditional {
                branches,
                else_branch,
                ty,
            } => self.lower_conditional(branches, else_branch.as_deref(), *ty),

            IrNode::Break { loop_id } => {
                self.register_jump(*loop_id, JumpKind::Break)?;
                self.emit(JsStatement::Break {
                    target: JumpTarget::Pending(*loop_id),
                });
                Ok(None)
            }

            IrNode::Continue { loop_id } => {
                self.register_jump(*loop_id, JumpKind::Continue)?;
                self.emit(JsStatement::Continue {
                    target: JumpTarget::Pending(*loop_id),
                });
                Ok(None)
            }

            IrNode::Throw { value } => {
                let value = self.lower_value(value, "throw operand")?;
                self.emit(JsStatement::Throw { value });
                Ok(None)
            }

            IrNode::Return { value } => {
                match value {
                    Some(node) if !node.ty().is_void() => {
                        let value = self.lower_value(node, "return value")?;
                        self.emit(JsStatement::Return { value: Some(value) });
                    }
                    Some(node) => {
                        // A void-typed return value is lowered for its side
                        // effects only; the return itself carries no value.
                        self.discharge(node)?;
                        self.emit(JsStatement::Return { value: None });
                    }
                    None => self.emit(JsStatement::Return { value: None }),
                }
                Ok(None)
            }

            IrNode::TryWithHandlers {
                body,
                handlers,
                finally,
                ty,
            } => self.lower_try(body, handlers, finally.as_deref(), *ty),

            IrNode::Constant { value, .. } => Ok(Some(encode_constant(value)?)),
        }
    }

    // ---------------------------------------------------------------------
    // Calls

    fn lower_call(
        &mut self,
        callee: FunctionId,
        dispatch_receiver: Option<&IrNode>,
        extension_receiver: Option<&IrNode>,
        arguments: &[Option<IrNode>],
        ty: IrType,
    ) -> Result<Option<JsExpression>, BackendError> {
        let function = self.backend.symbols.function(callee)?.clone();

        // Receivers and arguments lower first, in source order. A defaulted
        // optional argument becomes an explicit `undefined` so the argument
        // list length always equals the formal parameter count.
        let dispatch = match dispatch_receiver {
            Some(node) => Some(self.lower_value(node, "call dispatch receiver")?),
            None => None,
        };
        let extension = match extension_receiver {
            Some(node) => Some(self.lower_value(node, "call extension receiver")?),
            None => None,
        };
        let mut args = Vec::with_capacity(function.param_count);
        for argument in arguments {
            match argument {
                Some(node) => args.push(self.lower_value(node, "call argument")?),
                None => args.push(JsExpression::undefined()),
            }
        }
        while args.len() < function.param_count {
            args.push(JsExpression::undefined());
        }

        if let Some(lowering) = self.backend.intrinsics.lookup(callee).cloned() {
            return self.apply_intrinsic(&lowering, dispatch, extension, args);
        }

        if let Some(accessor) = &function.accessor {
            let property = self.backend.symbols.property(accessor.property)?.clone();
            if !property.needs_accessors || property.local_top_level {
                // The property's storage is a direct field; skip the
                // accessor function entirely.
                let reference = match dispatch {
                    Some(receiver) => JsExpression::member(receiver, property.name),
                    None => JsExpression::Name(property.name),
                };
                return match accessor.kind {
                    AccessorKind::Getter => Ok(Some(reference)),
                    AccessorKind::Setter => {
                        let value =
                            args.into_iter()
                                .next()
                                .ok_or(BackendError::MissingValue {
                                    context: "property setter argument",
                                })?;
                        self.emit(JsStatement::assignment(reference, value));
                        Ok(None)
                    }
                };
            }
        }

        // Ordinary invocation: receiver-qualified member reference when a
        // dispatch receiver exists, static reference otherwise. The
        // extension receiver is passed as the leading argument.
        let mut all_arguments = Vec::with_capacity(args.len() + 1);
        if let Some(extension) = extension {
            all_arguments.push(extension);
        }
        all_arguments.extend(args);
        let callee_expr = match dispatch {
            Some(receiver) => JsExpression::member(receiver, function.name),
            None => JsExpression::Name(function.name),
        };
        let call = JsExpression::call(callee_expr, all_arguments);
        if ty.is_void() {
            self.emit(JsStatement::Expression(call));
            Ok(None)
        } else {
            Ok(Some(call))
        }
    }

    fn apply_intrinsic(
        &mut self,
        lowering: &IntrinsicLowering,
        dispatch: Option<JsExpression>,
        extension: Option<JsExpression>,
        args: Vec<JsExpression>,
    ) -> Result<Option<JsExpression>, BackendError> {
        let mut operands = dispatch.into_iter().chain(extension).chain(args);
        match lowering {
            IntrinsicLowering::BinaryOp(op) => {
                let left = operands.next().ok_or(BackendError::MissingValue {
                    context: "binary intrinsic operand",
                })?;
                let right = operands.next().ok_or(BackendError::MissingValue {
                    context: "binary intrinsic operand",
                })?;
                Ok(Some(JsExpression::binary(*op, left, right)))
            }
            IntrinsicLowering::UnaryOp(op) => {
                let operand = operands.next().ok_or(BackendError::MissingValue {
                    context: "unary intrinsic operand",
                })?;
                Ok(Some(JsExpression::Unary {
                    op: *op,
                    operand: Box::new(operand),
                }))
            }
            IntrinsicLowering::RuntimeCall(helper) => Ok(Some(JsExpression::call(
                JsExpression::name(helper.clone()),
                operands.collect(),
            ))),
            IntrinsicLowering::RuntimeStatement(helper) => {
                self.emit(JsStatement::Expression(JsExpression::call(
                    JsExpression::name(helper.clone()),
                    operands.collect(),
                )));
                Ok(None)
            }
        }
    }

    fn lower_delegating_constructor_call(
        &mut self,
        class: ClassId,
        arguments: &[IrNode],
    ) -> Result<Option<JsExpression>, BackendError> {
        let constructor = self.backend.symbols.class(class)?.name.clone();
        let mut lowered = Vec::with_capacity(arguments.len() + 1);
        lowered.push(JsExpression::This);
        for argument in arguments {
            lowered.push(self.lower_value(argument, "constructor argument")?);
        }
        self.emit(JsStatement::Expression(JsExpression::call(
            JsExpression::member(JsExpression::Name(constructor), "call"),
            lowered,
        )));
        Ok(None)
    }

    // ---------------------------------------------------------------------
    // Type operators

    fn lower_type_operator(
        &mut self,
        op: TypeOperatorKind,
        operand: &IrNode,
        target: ClassId,
    ) -> Result<Option<JsExpression>, BackendError> {
        let operand = self.lower_value(operand, "type operator operand")?;
        match op {
            TypeOperatorKind::InstanceOf => Ok(Some(self.type_test(target, operand)?)),
            TypeOperatorKind::NotInstanceOf => {
                Ok(Some(JsExpression::not(self.type_test(target, operand)?)))
            }
            TypeOperatorKind::Cast | TypeOperatorKind::SafeCast => {
                // The operand must be evaluated once, so it is staged into a
                // temporary that both the test and the success arm read.
                let temp = self.backend.names.fresh();
                self.emit(JsStatement::VarDecl {
                    name: temp.clone(),
                    init: Some(operand),
                });
                let test = self.type_test(target, JsExpression::name(&temp))?;
                let failure = match op {
                    TypeOperatorKind::Cast => {
                        JsExpression::call(JsExpression::name(CLASS_CAST_HELPER), vec![])
                    }
                    _ => JsExpression::null(),
                };
                Ok(Some(JsExpression::conditional(
                    test,
                    JsExpression::Name(temp),
                    failure,
                )))
            }
        }
    }

    /// Runtime membership test of a value against a class.
    fn type_test(
        &self,
        class: ClassId,
        value: JsExpression,
    ) -> Result<JsExpression, BackendError> {
        let constructor = self.backend.symbols.class(class)?.name.clone();
        Ok(JsExpression::binary(
            JsBinaryOp::InstanceOf,
            value,
            JsExpression::Name(constructor),
        ))
    }

    // ---------------------------------------------------------------------
    // Blocks and references

    fn lower_block(
        &mut self,
        children: &[IrNode],
        ty: IrType,
    ) -> Result<Option<JsExpression>, BackendError> {
        let Some((last, init)) = children.split_last() else {
            return Ok(None);
        };
        for child in init {
            self.discharge(child)?;
        }
        if ty.is_void() {
            self.discharge(last)?;
            Ok(None)
        } else {
            self.lower(last)
        }
    }

    fn variable_name(&self, variable: VariableId) -> Result<String, BackendError> {
        if let Some(alias) = self.aliases.get(&variable) {
            return Ok(alias.clone());
        }
        Ok(self.backend.symbols.variable(variable)?.name.clone())
    }

    fn field_reference(
        &mut self,
        field: FieldId,
        receiver: Option<&IrNode>,
    ) -> Result<JsExpression, BackendError> {
        let info = self.backend.symbols.field(field)?.clone();
        if info.instance {
            let receiver = receiver.ok_or(BackendError::MissingValue {
                context: "instance field receiver",
            })?;
            let object = self.lower_value(receiver, "field receiver")?;
            Ok(JsExpression::member(object, info.name))
        } else {
            Ok(JsExpression::Name(info.name))
        }
    }

    // ---------------------------------------------------------------------
    // Loops

    fn register_jump(&mut self, loop_id: LoopId, kind: JumpKind) -> Result<(), BackendError> {
        let entry = self
            .loops
            .iter_mut()
            .rev()
            .find(|entry| entry.loop_id == loop_id)
            .ok_or(BackendError::JumpOutsideLoop { loop_id: loop_id.0 })?;
        match kind {
            JumpKind::Break => entry.breaks += 1,
            JumpKind::Continue => entry.continues += 1,
        }
        Ok(())
    }

    fn lower_loop(
        &mut self,
        kind: LoopKind,
        loop_id: LoopId,
        label: Option<String>,
        condition: &IrNode,
        body: Option<&IrNode>,
    ) -> Result<Option<JsExpression>, BackendError> {
        self.loops.push(LoopEntry {
            loop_id,
            label_hint: label,
            breaks: 0,
            continues: 0,
        });
        let parts = self.lower_loop_parts(condition, body);
        let entry = self.loops.pop().expect("loop entry pushed above");
        let (body_stmts, cond_stmts, cond_expr) = parts?;

        let mut needs_label = entry.breaks + entry.continues > 0;
        let mut stmt = match kind {
            LoopKind::While if cond_stmts.is_empty() => JsStatement::While {
                test: cond_expr,
                body: Box::new(JsStatement::Block(body_stmts)),
            },
            LoopKind::While => {
                // The condition needs statements of its own, which a natural
                // pre-test loop cannot run before each iteration. Emit an
                // always-true loop: condition statements, a negated break
                // guard, then the body.
                let mut inner = cond_stmts;
                inner.push(JsStatement::If {
                    test: JsExpression::not(cond_expr),
                    then_branch: Box::new(JsStatement::Break {
                        target: JumpTarget::Resolved(None),
                    }),
                    else_branch: None,
                });
                inner.extend(body_stmts);
                JsStatement::While {
                    test: JsExpression::boolean(true),
                    body: Box::new(JsStatement::Block(inner)),
                }
            }
            LoopKind::DoWhile => {
                let inner = if !cond_stmts.is_empty() && entry.continues > 0 {
                    // A continue must reach the staged condition statements,
                    // not restart the loop, so continues become breaks out
                    // of a label wrapping exactly the body statements. Once
                    // rewritten they no longer reference the outer label.
                    let inner_label = self.backend.names.fresh_from("inner");
                    let mut body_stmts = body_stmts;
                    rewrite_continues_as_breaks(&mut body_stmts, loop_id, &inner_label);
                    needs_label = entry.breaks > 0;
                    let mut inner = vec![JsStatement::Labeled {
                        label: inner_label,
                        body: Box::new(JsStatement::Block(body_stmts)),
                    }];
                    inner.extend(cond_stmts);
                    inner
                } else {
                    let mut inner = body_stmts;
                    inner.extend(cond_stmts);
                    inner
                };
                JsStatement::DoWhile {
                    body: Box::new(JsStatement::Block(inner)),
                    test: cond_expr,
                }
            }
        };

        if needs_label {
            let label = match entry.label_hint {
                Some(name) => name,
                None => self.backend.names.fresh_from("loop"),
            };
            patch_pending_jumps(&mut stmt, loop_id, &label);
            stmt = JsStatement::Labeled {
                label,
                body: Box::new(stmt),
            };
        }
        self.emit(stmt);
        Ok(None)
    }

    fn lower_loop_parts(
        &mut self,
        condition: &IrNode,
        body: Option<&IrNode>,
    ) -> Result<(Vec<JsStatement>, Vec<JsStatement>, JsExpression), BackendError> {
        let (body_stmts, ()) = self.lower_into(|this| match body {
            Some(node) => this.discharge(node),
            None => Ok(()),
        })?;
        let (cond_stmts, cond_expr) =
            self.lower_into(|this| this.lower_value(condition, "loop condition"))?;
        Ok((body_stmts, cond_stmts, cond_expr))
    }

    // ---------------------------------------------------------------------
    // Tail-value capture

    fn begin_capture(&mut self, ty: IrType) -> ResultCapture {
        if ty.is_void() {
            return ResultCapture { temp: None };
        }
        let name = self.backend.names.fresh();
        let decl_index = self.out.len();
        self.emit(JsStatement::VarDecl {
            name: name.clone(),
            init: None,
        });
        ResultCapture {
            temp: Some(TempSlot {
                name,
                decl_index,
                assigned: false,
            }),
        }
    }

    /// Lower one branch body through the capture: assign its value into the
    /// temporary if one exists, discharge it as a statement if not.
    fn capture_branch(
        &mut self,
        capture: &mut ResultCapture,
        node: &IrNode,
    ) -> Result<(), BackendError> {
        let value = self.lower(node)?;
        match (&mut capture.temp, value) {
            (Some(slot), Some(value)) => {
                slot.assigned = true;
                let target = JsExpression::name(slot.name.clone());
                self.emit(JsStatement::assignment(target, value));
            }
            (None, Some(value)) => {
                // The enclosing context is void; the value is intentionally
                // unused.
                self.emit(JsStatement::Expression(value));
            }
            (_, None) => {}
        }
        Ok(())
    }

    fn finish_capture(&mut self, capture: ResultCapture) -> Option<JsExpression> {
        match capture.temp {
            Some(slot) if slot.assigned => Some(JsExpression::Name(slot.name)),
            Some(slot) => {
                // Every branch diverged or was void; drop the unused
                // declaration instead of emitting a dead statement.
                debug_assert!(matches!(
                    self.out.get(slot.decl_index),
                    Some(JsStatement::VarDecl { .. })
                ));
                self.out.remove(slot.decl_index);
                None
            }
            None => None,
        }
    }

    // ---------------------------------------------------------------------
    // Multi-branch conditionals

    fn lower_conditional(
        &mut self,
        branches: &[ConditionalBranch],
        else_branch: Option<&IrNode>,
        ty: IrType,
    ) -> Result<Option<JsExpression>, BackendError> {
        let mut capture = self.begin_capture(ty);
        let chain_start = self.out.len();
        self.lower_conditional_chain(branches, else_branch, &mut capture)?;
        for statement in self.out[chain_start..].iter_mut() {
            simplify::collapse_conditional_arms(statement);
        }
        Ok(self.finish_capture(capture))
    }

    fn lower_conditional_chain(
        &mut self,
        branches: &[ConditionalBranch],
        else_branch: Option<&IrNode>,
        capture: &mut ResultCapture,
    ) -> Result<(), BackendError> {
        let Some((first, rest)) = branches.split_first() else {
            // The unconditional else lowers straight into the current sink.
            if let Some(node) = else_branch {
                self.capture_branch(capture, node)?;
            }
            return Ok(());
        };
        let test = self.lower_value(&first.condition, "conditional branch condition")?;
        let (then_stmts, ()) =
            self.lower_into(|this| this.capture_branch(capture, &first.result))?;
        // The remaining branches chain into this conditional's else arm, so
        // a later condition's staged statements run only after the earlier
        // tests have failed.
        let (else_stmts, ()) =
            self.lower_into(|this| this.lower_conditional_chain(rest, else_branch, capture))?;
        self.emit(JsStatement::If {
            test,
            then_branch: Box::new(JsStatement::Block(then_stmts)),
            else_branch: Some(Box::new(JsStatement::Block(else_stmts))),
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Exception handling

    fn lower_try(
        &mut self,
        body: &IrNode,
        handlers: &[HandlerClause],
        finally: Option<&IrNode>,
        ty: IrType,
    ) -> Result<Option<JsExpression>, BackendError> {
        let mut capture = self.begin_capture(ty);
        let (try_stmts, ()) = self.lower_into(|this| this.capture_branch(&mut capture, body))?;

        let catch = if handlers.is_empty() {
            None
        } else {
            Some(self.lower_handlers(handlers, &mut capture)?)
        };

        let finally_stmts = match finally {
            Some(node) => {
                // A finally clause never contributes to the construct's
                // value; its own result is discharged.
                let (stmts, ()) = self.lower_into(|this| this.discharge(node))?;
                Some(stmts)
            }
            None => None,
        };

        self.emit(JsStatement::Try {
            body: try_stmts,
            catch,
            finally: finally_stmts,
        });
        Ok(self.finish_capture(capture))
    }

    fn lower_handlers(
        &mut self,
        handlers: &[HandlerClause],
        capture: &mut ResultCapture,
    ) -> Result<JsCatch, BackendError> {
        // One binding serves every clause: the declared parameter name when
        // all clauses agree on it, a fresh name otherwise. Each clause's own
        // parameter is aliased to the binding.
        let mut declared = Vec::with_capacity(handlers.len());
        for handler in handlers {
            declared.push(self.backend.symbols.variable(handler.parameter)?.name.clone());
        }
        let binding = if declared.iter().all(|name| name == &declared[0]) {
            declared[0].clone()
        } else {
            self.backend.names.fresh_from("e")
        };

        // Clauses are tested in declaration order; the first match wins.
        // This reproduces sequential type matching, not most-specific-type
        // dispatch.
        let mut clauses = Vec::with_capacity(handlers.len());
        for handler in handlers {
            let class = match handler.exception_type {
                IrType::Class(class) => class,
                ty => return Err(BackendError::NonClassCatchType { ty }),
            };
            let test = self.type_test(class, JsExpression::name(&binding))?;
            self.aliases.insert(handler.parameter, binding.clone());
            let (clause_stmts, ()) =
                self.lower_into(|this| this.capture_branch(capture, &handler.body))?;
            clauses.push((test, clause_stmts));
        }

        // No clause matched: rethrow rather than swallow the exception.
        let mut chain = JsStatement::Throw {
            value: JsExpression::name(&binding),
        };
        for (test, clause_stmts) in clauses.into_iter().rev() {
            chain = JsStatement::If {
                test,
                then_branch: Box::new(JsStatement::Block(clause_stmts)),
                else_branch: Some(Box::new(chain)),
            };
        }

        Ok(JsCatch {
            parameter: binding,
            body: vec![chain],
        })
    }
}

// -------------------------------------------------------------------------
// Constants

/// Encode an IR constant as a JavaScript literal expression. 64-bit integers
/// become a two-word runtime construction; see [`split_long`].
fn encode_constant(value: &ConstantValue) -> Result<JsExpression, BackendError> {
    match value {
        ConstantValue::Str(value) => Ok(JsExpression::Literal(JsLiteral::Str(value.clone()))),
        ConstantValue::Boolean(value) => Ok(JsExpression::Literal(JsLiteral::Boolean(*value))),
        ConstantValue::Int(value) => Ok(JsExpression::Literal(JsLiteral::Int(*value as i64))),
        ConstantValue::Double(value) => Ok(JsExpression::Literal(JsLiteral::Double(*value))),
        ConstantValue::Null => Ok(JsExpression::Literal(JsLiteral::Null)),
        ConstantValue::Long(value) => {
            let (low, high) = split_long(*value);
            Ok(JsExpression::new_instance(
                JsExpression::name(WIDE_INT_CONSTRUCTOR),
                vec![
                    JsExpression::Literal(JsLiteral::Int(low as i64)),
                    JsExpression::Literal(JsLiteral::Int(high as i64)),
                ],
            ))
        }
        ConstantValue::Char(_) => Err(BackendError::UnsupportedConstant {
            kind: "char".to_string(),
        }),
    }
}

// -------------------------------------------------------------------------
// Jump patching

/// Apply `apply` to every break and continue statement in a subtree.
fn for_each_jump(statement: &mut JsStatement, apply: &mut impl FnMut(&mut JsStatement)) {
    match statement {
        JsStatement::Break { .. } | JsStatement::Continue { .. } => apply(statement),
        JsStatement::Block(statements) => {
            for statement in statements {
                for_each_jump(statement, apply);
            }
        }
        JsStatement::If {
            then_branch,
            else_branch,
            ..
        } => {
            for_each_jump(then_branch, apply);
            if let Some(else_branch) = else_branch {
                for_each_jump(else_branch, apply);
            }
        }
        JsStatement::While { body, .. }
        | JsStatement::DoWhile { body, .. }
        | JsStatement::Labeled { body, .. } => for_each_jump(body, apply),
        JsStatement::Try {
            body,
            catch,
            finally,
        } => {
            for statement in body {
                for_each_jump(statement, apply);
            }
            if let Some(catch) = catch {
                for statement in &mut catch.body {
                    for_each_jump(statement, apply);
                }
            }
            if let Some(finally) = finally {
                for statement in finally {
                    for_each_jump(statement, apply);
                }
            }
        }
        JsStatement::Expression(_)
        | JsStatement::VarDecl { .. }
        | JsStatement::Return { .. }
        | JsStatement::Throw { .. } => {}
    }
}

/// Phase 2 of jump resolution: give every jump still pending on `loop_id`
/// its final label. Jumps of nested loops were resolved when those loops
/// finished, so they are never touched here.
fn patch_pending_jumps(statement: &mut JsStatement, loop_id: LoopId, label: &str) {
    for_each_jump(statement, &mut |jump| {
        if let JsStatement::Break { target } | JsStatement::Continue { target } = jump {
            if *target == JumpTarget::Pending(loop_id) {
                *target = JumpTarget::Resolved(Some(label.to_string()));
            }
        }
    });
}

/// Rewrite every continue pending on `loop_id` into a break out of `label`.
/// Used by do-while lowering when the condition staged statements that a
/// continue must still reach.
fn rewrite_continues_as_breaks(statements: &mut [JsStatement], loop_id: LoopId, label: &str) {
    for statement in statements {
        for_each_jump(statement, &mut |jump| {
            if let JsStatement::Continue { target } = jump {
                if *target == JumpTarget::Pending(loop_id) {
                    *jump = JsStatement::Break {
                        target: JumpTarget::Resolved(Some(label.to_string())),
                    };
                }
            }
        });
    }
}

#[cfg(test)]
mod tests;
