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

use super::*;
use crate::ir::{ClassInfo, FunctionInfo, PropertyAccessor, PropertyInfo, VariableInfo};
use crate::js::ast::JsUnaryOp;

fn int(value: i32) -> IrNode {
    IrNode::Constant {
        value: ConstantValue::Int(value),
        ty: IrType::Int,
    }
}

fn boolean(value: bool) -> IrNode {
    IrNode::Constant {
        value: ConstantValue::Boolean(value),
        ty: IrType::Boolean,
    }
}

fn empty_backend() -> JsBackend {
    JsBackend::new(SymbolTable::new(), IntrinsicTable::new())
}

#[test]
fn constants_map_one_to_one() {
    let mut backend = empty_backend();
    let body = IrNode::Return {
        value: Some(Box::new(IrNode::Constant {
            value: ConstantValue::Str("hello".to_string()),
            ty: IrType::Str,
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(
        output,
        vec![JsStatement::Return {
            value: Some(JsExpression::Literal(JsLiteral::Str("hello".to_string()))),
        }]
    );
}

#[test]
fn wide_integer_constants_split_into_two_words() {
    let mut backend = empty_backend();
    let body = IrNode::Return {
        value: Some(Box::new(IrNode::Constant {
            value: ConstantValue::Long(4294967296),
            ty: IrType::Long,
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    match &output[0] {
        JsStatement::Return { value: Some(JsExpression::New { callee, arguments }) } => {
            assert_eq!(**callee, JsExpression::name(WIDE_INT_CONSTRUCTOR));
            assert_eq!(
                arguments,
                &vec![
                    JsExpression::Literal(JsLiteral::Int(0)),
                    JsExpression::Literal(JsLiteral::Int(1)),
                ]
            );
        }
        other => panic!("expected two-word construction, got {:?}", other),
    }
}

#[test]
fn char_constants_are_rejected() {
    let mut backend = empty_backend();
    let body = IrNode::Return {
        value: Some(Box::new(IrNode::Constant {
            value: ConstantValue::Char(65),
            ty: IrType::Int,
        })),
    };
    let err = backend.lower_body(&body).expect_err("char must be rejected");
    assert_eq!(
        err,
        BackendError::UnsupportedConstant {
            kind: "char".to_string(),
        }
    );
}

#[test]
fn split_long_word_boundaries() {
    assert_eq!(split_long(0), (0, 0));
    assert_eq!(split_long(1), (1, 0));
    assert_eq!(split_long(4294967296), (0, 1));
    assert_eq!(split_long(-1), (0xFFFF_FFFF, 0xFFFF_FFFF));
    assert_eq!(split_long(i64::MIN), (0, 0x8000_0000));
}

#[test]
fn block_discards_non_last_values_and_yields_the_last() {
    let mut symbols = SymbolTable::new();
    let variable = symbols.declare_variable(VariableInfo {
        name: "x".to_string(),
    });
    let mut backend = JsBackend::new(symbols, IntrinsicTable::new());

    let body = IrNode::Return {
        value: Some(Box::new(IrNode::Block {
            children: vec![
                int(1),
                IrNode::ValueRead {
                    variable,
                    ty: IrType::Int,
                },
            ],
            ty: IrType::Int,
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(
        output,
        vec![
            JsStatement::Expression(JsExpression::Literal(JsLiteral::Int(1))),
            JsStatement::Return {
                value: Some(JsExpression::name("x")),
            },
        ]
    );
}

#[test]
fn void_block_discharges_its_last_child_too() {
    let mut backend = empty_backend();
    let body = IrNode::Block {
        children: vec![int(1), int(2)],
        ty: IrType::Void,
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(output.len(), 2);
    assert!(output
        .iter()
        .all(|statement| matches!(statement, JsStatement::Expression(_))));
}

#[test]
fn break_outside_any_loop_is_fatal() {
    let mut backend = empty_backend();
    let body = IrNode::Break { loop_id: LoopId(7) };
    let err = backend.lower_body(&body).expect_err("jump must be rejected");
    assert_eq!(err, BackendError::JumpOutsideLoop { loop_id: 7 });
}

#[test]
fn continue_targeting_a_foreign_loop_is_fatal() {
    let mut backend = empty_backend();
    // A while loop whose body continues a loop that is not on the stack.
    let body = IrNode::WhileLoop {
        loop_id: LoopId(0),
        label: None,
        condition: Box::new(boolean(true)),
        body: Some(Box::new(IrNode::Continue { loop_id: LoopId(9) })),
    };
    let err = backend.lower_body(&body).expect_err("jump must be rejected");
    assert_eq!(err, BackendError::JumpOutsideLoop { loop_id: 9 });
}

#[test]
fn dangling_symbol_id_is_fatal() {
    let mut backend = empty_backend();
    let body = IrNode::ValueRead {
        variable: VariableId(3),
        ty: IrType::Int,
    };
    let err = backend.lower_body(&body).expect_err("unknown id must be rejected");
    assert_eq!(
        err,
        BackendError::UnknownSymbol {
            kind: "variable",
            id: 3,
        }
    );
}

#[test]
fn value_required_from_statement_only_node_is_fatal() {
    let mut backend = empty_backend();
    // Throwing a return statement's "value" makes no sense; the visitor must
    // refuse rather than silently drop the node.
    let body = IrNode::Throw {
        value: Box::new(IrNode::Return { value: None }),
    };
    let err = backend.lower_body(&body).expect_err("missing value must be rejected");
    assert!(matches!(err, BackendError::MissingValue { .. }));
}

#[test]
fn binary_intrinsic_replaces_the_call() {
    let mut symbols = SymbolTable::new();
    let plus = symbols.declare_function(FunctionInfo {
        name: "plus".to_string(),
        param_count: 1,
        accessor: None,
    });
    let mut intrinsics = IntrinsicTable::new();
    intrinsics.register(plus, IntrinsicLowering::BinaryOp(JsBinaryOp::Add));
    let mut backend = JsBackend::new(symbols, intrinsics);

    let body = IrNode::Return {
        value: Some(Box::new(IrNode::Call {
            callee: plus,
            dispatch_receiver: Some(Box::new(int(1))),
            extension_receiver: None,
            arguments: vec![Some(int(2))],
            ty: IrType::Int,
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(
        output,
        vec![JsStatement::Return {
            value: Some(JsExpression::binary(
                JsBinaryOp::Add,
                JsExpression::Literal(JsLiteral::Int(1)),
                JsExpression::Literal(JsLiteral::Int(2)),
            )),
        }]
    );
}

#[test]
fn unary_intrinsic_applies_to_the_receiver() {
    let mut symbols = SymbolTable::new();
    let not = symbols.declare_function(FunctionInfo {
        name: "not".to_string(),
        param_count: 0,
        accessor: None,
    });
    let mut intrinsics = IntrinsicTable::new();
    intrinsics.register(not, IntrinsicLowering::UnaryOp(JsUnaryOp::Not));
    let mut backend = JsBackend::new(symbols, intrinsics);

    let body = IrNode::Return {
        value: Some(Box::new(IrNode::Call {
            callee: not,
            dispatch_receiver: Some(Box::new(boolean(true))),
            extension_receiver: None,
            arguments: vec![],
            ty: IrType::Boolean,
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(
        output,
        vec![JsStatement::Return {
            value: Some(JsExpression::not(JsExpression::Literal(JsLiteral::Boolean(
                true
            )))),
        }]
    );
}

#[test]
fn runtime_statement_intrinsic_discharges_the_call() {
    let mut symbols = SymbolTable::new();
    let log = symbols.declare_function(FunctionInfo {
        name: "log".to_string(),
        param_count: 1,
        accessor: None,
    });
    let mut intrinsics = IntrinsicTable::new();
    intrinsics.register(log, IntrinsicLowering::RuntimeStatement("consoleLog".to_string()));
    let mut backend = JsBackend::new(symbols, intrinsics);

    let body = IrNode::Call {
        callee: log,
        dispatch_receiver: None,
        extension_receiver: None,
        arguments: vec![Some(int(42))],
        ty: IrType::Void,
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(
        output,
        vec![JsStatement::Expression(JsExpression::call(
            JsExpression::name("consoleLog"),
            vec![JsExpression::Literal(JsLiteral::Int(42))],
        ))]
    );
}

#[test]
fn direct_field_property_getter_becomes_a_field_read() {
    let mut symbols = SymbolTable::new();
    let property = symbols.declare_property(PropertyInfo {
        name: "size".to_string(),
        needs_accessors: false,
        local_top_level: false,
    });
    let getter = symbols.declare_function(FunctionInfo {
        name: "getSize".to_string(),
        param_count: 0,
        accessor: Some(PropertyAccessor {
            property,
            kind: AccessorKind::Getter,
        }),
    });
    let receiver_var = symbols.declare_variable(VariableInfo {
        name: "list".to_string(),
    });
    let mut backend = JsBackend::new(symbols, IntrinsicTable::new());

    let body = IrNode::Return {
        value: Some(Box::new(IrNode::Call {
            callee: getter,
            dispatch_receiver: Some(Box::new(IrNode::ValueRead {
                variable: receiver_var,
                ty: IrType::Class(ClassId(0)),
            })),
            extension_receiver: None,
            arguments: vec![],
            ty: IrType::Int,
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(
        output,
        vec![JsStatement::Return {
            value: Some(JsExpression::member(JsExpression::name("list"), "size")),
        }]
    );
}

#[test]
fn direct_field_property_setter_becomes_an_assignment_statement() {
    let mut symbols = SymbolTable::new();
    let property = symbols.declare_property(PropertyInfo {
        name: "count".to_string(),
        needs_accessors: true,
        local_top_level: true,
    });
    let setter = symbols.declare_function(FunctionInfo {
        name: "setCount".to_string(),
        param_count: 1,
        accessor: Some(PropertyAccessor {
            property,
            kind: AccessorKind::Setter,
        }),
    });
    let mut backend = JsBackend::new(symbols, IntrinsicTable::new());

    let body = IrNode::Call {
        callee: setter,
        dispatch_receiver: None,
        extension_receiver: None,
        arguments: vec![Some(int(5))],
        ty: IrType::Void,
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(
        output,
        vec![JsStatement::assignment(
            JsExpression::name("count"),
            JsExpression::Literal(JsLiteral::Int(5)),
        )]
    );
}

#[test]
fn accessor_needing_functions_lowers_as_an_ordinary_call() {
    let mut symbols = SymbolTable::new();
    let property = symbols.declare_property(PropertyInfo {
        name: "size".to_string(),
        needs_accessors: true,
        local_top_level: false,
    });
    let getter = symbols.declare_function(FunctionInfo {
        name: "getSize".to_string(),
        param_count: 0,
        accessor: Some(PropertyAccessor {
            property,
            kind: AccessorKind::Getter,
        }),
    });
    let mut backend = JsBackend::new(symbols, IntrinsicTable::new());

    let body = IrNode::Return {
        value: Some(Box::new(IrNode::Call {
            callee: getter,
            dispatch_receiver: None,
            extension_receiver: None,
            arguments: vec![],
            ty: IrType::Int,
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(
        output,
        vec![JsStatement::Return {
            value: Some(JsExpression::call(JsExpression::name("getSize"), vec![])),
        }]
    );
}

#[test]
fn extension_receiver_is_prepended_to_arguments() {
    let mut symbols = SymbolTable::new();
    let callee = symbols.declare_function(FunctionInfo {
        name: "pad".to_string(),
        param_count: 1,
        accessor: None,
    });
    let receiver_var = symbols.declare_variable(VariableInfo {
        name: "text".to_string(),
    });
    let mut backend = JsBackend::new(symbols, IntrinsicTable::new());

    let body = IrNode::Return {
        value: Some(Box::new(IrNode::Call {
            callee,
            dispatch_receiver: None,
            extension_receiver: Some(Box::new(IrNode::ValueRead {
                variable: receiver_var,
                ty: IrType::Str,
            })),
            arguments: vec![Some(int(4))],
            ty: IrType::Str,
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(
        output,
        vec![JsStatement::Return {
            value: Some(JsExpression::call(
                JsExpression::name("pad"),
                vec![
                    JsExpression::name("text"),
                    JsExpression::Literal(JsLiteral::Int(4)),
                ],
            )),
        }]
    );
}

#[test]
fn delegating_constructor_call_binds_this() {
    let mut symbols = SymbolTable::new();
    let class = symbols.declare_class(ClassInfo {
        name: "Base".to_string(),
    });
    let mut backend = JsBackend::new(symbols, IntrinsicTable::new());

    let body = IrNode::DelegatingConstructorCall {
        class,
        arguments: vec![int(1)],
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(
        output,
        vec![JsStatement::Expression(JsExpression::call(
            JsExpression::member(JsExpression::name("Base"), "call"),
            vec![JsExpression::This, JsExpression::Literal(JsLiteral::Int(1))],
        ))]
    );
}

#[test]
fn checked_cast_stages_the_operand_once() {
    let mut symbols = SymbolTable::new();
    let class = symbols.declare_class(ClassInfo {
        name: "Widget".to_string(),
    });
    let variable = symbols.declare_variable(VariableInfo {
        name: "value".to_string(),
    });
    let mut backend = JsBackend::new(symbols, IntrinsicTable::new());

    let body = IrNode::Return {
        value: Some(Box::new(IrNode::TypeOperator {
            op: TypeOperatorKind::Cast,
            operand: Box::new(IrNode::ValueRead {
                variable,
                ty: IrType::Class(class),
            }),
            target: class,
            ty: IrType::Class(class),
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(output.len(), 2);
    let temp = match &output[0] {
        JsStatement::VarDecl { name, init: Some(init) } => {
            assert_eq!(init, &JsExpression::name("value"));
            name.clone()
        }
        other => panic!("expected staged operand, got {:?}", other),
    };
    assert_eq!(
        output[1],
        JsStatement::Return {
            value: Some(JsExpression::conditional(
                JsExpression::binary(
                    JsBinaryOp::InstanceOf,
                    JsExpression::name(temp.clone()),
                    JsExpression::name("Widget"),
                ),
                JsExpression::name(temp),
                JsExpression::call(JsExpression::name(CLASS_CAST_HELPER), vec![]),
            )),
        }
    );
}

#[test]
fn safe_cast_fails_to_null() {
    let mut symbols = SymbolTable::new();
    let class = symbols.declare_class(ClassInfo {
        name: "Widget".to_string(),
    });
    let variable = symbols.declare_variable(VariableInfo {
        name: "value".to_string(),
    });
    let mut backend = JsBackend::new(symbols, IntrinsicTable::new());

    let body = IrNode::Return {
        value: Some(Box::new(IrNode::TypeOperator {
            op: TypeOperatorKind::SafeCast,
            operand: Box::new(IrNode::ValueRead {
                variable,
                ty: IrType::Class(class),
            }),
            target: class,
            ty: IrType::Class(class),
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    match &output[1] {
        JsStatement::Return {
            value: Some(JsExpression::Conditional { alternate, .. }),
        } => assert_eq!(**alternate, JsExpression::null()),
        other => panic!("expected conditional with null failure arm, got {:?}", other),
    }
}

#[test]
fn negated_instance_test_needs_no_temporary() {
    let mut symbols = SymbolTable::new();
    let class = symbols.declare_class(ClassInfo {
        name: "Widget".to_string(),
    });
    let variable = symbols.declare_variable(VariableInfo {
        name: "value".to_string(),
    });
    let mut backend = JsBackend::new(symbols, IntrinsicTable::new());

    let body = IrNode::Return {
        value: Some(Box::new(IrNode::TypeOperator {
            op: TypeOperatorKind::NotInstanceOf,
            operand: Box::new(IrNode::ValueRead {
                variable,
                ty: IrType::Class(class),
            }),
            target: class,
            ty: IrType::Boolean,
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(
        output,
        vec![JsStatement::Return {
            value: Some(JsExpression::not(JsExpression::binary(
                JsBinaryOp::InstanceOf,
                JsExpression::name("value"),
                JsExpression::name("Widget"),
            ))),
        }]
    );
}

#[test]
fn non_class_catch_type_is_fatal() {
    let mut symbols = SymbolTable::new();
    let parameter = symbols.declare_variable(VariableInfo {
        name: "e".to_string(),
    });
    let mut backend = JsBackend::new(symbols, IntrinsicTable::new());

    let body = IrNode::TryWithHandlers {
        body: Box::new(int(1)),
        handlers: vec![HandlerClause {
            parameter,
            exception_type: IrType::Int,
            body: int(2),
        }],
        finally: None,
        ty: IrType::Void,
    };
    let err = backend.lower_body(&body).expect_err("non-class catch must be rejected");
    assert_eq!(err, BackendError::NonClassCatchType { ty: IrType::Int });
}

#[test]
fn diverging_conditional_elides_the_dead_temporary() {
    let mut backend = empty_backend();
    // Both branches throw; the construct is non-void but can never produce
    // a value, so no temporary may survive.
    let body = IrNode::Return {
        value: Some(Box::new(IrNode::Block {
            children: vec![
                IrNode::MultiBranchConditional {
                    branches: vec![ConditionalBranch {
                        condition: boolean(true),
                        result: IrNode::Throw {
                            value: Box::new(int(1)),
                        },
                    }],
                    else_branch: Some(Box::new(IrNode::Throw {
                        value: Box::new(int(2)),
                    })),
                    ty: IrType::Int,
                },
                int(0),
            ],
            ty: IrType::Int,
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert!(
        !output
            .iter()
            .any(|statement| matches!(statement, JsStatement::VarDecl { .. })),
        "dead temporary must be removed, got {:?}",
        output
    );
}

#[test]
fn return_of_void_value_discharges_side_effects_first() {
    let mut symbols = SymbolTable::new();
    let callee = symbols.declare_function(FunctionInfo {
        name: "update".to_string(),
        param_count: 0,
        accessor: None,
    });
    let mut backend = JsBackend::new(symbols, IntrinsicTable::new());

    let body = IrNode::Return {
        value: Some(Box::new(IrNode::Call {
            callee,
            dispatch_receiver: None,
            extension_receiver: None,
            arguments: vec![],
            ty: IrType::Void,
        })),
    };
    let output = backend.lower_body(&body).expect("lowering should succeed");
    assert_eq!(
        output,
        vec![
            JsStatement::Expression(JsExpression::call(JsExpression::name("update"), vec![])),
            JsStatement::Return { value: None },
        ]
    );
}
