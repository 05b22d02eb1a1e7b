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

//! Typed intermediate representation consumed by the JavaScript backend
//!
//! The IR is handed to the backend fully type checked and symbol resolved:
//! every reference to a function, property, field, variable or class is an
//! id into the [`SymbolTable`], names are already final, and overloads are
//! already picked. The backend never validates well-formedness; a malformed
//! tree is a fatal [`crate::error::BackendError`].
//!
//! Expressions and statements are not distinguished at this level. Any node
//! can appear in value position as long as its static type is non-void; the
//! lowering pass decides per node whether it survives as a JavaScript
//! expression or is reified into statements.

use crate::error::BackendError;
use serde::{Deserialize, Serialize};

macro_rules! symbol_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);
    };
}

symbol_id!(
    /// Resolved function or accessor declaration.
    FunctionId
);
symbol_id!(
    /// Resolved property declaration.
    PropertyId
);
symbol_id!(
    /// Resolved field declaration (a property's backing storage or a plain
    /// member field).
    FieldId
);
symbol_id!(
    /// Resolved local variable or parameter declaration.
    VariableId
);
symbol_id!(
    /// Resolved class declaration.
    ClassId
);
symbol_id!(
    /// Identity of a loop node, referenced by the break/continue nodes that
    /// target it.
    LoopId
);

/// Static result type of an IR node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IrType {
    /// No value. Nodes of this type lower to statements only.
    Void,
    Boolean,
    /// 32-bit integer, representable as a plain JavaScript number.
    Int,
    /// 64-bit integer, wider than a JavaScript number can hold exactly.
    Long,
    Double,
    Str,
    Class(ClassId),
}

impl IrType {
    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }
}

/// A constant literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstantValue {
    Str(String),
    Boolean(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Char(u16),
    Null,
}

/// Type-operator flavors. Cast and SafeCast differ only in the failure arm;
/// InstanceOf and NotInstanceOf differ only in negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeOperatorKind {
    Cast,
    SafeCast,
    InstanceOf,
    NotInstanceOf,
}

/// One `{condition, result}` pair of a multi-branch conditional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalBranch {
    pub condition: IrNode,
    pub result: IrNode,
}

/// One catch clause of a try construct. The declared exception type must be
/// a class type; the type checker enforces this upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerClause {
    pub parameter: VariableId,
    pub exception_type: IrType,
    pub body: IrNode,
}

/// An IR node. Every variant that can produce a value carries its static
/// result type; statement-only variants are implicitly void.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrNode {
    /// A resolved call. Arguments are positional and sized to the formal
    /// parameter list; a `None` entry is a defaulted optional argument.
    Call {
        callee: FunctionId,
        dispatch_receiver: Option<Box<IrNode>>,
        extension_receiver: Option<Box<IrNode>>,
        arguments: Vec<Option<IrNode>>,
        ty: IrType,
    },
    /// `this`-bound invocation of another constructor of the same class
    /// hierarchy. Always a statement.
    DelegatingConstructorCall {
        class: ClassId,
        arguments: Vec<IrNode>,
    },
    TypeOperator {
        op: TypeOperatorKind,
        operand: Box<IrNode>,
        target: ClassId,
        ty: IrType,
    },
    /// Ordered child sequence. The last child's value is the block's value
    /// when the block's type is non-void.
    Block { children: Vec<IrNode>, ty: IrType },
    VariableDeclaration {
        variable: VariableId,
        initializer: Option<Box<IrNode>>,
    },
    ValueRead { variable: VariableId, ty: IrType },
    VariableWrite {
        variable: VariableId,
        value: Box<IrNode>,
    },
    FieldRead {
        field: FieldId,
        receiver: Option<Box<IrNode>>,
        ty: IrType,
    },
    FieldWrite {
        field: FieldId,
        receiver: Option<Box<IrNode>>,
        value: Box<IrNode>,
    },
    WhileLoop {
        loop_id: LoopId,
        label: Option<String>,
        condition: Box<IrNode>,
        body: Option<Box<IrNode>>,
    },
    DoWhileLoop {
        loop_id: LoopId,
        label: Option<String>,
        condition: Box<IrNode>,
        body: Option<Box<IrNode>>,
    },
    /// Ordered `{condition, result}` branches with an optional unconditional
    /// else. Yields a value when `ty` is non-void.
    MultiBranchConditional {
        branches: Vec<ConditionalBranch>,
        else_branch: Option<Box<IrNode>>,
        ty: IrType,
    },
    Break { loop_id: LoopId },
    Continue { loop_id: LoopId },
    Throw { value: Box<IrNode> },
    Return { value: Option<Box<IrNode>> },
    TryWithHandlers {
        body: Box<IrNode>,
        handlers: Vec<HandlerClause>,
        finally: Option<Box<IrNode>>,
        ty: IrType,
    },
    Constant { value: ConstantValue, ty: IrType },
}

impl IrNode {
    /// Static result type of this node. Statement-only nodes are void.
    pub fn ty(&self) -> IrType {
        match self {
            IrNode::Call { ty, .. }
            | IrNode::TypeOperator { ty, .. }
            | IrNode::Block { ty, .. }
            | IrNode::ValueRead { ty, .. }
            | IrNode::FieldRead { ty, .. }
            | IrNode::MultiBranchConditional { ty, .. }
            | IrNode::TryWithHandlers { ty, .. }
            | IrNode::Constant { ty, .. } => *ty,
            IrNode::DelegatingConstructorCall { .. }
            | IrNode::VariableDeclaration { .. }
            | IrNode::VariableWrite { .. }
            | IrNode::FieldWrite { .. }
            | IrNode::WhileLoop { .. }
            | IrNode::DoWhileLoop { .. }
            | IrNode::Break { .. }
            | IrNode::Continue { .. }
            | IrNode::Throw { .. }
            | IrNode::Return { .. } => IrType::Void,
        }
    }
}

/// Whether an accessor function reads or writes its property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessorKind {
    Getter,
    Setter,
}

/// Link from an accessor function back to the property it serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAccessor {
    pub property: PropertyId,
    pub kind: AccessorKind,
}

/// Resolved function declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    /// Final target-level name.
    pub name: String,
    /// Formal parameter count, excluding receivers. The lowered argument
    /// list always has exactly this length.
    pub param_count: usize,
    /// Present when this function is a property accessor.
    pub accessor: Option<PropertyAccessor>,
}

/// Resolved property declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    /// Whether reads and writes must go through accessor functions. When
    /// false, the property's storage is emulated as a direct field.
    pub needs_accessors: bool,
    /// Top-level property declared in the compilation unit being lowered.
    /// Such properties are addressed directly even when accessors exist.
    pub local_top_level: bool,
}

/// Resolved field declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    /// Instance fields are accessed relative to a lowered receiver;
    /// free-standing fields are plain references.
    pub instance: bool,
}

/// Resolved local variable or parameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub name: String,
}

/// Resolved class declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Target-level constructor function name.
    pub name: String,
}

/// All declarations the IR references by id, with their final target-level
/// names. Populated by the front end; the backend only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    functions: Vec<FunctionInfo>,
    properties: Vec<PropertyInfo>,
    fields: Vec<FieldInfo>,
    variables: Vec<VariableInfo>,
    classes: Vec<ClassInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_function(&mut self, info: FunctionInfo) -> FunctionId {
        self.functions.push(info);
        FunctionId(self.functions.len() as u32 - 1)
    }

    pub fn declare_property(&mut self, info: PropertyInfo) -> PropertyId {
        self.properties.push(info);
        PropertyId(self.properties.len() as u32 - 1)
    }

    pub fn declare_field(&mut self, info: FieldInfo) -> FieldId {
        self.fields.push(info);
        FieldId(self.fields.len() as u32 - 1)
    }

    pub fn declare_variable(&mut self, info: VariableInfo) -> VariableId {
        self.variables.push(info);
        VariableId(self.variables.len() as u32 - 1)
    }

    pub fn declare_class(&mut self, info: ClassInfo) -> ClassId {
        self.classes.push(info);
        ClassId(self.classes.len() as u32 - 1)
    }

    pub fn function(&self, id: FunctionId) -> Result<&FunctionInfo, BackendError> {
        self.functions
            .get(id.0 as usize)
            .ok_or(BackendError::UnknownSymbol {
                kind: "function",
                id: id.0,
            })
    }

    pub fn property(&self, id: PropertyId) -> Result<&PropertyInfo, BackendError> {
        self.properties
            .get(id.0 as usize)
            .ok_or(BackendError::UnknownSymbol {
                kind: "property",
                id: id.0,
            })
    }

    pub fn field(&self, id: FieldId) -> Result<&FieldInfo, BackendError> {
        self.fields
            .get(id.0 as usize)
            .ok_or(BackendError::UnknownSymbol {
                kind: "field",
                id: id.0,
            })
    }

    pub fn variable(&self, id: VariableId) -> Result<&VariableInfo, BackendError> {
        self.variables
            .get(id.0 as usize)
            .ok_or(BackendError::UnknownSymbol {
                kind: "variable",
                id: id.0,
            })
    }

    pub fn class(&self, id: ClassId) -> Result<&ClassInfo, BackendError> {
        self.classes
            .get(id.0 as usize)
            .ok_or(BackendError::UnknownSymbol {
                kind: "class",
                id: id.0,
            })
    }
}

/// A function definition ready for lowering: its resolved symbol plus its
/// body tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub function: FunctionId,
    pub body: IrNode,
}

/// One compilation unit's worth of lowering input, as produced by the front
/// end (and as serialized by the debug driver).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub symbols: SymbolTable,
    pub functions: Vec<Function>,
}
