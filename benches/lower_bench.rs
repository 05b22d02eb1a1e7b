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

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kestrel::intrinsics::IntrinsicTable;
use kestrel::ir::*;
use kestrel::JsBackend;

/// A function body of `depth` nested value-producing conditionals inside a
/// loop, heavy on the reification paths (temporaries, label synthesis,
/// else-arm collapse).
fn deep_body(symbols: &mut SymbolTable, depth: usize) -> IrNode {
    let flag = symbols.declare_variable(VariableInfo {
        name: "flag".to_string(),
    });
    let sink = symbols.declare_variable(VariableInfo {
        name: "sink".to_string(),
    });

    let mut value = IrNode::Constant {
        value: ConstantValue::Long(1 << 40),
        ty: IrType::Long,
    };
    for _ in 0..depth {
        value = IrNode::MultiBranchConditional {
            branches: vec![ConditionalBranch {
                condition: IrNode::ValueRead {
                    variable: flag,
                    ty: IrType::Boolean,
                },
                result: value,
            }],
            else_branch: Some(Box::new(IrNode::Constant {
                value: ConstantValue::Long(0),
                ty: IrType::Long,
            })),
            ty: IrType::Long,
        };
    }

    IrNode::WhileLoop {
        loop_id: LoopId(0),
        label: None,
        condition: Box::new(IrNode::ValueRead {
            variable: flag,
            ty: IrType::Boolean,
        }),
        body: Some(Box::new(IrNode::Block {
            children: vec![
                IrNode::VariableWrite {
                    variable: sink,
                    value: Box::new(value),
                },
                IrNode::Break { loop_id: LoopId(0) },
            ],
            ty: IrType::Void,
        })),
    }
}

fn bench_lowering(c: &mut Criterion) {
    let mut symbols = SymbolTable::new();
    let body = deep_body(&mut symbols, 64);

    c.bench_function("lower_deep_conditional_loop", |b| {
        b.iter(|| {
            let mut backend = JsBackend::new(symbols.clone(), IntrinsicTable::new());
            backend.lower_body(black_box(&body)).unwrap()
        })
    });
}

criterion_group!(benches, bench_lowering);
criterion_main!(benches);
