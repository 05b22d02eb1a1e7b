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

//! Debug driver for the Kestrel JavaScript backend
//!
//! Loads a serialized IR program (as emitted by the front end with
//! `--dump-backend-input`), lowers every function body and writes the
//! resulting JavaScript AST as JSON. Useful for inspecting lowering output
//! without running the full compiler pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use kestrel::intrinsics::IntrinsicTable;
use kestrel::ir::Program;
use kestrel::JsBackend;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kestrel-backend",
    about = "Lower a serialized Kestrel IR program to a JavaScript AST",
    version
)]
struct Args {
    /// Path to the serialized IR program (JSON).
    input: PathBuf,

    /// Where to write the lowered output; stdout if omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the output JSON.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let program: Program = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse IR program from {}", args.input.display()))?;

    let mut backend = JsBackend::new(program.symbols, IntrinsicTable::new());
    let lowered = backend
        .lower_program(&program.functions)
        .context("lowering failed")?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&lowered)?
    } else {
        serde_json::to_string(&lowered)?
    };

    match args.output {
        Some(path) => fs::write(&path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", rendered),
    }

    Ok(())
}
