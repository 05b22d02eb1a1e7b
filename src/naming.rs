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

//! Fresh-name generation for synthesized identifiers
//!
//! The backend needs unique names for tail-value temporaries, loop labels
//! and catch bindings. Names use a `$` separator, which is valid in
//! JavaScript identifiers but rejected by the Kestrel lexer, so a
//! synthesized name can never collide with a source-level one.

/// Generator for unique target-level identifiers.
///
/// One generator lives for the whole compilation unit so that names stay
/// unique across function bodies within it.
#[derive(Debug, Default)]
pub struct NameGenerator {
    next: u32,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh temporary name, e.g. `tmp$3`.
    pub fn fresh(&mut self) -> String {
        self.fresh_from("tmp")
    }

    /// A fresh name seeded from a source-level hint, e.g. `outer$7`.
    pub fn fresh_from(&mut self, hint: &str) -> String {
        let id = self.next;
        self.next += 1;
        format!("{}${}", hint, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_across_hints() {
        let mut names = NameGenerator::new();
        let a = names.fresh();
        let b = names.fresh_from("loop");
        let c = names.fresh();
        assert_eq!(a, "tmp$0");
        assert_eq!(b, "loop$1");
        assert_eq!(c, "tmp$2");
    }
}
