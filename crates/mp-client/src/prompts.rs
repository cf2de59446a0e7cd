/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Wire shape of a classify request
//!
//! The service owns the prompt templates; the client sends a template
//! identifier, the text, and template variables.

use mp_core::PromptKind;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyRequest {
  /// Template identifier understood by the classifier service
  pub template: String,

  pub model: String,

  pub text: String,

  /// Template variables; `{}` when a template takes none
  pub variables: Value,
}

impl ClassifyRequest {
  pub fn new(kind: PromptKind, model: &str, text: &str) -> Self {
    Self {
      template: kind.to_string(),
      model: model.to_string(),
      text: text.to_string(),
      variables: Value::Object(serde_json::Map::new()),
    }
  }

  pub fn with_variables(mut self, variables: Value) -> Self {
    self.variables = variables;
    self
  }
}
