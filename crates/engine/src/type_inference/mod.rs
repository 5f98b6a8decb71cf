// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Local-variable type maps and method-return-type inference, the input
//! the call resolver's method-chain and qualified-call steps lean on.
//! One engine per language; all share this interface, dispatched by
//! language tag at the file boundary (see the engine's design notes on
//! modeling polymorphic language engines as a fixed trait).

mod generic;
mod python;

pub use generic::GenericEngine;
pub use python::PythonEngine;

use codegraph_core::FastMap;

/// `VarName -> TypeQN-or-SimpleName`, derived lazily per call site from
/// the containing function's AST.
pub type LocalVarTypes = FastMap<String, String>;

/// The fixed method set every per-language type engine implements.
/// `infer_method_return_type` is the one that can recurse (through
/// mutually-calling methods) and so is memoized and reentrancy-guarded
/// by each implementor.
pub trait TypeInferenceEngine {
    /// Build the `var -> type` map for one function body, including
    /// parameter types (annotated or, where the language supports it,
    /// heuristically guessed) and the types established by simple
    /// constructor-call assignments.
    fn build_local_variable_type_map(
        &mut self,
        function_node: tree_sitter::Node<'_>,
        source: &str,
        module_qn: &str,
        class_context: Option<&str>,
        candidate_classes: &[String],
    ) -> LocalVarTypes;

    /// Infer the type of a call/attribute expression's textual head,
    /// e.g. the `obj` half of `obj.method()`. Returns `None` rather than
    /// guessing when the expression isn't one of the recognized shapes.
    fn infer_expression_return_type(
        &self,
        expression_text: &str,
        module_qn: &str,
        locals: &LocalVarTypes,
    ) -> Option<String>;
}

/// Parameter-name heuristic scoring shared by every engine that supports
/// it (currently only Python): exact match scores highest, a shared
/// suffix scores well, and a plain substring match is scaled by how much
/// of the shorter string it covers. Zero means "no match" and the
/// parameter is left untyped.
pub(crate) fn heuristic_score(param_name: &str, class_name: &str) -> u32 {
    let param = param_name.to_ascii_lowercase();
    let class = class_name.to_ascii_lowercase();
    if param == class {
        return 100;
    }
    if param.ends_with(&class) || class.ends_with(&param) {
        return 80;
    }
    if param.contains(&class) || class.contains(&param) {
        let shorter = param.len().min(class.len()) as f64;
        let longer = param.len().max(class.len()) as f64;
        return ((shorter / longer) * 70.0) as u32;
    }
    0
}

/// `candidates` are full qualified names (e.g. `proj.pkg.Widget`); scoring
/// compares against each candidate's simple name, but the match returned
/// is the full QN, since that's what the call resolver needs to look up.
pub(crate) fn best_heuristic_match(param_name: &str, candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .map(|c| (c, heuristic_score(param_name, simple_name(c))))
        .filter(|(_, score)| *score > 0)
        .max_by_key(|(_, score)| *score)
        .map(|(c, _)| c.clone())
}

/// The last dotted segment of a qualified name (or the whole string if it
/// has none), i.e. the plain class/function name a constructor call or a
/// parameter name is actually compared against.
pub(crate) fn simple_name(qn: &str) -> &str {
    qn.rsplit('.').next().unwrap_or(qn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_name_beats_substring() {
        let candidates = vec!["User".to_string(), "UserRepository".to_string()];
        assert_eq!(best_heuristic_match("user", &candidates), Some("User".to_string()));
    }

    #[test]
    fn no_match_below_threshold_returns_none() {
        let candidates = vec!["Widget".to_string()];
        assert_eq!(best_heuristic_match("x", &candidates), None);
    }
}
