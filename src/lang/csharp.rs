//! C# grammar binding.

use super::Language;
use tree_sitter::Language as TsLanguage;

/// The C# language, parsed with `tree-sitter-c-sharp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharp;

impl Language for CSharp {
    fn name(&self) -> &'static str {
        "csharp"
    }

    fn extensions(&self) -> &[&'static str] {
        &["cs", "csx"]
    }

    fn grammar(&self) -> TsLanguage {
        tree_sitter_c_sharp::LANGUAGE.into()
    }
}
