//! Grammars behind [`crate::syntax::Document`].

mod csharp;

pub use csharp::CSharp;

use crate::error::{FixError, Result};
use std::path::{Path, PathBuf};
use tree_sitter::{Language as TsLanguage, Parser, Query, Tree};

/// A grammar the engine can parse documents with.
pub trait Language: Send + Sync {
    fn name(&self) -> &'static str;

    /// File extensions, without the leading dot.
    fn extensions(&self) -> &[&'static str];

    fn grammar(&self) -> TsLanguage;

    /// Parses a whole source text.
    ///
    /// Syntax errors do not fail the parse; they show up as `ERROR` and
    /// `MISSING` nodes in the returned tree.
    fn parse(&self, source: &str) -> Result<Tree> {
        let failure = |message: String| FixError::Parse {
            path: PathBuf::from("<input>"),
            message,
        };
        let mut parser = Parser::new();
        parser
            .set_language(&self.grammar())
            .map_err(|e| failure(format!("{} grammar rejected: {e}", self.name())))?;
        parser
            .parse(source, None)
            .ok_or_else(|| failure(format!("{} parser produced no tree", self.name())))
    }

    /// Compiles a tree-sitter query against this grammar.
    fn query(&self, pattern: &str) -> Result<Query> {
        Query::new(&self.grammar(), pattern).map_err(FixError::from)
    }

    fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.');
        self.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Checks the path's extension against [`Language::extensions`].
    fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.matches_extension(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csharp_extensions() {
        assert!(CSharp.matches_extension("cs"));
        assert!(CSharp.matches_extension("CSX"));
        assert!(CSharp.matches_extension(".cs"));
        assert!(!CSharp.matches_extension("rs"));
        assert!(CSharp.matches_path(Path::new("src/Program.cs")));
        assert!(!CSharp.matches_path(Path::new("Makefile")));
    }

    #[test]
    fn test_parse_csharp() {
        let tree = CSharp.parse("class C { void M() { } }").unwrap();
        assert_eq!(tree.root_node().kind(), "compilation_unit");
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_parse_keeps_syntax_errors_in_tree() {
        let tree = CSharp.parse("class C { void M( }").unwrap();
        assert!(tree.root_node().has_error());
    }

    #[test]
    fn test_identifier_query() {
        assert!(CSharp.query("(identifier) @id").is_ok());
    }
}
