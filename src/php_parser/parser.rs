//! PHP Parser на базе tree-sitter

use tree_sitter::{Language, Parser};

use crate::core::errors::{ModernityError, ParseError, Result};
use crate::core::position::Position;

use super::ast::SyntaxNode;
use super::tree_sitter_adapter::TreeSitterAdapter;

/// PHP Parser
///
/// Владеет собственным экземпляром `tree_sitter::Parser`, поэтому в
/// параллельном обходе каждый рабочий поток создает свой парсер.
pub struct PhpParser {
    parser: Parser,
}

impl PhpParser {
    /// Создает новый экземпляр парсера с грамматикой PHP
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_php::LANGUAGE_PHP.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| ModernityError::Grammar(e.to_string()))?;

        Ok(Self { parser })
    }

    /// Парсит PHP код и возвращает инструкции верхнего уровня
    ///
    /// Первая синтаксическая ошибка дерева становится `ParseError`.
    pub fn parse(&mut self, source: &str) -> std::result::Result<Vec<SyntaxNode>, ParseError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ParseError::new("Parser returned no tree", Position::zero()))?;

        let root = tree.root_node();
        let adapter = TreeSitterAdapter::new(source);

        if let Some(error) = adapter.collect_syntax_errors(&root).into_iter().next() {
            return Err(error);
        }

        let nodes = adapter.lower_program(root);
        tracing::trace!("Lowered {} top-level statements", nodes.len());
        Ok(nodes)
    }
}
