//! PHP Parser на базе tree-sitter
//!
//! Этот модуль разбирает исходный текст PHP грамматикой tree-sitter-php и
//! понижает конкретное дерево в дерево узлов с видами в нотации
//! PHP-парсера, пригодное для аннотирования версиями языка.

pub mod ast;
pub mod builder;
pub mod kinds;
pub mod parser;
pub mod tree_sitter_adapter;

pub use ast::{SubNode, SyntaxNode};
pub use builder::NodeBuilder;
pub use kinds::NodeKind;
pub use parser::PhpParser;
pub use tree_sitter_adapter::TreeSitterAdapter;

/// Версия парсера
pub const PARSER_VERSION: &str = "0.3.0";

/// Поддерживаемые расширения файлов
pub const SUPPORTED_EXTENSIONS: &[&str] = &["php", "php5"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_version() {
        assert!(!PARSER_VERSION.is_empty());
    }

    #[test]
    fn test_supported_extensions() {
        assert!(SUPPORTED_EXTENSIONS.contains(&"php"));
        assert!(SUPPORTED_EXTENSIONS.contains(&"php5"));
    }
}
