//! Особенности PHP, влияющие на определение версии

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::php_parser::ast::{modifiers, SyntaxNode};

/// Суперглобальные переменные (без `$`)
pub static SUPERGLOBALS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "GLOBALS", "_SERVER", "_GET", "_POST", "_FILES", "_COOKIE", "_SESSION", "_REQUEST", "_ENV",
    ]
    .into_iter()
    .collect()
});

/// Полузарезервированные слова: ключевые слова, которые с PHP 7.0 допустимы
/// как имена членов класса
pub static SEMI_RESERVED_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // reserved non-modifiers
        "include", "include_once", "eval", "require", "require_once", "or", "xor", "and",
        "instanceof", "new", "clone", "exit", "die", "if", "elseif", "else", "endif", "echo",
        "do", "while", "endwhile", "for", "endfor", "foreach", "endforeach", "declare",
        "enddeclare", "as", "try", "catch", "finally", "throw", "use", "insteadof", "global",
        "var", "unset", "isset", "empty", "continue", "goto", "function", "const", "return",
        "print", "yield", "list", "switch", "endswitch", "case", "default", "break", "array",
        "callable", "extends", "implements", "namespace", "trait", "interface", "class",
        "__class__", "__trait__", "__function__", "__method__", "__line__", "__file__",
        "__dir__", "__namespace__", "fn", "match", "enum",
        // modifiers
        "static", "abstract", "final", "private", "protected", "public", "readonly",
    ]
    .into_iter()
    .collect()
});

pub fn is_superglobal(name: &str) -> bool {
    SUPERGLOBALS.contains(name)
}

/// Ключевые слова PHP нечувствительны к регистру
pub fn is_semi_reserved_keyword(name: &str) -> bool {
    SEMI_RESERVED_KEYWORDS.contains(name.to_ascii_lowercase().as_str())
}

pub fn flags_have_visibility_modifier(flags: u32) -> bool {
    flags & modifiers::VISIBILITY_MASK != 0
}

/// Имена переменных параметров функции (без `$`); динамические имена пропускаются
pub fn parameter_variable_names<'a>(params: &[&'a SyntaxNode]) -> Vec<&'a str> {
    params
        .iter()
        .filter_map(|param| param.child("var"))
        .filter_map(|var| var.str_slot("name"))
        .collect()
}
