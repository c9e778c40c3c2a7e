//! Синтаксическое дерево PHP
//!
//! Узел хранит вид, именованные слоты с дочерними значениями, атрибуты
//! разбора и две ячейки аннотации: минимальную и максимальную версию PHP,
//! в которой узел допустим. Ячейки заполняются аннотатором уже после
//! построения дерева, поэтому используют внутреннюю изменяемость.

use std::cell::Cell;

use crate::core::position::Position;
use crate::language_level::LanguageLevel;

use super::kinds::NodeKind;

/// Модификаторы классов и членов класса
pub mod modifiers {
    pub const PUBLIC: u32 = 1;
    pub const PROTECTED: u32 = 2;
    pub const PRIVATE: u32 = 4;
    pub const STATIC: u32 = 8;
    pub const ABSTRACT: u32 = 16;
    pub const FINAL: u32 = 32;
    pub const READONLY: u32 = 64;

    pub const VISIBILITY_MASK: u32 = PUBLIC | PROTECTED | PRIVATE;
}

/// Форма записи массива
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArraySyntax {
    /// `array(...)` / `list(...)`
    Long,
    /// `[...]`
    Short,
}

/// Система счисления целочисленного литерала
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Decimal,
    Hexadecimal,
    Octal,
    Binary,
}

/// Вид импорта в `use`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseKind {
    Unknown,
    Normal,
    Function,
    Constant,
}

/// Вид подключения файла
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeKind {
    Include,
    IncludeOnce,
    Require,
    RequireOnce,
}

/// Атрибуты, которые выставляет парсер
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeAttributes {
    /// Битовая маска из [`modifiers`]
    pub flags: u32,
    pub by_ref: bool,
    pub unpack: bool,
    pub variadic: bool,
    pub array_syntax: Option<ArraySyntax>,
    pub number_kind: Option<NumberKind>,
    /// Исходный текст литерала
    pub raw_value: Option<String>,
    pub use_kind: Option<UseKind>,
    pub include_kind: Option<IncludeKind>,
}

/// Значение слота
#[derive(Debug, Clone, PartialEq)]
pub enum SubNode {
    Node(Box<SyntaxNode>),
    Array(Vec<SubNode>),
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

impl SubNode {
    pub fn node(node: SyntaxNode) -> Self {
        SubNode::Node(Box::new(node))
    }

    pub fn as_node(&self) -> Option<&SyntaxNode> {
        match self {
            SubNode::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[SubNode]> {
        match self {
            SubNode::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SubNode::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SubNode::Null)
    }

    /// Все узлы, непосредственно содержащиеся в значении (с разворачиванием массивов)
    pub fn nodes(&self) -> Vec<&SyntaxNode> {
        let mut out = Vec::new();
        self.collect_nodes(&mut out);
        out
    }

    fn collect_nodes<'a>(&'a self, out: &mut Vec<&'a SyntaxNode>) {
        match self {
            SubNode::Node(node) => out.push(node),
            SubNode::Array(items) => {
                for item in items {
                    item.collect_nodes(out);
                }
            }
            _ => {}
        }
    }
}

impl From<SyntaxNode> for SubNode {
    fn from(node: SyntaxNode) -> Self {
        SubNode::node(node)
    }
}

impl From<Option<SyntaxNode>> for SubNode {
    fn from(node: Option<SyntaxNode>) -> Self {
        node.map(SubNode::node).unwrap_or(SubNode::Null)
    }
}

/// Узел синтаксического дерева
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    kind: NodeKind,
    slots: Vec<(&'static str, SubNode)>,
    attributes: NodeAttributes,
    position: Position,
    from: Cell<Option<LanguageLevel>>,
    to: Cell<Option<LanguageLevel>>,
}

impl SyntaxNode {
    pub fn new(
        kind: NodeKind,
        slots: Vec<(&'static str, SubNode)>,
        attributes: NodeAttributes,
        position: Position,
    ) -> Self {
        Self {
            kind,
            slots,
            attributes,
            position,
            from: Cell::new(None),
            to: Cell::new(None),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_a(&self, kind: NodeKind) -> bool {
        self.kind.is_a(kind)
    }

    pub fn attributes(&self) -> &NodeAttributes {
        &self.attributes
    }

    pub fn flags(&self) -> u32 {
        self.attributes.flags
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    /// Слоты в порядке объявления
    pub fn slots(&self) -> impl Iterator<Item = (&'static str, &SubNode)> {
        self.slots.iter().map(|(name, value)| (*name, value))
    }

    pub fn slot(&self, name: &str) -> Option<&SubNode> {
        self.slots
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, value)| value)
    }

    /// Узел в одиночном слоте
    pub fn child(&self, name: &str) -> Option<&SyntaxNode> {
        self.slot(name).and_then(SubNode::as_node)
    }

    /// Узлы в слоте-массиве (null-элементы пропускаются)
    pub fn children(&self, name: &str) -> Vec<&SyntaxNode> {
        self.slot(name).map(SubNode::nodes).unwrap_or_default()
    }

    /// Строковое значение слота
    pub fn str_slot(&self, name: &str) -> Option<&str> {
        self.slot(name).and_then(SubNode::as_str)
    }

    /// Все непосредственные дочерние узлы в порядке слотов
    pub fn child_nodes(&self) -> Vec<&SyntaxNode> {
        self.slots.iter().flat_map(|(_, value)| value.nodes()).collect()
    }

    /// Текстовое имя узла-идентификатора
    ///
    /// Для `Name*` и `Identifier` это имя, для `Expr_Variable` со строковым
    /// именем это имя без `$`.
    pub fn text(&self) -> Option<&str> {
        self.str_slot("name").or_else(|| self.str_slot("parts"))
    }

    pub fn from_level(&self) -> Option<LanguageLevel> {
        self.from.get()
    }

    pub fn to_level(&self) -> Option<LanguageLevel> {
        self.to.get()
    }

    pub fn is_annotated(&self) -> bool {
        self.from.get().is_some()
    }

    pub(crate) fn set_language_levels(&self, from: LanguageLevel, to: Option<LanguageLevel>) {
        self.from.set(Some(from));
        self.to.set(to);
    }

    /// Количество узлов в поддереве, включая сам узел
    pub fn subtree_size(&self) -> usize {
        1 + self
            .child_nodes()
            .iter()
            .map(|child| child.subtree_size())
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::php_parser::builder::{self, NodeBuilder};

    #[test]
    fn test_slot_access() {
        let node = NodeBuilder::new(NodeKind::StmtEcho)
            .nodes("exprs", vec![builder::string("a"), builder::string("b")])
            .build();

        assert_eq!(node.children("exprs").len(), 2);
        assert!(node.child("exprs").is_none());
        assert!(node.slot("missing").is_none());
        assert_eq!(node.child_nodes().len(), 2);
        assert_eq!(node.subtree_size(), 3);
    }

    #[test]
    fn test_array_with_nulls() {
        let list = NodeBuilder::new(NodeKind::ExprList)
            .opt_nodes("items", vec![None, Some(builder::array_item(builder::variable("a")))])
            .build();

        assert_eq!(list.children("items").len(), 1);
        assert_eq!(list.slot("items").and_then(SubNode::as_array).map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_annotation_cells() {
        let node = builder::variable("x");
        assert!(!node.is_annotated());

        node.set_language_levels(LanguageLevel::Php5_2, None);
        assert!(node.is_annotated());
        assert_eq!(node.from_level(), Some(LanguageLevel::Php5_2));
        assert_eq!(node.to_level(), None);
    }

    #[test]
    fn test_text() {
        assert_eq!(builder::variable("this").text(), Some("this"));
        assert_eq!(builder::name("Foo\\Bar").text(), Some("Foo\\Bar"));
        assert_eq!(builder::identifier("run").text(), Some("run"));
    }
}
