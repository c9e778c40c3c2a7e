//! Построитель узлов дерева
//!
//! Используется адаптером tree-sitter при понижении конкретного дерева и
//! тестами для ручной сборки деревьев.

use crate::core::position::Position;

use super::ast::{
    ArraySyntax, IncludeKind, NodeAttributes, NumberKind, SubNode, SyntaxNode, UseKind,
};
use super::kinds::NodeKind;

/// Пошаговый построитель `SyntaxNode`
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    kind: NodeKind,
    slots: Vec<(&'static str, SubNode)>,
    attributes: NodeAttributes,
    position: Position,
}

impl NodeBuilder {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            attributes: NodeAttributes::default(),
            position: Position::zero(),
        }
    }

    /// Произвольное значение слота; повторная запись заменяет прежнее
    pub fn value(mut self, slot: &'static str, value: SubNode) -> Self {
        if let Some(existing) = self.slots.iter_mut().find(|(name, _)| *name == slot) {
            existing.1 = value;
        } else {
            self.slots.push((slot, value));
        }
        self
    }

    pub fn node(self, slot: &'static str, node: SyntaxNode) -> Self {
        self.value(slot, SubNode::node(node))
    }

    pub fn opt_node(self, slot: &'static str, node: Option<SyntaxNode>) -> Self {
        self.value(slot, SubNode::from(node))
    }

    pub fn nodes(self, slot: &'static str, nodes: Vec<SyntaxNode>) -> Self {
        self.value(slot, SubNode::Array(nodes.into_iter().map(SubNode::node).collect()))
    }

    /// Массив, в котором допустимы пропуски (`list($a, , $b)`)
    pub fn opt_nodes(self, slot: &'static str, nodes: Vec<Option<SyntaxNode>>) -> Self {
        self.value(slot, SubNode::Array(nodes.into_iter().map(SubNode::from).collect()))
    }

    pub fn null(self, slot: &'static str) -> Self {
        self.value(slot, SubNode::Null)
    }

    pub fn int(self, slot: &'static str, value: i64) -> Self {
        self.value(slot, SubNode::Int(value))
    }

    pub fn float(self, slot: &'static str, value: f64) -> Self {
        self.value(slot, SubNode::Float(value))
    }

    pub fn string(self, slot: &'static str, value: impl Into<String>) -> Self {
        self.value(slot, SubNode::Str(value.into()))
    }

    pub fn flags(mut self, flags: u32) -> Self {
        self.attributes.flags = flags;
        self
    }

    pub fn by_ref(mut self, by_ref: bool) -> Self {
        self.attributes.by_ref = by_ref;
        self
    }

    pub fn unpack(mut self, unpack: bool) -> Self {
        self.attributes.unpack = unpack;
        self
    }

    pub fn variadic(mut self, variadic: bool) -> Self {
        self.attributes.variadic = variadic;
        self
    }

    pub fn array_syntax(mut self, syntax: ArraySyntax) -> Self {
        self.attributes.array_syntax = Some(syntax);
        self
    }

    pub fn number(mut self, kind: NumberKind, raw: impl Into<String>) -> Self {
        self.attributes.number_kind = Some(kind);
        self.attributes.raw_value = Some(raw.into());
        self
    }

    pub fn raw(mut self, raw: impl Into<String>) -> Self {
        self.attributes.raw_value = Some(raw.into());
        self
    }

    pub fn use_kind(mut self, kind: UseKind) -> Self {
        self.attributes.use_kind = Some(kind);
        self
    }

    pub fn include_kind(mut self, kind: IncludeKind) -> Self {
        self.attributes.include_kind = Some(kind);
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn build(self) -> SyntaxNode {
        SyntaxNode::new(self.kind, self.slots, self.attributes, self.position)
    }
}

/// `$name`
pub fn variable(name: &str) -> SyntaxNode {
    NodeBuilder::new(NodeKind::ExprVariable)
        .string("name", name)
        .build()
}

/// Строковый литерал
pub fn string(value: &str) -> SyntaxNode {
    NodeBuilder::new(NodeKind::ScalarString)
        .string("value", value)
        .build()
}

/// Десятичный целочисленный литерал
pub fn lnumber(value: i64) -> SyntaxNode {
    NodeBuilder::new(NodeKind::ScalarLNumber)
        .int("value", value)
        .number(NumberKind::Decimal, value.to_string())
        .build()
}

pub fn dnumber(value: f64) -> SyntaxNode {
    NodeBuilder::new(NodeKind::ScalarDNumber)
        .float("value", value)
        .raw(value.to_string())
        .build()
}

/// Неквалифицированное или квалифицированное имя
pub fn name(text: &str) -> SyntaxNode {
    NodeBuilder::new(NodeKind::Name).string("parts", text).build()
}

/// Полностью квалифицированное имя (`\Foo\Bar`), хранится без ведущего `\`
pub fn fully_qualified(text: &str) -> SyntaxNode {
    NodeBuilder::new(NodeKind::NameFullyQualified)
        .string("parts", text.trim_start_matches('\\'))
        .build()
}

pub fn identifier(text: &str) -> SyntaxNode {
    NodeBuilder::new(NodeKind::Identifier)
        .string("name", text)
        .build()
}

pub fn var_like_identifier(text: &str) -> SyntaxNode {
    NodeBuilder::new(NodeKind::VarLikeIdentifier)
        .string("name", text)
        .build()
}

/// Выражение как инструкция
pub fn expression(expr: SyntaxNode) -> SyntaxNode {
    NodeBuilder::new(NodeKind::StmtExpression)
        .node("expr", expr)
        .build()
}

pub fn echo(exprs: Vec<SyntaxNode>) -> SyntaxNode {
    NodeBuilder::new(NodeKind::StmtEcho).nodes("exprs", exprs).build()
}

pub fn array_item(value: SyntaxNode) -> SyntaxNode {
    NodeBuilder::new(NodeKind::ExprArrayItem)
        .null("key")
        .node("value", value)
        .build()
}

pub fn arg(value: SyntaxNode) -> SyntaxNode {
    NodeBuilder::new(NodeKind::Arg)
        .null("name")
        .node("value", value)
        .build()
}

pub fn const_fetch(text: &str) -> SyntaxNode {
    NodeBuilder::new(NodeKind::ExprConstFetch)
        .node("name", name(text))
        .build()
}

pub fn func_call(function: &str, args: Vec<SyntaxNode>) -> SyntaxNode {
    NodeBuilder::new(NodeKind::ExprFuncCall)
        .node("name", name(function))
        .nodes("args", args.into_iter().map(arg).collect())
        .build()
}

/// Массив из значений без ключей
pub fn array(syntax: ArraySyntax, values: Vec<SyntaxNode>) -> SyntaxNode {
    NodeBuilder::new(NodeKind::ExprArray)
        .nodes("items", values.into_iter().map(array_item).collect())
        .array_syntax(syntax)
        .build()
}

pub fn assign(var: SyntaxNode, expr: SyntaxNode) -> SyntaxNode {
    NodeBuilder::new(NodeKind::ExprAssign)
        .node("var", var)
        .node("expr", expr)
        .build()
}
