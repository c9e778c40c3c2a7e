//! Адаптер для понижения дерева tree-sitter в дерево узлов PHP
//!
//! Конкретное дерево грамматики tree-sitter-php переводится в дерево с
//! видами узлов в нотации PHP-парсера (`Stmt_Echo`, `Expr_Array` и т.д.).
//! Незнакомые конструкции не прерывают понижение: выражения становятся
//! `Expr_Error`, инструкции пропускаются.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use tree_sitter::Node;

use crate::core::errors::ParseError;
use crate::core::position::Position;

use super::ast::{modifiers, ArraySyntax, IncludeKind, NumberKind, SubNode, SyntaxNode, UseKind};
use super::builder::NodeBuilder;
use super::kinds::NodeKind;

/// Встроенные типы, которые PHP-парсер представляет идентификаторами
static BUILTIN_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "array", "callable", "bool", "int", "float", "string", "iterable", "void", "object",
        "mixed", "never", "null", "false", "true", "static", "self", "parent", "noreturn",
    ]
    .into_iter()
    .collect()
});

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn all_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn position_of(node: &Node<'_>) -> Position {
    let point = node.start_position();
    Position::new(point.row + 1, point.column + 1, node.start_byte())
}

/// Конвертер дерева tree-sitter в дерево `SyntaxNode`
pub struct TreeSitterAdapter<'s> {
    source: &'s str,
}

impl<'s> TreeSitterAdapter<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    fn text(&self, node: &Node<'_>) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    fn build(&self, kind: NodeKind, node: &Node<'_>) -> NodeBuilder {
        NodeBuilder::new(kind).at(position_of(node))
    }

    fn has_token(&self, node: Node<'_>, token: &str) -> bool {
        all_children(node)
            .iter()
            .any(|child| !child.is_named() && self.text(child).eq_ignore_ascii_case(token))
    }

    /// Собирает синтаксические ошибки из дерева
    pub fn collect_syntax_errors(&self, root: &Node<'_>) -> Vec<ParseError> {
        let mut errors = Vec::new();
        if !root.has_error() {
            return errors;
        }

        let mut cursor = root.walk();
        loop {
            let node = cursor.node();

            if node.is_error() {
                let text: String = self.text(&node).chars().take(20).collect();
                errors.push(ParseError::new(
                    format!("Syntax error, unexpected '{}'", text.trim()),
                    position_of(&node),
                ));
            } else if node.is_missing() {
                errors.push(ParseError::new(
                    format!("Syntax error, missing '{}'", node.kind()),
                    position_of(&node),
                ));
            }

            if cursor.goto_first_child() {
                continue;
            }

            loop {
                if cursor.goto_next_sibling() {
                    break;
                }

                if !cursor.goto_parent() {
                    return errors;
                }
            }
        }
    }

    /// Понижает корень `program` в список инструкций верхнего уровня
    pub fn lower_program(&self, root: Node<'_>) -> Vec<SyntaxNode> {
        let mut stmts = Vec::new();
        for child in named_children(root) {
            self.lower_statement_into(child, &mut stmts);
        }
        self.nest_namespaces(stmts)
    }

    /// `namespace Foo;` без фигурных скобок владеет инструкциями до следующего namespace
    fn nest_namespaces(&self, stmts: Vec<SyntaxNode>) -> Vec<SyntaxNode> {
        let is_open_namespace = |node: &SyntaxNode| {
            node.kind() == NodeKind::StmtNamespace && node.slot("stmts").is_none()
        };

        if !stmts.iter().any(is_open_namespace) {
            return stmts;
        }

        let mut result = Vec::new();
        let mut current: Option<(SyntaxNode, Vec<SyntaxNode>)> = None;

        for stmt in stmts {
            if is_open_namespace(&stmt) {
                if let Some((namespace, body)) = current.take() {
                    result.push(close_namespace(namespace, body));
                }
                current = Some((stmt, Vec::new()));
            } else if let Some((_, body)) = current.as_mut() {
                body.push(stmt);
            } else {
                result.push(stmt);
            }
        }

        if let Some((namespace, body)) = current {
            result.push(close_namespace(namespace, body));
        }
        result
    }

    fn lower_statements(&self, nodes: &[Node<'_>]) -> Vec<SyntaxNode> {
        let mut stmts = Vec::new();
        for node in nodes {
            self.lower_statement_into(*node, &mut stmts);
        }
        stmts
    }

    /// Тело управляющей конструкции: блок, блок с двоеточием или одна инструкция
    fn lower_body(&self, node: Option<Node<'_>>) -> Vec<SyntaxNode> {
        match node {
            Some(node) => self.lower_statements(&[node]),
            None => Vec::new(),
        }
    }

    fn lower_statement_into(&self, node: Node<'_>, out: &mut Vec<SyntaxNode>) {
        let lowered = match node.kind() {
            "php_tag" | "comment" | "empty_statement" | "?>" => None,
            "compound_statement" | "colon_block" => {
                for child in named_children(node) {
                    self.lower_statement_into(child, out);
                }
                None
            }
            "text_interpolation" => {
                for child in named_children(node) {
                    self.lower_statement_into(child, out);
                }
                None
            }
            "text" => {
                let value = self.text(&node);
                (!value.is_empty()).then(|| {
                    self.build(NodeKind::StmtInlineHtml, &node)
                        .string("value", value)
                        .build()
                })
            }
            "expression_statement" => self.lower_expression_statement(node),
            "echo_statement" => Some(
                self.build(NodeKind::StmtEcho, &node)
                    .nodes("exprs", self.lower_expression_list(&named_children(node)))
                    .build(),
            ),
            "if_statement" => Some(self.lower_if(node)),
            "while_statement" => Some(self.lower_while(node)),
            "do_statement" => Some(self.lower_do(node)),
            "for_statement" => Some(self.lower_for(node)),
            "foreach_statement" => Some(self.lower_foreach(node)),
            "switch_statement" => Some(self.lower_switch(node)),
            "try_statement" => Some(self.lower_try(node)),
            "return_statement" => Some(
                self.build(NodeKind::StmtReturn, &node)
                    .opt_node("expr", self.first_expression(node))
                    .build(),
            ),
            "break_statement" => Some(
                self.build(NodeKind::StmtBreak, &node)
                    .opt_node("num", self.first_expression(node))
                    .build(),
            ),
            "continue_statement" => Some(
                self.build(NodeKind::StmtContinue, &node)
                    .opt_node("num", self.first_expression(node))
                    .build(),
            ),
            "global_declaration" => Some(
                self.build(NodeKind::StmtGlobal, &node)
                    .nodes("vars", self.lower_expression_list(&named_children(node)))
                    .build(),
            ),
            "function_static_declaration" => Some(self.lower_static(node)),
            "unset_statement" => Some(
                self.build(NodeKind::StmtUnset, &node)
                    .nodes("vars", self.lower_expression_list(&named_children(node)))
                    .build(),
            ),
            "goto_statement" => Some(
                self.build(NodeKind::StmtGoto, &node)
                    .node("name", self.identifier_of(node))
                    .build(),
            ),
            "named_label_statement" => Some(
                self.build(NodeKind::StmtLabel, &node)
                    .node("name", self.identifier_of(node))
                    .build(),
            ),
            "namespace_definition" => Some(self.lower_namespace(node)),
            "namespace_use_declaration" => Some(self.lower_use(node)),
            "const_declaration" => Some(
                self.build(NodeKind::StmtConst, &node)
                    .nodes("consts", self.lower_const_elements(node))
                    .build(),
            ),
            "function_definition" => Some(self.lower_function(node)),
            "class_declaration" => Some(self.lower_class(node, NodeKind::StmtClass)),
            "interface_declaration" => Some(self.lower_class(node, NodeKind::StmtInterface)),
            "trait_declaration" => Some(self.lower_class(node, NodeKind::StmtTrait)),
            "enum_declaration" => Some(self.lower_class(node, NodeKind::StmtEnum)),
            "declare_statement" => Some(self.lower_declare(node)),
            "exit_statement" => Some(
                self.build(NodeKind::StmtExpression, &node)
                    .node("expr", self.lower_exit(node, self.first_expression(node)))
                    .build(),
            ),
            "method_declaration" => Some(self.lower_method(node)),
            "property_declaration" => Some(self.lower_property(node)),
            "use_declaration" => Some(self.lower_trait_use(node)),
            "enum_case" => Some(self.lower_enum_case(node)),
            "declaration_list" | "enum_declaration_list" => {
                for child in named_children(node) {
                    if child.kind() == "const_declaration" {
                        out.push(self.lower_class_const(child));
                    } else {
                        self.lower_statement_into(child, out);
                    }
                }
                None
            }
            other => {
                tracing::debug!("Unsupported statement node '{}' at {}", other, position_of(&node));
                None
            }
        };

        if let Some(stmt) = lowered {
            out.push(stmt);
        }
    }

    fn lower_expression_statement(&self, node: Node<'_>) -> Option<SyntaxNode> {
        let expr = named_children(node).into_iter().next()?;

        if expr.kind() == "throw_expression" {
            return Some(
                self.build(NodeKind::StmtThrow, &node)
                    .node("expr", self.lower_inner_expression(expr))
                    .build(),
            );
        }

        Some(
            self.build(NodeKind::StmtExpression, &node)
                .node("expr", self.lower_expr(expr))
                .build(),
        )
    }

    fn condition_of(&self, node: Node<'_>) -> SyntaxNode {
        match node.child_by_field_name("condition") {
            Some(condition) => self.lower_expr(condition),
            None => self.error_expr(&node),
        }
    }

    fn lower_if(&self, node: Node<'_>) -> SyntaxNode {
        let mut elseifs = Vec::new();
        let mut else_branch = None;

        for child in named_children(node) {
            match child.kind() {
                "else_if_clause" => elseifs.push(
                    self.build(NodeKind::StmtElseIf, &child)
                        .node("cond", self.condition_of(child))
                        .nodes("stmts", self.lower_body(child.child_by_field_name("body")))
                        .build(),
                ),
                "else_clause" => {
                    else_branch = Some(
                        self.build(NodeKind::StmtElse, &child)
                            .nodes("stmts", self.lower_body(child.child_by_field_name("body")))
                            .build(),
                    )
                }
                _ => {}
            }
        }

        self.build(NodeKind::StmtIf, &node)
            .node("cond", self.condition_of(node))
            .nodes("stmts", self.lower_body(node.child_by_field_name("body")))
            .nodes("elseifs", elseifs)
            .opt_node("else", else_branch)
            .build()
    }

    fn lower_while(&self, node: Node<'_>) -> SyntaxNode {
        self.build(NodeKind::StmtWhile, &node)
            .node("cond", self.condition_of(node))
            .nodes("stmts", self.lower_body(node.child_by_field_name("body")))
            .build()
    }

    fn lower_do(&self, node: Node<'_>) -> SyntaxNode {
        self.build(NodeKind::StmtDo, &node)
            .nodes("stmts", self.lower_body(node.child_by_field_name("body")))
            .node("cond", self.condition_of(node))
            .build()
    }

    /// Заголовок `for` делится на три секции по `;`, все после `)` является телом
    fn lower_for(&self, node: Node<'_>) -> SyntaxNode {
        let mut sections: [Vec<Node<'_>>; 3] = Default::default();
        let mut body = Vec::new();
        let mut section = 0;
        let mut in_header = false;
        let mut header_done = false;

        for child in all_children(node) {
            if child.kind() == "comment" {
                continue;
            }
            if !child.is_named() {
                match self.text(&child) {
                    "(" if !in_header && !header_done => in_header = true,
                    ";" if in_header => section = (section + 1).min(2),
                    ")" if in_header => {
                        in_header = false;
                        header_done = true;
                    }
                    _ => {}
                }
                continue;
            }
            if in_header {
                sections[section].push(child);
            } else if header_done {
                body.push(child);
            }
        }

        self.build(NodeKind::StmtFor, &node)
            .nodes("init", self.lower_expression_list(&sections[0]))
            .nodes("cond", self.lower_expression_list(&sections[1]))
            .nodes("loop", self.lower_expression_list(&sections[2]))
            .nodes("stmts", self.lower_statements(&body))
            .build()
    }

    fn lower_foreach(&self, node: Node<'_>) -> SyntaxNode {
        let children = named_children(node);
        let mut iter = children.into_iter();

        let expr = iter
            .next()
            .map(|child| self.lower_expr(child))
            .unwrap_or_else(|| self.error_expr(&node));

        let mut key_var = None;
        let mut by_ref = false;
        let value_var = match iter.next() {
            Some(target) if target.kind() == "pair" => {
                let parts = named_children(target);
                key_var = parts.first().map(|key| self.lower_expr(*key));
                match parts.get(1) {
                    Some(value) => {
                        by_ref = value.kind() == "by_ref";
                        self.lower_assign_target(*value)
                    }
                    None => self.error_expr(&target),
                }
            }
            Some(target) => {
                by_ref = target.kind() == "by_ref";
                self.lower_assign_target(target)
            }
            None => self.error_expr(&node),
        };

        let body: Vec<_> = iter.collect();

        self.build(NodeKind::StmtForeach, &node)
            .node("expr", expr)
            .opt_node("keyVar", key_var)
            .node("valueVar", value_var)
            .nodes("stmts", self.lower_statements(&body))
            .by_ref(by_ref)
            .build()
    }

    fn lower_switch(&self, node: Node<'_>) -> SyntaxNode {
        let mut cases = Vec::new();

        if let Some(block) = node.child_by_field_name("body") {
            for case in named_children(block) {
                match case.kind() {
                    "case_statement" => {
                        let children = named_children(case);
                        let (cond, rest) = match children.split_first() {
                            Some((cond, rest)) => (Some(self.lower_expr(*cond)), rest.to_vec()),
                            None => (None, Vec::new()),
                        };
                        cases.push(
                            self.build(NodeKind::StmtCase, &case)
                                .opt_node("cond", cond)
                                .nodes("stmts", self.lower_statements(&rest))
                                .build(),
                        );
                    }
                    "default_statement" => cases.push(
                        self.build(NodeKind::StmtCase, &case)
                            .null("cond")
                            .nodes("stmts", self.lower_statements(&named_children(case)))
                            .build(),
                    ),
                    _ => {}
                }
            }
        }

        self.build(NodeKind::StmtSwitch, &node)
            .node("cond", self.condition_of(node))
            .nodes("cases", cases)
            .build()
    }

    fn lower_try(&self, node: Node<'_>) -> SyntaxNode {
        let mut catches = Vec::new();
        let mut finally = None;

        for child in named_children(node) {
            match child.kind() {
                "catch_clause" => {
                    let mut types = Vec::new();
                    let mut var = None;
                    for part in named_children(child) {
                        match part.kind() {
                            "type_list" => {
                                types.extend(named_children(part).into_iter().map(|ty| self.lower_name(ty)))
                            }
                            "name" | "qualified_name" => types.push(self.lower_name(part)),
                            "variable_name" => var = Some(self.lower_expr(part)),
                            _ => {}
                        }
                    }
                    catches.push(
                        self.build(NodeKind::StmtCatch, &child)
                            .nodes("types", types)
                            .opt_node("var", var)
                            .nodes("stmts", self.lower_body(child.child_by_field_name("body")))
                            .build(),
                    );
                }
                "finally_clause" => {
                    finally = Some(
                        self.build(NodeKind::StmtFinally, &child)
                            .nodes("stmts", self.lower_body(child.child_by_field_name("body")))
                            .build(),
                    )
                }
                _ => {}
            }
        }

        self.build(NodeKind::StmtTryCatch, &node)
            .nodes("stmts", self.lower_body(node.child_by_field_name("body")))
            .nodes("catches", catches)
            .opt_node("finally", finally)
            .build()
    }

    fn lower_static(&self, node: Node<'_>) -> SyntaxNode {
        let vars = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "static_variable_declaration")
            .map(|declaration| {
                let parts = named_children(declaration);
                let var = parts
                    .first()
                    .map(|var| self.lower_expr(*var))
                    .unwrap_or_else(|| self.error_expr(&declaration));
                let default = parts.get(1).map(|value| self.lower_expr(*value));
                self.build(NodeKind::StmtStaticVar, &declaration)
                    .node("var", var)
                    .opt_node("default", default)
                    .build()
            })
            .collect();

        self.build(NodeKind::StmtStatic, &node).nodes("vars", vars).build()
    }

    fn lower_namespace(&self, node: Node<'_>) -> SyntaxNode {
        let name = named_children(node)
            .into_iter()
            .find(|child| matches!(child.kind(), "namespace_name" | "name" | "qualified_name"))
            .map(|name| self.lower_name(name));

        let builder = self.build(NodeKind::StmtNamespace, &node).opt_node("name", name);
        match node.child_by_field_name("body") {
            Some(body) => builder.nodes("stmts", self.lower_body(Some(body))).build(),
            None => builder.build(),
        }
    }

    fn lower_use(&self, node: Node<'_>) -> SyntaxNode {
        let use_kind = if self.has_token(node, "function") {
            UseKind::Function
        } else if self.has_token(node, "const") {
            UseKind::Constant
        } else {
            UseKind::Normal
        };

        let children = named_children(node);

        if let Some(group) = children.iter().find(|child| child.kind() == "namespace_use_group") {
            let prefix = children
                .iter()
                .find(|child| matches!(child.kind(), "namespace_name" | "name" | "qualified_name"))
                .map(|prefix| self.lower_plain_name(*prefix))
                .unwrap_or_else(|| self.build(NodeKind::Name, group).string("parts", "").build());

            let uses = named_children(*group)
                .into_iter()
                .map(|clause| self.lower_use_clause(clause, UseKind::Unknown))
                .collect();

            return self
                .build(NodeKind::StmtGroupUse, &node)
                .node("prefix", prefix)
                .nodes("uses", uses)
                .use_kind(use_kind)
                .build();
        }

        let uses = children
            .into_iter()
            .filter(|child| child.kind() == "namespace_use_clause")
            .map(|clause| self.lower_use_clause(clause, use_kind))
            .collect();

        self.build(NodeKind::StmtUse, &node)
            .nodes("uses", uses)
            .use_kind(use_kind)
            .build()
    }

    fn lower_use_clause(&self, clause: Node<'_>, use_kind: UseKind) -> SyntaxNode {
        let parts: Vec<_> = named_children(clause)
            .into_iter()
            .filter(|part| matches!(part.kind(), "name" | "qualified_name" | "namespace_name"))
            .collect();

        let name = parts
            .first()
            .map(|name| self.lower_plain_name(*name))
            .unwrap_or_else(|| self.build(NodeKind::Name, &clause).string("parts", "").build());
        let alias = clause
            .child_by_field_name("alias")
            .or_else(|| parts.get(1).copied())
            .map(|alias| self.identifier(alias));

        let use_kind = if use_kind == UseKind::Unknown && self.has_token(clause, "function") {
            UseKind::Function
        } else if use_kind == UseKind::Unknown && self.has_token(clause, "const") {
            UseKind::Constant
        } else {
            use_kind
        };

        self.build(NodeKind::StmtUseUse, &clause)
            .node("name", name)
            .opt_node("alias", alias)
            .use_kind(use_kind)
            .build()
    }

    fn lower_const_elements(&self, node: Node<'_>) -> Vec<SyntaxNode> {
        named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "const_element")
            .map(|element| {
                let parts = named_children(element);
                let name = parts
                    .first()
                    .map(|name| self.identifier(*name))
                    .unwrap_or_else(|| self.identifier(element));
                let value = parts
                    .last()
                    .filter(|_| parts.len() > 1)
                    .map(|value| self.lower_expr(*value))
                    .unwrap_or_else(|| self.error_expr(&element));
                self.build(NodeKind::Const, &element)
                    .node("name", name)
                    .node("value", value)
                    .null("namespacedName")
                    .build()
            })
            .collect()
    }

    fn lower_class_const(&self, node: Node<'_>) -> SyntaxNode {
        self.build(NodeKind::StmtClassConst, &node)
            .nodes("consts", self.lower_const_elements(node))
            .nodes("attrGroups", self.lower_attributes(node))
            .flags(self.modifier_flags(node))
            .build()
    }

    fn lower_function(&self, node: Node<'_>) -> SyntaxNode {
        self.build(NodeKind::StmtFunction, &node)
            .node("name", self.identifier_of(node))
            .nodes("params", self.lower_params(node))
            .opt_node("returnType", self.lower_return_type(node))
            .nodes("stmts", self.lower_body(node.child_by_field_name("body")))
            .nodes("attrGroups", self.lower_attributes(node))
            .by_ref(self.has_token(node, "&"))
            .build()
    }

    fn lower_method(&self, node: Node<'_>) -> SyntaxNode {
        self.build(NodeKind::StmtClassMethod, &node)
            .node("name", self.identifier_of(node))
            .nodes("params", self.lower_params(node))
            .opt_node("returnType", self.lower_return_type(node))
            .nodes("stmts", self.lower_body(node.child_by_field_name("body")))
            .nodes("attrGroups", self.lower_attributes(node))
            .flags(self.modifier_flags(node))
            .by_ref(self.has_token(node, "&"))
            .build()
    }

    fn lower_class(&self, node: Node<'_>, kind: NodeKind) -> SyntaxNode {
        let name = node
            .child_by_field_name("name")
            .map(|name| self.identifier(name));
        let body = node.child_by_field_name("body");

        let builder = self
            .build(kind, &node)
            .opt_node("name", name)
            .nodes("stmts", self.lower_body(body))
            .nodes("attrGroups", self.lower_attributes(node))
            .flags(self.modifier_flags(node));

        let base = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "base_clause")
            .map(|clause| self.lower_name_list(clause))
            .unwrap_or_default();
        let implements = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "class_interface_clause")
            .map(|clause| self.lower_name_list(clause))
            .unwrap_or_default();

        match kind {
            NodeKind::StmtClass => builder
                .opt_node("extends", base.into_iter().next())
                .nodes("implements", implements)
                .build(),
            NodeKind::StmtInterface => builder.nodes("extends", base).build(),
            NodeKind::StmtEnum => {
                let scalar_type = node
                    .child_by_field_name("type")
                    .or_else(|| {
                        named_children(node)
                            .into_iter()
                            .find(|child| matches!(child.kind(), "primitive_type" | "named_type"))
                    })
                    .map(|ty| self.identifier(ty));
                builder
                    .opt_node("scalarType", scalar_type)
                    .nodes("implements", implements)
                    .build()
            }
            _ => builder.build(),
        }
    }

    /// Анонимный класс в `new class(...) {}`
    fn lower_anonymous_class(&self, node: Node<'_>) -> (SyntaxNode, Vec<SyntaxNode>) {
        let args = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "arguments")
            .map(|args| self.lower_arguments(args))
            .unwrap_or_default();

        let body = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "declaration_list");
        let base = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "base_clause")
            .map(|clause| self.lower_name_list(clause))
            .unwrap_or_default();
        let implements = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "class_interface_clause")
            .map(|clause| self.lower_name_list(clause))
            .unwrap_or_default();

        let class = self
            .build(NodeKind::StmtClass, &node)
            .null("name")
            .nodes("stmts", self.lower_body(body))
            .nodes("attrGroups", self.lower_attributes(node))
            .opt_node("extends", base.into_iter().next())
            .nodes("implements", implements)
            .flags(self.modifier_flags(node))
            .build();

        (class, args)
    }

    fn lower_declare(&self, node: Node<'_>) -> SyntaxNode {
        let mut declares = Vec::new();
        let mut body = Vec::new();

        for child in named_children(node) {
            if child.kind() == "declare_directive" {
                let key = self.text(&child).split('=').next().unwrap_or_default().trim();
                let value = named_children(child)
                    .into_iter()
                    .last()
                    .map(|value| self.lower_expr(value))
                    .unwrap_or_else(|| self.error_expr(&child));
                declares.push(
                    self.build(NodeKind::StmtDeclareDeclare, &child)
                        .node(
                            "key",
                            self.build(NodeKind::Identifier, &child).string("name", key).build(),
                        )
                        .node("value", value)
                        .build(),
                );
            } else {
                body.push(child);
            }
        }

        self.build(NodeKind::StmtDeclare, &node)
            .nodes("declares", declares)
            .nodes("stmts", self.lower_statements(&body))
            .build()
    }

    fn lower_property(&self, node: Node<'_>) -> SyntaxNode {
        let ty = node
            .child_by_field_name("type")
            .map(|ty| self.lower_type(ty));

        let props = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "property_element")
            .map(|element| {
                let parts = named_children(element);
                let name = parts
                    .iter()
                    .find(|part| part.kind() == "variable_name")
                    .map(|var| {
                        self.build(NodeKind::VarLikeIdentifier, var)
                            .string("name", self.text(var).trim_start_matches('$'))
                            .build()
                    })
                    .unwrap_or_else(|| {
                        self.build(NodeKind::VarLikeIdentifier, &element)
                            .string("name", "")
                            .build()
                    });
                let default = parts
                    .iter()
                    .filter(|part| part.kind() != "variable_name")
                    .map(|part| match part.kind() {
                        "property_initializer" => named_children(*part)
                            .into_iter()
                            .next()
                            .map(|value| self.lower_expr(value))
                            .unwrap_or_else(|| self.error_expr(part)),
                        _ => self.lower_expr(*part),
                    })
                    .next();
                self.build(NodeKind::StmtPropertyProperty, &element)
                    .node("name", name)
                    .opt_node("default", default)
                    .build()
            })
            .collect();

        self.build(NodeKind::StmtProperty, &node)
            .nodes("props", props)
            .opt_node("type", ty)
            .nodes("attrGroups", self.lower_attributes(node))
            .flags(self.modifier_flags(node))
            .build()
    }

    fn lower_trait_use(&self, node: Node<'_>) -> SyntaxNode {
        let mut traits = Vec::new();
        let mut adaptations = Vec::new();

        for child in named_children(node) {
            match child.kind() {
                "name" | "qualified_name" => traits.push(self.lower_name(child)),
                "use_list" => {
                    for clause in named_children(child) {
                        if let Some(adaptation) = self.lower_adaptation(clause) {
                            adaptations.push(adaptation);
                        }
                    }
                }
                _ => {}
            }
        }

        self.build(NodeKind::StmtTraitUse, &node)
            .nodes("traits", traits)
            .nodes("adaptations", adaptations)
            .build()
    }

    fn lower_adaptation(&self, clause: Node<'_>) -> Option<SyntaxNode> {
        let parts = named_children(clause);
        let (first, rest) = parts.split_first()?;

        let (trait_name, method) = if first.kind() == "class_constant_access_expression" {
            let pieces = named_children(*first);
            let trait_name = pieces.first().map(|name| self.lower_name(*name));
            let method = pieces
                .get(1)
                .map(|method| self.identifier(*method))
                .unwrap_or_else(|| self.identifier(*first));
            (trait_name, method)
        } else {
            (None, self.identifier(*first))
        };

        match clause.kind() {
            "use_instead_of_clause" => Some(
                self.build(NodeKind::TraitUseAdaptationPrecedence, &clause)
                    .opt_node("trait", trait_name)
                    .node("method", method)
                    .nodes("insteadof", rest.iter().map(|name| self.lower_name(*name)).collect())
                    .build(),
            ),
            "use_as_clause" => {
                let modifier = rest
                    .iter()
                    .find(|part| part.kind() == "visibility_modifier")
                    .map(|part| i64::from(visibility_flag(self.text(part))));
                let new_name = rest
                    .iter()
                    .find(|part| part.kind() != "visibility_modifier")
                    .map(|name| self.identifier(*name));

                let builder = self
                    .build(NodeKind::TraitUseAdaptationAlias, &clause)
                    .opt_node("trait", trait_name)
                    .node("method", method);
                let builder = match modifier {
                    Some(flag) => builder.int("newModifier", flag),
                    None => builder.null("newModifier"),
                };
                Some(builder.opt_node("newName", new_name).build())
            }
            _ => None,
        }
    }

    fn lower_enum_case(&self, node: Node<'_>) -> SyntaxNode {
        let name = node
            .child_by_field_name("name")
            .map(|name| self.identifier(name))
            .unwrap_or_else(|| self.identifier_of(node));
        let value = node
            .child_by_field_name("value")
            .map(|value| self.lower_expr(value));

        self.build(NodeKind::StmtEnumCase, &node)
            .node("name", name)
            .opt_node("expr", value)
            .nodes("attrGroups", self.lower_attributes(node))
            .build()
    }

    fn modifier_flags(&self, node: Node<'_>) -> u32 {
        let mut flags = 0;
        for child in named_children(node) {
            flags |= match child.kind() {
                "visibility_modifier" => visibility_flag(self.text(&child)),
                "static_modifier" => modifiers::STATIC,
                "abstract_modifier" => modifiers::ABSTRACT,
                "final_modifier" => modifiers::FINAL,
                "readonly_modifier" => modifiers::READONLY,
                _ => 0,
            };
        }
        flags
    }

    fn lower_attributes(&self, node: Node<'_>) -> Vec<SyntaxNode> {
        let Some(list) = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "attribute_list")
        else {
            return Vec::new();
        };

        named_children(list)
            .into_iter()
            .filter(|group| group.kind() == "attribute_group")
            .map(|group| {
                let attrs = named_children(group)
                    .into_iter()
                    .filter(|attribute| attribute.kind() == "attribute")
                    .map(|attribute| {
                        let parts = named_children(attribute);
                        let name = parts
                            .iter()
                            .find(|part| matches!(part.kind(), "name" | "qualified_name"))
                            .map(|name| self.lower_name(*name))
                            .unwrap_or_else(|| self.lower_name(attribute));
                        let args = parts
                            .iter()
                            .find(|part| part.kind() == "arguments")
                            .map(|args| self.lower_arguments(*args))
                            .unwrap_or_default();
                        self.build(NodeKind::Attribute, &attribute)
                            .node("name", name)
                            .nodes("args", args)
                            .build()
                    })
                    .collect();
                self.build(NodeKind::AttributeGroup, &group)
                    .nodes("attrs", attrs)
                    .build()
            })
            .collect()
    }

    fn lower_params(&self, node: Node<'_>) -> Vec<SyntaxNode> {
        let Some(params) = node.child_by_field_name("parameters").or_else(|| {
            named_children(node)
                .into_iter()
                .find(|child| child.kind() == "formal_parameters")
        }) else {
            return Vec::new();
        };

        named_children(params)
            .into_iter()
            .filter(|param| {
                matches!(
                    param.kind(),
                    "simple_parameter" | "variadic_parameter" | "property_promotion_parameter"
                )
            })
            .map(|param| self.lower_param(param))
            .collect()
    }

    fn lower_param(&self, node: Node<'_>) -> SyntaxNode {
        let children = named_children(node);

        let var = children
            .iter()
            .find_map(|child| match child.kind() {
                "variable_name" => Some(*child),
                "by_ref" => named_children(*child)
                    .into_iter()
                    .find(|inner| inner.kind() == "variable_name"),
                _ => None,
            })
            .map(|var| self.lower_expr(var))
            .unwrap_or_else(|| self.error_expr(&node));

        let ty = node
            .child_by_field_name("type")
            .map(|ty| self.lower_type(ty));
        let default = node
            .child_by_field_name("default_value")
            .map(|value| self.lower_expr(value));
        let by_ref = self.has_token(node, "&")
            || children
                .iter()
                .any(|child| matches!(child.kind(), "reference_modifier" | "by_ref"));

        self.build(NodeKind::Param, &node)
            .opt_node("type", ty)
            .node("var", var)
            .opt_node("default", default)
            .nodes("attrGroups", self.lower_attributes(node))
            .variadic(node.kind() == "variadic_parameter")
            .by_ref(by_ref)
            .flags(self.modifier_flags(node))
            .build()
    }

    fn lower_return_type(&self, node: Node<'_>) -> Option<SyntaxNode> {
        node.child_by_field_name("return_type")
            .map(|ty| self.lower_type(ty))
    }

    /// Объявление типа: встроенные типы становятся идентификаторами, прочие именами
    fn lower_type(&self, node: Node<'_>) -> SyntaxNode {
        match node.kind() {
            "optional_type" => {
                let inner = named_children(node)
                    .into_iter()
                    .next()
                    .map(|inner| self.lower_type(inner))
                    .unwrap_or_else(|| self.type_name(node));
                self.build(NodeKind::NullableType, &node).node("type", inner).build()
            }
            "union_type" | "disjunctive_normal_form_type" => {
                let mut types = Vec::new();
                self.flatten_type_members(node, &mut types);
                self.build(NodeKind::UnionType, &node).nodes("types", types).build()
            }
            "intersection_type" => {
                let mut types = Vec::new();
                self.flatten_type_members(node, &mut types);
                self.build(NodeKind::IntersectionType, &node)
                    .nodes("types", types)
                    .build()
            }
            "type_list" | "named_type" => match named_children(node).into_iter().next() {
                Some(inner) => self.lower_type(inner),
                None => self.type_name(node),
            },
            _ => self.type_name(node),
        }
    }

    fn flatten_type_members(&self, node: Node<'_>, out: &mut Vec<SyntaxNode>) {
        for member in named_children(node) {
            match member.kind() {
                "union_type" | "intersection_type" | "optional_type"
                | "disjunctive_normal_form_type" => self.flatten_type_members(member, out),
                _ => out.push(self.lower_type(member)),
            }
        }
    }

    fn type_name(&self, node: Node<'_>) -> SyntaxNode {
        let text = self.text(&node).trim();
        let lowered = text.to_ascii_lowercase();
        if BUILTIN_TYPES.contains(lowered.as_str()) {
            self.build(NodeKind::Identifier, &node)
                .string("name", lowered)
                .build()
        } else {
            self.lower_name(node)
        }
    }

    fn lower_name_list(&self, clause: Node<'_>) -> Vec<SyntaxNode> {
        named_children(clause)
            .into_iter()
            .filter(|child| matches!(child.kind(), "name" | "qualified_name"))
            .map(|name| self.lower_name(name))
            .collect()
    }

    /// Имя с учетом квалификации (`\Foo`, `namespace\Foo`)
    fn lower_name(&self, node: Node<'_>) -> SyntaxNode {
        let text = self.text(&node).trim();
        if let Some(stripped) = text.strip_prefix('\\') {
            return self
                .build(NodeKind::NameFullyQualified, &node)
                .string("parts", stripped)
                .build();
        }
        let relative = text
            .get(..10)
            .filter(|prefix| prefix.eq_ignore_ascii_case("namespace\\"))
            .and_then(|_| text.get(10..))
            .filter(|rest| !rest.is_empty());
        if let Some(rest) = relative {
            return self
                .build(NodeKind::NameRelative, &node)
                .string("parts", rest)
                .build();
        }
        self.build(NodeKind::Name, &node).string("parts", text).build()
    }

    /// Имя без квалификации, как в `use` (ведущий `\` отбрасывается)
    fn lower_plain_name(&self, node: Node<'_>) -> SyntaxNode {
        let text = self.text(&node).trim().trim_start_matches('\\');
        self.build(NodeKind::Name, &node).string("parts", text).build()
    }

    fn identifier(&self, node: Node<'_>) -> SyntaxNode {
        self.build(NodeKind::Identifier, &node)
            .string("name", self.text(&node).trim())
            .build()
    }

    /// Идентификатор из поля `name` или первого дочернего `name`
    fn identifier_of(&self, node: Node<'_>) -> SyntaxNode {
        node.child_by_field_name("name")
            .or_else(|| {
                named_children(node)
                    .into_iter()
                    .find(|child| child.kind() == "name")
            })
            .map(|name| self.identifier(name))
            .unwrap_or_else(|| self.build(NodeKind::Identifier, &node).string("name", "").build())
    }

    fn error_expr(&self, node: &Node<'_>) -> SyntaxNode {
        self.build(NodeKind::ExprError, node).build()
    }

    fn first_expression(&self, node: Node<'_>) -> Option<SyntaxNode> {
        named_children(node)
            .into_iter()
            .next()
            .map(|expr| self.lower_expr(expr))
    }

    fn lower_inner_expression(&self, node: Node<'_>) -> SyntaxNode {
        named_children(node)
            .into_iter()
            .next()
            .map(|expr| self.lower_expr(expr))
            .unwrap_or_else(|| self.error_expr(&node))
    }

    /// Список выражений с разворачиванием `sequence_expression`
    fn lower_expression_list(&self, nodes: &[Node<'_>]) -> Vec<SyntaxNode> {
        let mut out = Vec::new();
        for node in nodes {
            self.flatten_sequence(*node, &mut out);
        }
        out
    }

    fn flatten_sequence(&self, node: Node<'_>, out: &mut Vec<SyntaxNode>) {
        if node.kind() == "sequence_expression" {
            for child in named_children(node) {
                self.flatten_sequence(child, out);
            }
        } else if node.kind() != "comment" {
            out.push(self.lower_expr(node));
        }
    }

    /// Левая часть присваивания: `list(...)` и `[...]` становятся деструктуризацией
    fn lower_assign_target(&self, node: Node<'_>) -> SyntaxNode {
        match node.kind() {
            "list_literal" => self.lower_list(node),
            "by_ref" => self.lower_inner_expression(node),
            _ => self.lower_expr(node),
        }
    }

    fn lower_list(&self, node: Node<'_>) -> SyntaxNode {
        let short = self.text(&node).trim_start().starts_with('[');
        let mut items: Vec<Option<SyntaxNode>> = Vec::new();
        let mut pending_key: Option<SyntaxNode> = None;
        let mut saw_item = false;

        for child in all_children(node) {
            if child.kind() == "comment" {
                continue;
            }
            if !child.is_named() {
                match self.text(&child) {
                    "," => {
                        if !saw_item {
                            items.push(None);
                        }
                        saw_item = false;
                    }
                    "=>" => {
                        if let Some(Some(item)) = items.pop() {
                            pending_key = item.child("value").cloned();
                        }
                    }
                    _ => {}
                }
                continue;
            }

            let by_ref = child.kind() == "by_ref";
            let value = self.lower_assign_target(child);
            let item = self
                .build(NodeKind::ExprArrayItem, &child)
                .opt_node("key", pending_key.take())
                .node("value", value)
                .by_ref(by_ref)
                .build();
            items.push(Some(item));
            saw_item = true;
        }

        if short {
            self.build(NodeKind::ExprArray, &node)
                .opt_nodes("items", items)
                .array_syntax(ArraySyntax::Short)
                .build()
        } else {
            self.build(NodeKind::ExprList, &node)
                .opt_nodes("items", items)
                .array_syntax(ArraySyntax::Long)
                .build()
        }
    }

    fn lower_array(&self, node: Node<'_>) -> SyntaxNode {
        let syntax = if self.text(&node).trim_start().starts_with('[') {
            ArraySyntax::Short
        } else {
            ArraySyntax::Long
        };

        let items = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "array_element_initializer")
            .map(|element| self.lower_array_element(element))
            .collect();

        self.build(NodeKind::ExprArray, &node)
            .nodes("items", items)
            .array_syntax(syntax)
            .build()
    }

    fn lower_array_element(&self, node: Node<'_>) -> SyntaxNode {
        let parts = named_children(node);
        let keyed = self.has_token(node, "=>");
        let unpack = self.has_token(node, "...")
            || parts.iter().any(|part| part.kind() == "variadic_unpacking");

        let (key, value_node) = if keyed && parts.len() >= 2 {
            (Some(self.lower_expr(parts[0])), Some(parts[1]))
        } else {
            (None, parts.first().copied())
        };

        let by_ref = value_node.map(|value| value.kind() == "by_ref").unwrap_or(false);
        let value = match value_node {
            Some(value) if matches!(value.kind(), "by_ref" | "variadic_unpacking") => {
                self.lower_inner_expression(value)
            }
            Some(value) => self.lower_expr(value),
            None => self.error_expr(&node),
        };

        self.build(NodeKind::ExprArrayItem, &node)
            .opt_node("key", key)
            .node("value", value)
            .by_ref(by_ref)
            .unpack(unpack)
            .build()
    }

    fn lower_arguments(&self, node: Node<'_>) -> Vec<SyntaxNode> {
        named_children(node)
            .into_iter()
            .filter_map(|child| match child.kind() {
                "argument" => Some(self.lower_argument(child)),
                "variadic_placeholder" => {
                    Some(self.build(NodeKind::VariadicPlaceholder, &child).build())
                }
                _ => None,
            })
            .collect()
    }

    fn lower_argument(&self, node: Node<'_>) -> SyntaxNode {
        let name_node = node.child_by_field_name("name");
        let value_node = named_children(node)
            .into_iter()
            .filter(|child| Some(*child) != name_node)
            .last();

        let unpack = self.text(&node).trim_start().starts_with("...")
            || value_node
                .map(|value| value.kind() == "variadic_unpacking")
                .unwrap_or(false);

        let value = match value_node {
            Some(value) if value.kind() == "variadic_unpacking" => self.lower_inner_expression(value),
            Some(value) => self.lower_expr(value),
            None => self.error_expr(&node),
        };

        self.build(NodeKind::Arg, &node)
            .opt_node("name", name_node.map(|name| self.identifier(name)))
            .node("value", value)
            .unpack(unpack)
            .by_ref(self.has_token(node, "&"))
            .build()
    }

    fn arguments_of(&self, node: Node<'_>) -> Vec<SyntaxNode> {
        node.child_by_field_name("arguments")
            .or_else(|| {
                named_children(node)
                    .into_iter()
                    .find(|child| child.kind() == "arguments")
            })
            .map(|args| self.lower_arguments(args))
            .unwrap_or_default()
    }

    /// Класс в `new X`, `X::y`, `instanceof X`
    fn lower_class_ref(&self, node: Node<'_>) -> SyntaxNode {
        match node.kind() {
            "name" | "qualified_name" | "relative_scope" | "named_type" => self.lower_name(node),
            _ => self.lower_expr(node),
        }
    }

    /// Имя члена в `$a->name`, `$a->$name`, `$a->{expr}`
    fn lower_member_name(&self, node: Option<Node<'_>>, owner: &Node<'_>) -> SyntaxNode {
        match node {
            Some(name) if name.kind() == "name" => self.identifier(name),
            Some(name) => self.lower_expr(name),
            None => self.error_expr(owner),
        }
    }

    fn lower_exit(&self, node: Node<'_>, expr: Option<SyntaxNode>) -> SyntaxNode {
        self.build(NodeKind::ExprExit, &node)
            .opt_node("expr", expr)
            .build()
    }

    /// Понижение выражения
    pub fn lower_expr(&self, node: Node<'_>) -> SyntaxNode {
        match node.kind() {
            "parenthesized_expression" => self.lower_inner_expression(node),
            "assignment_expression" => {
                let left = node.child_by_field_name("left");
                let right = node.child_by_field_name("right");
                self.build(NodeKind::ExprAssign, &node)
                    .node(
                        "var",
                        left.map(|left| self.lower_assign_target(left))
                            .unwrap_or_else(|| self.error_expr(&node)),
                    )
                    .node(
                        "expr",
                        right.map(|right| self.lower_expr(right))
                            .unwrap_or_else(|| self.error_expr(&node)),
                    )
                    .build()
            }
            "reference_assignment_expression" => {
                let left = node.child_by_field_name("left");
                let right = node.child_by_field_name("right");
                self.build(NodeKind::ExprAssignRef, &node)
                    .node(
                        "var",
                        left.map(|left| self.lower_assign_target(left))
                            .unwrap_or_else(|| self.error_expr(&node)),
                    )
                    .node(
                        "expr",
                        right.map(|right| self.lower_expr(right))
                            .unwrap_or_else(|| self.error_expr(&node)),
                    )
                    .build()
            }
            "augmented_assignment_expression" => self.lower_assign_op(node),
            "binary_expression" => self.lower_binary(node),
            "unary_op_expression" => self.lower_unary(node),
            "error_suppression_expression" => self
                .build(NodeKind::ExprErrorSuppress, &node)
                .node("expr", self.lower_inner_expression(node))
                .build(),
            "cast_expression" => self.lower_cast(node),
            "update_expression" => self.lower_update(node),
            "conditional_expression" => self.lower_ternary(node),
            "function_call_expression" => self.lower_function_call(node),
            "member_call_expression" | "nullsafe_member_call_expression" => {
                let kind = if node.kind() == "member_call_expression" {
                    NodeKind::ExprMethodCall
                } else {
                    NodeKind::ExprNullsafeMethodCall
                };
                let object = node
                    .child_by_field_name("object")
                    .map(|object| self.lower_expr(object))
                    .unwrap_or_else(|| self.error_expr(&node));
                self.build(kind, &node)
                    .node("var", object)
                    .node(
                        "name",
                        self.lower_member_name(node.child_by_field_name("name"), &node),
                    )
                    .nodes("args", self.arguments_of(node))
                    .build()
            }
            "scoped_call_expression" => {
                let scope = node
                    .child_by_field_name("scope")
                    .map(|scope| self.lower_class_ref(scope))
                    .unwrap_or_else(|| self.error_expr(&node));
                self.build(NodeKind::ExprStaticCall, &node)
                    .node("class", scope)
                    .node(
                        "name",
                        self.lower_member_name(node.child_by_field_name("name"), &node),
                    )
                    .nodes("args", self.arguments_of(node))
                    .build()
            }
            "member_access_expression" | "nullsafe_member_access_expression" => {
                let kind = if node.kind() == "member_access_expression" {
                    NodeKind::ExprPropertyFetch
                } else {
                    NodeKind::ExprNullsafePropertyFetch
                };
                let object = node
                    .child_by_field_name("object")
                    .map(|object| self.lower_expr(object))
                    .unwrap_or_else(|| self.error_expr(&node));
                self.build(kind, &node)
                    .node("var", object)
                    .node(
                        "name",
                        self.lower_member_name(node.child_by_field_name("name"), &node),
                    )
                    .build()
            }
            "scoped_property_access_expression" => {
                let scope = node
                    .child_by_field_name("scope")
                    .map(|scope| self.lower_class_ref(scope))
                    .unwrap_or_else(|| self.error_expr(&node));
                let name = match node.child_by_field_name("name") {
                    Some(name) if matches!(name.kind(), "variable_name" | "name") => self
                        .build(NodeKind::VarLikeIdentifier, &name)
                        .string("name", self.text(&name).trim_start_matches('$'))
                        .build(),
                    other => self.lower_member_name(other, &node),
                };
                self.build(NodeKind::ExprStaticPropertyFetch, &node)
                    .node("class", scope)
                    .node("name", name)
                    .build()
            }
            "class_constant_access_expression" => {
                let parts = named_children(node);
                let class = parts
                    .first()
                    .map(|scope| self.lower_class_ref(*scope))
                    .unwrap_or_else(|| self.error_expr(&node));
                let name = parts
                    .get(1)
                    .map(|name| self.identifier(*name))
                    .unwrap_or_else(|| self.identifier(node));
                self.build(NodeKind::ExprClassConstFetch, &node)
                    .node("class", class)
                    .node("name", name)
                    .build()
            }
            "subscript_expression" => {
                let parts = named_children(node);
                let var = parts
                    .first()
                    .map(|var| self.lower_expr(*var))
                    .unwrap_or_else(|| self.error_expr(&node));
                let dim = parts.get(1).map(|dim| self.lower_expr(*dim));
                self.build(NodeKind::ExprArrayDimFetch, &node)
                    .node("var", var)
                    .opt_node("dim", dim)
                    .build()
            }
            "object_creation_expression" => self.lower_new(node),
            "array_creation_expression" => self.lower_array(node),
            "list_literal" => self.lower_list(node),
            "anonymous_function" | "anonymous_function_creation_expression" => {
                self.lower_closure(node)
            }
            "arrow_function" => {
                let body = node
                    .child_by_field_name("body")
                    .map(|body| self.lower_expr(body))
                    .unwrap_or_else(|| self.error_expr(&node));
                self.build(NodeKind::ExprArrowFunction, &node)
                    .nodes("params", self.lower_params(node))
                    .opt_node("returnType", self.lower_return_type(node))
                    .node("expr", body)
                    .nodes("attrGroups", self.lower_attributes(node))
                    .by_ref(self.has_token(node, "&"))
                    .build()
            }
            "match_expression" => self.lower_match(node),
            "yield_expression" => self.lower_yield(node),
            "include_expression" | "include_once_expression" | "require_expression"
            | "require_once_expression" => {
                let include_kind = match node.kind() {
                    "include_expression" => IncludeKind::Include,
                    "include_once_expression" => IncludeKind::IncludeOnce,
                    "require_expression" => IncludeKind::Require,
                    _ => IncludeKind::RequireOnce,
                };
                self.build(NodeKind::ExprInclude, &node)
                    .node("expr", self.lower_inner_expression(node))
                    .include_kind(include_kind)
                    .build()
            }
            "clone_expression" => self
                .build(NodeKind::ExprClone, &node)
                .node("expr", self.lower_inner_expression(node))
                .build(),
            "print_intrinsic" => self
                .build(NodeKind::ExprPrint, &node)
                .node("expr", self.lower_inner_expression(node))
                .build(),
            "throw_expression" => self
                .build(NodeKind::ExprThrow, &node)
                .node("expr", self.lower_inner_expression(node))
                .build(),
            "shell_command_expression" => self.build(NodeKind::ExprShellExec, &node).build(),
            "exit_statement" => self.lower_exit(node, self.first_expression(node)),
            "variable_name" => self
                .build(NodeKind::ExprVariable, &node)
                .string("name", self.text(&node).trim_start_matches('$'))
                .build(),
            "dynamic_variable_name" => self
                .build(NodeKind::ExprVariable, &node)
                .node("name", self.lower_inner_expression(node))
                .build(),
            "by_ref" | "reference_modifier" => self.lower_inner_expression(node),
            "name" | "qualified_name" | "boolean" | "null" => self.lower_constant(node),
            "relative_scope" => self.lower_name(node),
            "integer" => self.lower_integer(node),
            "float" => {
                let raw = self.text(&node);
                let value = raw.replace('_', "").parse::<f64>().unwrap_or(0.0);
                self.build(NodeKind::ScalarDNumber, &node)
                    .float("value", value)
                    .raw(raw)
                    .build()
            }
            "string" => self
                .build(NodeKind::ScalarString, &node)
                .string("value", unquote(self.text(&node)))
                .raw(self.text(&node))
                .build(),
            "encapsed_string" | "heredoc" | "nowdoc" => self.lower_encapsed(node),
            "sequence_expression" => {
                // В позиции одного выражения значимо последнее
                let mut exprs = Vec::new();
                self.flatten_sequence(node, &mut exprs);
                exprs.pop().unwrap_or_else(|| self.error_expr(&node))
            }
            other => {
                tracing::debug!("Unsupported expression node '{}' at {}", other, position_of(&node));
                self.error_expr(&node)
            }
        }
    }

    fn lower_assign_op(&self, node: Node<'_>) -> SyntaxNode {
        let operator = node
            .child_by_field_name("operator")
            .map(|operator| self.text(&operator))
            .or_else(|| {
                all_children(node)
                    .into_iter()
                    .find(|child| !child.is_named() && self.text(child).ends_with('='))
                    .map(|child| self.text(&child))
            })
            .unwrap_or_default();

        let kind = match operator {
            "+=" => NodeKind::AssignOpPlus,
            "-=" => NodeKind::AssignOpMinus,
            "*=" => NodeKind::AssignOpMul,
            "/=" => NodeKind::AssignOpDiv,
            ".=" => NodeKind::AssignOpConcat,
            "%=" => NodeKind::AssignOpMod,
            "**=" => NodeKind::AssignOpPow,
            "&=" => NodeKind::AssignOpBitwiseAnd,
            "|=" => NodeKind::AssignOpBitwiseOr,
            "^=" => NodeKind::AssignOpBitwiseXor,
            "<<=" => NodeKind::AssignOpShiftLeft,
            ">>=" => NodeKind::AssignOpShiftRight,
            "??=" => NodeKind::AssignOpCoalesce,
            other => {
                tracing::debug!("Unknown assignment operator '{}'", other);
                return self.error_expr(&node);
            }
        };

        let left = node.child_by_field_name("left");
        let right = node.child_by_field_name("right");
        self.build(kind, &node)
            .node(
                "var",
                left.map(|left| self.lower_expr(left))
                    .unwrap_or_else(|| self.error_expr(&node)),
            )
            .node(
                "expr",
                right.map(|right| self.lower_expr(right))
                    .unwrap_or_else(|| self.error_expr(&node)),
            )
            .build()
    }

    fn lower_binary(&self, node: Node<'_>) -> SyntaxNode {
        let operator = node
            .child_by_field_name("operator")
            .map(|operator| self.text(&operator).to_ascii_lowercase())
            .unwrap_or_default();
        let left = node.child_by_field_name("left");
        let right = node.child_by_field_name("right");

        if operator == "instanceof" {
            return self
                .build(NodeKind::ExprInstanceof, &node)
                .node(
                    "expr",
                    left.map(|left| self.lower_expr(left))
                        .unwrap_or_else(|| self.error_expr(&node)),
                )
                .node(
                    "class",
                    right.map(|right| self.lower_class_ref(right))
                        .unwrap_or_else(|| self.error_expr(&node)),
                )
                .build();
        }

        let kind = match operator.as_str() {
            "+" => NodeKind::BinaryOpPlus,
            "-" => NodeKind::BinaryOpMinus,
            "*" => NodeKind::BinaryOpMul,
            "/" => NodeKind::BinaryOpDiv,
            "%" => NodeKind::BinaryOpMod,
            "**" => NodeKind::BinaryOpPow,
            "." => NodeKind::BinaryOpConcat,
            "&" => NodeKind::BinaryOpBitwiseAnd,
            "|" => NodeKind::BinaryOpBitwiseOr,
            "^" => NodeKind::BinaryOpBitwiseXor,
            "<<" => NodeKind::BinaryOpShiftLeft,
            ">>" => NodeKind::BinaryOpShiftRight,
            "&&" => NodeKind::BinaryOpBooleanAnd,
            "||" => NodeKind::BinaryOpBooleanOr,
            "and" => NodeKind::BinaryOpLogicalAnd,
            "or" => NodeKind::BinaryOpLogicalOr,
            "xor" => NodeKind::BinaryOpLogicalXor,
            "??" => NodeKind::BinaryOpCoalesce,
            "==" => NodeKind::BinaryOpEqual,
            "!=" | "<>" => NodeKind::BinaryOpNotEqual,
            "===" => NodeKind::BinaryOpIdentical,
            "!==" => NodeKind::BinaryOpNotIdentical,
            "<" => NodeKind::BinaryOpSmaller,
            "<=" => NodeKind::BinaryOpSmallerOrEqual,
            ">" => NodeKind::BinaryOpGreater,
            ">=" => NodeKind::BinaryOpGreaterOrEqual,
            "<=>" => NodeKind::BinaryOpSpaceship,
            other => {
                tracing::debug!("Unknown binary operator '{}'", other);
                return self.error_expr(&node);
            }
        };

        self.build(kind, &node)
            .node(
                "left",
                left.map(|left| self.lower_expr(left))
                    .unwrap_or_else(|| self.error_expr(&node)),
            )
            .node(
                "right",
                right.map(|right| self.lower_expr(right))
                    .unwrap_or_else(|| self.error_expr(&node)),
            )
            .build()
    }

    fn lower_unary(&self, node: Node<'_>) -> SyntaxNode {
        let operator = node
            .child_by_field_name("operator")
            .or_else(|| all_children(node).into_iter().find(|child| !child.is_named()))
            .map(|operator| self.text(&operator))
            .unwrap_or_default();

        let kind = match operator {
            "!" => NodeKind::ExprBooleanNot,
            "~" => NodeKind::ExprBitwiseNot,
            "-" => NodeKind::ExprUnaryMinus,
            "+" => NodeKind::ExprUnaryPlus,
            "@" => NodeKind::ExprErrorSuppress,
            other => {
                tracing::debug!("Unknown unary operator '{}'", other);
                return self.error_expr(&node);
            }
        };

        let argument = node
            .child_by_field_name("argument")
            .or_else(|| named_children(node).into_iter().last())
            .map(|argument| self.lower_expr(argument))
            .unwrap_or_else(|| self.error_expr(&node));

        self.build(kind, &node).node("expr", argument).build()
    }

    fn lower_cast(&self, node: Node<'_>) -> SyntaxNode {
        let cast_type = node
            .child_by_field_name("type")
            .or_else(|| {
                named_children(node)
                    .into_iter()
                    .find(|child| child.kind() == "cast_type")
            })
            .map(|ty| self.text(&ty).trim().to_ascii_lowercase())
            .unwrap_or_default();

        let kind = match cast_type.as_str() {
            "int" | "integer" => NodeKind::CastInt,
            "bool" | "boolean" => NodeKind::CastBool,
            "float" | "double" | "real" => NodeKind::CastDouble,
            "string" | "binary" => NodeKind::CastString,
            "array" => NodeKind::CastArray,
            "object" => NodeKind::CastObject,
            "unset" => NodeKind::CastUnset,
            other => {
                tracing::debug!("Unknown cast type '{}'", other);
                return self.error_expr(&node);
            }
        };

        let value = node
            .child_by_field_name("value")
            .or_else(|| named_children(node).into_iter().last())
            .map(|value| self.lower_expr(value))
            .unwrap_or_else(|| self.error_expr(&node));

        self.build(kind, &node).node("expr", value).build()
    }

    fn lower_update(&self, node: Node<'_>) -> SyntaxNode {
        let children = all_children(node);
        let prefix = children.first().map(|first| !first.is_named()).unwrap_or(false);
        let increment = self.text(&node).contains("++");

        let kind = match (prefix, increment) {
            (true, true) => NodeKind::ExprPreInc,
            (true, false) => NodeKind::ExprPreDec,
            (false, true) => NodeKind::ExprPostInc,
            (false, false) => NodeKind::ExprPostDec,
        };

        self.build(kind, &node)
            .node("var", self.lower_inner_expression(node))
            .build()
    }

    fn lower_ternary(&self, node: Node<'_>) -> SyntaxNode {
        let cond = node.child_by_field_name("condition");
        let body = node.child_by_field_name("body");
        let alternative = node.child_by_field_name("alternative");

        let (cond, body, alternative) = match (cond, alternative) {
            (Some(cond), Some(alternative)) => (Some(cond), body, Some(alternative)),
            _ => {
                let parts = named_children(node);
                match parts.len() {
                    3 => (Some(parts[0]), Some(parts[1]), Some(parts[2])),
                    2 => (Some(parts[0]), None, Some(parts[1])),
                    _ => (None, None, None),
                }
            }
        };

        self.build(NodeKind::ExprTernary, &node)
            .node(
                "cond",
                cond.map(|cond| self.lower_expr(cond))
                    .unwrap_or_else(|| self.error_expr(&node)),
            )
            .opt_node("if", body.map(|body| self.lower_expr(body)))
            .node(
                "else",
                alternative
                    .map(|alternative| self.lower_expr(alternative))
                    .unwrap_or_else(|| self.error_expr(&node)),
            )
            .build()
    }

    /// Вызов функции; языковые конструкции `isset`, `empty`, `eval`, `exit` выделяются
    fn lower_function_call(&self, node: Node<'_>) -> SyntaxNode {
        let function = node.child_by_field_name("function");
        let args = self.arguments_of(node);

        if let Some(function) = function {
            if matches!(function.kind(), "name" | "qualified_name") {
                let name = self.text(&function).to_ascii_lowercase();
                let mut values = args
                    .iter()
                    .filter_map(|arg| arg.child("value").cloned())
                    .collect::<Vec<_>>();

                match name.as_str() {
                    "isset" => {
                        return self
                            .build(NodeKind::ExprIsset, &node)
                            .nodes("vars", values)
                            .build()
                    }
                    "empty" if !values.is_empty() => {
                        return self
                            .build(NodeKind::ExprEmpty, &node)
                            .node("expr", values.remove(0))
                            .build()
                    }
                    "eval" if !values.is_empty() => {
                        return self
                            .build(NodeKind::ExprEval, &node)
                            .node("expr", values.remove(0))
                            .build()
                    }
                    "exit" | "die" => {
                        let expr = if values.is_empty() {
                            None
                        } else {
                            Some(values.remove(0))
                        };
                        return self.lower_exit(node, expr);
                    }
                    _ => {}
                }
            }
        }

        let name = match function {
            Some(function) if matches!(function.kind(), "name" | "qualified_name") => {
                self.lower_name(function)
            }
            Some(function) => self.lower_expr(function),
            None => self.error_expr(&node),
        };

        self.build(NodeKind::ExprFuncCall, &node)
            .node("name", name)
            .nodes("args", args)
            .build()
    }

    fn lower_new(&self, node: Node<'_>) -> SyntaxNode {
        let children = named_children(node);

        if let Some(anonymous) = children
            .iter()
            .find(|child| child.kind() == "anonymous_class")
        {
            let (class, args) = self.lower_anonymous_class(*anonymous);
            return self
                .build(NodeKind::ExprNew, &node)
                .node("class", class)
                .nodes("args", args)
                .build();
        }

        if children.iter().any(|child| child.kind() == "declaration_list") {
            let (class, args) = self.lower_anonymous_class(node);
            return self
                .build(NodeKind::ExprNew, &node)
                .node("class", class)
                .nodes("args", args)
                .build();
        }

        let class = children
            .iter()
            .find(|child| !matches!(child.kind(), "arguments" | "attribute_list"))
            .map(|class| self.lower_class_ref(*class))
            .unwrap_or_else(|| self.error_expr(&node));

        self.build(NodeKind::ExprNew, &node)
            .node("class", class)
            .nodes("args", self.arguments_of(node))
            .build()
    }

    fn lower_closure(&self, node: Node<'_>) -> SyntaxNode {
        let uses = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "anonymous_function_use_clause")
            .flat_map(named_children)
            .map(|captured| {
                let by_ref = captured.kind() == "by_ref" || self.has_token(captured, "&");
                let var = match captured.kind() {
                    "by_ref" => self.lower_inner_expression(captured),
                    _ => self.lower_expr(captured),
                };
                self.build(NodeKind::ExprClosureUse, &captured)
                    .node("var", var)
                    .by_ref(by_ref)
                    .build()
            })
            .collect();

        let flags = if self.has_token(node, "static")
            || named_children(node)
                .iter()
                .any(|child| child.kind() == "static_modifier")
        {
            modifiers::STATIC
        } else {
            0
        };

        self.build(NodeKind::ExprClosure, &node)
            .nodes("params", self.lower_params(node))
            .nodes("uses", uses)
            .opt_node("returnType", self.lower_return_type(node))
            .nodes("stmts", self.lower_body(node.child_by_field_name("body")))
            .nodes("attrGroups", self.lower_attributes(node))
            .by_ref(self.has_token(node, "&"))
            .flags(flags)
            .build()
    }

    fn lower_match(&self, node: Node<'_>) -> SyntaxNode {
        let mut arms = Vec::new();

        let block = node.child_by_field_name("body").or_else(|| {
            named_children(node)
                .into_iter()
                .find(|child| child.kind() == "match_block")
        });

        if let Some(block) = block {
            for arm in named_children(block) {
                let body = arm
                    .child_by_field_name("return_expression")
                    .or_else(|| named_children(arm).into_iter().last())
                    .map(|body| self.lower_expr(body))
                    .unwrap_or_else(|| self.error_expr(&arm));

                match arm.kind() {
                    "match_conditional_expression" => {
                        let conds = named_children(arm)
                            .into_iter()
                            .find(|child| child.kind() == "match_condition_list")
                            .map(|list| self.lower_expression_list(&named_children(list)))
                            .unwrap_or_default();
                        arms.push(
                            self.build(NodeKind::MatchArm, &arm)
                                .nodes("conds", conds)
                                .node("body", body)
                                .build(),
                        );
                    }
                    "match_default_expression" => arms.push(
                        self.build(NodeKind::MatchArm, &arm)
                            .null("conds")
                            .node("body", body)
                            .build(),
                    ),
                    _ => {}
                }
            }
        }

        self.build(NodeKind::ExprMatch, &node)
            .node("cond", self.condition_of(node))
            .nodes("arms", arms)
            .build()
    }

    fn lower_yield(&self, node: Node<'_>) -> SyntaxNode {
        let children = named_children(node);

        if self.has_token(node, "from") || self.text(&node).to_ascii_lowercase().contains("yield from") {
            return self
                .build(NodeKind::ExprYieldFrom, &node)
                .node("expr", self.lower_inner_expression(node))
                .build();
        }

        let (key, value) = match children.first() {
            Some(element) if element.kind() == "array_element_initializer" => {
                let parts = named_children(*element);
                if self.has_token(*element, "=>") && parts.len() >= 2 {
                    (Some(self.lower_expr(parts[0])), Some(self.lower_expr(parts[1])))
                } else {
                    (None, parts.first().map(|value| self.lower_expr(*value)))
                }
            }
            Some(value) => (None, Some(self.lower_expr(*value))),
            None => (None, None),
        };

        self.build(NodeKind::ExprYield, &node)
            .opt_node("key", key)
            .opt_node("value", value)
            .build()
    }

    /// Имя в позиции выражения: магическая константа или обращение к константе
    fn lower_constant(&self, node: Node<'_>) -> SyntaxNode {
        let text = self.text(&node).trim();
        let magic = match text.to_ascii_uppercase().as_str() {
            "__LINE__" => Some(NodeKind::MagicConstLine),
            "__FILE__" => Some(NodeKind::MagicConstFile),
            "__DIR__" => Some(NodeKind::MagicConstDir),
            "__FUNCTION__" => Some(NodeKind::MagicConstFunction),
            "__CLASS__" => Some(NodeKind::MagicConstClass),
            "__TRAIT__" => Some(NodeKind::MagicConstTrait),
            "__METHOD__" => Some(NodeKind::MagicConstMethod),
            "__NAMESPACE__" => Some(NodeKind::MagicConstNamespace),
            _ => None,
        };

        match magic {
            Some(kind) => self.build(kind, &node).build(),
            None => self
                .build(NodeKind::ExprConstFetch, &node)
                .node("name", self.lower_name(node))
                .build(),
        }
    }

    fn lower_integer(&self, node: Node<'_>) -> SyntaxNode {
        let raw = self.text(&node);
        let digits = raw.replace('_', "");
        let lower = digits.to_ascii_lowercase();

        let (kind, parsed) = if let Some(hex) = lower.strip_prefix("0x") {
            (NumberKind::Hexadecimal, i64::from_str_radix(hex, 16))
        } else if let Some(bin) = lower.strip_prefix("0b") {
            (NumberKind::Binary, i64::from_str_radix(bin, 2))
        } else if let Some(oct) = lower.strip_prefix("0o") {
            (NumberKind::Octal, i64::from_str_radix(oct, 8))
        } else if lower.len() > 1 && lower.starts_with('0') {
            (NumberKind::Octal, i64::from_str_radix(&lower[1..], 8))
        } else {
            (NumberKind::Decimal, lower.parse::<i64>())
        };

        match parsed {
            Ok(value) => self
                .build(NodeKind::ScalarLNumber, &node)
                .int("value", value)
                .number(kind, raw)
                .build(),
            // Переполнение превращает литерал в дробный
            Err(_) => self
                .build(NodeKind::ScalarDNumber, &node)
                .float("value", lower.parse::<f64>().unwrap_or(f64::MAX))
                .number(kind, raw)
                .build(),
        }
    }

    /// Строка с интерполяцией; без интерполяции это обычный строковый литерал
    fn lower_encapsed(&self, node: Node<'_>) -> SyntaxNode {
        let mut contents = Vec::new();
        collect_string_parts(node, &mut contents);

        let is_literal = |part: &Node<'_>| {
            matches!(
                part.kind(),
                "string_content" | "string_value" | "escape_sequence" | "text" | "heredoc_start"
                    | "heredoc_end" | "nowdoc_string"
            )
        };

        if contents.iter().all(is_literal) {
            let value: String = contents
                .iter()
                .filter(|part| !matches!(part.kind(), "heredoc_start" | "heredoc_end"))
                .map(|part| self.text(part))
                .collect();
            let value = if contents.is_empty() {
                unquote(self.text(&node)).to_string()
            } else {
                value
            };
            return self
                .build(NodeKind::ScalarString, &node)
                .string("value", value)
                .raw(self.text(&node))
                .build();
        }

        let parts = contents
            .into_iter()
            .filter(|part| !matches!(part.kind(), "heredoc_start" | "heredoc_end"))
            .map(|part| {
                if is_literal(&part) {
                    self.build(NodeKind::ScalarEncapsedStringPart, &part)
                        .string("value", self.text(&part))
                        .build()
                } else {
                    self.lower_expr(part)
                }
            })
            .collect();

        self.build(NodeKind::ScalarEncapsed, &node)
            .nodes("parts", parts)
            .raw(self.text(&node))
            .build()
    }
}

/// Части строки: литеральные фрагменты и интерполированные выражения
fn collect_string_parts<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    for child in named_children(node) {
        match child.kind() {
            "heredoc_body" | "nowdoc_body" => collect_string_parts(child, out),
            _ => out.push(child),
        }
    }
}

fn close_namespace(namespace: SyntaxNode, body: Vec<SyntaxNode>) -> SyntaxNode {
    let position = namespace.position();
    let name = namespace.slot("name").cloned().unwrap_or(SubNode::Null);
    NodeBuilder::new(NodeKind::StmtNamespace)
        .at(position)
        .value("name", name)
        .nodes("stmts", body)
        .build()
}

fn visibility_flag(text: &str) -> u32 {
    match text.trim().to_ascii_lowercase().as_str() {
        "public" => modifiers::PUBLIC,
        "protected" => modifiers::PROTECTED,
        "private" => modifiers::PRIVATE,
        _ => 0,
    }
}

/// Снимает кавычки и префикс `b` с простого строкового литерала
fn unquote(raw: &str) -> &str {
    let raw = raw.strip_prefix(['b', 'B']).unwrap_or(raw);
    let quoted = raw.len() >= 2
        && ((raw.starts_with('\'') && raw.ends_with('\''))
            || (raw.starts_with('"') && raw.ends_with('"')));
    if quoted {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}
