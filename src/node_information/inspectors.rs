//! Инспекторы версий
//!
//! Каждый инспектор смотрит на форму узла (и при необходимости на родителя)
//! и возвращает версию PHP, либо `None`, если правило не сработало.

use crate::language_level::LanguageLevel;
use crate::php_parser::ast::{modifiers, NumberKind, SyntaxNode, UseKind};
use crate::php_parser::kinds::NodeKind;

use super::language_level::InspectionContext;
use super::quirks;

fn child_is(node: &SyntaxNode, slot: &str, kind: NodeKind) -> bool {
    node.child(slot).map(|child| child.is_a(kind)).unwrap_or(false)
}

fn has_child(node: &SyntaxNode, slot: &str) -> bool {
    node.child(slot).is_some()
}

/// Имя типа для сравнения с встроенными типами; составные типы дают пустую строку
fn type_name(ty: &SyntaxNode) -> String {
    if ty.is_a(NodeKind::ComplexType) {
        return String::new();
    }
    ty.text().unwrap_or_default().to_string()
}

pub fn array_dim_fetch_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    let node = ctx.node;
    if child_is(node, "var", NodeKind::CallLike) {
        return Some(LanguageLevel::Php5_4);
    }
    if child_is(node, "var", NodeKind::ExprArray) || child_is(node, "var", NodeKind::ScalarString) {
        return Some(LanguageLevel::Php5_5);
    }
    None
}

pub fn array_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    use crate::php_parser::ast::ArraySyntax;

    match ctx.node.attributes().array_syntax {
        Some(ArraySyntax::Short) => Some(LanguageLevel::Php5_4),
        _ => None,
    }
}

pub fn assign_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    if child_is(ctx.node, "var", NodeKind::ExprArray) {
        return Some(LanguageLevel::Php7_1);
    }
    None
}

pub fn class_const_fetch_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    let name = ctx.node.child("name")?;
    if name.kind() == NodeKind::Identifier && name.text() == Some("class") {
        return Some(LanguageLevel::Php5_5);
    }
    None
}

/// Захват суперглобальной переменной или параметра замыкания запрещен с 7.0
pub fn closure_use_to(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    let var = ctx.node.child("var")?.str_slot("name")?;

    if quirks::is_superglobal(var) {
        return Some(LanguageLevel::Php7_0);
    }

    let parent = ctx.parent?;
    let params = parent.children("params");
    if quirks::parameter_variable_names(&params).contains(&var) {
        return Some(LanguageLevel::Php7_0);
    }

    None
}

pub fn const_fetch_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    match ctx.node.child("name").and_then(SyntaxNode::text) {
        Some("E_USER_DEPRECATED") => Some(LanguageLevel::Php5_3),
        _ => None,
    }
}

pub fn empty_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    if !child_is(ctx.node, "expr", NodeKind::ExprVariable) {
        return Some(LanguageLevel::Php5_5);
    }
    None
}

pub fn instanceof_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    let node = ctx.node;
    if child_is(node, "class", NodeKind::Expr) && !child_is(node, "class", NodeKind::ExprVariable) {
        return Some(LanguageLevel::Php8_0);
    }
    if child_is(node, "expr", NodeKind::ExprConstFetch) {
        return Some(LanguageLevel::Php7_3);
    }
    None
}

pub fn isset_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    ctx.node
        .children("vars")
        .iter()
        .any(|var| var.kind() == NodeKind::ExprVariable)
        .then_some(LanguageLevel::Php5_5)
}

pub fn list_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    for item in ctx.node.children("items") {
        if item.attributes().by_ref {
            return Some(LanguageLevel::Php7_2);
        }
        if has_child(item, "key") {
            return Some(LanguageLevel::Php7_1);
        }
    }
    None
}

pub fn method_call_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    let name = ctx.node.child("name")?;
    if name.kind() != NodeKind::ExprVariable {
        return None;
    }
    let name = name.str_slot("name")?;
    quirks::is_semi_reserved_keyword(name).then_some(LanguageLevel::Php7_0)
}

pub fn new_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    let class = ctx.node.child("class")?;
    if class.is_a(NodeKind::Expr)
        && !matches!(
            class.kind(),
            NodeKind::ExprVariable | NodeKind::ExprPropertyFetch | NodeKind::ExprArrayDimFetch
        )
    {
        return Some(LanguageLevel::Php8_0);
    }
    if class.kind() == NodeKind::StmtClass {
        return Some(LanguageLevel::Php7_0);
    }
    None
}

/// Общее правило для целых и дробных литералов
pub fn number_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    let attributes = ctx.node.attributes();
    let kind = attributes.number_kind.unwrap_or(NumberKind::Decimal);
    let raw = attributes.raw_value.as_deref();

    if kind == NumberKind::Octal {
        if let Some(second) = raw.and_then(|raw| raw.chars().nth(1)) {
            if second == 'o' || second == 'O' {
                return Some(LanguageLevel::Php8_1);
            }
        }
    }
    if raw.map(|raw| raw.contains('_')).unwrap_or(false) {
        return Some(LanguageLevel::Php7_4);
    }
    if kind == NumberKind::Binary {
        return Some(LanguageLevel::Php5_4);
    }
    None
}

pub fn lnumber_to(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    let attributes = ctx.node.attributes();
    if attributes.number_kind != Some(NumberKind::Octal) {
        return None;
    }
    let raw = attributes.raw_value.as_deref()?;
    if raw.chars().count() == 3 && raw.starts_with(['4', '5', '6', '7']) {
        return Some(LanguageLevel::Php7_0);
    }
    None
}

pub fn catch_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    if !has_child(ctx.node, "var") {
        return Some(LanguageLevel::Php8_0);
    }
    if ctx.node.children("types").len() > 1 {
        return Some(LanguageLevel::Php7_1);
    }
    None
}

pub fn class_const_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    let flags = ctx.node.flags();
    if flags & modifiers::FINAL != 0 {
        return Some(LanguageLevel::Php8_1);
    }
    if quirks::flags_have_visibility_modifier(flags) {
        return Some(LanguageLevel::Php7_1);
    }
    None
}

fn return_type_level(node: &SyntaxNode) -> Option<LanguageLevel> {
    let return_type = node.child("returnType")?;
    let level = match type_name(return_type).as_str() {
        "never" | "noreturn" => LanguageLevel::Php8_1,
        "object" => LanguageLevel::Php7_2,
        "void" | "iterable" => LanguageLevel::Php7_1,
        _ => LanguageLevel::Php7_0,
    };
    Some(level)
}

pub fn class_method_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    if let Some(level) = return_type_level(ctx.node) {
        return Some(level);
    }

    let name = ctx.node.child("name").and_then(SyntaxNode::text).unwrap_or_default();
    if quirks::is_semi_reserved_keyword(name) {
        return Some(LanguageLevel::Php7_0);
    }

    match name {
        "__invoke" | "__callStatic" => Some(LanguageLevel::Php5_3),
        "__debugInfo" => Some(LanguageLevel::Php5_6),
        "__serialize" | "__unserialize" => Some(LanguageLevel::Php7_4),
        _ => None,
    }
}

pub fn class_method_to(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    match ctx.node.child("name").and_then(SyntaxNode::text) {
        Some("__autoload") => Some(LanguageLevel::Php7_1),
        _ => None,
    }
}

/// Классы с именами, ставшими зарезервированными типами
pub fn class_to(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    match ctx.node.child("name").and_then(SyntaxNode::text).unwrap_or_default() {
        "void" | "iterable" => Some(LanguageLevel::Php7_0),
        "object" => Some(LanguageLevel::Php7_1),
        _ => None,
    }
}

pub fn const_stmt_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    ctx.node
        .children("consts")
        .iter()
        .any(|constant| child_is(constant, "value", NodeKind::ExprNew))
        .then_some(LanguageLevel::Php8_1)
}

pub fn foreach_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    if child_is(ctx.node, "valueVar", NodeKind::ExprList) {
        return Some(LanguageLevel::Php5_5);
    }
    if child_is(ctx.node, "valueVar", NodeKind::ExprArray) {
        return Some(LanguageLevel::Php7_1);
    }
    None
}

pub fn function_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    return_type_level(ctx.node)
}

pub fn property_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    if ctx.node.flags() & modifiers::READONLY != 0 {
        return Some(LanguageLevel::Php8_1);
    }
    if has_child(ctx.node, "type") {
        return Some(LanguageLevel::Php7_4);
    }
    None
}

pub fn static_var_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    child_is(ctx.node, "default", NodeKind::ExprNew).then_some(LanguageLevel::Php8_1)
}

pub fn use_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    match ctx.node.attributes().use_kind {
        Some(UseKind::Function) => Some(LanguageLevel::Php5_6),
        _ => Some(LanguageLevel::Php5_3),
    }
}

pub fn arg_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    if has_child(ctx.node, "name") {
        return Some(LanguageLevel::Php8_0);
    }
    if ctx.node.attributes().unpack {
        return Some(LanguageLevel::Php5_6);
    }
    None
}

pub fn attribute_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    let new_in_args = ctx
        .node
        .children("args")
        .iter()
        .any(|arg| child_is(arg, "value", NodeKind::ExprNew));

    if new_in_args {
        Some(LanguageLevel::Php8_1)
    } else {
        Some(LanguageLevel::Php8_0)
    }
}

pub fn const_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    let name = ctx.node.child("name").and_then(SyntaxNode::text).unwrap_or_default();
    if quirks::is_semi_reserved_keyword(name) {
        return Some(LanguageLevel::Php7_0);
    }
    if !child_is(ctx.node, "value", NodeKind::Scalar) {
        return Some(LanguageLevel::Php5_5);
    }
    None
}

pub fn param_from(ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
    let node = ctx.node;
    if child_is(node, "default", NodeKind::ExprNew) {
        return Some(LanguageLevel::Php8_1);
    }

    if let Some(ty) = node.child("type") {
        match type_name(ty).as_str() {
            "object" => return Some(LanguageLevel::Php7_2),
            "iterable" => return Some(LanguageLevel::Php7_1),
            "int" | "float" | "string" | "bool" => return Some(LanguageLevel::Php7_0),
            "callable" => return Some(LanguageLevel::Php5_4),
            _ => {}
        }
    }

    if node.attributes().variadic {
        return Some(LanguageLevel::Php5_6);
    }
    None
}
