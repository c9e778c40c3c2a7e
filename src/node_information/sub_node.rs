//! Объявления слотов узлов
//!
//! Для каждого вида узла перечислены слоты, которые участвуют во взвешенной
//! агрегации, и классы значений, допустимые в каждом слоте.

use std::fmt;

use crate::core::errors::TaxonomyError;
use crate::php_parser::kinds::NodeKind;

use super::mapping::{NodeInformationMapping, NodeInformationRegistrar};

/// Класс значения в слоте
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassName {
    Kind(NodeKind),
    Null,
    Int,
    Float,
    String,
}

impl ClassName {
    pub fn label(self) -> &'static str {
        match self {
            ClassName::Kind(kind) => kind.name(),
            ClassName::Null => "null",
            ClassName::Int => "int",
            ClassName::Float => "float",
            ClassName::String => "string",
        }
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<NodeKind> for ClassName {
    fn from(kind: NodeKind) -> Self {
        ClassName::Kind(kind)
    }
}

/// Объявление одного слота
#[derive(Debug, Clone, PartialEq)]
pub struct SubNodeDefinition {
    class_names: Vec<ClassName>,
    is_array: bool,
}

impl SubNodeDefinition {
    pub fn new(class_names: Vec<ClassName>, is_array: bool, nullable: bool) -> Self {
        let mut class_names = class_names;
        if nullable && !class_names.contains(&ClassName::Null) {
            class_names.push(ClassName::Null);
        }
        Self {
            class_names,
            is_array,
        }
    }

    pub fn class_names(&self) -> &[ClassName] {
        &self.class_names
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn is_null_allowed(&self) -> bool {
        self.class_names.contains(&ClassName::Null)
    }

    /// Допускает ли слот класс с указанной меткой
    pub fn accepts(&self, label: &str) -> bool {
        self.class_names.iter().any(|class| class.label() == label)
    }

    /// Перечень допустимых классов для сообщений об ошибках
    pub fn accepted_list(&self) -> String {
        self.class_names
            .iter()
            .map(|class| class.label())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Слоты вида узла в порядке объявления
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubNodeInformation {
    definitions: Vec<(&'static str, SubNodeDefinition)>,
    duplicate: Option<&'static str>,
}

impl SubNodeInformation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn definitions(&self) -> impl Iterator<Item = (&'static str, &SubNodeDefinition)> {
        self.definitions.iter().map(|(slot, definition)| (*slot, definition))
    }

    pub fn definition(&self, slot: &str) -> Option<&SubNodeDefinition> {
        self.definitions
            .iter()
            .find(|(name, _)| *name == slot)
            .map(|(_, definition)| definition)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Проверка при регистрации: повторно объявленный слот является ошибкой
    pub(crate) fn finish(self, kind: NodeKind) -> Result<Self, TaxonomyError> {
        match self.duplicate {
            Some(slot) => Err(TaxonomyError::DuplicateSlot {
                kind: kind.name(),
                slot,
            }),
            None => Ok(self),
        }
    }

    fn define(mut self, slot: &'static str, definition: SubNodeDefinition) -> Self {
        if self.definitions.iter().any(|(name, _)| *name == slot) {
            self.duplicate.get_or_insert(slot);
        } else {
            self.definitions.push((slot, definition));
        }
        self
    }

    /// Одиночный слот
    pub fn with(self, slot: &'static str, classes: &[ClassName]) -> Self {
        self.define(slot, SubNodeDefinition::new(classes.to_vec(), false, false))
    }

    /// Одиночный слот, допускающий null
    pub fn with_nullable(self, slot: &'static str, classes: &[ClassName]) -> Self {
        self.define(slot, SubNodeDefinition::new(classes.to_vec(), false, true))
    }

    /// Слот-массив
    pub fn with_array(self, slot: &'static str, classes: &[ClassName]) -> Self {
        self.define(slot, SubNodeDefinition::new(classes.to_vec(), true, false))
    }

    /// Слот-массив, элементы которого могут быть null
    pub fn with_nullable_array(self, slot: &'static str, classes: &[ClassName]) -> Self {
        self.define(slot, SubNodeDefinition::new(classes.to_vec(), true, true))
    }

    pub fn with_expr(self, slot: &'static str) -> Self {
        self.with(slot, &[EXPR])
    }

    pub fn with_exprs(self, slot: &'static str) -> Self {
        self.with_array(slot, &[EXPR])
    }

    /// Слот `stmts`
    pub fn with_stmts(self) -> Self {
        self.with_array("stmts", &[STMT])
    }

    pub fn with_params(self) -> Self {
        self.with_array("params", &[ClassName::Kind(NodeKind::Param)])
    }

    pub fn with_attr_groups(self) -> Self {
        self.with_array("attrGroups", &[ClassName::Kind(NodeKind::AttributeGroup)])
    }

    pub fn with_args(self) -> Self {
        self.with_array(
            "args",
            &[
                ClassName::Kind(NodeKind::Arg),
                ClassName::Kind(NodeKind::VariadicPlaceholder),
            ],
        )
    }

    pub fn with_type(self, slot: &'static str) -> Self {
        self.with(
            slot,
            &[
                ClassName::Null,
                ClassName::Kind(NodeKind::Identifier),
                ClassName::Kind(NodeKind::Name),
                ClassName::Kind(NodeKind::ComplexType),
            ],
        )
    }

    pub fn with_return(self) -> Self {
        self.with_type("returnType")
    }

    /// Копирует объявления другого вида
    pub fn include(mut self, other: &SubNodeInformation) -> Self {
        for (slot, definition) in other.definitions() {
            self = self.define(slot, definition.clone());
        }
        self
    }
}

const EXPR: ClassName = ClassName::Kind(NodeKind::Expr);
const STMT: ClassName = ClassName::Kind(NodeKind::Stmt);
const NAME: ClassName = ClassName::Kind(NodeKind::Name);
const IDENTIFIER: ClassName = ClassName::Kind(NodeKind::Identifier);

fn kind(kind: NodeKind) -> ClassName {
    ClassName::Kind(kind)
}

/// Стандартные объявления слотов
pub struct SubNodeInformationRegistrar;

impl NodeInformationRegistrar for SubNodeInformationRegistrar {
    fn register(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
        register_expr(mapping)?;
        register_names(mapping)?;
        register_scalars(mapping)?;
        register_stmts(mapping)?;
        register_other(mapping)?;
        Ok(())
    }
}

fn register_expr(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
    use NodeKind::*;

    let name_or_expr = [NAME, EXPR];
    let identifier_or_expr = [IDENTIFIER, EXPR];

    mapping.map_sub_nodes(
        ExprArrayDimFetch,
        SubNodeInformation::new()
            .with_expr("var")
            .with_nullable("dim", &[EXPR]),
    )?;
    mapping.map_sub_nodes(
        ExprArrayItem,
        SubNodeInformation::new()
            .with_nullable("key", &[EXPR])
            .with_expr("value"),
    )?;
    mapping.map_sub_nodes(
        ExprArray,
        SubNodeInformation::new().with_nullable_array("items", &[kind(ExprArrayItem)]),
    )?;
    mapping.map_sub_nodes(
        ExprArrowFunction,
        SubNodeInformation::new()
            .with_params()
            .with_return()
            .with_expr("expr")
            .with_attr_groups(),
    )?;
    for assign in [ExprAssign, AssignOp, ExprAssignRef] {
        mapping.map_sub_nodes(
            assign,
            SubNodeInformation::new().with_expr("var").with_expr("expr"),
        )?;
    }
    mapping.map_sub_nodes(
        BinaryOp,
        SubNodeInformation::new().with_expr("left").with_expr("right"),
    )?;
    for unary in [
        ExprBitwiseNot,
        ExprBooleanNot,
        Cast,
        ExprClone,
        ExprEmpty,
        ExprErrorSuppress,
        ExprEval,
        ExprInclude,
        ExprPrint,
        ExprThrow,
        ExprUnaryMinus,
        ExprUnaryPlus,
        ExprYieldFrom,
    ] {
        mapping.map_sub_nodes(unary, SubNodeInformation::new().with_expr("expr"))?;
    }
    mapping.map_sub_nodes(
        ExprClassConstFetch,
        SubNodeInformation::new()
            .with("class", &name_or_expr)
            .with("name", &[IDENTIFIER]),
    )?;
    mapping.map_sub_nodes(
        ExprClosure,
        SubNodeInformation::new()
            .with_params()
            .with_array("uses", &[kind(ExprClosureUse)])
            .with_return()
            .with_stmts()
            .with_attr_groups(),
    )?;
    mapping.map_sub_nodes(
        ExprClosureUse,
        SubNodeInformation::new().with("var", &[kind(ExprVariable)]),
    )?;
    mapping.map_sub_nodes(ExprConstFetch, SubNodeInformation::new().with("name", &[NAME]))?;
    mapping.map_sub_nodes(ExprError, SubNodeInformation::new())?;
    mapping.map_sub_nodes(
        ExprExit,
        SubNodeInformation::new().with_nullable("expr", &[EXPR]),
    )?;
    mapping.map_sub_nodes(
        ExprFuncCall,
        SubNodeInformation::new()
            .with("name", &name_or_expr)
            .with_args(),
    )?;
    mapping.map_sub_nodes(
        ExprInstanceof,
        SubNodeInformation::new()
            .with_expr("expr")
            .with("class", &name_or_expr),
    )?;
    mapping.map_sub_nodes(ExprIsset, SubNodeInformation::new().with_exprs("vars"))?;
    mapping.map_sub_nodes(
        ExprList,
        SubNodeInformation::new().with_nullable_array("items", &[kind(ExprArrayItem)]),
    )?;
    mapping.map_sub_nodes(
        ExprMatch,
        SubNodeInformation::new()
            .with_expr("cond")
            .with_array("arms", &[kind(MatchArm)]),
    )?;
    for call in [ExprMethodCall, ExprNullsafeMethodCall] {
        mapping.map_sub_nodes(
            call,
            SubNodeInformation::new()
                .with_expr("var")
                .with("name", &identifier_or_expr)
                .with_args(),
        )?;
    }
    mapping.map_sub_nodes(
        ExprNew,
        SubNodeInformation::new()
            .with("class", &[NAME, EXPR, kind(StmtClass)])
            .with_args(),
    )?;
    for fetch in [ExprNullsafePropertyFetch, ExprPropertyFetch] {
        mapping.map_sub_nodes(
            fetch,
            SubNodeInformation::new()
                .with_expr("var")
                .with("name", &identifier_or_expr),
        )?;
    }
    for step in [ExprPostDec, ExprPostInc, ExprPreDec, ExprPreInc] {
        mapping.map_sub_nodes(step, SubNodeInformation::new().with_expr("var"))?;
    }
    mapping.map_sub_nodes(ExprShellExec, SubNodeInformation::new())?;
    mapping.map_sub_nodes(
        ExprStaticCall,
        SubNodeInformation::new()
            .with("class", &name_or_expr)
            .with("name", &identifier_or_expr)
            .with_args(),
    )?;
    mapping.map_sub_nodes(
        ExprStaticPropertyFetch,
        SubNodeInformation::new()
            .with("class", &name_or_expr)
            .with("name", &[kind(VarLikeIdentifier), EXPR]),
    )?;
    mapping.map_sub_nodes(
        ExprTernary,
        SubNodeInformation::new()
            .with_expr("cond")
            .with_nullable("if", &[EXPR])
            .with_expr("else"),
    )?;
    mapping.map_sub_nodes(
        ExprVariable,
        SubNodeInformation::new().with("name", &[ClassName::String, EXPR]),
    )?;
    mapping.map_sub_nodes(
        ExprYield,
        SubNodeInformation::new()
            .with_nullable("key", &[EXPR])
            .with_nullable("value", &[EXPR]),
    )?;

    Ok(())
}

fn register_names(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
    for name in [NodeKind::Name, NodeKind::NameFullyQualified, NodeKind::NameRelative] {
        mapping.map_sub_nodes(name, SubNodeInformation::new())?;
    }
    Ok(())
}

fn register_scalars(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
    use NodeKind::*;

    mapping.map_sub_nodes(
        ScalarDNumber,
        SubNodeInformation::new().with("value", &[ClassName::Float]),
    )?;
    mapping.map_sub_nodes(ScalarEncapsed, SubNodeInformation::new().with_exprs("parts"))?;
    mapping.map_sub_nodes(
        ScalarEncapsedStringPart,
        SubNodeInformation::new().with("value", &[ClassName::String]),
    )?;
    mapping.map_sub_nodes(
        ScalarLNumber,
        SubNodeInformation::new().with("value", &[ClassName::Int]),
    )?;
    mapping.map_sub_nodes(MagicConst, SubNodeInformation::new())?;
    mapping.map_sub_nodes(
        ScalarString,
        SubNodeInformation::new().with("value", &[ClassName::String]),
    )?;

    Ok(())
}

fn register_stmts(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
    use NodeKind::*;

    for jump in [StmtBreak, StmtContinue] {
        mapping.map_sub_nodes(jump, SubNodeInformation::new().with_nullable("num", &[EXPR]))?;
    }
    mapping.map_sub_nodes(
        StmtCase,
        SubNodeInformation::new()
            .with_nullable("cond", &[EXPR])
            .with_stmts(),
    )?;
    mapping.map_sub_nodes(
        StmtCatch,
        SubNodeInformation::new()
            .with_array("types", &[NAME])
            .with_nullable("var", &[kind(ExprVariable)])
            .with_stmts(),
    )?;
    mapping.map_sub_nodes(
        StmtClassConst,
        SubNodeInformation::new()
            .with_array("consts", &[kind(Const)])
            .with_attr_groups(),
    )?;
    mapping.map_sub_nodes(
        ClassLike,
        SubNodeInformation::new()
            .with_nullable("name", &[IDENTIFIER])
            .with_stmts()
            .with_attr_groups(),
    )?;
    mapping.map_sub_nodes(
        StmtClassMethod,
        SubNodeInformation::new()
            .with("name", &[IDENTIFIER])
            .with_params()
            .with_return()
            .with_stmts()
            .with_attr_groups(),
    )?;

    let class_like = mapping.get_sub_nodes(ClassLike)?.clone();
    mapping.map_sub_nodes(
        StmtClass,
        SubNodeInformation::new()
            .include(&class_like)
            .with_nullable("extends", &[NAME])
            .with_array("implements", &[NAME]),
    )?;
    mapping.map_sub_nodes(
        StmtInterface,
        SubNodeInformation::new()
            .include(&class_like)
            .with_array("extends", &[NAME]),
    )?;
    mapping.map_sub_nodes(StmtTrait, SubNodeInformation::new().include(&class_like))?;
    mapping.map_sub_nodes(
        StmtEnum,
        SubNodeInformation::new()
            .include(&class_like)
            .with_nullable("scalarType", &[IDENTIFIER])
            .with_array("implements", &[NAME]),
    )?;

    mapping.map_sub_nodes(
        StmtConst,
        SubNodeInformation::new().with_array("consts", &[kind(Const)]),
    )?;
    mapping.map_sub_nodes(
        StmtDeclareDeclare,
        SubNodeInformation::new()
            .with("key", &[IDENTIFIER])
            .with_expr("value"),
    )?;
    mapping.map_sub_nodes(
        StmtDeclare,
        SubNodeInformation::new()
            .with_array("declares", &[kind(StmtDeclareDeclare)])
            .with_stmts(),
    )?;
    mapping.map_sub_nodes(
        StmtDo,
        SubNodeInformation::new().with_stmts().with_expr("cond"),
    )?;
    mapping.map_sub_nodes(StmtEcho, SubNodeInformation::new().with_exprs("exprs"))?;
    mapping.map_sub_nodes(
        StmtElseIf,
        SubNodeInformation::new().with_expr("cond").with_stmts(),
    )?;
    mapping.map_sub_nodes(StmtElse, SubNodeInformation::new().with_stmts())?;
    mapping.map_sub_nodes(
        StmtEnumCase,
        SubNodeInformation::new()
            .with("name", &[IDENTIFIER])
            .with_nullable("expr", &[EXPR])
            .with_attr_groups(),
    )?;
    mapping.map_sub_nodes(StmtExpression, SubNodeInformation::new().with_expr("expr"))?;
    mapping.map_sub_nodes(StmtFinally, SubNodeInformation::new().with_stmts())?;
    mapping.map_sub_nodes(
        StmtFor,
        SubNodeInformation::new()
            .with_exprs("init")
            .with_exprs("cond")
            .with_exprs("loop")
            .with_stmts(),
    )?;
    mapping.map_sub_nodes(
        StmtForeach,
        SubNodeInformation::new()
            .with_expr("expr")
            .with_nullable("keyVar", &[EXPR])
            .with_expr("valueVar")
            .with_stmts(),
    )?;
    mapping.map_sub_nodes(
        StmtFunction,
        SubNodeInformation::new()
            .with("name", &[IDENTIFIER])
            .with_params()
            .with_return()
            .with_stmts()
            .with_attr_groups(),
    )?;
    mapping.map_sub_nodes(StmtGlobal, SubNodeInformation::new().with_exprs("vars"))?;
    mapping.map_sub_nodes(StmtGoto, SubNodeInformation::new().with("name", &[IDENTIFIER]))?;
    mapping.map_sub_nodes(
        StmtGroupUse,
        SubNodeInformation::new()
            .with("prefix", &[NAME])
            .with_array("uses", &[kind(StmtUseUse)]),
    )?;
    mapping.map_sub_nodes(
        StmtHaltCompiler,
        SubNodeInformation::new().with("remaining", &[ClassName::String]),
    )?;
    mapping.map_sub_nodes(
        StmtIf,
        SubNodeInformation::new()
            .with_expr("cond")
            .with_stmts()
            .with_array("elseifs", &[kind(StmtElseIf)])
            .with_nullable("else", &[kind(StmtElse)]),
    )?;
    mapping.map_sub_nodes(
        StmtInlineHtml,
        SubNodeInformation::new().with("value", &[ClassName::String]),
    )?;
    mapping.map_sub_nodes(StmtLabel, SubNodeInformation::new().with("name", &[IDENTIFIER]))?;
    mapping.map_sub_nodes(
        StmtNamespace,
        SubNodeInformation::new()
            .with_nullable("name", &[NAME])
            .with_stmts(),
    )?;
    mapping.map_sub_nodes(StmtNop, SubNodeInformation::new())?;
    mapping.map_sub_nodes(
        StmtProperty,
        SubNodeInformation::new()
            .with_array("props", &[kind(StmtPropertyProperty)])
            .with_type("type")
            .with_attr_groups(),
    )?;
    mapping.map_sub_nodes(
        StmtPropertyProperty,
        SubNodeInformation::new()
            .with("name", &[kind(VarLikeIdentifier)])
            .with_nullable("default", &[EXPR]),
    )?;
    mapping.map_sub_nodes(
        StmtReturn,
        SubNodeInformation::new().with_nullable("expr", &[EXPR]),
    )?;
    mapping.map_sub_nodes(
        StmtStaticVar,
        SubNodeInformation::new()
            .with("var", &[kind(ExprVariable)])
            .with_nullable("default", &[EXPR]),
    )?;
    mapping.map_sub_nodes(
        StmtStatic,
        SubNodeInformation::new().with_array("vars", &[kind(StmtStaticVar)]),
    )?;
    mapping.map_sub_nodes(
        StmtSwitch,
        SubNodeInformation::new()
            .with_expr("cond")
            .with_array("cases", &[kind(StmtCase)]),
    )?;
    mapping.map_sub_nodes(StmtThrow, SubNodeInformation::new().with_expr("expr"))?;
    mapping.map_sub_nodes(
        StmtTraitUse,
        SubNodeInformation::new()
            .with_array("traits", &[NAME])
            .with_array("adaptations", &[kind(TraitUseAdaptation)]),
    )?;
    mapping.map_sub_nodes(
        TraitUseAdaptation,
        SubNodeInformation::new()
            .with_nullable("trait", &[NAME])
            .with("method", &[IDENTIFIER]),
    )?;

    let adaptation = mapping.get_sub_nodes(TraitUseAdaptation)?.clone();
    mapping.map_sub_nodes(
        TraitUseAdaptationAlias,
        SubNodeInformation::new()
            .include(&adaptation)
            .with_nullable("newModifier", &[ClassName::Int])
            .with_nullable("newName", &[IDENTIFIER]),
    )?;
    mapping.map_sub_nodes(
        TraitUseAdaptationPrecedence,
        SubNodeInformation::new()
            .include(&adaptation)
            .with_array("insteadof", &[NAME]),
    )?;

    mapping.map_sub_nodes(
        StmtTryCatch,
        SubNodeInformation::new()
            .with_stmts()
            .with_array("catches", &[kind(StmtCatch)])
            .with_nullable("finally", &[kind(StmtFinally)]),
    )?;
    mapping.map_sub_nodes(StmtUnset, SubNodeInformation::new().with_exprs("vars"))?;
    mapping.map_sub_nodes(
        StmtUseUse,
        SubNodeInformation::new()
            .with("name", &[NAME])
            .with_nullable("alias", &[IDENTIFIER]),
    )?;
    mapping.map_sub_nodes(
        StmtUse,
        SubNodeInformation::new().with_array("uses", &[kind(StmtUseUse)]),
    )?;
    mapping.map_sub_nodes(
        StmtWhile,
        SubNodeInformation::new().with_expr("cond").with_stmts(),
    )?;

    Ok(())
}

fn register_other(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
    use NodeKind::*;

    let type_names = [IDENTIFIER, NAME];

    mapping.map_sub_nodes(
        Arg,
        SubNodeInformation::new()
            .with_nullable("name", &[IDENTIFIER])
            .with_expr("value"),
    )?;
    mapping.map_sub_nodes(
        Attribute,
        SubNodeInformation::new()
            .with("name", &[NAME])
            .with_array("args", &[kind(Arg)]),
    )?;
    mapping.map_sub_nodes(
        AttributeGroup,
        SubNodeInformation::new().with_array("attrs", &[kind(Attribute)]),
    )?;
    mapping.map_sub_nodes(
        Const,
        SubNodeInformation::new()
            .with("name", &[IDENTIFIER])
            .with_expr("value")
            .with_nullable("namespacedName", &[NAME]),
    )?;
    mapping.map_sub_nodes(
        Identifier,
        SubNodeInformation::new().with("name", &[ClassName::String]),
    )?;
    mapping.map_sub_nodes(VarLikeIdentifier, SubNodeInformation::new())?;
    for composite in [IntersectionType, UnionType] {
        mapping.map_sub_nodes(
            composite,
            SubNodeInformation::new().with_array("types", &type_names),
        )?;
    }
    mapping.map_sub_nodes(
        MatchArm,
        SubNodeInformation::new()
            .with_nullable_array("conds", &[EXPR])
            .with_expr("body"),
    )?;
    mapping.map_sub_nodes(
        NullableType,
        SubNodeInformation::new().with("type", &type_names),
    )?;
    mapping.map_sub_nodes(
        Param,
        SubNodeInformation::new()
            .with_type("type")
            .with_expr("var")
            .with_nullable("default", &[EXPR])
            .with_attr_groups(),
    )?;
    mapping.map_sub_nodes(VariadicPlaceholder, SubNodeInformation::new())?;

    Ok(())
}
