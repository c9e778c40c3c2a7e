//! Правила появления и устаревания конструкций PHP

use crate::core::errors::TaxonomyError;
use crate::language_level::LanguageLevel;
use crate::php_parser::ast::SyntaxNode;
use crate::php_parser::kinds::NodeKind;

use super::inspectors;
use super::mapping::{NodeInformationMapping, NodeInformationRegistrar};

/// Узел и его непосредственный родитель
#[derive(Debug, Clone, Copy)]
pub struct InspectionContext<'a> {
    pub node: &'a SyntaxNode,
    pub parent: Option<&'a SyntaxNode>,
}

/// Инспектор, вычисляющий версию по форме узла
pub type Inspector = fn(&InspectionContext<'_>) -> Option<LanguageLevel>;

/// Правило: фиксированная версия или инспектор
#[derive(Clone, Copy)]
pub enum LevelRule {
    Fixed(LanguageLevel),
    Inspector(Inspector),
}

impl LevelRule {
    pub fn resolve(&self, ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
        match self {
            LevelRule::Fixed(level) => Some(*level),
            LevelRule::Inspector(inspector) => inspector(ctx),
        }
    }
}

impl std::fmt::Debug for LevelRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelRule::Fixed(level) => write!(f, "Fixed({})", level),
            LevelRule::Inspector(_) => f.write_str("Inspector"),
        }
    }
}

/// Версия появления (`from`) и последняя версия поддержки (`to`)
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageLevelInformation {
    from: Option<LevelRule>,
    to: Option<LevelRule>,
}

impl LanguageLevelInformation {
    /// Конструкция доступна с указанной версии
    pub fn since(level: LanguageLevel) -> Self {
        Self {
            from: Some(LevelRule::Fixed(level)),
            to: None,
        }
    }

    /// Версия появления определяется инспектором
    pub fn inspected(inspector: Inspector) -> Self {
        Self {
            from: Some(LevelRule::Inspector(inspector)),
            to: None,
        }
    }

    pub fn until(mut self, level: LanguageLevel) -> Self {
        self.to = Some(LevelRule::Fixed(level));
        self
    }

    pub fn until_inspected(mut self, inspector: Inspector) -> Self {
        self.to = Some(LevelRule::Inspector(inspector));
        self
    }

    /// Версия появления; если правило не сработало, самая старая версия
    pub fn from(&self, ctx: &InspectionContext<'_>) -> LanguageLevel {
        self.from
            .and_then(|rule| rule.resolve(ctx))
            .unwrap_or(LanguageLevel::OLDEST)
    }

    /// Последняя версия поддержки; `None`, если конструкция не устарела
    pub fn to(&self, ctx: &InspectionContext<'_>) -> Option<LanguageLevel> {
        self.to.and_then(|rule| rule.resolve(ctx))
    }
}

pub struct LanguageLevelInformationRegistrar;

impl NodeInformationRegistrar for LanguageLevelInformationRegistrar {
    fn register(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
        register_expr(mapping)?;
        register_names(mapping)?;
        register_scalars(mapping)?;
        register_stmts(mapping)?;
        register_other(mapping)?;
        Ok(())
    }
}

type Info = LanguageLevelInformation;

fn defaults(mapping: &mut NodeInformationMapping, kinds: &[NodeKind]) -> Result<(), TaxonomyError> {
    for kind in kinds {
        mapping.map_language_level(*kind, Info::default())?;
    }
    Ok(())
}

fn register_expr(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
    use LanguageLevel::*;
    use NodeKind::*;

    defaults(
        mapping,
        &[
            ExprArrayItem,
            AssignOp,
            ExprAssignRef,
            BinaryOp,
            ExprBitwiseNot,
            ExprBooleanNot,
            Cast,
            ExprClone,
            ExprError,
            ExprErrorSuppress,
            ExprEval,
            ExprExit,
            ExprFuncCall,
            ExprInclude,
            ExprPostDec,
            ExprPostInc,
            ExprPreDec,
            ExprPreInc,
            ExprPrint,
            ExprPropertyFetch,
            ExprShellExec,
            ExprStaticCall,
            ExprStaticPropertyFetch,
            ExprTernary,
            ExprUnaryMinus,
            ExprUnaryPlus,
            ExprVariable,
        ],
    )?;

    mapping.map_language_level(ExprArrayDimFetch, Info::inspected(inspectors::array_dim_fetch_from))?;
    mapping.map_language_level(ExprArray, Info::inspected(inspectors::array_from))?;
    mapping.map_language_level(ExprArrowFunction, Info::since(Php7_4))?;
    mapping.map_language_level(ExprAssign, Info::inspected(inspectors::assign_from))?;
    mapping.map_language_level(
        ExprClassConstFetch,
        Info::inspected(inspectors::class_const_fetch_from),
    )?;
    mapping.map_language_level(ExprClosure, Info::since(Php5_3))?;
    mapping.map_language_level(
        ExprClosureUse,
        Info::default().until_inspected(inspectors::closure_use_to),
    )?;
    mapping.map_language_level(ExprConstFetch, Info::inspected(inspectors::const_fetch_from))?;
    mapping.map_language_level(ExprEmpty, Info::inspected(inspectors::empty_from))?;
    mapping.map_language_level(ExprInstanceof, Info::inspected(inspectors::instanceof_from))?;
    mapping.map_language_level(ExprIsset, Info::inspected(inspectors::isset_from))?;
    mapping.map_language_level(ExprList, Info::inspected(inspectors::list_from))?;
    mapping.map_language_level(ExprMatch, Info::since(Php8_0))?;
    mapping.map_language_level(ExprMethodCall, Info::inspected(inspectors::method_call_from))?;
    mapping.map_language_level(ExprNew, Info::inspected(inspectors::new_from))?;
    mapping.map_language_level(ExprNullsafeMethodCall, Info::since(Php8_0))?;
    mapping.map_language_level(ExprNullsafePropertyFetch, Info::since(Php8_0))?;
    mapping.map_language_level(ExprThrow, Info::since(Php8_0))?;
    mapping.map_language_level(ExprYieldFrom, Info::since(Php7_0))?;
    mapping.map_language_level(ExprYield, Info::since(Php5_5))?;
    mapping.map_language_level(CastUnset, Info::default().until(Php7_1))?;
    mapping.map_language_level(AssignOpPow, Info::since(Php5_6))?;
    mapping.map_language_level(BinaryOpPow, Info::since(Php5_6))?;
    mapping.map_language_level(AssignOpCoalesce, Info::since(Php7_0))?;
    mapping.map_language_level(BinaryOpCoalesce, Info::since(Php7_0))?;
    mapping.map_language_level(BinaryOpSpaceship, Info::since(Php7_0))?;

    Ok(())
}

fn register_names(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
    mapping.map_language_level(NodeKind::NameFullyQualified, Info::since(LanguageLevel::Php5_3))?;
    mapping.map_language_level(NodeKind::NameRelative, Info::since(LanguageLevel::Php5_3))?;
    Ok(())
}

fn register_scalars(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
    use LanguageLevel::*;
    use NodeKind::*;

    mapping.map_language_level(
        ScalarLNumber,
        Info::inspected(inspectors::number_from).until_inspected(inspectors::lnumber_to),
    )?;
    mapping.map_language_level(ScalarDNumber, Info::inspected(inspectors::number_from))?;
    mapping.map_language_level(MagicConstDir, Info::since(Php5_3))?;
    mapping.map_language_level(MagicConstNamespace, Info::since(Php5_3))?;
    mapping.map_language_level(MagicConstTrait, Info::since(Php5_4))?;

    Ok(())
}

fn register_stmts(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
    use LanguageLevel::*;
    use NodeKind::*;

    defaults(
        mapping,
        &[
            StmtBreak,
            StmtCase,
            StmtContinue,
            StmtDeclareDeclare,
            StmtDeclare,
            StmtDo,
            StmtEcho,
            StmtElseIf,
            StmtElse,
            StmtExpression,
            StmtFor,
            StmtGlobal,
            StmtHaltCompiler,
            StmtIf,
            StmtInlineHtml,
            StmtInterface,
            StmtNop,
            StmtPropertyProperty,
            StmtReturn,
            StmtStatic,
            StmtSwitch,
            StmtTryCatch,
            StmtUnset,
            StmtWhile,
        ],
    )?;

    mapping.map_language_level(StmtCatch, Info::inspected(inspectors::catch_from))?;
    mapping.map_language_level(StmtClassConst, Info::inspected(inspectors::class_const_from))?;
    mapping.map_language_level(
        StmtClassMethod,
        Info::inspected(inspectors::class_method_from).until_inspected(inspectors::class_method_to),
    )?;
    mapping.map_language_level(StmtClass, Info::default().until_inspected(inspectors::class_to))?;
    mapping.map_language_level(StmtConst, Info::inspected(inspectors::const_stmt_from))?;
    mapping.map_language_level(StmtEnumCase, Info::since(Php8_1))?;
    mapping.map_language_level(StmtEnum, Info::since(Php8_1))?;
    mapping.map_language_level(StmtFinally, Info::since(Php5_5))?;
    mapping.map_language_level(StmtForeach, Info::inspected(inspectors::foreach_from))?;
    mapping.map_language_level(StmtFunction, Info::inspected(inspectors::function_from))?;
    mapping.map_language_level(StmtGoto, Info::since(Php5_3))?;
    mapping.map_language_level(StmtGroupUse, Info::since(Php7_0))?;
    mapping.map_language_level(StmtLabel, Info::since(Php5_3))?;
    mapping.map_language_level(StmtNamespace, Info::since(Php5_3))?;
    mapping.map_language_level(StmtProperty, Info::inspected(inspectors::property_from))?;
    mapping.map_language_level(StmtStaticVar, Info::inspected(inspectors::static_var_from))?;
    mapping.map_language_level(StmtThrow, Info::default().until(Php7_4))?;
    mapping.map_language_level(StmtTraitUse, Info::since(Php5_4))?;
    mapping.map_language_level(StmtTrait, Info::since(Php5_4))?;
    mapping.map_language_level(StmtUseUse, Info::since(Php5_3))?;
    mapping.map_language_level(StmtUse, Info::inspected(inspectors::use_from))?;
    mapping.map_language_level(TraitUseAdaptationAlias, Info::since(Php5_4))?;
    mapping.map_language_level(TraitUseAdaptationPrecedence, Info::since(Php5_4))?;

    Ok(())
}

fn register_other(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
    use LanguageLevel::*;
    use NodeKind::*;

    defaults(mapping, &[Identifier, Scalar, VarLikeIdentifier])?;

    mapping.map_language_level(Arg, Info::inspected(inspectors::arg_from))?;
    mapping.map_language_level(Attribute, Info::inspected(inspectors::attribute_from))?;
    mapping.map_language_level(AttributeGroup, Info::since(Php8_0))?;
    mapping.map_language_level(Const, Info::inspected(inspectors::const_from))?;
    mapping.map_language_level(IntersectionType, Info::since(Php8_1))?;
    mapping.map_language_level(MatchArm, Info::since(Php8_0))?;
    mapping.map_language_level(Name, Info::since(Php5_3))?;
    mapping.map_language_level(NullableType, Info::since(Php7_1))?;
    mapping.map_language_level(Param, Info::inspected(inspectors::param_from))?;
    mapping.map_language_level(UnionType, Info::since(Php8_0))?;
    mapping.map_language_level(VariadicPlaceholder, Info::since(Php8_1))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::php_parser::builder;

    fn resolve(mapping: &NodeInformationMapping, node: &SyntaxNode) -> (LanguageLevel, Option<LanguageLevel>) {
        let info = mapping.get_language_level(node.kind()).unwrap();
        let ctx = InspectionContext { node, parent: None };
        (info.from(&ctx), info.to(&ctx))
    }

    #[test]
    fn test_default_is_oldest_and_never_deprecated() {
        let info = LanguageLevelInformation::default();
        let node = builder::variable("a");
        let ctx = InspectionContext { node: &node, parent: None };
        assert_eq!(info.from(&ctx), LanguageLevel::OLDEST);
        assert_eq!(info.to(&ctx), None);
    }

    #[test]
    fn test_inspector_without_match_falls_back_to_oldest() {
        let mapping = NodeInformationMapping::with_default_registrars().unwrap();
        let long = builder::array(crate::php_parser::ast::ArraySyntax::Long, vec![]);
        assert_eq!(resolve(&mapping, &long), (LanguageLevel::Php5_2, None));
    }

    #[test]
    fn test_fixed_rules() {
        let mapping = NodeInformationMapping::with_default_registrars().unwrap();

        let name = builder::fully_qualified("\\Foo");
        assert_eq!(resolve(&mapping, &name).0, LanguageLevel::Php5_3);

        let unset = crate::php_parser::builder::NodeBuilder::new(NodeKind::CastUnset)
            .node("expr", builder::variable("a"))
            .build();
        assert_eq!(resolve(&mapping, &unset), (LanguageLevel::Php5_2, Some(LanguageLevel::Php7_1)));

        let pow = crate::php_parser::builder::NodeBuilder::new(NodeKind::BinaryOpPow)
            .node("left", builder::lnumber(2))
            .node("right", builder::lnumber(3))
            .build();
        assert_eq!(resolve(&mapping, &pow).0, LanguageLevel::Php5_6);

        let plus = crate::php_parser::builder::NodeBuilder::new(NodeKind::BinaryOpPlus)
            .node("left", builder::lnumber(2))
            .node("right", builder::lnumber(3))
            .build();
        assert_eq!(resolve(&mapping, &plus).0, LanguageLevel::Php5_2);
    }

    #[test]
    fn test_magic_constants() {
        let mapping = NodeInformationMapping::with_default_registrars().unwrap();
        let dir = crate::php_parser::builder::NodeBuilder::new(NodeKind::MagicConstDir).build();
        let line = crate::php_parser::builder::NodeBuilder::new(NodeKind::MagicConstLine).build();
        assert_eq!(resolve(&mapping, &dir).0, LanguageLevel::Php5_3);
        assert_eq!(resolve(&mapping, &line).0, LanguageLevel::Php5_2);
    }
}
