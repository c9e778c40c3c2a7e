//! Виды узлов синтаксического дерева PHP и их иерархия
//!
//! Каждый вид знает своего непосредственного предка. Цепочка предков всегда
//! заканчивается корнем `Node`, поэтому поиск информации о виде может
//! подниматься по иерархии до ближайшего зарегистрированного предка.

use std::fmt;

macro_rules! node_kinds {
    ($( $variant:ident => $name:literal : $parent:ident ),* $(,)?) => {
        /// Вид узла
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum NodeKind {
            Node,
            $( $variant, )*
        }

        impl NodeKind {
            /// Все виды, включая абстрактные
            pub const ALL: &'static [NodeKind] = &[NodeKind::Node, $( NodeKind::$variant, )*];

            /// Имя вида в нотации PHP-парсера ("Expr_Array", "Stmt_Echo")
            pub fn name(self) -> &'static str {
                match self {
                    NodeKind::Node => "Node",
                    $( NodeKind::$variant => $name, )*
                }
            }

            /// Непосредственный предок вида; `None` только у корня
            pub fn parent(self) -> Option<NodeKind> {
                match self {
                    NodeKind::Node => None,
                    $( NodeKind::$variant => Some(NodeKind::$parent), )*
                }
            }
        }
    };
}

node_kinds! {
    // Абстрактные виды
    Expr => "Expr": Node,
    Stmt => "Stmt": Node,
    Scalar => "Scalar": Expr,
    MagicConst => "Scalar_MagicConst": Scalar,
    AssignOp => "Expr_AssignOp": Expr,
    BinaryOp => "Expr_BinaryOp": Expr,
    Cast => "Expr_Cast": Expr,
    CallLike => "Expr_CallLike": Expr,
    ClassLike => "Stmt_ClassLike": Stmt,
    TraitUseAdaptation => "Stmt_TraitUseAdaptation": Stmt,
    ComplexType => "ComplexType": Node,

    // Прочие узлы
    Arg => "Arg": Node,
    Attribute => "Attribute": Node,
    AttributeGroup => "AttributeGroup": Node,
    Const => "Const": Node,
    Identifier => "Identifier": Node,
    VarLikeIdentifier => "VarLikeIdentifier": Identifier,
    MatchArm => "MatchArm": Node,
    Name => "Name": Node,
    NameFullyQualified => "Name_FullyQualified": Name,
    NameRelative => "Name_Relative": Name,
    NullableType => "NullableType": ComplexType,
    UnionType => "UnionType": ComplexType,
    IntersectionType => "IntersectionType": ComplexType,
    Param => "Param": Node,
    VariadicPlaceholder => "VariadicPlaceholder": Node,

    // Выражения
    ExprArrayDimFetch => "Expr_ArrayDimFetch": Expr,
    ExprArrayItem => "Expr_ArrayItem": Expr,
    ExprArray => "Expr_Array": Expr,
    ExprArrowFunction => "Expr_ArrowFunction": Expr,
    ExprAssign => "Expr_Assign": Expr,
    ExprAssignRef => "Expr_AssignRef": Expr,
    ExprBitwiseNot => "Expr_BitwiseNot": Expr,
    ExprBooleanNot => "Expr_BooleanNot": Expr,
    ExprClassConstFetch => "Expr_ClassConstFetch": Expr,
    ExprClone => "Expr_Clone": Expr,
    ExprClosure => "Expr_Closure": Expr,
    ExprClosureUse => "Expr_ClosureUse": Expr,
    ExprConstFetch => "Expr_ConstFetch": Expr,
    ExprEmpty => "Expr_Empty": Expr,
    ExprError => "Expr_Error": Expr,
    ExprErrorSuppress => "Expr_ErrorSuppress": Expr,
    ExprEval => "Expr_Eval": Expr,
    ExprExit => "Expr_Exit": Expr,
    ExprFuncCall => "Expr_FuncCall": CallLike,
    ExprInclude => "Expr_Include": Expr,
    ExprInstanceof => "Expr_Instanceof": Expr,
    ExprIsset => "Expr_Isset": Expr,
    ExprList => "Expr_List": Expr,
    ExprMatch => "Expr_Match": Expr,
    ExprMethodCall => "Expr_MethodCall": CallLike,
    ExprNew => "Expr_New": CallLike,
    ExprNullsafeMethodCall => "Expr_NullsafeMethodCall": CallLike,
    ExprNullsafePropertyFetch => "Expr_NullsafePropertyFetch": Expr,
    ExprPostDec => "Expr_PostDec": Expr,
    ExprPostInc => "Expr_PostInc": Expr,
    ExprPreDec => "Expr_PreDec": Expr,
    ExprPreInc => "Expr_PreInc": Expr,
    ExprPrint => "Expr_Print": Expr,
    ExprPropertyFetch => "Expr_PropertyFetch": Expr,
    ExprShellExec => "Expr_ShellExec": Expr,
    ExprStaticCall => "Expr_StaticCall": CallLike,
    ExprStaticPropertyFetch => "Expr_StaticPropertyFetch": Expr,
    ExprTernary => "Expr_Ternary": Expr,
    ExprThrow => "Expr_Throw": Expr,
    ExprUnaryMinus => "Expr_UnaryMinus": Expr,
    ExprUnaryPlus => "Expr_UnaryPlus": Expr,
    ExprVariable => "Expr_Variable": Expr,
    ExprYieldFrom => "Expr_YieldFrom": Expr,
    ExprYield => "Expr_Yield": Expr,

    // Составное присваивание
    AssignOpBitwiseAnd => "Expr_AssignOp_BitwiseAnd": AssignOp,
    AssignOpBitwiseOr => "Expr_AssignOp_BitwiseOr": AssignOp,
    AssignOpBitwiseXor => "Expr_AssignOp_BitwiseXor": AssignOp,
    AssignOpCoalesce => "Expr_AssignOp_Coalesce": AssignOp,
    AssignOpConcat => "Expr_AssignOp_Concat": AssignOp,
    AssignOpDiv => "Expr_AssignOp_Div": AssignOp,
    AssignOpMinus => "Expr_AssignOp_Minus": AssignOp,
    AssignOpMod => "Expr_AssignOp_Mod": AssignOp,
    AssignOpMul => "Expr_AssignOp_Mul": AssignOp,
    AssignOpPlus => "Expr_AssignOp_Plus": AssignOp,
    AssignOpPow => "Expr_AssignOp_Pow": AssignOp,
    AssignOpShiftLeft => "Expr_AssignOp_ShiftLeft": AssignOp,
    AssignOpShiftRight => "Expr_AssignOp_ShiftRight": AssignOp,

    // Бинарные операции
    BinaryOpBitwiseAnd => "Expr_BinaryOp_BitwiseAnd": BinaryOp,
    BinaryOpBitwiseOr => "Expr_BinaryOp_BitwiseOr": BinaryOp,
    BinaryOpBitwiseXor => "Expr_BinaryOp_BitwiseXor": BinaryOp,
    BinaryOpBooleanAnd => "Expr_BinaryOp_BooleanAnd": BinaryOp,
    BinaryOpBooleanOr => "Expr_BinaryOp_BooleanOr": BinaryOp,
    BinaryOpCoalesce => "Expr_BinaryOp_Coalesce": BinaryOp,
    BinaryOpConcat => "Expr_BinaryOp_Concat": BinaryOp,
    BinaryOpDiv => "Expr_BinaryOp_Div": BinaryOp,
    BinaryOpEqual => "Expr_BinaryOp_Equal": BinaryOp,
    BinaryOpGreater => "Expr_BinaryOp_Greater": BinaryOp,
    BinaryOpGreaterOrEqual => "Expr_BinaryOp_GreaterOrEqual": BinaryOp,
    BinaryOpIdentical => "Expr_BinaryOp_Identical": BinaryOp,
    BinaryOpLogicalAnd => "Expr_BinaryOp_LogicalAnd": BinaryOp,
    BinaryOpLogicalOr => "Expr_BinaryOp_LogicalOr": BinaryOp,
    BinaryOpLogicalXor => "Expr_BinaryOp_LogicalXor": BinaryOp,
    BinaryOpMinus => "Expr_BinaryOp_Minus": BinaryOp,
    BinaryOpMod => "Expr_BinaryOp_Mod": BinaryOp,
    BinaryOpMul => "Expr_BinaryOp_Mul": BinaryOp,
    BinaryOpNotEqual => "Expr_BinaryOp_NotEqual": BinaryOp,
    BinaryOpNotIdentical => "Expr_BinaryOp_NotIdentical": BinaryOp,
    BinaryOpPlus => "Expr_BinaryOp_Plus": BinaryOp,
    BinaryOpPow => "Expr_BinaryOp_Pow": BinaryOp,
    BinaryOpShiftLeft => "Expr_BinaryOp_ShiftLeft": BinaryOp,
    BinaryOpShiftRight => "Expr_BinaryOp_ShiftRight": BinaryOp,
    BinaryOpSmaller => "Expr_BinaryOp_Smaller": BinaryOp,
    BinaryOpSmallerOrEqual => "Expr_BinaryOp_SmallerOrEqual": BinaryOp,
    BinaryOpSpaceship => "Expr_BinaryOp_Spaceship": BinaryOp,

    // Приведения типов
    CastArray => "Expr_Cast_Array": Cast,
    CastBool => "Expr_Cast_Bool": Cast,
    CastDouble => "Expr_Cast_Double": Cast,
    CastInt => "Expr_Cast_Int": Cast,
    CastObject => "Expr_Cast_Object": Cast,
    CastString => "Expr_Cast_String": Cast,
    CastUnset => "Expr_Cast_Unset": Cast,

    // Скаляры
    ScalarDNumber => "Scalar_DNumber": Scalar,
    ScalarEncapsed => "Scalar_Encapsed": Scalar,
    ScalarEncapsedStringPart => "Scalar_EncapsedStringPart": Scalar,
    ScalarLNumber => "Scalar_LNumber": Scalar,
    ScalarString => "Scalar_String": Scalar,

    // Магические константы
    MagicConstClass => "Scalar_MagicConst_Class": MagicConst,
    MagicConstDir => "Scalar_MagicConst_Dir": MagicConst,
    MagicConstFile => "Scalar_MagicConst_File": MagicConst,
    MagicConstFunction => "Scalar_MagicConst_Function": MagicConst,
    MagicConstLine => "Scalar_MagicConst_Line": MagicConst,
    MagicConstMethod => "Scalar_MagicConst_Method": MagicConst,
    MagicConstNamespace => "Scalar_MagicConst_Namespace": MagicConst,
    MagicConstTrait => "Scalar_MagicConst_Trait": MagicConst,

    // Инструкции
    StmtBreak => "Stmt_Break": Stmt,
    StmtCase => "Stmt_Case": Stmt,
    StmtCatch => "Stmt_Catch": Stmt,
    StmtClassConst => "Stmt_ClassConst": Stmt,
    StmtClassMethod => "Stmt_ClassMethod": Stmt,
    StmtClass => "Stmt_Class": ClassLike,
    StmtConst => "Stmt_Const": Stmt,
    StmtContinue => "Stmt_Continue": Stmt,
    StmtDeclareDeclare => "Stmt_DeclareDeclare": Stmt,
    StmtDeclare => "Stmt_Declare": Stmt,
    StmtDo => "Stmt_Do": Stmt,
    StmtEcho => "Stmt_Echo": Stmt,
    StmtElseIf => "Stmt_ElseIf": Stmt,
    StmtElse => "Stmt_Else": Stmt,
    StmtEnumCase => "Stmt_EnumCase": Stmt,
    StmtEnum => "Stmt_Enum": ClassLike,
    StmtExpression => "Stmt_Expression": Stmt,
    StmtFinally => "Stmt_Finally": Stmt,
    StmtFor => "Stmt_For": Stmt,
    StmtForeach => "Stmt_Foreach": Stmt,
    StmtFunction => "Stmt_Function": Stmt,
    StmtGlobal => "Stmt_Global": Stmt,
    StmtGoto => "Stmt_Goto": Stmt,
    StmtGroupUse => "Stmt_GroupUse": Stmt,
    StmtHaltCompiler => "Stmt_HaltCompiler": Stmt,
    StmtIf => "Stmt_If": Stmt,
    StmtInlineHtml => "Stmt_InlineHTML": Stmt,
    StmtInterface => "Stmt_Interface": ClassLike,
    StmtLabel => "Stmt_Label": Stmt,
    StmtNamespace => "Stmt_Namespace": Stmt,
    StmtNop => "Stmt_Nop": Stmt,
    StmtProperty => "Stmt_Property": Stmt,
    StmtPropertyProperty => "Stmt_PropertyProperty": Stmt,
    StmtReturn => "Stmt_Return": Stmt,
    StmtStaticVar => "Stmt_StaticVar": Stmt,
    StmtStatic => "Stmt_Static": Stmt,
    StmtSwitch => "Stmt_Switch": Stmt,
    StmtThrow => "Stmt_Throw": Stmt,
    StmtTraitUse => "Stmt_TraitUse": Stmt,
    StmtTrait => "Stmt_Trait": ClassLike,
    StmtTryCatch => "Stmt_TryCatch": Stmt,
    StmtUnset => "Stmt_Unset": Stmt,
    StmtUseUse => "Stmt_UseUse": Stmt,
    StmtUse => "Stmt_Use": Stmt,
    StmtWhile => "Stmt_While": Stmt,
    TraitUseAdaptationAlias => "Stmt_TraitUseAdaptation_Alias": TraitUseAdaptation,
    TraitUseAdaptationPrecedence => "Stmt_TraitUseAdaptation_Precedence": TraitUseAdaptation,
}

impl NodeKind {
    /// Абстрактные виды никогда не встречаются в дереве, только в иерархии
    pub fn is_abstract(self) -> bool {
        matches!(
            self,
            NodeKind::Node
                | NodeKind::Expr
                | NodeKind::Stmt
                | NodeKind::Scalar
                | NodeKind::MagicConst
                | NodeKind::AssignOp
                | NodeKind::BinaryOp
                | NodeKind::Cast
                | NodeKind::CallLike
                | NodeKind::ClassLike
                | NodeKind::TraitUseAdaptation
                | NodeKind::ComplexType
        )
    }

    /// Конкретные виды, которые может породить парсер
    pub fn concrete() -> impl Iterator<Item = NodeKind> {
        Self::ALL.iter().copied().filter(|kind| !kind.is_abstract())
    }

    /// Сам вид и все его предки до корня
    pub fn ancestors(self) -> Ancestors {
        Ancestors { next: Some(self) }
    }

    /// Является ли вид `ancestor` или его потомком
    pub fn is_a(self, ancestor: NodeKind) -> bool {
        self.ancestors().any(|kind| kind == ancestor)
    }

    pub fn is_expr(self) -> bool {
        self.is_a(NodeKind::Expr)
    }

    pub fn is_scalar(self) -> bool {
        self.is_a(NodeKind::Scalar)
    }

    pub fn is_stmt(self) -> bool {
        self.is_a(NodeKind::Stmt)
    }

    pub fn from_name(name: &str) -> Option<NodeKind> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Итератор по цепочке предков
pub struct Ancestors {
    next: Option<NodeKind>,
}

impl Iterator for Ancestors {
    type Item = NodeKind;

    fn next(&mut self) -> Option<NodeKind> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_chain_ends_at_root() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.ancestors().last(), Some(NodeKind::Node), "{}", kind);
        }
    }

    #[test]
    fn test_ancestor_chain() {
        let chain: Vec<_> = NodeKind::MagicConstDir.ancestors().collect();
        assert_eq!(
            chain,
            vec![
                NodeKind::MagicConstDir,
                NodeKind::MagicConst,
                NodeKind::Scalar,
                NodeKind::Expr,
                NodeKind::Node,
            ]
        );
    }

    #[test]
    fn test_is_a() {
        assert!(NodeKind::ExprFuncCall.is_a(NodeKind::CallLike));
        assert!(NodeKind::ExprNew.is_expr());
        assert!(NodeKind::ScalarLNumber.is_scalar());
        assert!(NodeKind::StmtClass.is_a(NodeKind::ClassLike));
        assert!(NodeKind::NameFullyQualified.is_a(NodeKind::Name));
        assert!(!NodeKind::Name.is_a(NodeKind::NameFullyQualified));
        assert!(!NodeKind::Param.is_expr());
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = NodeKind::ALL.iter().map(|kind| kind.name()).collect();
        names.sort_unstable();
        let total = names.len();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(NodeKind::from_name("Stmt_Echo"), Some(NodeKind::StmtEcho));
        assert_eq!(NodeKind::from_name("Expr_Cast_Unset"), Some(NodeKind::CastUnset));
        assert_eq!(NodeKind::from_name("Stmt_Nothing"), None);
    }
}
