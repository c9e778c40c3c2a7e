//! Классы-обобщения узлов для агрегации по слотам

use crate::core::errors::TaxonomyError;
use crate::php_parser::kinds::NodeKind;

use super::mapping::{NodeInformationMapping, NodeInformationRegistrar};

/// Метка класса, под которой узел учитывается в слоте родителя
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperclassInformation {
    superclass: NodeKind,
}

impl SuperclassInformation {
    pub fn new(superclass: NodeKind) -> Self {
        Self { superclass }
    }

    pub fn superclass(&self) -> NodeKind {
        self.superclass
    }

    pub fn label(&self) -> &'static str {
        self.superclass.name()
    }
}

/// Обобщение для конкретного вида
pub fn superclass_of(kind: NodeKind) -> NodeKind {
    [
        NodeKind::Expr,
        NodeKind::Stmt,
        NodeKind::Name,
        NodeKind::Identifier,
        NodeKind::ComplexType,
    ]
    .into_iter()
    .find(|group| kind.is_a(*group))
    .unwrap_or(kind)
}

pub struct SuperclassInformationRegistrar;

impl NodeInformationRegistrar for SuperclassInformationRegistrar {
    fn register(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError> {
        for kind in NodeKind::concrete() {
            mapping.map_superclass(kind, SuperclassInformation::new(superclass_of(kind)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(superclass_of(NodeKind::ExprArrayItem), NodeKind::Expr);
        assert_eq!(superclass_of(NodeKind::ExprClosureUse), NodeKind::Expr);
        assert_eq!(superclass_of(NodeKind::MagicConstLine), NodeKind::Expr);
        assert_eq!(superclass_of(NodeKind::ScalarString), NodeKind::Expr);
        assert_eq!(superclass_of(NodeKind::StmtUseUse), NodeKind::Stmt);
        assert_eq!(superclass_of(NodeKind::TraitUseAdaptationAlias), NodeKind::Stmt);
        assert_eq!(superclass_of(NodeKind::StmtClass), NodeKind::Stmt);
        assert_eq!(superclass_of(NodeKind::NameRelative), NodeKind::Name);
        assert_eq!(superclass_of(NodeKind::VarLikeIdentifier), NodeKind::Identifier);
        assert_eq!(superclass_of(NodeKind::UnionType), NodeKind::ComplexType);
        assert_eq!(superclass_of(NodeKind::Param), NodeKind::Param);
        assert_eq!(superclass_of(NodeKind::MatchArm), NodeKind::MatchArm);
    }

    #[test]
    fn test_registrar_labels_every_concrete_kind() {
        let mut mapping = NodeInformationMapping::new();
        SuperclassInformationRegistrar::register(&mut mapping).unwrap();

        assert_eq!(mapping.get_superclass(NodeKind::ExprArray).unwrap().label(), "Expr");
        assert_eq!(mapping.get_superclass(NodeKind::Arg).unwrap().label(), "Arg");
        assert!(mapping.get_superclass(NodeKind::Expr).is_err());
    }
}
