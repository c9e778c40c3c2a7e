//! Аннотатор версий
//!
//! Обходит дерево в обратном порядке (дети раньше родителя) и проставляет
//! каждому узлу минимальную и максимальную версию PHP.

use crate::core::errors::TaxonomyError;
use crate::node_information::{InspectionContext, NodeInformationMapping};
use crate::php_parser::ast::SyntaxNode;

pub struct Annotator<'m> {
    mapping: &'m NodeInformationMapping,
}

impl<'m> Annotator<'m> {
    pub fn new(mapping: &'m NodeInformationMapping) -> Self {
        Self { mapping }
    }

    /// Аннотирует все узлы верхнего уровня и их поддеревья
    pub fn annotate(&self, nodes: &[SyntaxNode]) -> Result<(), TaxonomyError> {
        for node in nodes {
            self.annotate_node(node, None)?;
        }
        Ok(())
    }

    fn annotate_node(
        &self,
        node: &SyntaxNode,
        parent: Option<&SyntaxNode>,
    ) -> Result<(), TaxonomyError> {
        for child in node.child_nodes() {
            self.annotate_node(child, Some(node))?;
        }

        let information = self.mapping.get_language_level(node.kind())?;
        let ctx = InspectionContext { node, parent };
        node.set_language_levels(information.from(&ctx), information.to(&ctx));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language_level::LanguageLevel;
    use crate::php_parser::ast::ArraySyntax;
    use crate::php_parser::builder::{self, NodeBuilder};
    use crate::php_parser::kinds::NodeKind;

    fn mapping() -> NodeInformationMapping {
        NodeInformationMapping::with_default_registrars().unwrap()
    }

    #[test]
    fn test_every_node_is_stamped() {
        let mapping = mapping();
        let tree = vec![
            builder::echo(vec![builder::string("hi")]),
            builder::expression(builder::assign(
                builder::variable("a"),
                builder::array(ArraySyntax::Short, vec![builder::lnumber(1)]),
            )),
        ];

        Annotator::new(&mapping).annotate(&tree).unwrap();

        fn check(node: &SyntaxNode) {
            assert!(node.is_annotated(), "{} not annotated", node.kind());
            for child in node.child_nodes() {
                check(child);
            }
        }
        tree.iter().for_each(check);

        let assign = tree[1].child("expr").unwrap();
        assert_eq!(assign.from_level(), Some(LanguageLevel::Php5_2));
        assert_eq!(assign.child("expr").unwrap().from_level(), Some(LanguageLevel::Php5_4));
    }

    #[test]
    fn test_parent_is_visible_to_inspectors() {
        let mapping = mapping();
        let param = NodeBuilder::new(NodeKind::Param)
            .null("type")
            .node("var", builder::variable("x"))
            .null("default")
            .nodes("attrGroups", vec![])
            .build();
        let closure = NodeBuilder::new(NodeKind::ExprClosure)
            .nodes("params", vec![param])
            .nodes(
                "uses",
                vec![NodeBuilder::new(NodeKind::ExprClosureUse)
                    .node("var", builder::variable("x"))
                    .build()],
            )
            .null("returnType")
            .nodes("stmts", vec![])
            .nodes("attrGroups", vec![])
            .build();
        let tree = vec![builder::expression(closure)];

        Annotator::new(&mapping).annotate(&tree).unwrap();

        let closure = tree[0].child("expr").unwrap();
        let closure_use = closure.children("uses")[0];
        assert_eq!(closure.from_level(), Some(LanguageLevel::Php5_3));
        assert_eq!(closure_use.to_level(), Some(LanguageLevel::Php7_0));
    }

    #[test]
    fn test_unregistered_kind_fails() {
        let mapping = NodeInformationMapping::new();
        let tree = vec![builder::echo(vec![])];
        let error = Annotator::new(&mapping).annotate(&tree).unwrap_err();
        assert_eq!(
            error,
            TaxonomyError::NotRegistered {
                kind: "Stmt_Echo",
                info: "LanguageLevelInformation"
            }
        );
    }
}
