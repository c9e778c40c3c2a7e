//! Счетчики слотов
//!
//! `SubNodeCounter` накапливает диапазоны версий значений одного слота,
//! раздельно по классам значений. `NodeCounter` объединяет слоты одного
//! вида узла во взвешенный кортеж.

use crate::core::errors::{Result, TaxonomyError};
use crate::language_level::LanguageLevel;
use crate::metrics::{LanguageLevelCounter, LanguageLevelTuple};
use crate::node_information::{ClassName, NodeInformationMapping, SubNodeDefinition};
use crate::php_parser::ast::{SubNode, SyntaxNode};
use crate::php_parser::kinds::NodeKind;

/// Попадания одного класса значений в слоте
#[derive(Debug, Clone)]
struct ClassCounter {
    label: &'static str,
    hits: usize,
    counter: LanguageLevelCounter,
}

/// Гистограмма значений одного слота
#[derive(Debug, Clone)]
pub struct SubNodeCounter {
    kind: NodeKind,
    slot: &'static str,
    definition: SubNodeDefinition,
    hits: usize,
    classes: Vec<ClassCounter>,
}

impl SubNodeCounter {
    pub fn new(kind: NodeKind, slot: &'static str, definition: SubNodeDefinition) -> Self {
        Self {
            kind,
            slot,
            definition,
            hits: 0,
            classes: Vec::new(),
        }
    }

    pub fn slot(&self) -> &'static str {
        self.slot
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Количество попаданий указанного класса
    pub fn class_hits(&self, label: &str) -> usize {
        self.classes
            .iter()
            .find(|class| class.label == label)
            .map(|class| class.hits)
            .unwrap_or(0)
    }

    /// Накопленный кортеж указанного класса
    pub fn class_tuple(&self, label: &str) -> Option<&LanguageLevelTuple> {
        self.classes
            .iter()
            .find(|class| class.label == label)
            .map(|class| class.counter.tuple())
    }

    /// Учитывает значение слота; массив раскладывается на элементы
    pub fn hit(&mut self, value: &SubNode, mapping: &NodeInformationMapping) -> Result<()> {
        match value {
            SubNode::Array(items) => {
                if !self.definition.is_array() {
                    return Err(TaxonomyError::UnexpectedArray {
                        kind: self.kind.name(),
                        slot: self.slot,
                    }
                    .into());
                }
                for item in items {
                    self.hit_single(item, mapping)?;
                }
                Ok(())
            }
            single => self.hit_single(single, mapping),
        }
    }

    fn hit_single(&mut self, value: &SubNode, mapping: &NodeInformationMapping) -> Result<()> {
        let (label, from, to) = match value {
            SubNode::Node(node) => {
                let label = self.classify_node(node, mapping)?;
                let from = node.from_level().ok_or(TaxonomyError::NotAnnotated {
                    kind: node.kind().name(),
                })?;
                let to = node.to_level().unwrap_or(LanguageLevel::NEWEST);
                (label, from, to)
            }
            SubNode::Array(_) => {
                return Err(TaxonomyError::UnexpectedArray {
                    kind: self.kind.name(),
                    slot: self.slot,
                }
                .into());
            }
            scalar => {
                let label = scalar_class(scalar).label();
                if !self.definition.accepts(label) {
                    return Err(self.unaccepted(label, label).into());
                }
                (label, LanguageLevel::OLDEST, LanguageLevel::NEWEST)
            }
        };

        // Пустое окно: конструкция недопустима ни в одной версии
        let window = if from.is_newer_than(to) {
            tracing::debug!(
                "Empty language level window {}..{} for {} in \"{}\".\"{}\"",
                from,
                to,
                label,
                self.kind.name(),
                self.slot
            );
            None
        } else {
            Some((from, to))
        };

        let class = self.class_counter(label);
        if let Some((from, to)) = window {
            class.counter.hit_range(from, to)?;
        }
        class.hits += 1;
        self.hits += 1;

        Ok(())
    }

    /// Сначала класс-обобщение, затем конкретный вид, затем его предки
    fn classify_node(
        &self,
        node: &SyntaxNode,
        mapping: &NodeInformationMapping,
    ) -> std::result::Result<&'static str, TaxonomyError> {
        let superclass = mapping
            .get_superclass(node.kind())
            .map_err(|error| self.in_slot(error))?
            .label();
        if self.definition.accepts(superclass) {
            return Ok(superclass);
        }

        if let Some(ancestor) = node
            .kind()
            .ancestors()
            .map(NodeKind::name)
            .find(|name| self.definition.accepts(name))
        {
            return Ok(ancestor);
        }

        Err(self.unaccepted(superclass, node.kind().name()))
    }

    fn in_slot(&self, error: TaxonomyError) -> TaxonomyError {
        match error {
            TaxonomyError::NotRegistered { kind, info } => TaxonomyError::NotRegisteredInSlot {
                kind,
                info,
                parent: self.kind.name(),
                slot: self.slot,
            },
            other => other,
        }
    }

    fn unaccepted(&self, class: &'static str, concrete: &'static str) -> TaxonomyError {
        TaxonomyError::UnacceptedOccupant {
            kind: self.kind.name(),
            slot: self.slot,
            class,
            concrete,
            accepted: self.definition.accepted_list(),
        }
    }

    fn class_counter(&mut self, label: &'static str) -> &mut ClassCounter {
        let index = match self.classes.iter().position(|class| class.label == label) {
            Some(index) => index,
            None => {
                self.classes.push(ClassCounter {
                    label,
                    hits: 0,
                    counter: LanguageLevelCounter::new(),
                });
                self.classes.len() - 1
            }
        };
        &mut self.classes[index]
    }

    /// Вклад слота при общем числе попаданий `total` по всем слотам вида
    fn weighted_tuple(&self, total: usize) -> LanguageLevelTuple {
        if total == 0 {
            return LanguageLevelTuple::new();
        }

        self.classes.iter().fold(LanguageLevelTuple::new(), |acc, class| {
            acc.add(
                &class
                    .counter
                    .tuple()
                    .normalize()
                    .scale(class.hits as f64 / total as f64),
            )
        })
    }
}

fn scalar_class(value: &SubNode) -> ClassName {
    match value {
        SubNode::Int(_) => ClassName::Int,
        SubNode::Float(_) => ClassName::Float,
        SubNode::Str(_) => ClassName::String,
        _ => ClassName::Null,
    }
}

/// Счетчик всех слотов одного вида узла
#[derive(Debug, Clone)]
pub struct NodeCounter {
    kind: NodeKind,
    hits: usize,
    slots: Vec<SubNodeCounter>,
}

impl NodeCounter {
    pub fn new(kind: NodeKind, mapping: &NodeInformationMapping) -> Result<Self> {
        let information = mapping.get_sub_nodes(kind)?;
        let slots = information
            .definitions()
            .map(|(slot, definition)| SubNodeCounter::new(kind, slot, definition.clone()))
            .collect();

        Ok(Self {
            kind,
            hits: 0,
            slots,
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Общее число учтенных значений во всех слотах
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn slot(&self, name: &str) -> Option<&SubNodeCounter> {
        self.slots.iter().find(|counter| counter.slot == name)
    }

    /// Учитывает объявленные слоты узла; отсутствующий слот считается null
    pub fn hit(&mut self, node: &SyntaxNode, mapping: &NodeInformationMapping) -> Result<()> {
        for counter in self.slots.iter_mut() {
            let before = counter.hits();
            match node.slot(counter.slot) {
                Some(value) => counter.hit(value, mapping)?,
                None => counter.hit(&SubNode::Null, mapping)?,
            }
            self.hits += counter.hits() - before;
        }
        Ok(())
    }

    /// Σ по слотам и классам: normalize(класс) × попадания класса / попадания вида
    pub fn tuple(&self) -> LanguageLevelTuple {
        self.slots
            .iter()
            .fold(LanguageLevelTuple::new(), |acc, counter| {
                acc.add(&counter.weighted_tuple(self.hits))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::annotator::Annotator;
    use crate::php_parser::ast::ArraySyntax;
    use crate::php_parser::builder::{self, NodeBuilder};

    fn mapping() -> NodeInformationMapping {
        NodeInformationMapping::with_default_registrars().unwrap()
    }

    fn annotated(mapping: &NodeInformationMapping, node: SyntaxNode) -> SyntaxNode {
        Annotator::new(mapping).annotate(std::slice::from_ref(&node)).unwrap();
        node
    }

    #[test]
    fn test_scalar_slot_covers_full_range() {
        let mapping = mapping();
        let string = annotated(&mapping, builder::string("x"));

        let mut counter = NodeCounter::new(NodeKind::ScalarString, &mapping).unwrap();
        counter.hit(&string, &mapping).unwrap();

        assert_eq!(counter.hits(), 1);
        assert_eq!(counter.tuple(), LanguageLevelTuple::filled(1.0));
    }

    #[test]
    fn test_array_in_single_slot_is_rejected() {
        let mapping = mapping();
        let mut counter = SubNodeCounter::new(
            NodeKind::StmtExpression,
            "expr",
            mapping
                .get_sub_nodes(NodeKind::StmtExpression)
                .unwrap()
                .definition("expr")
                .unwrap()
                .clone(),
        );

        let error = counter.hit(&SubNode::Array(vec![]), &mapping).unwrap_err();
        assert!(matches!(
            error,
            crate::core::errors::ModernityError::Taxonomy(TaxonomyError::UnexpectedArray {
                kind: "Stmt_Expression",
                slot: "expr"
            })
        ));
    }

    #[test]
    fn test_concrete_kind_fallback() {
        let mapping = mapping();
        let item = annotated(&mapping, builder::array_item(builder::lnumber(1)));

        let definition = mapping
            .get_sub_nodes(NodeKind::ExprArray)
            .unwrap()
            .definition("items")
            .unwrap()
            .clone();
        let mut counter = SubNodeCounter::new(NodeKind::ExprArray, "items", definition);
        counter
            .hit(&SubNode::Array(vec![SubNode::node(item), SubNode::Null]), &mapping)
            .unwrap();

        assert_eq!(counter.hits(), 2);
        assert_eq!(counter.class_hits("Expr_ArrayItem"), 1);
        assert_eq!(counter.class_hits("null"), 1);
        assert_eq!(counter.class_hits("Expr"), 0);
    }

    #[test]
    fn test_unaccepted_occupant() {
        let mapping = mapping();
        let stray = annotated(&mapping, builder::echo(vec![]));

        let mut counter = NodeCounter::new(NodeKind::StmtExpression, &mapping).unwrap();
        let bogus = NodeBuilder::new(NodeKind::StmtExpression).node("expr", stray).build();

        let error = counter.hit(&bogus, &mapping).unwrap_err();
        match error {
            crate::core::errors::ModernityError::Taxonomy(TaxonomyError::UnacceptedOccupant {
                kind,
                slot,
                class,
                concrete,
                ..
            }) => {
                assert_eq!(kind, "Stmt_Expression");
                assert_eq!(slot, "expr");
                assert_eq!(class, "Stmt");
                assert_eq!(concrete, "Stmt_Echo");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unannotated_occupant() {
        let mapping = mapping();
        let mut counter = NodeCounter::new(NodeKind::StmtExpression, &mapping).unwrap();
        let node = builder::expression(builder::variable("a"));

        let error = counter.hit(&node, &mapping).unwrap_err();
        assert!(matches!(
            error,
            crate::core::errors::ModernityError::Taxonomy(TaxonomyError::NotAnnotated {
                kind: "Expr_Variable"
            })
        ));
    }

    #[test]
    fn test_weighting_by_slot_frequency() {
        let mapping = mapping();
        // $a = [1];  var: 5.2.., expr: 5.4..
        let assign = annotated(
            &mapping,
            builder::assign(
                builder::variable("a"),
                builder::array(ArraySyntax::Short, vec![builder::lnumber(1)]),
            ),
        );

        let mut counter = NodeCounter::new(NodeKind::ExprAssign, &mapping).unwrap();
        counter.hit(&assign, &mapping).unwrap();

        let tuple = counter.tuple();
        assert_eq!(counter.hits(), 2);
        assert!((tuple[LanguageLevel::Php5_2] - 0.5).abs() < 1e-9);
        assert!((tuple[LanguageLevel::Php5_3] - 0.5).abs() < 1e-9);
        assert!((tuple[LanguageLevel::Php5_4] - 1.0).abs() < 1e-9);
        assert!((tuple[LanguageLevel::Php8_2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_abstract_ancestor_is_accepted() {
        let mapping = mapping();
        let alias = annotated(
            &mapping,
            NodeBuilder::new(NodeKind::TraitUseAdaptationAlias)
                .null("trait")
                .node("method", builder::identifier("a"))
                .int("newModifier", 2)
                .node("newName", builder::identifier("b"))
                .build(),
        );

        let definition = mapping
            .get_sub_nodes(NodeKind::StmtTraitUse)
            .unwrap()
            .definition("adaptations")
            .unwrap()
            .clone();
        let mut counter = SubNodeCounter::new(NodeKind::StmtTraitUse, "adaptations", definition);
        counter
            .hit(&SubNode::Array(vec![SubNode::node(alias)]), &mapping)
            .unwrap();

        assert_eq!(counter.class_hits("Stmt_TraitUseAdaptation"), 1);
    }

    #[test]
    fn test_empty_window_counts_hit_without_levels() {
        let mapping = mapping();
        let node = builder::variable("a");
        node.set_language_levels(LanguageLevel::Php7_2, Some(LanguageLevel::Php7_1));

        let mut counter = NodeCounter::new(NodeKind::StmtExpression, &mapping).unwrap();
        let statement = NodeBuilder::new(NodeKind::StmtExpression).node("expr", node).build();
        counter.hit(&statement, &mapping).unwrap();

        assert_eq!(counter.hits(), 1);
        assert_eq!(counter.slot("expr").unwrap().class_hits("Expr"), 1);
        assert!(counter.tuple().is_zero());
    }

    #[test]
    fn test_unregistered_occupant_names_slot() {
        let mapping = mapping();
        let definition = mapping
            .get_sub_nodes(NodeKind::StmtExpression)
            .unwrap()
            .definition("expr")
            .unwrap()
            .clone();
        let mut counter = SubNodeCounter::new(NodeKind::StmtExpression, "expr", definition);

        let error = counter
            .hit(&SubNode::node(builder::variable("a")), &NodeInformationMapping::new())
            .unwrap_err();
        assert!(matches!(
            error,
            crate::core::errors::ModernityError::Taxonomy(TaxonomyError::NotRegisteredInSlot {
                kind: "Expr_Variable",
                info: "SuperclassInformation",
                parent: "Stmt_Expression",
                slot: "expr",
            })
        ));
    }

    #[test]
    fn test_empty_counter_is_zero() {
        let mapping = mapping();
        let counter = NodeCounter::new(NodeKind::StmtNop, &mapping).unwrap();
        assert!(counter.tuple().is_zero());
    }
}
