//! Агрегация по файлу
//!
//! Посещает каждый узел аннотированного дерева и объединяет кортежи видов
//! узлов, взвешивая их долей посещений.

use std::collections::HashMap;

use crate::core::errors::Result;
use crate::metrics::LanguageLevelTuple;
use crate::node_information::NodeInformationMapping;
use crate::php_parser::ast::SyntaxNode;
use crate::php_parser::kinds::NodeKind;

use super::counters::NodeCounter;

pub struct ModernityVisitor<'m> {
    mapping: &'m NodeInformationMapping,
    /// Счетчики в порядке первого появления вида
    counters: Vec<(NodeCounter, usize)>,
    index: HashMap<NodeKind, usize>,
    visits: usize,
}

impl<'m> ModernityVisitor<'m> {
    pub fn new(mapping: &'m NodeInformationMapping) -> Self {
        Self {
            mapping,
            counters: Vec::new(),
            index: HashMap::new(),
            visits: 0,
        }
    }

    /// Обходит деревья верхнего уровня
    pub fn traverse(&mut self, nodes: &[SyntaxNode]) -> Result<()> {
        for node in nodes {
            self.visit(node)?;
        }
        Ok(())
    }

    fn visit(&mut self, node: &SyntaxNode) -> Result<()> {
        for child in node.child_nodes() {
            self.visit(child)?;
        }

        let slot = match self.index.get(&node.kind()) {
            Some(slot) => *slot,
            None => {
                self.counters
                    .push((NodeCounter::new(node.kind(), self.mapping)?, 0));
                self.index.insert(node.kind(), self.counters.len() - 1);
                self.counters.len() - 1
            }
        };

        let (counter, visits) = &mut self.counters[slot];
        counter.hit(node, self.mapping)?;
        *visits += 1;
        self.visits += 1;

        Ok(())
    }

    pub fn visits(&self) -> usize {
        self.visits
    }

    /// Количество посещений вида
    pub fn visits_of(&self, kind: NodeKind) -> usize {
        self.index
            .get(&kind)
            .map(|slot| self.counters[*slot].1)
            .unwrap_or(0)
    }

    pub fn counter(&self, kind: NodeKind) -> Option<&NodeCounter> {
        self.index.get(&kind).map(|slot| &self.counters[*slot].0)
    }

    /// Виды в порядке первого появления
    pub fn kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        self.counters.iter().map(|(counter, _)| counter.kind())
    }

    /// Вклад вида в итоговый кортеж
    pub fn kind_contribution(&self, kind: NodeKind) -> LanguageLevelTuple {
        match self.index.get(&kind) {
            Some(slot) if self.visits > 0 => {
                let (counter, visits) = &self.counters[*slot];
                counter
                    .tuple()
                    .normalize()
                    .scale(*visits as f64 / self.visits as f64)
            }
            _ => LanguageLevelTuple::new(),
        }
    }

    /// Σ по видам: normalize(кортеж вида) × посещения вида / все посещения
    pub fn tuple(&self) -> LanguageLevelTuple {
        self.kinds()
            .fold(LanguageLevelTuple::new(), |acc, kind| {
                acc.add(&self.kind_contribution(kind))
            })
    }
}
