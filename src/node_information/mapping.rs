//! Реестр информации об узлах
//!
//! Для каждого вида узла хранится не более одной записи каждого типа
//! информации. Поиск поднимается по иерархии видов до ближайшего предка,
//! для которого запись зарегистрирована.

use std::collections::HashMap;

use crate::core::errors::TaxonomyError;
use crate::php_parser::kinds::NodeKind;

use super::language_level::{LanguageLevelInformation, LanguageLevelInformationRegistrar};
use super::sub_node::{SubNodeInformation, SubNodeInformationRegistrar};
use super::superclass::{SuperclassInformation, SuperclassInformationRegistrar};

/// Тип информации; имя используется в сообщениях об ошибках
pub trait NodeInformation {
    const TYPE_NAME: &'static str;
}

impl NodeInformation for LanguageLevelInformation {
    const TYPE_NAME: &'static str = "LanguageLevelInformation";
}

impl NodeInformation for SubNodeInformation {
    const TYPE_NAME: &'static str = "SubNodeInformation";
}

impl NodeInformation for SuperclassInformation {
    const TYPE_NAME: &'static str = "SuperclassInformation";
}

/// Регистратор заполняет реестр записями одного типа
pub trait NodeInformationRegistrar {
    fn register(mapping: &mut NodeInformationMapping) -> Result<(), TaxonomyError>;
}

/// Реестр информации о видах узлов
#[derive(Default)]
pub struct NodeInformationMapping {
    language_levels: HashMap<NodeKind, LanguageLevelInformation>,
    sub_nodes: HashMap<NodeKind, SubNodeInformation>,
    superclasses: HashMap<NodeKind, SuperclassInformation>,
}

impl NodeInformationMapping {
    /// Пустой реестр
    pub fn new() -> Self {
        Self::default()
    }

    /// Реестр со всеми стандартными регистраторами
    pub fn with_default_registrars() -> Result<Self, TaxonomyError> {
        let mut mapping = Self::new();
        LanguageLevelInformationRegistrar::register(&mut mapping)?;
        SuperclassInformationRegistrar::register(&mut mapping)?;
        SubNodeInformationRegistrar::register(&mut mapping)?;

        tracing::debug!(
            "Node information mapping built: {} language level, {} superclass, {} sub node entries",
            mapping.language_levels.len(),
            mapping.superclasses.len(),
            mapping.sub_nodes.len()
        );

        Ok(mapping)
    }

    pub fn map_language_level(
        &mut self,
        kind: NodeKind,
        information: LanguageLevelInformation,
    ) -> Result<(), TaxonomyError> {
        insert(&mut self.language_levels, kind, information)
    }

    pub fn map_sub_nodes(
        &mut self,
        kind: NodeKind,
        information: SubNodeInformation,
    ) -> Result<(), TaxonomyError> {
        let information = information.finish(kind)?;
        insert(&mut self.sub_nodes, kind, information)
    }

    pub fn map_superclass(
        &mut self,
        kind: NodeKind,
        information: SuperclassInformation,
    ) -> Result<(), TaxonomyError> {
        insert(&mut self.superclasses, kind, information)
    }

    pub fn get_language_level(
        &self,
        kind: NodeKind,
    ) -> Result<&LanguageLevelInformation, TaxonomyError> {
        lookup(&self.language_levels, kind)
    }

    pub fn get_sub_nodes(&self, kind: NodeKind) -> Result<&SubNodeInformation, TaxonomyError> {
        lookup(&self.sub_nodes, kind)
    }

    pub fn get_superclass(&self, kind: NodeKind) -> Result<&SuperclassInformation, TaxonomyError> {
        lookup(&self.superclasses, kind)
    }
}

fn insert<T: NodeInformation>(
    map: &mut HashMap<NodeKind, T>,
    kind: NodeKind,
    information: T,
) -> Result<(), TaxonomyError> {
    if map.contains_key(&kind) {
        return Err(TaxonomyError::AlreadyRegistered {
            kind: kind.name(),
            info: T::TYPE_NAME,
        });
    }

    map.insert(kind, information);
    Ok(())
}

fn lookup<T: NodeInformation>(
    map: &HashMap<NodeKind, T>,
    kind: NodeKind,
) -> Result<&T, TaxonomyError> {
    kind.ancestors()
        .find_map(|candidate| map.get(&candidate))
        .ok_or(TaxonomyError::NotRegistered {
            kind: kind.name(),
            info: T::TYPE_NAME,
        })
}
