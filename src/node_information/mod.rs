/*!
# Node Information

Таксономия видов узлов PHP: для каждого вида известны правила появления и
устаревания, класс-обобщение для агрегации и набор слотов с допустимыми
классами значений.

Реестр строится один раз через [`NodeInformationMapping::with_default_registrars`]
и передается по ссылке аннотатору и счетчикам.
*/

pub mod inspectors;
pub mod language_level;
pub mod mapping;
pub mod quirks;
pub mod sub_node;
pub mod superclass;

pub use language_level::{
    InspectionContext, Inspector, LanguageLevelInformation, LanguageLevelInformationRegistrar,
    LevelRule,
};
pub use mapping::{NodeInformation, NodeInformationMapping, NodeInformationRegistrar};
pub use sub_node::{ClassName, SubNodeDefinition, SubNodeInformation, SubNodeInformationRegistrar};
pub use superclass::{SuperclassInformation, SuperclassInformationRegistrar};
