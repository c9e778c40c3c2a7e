/*!
# Tuple Cache

Персистентное хранилище результатов анализа пакетов. Повторный анализ
пакета с уже сохраненным ключом `<package>/<version>` берет кортеж из
хранилища.
*/

pub mod tuple_store;

pub use tuple_store::LanguageLevelTupleStore;
