/*!
# Language Level Metrics

Числовые примитивы агрегации: кортеж значений по версиям PHP и счетчик
попаданий, наполняющий такой кортеж.
*/

pub mod counter;
pub mod tuple;

pub use counter::LanguageLevelCounter;
pub use tuple::LanguageLevelTuple;
