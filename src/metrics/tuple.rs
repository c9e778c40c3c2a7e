/*!
# Language Level Tuple

Вектор фиксированной длины с одним неотрицательным значением на каждую
версию PHP. Это единица обмена между уровнями агрегации и итоговый
результат анализа.
*/

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::language_level::LanguageLevel;

/// Значения по версиям PHP
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageLevelTuple {
    values: [f64; LanguageLevel::COUNT],
}

impl Default for LanguageLevelTuple {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageLevelTuple {
    /// Нулевой кортеж
    pub fn new() -> Self {
        Self {
            values: [0.0; LanguageLevel::COUNT],
        }
    }

    /// Кортеж, у которого все версии имеют одно значение
    pub fn filled(value: f64) -> Self {
        Self {
            values: [value; LanguageLevel::COUNT],
        }
    }

    pub fn from_values(values: [f64; LanguageLevel::COUNT]) -> Self {
        Self { values }
    }

    /// Восстанавливает кортеж из среза; `None`, если длина не совпадает с доменом
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let values: [f64; LanguageLevel::COUNT] = values.try_into().ok()?;
        Some(Self { values })
    }

    pub fn values(&self) -> &[f64; LanguageLevel::COUNT] {
        &self.values
    }

    pub fn get(&self, level: LanguageLevel) -> f64 {
        self.values[level.index()]
    }

    pub fn set(&mut self, level: LanguageLevel, value: f64) {
        self.values[level.index()] = value;
    }

    /// Поэлементная сумма
    pub fn add(&self, other: &LanguageLevelTuple) -> LanguageLevelTuple {
        let mut values = self.values;
        for (value, rhs) in values.iter_mut().zip(other.values.iter()) {
            *value += rhs;
        }
        Self { values }
    }

    /// Поэлементное умножение на коэффициент
    pub fn scale(&self, factor: f64) -> LanguageLevelTuple {
        let mut values = self.values;
        for value in values.iter_mut() {
            *value *= factor;
        }
        Self { values }
    }

    /// Делит каждое значение на текущий максимум; нулевой кортеж не меняется
    pub fn normalize(&self) -> LanguageLevelTuple {
        let max = self.max();
        if max > 0.0 {
            let mut values = self.values;
            for value in values.iter_mut() {
                *value /= max;
            }
            Self { values }
        } else {
            self.scale(1.0)
        }
    }

    pub fn max(&self) -> f64 {
        self.values.iter().fold(0.0, |max, value| max.max(*value))
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|value| *value == 0.0)
    }

    /// Итерация по парам (версия, значение) в порядке релизов
    pub fn iter(&self) -> impl Iterator<Item = (LanguageLevel, f64)> + '_ {
        LanguageLevel::ALL.iter().copied().zip(self.values.iter().copied())
    }

    /// Отображение "версия → значение" для отчетов
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.iter()
            .map(|(level, value)| (level.to_string(), value))
            .collect()
    }

    /// Максимальное расхождение с другим кортежем
    pub fn max_difference(&self, other: &LanguageLevelTuple) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .fold(0.0, |max, (a, b)| max.max((a - b).abs()))
    }
}

impl Index<LanguageLevel> for LanguageLevelTuple {
    type Output = f64;

    fn index(&self, level: LanguageLevel) -> &f64 {
        &self.values[level.index()]
    }
}

impl IndexMut<LanguageLevel> for LanguageLevelTuple {
    fn index_mut(&mut self, level: LanguageLevel) -> &mut f64 {
        &mut self.values[level.index()]
    }
}

impl fmt::Display for LanguageLevelTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(level, value)| format!("{}: {:.2}", level, value))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LanguageLevelTuple {
        let mut tuple = LanguageLevelTuple::new();
        tuple[LanguageLevel::Php5_2] = 2.0;
        tuple[LanguageLevel::Php7_0] = 4.0;
        tuple[LanguageLevel::Php8_1] = 1.0;
        tuple
    }

    #[test]
    fn test_add_zero_and_scale_one_are_identities() {
        let tuple = sample();
        assert_eq!(tuple.add(&LanguageLevelTuple::new()), tuple);
        assert_eq!(tuple.scale(1.0), tuple);
    }

    #[test]
    fn test_add_is_commutative_and_associative() {
        let a = sample();
        let b = LanguageLevelTuple::filled(0.5);
        let mut c = LanguageLevelTuple::new();
        c[LanguageLevel::Php5_6] = 3.0;

        assert_eq!(a.add(&b), b.add(&a));
        assert_eq!(a.add(&b).add(&c), a.add(&b.add(&c)));
    }

    #[test]
    fn test_normalize_peaks_at_one() {
        let normalized = sample().normalize();
        assert_eq!(normalized.max(), 1.0);
        assert_eq!(normalized[LanguageLevel::Php7_0], 1.0);
        assert_eq!(normalized[LanguageLevel::Php5_2], 0.5);
        assert_eq!(normalized[LanguageLevel::Php8_1], 0.25);
    }

    #[test]
    fn test_normalize_zero_stays_zero() {
        let zero = LanguageLevelTuple::new();
        assert!(zero.normalize().is_zero());
        assert_eq!(zero.normalize(), zero);
    }

    #[test]
    fn test_normalize_odd_maximum() {
        let mut tuple = LanguageLevelTuple::new();
        tuple[LanguageLevel::Php5_3] = 3.0;
        tuple[LanguageLevel::Php5_4] = 7.0;
        assert_eq!(tuple.normalize().max(), 1.0);
    }

    #[test]
    fn test_display_format() {
        let text = LanguageLevelTuple::filled(1.0).to_string();
        assert!(text.starts_with("[5.2: 1.00, 5.3: 1.00"));
        assert!(text.ends_with("8.1: 1.00, 8.2: 1.00]"));

        let text = sample().normalize().to_string();
        assert!(text.contains("5.2: 0.50"));
        assert!(text.contains("8.1: 0.25"));
    }

    #[test]
    fn test_serde_as_array() {
        let tuple = sample();
        let json = serde_json::to_string(&tuple).unwrap();
        assert!(json.starts_with("[2.0,0.0"));
        let restored: LanguageLevelTuple = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, tuple);
    }

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        assert!(LanguageLevelTuple::from_slice(&[1.0, 2.0]).is_none());
        assert!(LanguageLevelTuple::from_slice(&[0.0; LanguageLevel::COUNT]).is_some());
    }
}
