//! Счетчик попаданий по версиям PHP

use crate::core::errors::Result;
use crate::language_level::LanguageLevel;
use crate::metrics::tuple::LanguageLevelTuple;

/// Накапливает попадания по версиям в `LanguageLevelTuple`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageLevelCounter {
    tuple: LanguageLevelTuple,
}

impl LanguageLevelCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.tuple = LanguageLevelTuple::new();
    }

    /// Одно попадание в указанную версию
    pub fn hit(&mut self, level: LanguageLevel) {
        self.tuple[level] += 1.0;
    }

    /// По одному попаданию в каждую версию диапазона `start..=end`
    pub fn hit_range(&mut self, start: LanguageLevel, end: LanguageLevel) -> Result<()> {
        for level in LanguageLevel::range(start, end)? {
            self.hit(level);
        }
        Ok(())
    }

    pub fn get(&self, level: LanguageLevel) -> f64 {
        self.tuple[level]
    }

    pub fn tuple(&self) -> &LanguageLevelTuple {
        &self.tuple
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_range_touches_every_level_once() {
        let mut counter = LanguageLevelCounter::new();
        counter
            .hit_range(LanguageLevel::Php5_5, LanguageLevel::Php7_1)
            .unwrap();

        for level in LanguageLevel::ALL {
            let expected = if level >= LanguageLevel::Php5_5 && level <= LanguageLevel::Php7_1 {
                1.0
            } else {
                0.0
            };
            assert_eq!(counter.get(level), expected, "level {}", level);
        }
    }

    #[test]
    fn test_hit_range_accumulates() {
        let mut counter = LanguageLevelCounter::new();
        counter.hit_range(LanguageLevel::OLDEST, LanguageLevel::NEWEST).unwrap();
        counter.hit_range(LanguageLevel::Php8_0, LanguageLevel::NEWEST).unwrap();
        counter.hit(LanguageLevel::Php8_2);

        assert_eq!(counter.get(LanguageLevel::Php7_4), 1.0);
        assert_eq!(counter.get(LanguageLevel::Php8_0), 2.0);
        assert_eq!(counter.get(LanguageLevel::Php8_2), 3.0);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut counter = LanguageLevelCounter::new();
        assert!(counter
            .hit_range(LanguageLevel::Php8_1, LanguageLevel::Php7_0)
            .is_err());
        assert!(counter.tuple().is_zero());
    }

    #[test]
    fn test_reset() {
        let mut counter = LanguageLevelCounter::new();
        counter.hit(LanguageLevel::Php5_3);
        counter.reset();
        assert!(counter.tuple().is_zero());
    }
}
