/*!
# PHP Language Levels

Упорядоченное конечное множество версий PHP, относительно которых
классифицируется код. Порядок объявления вариантов совпадает с порядком
релизов.
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::{ModernityError, Result};

/// Версия языка PHP
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LanguageLevel {
    #[serde(rename = "5.2")]
    Php5_2,
    #[serde(rename = "5.3")]
    Php5_3,
    #[serde(rename = "5.4")]
    Php5_4,
    #[serde(rename = "5.5")]
    Php5_5,
    #[serde(rename = "5.6")]
    Php5_6,
    #[serde(rename = "7.0")]
    Php7_0,
    #[serde(rename = "7.1")]
    Php7_1,
    #[serde(rename = "7.2")]
    Php7_2,
    #[serde(rename = "7.3")]
    Php7_3,
    #[serde(rename = "7.4")]
    Php7_4,
    #[serde(rename = "8.0")]
    Php8_0,
    #[serde(rename = "8.1")]
    Php8_1,
    #[serde(rename = "8.2")]
    Php8_2,
}

impl LanguageLevel {
    /// Самая старая поддерживаемая версия
    pub const OLDEST: LanguageLevel = LanguageLevel::Php5_2;

    /// Самая новая поддерживаемая версия
    pub const NEWEST: LanguageLevel = LanguageLevel::Php8_2;

    /// Количество версий в домене
    pub const COUNT: usize = 13;

    /// Все версии в порядке релизов
    pub const ALL: [LanguageLevel; LanguageLevel::COUNT] = [
        LanguageLevel::Php5_2,
        LanguageLevel::Php5_3,
        LanguageLevel::Php5_4,
        LanguageLevel::Php5_5,
        LanguageLevel::Php5_6,
        LanguageLevel::Php7_0,
        LanguageLevel::Php7_1,
        LanguageLevel::Php7_2,
        LanguageLevel::Php7_3,
        LanguageLevel::Php7_4,
        LanguageLevel::Php8_0,
        LanguageLevel::Php8_1,
        LanguageLevel::Php8_2,
    ];

    /// Диапазон версий от `start` до `end` включительно.
    ///
    /// Возвращает `ModernityError::InvalidRange`, если `start` новее `end`.
    pub fn range(start: LanguageLevel, end: LanguageLevel) -> Result<Vec<LanguageLevel>> {
        if start.is_newer_than(end) {
            return Err(ModernityError::InvalidRange { start, end });
        }

        Ok(Self::ALL[start.index()..=end.index()].to_vec())
    }

    /// Полный домен версий
    pub fn all() -> Vec<LanguageLevel> {
        Self::ALL.to_vec()
    }

    /// Позиция версии в домене (0 для OLDEST)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<LanguageLevel> {
        Self::ALL.get(index).copied()
    }

    /// Строковое представление версии ("7.4")
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageLevel::Php5_2 => "5.2",
            LanguageLevel::Php5_3 => "5.3",
            LanguageLevel::Php5_4 => "5.4",
            LanguageLevel::Php5_5 => "5.5",
            LanguageLevel::Php5_6 => "5.6",
            LanguageLevel::Php7_0 => "7.0",
            LanguageLevel::Php7_1 => "7.1",
            LanguageLevel::Php7_2 => "7.2",
            LanguageLevel::Php7_3 => "7.3",
            LanguageLevel::Php7_4 => "7.4",
            LanguageLevel::Php8_0 => "8.0",
            LanguageLevel::Php8_1 => "8.1",
            LanguageLevel::Php8_2 => "8.2",
        }
    }

    /// Мажорная часть версии
    pub fn major(self) -> u32 {
        self.components().0
    }

    /// Минорная часть версии
    pub fn minor(self) -> u32 {
        self.components().1
    }

    fn components(self) -> (u32, u32) {
        let (major, minor) = self.as_str().split_once('.').unwrap_or(("0", "0"));
        (major.parse().unwrap_or(0), minor.parse().unwrap_or(0))
    }

    pub fn is_older_than(self, other: LanguageLevel) -> bool {
        self < other
    }

    pub fn is_newer_than(self, other: LanguageLevel) -> bool {
        self > other
    }
}

impl fmt::Display for LanguageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LanguageLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix("PHP")
            .or_else(|| trimmed.strip_prefix("php"))
            .unwrap_or(trimmed)
            .trim();

        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == trimmed)
            .ok_or_else(|| anyhow::anyhow!("Unknown PHP language level: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_inclusive_and_ordered() {
        let range = LanguageLevel::range(LanguageLevel::Php5_4, LanguageLevel::Php7_0).unwrap();
        assert_eq!(
            range,
            vec![
                LanguageLevel::Php5_4,
                LanguageLevel::Php5_5,
                LanguageLevel::Php5_6,
                LanguageLevel::Php7_0,
            ]
        );
    }

    #[test]
    fn test_full_range() {
        let range = LanguageLevel::range(LanguageLevel::OLDEST, LanguageLevel::NEWEST).unwrap();
        assert_eq!(range.len(), LanguageLevel::COUNT);
        assert_eq!(range.first(), Some(&LanguageLevel::Php5_2));
        assert_eq!(range.last(), Some(&LanguageLevel::Php8_2));
        assert_eq!(range, LanguageLevel::all());
    }

    #[test]
    fn test_single_element_range() {
        for level in LanguageLevel::ALL {
            assert_eq!(LanguageLevel::range(level, level).unwrap(), vec![level]);
        }
    }

    #[test]
    fn test_range_fails_when_start_is_newer() {
        let error = LanguageLevel::range(LanguageLevel::Php5_3, LanguageLevel::Php5_2).unwrap_err();
        assert_eq!(
            error.to_string(),
            "First language level 5.3 is newer than second language level 5.2"
        );
    }

    #[test]
    fn test_ordering_properties() {
        for (i, a) in LanguageLevel::ALL.iter().enumerate() {
            for (j, b) in LanguageLevel::ALL.iter().enumerate() {
                assert_eq!(a.is_older_than(*b), i < j);
                assert_eq!(a.is_newer_than(*b), i > j);
                assert!(!(a.is_older_than(*b) && b.is_older_than(*a)));
            }
        }

        for window in LanguageLevel::ALL.windows(3) {
            let (a, b, c) = (window[0], window[1], window[2]);
            assert!(a.is_older_than(c));
            assert!(!c.is_older_than(a));
            assert!(LanguageLevel::range(a, c).unwrap().contains(&b));
        }
    }

    #[test]
    fn test_major_and_minor() {
        assert_eq!(LanguageLevel::Php5_6.major(), 5);
        assert_eq!(LanguageLevel::Php7_4.major(), 7);
        assert_eq!(LanguageLevel::Php8_1.major(), 8);
        assert_eq!(LanguageLevel::Php7_4.minor(), 4);
    }

    #[test]
    fn test_display_and_parse() {
        for level in LanguageLevel::ALL {
            let parsed: LanguageLevel = level.to_string().parse().unwrap();
            assert_eq!(parsed, level);
        }
        assert_eq!("PHP 8.0".parse::<LanguageLevel>().unwrap(), LanguageLevel::Php8_0);
        assert!("9.0".parse::<LanguageLevel>().is_err());
    }

    #[test]
    fn test_index_matches_position() {
        for (i, level) in LanguageLevel::ALL.iter().enumerate() {
            assert_eq!(level.index(), i);
            assert_eq!(LanguageLevel::from_index(i), Some(*level));
        }
        assert_eq!(LanguageLevel::from_index(LanguageLevel::COUNT), None);
    }
}
