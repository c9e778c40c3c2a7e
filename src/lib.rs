/*!
# PHP Modernity

Static classifier that estimates how much of a PHP code base relies on the
features of each PHP release from 5.2 to 8.2. The result is a tuple of 13
weights, one per release.

## Pipeline

```text
PHP source
├── php_parser        - tree-sitter PHP grammar lowered to typed syntax nodes
├── node_information  - taxonomy: introduction/deprecation rules, superclasses, slots
├── analyzer          - annotator, slot counters, per-file visitor, engine
├── metrics           - LanguageLevelTuple and LanguageLevelCounter
└── reports           - text, table, CSV and JSON output
```

Directory analysis runs files in parallel on a rayon pool and merges the
per-file tuples weighted by file size. Package sets
(`<root>/<package>/<version>/`) are cached in a persistent tuple store.

## Usage

### CLI
```bash
php-modernity code '<?php $a = [1, 2];'
php-modernity dir ./src --format table
php-modernity packages ./packages --output results.csv
php-modernity cache show
```

### Library
```rust,no_run
use php_modernity::Modernity;

let engine = Modernity::new()?;
let tuple = engine.get_tuple_for_code("<?php echo 'Hello';")?;
println!("{}", tuple);
# Ok::<(), php_modernity::ModernityError>(())
```
*/

pub mod analyzer;
pub mod cache;
pub mod cli_common;
pub mod config;
pub mod core;
pub mod language_level;
pub mod metrics;
pub mod node_information;
pub mod php_parser;
pub mod reports;

// Re-export main types for convenience
pub use analyzer::{DirectoryAnalysis, FileEntry, Modernity};
pub use cache::LanguageLevelTupleStore;
pub use config::ModernityConfig;
pub use core::{ModernityError, ParseError, Result, TaxonomyError};
pub use language_level::LanguageLevel;
pub use metrics::{LanguageLevelCounter, LanguageLevelTuple};
pub use node_information::NodeInformationMapping;
pub use php_parser::{PhpParser, SyntaxNode};
pub use reports::{ModernityReport, ReportFormat, ReportGenerator};

use std::path::Path;

/// Кортеж для фрагмента PHP кода с настройками по умолчанию
pub fn analyze_code(code: &str) -> Result<LanguageLevelTuple> {
    Modernity::new()?.get_tuple_for_code(code)
}

/// Кортеж для одного PHP файла с настройками по умолчанию
pub fn analyze_file<P: AsRef<Path>>(file_path: P) -> Result<LanguageLevelTuple> {
    Modernity::new()?.get_tuple_for_file(file_path.as_ref())
}

/// Кортеж для директории с настройками по умолчанию
pub fn analyze_directory<P: AsRef<Path>>(path: P) -> Result<LanguageLevelTuple> {
    Modernity::new()?.get_tuple_for_directory(path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_functionality() {
        let tuple = analyze_code("<?php echo 'Hello';").unwrap();
        assert_eq!(tuple, LanguageLevelTuple::filled(1.0));
    }

    #[test]
    fn test_parser_creation() {
        let mut parser = PhpParser::new().unwrap();
        assert!(parser.parse("<?php").is_ok());
    }
}
