/*!
# Tests for Modernity

Integration tests for the parse → annotate → aggregate pipeline
*/

#[cfg(test)]
mod tests {
    use super::super::annotator::Annotator;
    use super::super::engine::Modernity;
    use super::super::modernity_visitor::ModernityVisitor;
    use crate::config::ModernityConfig;
    use crate::core::errors::ModernityError;
    use crate::language_level::LanguageLevel;
    use crate::metrics::LanguageLevelTuple;
    use crate::php_parser::{NodeKind, PhpParser};
    use pretty_assertions::assert_eq;
    use std::fs;

    fn engine() -> Modernity {
        Modernity::with_config(ModernityConfig {
            workers: Some(2),
            ..ModernityConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_echo_string_is_uniform() {
        let tuple = engine().get_tuple_for_code("<?php echo 'Hello';").unwrap();
        assert_eq!(tuple, LanguageLevelTuple::filled(1.0));
        assert_eq!(tuple[LanguageLevel::Php5_2], 1.0);
    }

    #[test]
    fn test_short_array_among_variables() {
        let code = r#"<?php
            $a = $b;
            $c = $d;
            $e = $f;
            $g = $h;
            $i = $j;
            $k = $l;
            $m = [1];
        "#;
        let tuple = engine().get_tuple_for_code(code).unwrap();
        assert!(tuple[LanguageLevel::Php5_4] > tuple[LanguageLevel::Php5_2]);
        assert!(tuple[LanguageLevel::Php5_3] == tuple[LanguageLevel::Php5_2]);
    }

    #[test]
    fn test_match_contribution_starts_at_php8() {
        let engine = engine();
        let nodes = PhpParser::new()
            .unwrap()
            .parse("<?php match ($a) { 1 => 'one', default => 'other' };")
            .unwrap();

        Annotator::new(engine.mapping()).annotate(&nodes).unwrap();
        let mut visitor = ModernityVisitor::new(engine.mapping());
        visitor.traverse(&nodes).unwrap();

        let contribution = visitor.kind_contribution(NodeKind::StmtExpression);
        for level in LanguageLevel::ALL.iter().copied() {
            if level < LanguageLevel::Php8_0 {
                assert_eq!(contribution[level], 0.0, "{}", level);
            } else {
                assert!(contribution[level] > 0.0, "{}", level);
                assert_eq!(contribution[level], contribution[LanguageLevel::Php8_0]);
            }
        }
    }

    #[test]
    fn test_determinism() {
        let engine = engine();
        let code = "<?php class A { public function f(?int $x): static { return $this; } }";
        assert_eq!(
            engine.get_tuple_for_code(code).unwrap(),
            engine.get_tuple_for_code(code).unwrap()
        );
    }

    #[test]
    fn test_syntax_error_names_origin() {
        let error = engine().get_tuple_for_code("<?php $a = ;").unwrap_err();
        match error {
            ModernityError::Parse { origin, .. } => assert_eq!(origin, "<code>"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = engine()
            .get_tuple_for_file(&dir.path().join("absent.php"))
            .unwrap_err();
        assert!(matches!(error, ModernityError::Io { .. }));
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_single_file_directory_equals_normalized_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.php");
        fs::write(&file, "<?php $a = [1, 2]; echo $a[0] ?? 'none';").unwrap();

        let engine = engine();
        let file_tuple = engine.get_tuple_for_file(&file).unwrap();
        let dir_tuple = engine.get_tuple_for_directory(dir.path()).unwrap();

        assert_eq!(dir_tuple, file_tuple.normalize());
    }

    #[test]
    fn test_broken_file_is_skipped_and_excluded_from_size() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.php"), "<?php echo 'ok';").unwrap();
        fs::write(dir.path().join("broken.php"), "<?php function (").unwrap();

        let analysis = engine().analyze_directory(dir.path()).unwrap();

        assert_eq!(analysis.files.len(), 2);
        assert_eq!(analysis.skipped().count(), 1);
        assert_eq!(analysis.analyzed().count(), 1);
        assert_eq!(
            analysis.total_size,
            fs::metadata(dir.path().join("good.php")).unwrap().len()
        );
        assert_eq!(analysis.total, LanguageLevelTuple::filled(1.0));
    }

    #[test]
    fn test_parse_errors_abort_when_not_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.php"), "<?php function (").unwrap();

        let engine = Modernity::with_config(ModernityConfig {
            skip_parse_errors: false,
            workers: Some(1),
            ..ModernityConfig::default()
        })
        .unwrap();

        let error = engine.get_tuple_for_directory(dir.path()).unwrap_err();
        assert!(matches!(error, ModernityError::Parse { .. }));
    }

    #[test]
    fn test_empty_directory_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let tuple = engine().get_tuple_for_directory(dir.path()).unwrap();
        assert!(tuple.is_zero());
    }

    #[test]
    fn test_excluded_directories_are_not_walked() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("main.php"), "<?php echo 1;").unwrap();
        fs::write(dir.path().join("vendor/lib.php"), "<?php function (").unwrap();

        let engine = Modernity::with_config(ModernityConfig {
            exclude_dirs: vec!["vendor".to_string()],
            skip_parse_errors: false,
            workers: Some(2),
            ..ModernityConfig::default()
        })
        .unwrap();

        let analysis = engine.analyze_directory(dir.path()).unwrap();
        assert_eq!(analysis.files.len(), 1);
    }

    #[test]
    fn test_trait_adaptations_are_classified() {
        let code = "<?php trait T { use X { a as protected b; X::c insteadof Y; } }";
        assert!(engine().get_tuple_for_code(code).is_ok());

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("trait.php"), code).unwrap();
        let analysis = engine().analyze_directory(dir.path()).unwrap();
        assert_eq!(analysis.files.len(), 1);
        assert!(!analysis.total.is_zero());
    }

    #[test]
    fn test_never_return_type_starts_at_php81() {
        let tuple = engine()
            .get_tuple_for_code("<?php class A { function f(): never {} }")
            .unwrap();
        assert!(tuple[LanguageLevel::Php8_1] > tuple[LanguageLevel::Php8_0]);
    }

    #[test]
    fn test_empty_window_does_not_abort_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.php"), "<?php echo 1;").unwrap();
        fs::write(
            dir.path().join("b.php"),
            "<?php class A { function __autoload(): object {} }",
        )
        .unwrap();

        let engine = Modernity::with_config(ModernityConfig {
            skip_parse_errors: false,
            workers: Some(2),
            ..ModernityConfig::default()
        })
        .unwrap();

        let analysis = engine.analyze_directory(dir.path()).unwrap();
        assert_eq!(analysis.files.len(), 2);
        assert_eq!(analysis.skipped().count(), 0);
        assert!(engine.get_tuple_for_directory(dir.path()).is_ok());
    }

    #[test]
    fn test_bom_is_excluded_from_size() {
        let dir = tempfile::tempdir().unwrap();
        let code = "<?php echo 1;";
        fs::write(dir.path().join("bom.php"), format!("\u{FEFF}{}", code)).unwrap();

        let analysis = engine().analyze_directory(dir.path()).unwrap();
        assert_eq!(analysis.total_size, code.len() as u64);
        assert_eq!(analysis.files[0].size, code.len() as u64);
    }
}
