/*!
# Modernity Engine

Facade over the classification pipeline: parse, annotate, aggregate.
Directory analysis scores files in parallel on a local rayon pool and merges
the per-file tuples sequentially in path order.
*/

use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config::ModernityConfig;
use crate::core::errors::{ModernityError, Result};
use crate::core::fs_utils::{collect_php_files, read_php_file};
use crate::metrics::LanguageLevelTuple;
use crate::node_information::NodeInformationMapping;
use crate::php_parser::{PhpParser, SyntaxNode};

use super::annotator::Annotator;
use super::modernity_visitor::ModernityVisitor;

/// Результат анализа одного файла директории
#[derive(Debug)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Размер прочитанного содержимого в байтах (без BOM)
    pub size: u64,
    pub result: Result<LanguageLevelTuple>,
}

impl FileEntry {
    pub fn is_skipped(&self) -> bool {
        self.result.is_err()
    }
}

/// Результат анализа директории
#[derive(Debug)]
pub struct DirectoryAnalysis {
    pub root: PathBuf,
    /// Файлы в порядке путей, включая пропущенные
    pub files: Vec<FileEntry>,
    /// Σ normalize(файл) × размер / суммарный размер учтенных файлов
    pub total: LanguageLevelTuple,
    pub total_size: u64,
}

impl DirectoryAnalysis {
    /// Успешно проанализированные файлы
    pub fn analyzed(&self) -> impl Iterator<Item = (&Path, &LanguageLevelTuple)> {
        self.files.iter().filter_map(|entry| match &entry.result {
            Ok(tuple) => Some((entry.path.as_path(), tuple)),
            Err(_) => None,
        })
    }

    /// Пропущенные файлы с причиной
    pub fn skipped(&self) -> impl Iterator<Item = (&Path, &ModernityError)> {
        self.files.iter().filter_map(|entry| match &entry.result {
            Err(error) => Some((entry.path.as_path(), error)),
            Ok(_) => None,
        })
    }
}

pub struct Modernity {
    mapping: NodeInformationMapping,
    config: ModernityConfig,
    pool: rayon::ThreadPool,
}

impl Modernity {
    /// Создает движок с настройками по умолчанию
    pub fn new() -> Result<Self> {
        Self::with_config(ModernityConfig::default())
    }

    pub fn with_config(config: ModernityConfig) -> Result<Self> {
        let mapping = NodeInformationMapping::with_default_registrars()?;
        let workers = config.worker_count();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| ModernityError::WorkerPool(e.to_string()))?;

        tracing::debug!("Configured {} worker threads for directory analysis", workers);

        Ok(Self {
            mapping,
            config,
            pool,
        })
    }

    pub fn mapping(&self) -> &NodeInformationMapping {
        &self.mapping
    }

    pub fn config(&self) -> &ModernityConfig {
        &self.config
    }

    /// Кортеж для фрагмента PHP кода
    pub fn get_tuple_for_code(&self, code: &str) -> Result<LanguageLevelTuple> {
        let mut parser = PhpParser::new()?;
        self.score_source(&mut parser, code, "<code>")
    }

    /// Кортеж для одного файла
    pub fn get_tuple_for_file(&self, path: &Path) -> Result<LanguageLevelTuple> {
        let mut parser = PhpParser::new()?;
        self.score_file(&mut parser, path)
    }

    /// Кортеж для директории (рекурсивно)
    pub fn get_tuple_for_directory(&self, path: &Path) -> Result<LanguageLevelTuple> {
        Ok(self.analyze_directory(path)?.total)
    }

    /// Кортеж для уже разобранного дерева; дерево аннотируется на месте
    pub fn get_tuple_for_nodes(&self, nodes: &[SyntaxNode]) -> Result<LanguageLevelTuple> {
        Annotator::new(&self.mapping).annotate(nodes)?;

        let mut visitor = ModernityVisitor::new(&self.mapping);
        visitor.traverse(nodes)?;

        tracing::trace!("Visited {} nodes", visitor.visits());
        Ok(visitor.tuple())
    }

    /// Анализирует все PHP файлы директории
    ///
    /// Синтаксические ошибки и нечитаемые файлы пропускаются (если это
    /// разрешено настройками) и не входят в суммарный размер. Ошибки
    /// таксономии прерывают анализ.
    pub fn analyze_directory(&self, root: &Path) -> Result<DirectoryAnalysis> {
        let files = collect_php_files(
            root,
            &self.config.extensions,
            &self.config.exclude_dirs,
            self.config.follow_links,
        );

        tracing::debug!("Found {} PHP files in {}", files.len(), root.display());

        let mut entries: Vec<FileEntry> = self.pool.install(|| {
            files
                .par_iter()
                .map_init(PhpParser::new, |parser, path| {
                    let (size, result) = match parser {
                        Ok(parser) => self.score_file_sized(parser, path),
                        Err(e) => (0, Err(ModernityError::Grammar(e.to_string()))),
                    };
                    FileEntry {
                        path: path.clone(),
                        size,
                        result,
                    }
                })
                .collect()
        });

        let skip = self.config.skip_parse_errors;
        if let Some(index) = entries.iter().position(|entry| match &entry.result {
            Err(error) => !(skip && error.is_recoverable()),
            Ok(_) => false,
        }) {
            let entry = entries.swap_remove(index);
            if let Err(error) = entry.result {
                return Err(error);
            }
        }

        let total_size: u64 = entries
            .iter()
            .filter(|entry| !entry.is_skipped())
            .map(|entry| entry.size)
            .sum();

        let mut total = LanguageLevelTuple::new();
        for entry in &entries {
            match &entry.result {
                Ok(tuple) if total_size > 0 => {
                    total = total.add(
                        &tuple
                            .normalize()
                            .scale(entry.size as f64 / total_size as f64),
                    );
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!("Skipping {}: {}", entry.path.display(), error);
                }
            }
        }

        tracing::info!(
            "Analyzed {} of {} files in {} ({} bytes)",
            entries.iter().filter(|entry| !entry.is_skipped()).count(),
            entries.len(),
            root.display(),
            total_size
        );

        Ok(DirectoryAnalysis {
            root: root.to_path_buf(),
            files: entries,
            total,
            total_size,
        })
    }

    fn score_file(&self, parser: &mut PhpParser, path: &Path) -> Result<LanguageLevelTuple> {
        self.score_file_sized(parser, path).1
    }

    /// Кортеж файла и размер прочитанного содержимого в байтах
    fn score_file_sized(
        &self,
        parser: &mut PhpParser,
        path: &Path,
    ) -> (u64, Result<LanguageLevelTuple>) {
        let code = match read_php_file(path) {
            Ok(code) => code,
            Err(source) => {
                return (
                    0,
                    Err(ModernityError::Io {
                        path: path.to_path_buf(),
                        source,
                    }),
                )
            }
        };

        tracing::debug!("Analyzing {}", path.display());
        let size = code.len() as u64;
        (size, self.score_source(parser, &code, &path.display().to_string()))
    }

    fn score_source(
        &self,
        parser: &mut PhpParser,
        code: &str,
        origin: &str,
    ) -> Result<LanguageLevelTuple> {
        let nodes = parser.parse(code).map_err(|source| ModernityError::Parse {
            origin: origin.to_string(),
            source,
        })?;

        self.get_tuple_for_nodes(&nodes)
    }
}
