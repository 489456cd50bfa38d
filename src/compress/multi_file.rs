// Cross-file deduplication, skeleton rendering, and chunking
use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CondenseError;
use crate::tokens::estimate_tokens;

/// One already-loaded file handed in by the caller; this strategy never
/// touches storage itself
#[derive(Debug, Clone)]
pub struct FileContext {
    pub path: String,
    pub content: String,
    pub language: Option<String>,
}

/// Structural view of one file, normally supplied by an AST-based
/// collaborator; the built-in provider approximates it with line patterns
#[derive(Debug, Clone, Default)]
pub struct Outline {
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub interfaces: Vec<String>,
    pub types: Vec<String>,
    pub variables: Vec<String>,
    pub imports: Vec<String>,
}

/// Seam for the external structural extractor
pub trait OutlineProvider: Send + Sync {
    fn outline(&self, file: &FileContext) -> Outline;
}

/// Line-pattern fallback used when no AST collaborator is wired in
pub struct RegexOutline {
    function_line: Regex,
    class_line: Regex,
    interface_line: Regex,
    type_line: Regex,
    variable_line: Regex,
    import_line: Regex,
}

impl Default for RegexOutline {
    fn default() -> Self {
        Self::new()
    }
}

impl RegexOutline {
    pub fn new() -> Self {
        Self {
            function_line: Regex::new(
                r"^\s*(?:pub\s+)?(?:async\s+)?(?:fn|def|func)\s+\w+|^\s*(?:export\s+)?(?:async\s+)?function\s+\w+",
            )
            .unwrap(),
            class_line: Regex::new(r"^\s*(?:export\s+)?(?:abstract\s+)?class\s+\w+").unwrap(),
            interface_line: Regex::new(r"^\s*(?:export\s+)?interface\s+\w+|^\s*(?:pub\s+)?trait\s+\w+")
                .unwrap(),
            type_line: Regex::new(
                r"^\s*(?:export\s+)?type\s+\w+|^\s*(?:pub\s+)?(?:struct|enum)\s+\w+",
            )
            .unwrap(),
            variable_line: Regex::new(
                r"^\s*(?:export\s+)?const\s+\w+|^\s*(?:pub\s+)?static\s+\w+|^\s*#define\s+\w+",
            )
            .unwrap(),
            import_line: Regex::new(r"^\s*(?:import\s|use\s+\w|from\s+\S+\s+import|#include|require\()")
                .unwrap(),
        }
    }

    fn signature_of(line: &str) -> String {
        let trimmed = line.trim_end();
        match trimmed.find('{') {
            Some(pos) => format!("{} {{ … }}", trimmed[..pos].trim_end()),
            None => trimmed.to_string(),
        }
    }
}

impl OutlineProvider for RegexOutline {
    fn outline(&self, file: &FileContext) -> Outline {
        let mut outline = Outline::default();
        for line in file.content.lines() {
            if self.import_line.is_match(line) {
                outline.imports.push(line.trim().to_string());
            } else if self.function_line.is_match(line) {
                outline.functions.push(Self::signature_of(line));
            } else if self.class_line.is_match(line) {
                outline.classes.push(Self::signature_of(line));
            } else if self.interface_line.is_match(line) {
                outline.interfaces.push(Self::signature_of(line));
            } else if self.type_line.is_match(line) {
                outline.types.push(Self::signature_of(line));
            } else if self.variable_line.is_match(line) {
                outline.variables.push(Self::signature_of(line));
            }
        }
        outline
    }
}

/// How to compact a set of files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiFileStrategy {
    Deduplicate,
    Skeleton,
    Chunk,
}

impl std::str::FromStr for MultiFileStrategy {
    type Err = CondenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deduplicate" => Ok(Self::Deduplicate),
            "skeleton" => Ok(Self::Skeleton),
            "chunk" => Ok(Self::Chunk),
            other => Err(CondenseError::InvalidOptions(format!(
                "unknown multi-file strategy '{}' (expected deduplicate|skeleton|chunk)",
                other
            ))),
        }
    }
}

/// Lines shared by two or more files, lifted out once
#[derive(Debug, Clone, Default)]
pub struct SharedElements {
    pub imports: Vec<String>,
    pub types: Vec<String>,
    pub constants: Vec<String>,
}

impl SharedElements {
    pub fn len(&self) -> usize {
        self.imports.len() + self.types.len() + self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, line: &str) -> bool {
        let line = line.trim();
        self.imports.iter().any(|l| l == line)
            || self.types.iter().any(|l| l == line)
            || self.constants.iter().any(|l| l == line)
    }
}

/// Aggregate accounting across all input files
#[derive(Debug, Clone, Serialize)]
pub struct MultiFileStats {
    pub original_tokens: usize,
    pub compressed_tokens: usize,
    pub reduction_percent: f32,
    pub deduplicated_items: usize,
    pub technique: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiFileResult {
    pub compressed: String,
    pub stats: MultiFileStats,
}

/// One token-bounded bucket of files for incremental consumption
#[derive(Debug, Clone)]
pub struct Chunk {
    pub paths: Vec<String>,
    pub content: String,
    pub tokens: usize,
}

/// Multi-file compression over already-loaded file contexts
pub struct MultiFileCompressor {
    provider: Box<dyn OutlineProvider>,
    max_chunk_tokens: usize,
    entry_depth: usize,
}

impl Default for MultiFileCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiFileCompressor {
    pub fn new() -> Self {
        Self {
            provider: Box::new(RegexOutline::new()),
            max_chunk_tokens: 2000,
            entry_depth: 1,
        }
    }

    /// Substitute the AST collaborator for the built-in line provider
    pub fn with_provider(provider: Box<dyn OutlineProvider>) -> Self {
        Self {
            provider,
            max_chunk_tokens: 2000,
            entry_depth: 1,
        }
    }

    pub fn max_chunk_tokens(mut self, tokens: usize) -> Self {
        self.max_chunk_tokens = tokens.max(1);
        self
    }

    /// Lift import/type/const lines that occur verbatim in two or more files
    pub fn extract_shared_elements(&self, files: &[FileContext]) -> SharedElements {
        let mut occurrences: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();

        for file in files {
            let mut in_file: HashSet<&str> = HashSet::new();
            for line in file.content.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() || !in_file.insert(trimmed) {
                    continue;
                }
                let count = occurrences.entry(trimmed.to_string()).or_insert(0);
                *count += 1;
                if *count == 1 {
                    first_seen.push(trimmed.to_string());
                }
            }
        }

        let mut shared = SharedElements::default();
        for line in first_seen {
            if occurrences.get(&line).copied().unwrap_or(0) < 2 {
                continue;
            }
            if is_import_line(&line) {
                shared.imports.push(line);
            } else if is_type_line(&line) {
                shared.types.push(line);
            } else if is_const_line(&line) {
                shared.constants.push(line);
            }
        }
        shared
    }

    /// Bucket files greedily into token-bounded chunks, preserving input
    /// order; a single oversized file gets a chunk of its own
    pub fn create_chunks(&self, files: &[FileContext], max_tokens: usize) -> Vec<Chunk> {
        let max_tokens = max_tokens.max(1);
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut paths: Vec<String> = Vec::new();
        let mut content = String::new();
        let mut used = 0usize;

        for file in files {
            let rendered = render_file(file);
            let tokens = estimate_tokens(&rendered);
            if used > 0 && used + tokens > max_tokens {
                chunks.push(Chunk {
                    paths: std::mem::take(&mut paths),
                    content: std::mem::take(&mut content),
                    tokens: used,
                });
                used = 0;
            }
            paths.push(file.path.clone());
            content.push_str(&rendered);
            used += tokens;
        }
        if !paths.is_empty() {
            chunks.push(Chunk {
                paths,
                content,
                tokens: used,
            });
        }
        chunks
    }

    /// Compact the file set with the chosen strategy
    pub fn compress(&self, files: &[FileContext], strategy: MultiFileStrategy) -> MultiFileResult {
        let original_tokens: usize = files
            .iter()
            .map(|f| estimate_tokens(&render_file(f)))
            .sum();

        let (compressed, deduplicated_items, technique) = match strategy {
            MultiFileStrategy::Deduplicate => {
                let shared = self.extract_shared_elements(files);
                let output = self.render_deduplicated(files, &shared);
                (output, shared.len(), "cross-file-dedup")
            }
            MultiFileStrategy::Skeleton => {
                let output = self.render_skeleton(files);
                (output, 0, "skeleton")
            }
            MultiFileStrategy::Chunk => {
                let chunks = self.create_chunks(files, self.max_chunk_tokens);
                let total = chunks.len();
                let output = chunks
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        format!(
                            "── chunk {}/{} ({} tokens) ──\n{}",
                            i + 1,
                            total,
                            c.tokens,
                            c.content
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                (output, 0, "chunked")
            }
        };

        let compressed_tokens = estimate_tokens(&compressed);
        let reduction_percent = if original_tokens > 0 {
            (1.0 - compressed_tokens as f32 / original_tokens as f32) * 100.0
        } else {
            0.0
        };

        MultiFileResult {
            compressed,
            stats: MultiFileStats {
                original_tokens,
                compressed_tokens,
                reduction_percent,
                deduplicated_items,
                technique: technique.to_string(),
            },
        }
    }

    fn render_deduplicated(&self, files: &[FileContext], shared: &SharedElements) -> String {
        let mut out = String::new();
        if !shared.is_empty() {
            out.push_str(&format!("// shared across {} files\n", files.len()));
            for line in shared
                .imports
                .iter()
                .chain(shared.types.iter())
                .chain(shared.constants.iter())
            {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        for file in files {
            out.push_str(&format!("// {}\n", file.path));
            for line in file.content.lines() {
                if !line.trim().is_empty() && shared.contains(line) {
                    continue;
                }
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }

    /// Entry-point files within the dependency depth limit stay full;
    /// everything else renders as declarations only
    fn render_skeleton(&self, files: &[FileContext]) -> String {
        let full: HashSet<usize> = self.files_within_entry_depth(files);
        let mut out = String::new();

        for (i, file) in files.iter().enumerate() {
            out.push_str(&format!("// {}\n", file.path));
            if full.contains(&i) {
                out.push_str(&file.content);
            } else {
                let outline = self.provider.outline(file);
                for line in outline
                    .imports
                    .iter()
                    .chain(outline.types.iter())
                    .chain(outline.interfaces.iter())
                    .chain(outline.classes.iter())
                    .chain(outline.functions.iter())
                    .chain(outline.variables.iter())
                {
                    out.push_str(line);
                    out.push('\n');
                }
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }

    /// BFS from entry-point stems over import mentions, bounded by
    /// `entry_depth`
    fn files_within_entry_depth(&self, files: &[FileContext]) -> HashSet<usize> {
        let stems: Vec<String> = files.iter().map(|f| stem_of(&f.path)).collect();

        let mut depth: Vec<Option<usize>> = files
            .iter()
            .map(|f| if is_entry_point(&f.path) { Some(0) } else { None })
            .collect();

        for _ in 0..self.entry_depth {
            let mut next = depth.clone();
            for (i, file) in files.iter().enumerate() {
                let Some(d) = depth[i] else { continue };
                if d >= self.entry_depth {
                    continue;
                }
                let imports: Vec<&str> = file
                    .content
                    .lines()
                    .filter(|l| is_import_line(l.trim()))
                    .collect();
                for (j, stem) in stems.iter().enumerate() {
                    if i == j || next[j].is_some() {
                        continue;
                    }
                    if imports.iter().any(|imp| imp.contains(stem.as_str())) {
                        next[j] = Some(d + 1);
                    }
                }
            }
            depth = next;
        }

        depth
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.map(|_| i))
            .collect()
    }
}

fn render_file(file: &FileContext) -> String {
    format!("// {}\n{}\n", file.path, file.content)
}

fn stem_of(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    name.split('.').next().unwrap_or(name).to_string()
}

fn is_entry_point(path: &str) -> bool {
    matches!(stem_of(path).as_str(), "main" | "lib" | "mod" | "index" | "app")
}

fn is_import_line(line: &str) -> bool {
    line.starts_with("import ")
        || line.starts_with("use ")
        || line.starts_with("#include")
        || line.starts_with("require(")
        || (line.starts_with("from ") && line.contains(" import "))
}

fn is_type_line(line: &str) -> bool {
    line.starts_with("type ")
        || line.starts_with("export type ")
        || line.starts_with("interface ")
        || line.starts_with("export interface ")
        || line.starts_with("struct ")
        || line.starts_with("pub struct ")
        || line.starts_with("enum ")
        || line.starts_with("pub enum ")
}

fn is_const_line(line: &str) -> bool {
    line.starts_with("const ")
        || line.starts_with("export const ")
        || line.starts_with("pub const ")
        || line.starts_with("static ")
        || line.starts_with("#define ")
}
