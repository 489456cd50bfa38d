// Integration tests for multi-file compression
use condense::compress::{FileContext, MultiFileCompressor, MultiFileStrategy};

fn file(path: &str, content: &str) -> FileContext {
    FileContext {
        path: path.to_string(),
        content: content.to_string(),
        language: Some("typescript".to_string()),
    }
}

#[test]
fn test_shared_import_block_extracted_once() {
    let imports = "import { api } from './api';\nimport { log } from './log';\n";
    let files = vec![
        file(
            "src/users.ts",
            &format!("{}export function getUser(id: string) {{\n  return api.get(id);\n}}\n", imports),
        ),
        file(
            "src/orders.ts",
            &format!("{}export function getOrders(id: string) {{\n  return api.list(id);\n}}\n", imports),
        ),
    ];

    let compressor = MultiFileCompressor::new();
    let shared = compressor.extract_shared_elements(&files);
    assert_eq!(shared.imports.len(), 2);

    let result = compressor.compress(&files, MultiFileStrategy::Deduplicate);
    assert!(result.stats.deduplicated_items >= 1);
    assert_eq!(result.compressed.matches("import { api } from './api';").count(), 1);
    assert!(result.stats.reduction_percent > 0.0);
}

#[test]
fn test_skeleton_outlines_non_entry_files() {
    let files = vec![
        file(
            "src/index.ts",
            "import { helper } from './helper';\nexport function main() {\n  return helper();\n}\n",
        ),
        file(
            "src/unrelated.ts",
            "export function unrelated() {\n  const secret = 42;\n  return secret;\n}\n",
        ),
    ];

    let result = MultiFileCompressor::new().compress(&files, MultiFileStrategy::Skeleton);
    assert!(result.compressed.contains("return helper()"));
    assert!(result.compressed.contains("export function unrelated() { … }"));
    assert!(!result.compressed.contains("const secret = 42"));
}

#[test]
fn test_chunking_covers_every_file() {
    let files: Vec<FileContext> = (0..8)
        .map(|i| file(&format!("src/f{}.ts", i), &"const x = 'filler';\n".repeat(40)))
        .collect();

    let compressor = MultiFileCompressor::new();
    let chunks = compressor.create_chunks(&files, 400);
    assert!(chunks.len() > 1);
    let total: usize = chunks.iter().map(|c| c.paths.len()).sum();
    assert_eq!(total, 8);

    let result = compressor.compress(&files, MultiFileStrategy::Chunk);
    assert_eq!(result.stats.technique, "chunked");
    assert!(result.compressed.contains("chunk 1/"));
}

#[test]
fn test_strategies_never_error_on_odd_input() {
    let files = vec![file("weird.bin", "\u{0}\u{1}\u{2} not really code")];
    let compressor = MultiFileCompressor::new();
    for strategy in [
        MultiFileStrategy::Deduplicate,
        MultiFileStrategy::Skeleton,
        MultiFileStrategy::Chunk,
    ] {
        let result = compressor.compress(&files, strategy);
        assert!(result.stats.original_tokens > 0);
    }
}
