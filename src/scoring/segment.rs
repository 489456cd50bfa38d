// Text segmentation for importance scoring
use serde::Serialize;

use crate::tokens::estimate_tokens;

/// Granularity of one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    Line,
    Sentence,
    Paragraph,
    CodeBlock,
}

/// A contiguous slice of input text that is independently scored
///
/// Ephemeral: owned by the compression call that created it.
#[derive(Debug, Clone)]
pub struct Segment {
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
    pub kind: SegmentKind,
    /// Relative position of the segment in the document, in [0, 1]
    pub position: f32,
    pub tokens: usize,
    /// Preserved segments bypass budget selection (fenced code blocks)
    pub preserved: bool,
}

fn make_segment(
    text: String,
    start_line: usize,
    end_line: usize,
    kind: SegmentKind,
    preserved: bool,
) -> Segment {
    let tokens = estimate_tokens(&text);
    Segment {
        text,
        start_line,
        end_line,
        kind,
        position: 0.0,
        tokens,
        preserved,
    }
}

/// Split text into segments, capped at `max_segments`
///
/// Fenced code blocks become preserved `CodeBlock` segments; runs of
/// non-blank lines become `Line`, `Sentence`, or `Paragraph` segments
/// depending on shape. When the cap is hit the remainder is folded into one
/// final paragraph so cost stays bounded on adversarial input.
pub fn segment_text(text: &str, max_segments: usize) -> Vec<Segment> {
    let lines: Vec<&str> = text.lines().collect();
    let total_lines = lines.len().max(1);
    let max_segments = max_segments.max(1);
    let mut segments: Vec<Segment> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        if line.trim_start().starts_with("```") {
            let start = i;
            i += 1;
            while i < lines.len() && !lines[i].trim_start().starts_with("```") {
                i += 1;
            }
            let end = i.min(lines.len() - 1);
            if i < lines.len() {
                i += 1; // consume the closing fence
            }
            let block = lines[start..=end].join("\n");
            segments.push(make_segment(block, start, end, SegmentKind::CodeBlock, true));
            continue;
        }

        let start = i;
        while i < lines.len()
            && !lines[i].trim().is_empty()
            && !lines[i].trim_start().starts_with("```")
        {
            i += 1;
        }
        let end = i - 1;
        let para_lines = &lines[start..=end];

        if para_lines.len() == 1 {
            // A single long prose line still splits into sentences
            if looks_like_prose(para_lines) {
                let sentences = split_sentences(para_lines[0]);
                if sentences.len() > 1 {
                    for sentence in sentences {
                        segments.push(make_segment(
                            sentence,
                            start,
                            end,
                            SegmentKind::Sentence,
                            false,
                        ));
                    }
                } else {
                    segments.push(make_segment(
                        para_lines[0].to_string(),
                        start,
                        end,
                        SegmentKind::Line,
                        false,
                    ));
                }
            } else {
                segments.push(make_segment(
                    para_lines[0].to_string(),
                    start,
                    end,
                    SegmentKind::Line,
                    false,
                ));
            }
        } else if looks_like_prose(para_lines) {
            let sentences = split_sentences(&para_lines.join(" "));
            if sentences.len() > 1 {
                for sentence in sentences {
                    segments.push(make_segment(sentence, start, end, SegmentKind::Sentence, false));
                }
            } else {
                segments.push(make_segment(
                    para_lines.join("\n"),
                    start,
                    end,
                    SegmentKind::Paragraph,
                    false,
                ));
            }
        } else {
            segments.push(make_segment(
                para_lines.join("\n"),
                start,
                end,
                SegmentKind::Paragraph,
                false,
            ));
        }
    }

    if segments.len() > max_segments {
        let tail = segments.split_off(max_segments - 1);
        let folded = tail
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let start = tail.first().map(|s| s.start_line).unwrap_or(0);
        let end = tail.last().map(|s| s.end_line).unwrap_or(start);
        let preserved = tail.iter().any(|s| s.preserved);
        segments.push(make_segment(folded, start, end, SegmentKind::Paragraph, preserved));
    }

    for segment in &mut segments {
        segment.position = segment.start_line as f32 / total_lines as f32;
    }

    segments
}

/// A multi-line run reads as prose when it is word-heavy and light on
/// code punctuation
fn looks_like_prose(lines: &[&str]) -> bool {
    let text = lines.join(" ");
    let words = text.split_whitespace().count();
    let code_chars = text
        .chars()
        .filter(|c| matches!(c, '{' | '}' | ';' | '=' | '<' | '>'))
        .count();
    words >= 20 && code_chars * 20 < text.len()
}

/// Split prose on sentence-final punctuation followed by whitespace
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().map_or(true, |n| n.is_whitespace()) {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}
