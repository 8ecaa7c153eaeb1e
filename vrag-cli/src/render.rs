//! Plain-text rendering of pipeline results.

use std::fmt::Write;
use std::path::Path;

use vrag_core::{IndexReport, RankedChunks, Turn};

const PREVIEW_CHARS: usize = 160;

fn preview(text: &str) -> String {
    let mut short: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        short.push_str("...");
    }
    short.replace('\n', " ")
}

pub fn index_report(report: &IndexReport, location: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Index written to {}", location.display());
    let _ = writeln!(
        out,
        "  documents: {}  chunks: {}  skipped duplicates: {}",
        report.documents, report.chunks, report.skipped_duplicates
    );
    for failure in &report.failures {
        let _ = writeln!(out, "  failed: {failure}");
    }
    out
}

/// Renders a turn, listing at most `top_k` chunks per sub-question.
pub fn turn(turn: &Turn, top_k: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Sub-questions ===");
    for question in &turn.sub_questions {
        let _ = writeln!(out, "{}: {}", question.id, question.text);
    }

    let _ = writeln!(out, "\n=== Contexts ===");
    for context in &turn.contexts {
        let _ = writeln!(out, "[{}] {}", context.question.id, context.question.text);
        if let Some(failure) = &context.failure {
            let _ = writeln!(out, "  retrieval failed: {failure}");
        }
        match &context.chunks {
            RankedChunks::Reranked(scored) => {
                for s in scored.iter().take(top_k) {
                    let _ = writeln!(
                        out,
                        "  {:.4} (sim {:.4})  {}  {}",
                        s.adjusted_score,
                        s.similarity,
                        s.chunk.source_id,
                        preview(&s.chunk.text)
                    );
                }
            }
            RankedChunks::RetrievalOrder(chunks) => {
                for chunk in chunks.iter().take(top_k) {
                    let _ = writeln!(out, "  -  {}  {}", chunk.source_id, preview(&chunk.text));
                }
            }
        }
        if context.chunks.is_empty() {
            let _ = writeln!(out, "  (no supporting context)");
        }
    }

    let _ = writeln!(out, "\n=== Validation ===");
    let regenerated = if turn.answer.regenerated { " (answer regenerated)" } else { "" };
    let _ = writeln!(out, "{}{regenerated}", turn.answer.validation);

    let _ = writeln!(out, "\n=== Answer ===");
    let _ = writeln!(out, "{}", turn.answer.text);
    out
}
