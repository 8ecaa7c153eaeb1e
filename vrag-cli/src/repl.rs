//! Interactive chat over one session.

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{error, info};
use vrag_core::{RagPipeline, Session};

use crate::render;

const PROMPT: &str = "vrag> ";

/// What the REPL does with one input line.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Skip,
    Quit,
    History,
    Question(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Skip,
        "/quit" | "/exit" | "exit" | "quit" => Input::Quit,
        "/history" => Input::History,
        question => Input::Question(question),
    }
}

pub async fn run(pipeline: &RagPipeline, session: &Session) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("Ask a question, /history to list past turns, /quit to leave.");

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match classify(&line) {
            Input::Skip => continue,
            Input::Quit => break,
            Input::History => {
                for (i, turn) in session.history().await.iter().enumerate() {
                    println!("{}. {} -> {}", i + 1, turn.query, turn.answer.text);
                }
            }
            Input::Question(question) => {
                let _ = editor.add_history_entry(question);
                match pipeline.answer(session, question).await {
                    Ok(turn) => println!("{}", render::turn(&turn, pipeline.config().rerank_top_k)),
                    Err(e) => {
                        error!(session.id = %session.id(), error = %e, "question failed");
                        println!("error: {e}");
                    }
                }
            }
        }
    }

    info!(session.id = %session.id(), turns = session.history().await.len(), "ending session");
    session.end().await;
    Ok(())
}
