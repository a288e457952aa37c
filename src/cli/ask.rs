//! CLI `ask`, `explain`, `quiz`, and `illustrate` commands.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;

use gabu_tutor::adaptive::types::Difficulty;
use gabu_tutor::app::{InputFile, TutorApp};
use gabu_tutor::config::TutorConfig;

/// Ask one question, or chat line by line from stdin when `question` is empty.
pub async fn ask(config: TutorConfig, question: &str, bookmark: bool) -> Result<()> {
    let app = super::open_app(config)?;

    if !question.trim().is_empty() {
        answer_and_report(&app, app.quick_ask(question).await, bookmark);
        finish(&app)?;
        return Ok(());
    }

    println!("Ask Gabu anything. An empty line ends the chat.");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }
        answer_and_report(&app, app.quick_ask(&line).await, bookmark);
        // leave ERROR so the next line can be asked; no-op after a good answer
        let _ = app.try_again();
    }
    finish(&app)
}

/// Explain a photo or a recorded question.
pub async fn explain(config: TutorConfig, file: &Path, bookmark: bool) -> Result<()> {
    let input = InputFile::read(file)?;
    let app = super::open_app(config)?;
    answer_and_report(&app, app.upload_file(input).await, bookmark);
    finish(&app)
}

pub async fn quiz(config: TutorConfig, topic: &str, count: usize, difficulty: Difficulty) -> Result<()> {
    let app = super::open_app(config)?;
    let attempt = app.generate_quiz(topic, count).await?;

    let stdin = std::io::stdin();
    let mut answers = Vec::with_capacity(attempt.quiz.questions.len());
    for (i, q) in attempt.quiz.questions.iter().enumerate() {
        println!("\n{}. {}", i + 1, q.question);
        for (j, option) in q.options.iter().enumerate() {
            println!("   {}) {}", letter(j), option);
        }
        answers.push(read_choice(&mut stdin.lock(), q.options.len())?);
    }

    let result = app.submit_quiz(&attempt, &answers, difficulty)?;

    println!();
    for (q, given) in attempt.quiz.questions.iter().zip(&answers) {
        let mark = if *given == q.correct_answer_index { "correct" } else { "wrong" };
        println!("{} ({mark}, answer {})", q.question, letter(q.correct_answer_index));
        if !q.explanation.is_empty() {
            println!("   {}", q.explanation);
        }
    }
    println!("\nScore: {}/{} ({:.0}%)", result.correct, result.total, result.score);
    finish(&app)
}

pub async fn illustrate(
    config: TutorConfig,
    description: &str,
    out: Option<&Path>,
    bookmark: bool,
) -> Result<()> {
    let app = super::open_app(config)?;
    let illustration = app.illustrate(description).await?;

    if illustration.is_placeholder {
        eprintln!("Diagram generation was unavailable; saved a text placeholder instead.");
    }
    let ext = match illustration.mime_type.as_str() {
        "image/svg+xml" => "svg",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    };
    let path = out
        .map(|p| p.with_extension(ext))
        .unwrap_or_else(|| Path::new("diagram").with_extension(ext));
    let bytes = illustration.bytes().context("image data was not valid base64")?;
    std::fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Diagram written to {}", path.display());

    if !illustration.labels.is_empty() {
        println!("Labels: {}", illustration.labels.join(", "));
    }
    if bookmark {
        let saved = app.bookmark_illustration(&illustration)?;
        println!("Bookmarked as {}", saved.id);
    }
    Ok(())
}

fn answer_and_report(app: &TutorApp, result: Result<String, gabu_tutor::error::TutorError>, bookmark: bool) {
    match result {
        Ok(answer) => {
            println!("\n{answer}\n");
            if bookmark {
                let last = app.chat_history().len().saturating_sub(1);
                match app.bookmark_message(last) {
                    Ok(saved) => println!("Bookmarked \"{}\"", saved.title),
                    Err(e) => eprintln!("Could not bookmark: {e}"),
                }
            }
        }
        Err(e) => eprintln!("{e}"),
    }
}

/// Close the study session opened by this run.
fn finish(app: &TutorApp) -> Result<()> {
    if let Some(session) = app.go_home()? {
        tracing::debug!(minutes = session.total_time, "session closed");
    }
    Ok(())
}

fn letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

fn read_choice(input: &mut impl BufRead, options: usize) -> Result<usize> {
    loop {
        print!("   Your answer: ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            anyhow::bail!("quiz cancelled");
        }
        let choice = line.trim().to_ascii_uppercase();
        if let Some(c) = choice.chars().next().filter(|_| choice.len() == 1) {
            let idx = (c as u8).wrapping_sub(b'A') as usize;
            if idx < options {
                return Ok(idx);
            }
        }
        println!("   Please answer with a letter from A to {}.", letter(options - 1));
    }
}
