//! Interactive console driver

use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::config::is_exit_keyword;
use crate::error::{ContentGenError, Result};
use crate::generator::ContentGenerator;
use crate::output::ContentFileWriter;

pub const TOPIC_PROMPT: &str = "Enter a topic for content generation (or 'quit' to exit): ";

/// How an interactive session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user typed an exit keyword
    Quit,
    /// Standard input was closed
    EndOfInput,
    /// The interrupt future resolved (Ctrl+C)
    Interrupted,
}

/// Counters reported when the session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub attempts: usize,
    pub stored: usize,
    pub end: SessionEnd,
}

enum Step {
    Continue,
    Finished(SessionEnd),
}

/// Read-loop over topics: generate, display, store, then copy to a file
pub struct InteractiveSession {
    generator: ContentGenerator,
    /// `None` disables the local file copy
    file_writer: Option<ContentFileWriter>,
    attempts: usize,
    stored: usize,
}

impl InteractiveSession {
    pub fn new(generator: ContentGenerator, file_writer: Option<ContentFileWriter>) -> Self {
        Self {
            generator,
            file_writer,
            attempts: 0,
            stored: 0,
        }
    }

    /// Run until an exit keyword, end of input, or `interrupt` resolves
    ///
    /// Failures inside one iteration are reported and the loop keeps going.
    /// Only console I/O errors end the session with `Err`.
    pub async fn run<R, W, F>(&mut self, input: R, mut out: W, interrupt: F) -> Result<SessionSummary>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        F: Future<Output = ()>,
    {
        let mut lines = input.lines();
        tokio::pin!(interrupt);

        loop {
            write!(out, "{}", TOPIC_PROMPT)?;
            out.flush()?;

            let step = tokio::select! {
                biased;
                _ = &mut interrupt => None,
                step = self.step(&mut lines, &mut out) => Some(step),
            };

            match step {
                None => {
                    writeln!(out, "\nOperation cancelled by user.")?;
                    return Ok(self.summary(SessionEnd::Interrupted));
                }
                Some(step) => match step? {
                    Step::Continue => continue,
                    Step::Finished(end) => return Ok(self.summary(end)),
                },
            }
        }
    }

    async fn step<R, W>(&mut self, lines: &mut tokio::io::Lines<R>, out: &mut W) -> Result<Step>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            writeln!(out, "Exiting content generator.")?;
            return Ok(Step::Finished(SessionEnd::EndOfInput));
        };

        let topic = line.trim();

        if is_exit_keyword(topic) {
            writeln!(out, "Exiting content generator.")?;
            return Ok(Step::Finished(SessionEnd::Quit));
        }

        if topic.is_empty() {
            writeln!(out, "Topic cannot be empty. Please try again.")?;
            return Ok(Step::Continue);
        }

        self.process_topic(topic, out).await?;
        Ok(Step::Continue)
    }

    /// One generate/store/write iteration; only console errors escape
    async fn process_topic<W: Write>(&mut self, topic: &str, out: &mut W) -> Result<()> {
        let request = match self.generator.request(topic) {
            Ok(request) => request,
            Err(e) => {
                writeln!(out, "{}", e)?;
                return Ok(());
            }
        };

        self.attempts += 1;
        debug!("Generating content for '{}'", request.topic());

        let content = match self.generator.generate(&request).await {
            Ok(content) => content,
            Err(e) => {
                debug!("Generation failed: {}", e);
                writeln!(out, "Failed to generate content. Please try a different topic.")?;
                return Ok(());
            }
        };

        writeln!(out, "\n--- Generated Content ---")?;
        writeln!(out, "{}", content)?;

        let id = match self.generator.save(request.topic(), &content).await {
            Ok(id) => id,
            Err(e) => {
                writeln!(out, "Content was not saved: {}", e)?;
                return Ok(());
            }
        };
        self.stored += 1;

        let Some(writer) = &self.file_writer else {
            return Ok(());
        };

        match writer.write(&id, &content).await {
            Ok(path) => writeln!(out, "Content also saved to {}", path.display())?,
            Err(ContentGenError::Io(e)) => {
                warn!("Failed to write content file for {}: {}", id, e);
                writeln!(
                    out,
                    "Could not write {}: {}",
                    writer.path_for(&id).display(),
                    e
                )?;
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    fn summary(&self, end: SessionEnd) -> SessionSummary {
        SessionSummary {
            attempts: self.attempts,
            stored: self.stored,
            end,
        }
    }
}
