//! Operator-driven evaluation
//!
//! Presents each scenario and waits until the operator answers. There is
//! no timeout: the run waits as long as the operator needs. Answers are read
//! through tokio so the runtime is never blocked on the terminal.

use std::io::{self, Stdout, Write};

use async_trait::async_trait;
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

use crate::common::Result;
use crate::scenario::{Category, Outcome, Scenario};

use super::InteractionSource;

/// Answers accepted as "yes", compared case-insensitively
const AFFIRMATIVE: &[&str] = &["y", "yes", "s", "sim"];

/// Whether an operator answer means "yes"
///
/// Anything unrecognized, including an empty line, is a "no".
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE.contains(&answer.as_str())
}

/// Interaction source that asks a human operator
pub struct ManualSource<R, W> {
    input: R,
    output: W,
}

impl ManualSource<BufReader<Stdin>, Stdout> {
    /// Operator on the process stdin/stdout
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdout())
    }
}

impl<R: AsyncBufRead + Unpin + Send, W: Write + Send> ManualSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask a yes/no question before the run starts
    ///
    /// An empty answer returns `default`; end of input always declines.
    pub async fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        write!(self.output, "{} ", prompt)?;
        self.output.flush()?;

        Ok(match self.read_answer().await? {
            None => false,
            Some(answer) if answer.trim().is_empty() => default,
            Some(answer) => is_affirmative(&answer),
        })
    }

    /// Read one line; `None` on end of input
    ///
    /// Undecodable input counts as an answer that is not "yes".
    async fn read_answer(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        match self.input.read_line(&mut line).await {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line)),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::debug!(error = %e, "Unreadable operator input");
                Ok(Some(String::new()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send, W: Write + Send> InteractionSource for ManualSource<R, W> {
    async fn begin_category(&mut self, category: &Category) -> Result<()> {
        writeln!(self.output, "\n{}", "=".repeat(60))?;
        writeln!(self.output, "{}", category.name.blue().bold())?;
        writeln!(self.output, "{}", "=".repeat(60))?;
        if let Some(instructions) = &category.instructions {
            writeln!(self.output, "{} {}", "→".cyan(), instructions.cyan())?;
        }
        Ok(())
    }

    async fn evaluate(&mut self, scenario: &Scenario) -> Result<Outcome> {
        writeln!(
            self.output,
            "\n{}: {}",
            scenario.id.white().bold(),
            scenario.description
        )?;
        write!(self.output, "   Passed? (y/n): ")?;
        self.output.flush()?;

        Ok(match self.read_answer().await? {
            None => Outcome::Failed("no answer (end of input)".to_string()),
            Some(answer) if is_affirmative(&answer) => Outcome::Passed,
            Some(answer) => Outcome::Failed(format!(
                "operator answered '{}'",
                answer.trim()
            )),
        })
    }

    fn echo_outcomes(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(input: &str) -> ManualSource<Cursor<Vec<u8>>, Vec<u8>> {
        ManualSource::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_affirmative_tokens() {
        for answer in ["y", "Y", "yes", "YES", "s", "sim", "Sim", "  sim \n"] {
            assert!(is_affirmative(answer), "{:?} should be affirmative", answer);
        }
        for answer in ["", "n", "no", "nao", "yep", "maybe", "1"] {
            assert!(!is_affirmative(answer), "{:?} should not be affirmative", answer);
        }
    }

    #[tokio::test]
    async fn test_localized_yes_passes() {
        let mut source = source("Sim\n");
        let outcome = source.evaluate(&Scenario::new("T001", "form")).await.unwrap();
        assert_eq!(outcome, Outcome::Passed);
    }

    #[tokio::test]
    async fn test_no_and_empty_fail() {
        let mut source = source("n\n\n");
        let scenario = Scenario::new("T002", "clean ui");

        let first = source.evaluate(&scenario).await.unwrap();
        let second = source.evaluate(&scenario).await.unwrap();

        assert_eq!(first, Outcome::Failed("operator answered 'n'".into()));
        assert!(!second.is_passed());
    }

    #[tokio::test]
    async fn test_end_of_input_fails_without_error() {
        let mut source = source("");
        let outcome = source.evaluate(&Scenario::new("T003", "x")).await.unwrap();
        assert!(matches!(outcome, Outcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_invalid_utf8_fails_without_error() {
        let mut source = ManualSource::new(Cursor::new(vec![0xff, 0xfe, b'\n']), Vec::new());
        let outcome = source.evaluate(&Scenario::new("T004", "x")).await.unwrap();
        assert!(!outcome.is_passed());
    }

    #[tokio::test]
    async fn test_prompt_shows_scenario_and_instructions() {
        let mut source = source("y\n");
        let category = Category::new("Navigation", vec![]).with_instructions("Log in as ADMIN");
        source.begin_category(&category).await.unwrap();
        source
            .evaluate(&Scenario::new("T015", "Admin sees all 9 navigation items"))
            .await
            .unwrap();

        let (_, output) = source.into_inner();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Navigation"));
        assert!(output.contains("Log in as ADMIN"));
        assert!(output.contains("T015"));
        assert!(output.contains("Admin sees all 9 navigation items"));
    }

    #[tokio::test]
    async fn test_confirm() {
        assert!(source("\n").confirm("Start?", true).await.unwrap());
        assert!(!source("\n").confirm("Start?", false).await.unwrap());
        assert!(source("sim\n").confirm("Start?", false).await.unwrap());
        assert!(!source("n\n").confirm("Start?", true).await.unwrap());
        assert!(!source("").confirm("Start?", true).await.unwrap());
    }

    #[tokio::test]
    async fn test_waiting_for_an_answer_does_not_block_the_runtime() {
        // Operator answers only after another task has had a chance to run
        let (reader, mut writer) = tokio::io::duplex(64);
        let mut source = ManualSource::new(BufReader::new(reader), Vec::new());

        let operator = tokio::spawn(async move {
            tokio::task::yield_now().await;
            tokio::io::AsyncWriteExt::write_all(&mut writer, b"s\n").await.unwrap();
        });

        let outcome = source.evaluate(&Scenario::new("T016", "x")).await.unwrap();
        operator.await.unwrap();
        assert_eq!(outcome, Outcome::Passed);
    }
}
