use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

/// Line-oriented operator prompts over any reader/writer pair
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `label`, read one line, return it trimmed. EOF is an error.
    pub fn ask(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        let mut input = String::new();
        let read = self
            .input
            .read_line(&mut input)
            .context("Failed to read operator input")?;
        if read == 0 {
            anyhow::bail!("Input closed while waiting for: {}", label);
        }
        Ok(input.trim().to_string())
    }

    /// Like `ask`, but empty input yields `default`
    pub fn ask_or(&mut self, label: &str, default: &str) -> Result<String> {
        let answer = self.ask(&format!("{} (default: {})", label, default))?;
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }

    /// Like `ask`, but re-prompts until the answer is non-empty
    pub fn ask_required(&mut self, label: &str) -> Result<String> {
        loop {
            let answer = self.ask(label)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            writeln!(self.output, "A value is required.")?;
        }
    }

    /// `[y/N]` question; only `y`/`yes` count as yes
    pub fn confirm(&mut self, label: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [y/N]", label))?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }
}
