//! Line-oriented terminal input shared by the control loop and the picker

use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Serialises reads from one input stream between several consumers
pub struct Console<R> {
    lines: Mutex<Lines<R>>,
    echo_prompts: bool,
}

impl Console<BufReader<Stdin>> {
    /// Console reading from the process's stdin
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> Console<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
            echo_prompts: true,
        }
    }

    /// Do not print prompts (scripted input)
    pub fn quiet(mut self) -> Self {
        self.echo_prompts = false;
        self
    }

    /// Print `prompt` and read one trimmed line; `None` at end of input
    pub async fn read_line(&self, prompt: &str) -> std::io::Result<Option<String>> {
        let mut lines = self.lines.lock().await;

        if self.echo_prompts && !prompt.is_empty() {
            let mut stdout = std::io::stdout();
            write!(stdout, "{prompt}")?;
            stdout.flush()?;
        }

        Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
    }
}
