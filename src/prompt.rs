use std::io::{self, BufRead, Write};

/// Prints the prompt and reads one line at a time.
pub struct ShellPrompt<R, W> {
    prompt: String,
    input: R,
    output: W,
}

impl ShellPrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio(prompt: impl Into<String>) -> Self {
        ShellPrompt::new(prompt, io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ShellPrompt<R, W> {
    pub fn new(prompt: impl Into<String>, input: R, output: W) -> Self {
        ShellPrompt {
            prompt: prompt.into(),
            input,
            output,
        }
    }

    pub fn show_prompt(&mut self) -> io::Result<()> {
        self.output.write_all(self.prompt.as_bytes())?;
        self.output.flush()
    }

    /// Reads one raw line, newline included. `Ok(None)` means end of input.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
    /// failing the read.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        let bytes_read = self.input.read_until(b'\n', &mut buf)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    pub fn output(&self) -> &W {
        &self.output
    }
}
