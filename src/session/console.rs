use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::wcsalign_errors::WcsAlignError;

/// Line-oriented operator terminal.
pub trait Console {
    /// Show text to the operator, as is.
    fn say(&mut self, text: &str) -> Result<(), WcsAlignError>;

    /// Show `prompt` and block until the operator enters a line.
    ///
    /// Return
    /// ----------
    /// * The line without its terminator, or [`WcsAlignError::ConsoleClosed`] at end of input.
    fn ask(&mut self, prompt: &str) -> Result<String, WcsAlignError>;
}

impl<C: Console + ?Sized> Console for &mut C {
    fn say(&mut self, text: &str) -> Result<(), WcsAlignError> {
        (**self).say(text)
    }

    fn ask(&mut self, prompt: &str) -> Result<String, WcsAlignError> {
        (**self).ask(prompt)
    }
}

/// [`Console`] over any buffered reader and writer.
#[derive(Debug)]
pub struct LineConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        LineConsole { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl LineConsole<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        LineConsole::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console for LineConsole<R, W> {
    fn say(&mut self, text: &str) -> Result<(), WcsAlignError> {
        writeln!(self.output, "{text}")?;
        self.output.flush()?;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<String, WcsAlignError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(WcsAlignError::ConsoleClosed);
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

#[cfg(test)]
mod test_console {
    use super::*;

    #[test]
    fn test_ask_and_eof() {
        let mut console = LineConsole::new("n\r\nrun\n".as_bytes(), Vec::new());
        assert_eq!(console.ask("Adopt? ").unwrap(), "n");
        assert_eq!(console.ask("   ").unwrap(), "run");
        assert_eq!(console.ask("   ").unwrap_err(), WcsAlignError::ConsoleClosed);

        let out = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(out, "Adopt?       ");
    }
}
