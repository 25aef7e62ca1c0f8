//! Line-oriented prompts for the interactive menus
//!
//! Generic over the reader and writer so menus can be driven from tests.

use std::io::{self, BufRead, Write};

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writer for menu text
    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    /// Print `question` and read one trimmed line; `None` once input is exhausted
    pub fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// True when the answer equals `expected`, ignoring case
    pub fn confirm(&mut self, question: &str, expected: &str) -> io::Result<bool> {
        Ok(self
            .ask(question)?
            .is_some_and(|answer| answer.eq_ignore_ascii_case(expected)))
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_ask_trims_and_reports_eof() {
        let mut prompt = Prompt::new(Cursor::new("  hello \n"), Vec::new());
        assert_eq!(prompt.ask("> ").unwrap().as_deref(), Some("hello"));
        assert_eq!(prompt.ask("> ").unwrap(), None);
        let output = String::from_utf8(prompt.into_output()).unwrap();
        assert_eq!(output, "> > \n");
    }

    #[test]
    fn test_confirm() {
        let mut prompt = Prompt::new(Cursor::new("YES\nno\n"), Vec::new());
        assert!(prompt.confirm("? ", "yes").unwrap());
        assert!(!prompt.confirm("? ", "yes").unwrap());
        assert!(!prompt.confirm("? ", "yes").unwrap());
    }
}
