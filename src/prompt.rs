//! Interactive confirmation before replacing a conflicting target.
use std::io::{self, BufRead, Write};

/// Source of yes/no answers.
#[cfg_attr(test, mockall::automock)]
pub trait Prompt {
    /// Ask `message` and return whether the answer was affirmative.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read, including end of
    /// input.
    fn confirm(&self, message: &str) -> io::Result<bool>;
}

/// Reads answers from standard input.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, message: &str) -> io::Result<bool> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{message} [y/N] ")?;
        stdout.flush()?;
        drop(stdout);
        read_answer(&mut io::stdin().lock())
    }
}

/// Read one line from `input` and interpret it with [`parse_answer`].
///
/// # Errors
///
/// Returns [`io::ErrorKind::UnexpectedEof`] when `input` is exhausted.
pub fn read_answer(input: &mut impl BufRead) -> io::Result<bool> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no answer on standard input",
        ));
    }
    Ok(parse_answer(&line))
}

/// `y` or `yes`, in any case and surrounded by any whitespace.
#[must_use]
pub fn parse_answer(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
