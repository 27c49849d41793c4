//! Terminal confirmations and notifications.

use std::io::{self, BufRead, Write};

use toby_core::{Confirmation, Interaction};

/// Asks on stderr and reads the answer from stdin
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Interaction for TerminalPrompt {
    fn confirm(&self, prompt: &Confirmation<'_>) -> bool {
        let mut stderr = io::stderr().lock();
        if write!(stderr, "{} [y/N] ", prompt.message()).is_err() || stderr.flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }

    fn notify(&self, message: &str) {
        eprintln!("{}", message);
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("y\n", true)]
    #[case(" YES ", true)]
    #[case("\n", false)]
    #[case("no", false)]
    #[case("yeah", false)]
    fn test_is_yes(#[case] answer: &str, #[case] expected: bool) {
        assert_eq!(is_yes(answer), expected);
    }
}
