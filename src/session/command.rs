/// Default input that ends the interactive session.
pub const QUIT_COMMAND: &str = "q";

/// Lifecycle of the interactive loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Reading,
    Terminated,
}

/// What one line of operator input asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Quit,
    /// Nothing but whitespace.
    Empty,
    /// Trimmed text to analyze.
    Analyze(&'a str),
}

impl<'a> Command<'a> {
    /// Classifies a raw input line. Surrounding whitespace is ignored and
    /// `quit` matches case-insensitively.
    pub fn parse(line: &'a str, quit: &str) -> Command<'a> {
        let text = line.trim();
        if text.eq_ignore_ascii_case(quit) {
            Command::Quit
        } else if text.is_empty() {
            Command::Empty
        } else {
            Command::Analyze(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_is_case_insensitive() {
        assert_eq!(Command::parse("q", QUIT_COMMAND), Command::Quit);
        assert_eq!(Command::parse("Q\n", QUIT_COMMAND), Command::Quit);
        assert_eq!(Command::parse("  q  ", QUIT_COMMAND), Command::Quit);
    }

    #[test]
    fn whitespace_is_empty() {
        assert_eq!(Command::parse("", QUIT_COMMAND), Command::Empty);
        assert_eq!(Command::parse(" \t\r\n", QUIT_COMMAND), Command::Empty);
    }

    #[test]
    fn text_is_trimmed() {
        assert_eq!(
            Command::parse("  what a day \n", QUIT_COMMAND),
            Command::Analyze("what a day")
        );
        assert_eq!(Command::parse("quit", QUIT_COMMAND), Command::Analyze("quit"));
    }

    #[test]
    fn custom_quit_word() {
        assert_eq!(Command::parse("EXIT", "exit"), Command::Quit);
        assert_eq!(Command::parse("q", "exit"), Command::Analyze("q"));
    }
}
