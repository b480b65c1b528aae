//! The line-oriented conversation loop.
//!
//! Each turn walks the state machine
//!
//!   AwaitingInput → Extracting → Routing → AwaitingInput
//!
//! until an exit token (or end of input) moves it to `Closed`. Exit tokens
//! are recognized before any extraction, so quitting never costs a model
//! call. An extraction failure is not terminal: the vertical still routes it
//! (normally to a clarification) and the loop carries on.
//!
//! The loop is generic over `BufRead`/`Write` so the binary drives it with
//! stdin/stdout and tests drive it with in-memory buffers.

use std::io::{self, BufRead, Write};

use tracing::{debug, trace};

/// Case-insensitive tokens that end a session.
pub const EXIT_TOKENS: [&str; 3] = ["exit", "quit", "bye"];

/// True if `input` (after trimming) is one of `EXIT_TOKENS`.
pub fn is_exit_token(input: &str) -> bool {
    let input = input.trim();
    EXIT_TOKENS.iter().any(|token| input.eq_ignore_ascii_case(token))
}

/// How one logical input is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// One line per turn.
    SingleLine,
    /// Lines up to the next blank line, joined with `\n`.
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    AwaitingInput,
    Extracting,
    Routing,
    Closed,
}

/// A vertical's answer to one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub text: String,
    /// A menu to show after the reply. The next line read is handed to
    /// `Vertical::follow_up`.
    pub follow_up: Option<String>,
}

impl TurnReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            follow_up: None,
        }
    }

    pub fn with_follow_up(mut self, menu: impl Into<String>) -> Self {
        self.follow_up = Some(menu.into());
        self
    }
}

/// What to do with the answer to a follow-up menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUpOutcome {
    /// Print the text, then wait for the next turn.
    Reply(String),
    /// Wait for the next turn.
    Continue,
    /// End the session.
    Close,
}

/// One conversational domain (support desk, medical scribe, ...).
pub trait Vertical {
    /// Whatever `extract` produces, typically `Result<T, ExtractionError>`.
    type Extraction;

    /// Printed once when the session starts.
    fn welcome(&self) -> String;

    /// Printed when the user enters an exit token.
    fn farewell(&self) -> String;

    /// Printed before each turn is read, without a trailing newline.
    fn input_prompt(&self) -> String;

    fn input_mode(&self) -> InputMode;

    /// The `Extracting` step: turn user text into a structured value.
    fn extract(&self, input: &str) -> Self::Extraction;

    /// The `Routing` step: act on the extraction and phrase the reply.
    fn respond(&self, extraction: Self::Extraction) -> TurnReply;

    /// Handle the line typed after a follow-up menu.
    fn follow_up(&self, _choice: &str) -> FollowUpOutcome {
        FollowUpOutcome::Continue
    }
}

/// Read one line, decoding invalid UTF-8 lossily. `None` at end of input.
fn read_line_lossy<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Read one logical input. Returns `None` at end of input.
///
/// Bytes that are not valid UTF-8 become U+FFFD instead of failing the read.
pub fn read_turn<R: BufRead>(reader: &mut R, mode: InputMode) -> io::Result<Option<String>> {
    match mode {
        InputMode::SingleLine => Ok(read_line_lossy(reader)?.map(|line| line.trim().to_string())),
        InputMode::Block => {
            let mut lines: Vec<String> = Vec::new();
            loop {
                let Some(line) = read_line_lossy(reader)? else {
                    if lines.is_empty() {
                        return Ok(None);
                    }
                    break;
                };
                if line.trim().is_empty() {
                    break;
                }
                lines.push(line.trim_end_matches(['\r', '\n']).to_string());
            }
            Ok(Some(lines.join("\n").trim().to_string()))
        }
    }
}

/// A single interactive session over one vertical.
pub struct Conversation<V, R, W> {
    vertical: V,
    input: R,
    output: W,
    state: ConversationState,
}

impl<V, R, W> Conversation<V, R, W>
where
    V: Vertical,
    R: BufRead,
    W: Write,
{
    pub fn new(vertical: V, input: R, output: W) -> Self {
        Self {
            vertical,
            input,
            output,
            state: ConversationState::AwaitingInput,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Give back the output sink, e.g. to inspect a test buffer.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run turns until the session closes.
    ///
    /// Only I/O errors on the input or output streams end the loop early.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", self.vertical.welcome())?;

        while self.state != ConversationState::Closed {
            self.transition(ConversationState::AwaitingInput);
            write!(self.output, "{}", self.vertical.input_prompt())?;
            self.output.flush()?;

            let Some(text) = read_turn(&mut self.input, self.vertical.input_mode())? else {
                debug!("end of input; closing session");
                self.transition(ConversationState::Closed);
                break;
            };

            if text.is_empty() {
                continue;
            }

            if is_exit_token(&text) {
                writeln!(self.output, "{}", self.vertical.farewell())?;
                self.transition(ConversationState::Closed);
                break;
            }

            self.transition(ConversationState::Extracting);
            let extraction = self.vertical.extract(&text);

            self.transition(ConversationState::Routing);
            let reply = self.vertical.respond(extraction);

            writeln!(self.output, "\n{}\n", reply.text)?;

            if let Some(menu) = reply.follow_up {
                self.handle_follow_up(&menu)?;
            }
        }

        self.output.flush()
    }

    fn handle_follow_up(&mut self, menu: &str) -> io::Result<()> {
        writeln!(self.output, "{menu}")?;
        write!(self.output, "> ")?;
        self.output.flush()?;

        let Some(choice) = read_turn(&mut self.input, InputMode::SingleLine)? else {
            self.transition(ConversationState::Closed);
            return Ok(());
        };

        match self.vertical.follow_up(&choice) {
            FollowUpOutcome::Reply(text) => writeln!(self.output, "{text}")?,
            FollowUpOutcome::Continue => {}
            FollowUpOutcome::Close => {
                writeln!(self.output, "{}", self.vertical.farewell())?;
                self.transition(ConversationState::Closed);
            }
        }
        Ok(())
    }

    fn transition(&mut self, next: ConversationState) {
        trace!(from = ?self.state, to = ?next, "conversation transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Echoes input back and counts extractions.
    struct EchoVertical {
        mode: InputMode,
        extracted: Arc<Mutex<Vec<String>>>,
        menu: Option<&'static str>,
    }

    impl EchoVertical {
        fn new(mode: InputMode) -> Self {
            Self {
                mode,
                extracted: Arc::new(Mutex::new(vec![])),
                menu: None,
            }
        }
    }

    impl Vertical for EchoVertical {
        type Extraction = String;

        fn welcome(&self) -> String {
            "welcome".to_string()
        }

        fn farewell(&self) -> String {
            "goodbye".to_string()
        }

        fn input_prompt(&self) -> String {
            "> ".to_string()
        }

        fn input_mode(&self) -> InputMode {
            self.mode
        }

        fn extract(&self, input: &str) -> String {
            self.extracted.lock().unwrap().push(input.to_string());
            input.to_uppercase()
        }

        fn respond(&self, extraction: String) -> TurnReply {
            let reply = TurnReply::text(format!("echo: {extraction}"));
            match self.menu {
                Some(menu) => reply.with_follow_up(menu),
                None => reply,
            }
        }

        fn follow_up(&self, choice: &str) -> FollowUpOutcome {
            match choice.to_lowercase().as_str() {
                "l" => FollowUpOutcome::Reply("listing".to_string()),
                "e" | "exit" => FollowUpOutcome::Close,
                _ => FollowUpOutcome::Continue,
            }
        }
    }

    fn run(vertical: EchoVertical, input: &str) -> (String, ConversationState) {
        let mut conversation = Conversation::new(vertical, Cursor::new(input.to_string()), Vec::new());
        conversation.run().unwrap();
        let state = conversation.state();
        (String::from_utf8(conversation.into_output()).unwrap(), state)
    }

    #[test]
    fn test_exit_tokens_are_case_insensitive() {
        for token in ["exit", "QUIT", "Bye", "  exit  "] {
            assert!(is_exit_token(token), "{token:?} should exit");
        }
        assert!(!is_exit_token("exiting"));
        assert!(!is_exit_token("goodbye"));
    }

    #[test]
    fn test_exit_token_closes_before_extraction() {
        let vertical = EchoVertical::new(InputMode::SingleLine);
        let extracted = vertical.extracted.clone();

        let (output, state) = run(vertical, "hello\nQuit\nnever read\n");

        assert_eq!(state, ConversationState::Closed);
        assert_eq!(*extracted.lock().unwrap(), vec!["hello".to_string()]);
        assert!(output.contains("echo: HELLO"));
        assert!(output.trim_end().ends_with("goodbye"));
    }

    #[test]
    fn test_end_of_input_closes_session() {
        let vertical = EchoVertical::new(InputMode::SingleLine);
        let (output, state) = run(vertical, "one\ntwo");

        assert_eq!(state, ConversationState::Closed);
        assert!(output.contains("echo: ONE"));
        assert!(output.contains("echo: TWO"));
        assert!(!output.contains("goodbye"));
    }

    #[test]
    fn test_empty_lines_are_skipped() {
        let vertical = EchoVertical::new(InputMode::SingleLine);
        let extracted = vertical.extracted.clone();

        run(vertical, "\n   \nhi\nexit\n");

        assert_eq!(*extracted.lock().unwrap(), vec!["hi".to_string()]);
    }

    #[test]
    fn test_block_mode_joins_lines_until_blank() {
        let vertical = EchoVertical::new(InputMode::Block);
        let extracted = vertical.extracted.clone();

        run(vertical, "Dr: How old are you?\nPatient: 62.\n\nexit\n\n");

        assert_eq!(
            *extracted.lock().unwrap(),
            vec!["Dr: How old are you?\nPatient: 62.".to_string()]
        );
    }

    #[test]
    fn test_read_turn_block_returns_partial_block_at_eof() {
        let mut input = Cursor::new("line one\nline two".to_string());
        let first = read_turn(&mut input, InputMode::Block).unwrap();
        let second = read_turn(&mut input, InputMode::Block).unwrap();

        assert_eq!(first.as_deref(), Some("line one\nline two"));
        assert_eq!(second, None);
    }

    #[test]
    fn test_invalid_utf8_line_does_not_end_session() {
        let vertical = EchoVertical::new(InputMode::SingleLine);
        let extracted = vertical.extracted.clone();

        let mut conversation = Conversation::new(
            vertical,
            Cursor::new(b"caf\xe9\nhello\nexit\n".to_vec()),
            Vec::new(),
        );
        conversation.run().unwrap();

        assert_eq!(conversation.state(), ConversationState::Closed);
        assert_eq!(
            *extracted.lock().unwrap(),
            vec!["caf\u{FFFD}".to_string(), "hello".to_string()]
        );
        let output = String::from_utf8(conversation.into_output()).unwrap();
        assert!(output.trim_end().ends_with("goodbye"));
    }

    #[test]
    fn test_block_mode_tolerates_invalid_utf8() {
        let mut input = Cursor::new(b"Patient: ol\xe1\nDr: ok\n\n".to_vec());
        let block = read_turn(&mut input, InputMode::Block).unwrap();
        assert_eq!(block.as_deref(), Some("Patient: ol\u{FFFD}\nDr: ok"));
    }

    #[test]
    fn test_follow_up_reply_then_close() {
        let mut vertical = EchoVertical::new(InputMode::SingleLine);
        vertical.menu = Some("Actions: [L]ist, [C]ontinue, [E]xit");
        let extracted = vertical.extracted.clone();

        let (output, state) = run(vertical, "first\nl\nsecond\ne\nnever\n");

        assert_eq!(state, ConversationState::Closed);
        assert!(output.contains("listing"));
        assert_eq!(
            *extracted.lock().unwrap(),
            vec!["first".to_string(), "second".to_string()]
        );
        assert!(output.trim_end().ends_with("goodbye"));
    }
}
