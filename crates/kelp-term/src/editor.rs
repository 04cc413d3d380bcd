// SPDX-License-Identifier: MIT
//
// The line editor state machine.
//
// One byte from the stream drives one transition: printable bytes insert
// at the cursor, CR terminates or continues (trailing backslash), Ctrl-C
// resets the whole buffer in place, backspace/DEL and the decoded escape
// actions edit and move. Hex-debug mode short-circuits all of it and
// echoes every byte as hex until CR.
//
// The editor is generic over the byte stream and the output sink so the
// complete machine — buffer, decoder, recall, rendering — runs against
// in-memory buffers in tests. The `Terminal` facade instantiates it over
// stdin/stdout.

use std::io::{self, Read, Write};
use std::sync::Arc;

use crate::ansi;
use crate::error::Error;
use crate::history::History;
use crate::input::{self, Decoder, EscapeAction, Step};
use crate::output::OutputBuffer;

/// Prompt shown for continuation segments (segment index > 0).
pub const CONTINUATION_PROMPT: &str = "> ";

// ─── LineBuffer ─────────────────────────────────────────────────────────────

/// Multi-segment byte buffer for one logical input line.
///
/// Each segment is one physical line of a trailing-backslash continuation.
/// The cursor addresses bytes in the *current* segment only — earlier
/// segments are frozen once continued past.
///
/// Invariants: `current < segments.len()` and
/// `cursor <= segments[current].len()`, always.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    segments: Vec<Vec<u8>>,
    current: usize,
    cursor: usize,
}

impl LineBuffer {
    /// A fresh buffer: one empty segment, cursor at 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            segments: vec![Vec::new()],
            current: 0,
            cursor: 0,
        }
    }

    /// Bytes of the segment the cursor lives in.
    #[must_use]
    pub fn segment(&self) -> &[u8] {
        &self.segments[self.current]
    }

    /// Cursor offset into the current segment, `0..=segment().len()`.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the cursor sits past the last byte of the current segment.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.cursor == self.segments[self.current].len()
    }

    /// Whether this buffer has continued past its first segment.
    #[must_use]
    pub const fn on_continuation(&self) -> bool {
        self.current > 0
    }

    /// Insert a byte at the cursor, shifting the tail right by one; the
    /// cursor advances past it.
    pub fn insert(&mut self, byte: u8) {
        self.segments[self.current].insert(self.cursor, byte);
        self.cursor += 1;
    }

    /// Remove the byte immediately before the cursor. No-op at offset 0.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.segments[self.current].remove(self.cursor);
        true
    }

    /// Remove the byte under the cursor. No-op at end of segment.
    pub fn delete_forward(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.segments[self.current].remove(self.cursor);
        true
    }

    /// Move the cursor left by one. No-op at offset 0.
    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Move the cursor right by one. No-op at end of segment.
    pub fn move_right(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Cursor to the start of the current segment.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Cursor past the last byte of the current segment.
    pub fn move_end(&mut self) {
        self.cursor = self.segments[self.current].len();
    }

    /// Whether Enter should continue instead of terminate: the cursor is
    /// at the end of the segment and the last byte is a backslash. An
    /// empty segment never continues.
    #[must_use]
    pub fn wants_continuation(&self) -> bool {
        self.at_end() && self.segment().last() == Some(&b'\\')
    }

    /// Strip the trailing backslash, open a fresh segment, move into it.
    pub fn continue_line(&mut self) {
        self.segments[self.current].pop();
        self.segments.push(Vec::new());
        self.current += 1;
        self.cursor = 0;
    }

    /// Replace the current segment wholesale (history recall). The cursor
    /// lands past the last byte.
    pub fn replace_segment(&mut self, bytes: &[u8]) {
        self.segments[self.current] = bytes.to_vec();
        self.cursor = bytes.len();
    }

    /// Throw everything away: back to one empty segment, cursor 0.
    pub fn reset(&mut self) {
        self.segments.clear();
        self.segments.push(Vec::new());
        self.current = 0;
        self.cursor = 0;
    }

    /// Append a byte verbatim to the current segment (hex-debug mode
    /// records the raw stream without editing semantics).
    pub fn push_raw(&mut self, byte: u8) {
        self.segments[self.current].push(byte);
        self.cursor += 1;
    }

    /// Join all segments into the final line, stripping one trailing
    /// backslash per segment if present.
    ///
    /// Intermediate segments were already stripped when they continued;
    /// the check here also covers a final segment that still carries a
    /// backslash (Enter away from the segment end terminates rather than
    /// continues, but the backslash was typed as a join marker).
    #[must_use]
    pub fn join(&self) -> Vec<u8> {
        let mut line = Vec::new();
        for segment in &self.segments {
            match segment.split_last() {
                Some((&b'\\', head)) => line.extend_from_slice(head),
                _ => line.extend_from_slice(segment),
            }
        }
        line
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── LineEditor ─────────────────────────────────────────────────────────────

/// The line editor: reads bytes from `input`, applies them to a
/// [`LineBuffer`], and renders through `output`.
///
/// Reads are synchronous and blocking, one byte at a time — the calling
/// thread parks on the descriptor until the user types. The history
/// recall cursor persists across reads; it is parked back on the "fresh
/// line" position (`history.len()`) whenever a line is submitted via
/// [`add_history`](LineEditor::add_history).
pub struct LineEditor<R, W> {
    input: R,
    output: W,
    scratch: OutputBuffer,
    history: Arc<History>,
    recall: usize,
    echo: bool,
    hex_debug: bool,
}

impl<R: Read, W: Write> LineEditor<R, W> {
    /// Create an editor over the given stream and sink, sharing `history`.
    pub fn new(input: R, output: W, history: Arc<History>) -> Self {
        let recall = history.len();
        Self {
            input,
            output,
            scratch: OutputBuffer::new(),
            history,
            recall,
            echo: true,
            hex_debug: false,
        }
    }

    /// Toggle the session-wide hex inspection mode.
    pub fn set_hex_debug(&mut self, on: bool) {
        self.hex_debug = on;
    }

    /// Append to history and park the recall cursor on "fresh line".
    pub fn add_history(&mut self, line: &str) {
        self.history.add(line);
        self.recall = self.history.len();
    }

    /// Read one complete line under `prompt`.
    ///
    /// Continuation segments render under [`CONTINUATION_PROMPT`]; the
    /// returned line is the segments joined with trailing backslashes
    /// stripped.
    ///
    /// # Errors
    ///
    /// [`Error::Read`] on stream failure or EOF mid-line, carrying the
    /// partial content. The line is incomplete — do not dispatch it.
    pub fn read_line(&mut self, prompt: &str) -> Result<String, Error> {
        let mut line = LineBuffer::new();
        match self.read_loop(prompt, &mut line) {
            Ok(()) => Ok(String::from_utf8_lossy(&line.join()).into_owned()),
            Err(source) => Err(Error::Read {
                partial: String::from_utf8_lossy(&line.join()).into_owned(),
                source,
            }),
        }
    }

    /// Same machine as [`read_line`](LineEditor::read_line) with echo
    /// suppressed: redraws print the prompt but never the buffer, so the
    /// typed bytes stay off the terminal.
    ///
    /// # Errors
    ///
    /// [`Error::Read`] on stream failure or EOF mid-line.
    pub fn read_password(&mut self, prompt: &str) -> Result<String, Error> {
        self.echo = false;
        let result = self.read_line(prompt);
        self.echo = true;
        result
    }

    fn read_loop(&mut self, prompt: &str, line: &mut LineBuffer) -> io::Result<()> {
        let mut decoder = Decoder::new();
        self.render(prompt, line)?;

        loop {
            let byte = self.read_byte()?;

            if self.hex_debug {
                line.push_raw(byte);
                write!(self.output, "{byte:02X} ")?;
                if byte == input::CARRIAGE_RETURN {
                    self.output.write_all(ansi::NEWLINE)?;
                    self.output.flush()?;
                    return Ok(());
                }
                self.output.flush()?;
                continue;
            }

            match decoder.feed(byte) {
                Step::Pending | Step::Discard => {}
                Step::Action(action) => self.apply_escape(action, prompt, line)?,
                Step::Literal(input::ETX) => {
                    line.reset();
                    self.output.write_all(ansi::NEWLINE)?;
                    self.render(prompt, line)?;
                }
                Step::Literal(input::CARRIAGE_RETURN) => {
                    if line.wants_continuation() {
                        line.continue_line();
                        self.output.write_all(ansi::NEWLINE)?;
                        self.render(prompt, line)?;
                    } else {
                        self.output.write_all(ansi::NEWLINE)?;
                        self.output.flush()?;
                        return Ok(());
                    }
                }
                Step::Literal(input::BACKSPACE | input::DEL) => {
                    if line.backspace() {
                        self.render(prompt, line)?;
                    }
                }
                Step::Literal(byte) => {
                    line.insert(byte);
                    if self.echo {
                        self.render(prompt, line)?;
                    }
                }
            }
        }
    }

    fn apply_escape(
        &mut self,
        action: EscapeAction,
        prompt: &str,
        line: &mut LineBuffer,
    ) -> io::Result<()> {
        match action {
            EscapeAction::HistoryPrev => {
                if self.recall > 0 {
                    self.recall -= 1;
                }
                let entry = self.history.get(self.recall);
                line.replace_segment(entry.as_bytes());
                self.render(prompt, line)
            }
            EscapeAction::HistoryNext => {
                if self.recall < self.history.len() {
                    self.recall += 1;
                }
                if self.recall == self.history.len() {
                    // Past the newest entry: back to a fresh line.
                    line.replace_segment(b"");
                } else {
                    let entry = self.history.get(self.recall);
                    line.replace_segment(entry.as_bytes());
                }
                self.render(prompt, line)
            }
            EscapeAction::CursorRight => {
                if line.move_right() && self.echo {
                    ansi::cursor_right(&mut self.output, 1)?;
                    self.output.flush()?;
                }
                Ok(())
            }
            EscapeAction::CursorLeft => {
                if line.move_left() && self.echo {
                    ansi::cursor_left(&mut self.output, 1)?;
                    self.output.flush()?;
                }
                Ok(())
            }
            EscapeAction::DeleteForward => {
                if line.delete_forward() {
                    self.render(prompt, line)?;
                }
                Ok(())
            }
            EscapeAction::End => {
                line.move_end();
                self.render(prompt, line)
            }
            EscapeAction::Home => {
                // Reposition just past the prompt, not to column 0.
                line.move_home();
                let prompt_len = self.shown_prompt(prompt, line).len();
                ansi::column_zero(&mut self.output)?;
                ansi::cursor_right(&mut self.output, prompt_len)?;
                self.output.flush()
            }
        }
    }

    fn shown_prompt<'a>(&self, prompt: &'a str, line: &LineBuffer) -> &'a str {
        if line.on_continuation() {
            CONTINUATION_PROMPT
        } else {
            prompt
        }
    }

    /// Redraw the edit line: column 0, erase to end, prompt, segment
    /// bytes, then pull the cursor back if it is not at the end. The
    /// whole redraw is staged and written once.
    ///
    /// With echo off only the prompt is drawn.
    fn render(&mut self, prompt: &str, line: &LineBuffer) -> io::Result<()> {
        let shown = self.shown_prompt(prompt, line);
        self.scratch.clear();
        ansi::column_zero(&mut self.scratch)?;
        ansi::erase_to_eol(&mut self.scratch)?;
        self.scratch.write_all(shown.as_bytes())?;
        if self.echo {
            self.scratch.write_all(line.segment())?;
            ansi::cursor_left(&mut self.scratch, line.segment().len() - line.cursor())?;
        }
        self.scratch.flush_to(&mut self.output)
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.input.read_exact(&mut byte)?;
        Ok(byte[0])
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
