use tracing::{debug, warn};

use crate::{
    command::Command,
    focus::{FocusChange, FocusCursor},
    lexicon::parse_transcript,
};

/// Utterances at or below this confidence are treated as noise.
pub const MIN_UTTERANCE_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Backspace,
    Escape,
    Tab,
    ShiftTab,
    Home,
    End,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachOptions {
    pub auto_focus: bool,
    /// Command produced by Enter/Space on this screen.
    pub activate: Command,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self {
            auto_focus: true,
            activate: Command::SelectFocused,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    pub command: Option<Command>,
    /// The key was a navigation key and its platform default should be
    /// suppressed.
    pub prevent_default: bool,
}

impl KeyOutcome {
    fn navigation(command: Option<Command>) -> Self {
        Self {
            command,
            prevent_default: true,
        }
    }
}

#[derive(Debug)]
struct Attachment {
    cursor: FocusCursor,
    focused: bool,
    options: AttachOptions,
}

/// Turns key presses, utterances and pointer clicks into [`Command`]s and
/// keeps the focus index for the list on screen.
#[derive(Debug, Default)]
pub struct InputRouter {
    attached: Option<Attachment>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, item_count: usize, options: AttachOptions) {
        if self.attached.is_some() {
            warn!(item_count, "input router already attached; ignoring");
            return;
        }
        self.attached = Some(Attachment {
            cursor: FocusCursor::new(item_count),
            focused: options.auto_focus && item_count > 0,
            options,
        });
    }

    pub fn detach(&mut self) {
        self.attached = None;
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    pub fn item_count(&self) -> usize {
        self.attached.as_ref().map_or(0, |a| a.cursor.len())
    }

    /// `None` while detached or before anything has been focused.
    pub fn focus_index(&self) -> Option<usize> {
        self.attached
            .as_ref()
            .filter(|a| a.focused)
            .map(|a| a.cursor.index())
    }

    pub fn on_key(&mut self, key: Key) -> KeyOutcome {
        let Some(attachment) = self.attached.as_ref() else {
            return KeyOutcome::default();
        };
        let activate = attachment.options.activate;
        let item_count = attachment.cursor.len();

        let outcome = match key {
            Key::ArrowDown | Key::ArrowRight | Key::Tab => KeyOutcome::navigation(Some(Command::Next)),
            Key::ArrowUp | Key::ArrowLeft | Key::ShiftTab => {
                KeyOutcome::navigation(Some(Command::Previous))
            }
            Key::Enter | Key::Space => KeyOutcome::navigation(Some(activate)),
            Key::Backspace | Key::Escape => KeyOutcome::navigation(Some(Command::Cancel)),
            Key::Home => KeyOutcome::navigation((item_count > 0).then_some(Command::SelectByNumber(1))),
            Key::End => KeyOutcome::navigation(
                u32::try_from(item_count)
                    .ok()
                    .filter(|n| *n > 0)
                    .map(Command::SelectByNumber),
            ),
            Key::Char(c) => match c.to_ascii_lowercase() {
                '0' => KeyOutcome::navigation(Some(Command::SelectByNumber(10))),
                d @ '1'..='9' => KeyOutcome::navigation(
                    d.to_digit(10).map(Command::SelectByNumber),
                ),
                'h' => KeyOutcome::navigation(Some(Command::Help)),
                'c' => KeyOutcome::navigation(Some(Command::Confirm)),
                _ => KeyOutcome::default(),
            },
        };

        if let Some(command) = outcome.command {
            self.track(command);
        } else {
            debug!(?key, "key ignored");
        }
        outcome
    }

    pub fn on_utterance(&mut self, transcript: &str, confidence: f32) -> Option<Command> {
        if self.attached.is_none() {
            return None;
        }
        if confidence.is_nan() || confidence <= MIN_UTTERANCE_CONFIDENCE {
            debug!(confidence, "low-confidence utterance dropped");
            return None;
        }
        let command = parse_transcript(transcript);
        match command {
            Some(command) => self.track(command),
            None => debug!(transcript, "utterance did not match any command"),
        }
        command
    }

    /// Click or touch on item `index`. A click on the focused item activates
    /// it; any other click moves focus there.
    pub fn on_pointer(&mut self, index: usize) -> Option<Command> {
        let attachment = self.attached.as_ref()?;
        if index >= attachment.cursor.len() {
            debug!(index, "pointer outside list dropped");
            return None;
        }
        let command = if attachment.focused && attachment.cursor.index() == index {
            attachment.options.activate
        } else {
            Command::SelectByNumber(u32::try_from(index + 1).ok()?)
        };
        self.track(command);
        Some(command)
    }

    pub fn next(&mut self) -> Option<FocusChange> {
        let attachment = self.attached.as_mut()?;
        if !attachment.focused {
            // First navigation only reveals the focus ring.
            attachment.focused = !attachment.cursor.is_empty();
            return None;
        }
        attachment.cursor.next()
    }

    pub fn previous(&mut self) -> Option<FocusChange> {
        let attachment = self.attached.as_mut()?;
        if !attachment.focused {
            // First navigation only reveals the focus ring.
            attachment.focused = !attachment.cursor.is_empty();
            return None;
        }
        attachment.cursor.previous()
    }

    pub fn set_focus(&mut self, index: usize) {
        let Some(attachment) = self.attached.as_mut() else {
            warn!(index, "set_focus while detached");
            return;
        };
        if index >= attachment.cursor.len() {
            warn!(index, item_count = attachment.cursor.len(), "focus index out of bounds");
            return;
        }
        attachment.cursor.set(index);
        attachment.focused = true;
    }

    fn track(&mut self, command: Command) {
        match command {
            Command::Next => {
                self.next();
            }
            Command::Previous => {
                self.previous();
            }
            Command::SelectByNumber(number) => {
                if let Some(attachment) = self.attached.as_mut() {
                    if attachment.cursor.select_number(number).is_some() {
                        attachment.focused = true;
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "tests/input_router_tests.rs"]
mod tests;
