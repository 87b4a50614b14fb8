use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use anyhow::Result;
use async_trait::async_trait;
use client_core::{Key, KioskInput, SpeechInput, SpeechOutput, Utterance};
use tokio::sync::broadcast;
use tracing::debug;

const MILLIS_PER_WORD: u64 = 120;

/// Prints announcements to the terminal in place of a speech synthesiser.
pub struct ConsoleSpeech;

#[async_trait]
impl SpeechOutput for ConsoleSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        println!("[speech] {text}");
        let words = text.split_whitespace().count() as u64;
        tokio::time::sleep(Duration::from_millis(words * MILLIS_PER_WORD)).await;
        Ok(())
    }

    fn speak_now(&self, text: &str) {
        println!("[speech] {text}");
    }

    fn stop(&self) {}
}

/// Typed `say ...` lines stand in for recognised speech.
pub struct TypedMicrophone {
    listening: AtomicBool,
    utterances: broadcast::Sender<Utterance>,
}

impl TypedMicrophone {
    pub fn new() -> Self {
        let (utterances, _) = broadcast::channel(32);
        Self {
            listening: AtomicBool::new(false),
            utterances,
        }
    }

    pub fn hear(&self, transcript: &str) {
        if !self.listening.load(Ordering::SeqCst) {
            println!("(microphone is off)");
            return;
        }
        if self.utterances.send(Utterance::new(transcript, 1.0)).is_err() {
            debug!("no utterance subscribers");
        }
    }
}

impl Default for TypedMicrophone {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechInput for TypedMicrophone {
    fn start(&self) -> bool {
        self.listening.store(true, Ordering::SeqCst);
        println!("(microphone on)");
        true
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            println!("(microphone off)");
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<Utterance> {
        self.utterances.subscribe()
    }
}

/// What one line typed at the kiosk prompt means.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleLine {
    Input(KioskInput),
    Say(String),
    Quit,
    Unknown,
}

pub fn parse_line(line: &str) -> ConsoleLine {
    let line = line.trim();
    if let Some(transcript) = line.strip_prefix("say ") {
        return ConsoleLine::Say(transcript.trim().to_string());
    }
    if let Some(position) = line.strip_prefix("click ") {
        return match position.trim().parse::<usize>() {
            Ok(n) if n > 0 => ConsoleLine::Input(KioskInput::Pointer(n - 1)),
            _ => ConsoleLine::Unknown,
        };
    }

    let key = match line.to_ascii_lowercase().as_str() {
        "quit" | "exit" => return ConsoleLine::Quit,
        "up" => Key::ArrowUp,
        "down" => Key::ArrowDown,
        "left" => Key::ArrowLeft,
        "right" => Key::ArrowRight,
        "" | "enter" => Key::Enter,
        "space" => Key::Space,
        "back" | "backspace" => Key::Backspace,
        "esc" | "escape" => Key::Escape,
        "tab" => Key::Tab,
        "shift-tab" => Key::ShiftTab,
        "home" => Key::Home,
        "end" => Key::End,
        _ => {
            let mut chars = line.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return ConsoleLine::Unknown,
            }
        }
    };
    ConsoleLine::Input(KioskInput::Key(key))
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
