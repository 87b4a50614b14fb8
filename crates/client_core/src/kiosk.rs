use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use shared::domain::{Candidate, CandidateId};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tracing::{debug, info, warn};

use crate::{
    command::Command,
    input_router::{AttachOptions, InputRouter, Key},
    session::{Effect, Screen, SessionStateMachine, Trigger},
    speech::{SpeechInput, SpeechOutput, Utterance},
    station_client::VoteSink,
};

const INPUT_QUEUE_DEPTH: usize = 64;

/// Raw input delivered to the kiosk loop.
#[derive(Debug, Clone, PartialEq)]
pub enum KioskInput {
    Key(Key),
    Pointer(usize),
    Utterance(Utterance),
    Trigger(Trigger),
    VoteSettled {
        ticket: u64,
        candidate_id: CandidateId,
        accepted: bool,
    },
    Shutdown,
}

/// Observable progress of the kiosk, for displays and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KioskEvent {
    ScreenChanged(Screen),
    FocusChanged { index: usize },
    CountdownTick { remaining: u32 },
    VoteAcknowledged(CandidateId),
    VoteFailed(CandidateId),
}

/// Cloneable entry point for feeding input into a running kiosk.
#[derive(Clone)]
pub struct KioskHandle {
    inputs: mpsc::Sender<KioskInput>,
    events: broadcast::Sender<KioskEvent>,
}

impl KioskHandle {
    pub async fn send(&self, input: KioskInput) -> Result<()> {
        self.inputs
            .send(input)
            .await
            .map_err(|_| anyhow!("kiosk loop has stopped"))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<KioskEvent> {
        self.events.subscribe()
    }
}

/// Single-threaded interaction loop. Every input, whichever channel it came
/// from, is processed in arrival order.
pub struct Kiosk {
    router: InputRouter,
    machine: SessionStateMachine,
    output: Arc<dyn SpeechOutput>,
    input: Arc<dyn SpeechInput>,
    sink: Arc<dyn VoteSink>,
    inputs_tx: mpsc::Sender<KioskInput>,
    inputs_rx: mpsc::Receiver<KioskInput>,
    events: broadcast::Sender<KioskEvent>,
    pending_speech: Vec<JoinHandle<()>>,
    countdown: Option<JoinHandle<()>>,
    background: Vec<JoinHandle<()>>,
}

impl Kiosk {
    pub fn new(
        candidates: Vec<Candidate>,
        output: Arc<dyn SpeechOutput>,
        input: Arc<dyn SpeechInput>,
        sink: Arc<dyn VoteSink>,
    ) -> Self {
        let (inputs_tx, inputs_rx) = mpsc::channel(INPUT_QUEUE_DEPTH);
        let (events, _) = broadcast::channel(256);
        Self {
            router: InputRouter::new(),
            machine: SessionStateMachine::new(candidates),
            output,
            input,
            sink,
            inputs_tx,
            inputs_rx,
            events,
            pending_speech: Vec::new(),
            countdown: None,
            background: Vec::new(),
        }
    }

    pub fn handle(&self) -> KioskHandle {
        KioskHandle {
            inputs: self.inputs_tx.clone(),
            events: self.events.clone(),
        }
    }

    /// Runs until [`KioskInput::Shutdown`] arrives.
    pub async fn run(mut self) -> Result<()> {
        self.forward_utterances();
        let effects = self.machine.enter();
        self.apply_effects(effects);
        info!("kiosk ready");

        while let Some(input) = self.inputs_rx.recv().await {
            match input {
                KioskInput::Shutdown => break,
                KioskInput::Key(key) => {
                    if let Some(command) = self.router.on_key(key).command {
                        self.dispatch(command.into());
                    }
                }
                KioskInput::Pointer(index) => {
                    if let Some(command) = self.router.on_pointer(index) {
                        self.dispatch(command.into());
                    }
                }
                KioskInput::Utterance(utterance) => {
                    let command = self
                        .router
                        .on_utterance(&utterance.transcript, utterance.confidence);
                    if let Some(command) = command {
                        self.dispatch(command.into());
                    }
                }
                KioskInput::Trigger(trigger) => self.dispatch(trigger),
                KioskInput::VoteSettled {
                    ticket,
                    candidate_id,
                    accepted,
                } => self.on_vote_settled(ticket, candidate_id, accepted),
            }
        }

        self.shutdown();
        Ok(())
    }

    fn dispatch(&mut self, trigger: Trigger) {
        let focus_before = self.machine.focus_index();
        let screen_before = self.machine.screen();
        let effects = self.machine.handle(trigger);
        self.apply_effects(effects);

        let focus = self.machine.focus_index();
        if self.machine.list_len() > 0 && self.router.focus_index() != Some(focus) {
            self.router.set_focus(focus);
        }
        if screen_before == self.machine.screen() && focus_before != focus {
            let _ = self.events.send(KioskEvent::FocusChanged { index: focus });
        }
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ScreenChanged(screen) => self.enter_screen(screen),
                Effect::Announce(text) => {
                    self.cancel_pending_speech();
                    self.output.speak_now(&text);
                }
                Effect::AnnounceSequence(texts) => {
                    self.cancel_pending_speech();
                    self.output.stop();
                    let output = Arc::clone(&self.output);
                    self.pending_speech.push(tokio::spawn(async move {
                        for text in texts {
                            if let Err(error) = output.speak(&text).await {
                                warn!(%error, "speech playback failed");
                                break;
                            }
                        }
                    }));
                }
                Effect::AnnounceAfter { delay, text } => {
                    let output = Arc::clone(&self.output);
                    self.pending_speech.push(tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        output.speak_now(&text);
                    }));
                }
                Effect::StartCountdown { ticket, seconds } => self.start_countdown(ticket, seconds),
                Effect::StartListening => {
                    if !self.input.start() {
                        warn!("speech recognition unavailable; continuing with keys only");
                    }
                }
                Effect::StopListening => self.input.stop(),
                Effect::SubmitVote {
                    ticket,
                    candidate_id,
                } => self.submit_vote(ticket, candidate_id),
            }
        }
    }

    fn enter_screen(&mut self, screen: Screen) {
        self.cancel_pending_speech();
        if let Some(countdown) = self.countdown.take() {
            countdown.abort();
        }

        self.router.detach();
        let activate = match screen {
            Screen::ModeSelect | Screen::Ballot => Command::SelectFocused,
            Screen::Instructions | Screen::Confirmation | Screen::Handoff => Command::Confirm,
        };
        self.router.attach(
            self.machine.list_len(),
            AttachOptions {
                auto_focus: true,
                activate,
            },
        );
        info!(?screen, "screen changed");
        let _ = self.events.send(KioskEvent::ScreenChanged(screen));
    }

    fn cancel_pending_speech(&mut self) {
        for task in self.pending_speech.drain(..) {
            task.abort();
        }
    }

    fn start_countdown(&mut self, ticket: u64, seconds: u32) {
        if let Some(previous) = self.countdown.take() {
            previous.abort();
        }
        let inputs = self.inputs_tx.clone();
        let events = self.events.clone();
        self.countdown = Some(tokio::spawn(async move {
            for remaining in (1..=seconds).rev() {
                let _ = events.send(KioskEvent::CountdownTick { remaining });
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            let _ = inputs
                .send(KioskInput::Trigger(Trigger::CountdownExpired { ticket }))
                .await;
        }));
    }

    fn submit_vote(&mut self, ticket: u64, candidate_id: CandidateId) {
        let sink = Arc::clone(&self.sink);
        let inputs = self.inputs_tx.clone();
        self.background.retain(|task| !task.is_finished());
        self.background.push(tokio::spawn(async move {
            let accepted = match sink.submit(&candidate_id).await {
                Ok(()) => true,
                Err(error) => {
                    warn!(%error, "vote submission failed");
                    false
                }
            };
            let _ = inputs
                .send(KioskInput::VoteSettled {
                    ticket,
                    candidate_id,
                    accepted,
                })
                .await;
        }));
    }

    fn on_vote_settled(&mut self, ticket: u64, candidate_id: CandidateId, accepted: bool) {
        if accepted {
            info!(ticket, "vote acknowledged");
            let _ = self.events.send(KioskEvent::VoteAcknowledged(candidate_id));
        } else {
            warn!(ticket, "vote was not recorded");
            let _ = self.events.send(KioskEvent::VoteFailed(candidate_id));
        }
        self.dispatch(Trigger::VoteSettled { ticket, accepted });
    }

    fn forward_utterances(&mut self) {
        let mut utterances = BroadcastStream::new(self.input.subscribe());
        let inputs = self.inputs_tx.clone();
        self.background.push(tokio::spawn(async move {
            while let Some(item) = utterances.next().await {
                match item {
                    Ok(utterance) => {
                        if inputs.send(KioskInput::Utterance(utterance)).await.is_err() {
                            break;
                        }
                    }
                    Err(error) => debug!(%error, "utterances skipped"),
                }
            }
        }));
    }

    fn shutdown(&mut self) {
        self.cancel_pending_speech();
        if let Some(countdown) = self.countdown.take() {
            countdown.abort();
        }
        for task in self.background.drain(..) {
            task.abort();
        }
        self.input.stop();
        self.output.stop();
        info!("kiosk stopped");
    }
}

#[cfg(test)]
#[path = "tests/kiosk_tests.rs"]
mod tests;
