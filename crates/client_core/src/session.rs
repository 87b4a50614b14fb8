use std::time::Duration;

use shared::domain::{AccessibilityMode, Candidate, CandidateId};
use tracing::{debug, info};

use crate::{announcements, command::Command, focus::FocusCursor};

pub const CONFIRM_PROMPT_DELAY: Duration = Duration::from_millis(1500);
pub const HANDOFF_INSTRUCTIONS_DELAY: Duration = Duration::from_secs(1);
pub const HANDOFF_COUNTDOWN_SECONDS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    ModeSelect,
    Instructions,
    Ballot,
    Confirmation,
    Handoff,
}

/// Everything that can drive the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Command(Command),
    /// Direct pick on the mode selection screen.
    ChooseMode(AccessibilityMode),
    /// "Continue" on the instructions screen.
    Continue,
    /// Handoff countdown ran out. Only the ticket of the current Handoff
    /// visit has any effect.
    CountdownExpired { ticket: u64 },
    /// The server answered the submission made on Handoff visit `ticket`.
    VoteSettled { ticket: u64, accepted: bool },
}

impl From<Command> for Trigger {
    fn from(command: Command) -> Self {
        Trigger::Command(command)
    }
}

/// Side effects requested by a transition, executed by the kiosk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ScreenChanged(Screen),
    /// Interrupts current speech and any pending follow-up.
    Announce(String),
    /// Like `Announce`, then each further text once the previous finished.
    AnnounceSequence(Vec<String>),
    AnnounceAfter { delay: Duration, text: String },
    StartCountdown { ticket: u64, seconds: u32 },
    StartListening,
    StopListening,
    SubmitVote { ticket: u64, candidate_id: CandidateId },
}

/// Client-local state of one voter's pass through the screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingSession {
    pub accessibility_mode: AccessibilityMode,
    pub focus_index: usize,
    pub selected_candidate_id: Option<CandidateId>,
}

#[derive(Debug)]
pub struct SessionStateMachine {
    candidates: Vec<Candidate>,
    screen: Screen,
    mode_cursor: FocusCursor,
    ballot_cursor: FocusCursor,
    session: Option<VotingSession>,
    handoff_ticket: u64,
    /// Server answer for the current Handoff visit, once it has arrived.
    vote_accepted: Option<bool>,
}

impl SessionStateMachine {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        let ballot_cursor = FocusCursor::new(candidates.len());
        Self {
            candidates,
            screen: Screen::ModeSelect,
            mode_cursor: FocusCursor::new(AccessibilityMode::ALL.len()),
            ballot_cursor,
            session: None,
            handoff_ticket: 0,
            vote_accepted: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> Option<&VotingSession> {
        self.session.as_ref()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Focus within the list shown on the current screen.
    pub fn focus_index(&self) -> usize {
        match self.screen {
            Screen::ModeSelect => self.mode_cursor.index(),
            _ => self.ballot_cursor.index(),
        }
    }

    pub fn selected_candidate_id(&self) -> Option<&CandidateId> {
        self.session.as_ref()?.selected_candidate_id.as_ref()
    }

    /// Number of focusable items on the current screen.
    pub fn list_len(&self) -> usize {
        match self.screen {
            Screen::ModeSelect => self.mode_cursor.len(),
            Screen::Ballot => self.ballot_cursor.len(),
            Screen::Instructions | Screen::Confirmation | Screen::Handoff => 0,
        }
    }

    pub fn handoff_ticket(&self) -> u64 {
        self.handoff_ticket
    }

    /// `Some(true)` only after the server acknowledged this Handoff's vote.
    pub fn vote_accepted(&self) -> Option<bool> {
        self.vote_accepted
    }

    /// Effects for the very first screen.
    pub fn enter(&self) -> Vec<Effect> {
        vec![
            Effect::ScreenChanged(Screen::ModeSelect),
            Effect::AnnounceSequence(vec![announcements::welcome(), announcements::mode_selection()]),
        ]
    }

    /// Applies one input. Pairs with no transition leave the machine
    /// untouched and return no effects.
    pub fn handle(&mut self, trigger: impl Into<Trigger>) -> Vec<Effect> {
        let trigger = trigger.into();
        if trigger == Trigger::Command(Command::Help) {
            return vec![Effect::Announce(announcements::help(self.screen))];
        }
        if let Trigger::VoteSettled { ticket, accepted } = trigger {
            return self.on_vote_settled(ticket, accepted);
        }

        let effects = match self.screen {
            Screen::ModeSelect => self.on_mode_select(trigger),
            Screen::Instructions => self.on_instructions(trigger),
            Screen::Ballot => self.on_ballot(trigger),
            Screen::Confirmation => self.on_confirmation(trigger),
            Screen::Handoff => self.on_handoff(trigger),
        };
        if effects.is_empty() {
            debug!(screen = ?self.screen, ?trigger, "input has no effect on this screen");
        }
        effects
    }

    fn on_mode_select(&mut self, trigger: Trigger) -> Vec<Effect> {
        match trigger {
            Trigger::ChooseMode(mode) => self.choose_mode(mode),
            Trigger::Command(Command::SelectByNumber(n)) => match AccessibilityMode::from_number(n) {
                Some(mode) => self.choose_mode(mode),
                None => Vec::new(),
            },
            Trigger::Command(Command::SelectFocused) => {
                match AccessibilityMode::ALL.get(self.mode_cursor.index()) {
                    Some(mode) => self.choose_mode(*mode),
                    None => Vec::new(),
                }
            }
            Trigger::Command(Command::Next) => {
                self.mode_cursor.next();
                self.announce_mode_cursor()
            }
            Trigger::Command(Command::Previous) => {
                self.mode_cursor.previous();
                self.announce_mode_cursor()
            }
            _ => Vec::new(),
        }
    }

    fn announce_mode_cursor(&self) -> Vec<Effect> {
        let index = self.mode_cursor.index();
        AccessibilityMode::ALL
            .get(index)
            .map(|mode| vec![Effect::Announce(announcements::mode_option(*mode, index + 1))])
            .unwrap_or_default()
    }

    fn choose_mode(&mut self, mode: AccessibilityMode) -> Vec<Effect> {
        info!(?mode, "accessibility mode chosen");
        self.session = Some(VotingSession {
            accessibility_mode: mode,
            focus_index: 0,
            selected_candidate_id: None,
        });
        self.ballot_cursor = FocusCursor::new(self.candidates.len());
        self.screen = Screen::Instructions;

        let mut effects = vec![Effect::ScreenChanged(Screen::Instructions)];
        if mode.uses_voice_input() {
            effects.push(Effect::StartListening);
        }
        effects.push(Effect::AnnounceSequence(vec![
            announcements::mode_chosen(mode),
            announcements::instructions(),
        ]));
        effects
    }

    fn on_instructions(&mut self, trigger: Trigger) -> Vec<Effect> {
        if !matches!(trigger, Trigger::Continue | Trigger::Command(Command::Confirm)) {
            return Vec::new();
        }
        self.screen = Screen::Ballot;
        self.ballot_cursor = FocusCursor::new(self.candidates.len());
        self.sync_session_focus();

        let first = match self.candidates.first() {
            Some(candidate) => announcements::candidate(candidate, 0),
            None => announcements::empty_ballot(),
        };
        vec![
            Effect::ScreenChanged(Screen::Ballot),
            Effect::AnnounceSequence(vec![announcements::ballot_navigation(), first]),
        ]
    }

    fn on_ballot(&mut self, trigger: Trigger) -> Vec<Effect> {
        if self.candidates.is_empty() {
            return Vec::new();
        }
        match trigger {
            Trigger::Command(Command::Next) => {
                self.ballot_cursor.next();
                self.announce_focused_candidate()
            }
            Trigger::Command(Command::Previous) => {
                self.ballot_cursor.previous();
                self.announce_focused_candidate()
            }
            Trigger::Command(Command::SelectByNumber(n)) => {
                if self.ballot_cursor.select_number(n).is_none() {
                    return Vec::new();
                }
                self.announce_focused_candidate()
            }
            Trigger::Command(Command::SelectFocused) => self.select_focused(),
            _ => Vec::new(),
        }
    }

    fn announce_focused_candidate(&mut self) -> Vec<Effect> {
        self.sync_session_focus();
        let index = self.ballot_cursor.index();
        self.candidates
            .get(index)
            .map(|c| vec![Effect::Announce(announcements::candidate(c, index))])
            .unwrap_or_default()
    }

    fn select_focused(&mut self) -> Vec<Effect> {
        let Some(candidate) = self.candidates.get(self.ballot_cursor.index()) else {
            return Vec::new();
        };
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        session.selected_candidate_id = Some(candidate.id.clone());
        self.screen = Screen::Confirmation;
        vec![
            Effect::ScreenChanged(Screen::Confirmation),
            Effect::Announce(announcements::selected(candidate)),
            Effect::AnnounceAfter {
                delay: CONFIRM_PROMPT_DELAY,
                text: announcements::confirm_prompt(),
            },
        ]
    }

    fn on_confirmation(&mut self, trigger: Trigger) -> Vec<Effect> {
        match trigger {
            Trigger::Command(Command::Confirm) => self.confirm(),
            Trigger::Command(Command::Cancel) => {
                if let Some(session) = self.session.as_mut() {
                    session.selected_candidate_id = None;
                }
                self.screen = Screen::Ballot;
                vec![
                    Effect::ScreenChanged(Screen::Ballot),
                    Effect::Announce(announcements::selection_cancelled()),
                ]
            }
            _ => Vec::new(),
        }
    }

    fn confirm(&mut self) -> Vec<Effect> {
        let Some(candidate_id) = self.selected_candidate_id().cloned() else {
            return Vec::new();
        };
        let Some(candidate) = self.candidates.iter().find(|c| c.id == candidate_id) else {
            return Vec::new();
        };
        let handoff = announcements::handoff(candidate);

        self.handoff_ticket += 1;
        self.vote_accepted = None;
        self.screen = Screen::Handoff;
        info!(ticket = self.handoff_ticket, "selection confirmed; handing off");
        vec![
            Effect::ScreenChanged(Screen::Handoff),
            Effect::Announce(announcements::confirmed()),
            Effect::AnnounceAfter {
                delay: HANDOFF_INSTRUCTIONS_DELAY,
                text: handoff,
            },
            Effect::StartCountdown {
                ticket: self.handoff_ticket,
                seconds: HANDOFF_COUNTDOWN_SECONDS,
            },
            Effect::SubmitVote {
                ticket: self.handoff_ticket,
                candidate_id,
            },
        ]
    }

    fn on_vote_settled(&mut self, ticket: u64, accepted: bool) -> Vec<Effect> {
        if self.screen != Screen::Handoff || ticket != self.handoff_ticket {
            debug!(ticket, accepted, "vote result for a finished handoff ignored");
            return Vec::new();
        }
        if self.vote_accepted.is_some() {
            return Vec::new();
        }
        self.vote_accepted = Some(accepted);
        if accepted {
            Vec::new()
        } else {
            vec![Effect::Announce(announcements::error())]
        }
    }

    fn on_handoff(&mut self, trigger: Trigger) -> Vec<Effect> {
        match trigger {
            Trigger::Command(Command::Confirm) => self.complete(),
            Trigger::CountdownExpired { ticket } if ticket == self.handoff_ticket => self.complete(),
            _ => Vec::new(),
        }
    }

    fn complete(&mut self) -> Vec<Effect> {
        let listening = self
            .session
            .take()
            .is_some_and(|s| s.accessibility_mode.uses_voice_input());
        self.mode_cursor = FocusCursor::new(AccessibilityMode::ALL.len());
        self.ballot_cursor = FocusCursor::new(self.candidates.len());
        self.screen = Screen::ModeSelect;
        let closing = match self.vote_accepted.take() {
            Some(true) => announcements::complete(),
            _ => announcements::complete_unconfirmed(),
        };
        info!("voting session complete");

        let mut effects = vec![Effect::ScreenChanged(Screen::ModeSelect)];
        if listening {
            effects.push(Effect::StopListening);
        }
        effects.push(Effect::Announce(closing));
        effects
    }

    fn sync_session_focus(&mut self) {
        let index = self.ballot_cursor.index();
        if let Some(session) = self.session.as_mut() {
            session.focus_index = index;
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
