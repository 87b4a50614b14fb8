//! Kiosk side of the voting station: input normalization, the screen flow
//! state machine, and the loop that ties them to speech and the vote server.

pub mod announcements;
pub mod ballot;
pub mod command;
pub mod focus;
pub mod input_router;
pub mod kiosk;
pub mod lexicon;
pub mod session;
pub mod speech;
pub mod station_client;

pub use ballot::{Ballot, BallotError};
pub use command::Command;
pub use input_router::{AttachOptions, InputRouter, Key, KeyOutcome};
pub use kiosk::{Kiosk, KioskEvent, KioskHandle, KioskInput};
pub use session::{Effect, Screen, SessionStateMachine, Trigger, VotingSession};
pub use speech::{SpeechInput, SpeechOutput, Utterance};
pub use station_client::{StationClient, SubmitError, VoteSink};
