use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(VoterId);
id_newtype!(CandidateId);
id_newtype!(SessionId);

/// One entry on the ballot. Loaded from ballot configuration and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessibilityMode {
    Audio,
    LargeText,
    Voice,
    Keyboard,
}

impl AccessibilityMode {
    /// Order in which modes are offered on the mode selection screen.
    pub const ALL: [AccessibilityMode; 4] = [
        AccessibilityMode::Audio,
        AccessibilityMode::LargeText,
        AccessibilityMode::Voice,
        AccessibilityMode::Keyboard,
    ];

    /// 1-based position on the mode selection screen.
    pub fn from_number(number: u32) -> Option<Self> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            AccessibilityMode::Audio => "Audio / Screen Reader",
            AccessibilityMode::LargeText => "High Contrast & Large Text",
            AccessibilityMode::Voice => "Voice Navigation",
            AccessibilityMode::Keyboard => "Keyboard / Switch Navigation",
        }
    }

    pub fn uses_voice_input(self) -> bool {
        matches!(self, AccessibilityMode::Voice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    PollingOfficer,
    Voter,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::PollingOfficer => "polling_officer",
            Role::Voter => "voter",
        }
    }
}
