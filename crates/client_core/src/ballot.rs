use std::collections::HashSet;

use serde::Deserialize;
use shared::domain::{Candidate, CandidateId};
use thiserror::Error;

/// Candidate list for one station, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ballot {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BallotError {
    #[error("ballot has no candidates")]
    Empty,
    #[error("candidate id '{0}' appears more than once")]
    DuplicateId(CandidateId),
    #[error("candidate '{0}' has no name")]
    MissingName(CandidateId),
    #[error("candidate '{0}' has no party")]
    MissingParty(CandidateId),
    #[error("candidate '{0}' has no symbol")]
    MissingSymbol(CandidateId),
}

impl Ballot {
    pub fn demo() -> Self {
        let entry = |id: &str, name: &str, party: &str, symbol: &str| Candidate {
            id: CandidateId::new(id),
            name: name.to_string(),
            party: party.to_string(),
            symbol: symbol.to_string(),
        };
        Self {
            candidates: vec![
                entry("1", "राजेश कुमार", "पार्टी A", "🪷"),
                entry("2", "प्रिया शर्मा", "पार्टी B", "🦁"),
                entry("3", "अमित पटेल", "स्वतंत्र", "✋"),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), BallotError> {
        if self.candidates.is_empty() {
            return Err(BallotError::Empty);
        }
        let mut seen = HashSet::new();
        for candidate in &self.candidates {
            if candidate.name.trim().is_empty() {
                return Err(BallotError::MissingName(candidate.id.clone()));
            }
            if candidate.party.trim().is_empty() {
                return Err(BallotError::MissingParty(candidate.id.clone()));
            }
            if candidate.symbol.trim().is_empty() {
                return Err(BallotError::MissingSymbol(candidate.id.clone()));
            }
            if !seen.insert(&candidate.id) {
                return Err(BallotError::DuplicateId(candidate.id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_ballot_is_valid() {
        assert_eq!(Ballot::demo().validate(), Ok(()));
        assert_eq!(Ballot::demo().candidates.len(), 3);
    }

    #[test]
    fn rejects_duplicate_ids_and_blank_names() {
        let mut ballot = Ballot::demo();
        ballot.candidates[2].id = CandidateId::new("1");
        assert_eq!(
            ballot.validate(),
            Err(BallotError::DuplicateId(CandidateId::new("1")))
        );

        let mut ballot = Ballot::demo();
        ballot.candidates[0].name = " ".into();
        assert_eq!(
            ballot.validate(),
            Err(BallotError::MissingName(CandidateId::new("1")))
        );

        assert_eq!(
            Ballot { candidates: Vec::new() }.validate(),
            Err(BallotError::Empty)
        );
    }

    #[test]
    fn every_candidate_needs_party_and_symbol() {
        let mut ballot = Ballot::demo();
        ballot.candidates[1].party = String::new();
        assert_eq!(
            ballot.validate(),
            Err(BallotError::MissingParty(CandidateId::new("2")))
        );

        let mut ballot = Ballot::demo();
        ballot.candidates[2].symbol = "  ".into();
        assert_eq!(
            ballot.validate(),
            Err(BallotError::MissingSymbol(CandidateId::new("3")))
        );
    }

    #[test]
    fn ballot_file_without_symbol_does_not_parse() {
        let complete = r#"
[[candidates]]
id = "C1"
name = "Asha"
party = "Party A"
symbol = "lotus"
"#;
        let ballot: Ballot = toml::from_str(complete).expect("ballot");
        assert_eq!(ballot.validate(), Ok(()));

        let missing = r#"
[[candidates]]
id = "C1"
name = "Asha"
party = "Party A"
"#;
        assert!(toml::from_str::<Ballot>(missing).is_err());
    }
}
