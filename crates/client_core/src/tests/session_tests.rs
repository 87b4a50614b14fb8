use super::*;

fn candidate(id: &str, name: &str) -> Candidate {
    Candidate {
        id: CandidateId::new(id),
        name: name.to_string(),
        party: format!("{name} Party"),
        symbol: format!("{name} symbol"),
    }
}

fn ballot() -> Vec<Candidate> {
    vec![
        candidate("C1", "Asha"),
        candidate("C2", "Bharat"),
        candidate("C3", "Chitra"),
    ]
}

fn on_ballot() -> SessionStateMachine {
    let mut machine = SessionStateMachine::new(ballot());
    machine.handle(Trigger::ChooseMode(AccessibilityMode::Audio));
    machine.handle(Trigger::Continue);
    assert_eq!(machine.screen(), Screen::Ballot);
    machine
}

fn announced(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Announce(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn starts_on_mode_select_with_welcome() {
    let machine = SessionStateMachine::new(ballot());
    assert_eq!(machine.screen(), Screen::ModeSelect);
    assert!(machine.session().is_none());

    let effects = machine.enter();
    assert_eq!(effects[0], Effect::ScreenChanged(Screen::ModeSelect));
    assert!(matches!(&effects[1], Effect::AnnounceSequence(texts) if texts.len() == 2));
}

#[test]
fn every_mode_pathway_leads_to_instructions() {
    let pathways = [
        Trigger::ChooseMode(AccessibilityMode::Keyboard),
        Trigger::Command(Command::SelectByNumber(2)),
        Trigger::Command(Command::SelectFocused),
    ];
    for trigger in pathways {
        let mut machine = SessionStateMachine::new(ballot());
        let effects = machine.handle(trigger);
        assert_eq!(machine.screen(), Screen::Instructions, "{trigger:?}");
        assert_eq!(effects[0], Effect::ScreenChanged(Screen::Instructions));
        let session = machine.session().expect("session created");
        assert_eq!(session.focus_index, 0);
        assert_eq!(session.selected_candidate_id, None);
    }
}

#[test]
fn focused_mode_follows_cursor() {
    let mut machine = SessionStateMachine::new(ballot());
    let effects = machine.handle(Command::Next);
    assert_eq!(
        announced(&effects),
        vec![announcements::mode_option(AccessibilityMode::LargeText, 2)]
    );
    machine.handle(Command::Next);
    machine.handle(Command::SelectFocused);
    assert_eq!(
        machine.session().map(|s| s.accessibility_mode),
        Some(AccessibilityMode::Voice)
    );
}

#[test]
fn voice_mode_starts_listening() {
    let mut machine = SessionStateMachine::new(ballot());
    let effects = machine.handle(Trigger::ChooseMode(AccessibilityMode::Voice));
    assert!(effects.contains(&Effect::StartListening));

    let mut machine = SessionStateMachine::new(ballot());
    let effects = machine.handle(Trigger::ChooseMode(AccessibilityMode::Audio));
    assert!(!effects.contains(&Effect::StartListening));
}

#[test]
fn out_of_range_mode_number_is_identity() {
    let mut machine = SessionStateMachine::new(ballot());
    assert!(machine.handle(Command::SelectByNumber(5)).is_empty());
    assert!(machine.handle(Command::SelectByNumber(0)).is_empty());
    assert_eq!(machine.screen(), Screen::ModeSelect);
}

#[test]
fn instructions_continue_announces_navigation_then_first_candidate() {
    let mut machine = SessionStateMachine::new(ballot());
    machine.handle(Trigger::ChooseMode(AccessibilityMode::Audio));
    assert!(machine.handle(Command::Next).is_empty());

    let effects = machine.handle(Command::Confirm);
    assert_eq!(
        effects,
        vec![
            Effect::ScreenChanged(Screen::Ballot),
            Effect::AnnounceSequence(vec![
                announcements::ballot_navigation(),
                announcements::candidate(&ballot()[0], 0),
            ]),
        ]
    );
    assert_eq!(machine.focus_index(), 0);
}

#[test]
fn ballot_focus_stays_in_bounds() {
    let mut machine = on_ballot();
    for _ in 0..5 {
        machine.handle(Command::Next);
        assert!(machine.focus_index() < 3);
    }
    assert_eq!(machine.focus_index(), 2);
    for _ in 0..5 {
        machine.handle(Command::Previous);
    }
    assert_eq!(machine.focus_index(), 0);
    assert_eq!(machine.session().map(|s| s.focus_index), Some(0));
}

#[test]
fn select_by_number_moves_focus_or_is_ignored() {
    let mut machine = on_ballot();
    let effects = machine.handle(Command::SelectByNumber(3));
    assert_eq!(machine.focus_index(), 2);
    assert_eq!(
        announced(&effects),
        vec![announcements::candidate(&ballot()[2], 2)]
    );

    assert!(machine.handle(Command::SelectByNumber(4)).is_empty());
    assert!(machine.handle(Command::SelectByNumber(0)).is_empty());
    assert_eq!(machine.focus_index(), 2);
}

#[test]
fn selecting_schedules_delayed_confirm_prompt() {
    let mut machine = on_ballot();
    machine.handle(Command::Next);
    let effects = machine.handle(Command::SelectFocused);

    assert_eq!(machine.screen(), Screen::Confirmation);
    assert_eq!(machine.selected_candidate_id(), Some(&CandidateId::new("C2")));
    assert_eq!(
        effects,
        vec![
            Effect::ScreenChanged(Screen::Confirmation),
            Effect::Announce(announcements::selected(&ballot()[1])),
            Effect::AnnounceAfter {
                delay: CONFIRM_PROMPT_DELAY,
                text: announcements::confirm_prompt(),
            },
        ]
    );
}

#[test]
fn cancel_returns_to_ballot_with_focus_kept() {
    let mut machine = on_ballot();
    machine.handle(Command::SelectByNumber(3));
    machine.handle(Command::SelectFocused);

    let effects = machine.handle(Command::Cancel);
    assert_eq!(machine.screen(), Screen::Ballot);
    assert_eq!(machine.selected_candidate_id(), None);
    assert_eq!(machine.focus_index(), 2);
    assert_eq!(
        announced(&effects),
        vec![announcements::selection_cancelled()]
    );
}

#[test]
fn confirm_emits_vote_intent_and_countdown() {
    let mut machine = on_ballot();
    machine.handle(Command::SelectByNumber(2));
    machine.handle(Command::SelectFocused);

    let effects = machine.handle(Command::Confirm);
    assert_eq!(machine.screen(), Screen::Handoff);
    assert!(effects.contains(&Effect::Announce(announcements::confirmed())));
    assert!(effects.contains(&Effect::AnnounceAfter {
        delay: HANDOFF_INSTRUCTIONS_DELAY,
        text: announcements::handoff(&ballot()[1]),
    }));
    assert!(effects.contains(&Effect::StartCountdown {
        ticket: 1,
        seconds: HANDOFF_COUNTDOWN_SECONDS,
    }));
    assert!(effects.contains(&Effect::SubmitVote {
        ticket: 1,
        candidate_id: CandidateId::new("C2"),
    }));
}

#[test]
fn unmapped_pairs_are_identity() {
    let mut machine = on_ballot();
    machine.handle(Command::Next);
    let before = (machine.screen(), machine.focus_index());

    assert!(machine.handle(Command::Confirm).is_empty());
    assert!(machine.handle(Command::Cancel).is_empty());
    assert!(machine.handle(Trigger::Continue).is_empty());
    assert!(machine.handle(Trigger::CountdownExpired { ticket: 1 }).is_empty());
    assert_eq!((machine.screen(), machine.focus_index()), before);

    machine.handle(Command::SelectFocused);
    assert!(machine.handle(Command::Next).is_empty());
    assert!(machine.handle(Command::SelectFocused).is_empty());
    assert_eq!(machine.screen(), Screen::Confirmation);
}

#[test]
fn help_announces_screen_help_without_moving() {
    let mut machine = on_ballot();
    let effects = machine.handle(Command::Help);
    assert_eq!(
        effects,
        vec![Effect::Announce(announcements::help(Screen::Ballot))]
    );
    assert_eq!(machine.screen(), Screen::Ballot);
}

#[test]
fn full_round_trip_resets_session() {
    let mut machine = on_ballot();
    machine.handle(Command::SelectByNumber(3));
    machine.handle(Command::SelectFocused);
    machine.handle(Command::Confirm);
    machine.handle(Trigger::VoteSettled {
        ticket: machine.handoff_ticket(),
        accepted: true,
    });

    let effects = machine.handle(Command::Confirm);
    assert_eq!(machine.screen(), Screen::ModeSelect);
    assert_eq!(machine.vote_accepted(), None);
    assert_eq!(machine.selected_candidate_id(), None);
    assert_eq!(machine.focus_index(), 0);
    assert!(machine.session().is_none());
    assert_eq!(effects[0], Effect::ScreenChanged(Screen::ModeSelect));
    assert!(effects.contains(&Effect::Announce(announcements::complete())));

    machine.handle(Trigger::ChooseMode(AccessibilityMode::Audio));
    machine.handle(Trigger::Continue);
    assert_eq!(machine.focus_index(), 0);
}

#[test]
fn stale_countdown_ticket_is_ignored() {
    let mut machine = on_ballot();
    machine.handle(Command::SelectFocused);
    machine.handle(Command::Confirm);
    let first_ticket = machine.handoff_ticket();
    machine.handle(Command::Confirm);

    machine.handle(Trigger::ChooseMode(AccessibilityMode::Audio));
    machine.handle(Trigger::Continue);
    machine.handle(Command::SelectFocused);
    machine.handle(Command::Confirm);
    assert_eq!(machine.screen(), Screen::Handoff);

    assert!(machine
        .handle(Trigger::CountdownExpired {
            ticket: first_ticket
        })
        .is_empty());
    assert_eq!(machine.screen(), Screen::Handoff);

    let current = machine.handoff_ticket();
    assert!(!machine
        .handle(Trigger::CountdownExpired { ticket: current })
        .is_empty());
    assert_eq!(machine.screen(), Screen::ModeSelect);
}

#[test]
fn voice_session_stops_listening_on_completion() {
    let mut machine = SessionStateMachine::new(ballot());
    machine.handle(Trigger::ChooseMode(AccessibilityMode::Voice));
    machine.handle(Trigger::Continue);
    machine.handle(Command::SelectFocused);
    machine.handle(Command::Confirm);
    let effects = machine.handle(Command::Confirm);
    assert!(effects.contains(&Effect::StopListening));
}

#[test]
fn empty_ballot_never_reaches_confirmation() {
    let mut machine = SessionStateMachine::new(Vec::new());
    machine.handle(Trigger::ChooseMode(AccessibilityMode::Keyboard));
    let effects = machine.handle(Trigger::Continue);
    assert!(matches!(
        &effects[1],
        Effect::AnnounceSequence(texts) if texts[1] == announcements::empty_ballot()
    ));
    assert!(machine.handle(Command::Next).is_empty());
    assert!(machine.handle(Command::SelectFocused).is_empty());
    assert_eq!(machine.screen(), Screen::Ballot);
}

fn on_handoff() -> SessionStateMachine {
    let mut machine = on_ballot();
    machine.handle(Command::SelectFocused);
    machine.handle(Command::Confirm);
    assert_eq!(machine.screen(), Screen::Handoff);
    machine
}

#[test]
fn completion_only_claims_success_after_acknowledgement() {
    let mut machine = on_handoff();
    let effects = machine.handle(Command::Confirm);
    assert_eq!(
        announced(&effects),
        vec![announcements::complete_unconfirmed()]
    );

    let mut machine = on_handoff();
    let ticket = machine.handoff_ticket();
    assert!(machine
        .handle(Trigger::VoteSettled {
            ticket,
            accepted: true
        })
        .is_empty());
    assert_eq!(machine.vote_accepted(), Some(true));
    let effects = machine.handle(Trigger::CountdownExpired { ticket });
    assert_eq!(announced(&effects), vec![announcements::complete()]);
}

#[test]
fn rejected_vote_announces_error_and_never_success() {
    let mut machine = on_handoff();
    let ticket = machine.handoff_ticket();

    let effects = machine.handle(Trigger::VoteSettled {
        ticket,
        accepted: false,
    });
    assert_eq!(effects, vec![Effect::Announce(announcements::error())]);
    assert_eq!(machine.screen(), Screen::Handoff);

    let effects = machine.handle(Trigger::CountdownExpired { ticket });
    assert_eq!(
        announced(&effects),
        vec![announcements::complete_unconfirmed()]
    );
}

#[test]
fn late_or_stale_vote_results_are_ignored() {
    let mut machine = on_handoff();
    let first = machine.handoff_ticket();
    machine.handle(Command::Confirm);

    assert!(machine
        .handle(Trigger::VoteSettled {
            ticket: first,
            accepted: false
        })
        .is_empty());
    assert_eq!(machine.screen(), Screen::ModeSelect);

    machine.handle(Trigger::ChooseMode(AccessibilityMode::Audio));
    machine.handle(Trigger::Continue);
    machine.handle(Command::SelectFocused);
    machine.handle(Command::Confirm);
    assert!(machine
        .handle(Trigger::VoteSettled {
            ticket: first,
            accepted: true
        })
        .is_empty());
    assert_eq!(machine.vote_accepted(), None);
}
