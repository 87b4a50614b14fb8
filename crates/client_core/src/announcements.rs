//! Spoken prompts. Every prompt is Hindi followed by English.

use shared::domain::{AccessibilityMode, Candidate};

use crate::session::Screen;

pub fn welcome() -> String {
    "स्वागत है। स्वनिर्णय वोट प्रणाली में आपका स्वागत है। Welcome to the accessible voting assistant.".into()
}

pub fn mode_selection() -> String {
    "कृपया अपना पसंदीदा मोड चुनें। ऑडियो के लिए 1, बड़े टेक्स्ट के लिए 2, आवाज़ कमांड के लिए 3, कीबोर्ड के लिए 4 दबाएं। \
     Please choose your preferred mode. Press 1 for audio, 2 for large text, 3 for voice commands, 4 for keyboard."
        .into()
}

pub fn mode_option(mode: AccessibilityMode, position: usize) -> String {
    format!("विकल्प {position}। Option {position}: {}.", mode.label())
}

pub fn mode_chosen(mode: AccessibilityMode) -> String {
    format!("मोड चुना गया। {} mode selected.", mode.label())
}

pub fn instructions() -> String {
    "उम्मीदवार सुनने के लिए तीर कुंजी का उपयोग करें। चुनने के लिए एंटर दबाएं। वापस जाने के लिए बैकस्पेस दबाएं। \
     Use arrow keys or voice commands to navigate. Press Enter or say select to choose a candidate. \
     Press Enter to continue."
        .into()
}

pub fn ballot_navigation() -> String {
    "ऊपर-नीचे तीर से उम्मीदवार चुनें, संख्या कुंजी से सीधे चयन करें। \
     Up-down arrows for candidates, number keys for direct selection."
        .into()
}

pub fn candidate(candidate: &Candidate, index: usize) -> String {
    let number = index + 1;
    format!(
        "उम्मीदवार संख्या {number}। नाम: {name}। पार्टी: {party}। प्रतीक: {symbol}। \
         Candidate number {number}. Name: {name}. Party: {party}. Symbol: {symbol}.",
        name = candidate.name,
        party = candidate.party,
        symbol = candidate.symbol
    )
}

pub fn empty_ballot() -> String {
    "कोई उम्मीदवार उपलब्ध नहीं है। No candidates are available. Please contact the polling officer.".into()
}

pub fn selected(candidate: &Candidate) -> String {
    format!(
        "आपने {name} को चुना है। You have selected {name}.",
        name = candidate.name
    )
}

pub fn confirm_prompt() -> String {
    "पुष्टि करने के लिए एंटर दबाएं। बदलने के लिए बैकस्पेस दबाएं। Press Enter to confirm, Backspace to change."
        .into()
}

pub fn selection_cancelled() -> String {
    "चयन रद्द किया गया, फिर से चुनें। Selection cancelled, choose again.".into()
}

pub fn confirmed() -> String {
    "आपका चयन पुष्टि हो गया है। Your selection is confirmed.".into()
}

pub fn handoff(candidate: &Candidate) -> String {
    format!(
        "आपने {name}, {party} को चुना है। अब कृपया ईवीएम मशीन पर नीला बटन दबाएं। \
         You have selected {name}, {party}. Please press the blue button on the voting machine now.",
        name = candidate.name,
        party = candidate.party
    )
}

pub fn complete() -> String {
    "आपका वोट सफलतापूर्वक दर्ज किया गया। लोकतंत्र में भागीदारी के लिए धन्यवाद। \
     Your vote has been recorded successfully. Thank you for participating in democracy."
        .into()
}

/// Closing prompt when the server has not acknowledged the vote.
pub fn complete_unconfirmed() -> String {
    "कृपया मतदान मशीन पर आगे बढ़ें। किसी भी सहायता के लिए पोलिंग अधिकारी से संपर्क करें। \
     Please proceed at the voting machine. For any help, contact the polling officer."
        .into()
}

pub fn error() -> String {
    "कुछ गलत हुआ। कृपया पोलिंग अधिकारी से संपर्क करें। Something went wrong. Please contact the polling officer."
        .into()
}

pub fn help(screen: Screen) -> String {
    match screen {
        Screen::ModeSelect => mode_selection(),
        Screen::Instructions => instructions(),
        Screen::Ballot => "मदद के लिए: अगला सुनने के लिए दायां तीर, पिछला के लिए बायां तीर, चुनने के लिए एंटर, वापस के लिए बैकस्पेस। \
             Right arrow for next, left arrow for previous, Enter to select, Backspace to go back."
            .into(),
        Screen::Confirmation => confirm_prompt(),
        Screen::Handoff => {
            "कृपया ईवीएम मशीन पर नीला बटन दबाएं। Please press the blue button on the voting machine.".into()
        }
    }
}
