use crate::command::Command;

/// Keyword groups in priority order. The first group with a matching token
/// wins.
const KEYWORDS: &[(Command, &[&str])] = &[
    (Command::Next, &["next", "अगला", "आगे"]),
    (Command::Previous, &["previous", "back", "पिछला", "पीछे"]),
    (Command::SelectFocused, &["select", "choose", "चुनें", "चुन"]),
    (Command::Confirm, &["confirm", "yes", "पुष्टि", "हाँ", "हां"]),
    (
        Command::Cancel,
        &["cancel", "change", "no", "stop", "बदलें", "नहीं", "रद्द", "रोको"],
    ),
    (Command::Help, &["help", "मदद", "सहायता"]),
];

const NUMBER_WORDS: &[(u32, &[&str])] = &[
    (1, &["one", "first", "एक", "पहला"]),
    (2, &["two", "second", "दो", "दूसरा"]),
    (3, &["three", "third", "तीन", "तीसरा"]),
    (4, &["four", "fourth", "चार", "चौथा"]),
    (5, &["five", "fifth", "पांच", "पाँच", "पांचवां", "पाँचवा"]),
    (6, &["six", "sixth", "छह", "छठा"]),
    (7, &["seven", "seventh", "सात", "सातवां"]),
    (8, &["eight", "eighth", "आठ", "आठवां"]),
    (9, &["nine", "ninth", "नौ", "नौवां"]),
    (10, &["ten", "tenth", "दस", "दसवां"]),
];

/// Maps a recognised transcript to a command. Numbers take precedence over
/// keywords, so "select two" picks the second item.
pub fn parse_transcript(transcript: &str) -> Option<Command> {
    let text = transcript.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }
    let tokens: Vec<&str> = text.split(is_separator).filter(|t| !t.is_empty()).collect();

    if let Some(number) = digit_number(&text).or_else(|| word_number(&tokens)) {
        return Some(Command::SelectByNumber(number));
    }

    KEYWORDS
        .iter()
        .find(|(_, words)| tokens.iter().any(|t| words.contains(t)))
        .map(|(command, _)| *command)
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation() || matches!(c, '।' | '॥')
}

/// First run of ASCII digits, ignoring zero.
fn digit_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

fn word_number(tokens: &[&str]) -> Option<u32> {
    tokens.iter().find_map(|token| {
        NUMBER_WORDS
            .iter()
            .find(|(_, words)| words.contains(token))
            .map(|(number, _)| *number)
    })
}

#[cfg(test)]
#[path = "tests/lexicon_tests.rs"]
mod tests;
