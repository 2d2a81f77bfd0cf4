//! Classification of free-form game text into helper facts.
//!
//! Every function here is pure: a line either maps onto one [`TextEvent`] or
//! onto [`TextEvent::NoMatch`], and nothing is partially applied.
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::constants::{
    MSG_SACK_EMPTY, MSG_SACK_FULL, MSG_SACK_NOTHING_TO_FILL, SACK_REPORT_PREFIX,
    SACK_REPORT_SEPARATOR,
};
use crate::contract::City;

/// Chat channel a line was delivered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatChannel {
    #[default]
    GameMessage,
    Dialog,
    Other,
}

impl ChatChannel {
    /// Contract assignments are announced in both game messages and NPC dialog.
    #[must_use]
    pub const fn carries_contracts(self) -> bool {
        matches!(self, Self::GameMessage | Self::Dialog)
    }

    /// Sack feedback is only ever a game message.
    #[must_use]
    pub const fn carries_sack_feedback(self) -> bool {
        matches!(self, Self::GameMessage)
    }
}

/// Structured fact extracted from a single line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEvent {
    ContractAssigned { npc: String, city: City },
    /// Sum of every plank grade listed by the sack's check option.
    SackReport { total: i32 },
    SackFull,
    SackEmpty,
    /// Fill attempt with no eligible planks; nothing moved.
    SackNothingToFill,
    NoMatch,
}

impl TextEvent {
    /// Whether the event settles the sack count, making any in-flight
    /// inventory comparison obsolete.
    #[must_use]
    pub const fn cancels_pending_comparison(&self) -> bool {
        matches!(
            self,
            Self::SackReport { .. } | Self::SackFull | Self::SackEmpty | Self::SackNothingToFill
        )
    }
}

fn contract_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)see <col=ff0000>([^<]+?)\s*</col>.*?<col=ff0000>(varrock|falador|ardougne(?: market)?|hosidius)</col>",
        )
        .expect("valid contract pattern")
    })
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"))
}

/// Remove `<...>` markup from a chat line.
#[must_use]
pub fn strip_tags(text: &str) -> String {
    tag_pattern().replace_all(text, "").into_owned()
}

/// Classify a line delivered on `channel`, applying per-channel rules.
#[must_use]
pub fn classify_line(channel: ChatChannel, text: &str) -> TextEvent {
    if channel.carries_contracts()
        && let Some(event) = parse_contract(text)
    {
        return event;
    }
    if channel.carries_sack_feedback() {
        return parse_sack_feedback(text);
    }
    TextEvent::NoMatch
}

/// Match a contract assignment such as
/// `Please could you go see <col=ff0000>Bob</col> ... in <col=ff0000>Varrock</col>`.
#[must_use]
pub fn parse_contract(text: &str) -> Option<TextEvent> {
    let captures = contract_pattern().captures(text)?;
    let npc = captures.get(1)?.as_str().trim();
    let city = City::from_token(captures.get(2)?.as_str())?;
    if npc.is_empty() {
        return None;
    }
    Some(TextEvent::ContractAssigned {
        npc: npc.to_string(),
        city,
    })
}

/// Classify sack-related game messages. Markup is stripped first.
#[must_use]
pub fn parse_sack_feedback(text: &str) -> TextEvent {
    let message = strip_tags(text);
    if message.starts_with(SACK_REPORT_PREFIX) {
        return parse_sack_report(&message).map_or(TextEvent::NoMatch, |total| {
            TextEvent::SackReport { total }
        });
    }
    match message.as_str() {
        MSG_SACK_FULL => TextEvent::SackFull,
        MSG_SACK_EMPTY => TextEvent::SackEmpty,
        MSG_SACK_NOTHING_TO_FILL => TextEvent::SackNothingToFill,
        _ => TextEvent::NoMatch,
    }
}

/// Sum the `label:&#160;count` pairs of a sack check message.
///
/// Returns `None` when any pair is malformed so a half-read report is never
/// applied.
fn parse_sack_report(message: &str) -> Option<i32> {
    message.split(',').try_fold(0i32, |total, pair| {
        let count = pair.split(SACK_REPORT_SEPARATOR).nth(1)?.trim();
        total.checked_add(count.parse::<i32>().ok()?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "Basic&#160;planks:&#160;3, Oak&#160;planks:&#160;4, Teak&#160;planks:&#160;0, Mahogany&#160;planks:&#160;12";

    #[test]
    fn contract_line_yields_npc_and_city() {
        let line = "Please could you go see <col=ff0000>Bob </col>in the north-east of <col=ff0000>Varrock</col>, he needs help.";
        assert_eq!(
            classify_line(ChatChannel::Dialog, line),
            TextEvent::ContractAssigned {
                npc: "Bob".to_string(),
                city: City::Varrock,
            }
        );
    }

    #[test]
    fn ardougne_market_suffix_is_normalized() {
        let line = "Go see <col=ff0000>Noella</col> just north of <col=FF0000>Ardougne Market</col>.";
        assert_eq!(
            parse_contract(line),
            Some(TextEvent::ContractAssigned {
                npc: "Noella".to_string(),
                city: City::Ardougne,
            })
        );
    }

    #[test]
    fn contract_requires_known_city() {
        let line = "Go see <col=ff0000>Bob</col> in <col=ff0000>Lumbridge</col>.";
        assert_eq!(parse_contract(line), None);
        assert_eq!(classify_line(ChatChannel::GameMessage, line), TextEvent::NoMatch);
    }

    #[test]
    fn contracts_ignored_on_other_channels() {
        let line = "see <col=ff0000>Tau</col> in <col=ff0000>Falador</col>";
        assert_eq!(classify_line(ChatChannel::Other, line), TextEvent::NoMatch);
    }

    #[test]
    fn sack_report_sums_all_grades() {
        assert_eq!(
            classify_line(ChatChannel::GameMessage, REPORT),
            TextEvent::SackReport { total: 19 }
        );
        let tagged = format!("<col=0000ff>{REPORT}</col>");
        assert_eq!(
            parse_sack_feedback(&tagged),
            TextEvent::SackReport { total: 19 }
        );
    }

    #[test]
    fn malformed_report_is_no_match() {
        let bad = "Basic&#160;planks:&#160;3, Oak&#160;planks:&#160;lots";
        assert_eq!(parse_sack_feedback(bad), TextEvent::NoMatch);
        let missing = "Basic&#160;planks:&#160;3, Oak planks";
        assert_eq!(parse_sack_feedback(missing), TextEvent::NoMatch);
    }

    #[test]
    fn fixed_sack_messages() {
        assert_eq!(parse_sack_feedback("Your sack is full."), TextEvent::SackFull);
        assert_eq!(parse_sack_feedback("Your sack is empty."), TextEvent::SackEmpty);
        assert_eq!(
            parse_sack_feedback("You haven't got any planks that can go in the sack."),
            TextEvent::SackNothingToFill
        );
        assert_eq!(parse_sack_feedback("Your sack is full"), TextEvent::NoMatch);
        assert!(TextEvent::SackFull.cancels_pending_comparison());
        assert!(!TextEvent::NoMatch.cancels_pending_comparison());
    }

    #[test]
    fn sack_feedback_only_on_game_messages() {
        assert_eq!(
            classify_line(ChatChannel::Dialog, "Your sack is full."),
            TextEvent::NoMatch
        );
    }
}
