//! Deterministic Hindi replies for when the chat provider is unavailable.
//!
//! Rules are evaluated in table order against the most recent user turn,
//! lowercased, using substring matching. The first rule with any matching
//! pattern wins; if none match, the default reply is returned. Earlier
//! history never influences the choice.

use saathi_types::{Role, Turn};

/// Step 1 of the script: greet the driver and verify the registered number.
pub const REGISTRATION_CHECK_REPLY: &str =
    "Ola customer support mein aapka swagat hai. Kya yeh aapka registered number hai?";

/// Step 2 of the script: the account is clear, relocate and check again.
pub const ACCOUNT_CLEAR_REPLY: &str = "Aapka number blocked nahi hai. Sab theek hai. Kripya apna location badal kar phir se rides check kijiye.";

/// Step 3 of the script: close the call politely.
pub const CLOSING_REPLY: &str =
    "Aapka swagat hai! Koi aur samasya ho to hamen call kariye. Ola aapki seva mein hai.";

/// Reply when nothing in the utterance matches the script.
pub const DEFAULT_REPLY: &str =
    "Main aapki madad karne ke liye yahan hoon. Kripya apni samasya batayiye.";

/// One entry of a scripted reply table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedRule {
    /// Lowercase phrases; any one of them selects this rule.
    pub patterns: &'static [&'static str],
    pub reply: &'static str,
}

impl ScriptedRule {
    /// Returns true if `utterance` (already lowercased) contains any pattern.
    fn matches(&self, utterance: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| utterance.contains(pattern))
    }
}

/// The driver-support script, in priority order.
pub const DRIVER_SUPPORT_RULES: &[ScriptedRule] = &[
    // No rides received.
    ScriptedRule {
        patterns: &["ride nahi mil", "rides nahi", "2 ghante", "online hoon"],
        reply: REGISTRATION_CHECK_REPLY,
    },
    // Confirmation of the registered number.
    ScriptedRule {
        patterns: &["haan", "yes", "registered number hai", "mera number"],
        reply: ACCOUNT_CLEAR_REPLY,
    },
    // Thanks and closure.
    ScriptedRule {
        patterns: &["dhanyawad", "thank you", "theek hai"],
        reply: CLOSING_REPLY,
    },
];

/// Rule-based reply generator used whenever the gateway fails.
#[derive(Debug, Clone, Copy)]
pub struct FallbackResponder {
    rules: &'static [ScriptedRule],
    default_reply: &'static str,
}

impl FallbackResponder {
    pub fn new(rules: &'static [ScriptedRule], default_reply: &'static str) -> Self {
        Self {
            rules,
            default_reply,
        }
    }

    /// Responder for the built-in driver-support script.
    pub fn driver_support() -> Self {
        Self::new(DRIVER_SUPPORT_RULES, DEFAULT_REPLY)
    }

    /// Picks the reply for the most recent user turn in `history`.
    ///
    /// A history without any user turn yields the default reply.
    pub fn respond(&self, history: &[Turn]) -> &'static str {
        history
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
            .map_or(self.default_reply, |turn| self.reply_for(&turn.content))
    }

    /// Picks the reply for a single raw utterance.
    pub fn reply_for(&self, utterance: &str) -> &'static str {
        self.classify(utterance)
            .map_or(self.default_reply, |index| self.rules[index].reply)
    }

    /// Index of the first rule matching `utterance`, if any.
    pub fn classify(&self, utterance: &str) -> Option<usize> {
        let lowered = utterance.to_lowercase();
        self.rules.iter().position(|rule| rule.matches(&lowered))
    }

    pub fn default_reply(&self) -> &'static str {
        self.default_reply
    }
}

impl Default for FallbackResponder {
    fn default() -> Self {
        Self::driver_support()
    }
}
