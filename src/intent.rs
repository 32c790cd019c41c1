//! Keyword intent rules
//!
//! Free text is matched against an ordered rule table, first match wins.
//! Transactional rules carry a template that builds the transaction preview
//! shown to the user for confirmation.

mod templates;

use crate::session::state::PendingTransaction;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Replies used when no rule matches. One is picked uniformly at random.
pub const FALLBACK_REPLIES: [&str; 3] = [
    "I can help you with that! However, I need more specific details. Could you tell me exactly what blockchain operation you'd like to perform?",
    "Interesting request! For safety, I need you to be more specific about the smart contract function you want to execute.",
    "I understand you want to interact with the blockchain. Could you provide more details about the specific transaction you have in mind?",
];

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Swap,
    Mint,
    Delegate,
    Balance,
    Unrecognized,
}

impl IntentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IntentKind::Swap => "swap",
            IntentKind::Mint => "mint",
            IntentKind::Delegate => "delegate",
            IntentKind::Balance => "balance",
            IntentKind::Unrecognized => "unrecognized",
        }
    }
}

/// Builds a transaction preview for a matched rule
pub type TemplateFn = fn(DateTime<Utc>) -> PendingTransaction;

/// One entry of the rule table
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub kind: IntentKind,
    /// Lower-case substrings, any of which selects this rule
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
    /// Present for rules that propose a transaction
    pub template: Option<TemplateFn>,
}

impl IntentRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }

    #[allow(dead_code)] // Used by tests
    pub fn is_transactional(&self) -> bool {
        self.template.is_some()
    }
}

/// Result of classifying one user request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: IntentKind,
    pub reply: String,
    pub transaction: Option<PendingTransaction>,
}

/// Ordered list of intent rules
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<IntentRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new(vec![
            IntentRule {
                kind: IntentKind::Swap,
                keywords: &["swap", "exchange"],
                reply: "I understand you want to swap tokens. Let me prepare that transaction for you.",
                template: Some(templates::swap),
            },
            IntentRule {
                kind: IntentKind::Mint,
                keywords: &["nft", "mint"],
                reply: "I'll help you mint an NFT. Here's the transaction preview:",
                template: Some(templates::mint),
            },
            IntentRule {
                kind: IntentKind::Delegate,
                keywords: &["delegate", "stake"],
                reply: "I'll set up that delegation for you. Please review the transaction below before confirming.",
                template: Some(templates::delegate),
            },
            IntentRule {
                kind: IntentKind::Balance,
                keywords: &["balance", "check"],
                reply: "Your connected wallet holds 1,250.00 USDC, 0.84 ETH and 420 BDAG on the BlockDAG Primordial Testnet.",
                template: None,
            },
        ])
    }
}

impl RuleTable {
    pub fn new(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    #[allow(dead_code)] // Used by tests
    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// First rule whose keywords appear in the lower-cased text
    pub fn find(&self, text: &str) -> Option<&IntentRule> {
        let lowered = text.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&lowered))
    }

    /// Classify text, falling back to a random canned reply
    pub fn classify<R: Rng + ?Sized>(
        &self,
        text: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Classification {
        match self.find(text) {
            Some(rule) => Classification {
                intent: rule.kind,
                reply: rule.reply.to_string(),
                transaction: rule.template.map(|build| build(now)),
            },
            None => Classification {
                intent: IntentKind::Unrecognized,
                reply: (*FALLBACK_REPLIES.choose(rng).unwrap_or(&FALLBACK_REPLIES[0])).to_string(),
                transaction: None,
            },
        }
    }
}
