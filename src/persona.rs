//! Named tone personas for the short-form mode.
//!
//! A persona is a fixed instruction block used in place of slider-driven
//! style compilation. The set is closed: unknown or missing tags resolve to
//! [`Persona::WittySarcastic`] rather than failing, so the fallback is an
//! explicit enum arm instead of a runtime guess.

/// The closed set of named tone personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    /// Ruthless roast-master; short, lethal, hilarious.
    Savage,
    /// High-brow snark and clever wordplay. The default.
    WittySarcastic,
    /// Reflective, poetic, emotionally resonant.
    InspirationalProfound,
    /// Friendly teasing, late-night monologue vibe.
    PlayfulRoast,
    /// Surgical call-outs, calm and meticulous.
    PettyPrecise,
    /// Polite wording that hides a knife.
    DiplomaticAssassin,
    /// Brilliant, strange, hyper-associative references that still land.
    ChaoticGenius,
}

impl Persona {
    /// Resolve a persona tag. Unknown or empty tags fall back to
    /// [`Persona::WittySarcastic`]. No partial matching.
    pub fn resolve(tag: &str) -> Self {
        match tag {
            "Savage" => Self::Savage,
            "Witty & Sarcastic" => Self::WittySarcastic,
            "Inspirational & Profound" => Self::InspirationalProfound,
            "Playful Roast" => Self::PlayfulRoast,
            "Petty & Precise" => Self::PettyPrecise,
            "Diplomatic Assassin" => Self::DiplomaticAssassin,
            "Chaotic Genius" => Self::ChaoticGenius,
            _ => Self::WittySarcastic,
        }
    }

    /// The display tag for this persona.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Savage => "Savage",
            Self::WittySarcastic => "Witty & Sarcastic",
            Self::InspirationalProfound => "Inspirational & Profound",
            Self::PlayfulRoast => "Playful Roast",
            Self::PettyPrecise => "Petty & Precise",
            Self::DiplomaticAssassin => "Diplomatic Assassin",
            Self::ChaoticGenius => "Chaotic Genius",
        }
    }

    /// The canned instruction block injected as the persona's system voice.
    pub fn instruction_block(self) -> &'static str {
        match self {
            Self::Savage => {
                "You are SAVAGE MODE: a ruthless roast-master. Short, lethal, hilarious. \
                 Internet insult-comedy energy. No emojis, no hashtags. No slurs or hate \
                 speech. Punchy 1-2 sentences max."
            }
            Self::WittySarcastic => {
                "You are WITTY & SARCASTIC: high-brow snark, clever wordplay, smug but \
                 charming. Dry humor. Keep it crisp. 1-2 sentences."
            }
            Self::InspirationalProfound => {
                "You are INSPIRATIONAL & PROFOUND: reflective, poetic, emotionally \
                 resonant. Sounds quotable and human. No cliches. 1-2 sentences."
            }
            Self::PlayfulRoast => {
                "You are PLAYFUL ROAST: friendly teasing, late-night monologue vibe. Fun, \
                 safe, cheeky. 1-2 sentences."
            }
            Self::PettyPrecise => {
                "You are PETTY & PRECISE: surgical call-outs that dismantle weak points \
                 with receipts energy. Calm, meticulous. 1-2 sentences."
            }
            Self::DiplomaticAssassin => {
                "You are DIPLOMATIC ASSASSIN: polite tone that hides a knife. Respectful \
                 wording, undeniable subtext. 1-2 sentences."
            }
            Self::ChaoticGenius => {
                "You are CHAOTIC GENIUS: brilliant, strange, hyper-associative references \
                 that still land. Surprising but coherent. 1-2 sentences."
            }
        }
    }
}
