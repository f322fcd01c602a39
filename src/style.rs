//! Slider-to-style compiler.
//!
//! Maps the ten 0–100 tone sliders to an ordered list of natural-language
//! style directives plus derived generation parameters (target length,
//! sampling temperature, token budget). Compilation is pure and
//! deterministic: identical sliders always produce identical output.
//!
//! Each of the nine content sliders (everything except `length`) contributes
//! exactly one clause, in fixed slider order. Neutral positions still emit a
//! clause; directives are concatenated verbatim into the instruction text,
//! so the ordering and completeness of this list is part of the contract.

use serde::Deserialize;

/// Neutral resting value for an omitted slider.
pub const NEUTRAL: f64 = 50.0;

/// Token budget base before the length bonus is added.
const MAX_TOKENS_BASE: u32 = 700;

/// The ten tone sliders, each in `[0, 100]`.
///
/// Missing fields deserialize to [`NEUTRAL`]. Values are not clamped at
/// deserialization time; [`compile`] clamps before threshold evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToneSliders {
    /// Willingness to engage political framing.
    pub politics: f64,
    /// Scientific/evidence-based (low) versus spiritual/reflective (high).
    pub science_spirit: f64,
    /// Emotional intensity.
    pub heat: f64,
    /// Casual (low) versus polished/formal (high).
    pub formality: f64,
    /// Emotional attunement to the other party.
    pub empathy: f64,
    /// Diplomatic (low) versus blunt (high).
    pub directness: f64,
    /// Seriousness (low) versus joke-forward (high).
    pub humor: f64,
    /// Teasing/roast energy.
    pub roast: f64,
    /// Sober realism (low) versus upbeat hopefulness (high).
    pub optimism: f64,
    /// Target output length; drives paragraph count and token budget.
    pub length: f64,
}

impl Default for ToneSliders {
    fn default() -> Self {
        Self {
            politics: NEUTRAL,
            science_spirit: NEUTRAL,
            heat: NEUTRAL,
            formality: NEUTRAL,
            empathy: NEUTRAL,
            directness: NEUTRAL,
            humor: NEUTRAL,
            roast: NEUTRAL,
            optimism: NEUTRAL,
            length: NEUTRAL,
        }
    }
}

/// Generation parameters derived from the sliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Sampling temperature for the generation backend.
    pub temperature: f32,
    /// Token budget for the generation backend.
    pub max_tokens: u32,
    /// Target paragraph count for the composed reply.
    pub target_units: u32,
}

/// Compiled style: ordered directives plus derived parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    /// Natural-language style clauses, one per content slider, in slider order.
    pub directives: Vec<String>,
    /// Derived generation parameters.
    pub params: GenerationParams,
}

/// Compile sliders into a [`StyleSheet`].
pub fn compile(sliders: &ToneSliders) -> StyleSheet {
    let politics = clamp(sliders.politics);
    let science_spirit = clamp(sliders.science_spirit);
    let heat = clamp(sliders.heat);
    let formality = clamp(sliders.formality);
    let empathy = clamp(sliders.empathy);
    let directness = clamp(sliders.directness);
    let humor = clamp(sliders.humor);
    let roast = clamp(sliders.roast);
    let optimism = clamp(sliders.optimism);
    let length = clamp(sliders.length);

    let directives = vec![
        band(
            politics,
            "Stay away from political framing entirely.",
            "Touch politics only if the situation truly demands it.",
            "Lean into the political stakes, but argue positions, not parties.",
        ),
        band(
            science_spirit,
            "Ground every point in evidence and concrete reasoning.",
            "Balance practical reasoning with a little perspective.",
            "Let the reply breathe: reflective, almost philosophical.",
        ),
        band(
            heat,
            "Keep the temperature low: calm, measured, unbothered.",
            "Warm but controlled; conviction without aggression.",
            "Bring real fire. Intense, charged language is welcome.",
        ),
        band(
            formality,
            "Write casually, like a quick message to a friend.",
            "Conversational register; relaxed but not sloppy.",
            "Polished, composed prose; no slang.",
        ),
        band(
            empathy,
            "Do not soften the message for their feelings.",
            "Acknowledge their side briefly before making the point.",
            "Lead with genuine understanding of how this lands for them.",
        ),
        band(
            directness,
            "Approach the point sideways; let subtext do the work.",
            "Be clear about the point without hammering it.",
            "Say it straight. No hedging, no softeners.",
        ),
        band(
            humor,
            "Play it straight: no jokes.",
            "A light touch of wit is fine where it fits.",
            "Make it funny. Land at least one genuinely good line.",
        ),
        band(
            roast,
            "No teasing or mockery of any kind.",
            "A playful jab is allowed if it stays friendly.",
            "Roast them. Pointed, personal-adjacent, still defensible.",
        ),
        band(
            optimism,
            "Stay sober and realistic about how this plays out.",
            "Balanced outlook; neither doom nor cheerleading.",
            "End on genuine hope. Make the upside feel real.",
        ),
    ];

    let temperature = if length > 70.0 || humor > 60.0 || roast > 60.0 {
        0.95
    } else if heat > 60.0 {
        0.9
    } else {
        0.7
    };

    StyleSheet {
        directives,
        params: GenerationParams {
            temperature,
            max_tokens: max_tokens_for(length),
            target_units: paragraph_bucket(length),
        },
    }
}

/// Clamp a slider value to `[0, 100]`; non-finite values clamp to 0.
pub fn clamp(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Three-way threshold: `<40` low clause, `>60` high clause, else neutral.
fn band(value: f64, low: &str, neutral: &str, high: &str) -> String {
    if value < 40.0 {
        low.to_owned()
    } else if value > 60.0 {
        high.to_owned()
    } else {
        neutral.to_owned()
    }
}

/// Bucket the length slider into a target paragraph count.
fn paragraph_bucket(length: f64) -> u32 {
    if length < 30.0 {
        1
    } else if length < 60.0 {
        3
    } else if length < 80.0 {
        5
    } else {
        6
    }
}

/// Token budget: base plus twice the length slider, floored.
fn max_tokens_for(length: f64) -> u32 {
    // `length` is already clamped to [0, 100], so the cast cannot truncate
    // or go negative.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let bonus = (length * 2.0).floor() as u32;
    MAX_TOKENS_BASE.saturating_add(bonus)
}
