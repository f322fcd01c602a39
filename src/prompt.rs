//! Mode-specific prompt composition.
//!
//! Assembles the system/user instruction pair for one of three request
//! modes: short-options (persona-driven), long-form (slider-driven), and
//! advice. Directives are carried as ordered lists and joined verbatim, so
//! tests can assert on structure rather than substring matching.
//!
//! The guardrail rules composed here (no emoji/hashtags/mentions, no
//! hateful content, de-escalation) are declarative instructions passed to
//! the generation backend. Nothing downstream verifies that the generated
//! text actually obeys them; this service asks, it does not enforce.

use crate::persona::Persona;
use crate::style::StyleSheet;
use crate::types::ReplyFormat;

/// Fixed sampling temperature for the short-options mode.
const SIMPLE_TEMPERATURE: f32 = 0.95;

/// Fixed token budget for the short-options mode.
const SIMPLE_MAX_TOKENS: u32 = 240;

/// Rules appended to every short-options prompt.
const SIMPLE_RULES: [&str; 5] = [
    "Sound human. Never say you are an AI.",
    "Write THREE options, numbered 1-3.",
    "Each 1-2 sentences, quotable, distinct from one another.",
    "No emojis, no hashtags, no @mentions.",
    "Avoid profanity and anything hateful. Be sharp without targeting protected classes.",
];

/// Guardrails appended to every slider-driven prompt.
const GUARDRAILS: [&str; 4] = [
    "Sound human. Never say you are an AI.",
    "No emojis, no hashtags, no @mentions.",
    "No hateful or profane content; never target protected classes.",
    "De-escalate aggression rather than amplifying it, unless the style directives call for fire.",
];

/// Mission line opening every slider-driven system prompt.
const MISSION: &str =
    "You write replies on behalf of the user. Produce the reply text only - no preamble, no meta commentary.";

/// Default objective when the request names none.
const DEFAULT_OBJECTIVE: &str = "Make the point with clarity while keeping respect intact.";

/// System voice for the advice mode.
const ADVICE_ENGINE: &str = "You are a pragmatic advice engine. Give compact, actionable, \
     bulleted guidance - concrete next steps, not platitudes. If the topic is medical or \
     legal, include one line recommending professional consultation.";

/// A fully composed instruction pair plus generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPrompt {
    /// System instruction text.
    pub system: String,
    /// User instruction text.
    pub user: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Token budget.
    pub max_tokens: u32,
}

/// Compose the short-options prompt from a persona and the original text.
pub fn compose_simple(text: &str, persona: Persona) -> ComposedPrompt {
    let mut system = String::from(persona.instruction_block());
    system.push_str("\nRules:\n");
    for rule in SIMPLE_RULES {
        system.push_str("- ");
        system.push_str(rule);
        system.push('\n');
    }

    ComposedPrompt {
        system,
        user: wrap_text("Original post", text),
        temperature: SIMPLE_TEMPERATURE,
        max_tokens: SIMPLE_MAX_TOKENS,
    }
}

/// Compose the slider-driven long-form prompt.
///
/// `reply_format` selects the output shape: `Short` requests three numbered
/// options (normalized as a list downstream); `Normal`/`Long` request a
/// block with a target paragraph count, `Long` raising the count by one
/// (capped at 6).
pub fn compose_advanced(
    message: &str,
    intents: &[String],
    intent_text: Option<&str>,
    sheet: &StyleSheet,
    reply_format: ReplyFormat,
) -> ComposedPrompt {
    let mut system = String::from(MISSION);
    system.push_str("\nObjectives:\n");
    for objective in objectives(intents, intent_text) {
        system.push_str("- ");
        system.push_str(&objective);
        system.push('\n');
    }

    system.push_str("Style:\n");
    for directive in &sheet.directives {
        system.push_str("- ");
        system.push_str(directive);
        system.push('\n');
    }

    system.push_str("Rules:\n");
    for rule in GUARDRAILS {
        system.push_str("- ");
        system.push_str(rule);
        system.push('\n');
    }

    match reply_format {
        ReplyFormat::Short => {
            system.push_str("Write THREE reply options, numbered 1-3, each 1-2 sentences.\n");
        }
        ReplyFormat::Normal | ReplyFormat::Long => {
            let units = target_units(sheet, reply_format);
            let noun = if units == 1 { "paragraph" } else { "paragraphs" };
            system.push_str(&format!("Write exactly {units} {noun}.\n"));
        }
    }

    ComposedPrompt {
        system,
        user: wrap_text("Scenario", message),
        temperature: sheet.params.temperature,
        max_tokens: sheet.params.max_tokens,
    }
}

/// Compose the advice prompt.
///
/// The system voice is the advice engine, optionally flavored by a named
/// persona. The user prompt carries the structured context lines (message,
/// intent, tags, style) plus the bullet-count instruction.
pub fn compose_advice(
    message: &str,
    intents: &[String],
    intent_text: Option<&str>,
    persona: Option<Persona>,
    sheet: &StyleSheet,
) -> ComposedPrompt {
    let mut system = String::from(ADVICE_ENGINE);
    if let Some(p) = persona {
        system.push_str("\nVoice: ");
        system.push_str(p.instruction_block());
    }
    system.push_str("\nRules:\n");
    for rule in GUARDRAILS {
        system.push_str("- ");
        system.push_str(rule);
        system.push('\n');
    }

    let mut user = wrap_text("Situation", message);
    for objective in objectives(intents, intent_text) {
        user.push_str("\nIntent: ");
        user.push_str(&objective);
    }
    if !sheet.directives.is_empty() {
        user.push_str("\nStyle: ");
        user.push_str(&sheet.directives.join(" "));
    }
    user.push_str("\nGive 4-8 bullets.");

    ComposedPrompt {
        system,
        user,
        temperature: sheet.params.temperature,
        max_tokens: sheet.params.max_tokens,
    }
}

/// Objective lines from intents and free-form intent text, with a default
/// clarity/respect objective when neither is given.
fn objectives(intents: &[String], intent_text: Option<&str>) -> Vec<String> {
    let mut lines: Vec<String> = intents
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();

    if let Some(text) = intent_text {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_owned());
        }
    }

    if lines.is_empty() {
        lines.push(DEFAULT_OBJECTIVE.to_owned());
    }
    lines
}

/// Paragraph count for the block formats.
fn target_units(sheet: &StyleSheet, reply_format: ReplyFormat) -> u32 {
    let base = sheet.params.target_units;
    match reply_format {
        ReplyFormat::Long => base.saturating_add(1).min(6),
        _ => base,
    }
}

/// Wrap user-supplied text in a labeled `"""` delimiter block.
fn wrap_text(label: &str, text: &str) -> String {
    format!("{label}:\n\"\"\"{text}\"\"\"")
}
