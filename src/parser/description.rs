use regex::Regex;

use crate::prismic::richtext::{paragraphs, RichTextBlock};

/// Header alternatives as regex fragments, matched case-insensitively.
const INGREDIENT_HEADERS: &[&str] = &[r"INGREDIENTES[:\s]+"];
const INSTRUCTION_HEADERS: &[&str] = &["PREPARACIÓN:", "PASOS:", "ELABORACIÓN:?"];

const SHORT_DESCRIPTION_CHARS: usize = 250;
const MIN_SENTENCE_CUT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Ingredients,
    Instructions,
}

struct SectionRule {
    field: Field,
    re: Regex,
}

/// Structured recipe content pulled out of a free-text video description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDescription {
    pub short_description: Vec<RichTextBlock>,
    pub ingredients: Vec<RichTextBlock>,
    pub instructions: Vec<RichTextBlock>,
}

/// Compiled section rules. Build once per run and reuse.
pub struct ContentExtractor {
    rules: Vec<SectionRule>,
}

impl ContentExtractor {
    pub fn new() -> Self {
        let ingredients = INGREDIENT_HEADERS.join("|");
        let instructions = INSTRUCTION_HEADERS.join("|");

        let table = [
            (
                Field::Ingredients,
                format!(r"(?is)(?:{ingredients})(.*?)(?:{instructions}|\z)"),
            ),
            (Field::Instructions, format!(r"(?is)(?:{instructions})(.*)")),
        ];

        let rules = table
            .into_iter()
            .map(|(field, pattern)| SectionRule {
                field,
                re: Regex::new(&pattern).expect("section header pattern"),
            })
            .collect();
        Self { rules }
    }

    /// Raw text of `field`'s section, if its header is present.
    pub fn section<'t>(&self, field: Field, text: &'t str) -> Option<&'t str> {
        self.rules
            .iter()
            .find(|r| r.field == field)
            .and_then(|r| r.re.captures(text))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn extract(&self, description: &str) -> ParsedDescription {
        let mut parsed = ParsedDescription {
            short_description: paragraphs(&short_description(description)),
            ..Default::default()
        };
        for rule in &self.rules {
            let blocks = self
                .section(rule.field, description)
                .map(paragraphs)
                .unwrap_or_default();
            match rule.field {
                Field::Ingredients => parsed.ingredients = blocks,
                Field::Instructions => parsed.instructions = blocks,
            }
        }
        parsed
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First ~250 chars, cut after the last sentence end past char 100,
/// otherwise marked with `...` when the text was longer.
pub fn short_description(text: &str) -> String {
    let window: String = text.chars().take(SHORT_DESCRIPTION_CHARS).collect();
    let last_period = window
        .chars()
        .enumerate()
        .filter(|(_, c)| *c == '.')
        .map(|(i, _)| i)
        .last();

    match last_period {
        Some(i) if i > MIN_SENTENCE_CUT => window.chars().take(i + 1).collect(),
        _ if text.chars().count() > SHORT_DESCRIPTION_CHARS => format!("{}...", window),
        _ => window,
    }
}

// ── Tests ──
