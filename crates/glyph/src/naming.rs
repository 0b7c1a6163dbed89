//! Canonical glyph names.
//!
//! Names must be unique within a font, so [`glyph_name`] is injective: ASCII
//! letters name themselves, a handful of punctuation marks get their
//! standard names, and everything else is derived from its codepoint.

use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};

use crate::glyph_set::GlyphSet;

/// Characters offered by the drawing surface, in picker order
pub const SUPPORTED_CHARACTERS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.,!?";

pub const NOTDEF_NAME: &str = ".notdef";
pub const SPACE_NAME: &str = "space";

const PUNCTUATION_NAMES: [(char, &str); 4] = [
    ('.', "period"),
    (',', "comma"),
    ('!', "exclam"),
    ('?', "question"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CharClass {
    Letter,
    Digit,
    Punctuation,
    Other,
}

impl CharClass {
    pub fn of(character: char) -> Self {
        if character.is_ascii_alphabetic() {
            Self::Letter
        } else if character.is_ascii_digit() {
            Self::Digit
        } else if punctuation_name(character).is_some() {
            Self::Punctuation
        } else {
            Self::Other
        }
    }
}

fn punctuation_name(character: char) -> Option<&'static str> {
    PUNCTUATION_NAMES
        .iter()
        .find(|(c, _)| *c == character)
        .map(|(_, name)| *name)
}

/// `uniXXXX` for the BMP, `uXXXXX` beyond it
fn codepoint_name(character: char) -> String {
    let codepoint = u32::from(character);
    if codepoint <= 0xFFFF {
        format!("uni{codepoint:04X}")
    } else {
        format!("u{codepoint:05X}")
    }
}

pub fn glyph_name(character: char) -> String {
    match CharClass::of(character) {
        CharClass::Letter => character.to_string(),
        CharClass::Punctuation => punctuation_name(character)
            .map(str::to_string)
            .unwrap_or_else(|| codepoint_name(character)),
        CharClass::Digit | CharClass::Other => codepoint_name(character),
    }
}

pub fn supported_characters() -> impl Iterator<Item = char> {
    SUPPORTED_CHARACTERS.chars()
}

/// Which supported characters a glyph set already covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub saved: Vec<char>,
    pub missing: Vec<char>,
    /// Drawn characters outside the supported set
    pub extra: Vec<char>,
}

impl Coverage {
    pub fn total(&self) -> usize {
        self.saved.len() + self.missing.len()
    }

    pub fn fraction(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.saved.len() as f64 / self.total() as f64
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub fn coverage(glyphs: &GlyphSet) -> Coverage {
    let (saved, missing): (Vec<char>, Vec<char>) =
        supported_characters().partition(|&c| glyphs.contains(c));
    let extra = glyphs
        .characters()
        .filter(|&c| !SUPPORTED_CHARACTERS.contains(c))
        .collect();
    Coverage { saved, missing, extra }
}
