//! Text codecs for SIE files.
//!
//! SIE files are written in the IBM PC 8-bit character set (`#FORMAT PC8`), i.e. code page 437.

use std::collections::HashMap;

use lazy_static::lazy_static;
use thiserror::Error;

/// Converts between the bytes of a SIE file and Unicode text.
pub trait Codec {
    /// Decodes raw file bytes into text.
    fn decode(&self, bytes: &[u8]) -> String;

    /// Encodes text into raw file bytes.
    fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeError>;
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("character {character:?} at position {position} cannot be represented in the code page")]
pub struct EncodeError {
    pub character: char,
    pub position: usize,
}

/// Code page 437, the only character set allowed by the format.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Cp437;

/// Upper half of code page 437 (bytes 0x80 to 0xFF). The lower half is ASCII.
const UPPER_HALF: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

lazy_static! {
    static ref REVERSE_UPPER_HALF: HashMap<char, u8> = UPPER_HALF
        .iter()
        .enumerate()
        .map(|(i, c)| (*c, 0x80 + i as u8))
        .collect();
}

impl Codec for Cp437 {
    fn decode(&self, bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|&b| {
                if b < 0x80 {
                    b as char
                } else {
                    UPPER_HALF[(b - 0x80) as usize]
                }
            })
            .collect()
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeError> {
        text.chars()
            .enumerate()
            .map(|(position, character)| {
                if character.is_ascii() {
                    Ok(character as u8)
                } else {
                    REVERSE_UPPER_HALF
                        .get(&character)
                        .copied()
                        .ok_or(EncodeError {
                            character,
                            position,
                        })
                }
            })
            .collect()
    }
}
