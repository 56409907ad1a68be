use lazy_static::lazy_static;

use crate::encoding::{Codec, EncodeError};
use crate::tokenizer::{split_line, unbracket};

/// Generator polynomial of the reversed CRC32.
const POLYNOMIAL: u32 = 0xEDB8_8320;

lazy_static! {
    static ref TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut value = i as u32;
            for _ in 0..8 {
                value = if value & 1 != 0 {
                    POLYNOMIAL ^ (value >> 1)
                } else {
                    value >> 1
                };
            }
            *entry = value;
        }
        table
    };
}

/// Incremental reversed CRC32, as used by the `#KSUMMA` post.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Crc32 {
    register: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Crc32 {
            register: 0xFFFF_FFFF,
        }
    }
}

impl Crc32 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds bytes to the checksum.
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.register = (self.register >> 8) ^ TABLE[((self.register ^ b as u32) & 0xFF) as usize];
        }
    }

    /// Checksum of all bytes added so far.
    pub fn checksum(&self) -> u32 {
        !self.register
    }

    /// Adds the fields of one post.
    ///
    /// Only field content counts: separators, quotes and the braces of an object list are left
    /// out, and the keys and values inside an object list count as separate fields.
    pub fn add_post<C: Codec + ?Sized>(
        &mut self,
        fields: &[String],
        codec: &C,
    ) -> Result<(), EncodeError> {
        for field in fields {
            match unbracket(field) {
                Some(inner) => {
                    for part in split_line(inner) {
                        self.add_bytes(&codec.encode(&part)?);
                    }
                }
                None => self.add_bytes(&codec.encode(field)?),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Cp437;

    #[test]
    fn check_value() {
        let mut crc = Crc32::new();
        crc.add_bytes(b"123456789");
        assert_eq!(crc.checksum(), 0xCBF4_3926);
    }

    #[test]
    fn empty_input() {
        assert_eq!(Crc32::new().checksum(), 0);
    }

    #[test]
    fn incremental_equals_one_shot() {
        let mut one = Crc32::new();
        one.add_bytes(b"#KONTO1910Kassa");
        let mut parts = Crc32::new();
        parts.add_bytes(b"#KONTO");
        parts.add_bytes(b"1910");
        parts.add_bytes(b"Kassa");
        assert_eq!(one, parts);
    }

    #[test]
    fn post_ignores_quotes_and_braces() {
        let fields: Vec<String> = vec!["#TRANS".into(), "1910".into(), "{1 Nord}".into(), "-10.00".into()];
        let mut post = Crc32::new();
        post.add_post(&fields, &Cp437).unwrap();

        let mut raw = Crc32::new();
        raw.add_bytes(b"#TRANS19101Nord-10.00");
        assert_eq!(post.checksum(), raw.checksum());
    }
}
