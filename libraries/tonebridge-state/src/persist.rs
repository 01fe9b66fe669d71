//! Versioned byte persistence
//!
//! Every record starts with a format version and the effect's wire tag and
//! ends with the backend settings string:
//!
//! ```text
//! [version u8][effect tag u8][enabled u8][fixed fields...][len u32 LE][settings UTF-8]
//! ```
//!
//! Bare snapshots use the same framing without the enabled flag and the
//! fixed fields. Field order is part of the format; changing it requires a
//! new version.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use tonebridge_core::{EffectType, SettingsSnapshot};

use crate::error::{Result, StateError};

/// Current record layout
pub const FORMAT_VERSION: u8 = 1;

pub(crate) fn write_header(out: &mut Vec<u8>, effect: EffectType) {
    out.push(FORMAT_VERSION);
    out.push(effect.wire_tag());
}

pub(crate) fn read_header(input: &mut &[u8]) -> Result<EffectType> {
    let version = read_u8(input)?;
    if version != FORMAT_VERSION {
        return Err(StateError::UnsupportedVersion(version));
    }
    let tag = read_u8(input)?;
    EffectType::from_wire_tag(tag).ok_or(StateError::UnknownEffectTag(tag))
}

pub(crate) fn write_flag(out: &mut Vec<u8>, value: bool) {
    out.push(u8::from(value));
}

pub(crate) fn read_flag(input: &mut &[u8], field: &'static str) -> Result<bool> {
    match read_u8(input)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StateError::InvalidField {
            field,
            value: i64::from(other),
        }),
    }
}

pub(crate) fn write_i32(out: &mut Vec<u8>, value: i32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_i32(&mut buf, value);
    out.extend_from_slice(&buf);
}

pub(crate) fn read_i32(input: &mut &[u8]) -> Result<i32> {
    let remaining = input.len();
    input
        .read_i32::<LittleEndian>()
        .map_err(|_| StateError::Truncated { needed: 4, remaining })
}

pub(crate) fn write_settings(out: &mut Vec<u8>, settings: &SettingsSnapshot) {
    let text = settings.to_string();
    let mut len = [0u8; 4];
    LittleEndian::write_u32(&mut len, text.len() as u32);
    out.extend_from_slice(&len);
    out.extend_from_slice(text.as_bytes());
}

pub(crate) fn read_settings(input: &mut &[u8], effect: EffectType) -> Result<SettingsSnapshot> {
    let remaining = input.len();
    let len = input
        .read_u32::<LittleEndian>()
        .map_err(|_| StateError::Truncated { needed: 4, remaining })? as usize;
    if input.len() < len {
        return Err(StateError::Truncated {
            needed: len,
            remaining: input.len(),
        });
    }

    let (text, rest) = input.split_at(len);
    *input = rest;
    let text = std::str::from_utf8(text).map_err(|_| StateError::InvalidUtf8)?;
    Ok(SettingsSnapshot::parse(effect, text)?)
}

pub(crate) fn finish(input: &[u8]) -> Result<()> {
    if input.is_empty() {
        Ok(())
    } else {
        Err(StateError::TrailingBytes(input.len()))
    }
}

fn read_u8(input: &mut &[u8]) -> Result<u8> {
    input.read_u8().map_err(|_| StateError::Truncated {
        needed: 1,
        remaining: 0,
    })
}

/// Effect type of a persisted record or snapshot, without decoding it
pub fn peek_effect(bytes: &[u8]) -> Result<EffectType> {
    let mut input = bytes;
    read_header(&mut input)
}

/// Serialize a bare settings snapshot.
pub fn encode_snapshot(snapshot: &SettingsSnapshot) -> Vec<u8> {
    let mut out = Vec::new();
    write_header(&mut out, snapshot.effect_type());
    write_settings(&mut out, snapshot);
    out
}

/// Inverse of [`encode_snapshot`].
pub fn decode_snapshot(bytes: &[u8]) -> Result<SettingsSnapshot> {
    let mut input = bytes;
    let effect = read_header(&mut input)?;
    let snapshot = read_settings(&mut input, effect)?;
    finish(input)?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonebridge_core::{EqualizerSettings, PresetSelection};

    fn custom_eq() -> SettingsSnapshot {
        SettingsSnapshot::Equalizer(EqualizerSettings::new(
            PresetSelection::Custom,
            vec![300, -200, 0, 150, 1500],
        ))
    }

    #[test]
    fn test_snapshot_layout() {
        let bytes = encode_snapshot(&custom_eq());
        let text = custom_eq().to_string();

        assert_eq!(bytes[0], FORMAT_VERSION);
        assert_eq!(bytes[1], EffectType::Equalizer.wire_tag());
        assert_eq!(&bytes[2..6], &(text.len() as u32).to_le_bytes());
        assert_eq!(&bytes[6..], text.as_bytes());
    }

    #[test]
    fn test_custom_sentinel_survives() {
        let decoded = decode_snapshot(&encode_snapshot(&custom_eq())).unwrap();
        assert_eq!(decoded, custom_eq());
        assert_eq!(
            decoded.as_equalizer().map(|eq| eq.cur_preset()),
            Some(PresetSelection::Custom)
        );
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut bytes = encode_snapshot(&custom_eq());
        bytes[0] = 2;
        assert_eq!(decode_snapshot(&bytes), Err(StateError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let mut bytes = encode_snapshot(&custom_eq());
        bytes[1] = 0xee;
        assert_eq!(decode_snapshot(&bytes), Err(StateError::UnknownEffectTag(0xee)));
    }

    #[test]
    fn test_truncated_and_trailing() {
        let bytes = encode_snapshot(&custom_eq());
        assert!(matches!(
            decode_snapshot(&bytes[..bytes.len() - 1]),
            Err(StateError::Truncated { .. })
        ));
        assert!(matches!(decode_snapshot(&bytes[..1]), Err(StateError::Truncated { .. })));

        let mut padded = bytes.clone();
        padded.push(0);
        assert_eq!(decode_snapshot(&padded), Err(StateError::TrailingBytes(1)));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut bytes = vec![FORMAT_VERSION, EffectType::PreAmp.wire_tag()];
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[0xff, 0xfe]);
        assert_eq!(decode_snapshot(&bytes), Err(StateError::InvalidUtf8));
    }

    #[test]
    fn test_peek_effect() {
        let bytes = encode_snapshot(&custom_eq());
        assert_eq!(peek_effect(&bytes), Ok(EffectType::Equalizer));
        assert!(peek_effect(&[]).is_err());
    }
}
