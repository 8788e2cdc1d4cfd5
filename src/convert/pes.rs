//! Minimal decoder for the PEC stitch section of Brother PES files.
//!
//! A `.pes` file carries a vendor header followed by an embedded PEC
//! block; the header stores the block's byte offset at position 8. The
//! stitch data itself starts 532 bytes into the PEC block and encodes
//! relative movements in one- or two-byte deltas, with flag bits for
//! jumps and trims and dedicated byte pairs for color change and end.

use crate::error::ConvertError;

/// What a decoded stitch entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StitchCommand {
    /// A normal stitch: the needle moved while sewing.
    Stitch,
    /// Movement without sewing.
    Jump,
    /// Thread cut; the next stitch starts a new run.
    Trim,
    /// Switch to the next thread color.
    ColorChange,
}

/// One decoded stitch with absolute coordinates in PEC units (0.1mm).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stitch {
    pub x: i32,
    pub y: i32,
    pub command: StitchCommand,
}

/// A fully decoded stitch program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub stitches: Vec<Stitch>,
}

impl Pattern {
    /// Bounding box over every coordinate, `(min_x, min_y, max_x, max_y)`.
    /// `None` when there are no stitches at all.
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.stitches.first()?;
        let mut bounds = (first.x, first.y, first.x, first.y);
        for s in &self.stitches {
            bounds.0 = bounds.0.min(s.x);
            bounds.1 = bounds.1.min(s.y);
            bounds.2 = bounds.2.max(s.x);
            bounds.3 = bounds.3.max(s.y);
        }
        Some(bounds)
    }
}

/// Offset of the stitch bytes relative to the start of the PEC block.
const PEC_STITCH_OFFSET: usize = 532;

/// Decode a PES (or bare PEC) byte buffer into a [`Pattern`].
pub fn parse_pes(data: &[u8]) -> Result<Pattern, ConvertError> {
    if data.len() < 12 {
        return Err(ConvertError::Truncated(data.len()));
    }
    let pec_start = match &data[0..4] {
        b"#PES" => {
            u32::from_le_bytes([data[8], data[9], data[10], data[11]]) as usize
        }
        // Standalone .pec files start with "#PEC0001" followed directly
        // by the PEC block.
        b"#PEC" => 8,
        _ => return Err(ConvertError::BadMagic),
    };

    let pattern = parse_pec_block(data, pec_start)?;

    if !pattern
        .stitches
        .iter()
        .any(|s| s.command == StitchCommand::Stitch)
    {
        return Err(ConvertError::EmptyDesign);
    }
    Ok(pattern)
}

fn parse_pec_block(data: &[u8], pec_start: usize) -> Result<Pattern, ConvertError> {
    let mut pos = pec_start
        .checked_add(PEC_STITCH_OFFSET)
        .ok_or(ConvertError::Truncated(data.len()))?;
    if pos >= data.len() {
        return Err(ConvertError::Truncated(data.len()));
    }

    let mut stitches = Vec::new();
    let mut x = 0i32;
    let mut y = 0i32;

    loop {
        let b1 = *data.get(pos).ok_or(ConvertError::Truncated(pos))?;
        let b2 = *data.get(pos + 1).ok_or(ConvertError::Truncated(pos + 1))?;

        // End of stitch stream.
        if b1 == 0xFF && b2 == 0x00 {
            break;
        }
        // Color change is a three-byte sequence; the third byte selects
        // the palette entry and is irrelevant for rendering order.
        if b1 == 0xFE && b2 == 0xB0 {
            pos += 3;
            stitches.push(Stitch {
                x,
                y,
                command: StitchCommand::ColorChange,
            });
            continue;
        }

        let mut jump = false;
        let mut trim = false;
        let (dx, used) = decode_delta(data, pos, &mut jump, &mut trim)?;
        pos += used;
        let (dy, used) = decode_delta(data, pos, &mut jump, &mut trim)?;
        pos += used;

        x += dx;
        y += dy;

        let command = if trim {
            StitchCommand::Trim
        } else if jump {
            StitchCommand::Jump
        } else {
            StitchCommand::Stitch
        };
        stitches.push(Stitch { x, y, command });
    }

    Ok(Pattern { stitches })
}

/// One axis delta. Short form is a single byte with a 7-bit signed value;
/// long form (high bit set) spreads a 12-bit signed value over two bytes
/// and carries the jump/trim flags in bits 4 and 5.
fn decode_delta(
    data: &[u8],
    pos: usize,
    jump: &mut bool,
    trim: &mut bool,
) -> Result<(i32, usize), ConvertError> {
    let b = *data.get(pos).ok_or(ConvertError::Truncated(pos))?;
    if b & 0x80 != 0 {
        if b & 0x20 != 0 {
            *trim = true;
        }
        if b & 0x10 != 0 {
            *jump = true;
        }
        let b2 = *data.get(pos + 1).ok_or(ConvertError::Truncated(pos + 1))?;
        let mut val = (((b as i32) & 0x0F) << 8) | b2 as i32;
        if val & 0x800 != 0 {
            val -= 0x1000;
        }
        Ok((val, 2))
    } else {
        let mut val = b as i32;
        if val > 63 {
            val -= 128;
        }
        Ok((val, 1))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{synthetic_pes, synthetic_pes_raw};
    use super::*;

    #[test]
    fn parses_short_form_stitches() {
        let data = synthetic_pes(&[(10, 0), (10, 10), (0, 10)]);
        let pattern = parse_pes(&data).unwrap();
        assert_eq!(pattern.stitches.len(), 3);
        assert_eq!(pattern.stitches[0], Stitch { x: 10, y: 0, command: StitchCommand::Stitch });
        assert_eq!(pattern.stitches[1], Stitch { x: 10, y: 10, command: StitchCommand::Stitch });
        assert_eq!(pattern.stitches[2], Stitch { x: 0, y: 10, command: StitchCommand::Stitch });
    }

    #[test]
    fn parses_negative_deltas() {
        let data = synthetic_pes(&[(-5, -7), (-5, -7 + 3)]);
        let pattern = parse_pes(&data).unwrap();
        assert_eq!(pattern.stitches[0].x, -5);
        assert_eq!(pattern.stitches[0].y, -7);
        assert_eq!(pattern.stitches[1].y, -4);
    }

    #[test]
    fn parses_long_form_jump() {
        // Long form: 0x80 | jump flag 0x10 | high nibble, then low byte.
        // dx = 0x100 = 256 with jump, dy = 1 short form. Then one normal
        // stitch so the design is not considered empty.
        let stitch_bytes = [0x91, 0x00, 0x01, 0x05, 0x05, 0xFF, 0x00];
        let data = synthetic_pes_raw(&stitch_bytes);
        let pattern = parse_pes(&data).unwrap();
        assert_eq!(pattern.stitches[0], Stitch { x: 256, y: 1, command: StitchCommand::Jump });
        assert_eq!(pattern.stitches[1], Stitch { x: 261, y: 6, command: StitchCommand::Stitch });
    }

    #[test]
    fn parses_long_form_negative_value() {
        // 12-bit value 0xF00 sign-extends to -256.
        let stitch_bytes = [0x8F, 0x00, 0x02, 0x03, 0x03, 0xFF, 0x00];
        let data = synthetic_pes_raw(&stitch_bytes);
        let pattern = parse_pes(&data).unwrap();
        assert_eq!(pattern.stitches[0].x, -256);
        assert_eq!(pattern.stitches[0].y, 2);
    }

    #[test]
    fn parses_color_change() {
        let stitch_bytes = [0x05, 0x05, 0xFE, 0xB0, 0x01, 0x05, 0x05, 0xFF, 0x00];
        let data = synthetic_pes_raw(&stitch_bytes);
        let pattern = parse_pes(&data).unwrap();
        assert_eq!(pattern.stitches.len(), 3);
        assert_eq!(pattern.stitches[1].command, StitchCommand::ColorChange);
        // Color change does not move the needle.
        assert_eq!((pattern.stitches[1].x, pattern.stitches[1].y), (5, 5));
        assert_eq!((pattern.stitches[2].x, pattern.stitches[2].y), (10, 10));
    }

    #[test]
    fn rejects_bad_magic() {
        assert!(matches!(
            parse_pes(b"GIF89a whatever this is"),
            Err(ConvertError::BadMagic)
        ));
    }

    #[test]
    fn rejects_truncated_buffers() {
        assert!(matches!(parse_pes(b"#PES"), Err(ConvertError::Truncated(_))));

        // Header points at a PEC block that is not there.
        let mut data = Vec::new();
        data.extend_from_slice(b"#PES0001");
        data.extend_from_slice(&12u32.to_le_bytes());
        assert!(matches!(parse_pes(&data), Err(ConvertError::Truncated(_))));

        // Stitch stream without a terminator.
        let data = synthetic_pes_raw(&[0x05, 0x05]);
        assert!(matches!(parse_pes(&data), Err(ConvertError::Truncated(_))));
    }

    #[test]
    fn rejects_empty_design() {
        // Terminator only — no stitches.
        let data = synthetic_pes_raw(&[0xFF, 0x00]);
        assert!(matches!(parse_pes(&data), Err(ConvertError::EmptyDesign)));

        // Jumps only, never an actual stitch.
        let jump_only = [0x91, 0x00, 0x01, 0xFF, 0x00];
        let data = synthetic_pes_raw(&jump_only);
        assert!(matches!(parse_pes(&data), Err(ConvertError::EmptyDesign)));
    }

    #[test]
    fn bounds_cover_all_coordinates() {
        let data = synthetic_pes(&[(10, 0), (10, 10), (-5, 10)]);
        let pattern = parse_pes(&data).unwrap();
        assert_eq!(pattern.bounds(), Some((-5, 0, 10, 10)));
    }
}
