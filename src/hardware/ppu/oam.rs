//! Object Attribute Memory: the 40-entry sprite table and the per-scanline
//! scan that selects up to 10 of them for rendering.

use crate::hardware::ppu::register_flags::AttributeFlags;

pub const OAM_ENTRY_COUNT: usize = 40;
pub const MAX_SPRITES_PER_LINE: usize = 10;

#[derive(Debug, Default, Copy, Clone)]
pub struct SpriteAttribute {
    pub y_pos: u8,
    pub x_pos: u8,
    pub tile_number: u8,
    pub flags: AttributeFlags,
}

impl SpriteAttribute {
    pub fn get_byte(&self, offset: u8) -> u8 {
        match offset {
            0 => self.y_pos,
            1 => self.x_pos,
            2 => self.tile_number,
            _ => self.flags.bits(),
        }
    }

    pub fn set_byte(&mut self, offset: u8, value: u8) {
        match offset {
            0 => self.y_pos = value,
            1 => self.x_pos = value,
            2 => self.tile_number = value,
            _ => self.flags = AttributeFlags::from_bits_truncate(value),
        }
    }

    /// True if this sprite's vertical range covers scanline `ly`, per
    /// `obj.y <= ly + 16 < obj.y + height`.
    pub fn on_scanline(&self, ly: u8, height: u8) -> bool {
        let top = self.y_pos as i16;
        let line = ly as i16 + 16;
        line >= top && line < top + height as i16
    }
}

/// Scans all 40 OAM entries for the given scanline, returning at most
/// [`MAX_SPRITES_PER_LINE`] OAM indices, in OAM order (the order in which the
/// fetcher should consider them when two sprites tie on X).
pub fn scan_line(oam: &[SpriteAttribute; OAM_ENTRY_COUNT], ly: u8, obj_height: u8) -> Vec<usize> {
    oam.iter()
        .enumerate()
        .filter(|(_, sprite)| sprite.on_scanline(ly, obj_height))
        .map(|(index, _)| index)
        .take(MAX_SPRITES_PER_LINE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprite_at_y16_covers_scanline_zero() {
        let sprite = SpriteAttribute {
            y_pos: 16,
            ..Default::default()
        };
        assert!(sprite.on_scanline(0, 8));
        assert!(!sprite.on_scanline(8, 8));
    }

    #[test]
    fn scan_caps_at_ten_sprites() {
        let mut oam = [SpriteAttribute::default(); OAM_ENTRY_COUNT];
        for sprite in oam.iter_mut() {
            sprite.y_pos = 16;
        }
        assert_eq!(scan_line(&oam, 0, 8).len(), MAX_SPRITES_PER_LINE);
    }
}
