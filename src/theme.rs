//! Theming and color definitions.
//!
//! Colors are looked up by [`ColorRole`], a closed set of semantic roles.
//! Every built-in palette is defined by an exhaustive `match`, so adding a
//! role without giving it a color in each palette fails to compile.

use serde::Serialize;

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Build a color from a `0xRRGGBB` literal.
    pub const fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Light or dark palette selection.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Semantic color roles used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Background,
    Normal,
    Header,
    Code,
    Bold,
    Italic,
    Link,
    CodeBackground,
    TableBorder,
    TableHeaderBackground,
    TableAltBackground,
    Warning,
    BlockquoteBar,
    BlockquoteBackground,
    Scrollbar,
    ScrollbarThumb,
    SearchHighlight,
    SearchMark,
    TaskDone,
    Strikethrough,
    BookmarkMark,
}

impl ColorRole {
    pub const ALL: [Self; 21] = [
        Self::Background,
        Self::Normal,
        Self::Header,
        Self::Code,
        Self::Bold,
        Self::Italic,
        Self::Link,
        Self::CodeBackground,
        Self::TableBorder,
        Self::TableHeaderBackground,
        Self::TableAltBackground,
        Self::Warning,
        Self::BlockquoteBar,
        Self::BlockquoteBackground,
        Self::Scrollbar,
        Self::ScrollbarThumb,
        Self::SearchHighlight,
        Self::SearchMark,
        Self::TaskDone,
        Self::Strikethrough,
        Self::BookmarkMark,
    ];
}

/// An active color table keyed by [`ColorRole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    mode: ThemeMode,
    colors: [Rgb; ColorRole::ALL.len()],
}

impl Palette {
    pub fn light() -> Self {
        Self::from_fn(ThemeMode::Light, light_color)
    }

    pub fn dark() -> Self {
        Self::from_fn(ThemeMode::Dark, dark_color)
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }

    /// Build a palette from a role mapping, e.g. for a custom theme.
    pub fn from_fn(mode: ThemeMode, color: impl Fn(ColorRole) -> Rgb) -> Self {
        Self {
            mode,
            colors: ColorRole::ALL.map(color),
        }
    }

    pub const fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub const fn get(&self, role: ColorRole) -> Rgb {
        self.colors[role as usize]
    }

    /// Override a single role.
    pub const fn set(&mut self, role: ColorRole, color: Rgb) {
        self.colors[role as usize] = color;
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::light()
    }
}

const fn light_color(role: ColorRole) -> Rgb {
    Rgb::hex(match role {
        ColorRole::Background => 0xFF_FFFF,
        ColorRole::Normal | ColorRole::Bold => 0x00_0000,
        ColorRole::Header => 0x00_0080,
        ColorRole::Code => 0x00_6400,
        ColorRole::Italic => 0x40_4040,
        ColorRole::Link => 0x00_00CC,
        ColorRole::CodeBackground | ColorRole::TableHeaderBackground => 0xE8_E8E8,
        ColorRole::TableBorder => 0xAA_AAAA,
        ColorRole::TableAltBackground => 0xF4_F4F4,
        ColorRole::Warning => 0xCC_6600,
        ColorRole::BlockquoteBar | ColorRole::Strikethrough => 0x80_8080,
        ColorRole::BlockquoteBackground => 0xF0_F0F0,
        ColorRole::Scrollbar => 0xDD_DDDD,
        ColorRole::ScrollbarThumb => 0x88_8888,
        ColorRole::SearchHighlight => 0xFF_FF00,
        ColorRole::SearchMark => 0xE0_A000,
        ColorRole::TaskDone => 0x00_8000,
        ColorRole::BookmarkMark => 0xF8_0000,
    })
}

const fn dark_color(role: ColorRole) -> Rgb {
    Rgb::hex(match role {
        ColorRole::Background => 0x1E_1E1E,
        ColorRole::Normal | ColorRole::Bold => 0xD4_D4D4,
        ColorRole::Header | ColorRole::BlockquoteBar => 0x56_9CD6,
        ColorRole::Code | ColorRole::TaskDone => 0x6A_9955,
        ColorRole::Italic => 0x9C_DCFE,
        ColorRole::Link => 0x4E_C9B0,
        ColorRole::CodeBackground => 0x2D_2D2D,
        ColorRole::TableBorder => 0x40_4040,
        ColorRole::TableHeaderBackground | ColorRole::Scrollbar => 0x33_3333,
        ColorRole::TableAltBackground | ColorRole::BlockquoteBackground => 0x25_2525,
        ColorRole::Warning => 0xCE_9178,
        ColorRole::ScrollbarThumb => 0x66_6666,
        ColorRole::SearchHighlight => 0x61_3214,
        ColorRole::SearchMark => 0xD7_BA7D,
        ColorRole::Strikethrough => 0x80_8080,
        ColorRole::BookmarkMark => 0xF8_0000,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_roles_index_their_own_slot() {
        for (i, role) in ColorRole::ALL.iter().enumerate() {
            assert_eq!(*role as usize, i, "{role:?} out of order in ColorRole::ALL");
        }
    }

    #[test]
    fn test_light_and_dark_backgrounds_differ() {
        assert_ne!(
            Palette::light().get(ColorRole::Background),
            Palette::dark().get(ColorRole::Background)
        );
    }

    #[test]
    fn test_hex_round_trips_components() {
        let color = Rgb::hex(0x12_3456);
        assert_eq!((color.r, color.g, color.b), (0x12, 0x34, 0x56));
        assert_eq!(color.to_hex(), 0x12_3456);
    }

    #[test]
    fn test_set_overrides_single_role() {
        let mut palette = Palette::light();
        palette.set(ColorRole::Link, Rgb::hex(0xAB_CDEF));
        assert_eq!(palette.get(ColorRole::Link), Rgb::hex(0xAB_CDEF));
        assert_eq!(palette.get(ColorRole::Normal), Palette::light().get(ColorRole::Normal));
    }

    #[test]
    fn test_toggled_flips_mode() {
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(Palette::for_mode(ThemeMode::Dark).mode(), ThemeMode::Dark);
    }
}
