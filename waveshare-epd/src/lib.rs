#[cfg(feature = "epd_4in2")]
pub mod epd_4in2;
mod error;

pub use error::{EpdError as Error, Result};

/// Meaning of a set bit in a packed frame buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Polarity {
    /// 1 is white and 0 is ink, as the controllers' black RAM expects.
    #[default]
    WhiteIsOne,
    /// Inverted: 1 is ink.
    BlackIsOne,
}
impl Polarity {
    pub fn inverted(invert: bool) -> Self {
        if invert {
            Self::BlackIsOne
        } else {
            Self::WhiteIsOne
        }
    }

    /// Bit value for a pixel; anything brighter than mid-gray is white.
    pub fn bit(self, luma: u8) -> bool {
        let white = luma > 127;
        match self {
            Self::WhiteIsOne => white,
            Self::BlackIsOne => !white,
        }
    }
}
