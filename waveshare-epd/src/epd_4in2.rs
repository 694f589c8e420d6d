//! 4.2" black and white

use crate::error::EpdError;
use crate::{Polarity, Result};
use log::{debug, warn};

pub const EPD_WIDTH: usize = 400;
pub const EPD_HEIGHT: usize = 300;
pub const EPD_BUFFER_SIZE: usize = EPD_WIDTH * EPD_HEIGHT / 8;

type BwImage = image::GrayImage;

/// Pack a Black and White image into the panel's frame buffer.
///
/// Rows are packed left to right, most significant bit first.
pub fn pack_buffer(image: &BwImage, polarity: Polarity) -> Result<[u8; EPD_BUFFER_SIZE]> {
    let expected = (EPD_WIDTH as u32, EPD_HEIGHT as u32);
    if image.dimensions() != expected {
        warn!("Unsupported image size {:?}", image.dimensions());
        return Err(EpdError::Size {
            expected,
            actual: image.dimensions(),
        });
    }
    let buf = image
        .as_raw()
        .chunks(image.width() as usize)
        .flat_map(|row| row.chunks(8))
        .map(|pixels| pack_byte(pixels, polarity))
        .collect::<Vec<_>>();
    debug!("Packed {} bytes ({:?})", buf.len(), polarity);
    buf.try_into().map_err(|buf: Vec<u8>| EpdError::BufferSize {
        expected: EPD_BUFFER_SIZE,
        actual: buf.len(),
    })
}

fn pack_byte(pixels: &[u8], polarity: Polarity) -> u8 {
    pixels
        .iter()
        .enumerate()
        .filter(|&(_, &luma)| polarity.bit(luma))
        .fold(0, |byte, (i, _)| byte | 0x80 >> i)
}
