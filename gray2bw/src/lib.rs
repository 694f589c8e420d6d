use image::{
    imageops::{self, BiLevel, FilterType},
    DynamicImage, GrayImage, Luma, Rgb, Rgba,
};
use imageproc::map::map_colors;

/// Convert an image to 8-bit grayscale with ITU-R 601 weights.
///
/// Transparent images are flattened onto white first, so a fully transparent
/// pixel ends up as 255 regardless of its color channels.
pub fn to_gray(image: DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray,
        image if image.color().has_alpha() => {
            map_colors(&image.into_rgba8(), |p| luma(over_white(p)))
        }
        image => map_colors(&image.into_rgb8(), luma),
    }
}

/// Resize to exactly `width`x`height` and dither down to Black and White.
///
/// The result is still 8bpp, but only uses the values 0 and 255.
pub fn to_bw(image: &GrayImage, width: u32, height: u32) -> GrayImage {
    let mut image = imageops::resize(image, width, height, FilterType::Lanczos3);
    imageops::dither(&mut image, &BiLevel);
    image
}

/// Encode a Black and White image as a 1-bit grayscale PNG.
///
/// Anything brighter than mid-gray is written as white.
pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>, png::EncodingError> {
    let packed = image
        .rows()
        .flat_map(|row| {
            row.collect::<Vec<_>>()
                .chunks(8)
                .map(pack_white)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, image.width(), image.height());
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::One);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&packed)?;
        writer.finish()?;
    }
    Ok(bytes)
}

/// Pack up to 8 pixels MSB first, white as 1.
fn pack_white(pixels: &[&Luma<u8>]) -> u8 {
    pixels
        .iter()
        .enumerate()
        .filter(|&(_, p)| p.0[0] > 127)
        .fold(0, |byte, (i, _)| byte | 0x80 >> i)
}

fn luma(pixel: Rgb<u8>) -> Luma<u8> {
    let [r, g, b] = pixel.0.map(u32::from);
    Luma([((299 * r + 587 * g + 114 * b + 500) / 1000) as u8])
}

fn over_white(pixel: Rgba<u8>) -> Rgb<u8> {
    let [r, g, b, a] = pixel.0;
    Rgb([blend(r, a), blend(g, a), blend(b, a)])
}

/// Composite a single channel with coverage `alpha` over full intensity.
fn blend(value: u8, alpha: u8) -> u8 {
    let (value, alpha) = (u32::from(value), u32::from(alpha));
    ((value * alpha + u32::from(u8::MAX) * (255 - alpha) + 127) / 255) as u8
}
