//! Encoded fixtures shared by the unit tests.

use std::io::Cursor;

use image::codecs::gif::GifEncoder;
use image::codecs::webp::WebPEncoder;
use image::{
    ColorType, Delay, DynamicImage, Frame, ImageEncoder, ImageOutputFormat, Rgba, RgbaImage,
};

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image).write_to(&mut out, ImageOutputFormat::Png).unwrap();
    out.into_inner()
}

fn shaded(width: u32, height: u32, index: usize) -> RgbaImage {
    let shade = (index * 60 % 256) as u8;
    RgbaImage::from_pixel(width, height, Rgba([shade, 255 - shade, 0, 255]))
}

pub fn gif_bytes(width: u32, height: u32, frames: usize, delay_ms: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        let frames = (0..frames).map(|index| {
            let delay = Delay::from_numer_denom_ms(delay_ms, 1);
            Frame::from_parts(shaded(width, height, index), 0, 0, delay)
        });
        encoder.encode_frames(frames).unwrap();
    }
    out
}

pub fn apng_bytes(width: u32, height: u32, frames: u32, delay_ms: u16) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_animated(frames, 0).unwrap();
        encoder.set_frame_delay(delay_ms, 1000).unwrap();
        let mut writer = encoder.write_header().unwrap();
        for index in 0..frames {
            writer.write_image_data(shaded(width, height, index as usize).as_raw()).unwrap();
        }
        writer.finish().unwrap();
    }
    out
}

/// Animated WebP assembled from lossless still frames, each covering the whole canvas.
pub fn webp_animation_bytes(width: u32, height: u32, frames: usize, delay_ms: u32) -> Vec<u8> {
    fn chunk(out: &mut Vec<u8>, fourcc: &[u8; 4], data: &[u8]) {
        out.extend_from_slice(fourcc);
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        if data.len() % 2 == 1 {
            out.push(0);
        }
    }

    fn u24(out: &mut Vec<u8>, value: u32) {
        out.extend_from_slice(&value.to_le_bytes()[..3]);
    }

    let mut body = b"WEBP".to_vec();

    let mut header = vec![0b0000_0010, 0, 0, 0];
    u24(&mut header, width - 1);
    u24(&mut header, height - 1);
    chunk(&mut body, b"VP8X", &header);

    // Transparent background, loop forever.
    chunk(&mut body, b"ANIM", &[0, 0, 0, 0, 0, 0]);

    for index in 0..frames {
        let image = shaded(width, height, index);
        let mut still = Vec::new();
        WebPEncoder::new_lossless(&mut still)
            .write_image(image.as_raw(), width, height, ColorType::Rgba8)
            .unwrap();

        let mut frame = Vec::new();
        u24(&mut frame, 0);
        u24(&mut frame, 0);
        u24(&mut frame, width - 1);
        u24(&mut frame, height - 1);
        u24(&mut frame, delay_ms);
        // No blending, no disposal.
        frame.push(0b0000_0010);
        // Strip the RIFF header, keeping the padded VP8L chunk.
        frame.extend_from_slice(&still[12..]);
        chunk(&mut body, b"ANMF", &frame);
    }

    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}
