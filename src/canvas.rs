use burn::{
    prelude::Backend,
    tensor::{Device, Tensor, TensorData},
};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// The in-memory bitmap mirroring the user's pen strokes. One instance per
/// session; `clear` rewrites it rather than replacing it.
pub struct Canvas {
    image: RgbImage,
    size: u32,
    stroke_width: u32,
    threshold: u8,
}

impl Canvas {
    pub fn new(size: u32, stroke_width: u32, threshold: u8) -> Self {
        Self {
            image: RgbImage::from_pixel(size, size, BACKGROUND),
            size,
            stroke_width,
            threshold,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Draws a straight pen segment between two points. Coordinates outside
    /// the bitmap clip silently.
    pub fn append_stroke(&mut self, from: (f32, f32), to: (f32, f32)) {
        for dy in 0..self.stroke_width {
            for dx in 0..self.stroke_width {
                let offset = (dx as f32, dy as f32);
                draw_line_segment_mut(
                    &mut self.image,
                    (from.0 + offset.0, from.1 + offset.1),
                    (to.0 + offset.0, to.1 + offset.1),
                    INK,
                );
            }
        }
    }

    /// Resets the bitmap to the uniform background. Idempotent.
    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = BACKGROUND;
        }
    }

    /// Derives the network input from the current drawing: grayscale,
    /// binarize, resize to `input_size`, scale to [0, 1] and add the batch
    /// and channel dimensions. Does not mutate the bitmap.
    pub fn prepare<B: Backend>(&self, input_size: u32, device: &Device<B>) -> Tensor<B, 4> {
        let gray = DynamicImage::ImageRgb8(self.image.clone()).to_luma8();
        let binary = binarize(&gray, self.threshold);
        let resized = DynamicImage::ImageLuma8(binary)
            .resize_exact(input_size, input_size, image::imageops::FilterType::Nearest)
            .to_luma8();

        let scaled: Vec<f32> = resized
            .into_raw()
            .iter()
            .map(|&p| (p as f32) / 255.0)
            .collect();
        let data = TensorData::from(scaled.as_slice());
        let tensor: Tensor<B, 1> = Tensor::from_data(data, device);

        tensor.reshape([1, 1, input_size as usize, input_size as usize])
    }
}

/// Hard two-level quantization: intensity above the threshold becomes white,
/// everything else black. Stable on already-binarized pixels.
pub fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        *pixel = if pixel.0[0] > threshold {
            Luma([255])
        } else {
            Luma([0])
        };
    }
    out
}
