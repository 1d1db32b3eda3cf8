use anyhow::{Context, Result};
use burn::prelude::Backend;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::{canvas::Canvas, labels, model::MathNet};

const WINDOW_TITLE: &str = "Symbol Recognition";
const PROMPT: &str = "Draw a symbol and press Predict";

const BUTTON_STRIP_HEIGHT: usize = 40;
const STRIP_COLOR: u32 = 0xe0e0e0;
const BUTTON_TEXT_COLOR: u32 = 0x202020;
const CLEAR_FILL: u32 = 0xc8c8c8;
const PREDICT_FILL: u32 = 0xa8d0a8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonHit {
    Clear,
    Predict,
}

/// Binds pointer and button events to the drawing surface and the
/// classifier, and mirrors the bitmap into the window every frame.
pub struct App<B: Backend> {
    window: Window,
    buffer: Vec<u32>,
    canvas: Canvas,
    model: MathNet<B>,
    device: B::Device,
    input_size: u32,
    width: usize,
    height: usize,
    last_point: Option<(f32, f32)>,
    press_on_canvas: bool,
    was_down: bool,
}

impl<B: Backend> App<B> {
    pub fn new(
        canvas: Canvas,
        model: MathNet<B>,
        device: B::Device,
        input_size: u32,
    ) -> Result<Self> {
        let width = canvas.size() as usize;
        let height = width + BUTTON_STRIP_HEIGHT;

        let mut window = Window::new(WINDOW_TITLE, width, height, WindowOptions::default())
            .context("creating the application window")?;
        window.set_target_fps(60);
        window.set_title(&format!("{WINDOW_TITLE} | {PROMPT}"));

        Ok(Self {
            window,
            buffer: vec![0; width * height],
            canvas,
            model,
            device,
            input_size,
            width,
            height,
            last_point: None,
            press_on_canvas: false,
            was_down: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        while self.window.is_open() && !self.window.is_key_down(Key::Escape) {
            let pressed = self.window.get_mouse_down(MouseButton::Left);
            let pos = self.window.get_mouse_pos(MouseMode::Discard);

            let (pen, origin, segment) = pointer_step(
                self.last_point,
                self.press_on_canvas,
                self.was_down,
                pos,
                pressed,
                self.canvas.size() as f32,
            );
            self.last_point = pen;
            self.press_on_canvas = origin;
            if let Some((from, to)) = segment {
                self.canvas.append_stroke(from, to);
            }

            let clicked = pressed && !self.was_down;
            self.was_down = pressed;
            if clicked {
                if let Some((x, y)) = pos {
                    match button_at(x, y, self.width, self.canvas.size() as usize) {
                        Some(ButtonHit::Clear) => self.clear(),
                        Some(ButtonHit::Predict) => self.predict()?,
                        None => {}
                    }
                }
            }

            if self.window.is_key_pressed(Key::C, KeyRepeat::No) {
                self.clear();
            }
            if self.window.is_key_pressed(Key::P, KeyRepeat::No) {
                self.predict()?;
            }

            self.redraw();
            self.window
                .update_with_buffer(&self.buffer, self.width, self.height)
                .context("presenting frame")?;
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.canvas.clear();
        self.window.set_title(&format!("{WINDOW_TITLE} | {PROMPT}"));
    }

    fn predict(&mut self) -> Result<()> {
        let input = self.canvas.prepare::<B>(self.input_size, &self.device);
        let index = self.model.infer(input);
        let label = labels::label_of(index)?;

        println!("Predicted: {label}");
        self.window
            .set_title(&format!("{WINDOW_TITLE} | Predicted: {label}"));
        Ok(())
    }

    fn redraw(&mut self) {
        let canvas_size = self.canvas.size() as usize;

        // Canvas region mirrors the bitmap, packed as 0xRRGGBB.
        for (y, row) in self.canvas.image().rows().enumerate() {
            for (x, pixel) in row.enumerate() {
                let [r, g, b] = pixel.0;
                self.buffer[y * self.width + x] =
                    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32);
            }
        }

        // Button strip.
        let half = self.width / 2;
        for y in canvas_size..self.height {
            for x in 0..self.width {
                let fill = if x < half { CLEAR_FILL } else { PREDICT_FILL };
                self.buffer[y * self.width + x] = fill;
            }
        }
        for x in 0..self.width {
            self.buffer[canvas_size * self.width + x] = STRIP_COLOR;
        }

        let text_y = canvas_size + (BUTTON_STRIP_HEIGHT - 10) / 2;
        draw_text(
            &mut self.buffer,
            self.width,
            (half / 2).saturating_sub(text_width("CLEAR") / 2),
            text_y,
            "CLEAR",
            BUTTON_TEXT_COLOR,
        );
        draw_text(
            &mut self.buffer,
            self.width,
            half + (half / 2).saturating_sub(text_width("PREDICT") / 2),
            text_y,
            "PREDICT",
            BUTTON_TEXT_COLOR,
        );
    }
}

/// One frame of pointer handling. The press origin is latched at the press
/// edge, so a drag that began on the button strip never paints even after
/// the pointer moves over the canvas. Returns the new pen anchor, the
/// origin latch, and the segment to rasterize, if any.
pub fn pointer_step(
    pen: Option<(f32, f32)>,
    origin_on_canvas: bool,
    was_down: bool,
    pos: Option<(f32, f32)>,
    pressed: bool,
    canvas_size: f32,
) -> (Option<(f32, f32)>, bool, Option<((f32, f32), (f32, f32))>) {
    let origin = if pressed && !was_down {
        matches!(pos, Some(p) if p.1 < canvas_size)
    } else {
        pressed && origin_on_canvas
    };
    let (pen, segment) = pen_transition(pen, pos, pressed && origin, canvas_size);
    (pen, origin, segment)
}

/// One pointer event step. Returns the new pen anchor and the segment to
/// rasterize, if any. Dragging into the button strip lifts the pen.
pub fn pen_transition(
    last: Option<(f32, f32)>,
    pos: Option<(f32, f32)>,
    pressed: bool,
    canvas_size: f32,
) -> (Option<(f32, f32)>, Option<((f32, f32), (f32, f32))>) {
    if !pressed {
        return (None, None);
    }
    match pos {
        Some(p) if p.1 < canvas_size => match last {
            Some(anchor) => (Some(p), Some((anchor, p))),
            None => (Some(p), None),
        },
        _ => (None, None),
    }
}

/// Hit test for the button strip below the canvas.
pub fn button_at(x: f32, y: f32, width: usize, canvas_size: usize) -> Option<ButtonHit> {
    if y < canvas_size as f32 || x < 0.0 || x >= width as f32 {
        return None;
    }
    if x < (width / 2) as f32 {
        Some(ButtonHit::Clear)
    } else {
        Some(ButtonHit::Predict)
    }
}

const GLYPH_SCALE: usize = 2;

fn text_width(text: &str) -> usize {
    text.len() * 4 * GLYPH_SCALE
}

fn draw_text(buffer: &mut [u32], width: usize, x_offset: usize, y_offset: usize, text: &str, color: u32) {
    for (i, c) in text.chars().enumerate() {
        draw_glyph(buffer, width, x_offset + i * 4 * GLYPH_SCALE, y_offset, c, color);
    }
}

fn draw_glyph(buffer: &mut [u32], width: usize, x_offset: usize, y_offset: usize, c: char, color: u32) {
    let pattern: [u8; 5] = match c {
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        _ => return,
    };

    for (y, row) in pattern.iter().enumerate() {
        for x in 0..3 {
            if ((row >> (2 - x)) & 1) == 1 {
                for sy in 0..GLYPH_SCALE {
                    for sx in 0..GLYPH_SCALE {
                        let px = x_offset + x * GLYPH_SCALE + sx;
                        let py = y_offset + y * GLYPH_SCALE + sy;
                        let index = py * width + px;
                        if px < width && index < buffer.len() {
                            buffer[index] = color;
                        }
                    }
                }
            }
        }
    }
}
