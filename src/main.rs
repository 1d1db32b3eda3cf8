use std::{env, path::PathBuf};

use anyhow::Result;
use burn::backend::{ndarray::NdArrayDevice, NdArray};

use app::App;
use canvas::Canvas;
use model::MathNet;

mod app;
mod canvas;
mod error;
mod labels;
mod model;

type B = NdArray<f32>;

const CANVAS_SIZE: u32 = 200;
const INPUT_SIZE: u32 = 45;
const STROKE_WIDTH: u32 = 2;
const BINARIZE_THRESHOLD: u8 = 128;
const DEFAULT_WEIGHTS: &str = "math_net_with_weights_6.pth";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let weights = PathBuf::from(args.get(1).map(String::as_str).unwrap_or(DEFAULT_WEIGHTS));

    // The classifier loads first; without weights there is nothing to run.
    let device = NdArrayDevice::Cpu;
    let model = MathNet::<B>::from_pytorch(&weights, &device)?;
    let canvas = Canvas::new(CANVAS_SIZE, STROKE_WIDTH, BINARIZE_THRESHOLD);

    let mut app = App::new(canvas, model, device, INPUT_SIZE)?;
    app.run()
}
