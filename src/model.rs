use std::path::Path;

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Linear, LinearConfig, PaddingConfig2d, Relu,
    },
    prelude::*,
    record::{FullPrecisionSettings, Recorder},
};
use burn_import::pytorch::{LoadArgs, PyTorchFileRecorder};

use crate::error::Error;

/// Two conv+pool stages followed by three fully connected layers, matching
/// the training script layer for layer. Field names mirror the state-dict
/// keys of the weights artifact (conv1, conv2, fc1, fc2, fc3).
#[derive(Module, Debug)]
pub struct MathNet<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    pool: MaxPool2d,
    fc1: Linear<B>,
    fc2: Linear<B>,
    fc3: Linear<B>,
    activation: Relu,
}

impl<B: Backend> MathNet<B> {
    /// Instantiates the topology with freshly initialized parameters.
    pub fn new(device: &B::Device) -> Self {
        let conv1 = Conv2dConfig::new([1, 20], [5, 5])
            .with_padding(PaddingConfig2d::Explicit(2, 2))
            .init(device);
        let conv2 = Conv2dConfig::new([20, 40], [5, 5])
            .with_padding(PaddingConfig2d::Explicit(2, 2))
            .init(device);
        let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();

        // 45x45 input pooled twice: 45 -> 22 -> 11 per spatial axis.
        let fc1 = LinearConfig::new(40 * 11 * 11, 400).init(device);
        let fc2 = LinearConfig::new(400, 200).init(device);
        let fc3 = LinearConfig::new(200, 80).init(device);

        let model = Self {
            conv1,
            conv2,
            pool,
            fc1,
            fc2,
            fc3,
            activation: Relu::new(),
        };
        model.no_grad()
    }

    /// Loads the PyTorch state dict into a fresh topology. Any missing,
    /// extra, or shape-mismatched tensor fails the load.
    pub fn from_pytorch(path: &Path, device: &B::Device) -> Result<Self, Error> {
        let load_args = LoadArgs::new(path.to_path_buf());
        let record: MathNetRecord<B> = PyTorchFileRecorder::<FullPrecisionSettings>::default()
            .load(load_args, device)
            .map_err(|source| Error::Load {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::new(device).load_record(record))
    }

    /// Forward pass mapping a [N, 1, 45, 45] batch to [N, 80] logits.
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.pool.forward(self.activation.forward(self.conv1.forward(x)));
        let x = self.pool.forward(self.activation.forward(self.conv2.forward(x)));

        let x = x.flatten(1, 3);

        let x = self.activation.forward(self.fc1.forward(x));
        let x = self.activation.forward(self.fc2.forward(x));
        self.fc3.forward(x)
    }

    /// Runs the forward pass on a single prepared drawing and returns the
    /// index of the maximum logit.
    pub fn infer(&self, input: Tensor<B, 4>) -> usize {
        argmax_index(self.forward(input))
    }
}

/// Index of the maximum logit in the first batch row, lowest index on ties.
fn argmax_index<B: Backend>(logits: Tensor<B, 2>) -> usize {
    let predictions = logits
        .argmax(1)
        .into_data()
        .to_vec::<i64>()
        .expect("argmax yields integer indices");
    predictions[0] as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::path::PathBuf;

    type B = NdArray<f32>;

    #[test]
    fn forward_maps_batches_to_80_logits() {
        let device = Default::default();
        let model = MathNet::<B>::new(&device);

        let input: Tensor<B, 4> = Tensor::zeros([2, 1, 45, 45], &device);
        let output = model.forward(input);

        assert_eq!(output.dims(), [2, 80]);
    }

    #[test]
    fn infer_is_deterministic_for_fixed_weights() {
        let device = Default::default();
        let model = MathNet::<B>::new(&device);

        let input: Tensor<B, 4> = Tensor::ones([1, 1, 45, 45], &device);
        let first = model.infer(input.clone());
        let second = model.infer(input);

        assert_eq!(first, second);
        assert!(first < 80);
    }

    #[test]
    fn tied_logits_resolve_to_the_lowest_index() {
        let device = Default::default();

        let uniform: Tensor<B, 2> = Tensor::from_floats([[0.0; 80]], &device);
        assert_eq!(argmax_index(uniform), 0);

        let mut scores = [0.0; 80];
        scores[13] = 5.0;
        scores[42] = 5.0;
        let tied: Tensor<B, 2> = Tensor::from_floats([scores], &device);
        assert_eq!(argmax_index(tied), 13);
    }

    #[test]
    fn missing_weights_artifact_is_a_load_error() {
        let device = Default::default();
        let path = PathBuf::from("weights/does_not_exist.pth");

        match MathNet::<B>::from_pytorch(&path, &device) {
            Err(Error::Load { path: reported, .. }) => assert_eq!(reported, path),
            Err(other) => panic!("expected load error, got {other}"),
            Ok(_) => panic!("load succeeded without an artifact"),
        }
    }

    #[test]
    #[ignore = "requires the trained weights artifact (set MATHNET_WEIGHTS)"]
    fn recognizes_a_drawn_seven() {
        use crate::{canvas::Canvas, labels};

        let weights = std::env::var("MATHNET_WEIGHTS")
            .expect("MATHNET_WEIGHTS must point at the .pth artifact");
        let device = Default::default();
        let model = MathNet::<B>::from_pytorch(Path::new(&weights), &device).unwrap();

        // Top bar and diagonal of a "7" on the 200x200 canvas.
        let mut canvas = Canvas::new(200, 2, 128);
        canvas.append_stroke((50.0, 50.0), (150.0, 50.0));
        canvas.append_stroke((150.0, 50.0), (80.0, 160.0));

        let index = model.infer(canvas.prepare(45, &device));
        assert_eq!(labels::label_of(index).unwrap(), "7");
    }
}
