use std::{fmt, io::Cursor};

use parking_lot::Mutex;
use tch::{Device, Kind, Tensor, no_grad};

use super::EstimatorError;

/// Traced regression network exported as TorchScript.
pub struct TorchScriptModule {
    device: Device,
    size_bytes: u64,
    module: Mutex<tch::CModule>,
}

impl fmt::Debug for TorchScriptModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TorchScriptModule")
            .field("device", &self.device)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

impl TorchScriptModule {
    pub fn from_bytes(bytes: &[u8], device: Device) -> Result<Self, EstimatorError> {
        let mut module = tch::CModule::load_data_on_device(&mut Cursor::new(bytes), device)
            .map_err(|e| EstimatorError::Malformed(e.to_string()))?;
        module.set_eval();

        Ok(Self {
            device,
            size_bytes: bytes.len() as u64,
            module: Mutex::new(module),
        })
    }

    pub fn predict(&self, x: &[f64]) -> Result<f64, EstimatorError> {
        let input: Vec<f32> = x.iter().map(|&v| v as f32).collect();
        no_grad(|| {
            let module = self.module.lock();
            let tensor = Tensor::from_slice(&input)
                .reshape([1, input.len() as i64])
                .to(self.device);
            let output = module
                .forward_ts(&[tensor])
                .map_err(|e| EstimatorError::Malformed(e.to_string()))?;
            Ok(output
                .to_kind(Kind::Double)
                .flatten(0, -1)
                .double_value(&[0]))
        })
    }
}
