use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

#[cfg(feature = "tch-backend")]
use tch::Device;

/// How the satisfaction network is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeuralBackend {
    /// Exported layer weights evaluated natively (`ann_model.json`).
    Native,
    /// Traced TorchScript module (`ann_model.pt`), needs `tch-backend`.
    TorchScript,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub models_dir: PathBuf,
    pub metrics_file: String,
    pub neural_backend: NeuralBackend,
    #[cfg(feature = "tch-backend")]
    pub device: Device,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000),
            models_dir: PathBuf::from("models"),
            metrics_file: "metrics.json".to_string(),
            neural_backend: NeuralBackend::Native,
            #[cfg(feature = "tch-backend")]
            device: Device::Cpu,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let listen_addr = env::var("SERVER_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.listen_addr);

        let models_dir = env::var("MODELS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.models_dir);
        let metrics_file = env::var("METRICS_FILE").unwrap_or(defaults.metrics_file);

        let neural_backend = match env::var("NEURAL_BACKEND") {
            Ok(raw) => parse_backend(&raw)?,
            Err(_) => defaults.neural_backend,
        };

        #[cfg(feature = "tch-backend")]
        let device = {
            let raw = env::var("DEVICE").unwrap_or_else(|_| "cpu".into());
            parse_device(&raw)
        };

        Ok(Self {
            listen_addr,
            models_dir,
            metrics_file,
            neural_backend,
            #[cfg(feature = "tch-backend")]
            device,
        })
    }
}

fn parse_backend(raw: &str) -> anyhow::Result<NeuralBackend> {
    match raw.to_lowercase().as_str() {
        "native" | "" => Ok(NeuralBackend::Native),
        "torchscript" if cfg!(feature = "tch-backend") => Ok(NeuralBackend::TorchScript),
        "torchscript" => anyhow::bail!("NEURAL_BACKEND=torchscript requires the tch-backend feature"),
        other => anyhow::bail!("unknown NEURAL_BACKEND '{other}'"),
    }
}

/// `cpu`, `cuda` or `cuda:<n>`; falls back to the CPU when CUDA is absent.
#[cfg(feature = "tch-backend")]
fn parse_device(raw: &str) -> Device {
    let lower = raw.trim().to_lowercase();
    let Some(rest) = lower.strip_prefix("cuda") else {
        return Device::Cpu;
    };
    let idx = rest
        .strip_prefix(':')
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);
    if tch::Cuda::is_available() {
        Device::Cuda(idx)
    } else {
        tracing::warn!(requested = %raw, "CUDA unavailable, running on cpu");
        Device::Cpu
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names() {
        assert_eq!(parse_backend("Native").unwrap(), NeuralBackend::Native);
        assert!(parse_backend("onnx").is_err());
        assert_eq!(
            parse_backend("torchscript").is_ok(),
            cfg!(feature = "tch-backend")
        );
    }
}
