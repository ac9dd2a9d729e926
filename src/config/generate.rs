use crate::edges::EdgeKernel;
use crate::importance::ImportanceOptions;
use crate::preprocess::PreprocessOptions;
use crate::render::{timestamped_output_path, RenderOptions};
use crate::selector::GeneratorConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Blend edge strength into the importance map.
    pub enabled: bool,
    pub kernel: EdgeKernel,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Rendered PNG; a timestamped name inside `dir` when absent.
    pub image: Option<PathBuf>,
    pub dir: PathBuf,
    pub report_json: Option<PathBuf>,
    pub instructions: Option<PathBuf>,
    pub coverage_image: Option<PathBuf>,
    /// Log progress every N committed lines (0 disables).
    pub progress_every: usize,
    /// Stop generation after this many seconds.
    pub timeout_secs: Option<f64>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image: None,
            dir: PathBuf::from("."),
            report_json: None,
            instructions: None,
            coverage_image: None,
            progress_every: 500,
            timeout_secs: None,
        }
    }
}

impl OutputConfig {
    pub fn image_path(&self) -> PathBuf {
        self.image
            .clone()
            .unwrap_or_else(|| timestamped_output_path(&self.dir))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    pub input: PathBuf,
    #[serde(default)]
    pub preprocess: PreprocessOptions,
    #[serde(default)]
    pub importance: ImportanceOptions,
    #[serde(default)]
    pub edges: EdgeConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub render: RenderOptions,
    #[serde(default)]
    pub output: OutputConfig,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{FallbackPolicy, StartPin};

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str(r#"{"input": "portrait.jpg"}"#).unwrap();
        assert_eq!(cfg.input, PathBuf::from("portrait.jpg"));
        assert_eq!(cfg.preprocess.target_size, 500);
        assert_eq!(cfg.generator.pin_count, 300);
        assert_eq!(cfg.generator.max_lines, 4000);
        assert_eq!(cfg.generator.start_pin, StartPin::Fixed(0));
        assert!(!cfg.edges.enabled);
        assert_eq!(cfg.render.line_width, 1);
        assert_eq!(cfg.output.progress_every, 500);
        assert!(cfg.output.image_path().starts_with("."));
    }

    #[test]
    fn load_config_reads_nested_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        fs::write(
            &path,
            r#"{
                "input": "in.png",
                "preprocess": {"target_size": 300, "crop": {"cx": 50, "cy": 60, "radius": 40}},
                "importance": {"model": "logarithmic"},
                "edges": {"enabled": true, "kernel": "scharr"},
                "generator": {
                    "pin_count": 200,
                    "max_lines": 1500,
                    "fallback": "fixed_count_fallback"
                },
                "output": {"image": "out/art.png", "report_json": "out/report.json"}
            }"#,
        )
        .unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.preprocess.target_size, 300);
        assert_eq!(cfg.preprocess.crop.map(|c| c.radius), Some(40.0));
        assert!(cfg.edges.enabled);
        assert_eq!(cfg.edges.kernel, EdgeKernel::Scharr);
        assert_eq!(cfg.generator.pin_count, 200);
        assert_eq!(cfg.generator.fallback, FallbackPolicy::FixedCountFallback);
        assert_eq!(cfg.output.image_path(), PathBuf::from("out/art.png"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_config(Path::new("/nonexistent/run.json")).unwrap_err();
        assert!(err.starts_with("Failed to read config"));
    }
}
