//! Fills in missing docking configuration keys.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::DockingConfig;
use crate::gpf::{GpfGenerator, GridParams};
use crate::Result;

const DEFAULT_EXHAUSTIVENESS: u32 = 32;

const BOX_KEYS: [&str; 6] = [
    "center_x", "center_y", "center_z", "size_x", "size_y", "size_z",
];

/// Completes a docking configuration file in place.
///
/// Existing settings are preserved verbatim; only missing keys are appended.
/// When any of the six box-geometry keys is absent, all of them are derived
/// together from one grid-parameter-generator run and only the absent ones
/// are written.
pub struct ConfigCompleter {
    data_dir: PathBuf,
    generator: GpfGenerator,
}

impl ConfigCompleter {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            generator: GpfGenerator::default(),
        }
    }

    /// Use a specific generator executable instead of `prepare_gpf.py` from
    /// PATH.
    pub fn with_generator<P: AsRef<Path>>(mut self, script: P) -> Self {
        self.generator = GpfGenerator::new(script);
        self
    }

    /// Read, complete and rewrite the configuration file. A missing file is
    /// treated as an empty starting state.
    pub async fn complete(&self, config_path: &Path) -> Result<()> {
        let mut config = DockingConfig::load(config_path).await?;
        debug!("Loaded {} config lines from {:?}", config.len(), config_path);

        self.apply_scalar_defaults(&mut config);

        if BOX_KEYS.iter().any(|key| !config.contains(key)) {
            let gpf_path = self.data_dir.join("receptor.gpf");
            // ligand/receptor defaults were applied above, so both exist
            let ligand = config.get("ligand").unwrap_or_default().to_string();
            let receptor = config.get("receptor").unwrap_or_default().to_string();

            let params = self
                .generator
                .generate(&ligand, &receptor, &gpf_path)
                .await?;
            apply_box_params(&mut config, &params);
            info!("Derived docking box from {:?}", gpf_path);
        }

        config.save(config_path).await?;
        Ok(())
    }

    fn apply_scalar_defaults(&self, config: &mut DockingConfig) {
        if !config.contains("ligand") {
            let path = self.data_dir.join("ligand.pdbqt");
            config.append("ligand", path.to_string_lossy());
        }
        if !config.contains("receptor") {
            let path = self.data_dir.join("receptor.pdbqt");
            config.append("receptor", path.to_string_lossy());
        }
        if !config.contains("out") {
            let path = self.data_dir.join("output.pdbqt");
            config.append("out", path.to_string_lossy());
        }
        if !config.contains("cpu") {
            let cores = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            config.append("cpu", cores.to_string());
        }
        if !config.contains("exhaustiveness") {
            config.append("exhaustiveness", DEFAULT_EXHAUSTIVENESS.to_string());
        }
    }
}

/// Append the box keys that are still missing. The center comes straight
/// from the gpf, sizes are grid-point counts scaled by the spacing.
fn apply_box_params(config: &mut DockingConfig, params: &GridParams) {
    let size = params.box_size();
    let derived = [
        ("center_x", params.center[0]),
        ("center_y", params.center[1]),
        ("center_z", params.center[2]),
        ("size_x", size[0]),
        ("size_y", size[1]),
        ("size_z", size[2]),
    ];
    for (key, value) in derived {
        if !config.contains(key) {
            config.append(key, format!("{value:.6}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const COMPLETE_CONFIG: &str = "\
ligand = /data/ligand.pdbqt
receptor = /data/receptor.pdbqt
out = /data/output.pdbqt
cpu = 4
exhaustiveness = 8
center_x = 1.0
center_y = 2.0
center_z = 3.0
size_x = 20.0
size_y = 20.0
size_z = 20.0
";

    fn sample_params() -> GridParams {
        GridParams {
            npts: [10.0, 20.0, 30.0],
            spacing: 0.5,
            center: [1.0, 2.0, 3.0],
        }
    }

    #[test]
    fn test_apply_box_params_appends_all_missing() {
        let mut config = DockingConfig::default();
        apply_box_params(&mut config, &sample_params());

        assert_eq!(config.get("center_x"), Some("1.000000"));
        assert_eq!(config.get("center_y"), Some("2.000000"));
        assert_eq!(config.get("center_z"), Some("3.000000"));
        assert_eq!(config.get("size_x"), Some("5.000000"));
        assert_eq!(config.get("size_y"), Some("10.000000"));
        assert_eq!(config.get("size_z"), Some("15.000000"));
    }

    #[test]
    fn test_apply_box_params_leaves_supplied_keys_alone() {
        let mut config = DockingConfig::parse("center_x = 9.9\n").unwrap();
        apply_box_params(&mut config, &sample_params());

        assert_eq!(config.get("center_x"), Some("9.9"));
        // All five others are still derived from the same generator run
        assert_eq!(config.get("center_y"), Some("2.000000"));
        assert_eq!(config.get("size_z"), Some("15.000000"));
    }

    #[tokio::test]
    async fn test_complete_is_noop_when_all_keys_present() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.txt");
        tokio::fs::write(&config_path, COMPLETE_CONFIG).await.unwrap();

        // No generator is installed here; with all nine keys present it must
        // never be invoked.
        let completer = ConfigCompleter::new(dir.path())
            .with_generator(dir.path().join("missing_generator"));
        completer.complete(&config_path).await.unwrap();

        let rewritten = tokio::fs::read_to_string(&config_path).await.unwrap();
        assert_eq!(rewritten, COMPLETE_CONFIG);
    }

    #[tokio::test]
    async fn test_complete_from_absent_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.txt");
        let script = write_stub_generator(dir.path());

        let completer = ConfigCompleter::new(dir.path()).with_generator(&script);
        completer.complete(&config_path).await.unwrap();

        let config = DockingConfig::load(&config_path).await.unwrap();
        for key in [
            "ligand", "receptor", "out", "cpu", "exhaustiveness",
            "center_x", "center_y", "center_z", "size_x", "size_y", "size_z",
        ] {
            assert!(config.contains(key), "missing key {key}");
        }
        assert_eq!(config.get("exhaustiveness"), Some("32"));
        assert_eq!(config.get("size_x"), Some("5.000000"));
    }

    #[tokio::test]
    async fn test_complete_preserves_existing_lines_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.txt");
        tokio::fs::write(&config_path, "cpu = 2\nexhaustiveness = 8\n")
            .await
            .unwrap();
        let script = write_stub_generator(dir.path());

        let completer = ConfigCompleter::new(dir.path()).with_generator(&script);
        completer.complete(&config_path).await.unwrap();

        let rewritten = tokio::fs::read_to_string(&config_path).await.unwrap();
        assert!(rewritten.starts_with("cpu = 2\nexhaustiveness = 8\n"));

        let config = DockingConfig::parse(&rewritten).unwrap();
        assert_eq!(config.get("cpu"), Some("2"));
        assert_eq!(config.get("exhaustiveness"), Some("8"));
        assert_eq!(config.get("center_y"), Some("2.000000"));
        assert_eq!(config.get("size_y"), Some("10.000000"));
    }

    /// Stub generator that writes a fixed gpf to the path given after -o.
    fn write_stub_generator(dir: &Path) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("prepare_gpf.py");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             out=\"$6\"\n\
             printf 'npts 10 20 30\\nspacing 0.5\\ngridcenter 1.0 2.0 3.0\\n' > \"$out\"\n",
        )
        .unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        script
    }
}
