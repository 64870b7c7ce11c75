//! Grid parameter file generation and parsing.
//!
//! The docking search box is derived from the output of AutoDockTools'
//! `prepare_gpf.py`: grid-point counts and spacing give the box size, the
//! `gridcenter` line gives its center.

use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::{Result, SathdockError};

/// Grid parameters parsed from a generated gpf file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    pub npts: [f64; 3],
    pub spacing: f64,
    pub center: [f64; 3],
}

impl GridParams {
    /// Box size along each axis: grid-point count times spacing.
    pub fn box_size(&self) -> [f64; 3] {
        [
            self.npts[0] * self.spacing,
            self.npts[1] * self.spacing,
            self.npts[2] * self.spacing,
        ]
    }
}

/// Parse grid parameters out of gpf file content.
///
/// When a pattern matches on several lines the last one wins. All seven
/// scalars must be found or the whole parse fails; no partial result is
/// handed out.
pub fn parse_gpf(content: &str) -> Result<GridParams> {
    let npts_re = Regex::new(r"npts (\d+) (\d+) (\d+)")?;
    let spacing_re = Regex::new(r"spacing (\S+)")?;
    let center_re = Regex::new(r"gridcenter (\S+) (\S+) (\S+)")?;

    let mut npts: [Option<f64>; 3] = [None; 3];
    let mut spacing: Option<f64> = None;
    let mut center: [Option<f64>; 3] = [None; 3];

    for line in content.lines() {
        if let Some(caps) = npts_re.captures(line) {
            for axis in 0..3 {
                npts[axis] = Some(parse_scalar(&caps[axis + 1])?);
            }
        }
        if let Some(caps) = spacing_re.captures(line) {
            spacing = Some(parse_scalar(&caps[1])?);
        }
        if let Some(caps) = center_re.captures(line) {
            for axis in 0..3 {
                center[axis] = Some(parse_scalar(&caps[axis + 1])?);
            }
        }
    }

    match (npts, spacing, center) {
        ([Some(nx), Some(ny), Some(nz)], Some(spacing), [Some(cx), Some(cy), Some(cz)]) => {
            Ok(GridParams {
                npts: [nx, ny, nz],
                spacing,
                center: [cx, cy, cz],
            })
        }
        _ => Err(SathdockError::GpfParse(format!(
            "center={:?} {:?} {:?} npts={:?} {:?} {:?} spacing={:?}",
            center[0], center[1], center[2], npts[0], npts[1], npts[2], spacing
        ))),
    }
}

fn parse_scalar(raw: &str) -> Result<f64> {
    raw.parse()
        .map_err(|e| SathdockError::GpfParse(format!("bad scalar {raw:?}: {e}")))
}

/// Invokes `prepare_gpf.py` to produce a grid parameter file.
pub struct GpfGenerator {
    script: PathBuf,
}

impl Default for GpfGenerator {
    fn default() -> Self {
        // Resolved through PATH
        Self::new("prepare_gpf.py")
    }
}

impl GpfGenerator {
    pub fn new<P: AsRef<Path>>(script: P) -> Self {
        Self {
            script: script.as_ref().to_path_buf(),
        }
    }

    /// Run the generator for the given ligand and receptor, writing the gpf
    /// file to `out`, and parse it.
    pub async fn generate(&self, ligand: &str, receptor: &str, out: &Path) -> Result<GridParams> {
        info!("Generating grid parameters for {} / {}", ligand, receptor);

        let output = Command::new(&self.script)
            .arg("-l")
            .arg(ligand)
            .arg("-r")
            .arg(receptor)
            .arg("-o")
            .arg(out)
            .arg("-y")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SathdockError::Generator(stderr.into_owned()));
        }

        let content = tokio::fs::read_to_string(out).await?;
        let params = parse_gpf(&content)?;
        debug!("Grid parameters: {:?}", params);
        Ok(params)
    }
}
