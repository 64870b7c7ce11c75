//! In-memory model of the `key = value` docking configuration file.

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

use crate::Result;

/// Ordered view of a docking configuration file.
///
/// Recognised lines are kept verbatim in their original order; lines that do
/// not match the `key = value` pattern are dropped. Lookups go through a
/// derived map where the last occurrence of a key wins. New settings are
/// only ever appended, existing lines are never rewritten in place.
#[derive(Debug, Clone, Default)]
pub struct DockingConfig {
    lines: Vec<String>,
    values: HashMap<String, String>,
}

impl DockingConfig {
    /// Parse configuration content. Unrecognised lines are discarded.
    pub fn parse(content: &str) -> Result<Self> {
        let line_re = Regex::new(r"(\w+)\s*=\s*(\S+)")?;

        let mut config = Self::default();
        for line in content.lines() {
            if let Some(caps) = line_re.captures(line) {
                config.values.insert(caps[1].to_string(), caps[2].to_string());
                config.lines.push(line.to_string());
            }
        }
        Ok(config)
    }

    /// Load a configuration file. A missing file is an empty configuration;
    /// any other read failure is fatal.
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Append a new `key = value` line.
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        self.lines.push(format!("{key} = {value}"));
        self.values.insert(key.to_string(), value);
    }

    /// Render the file content: all recognised lines, newline-terminated.
    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// Overwrite the configuration file with the current content.
    pub async fn save(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, self.render()).await?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_keeps_recognised_lines_in_order() {
        let config = DockingConfig::parse(
            "receptor = /data/receptor.pdbqt\n\
             # a comment without an assignment\n\
             ligand=/data/ligand.pdbqt\n\
             cpu   =   8\n",
        )
        .unwrap();

        assert_eq!(config.len(), 3);
        assert_eq!(config.get("receptor"), Some("/data/receptor.pdbqt"));
        assert_eq!(config.get("ligand"), Some("/data/ligand.pdbqt"));
        assert_eq!(config.get("cpu"), Some("8"));
        assert_eq!(
            config.render(),
            "receptor = /data/receptor.pdbqt\nligand=/data/ligand.pdbqt\ncpu   =   8\n"
        );
    }

    #[test]
    fn test_last_occurrence_wins_for_lookup() {
        let config = DockingConfig::parse("cpu = 4\ncpu = 16\n").unwrap();
        assert_eq!(config.get("cpu"), Some("16"));
        // Both raw lines survive in the output
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_append_preserves_existing_lines() {
        let mut config = DockingConfig::parse("out = /data/output.pdbqt\n").unwrap();
        config.append("exhaustiveness", "32");

        assert_eq!(
            config.render(),
            "out = /data/output.pdbqt\nexhaustiveness = 32\n"
        );
        assert_eq!(config.get("exhaustiveness"), Some("32"));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = DockingConfig::load(&dir.path().join("config.txt"))
            .await
            .unwrap();
        assert!(config.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");

        let mut config = DockingConfig::default();
        config.append("ligand", "/data/ligand.pdbqt");
        config.append("center_x", "1.500000");
        config.save(&path).await.unwrap();

        let reloaded = DockingConfig::load(&path).await.unwrap();
        assert_eq!(reloaded.get("ligand"), Some("/data/ligand.pdbqt"));
        assert_eq!(reloaded.get("center_x"), Some("1.500000"));
        assert_eq!(reloaded.render(), config.render());
    }
}
