use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;
use crate::predict::types::SatelliteInfo;

pub struct TleEntry {
    pub info: SatelliteInfo,
    pub elements: Elements,
    pub constants: Constants,
}

/// Ordered satellite catalog loaded from a TLE file or a folder of TLE files
pub struct TleLoader {
    source: PathBuf,
    satellites: Arc<Vec<TleEntry>>,
}

impl TleLoader {
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            satellites: Arc::new(Vec::new()),
        }
    }

    /// Load the catalog. A folder is read file by file in name order, skipping
    /// files that fail to parse; a single file must parse cleanly.
    ///
    /// Snapshots taken before a reload keep the catalog they were taken from.
    pub fn load_all(&mut self) -> Result<(), PredictError> {
        if !self.source.exists() {
            return Err(PredictError::SourceNotFound(
                self.source.display().to_string(),
            ));
        }

        let mut satellites = Vec::new();

        if self.source.is_file() {
            let entries = parse_tle_file(&self.source)?;
            insert_all(&mut satellites, entries);
        } else {
            let mut paths = Vec::new();
            for entry in fs::read_dir(&self.source)? {
                let path = entry?.path();
                if path.is_file() && is_tle_file(&path) {
                    paths.push(path);
                }
            }
            paths.sort();

            for path in paths {
                match parse_tle_file(&path) {
                    Ok(entries) => insert_all(&mut satellites, entries),
                    Err(e) => {
                        log::warn!("Failed to parse TLE file {}: {}", path.display(), e);
                        // Continue with other files
                    }
                }
            }
        }

        log::info!(
            "Loaded {} satellites from {}",
            satellites.len(),
            self.source.display()
        );
        self.satellites = Arc::new(satellites);
        Ok(())
    }

    /// All loaded satellites, in load order
    pub fn satellites(&self) -> &[TleEntry] {
        &self.satellites
    }

    /// Shared handle on the current catalog, usable after the loader is unlocked
    pub fn snapshot(&self) -> Arc<Vec<TleEntry>> {
        Arc::clone(&self.satellites)
    }

    pub fn get(&self, name: &str) -> Option<&TleEntry> {
        self.satellites.iter().find(|s| s.info.name == name)
    }

    /// Reload TLE files (called manually or by watcher)
    pub fn reload(&mut self) -> Result<(), PredictError> {
        self.load_all()
    }
}

fn insert_all(satellites: &mut Vec<TleEntry>, entries: Vec<TleEntry>) {
    let mut seen: HashSet<String> = satellites.iter().map(|s| s.info.name.clone()).collect();

    for entry in entries {
        if !seen.insert(entry.info.name.clone()) {
            log::warn!(
                "Duplicate satellite name {} in {}, keeping first occurrence",
                entry.info.name,
                entry.info.tle_source
            );
            continue;
        }
        satellites.push(entry);
    }
}

fn is_tle_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "tle" || ext == "txt")
        .unwrap_or(false)
}

fn parse_tle_file(path: &Path) -> Result<Vec<TleEntry>, PredictError> {
    let content = fs::read_to_string(path)?;
    let filename = path.file_name().unwrap_or_default().to_string_lossy().to_string();
    parse_tle_str(&content, &filename)
}

/// Parse TLE text (2-line or named 3-line sets) into catalog entries
pub fn parse_tle_str(content: &str, source: &str) -> Result<Vec<TleEntry>, PredictError> {
    let invalid = |message: String| PredictError::InvalidTle {
        file: source.to_string(),
        message,
    };

    let mut results = Vec::new();
    for (name, line1, line2) in parse_multi_tle(content) {
        let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
            .map_err(|e| invalid(e.to_string()))?;
        let constants =
            Constants::from_elements(&elements).map_err(|e| invalid(e.to_string()))?;

        let sat_name = name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id));

        results.push(TleEntry {
            info: SatelliteInfo {
                name: sat_name,
                norad_id: elements.norad_id as u32,
                tle_source: source.to_string(),
            },
            elements,
            constants,
        });
    }

    Ok(results)
}

/// Parse multi-satellite TLE content
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            // 2-line TLE (no name)
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            // 3-line TLE, optionally with a "0 " name prefix
            let name = lines[i].strip_prefix("0 ").unwrap_or(lines[i]).trim();
            result.push((
                Some(name.to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1; // Skip unknown line
        }
    }

    result
}
