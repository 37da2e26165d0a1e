use std::fs;
use std::path::Path;
use std::time::Duration;

use sgp4::Elements;

use crate::predict::error::PredictError;
use crate::predict::types::SatelliteInfo;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TleEntry {
    pub info: SatelliteInfo,
    pub elements: Elements,
}

/// The satellites of one TLE file.
pub struct TleLoader {
    source_name: String,
    satellites: Vec<TleEntry>,
}

impl TleLoader {
    pub fn from_file(path: &Path) -> Result<Self, PredictError> {
        let content = fs::read_to_string(path)?;
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self::parse(&filename, &content)
    }

    /// Download a TLE listing (e.g. a CelesTrak group) and parse it.
    pub fn from_url(url: &str) -> Result<Self, PredictError> {
        log::info!("Fetching TLEs from {}", url);
        let content = fetch_text(url).map_err(|message| PredictError::Fetch {
            url: url.to_string(),
            message,
        })?;
        Self::parse(url, &content)
    }

    /// Parse TLE content (may contain multiple satellites)
    pub fn parse(source_name: &str, content: &str) -> Result<Self, PredictError> {
        let satellites = parse_multi_tle(content)
            .into_iter()
            .map(|(name, line1, line2)| build_entry(source_name, name, &line1, &line2))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source_name: source_name.to_string(),
            satellites,
        })
    }

    #[cfg(test)]
    pub fn satellites(&self) -> &[TleEntry] {
        &self.satellites
    }

    /// Pick the satellite called `name`.
    ///
    /// A file holding a single satellite is taken as-is and renamed to
    /// `name`; otherwise an unmatched name falls back to the first entry.
    pub fn select(self, name: &str) -> Result<TleEntry, PredictError> {
        let target = name.trim();
        let mut satellites = self.satellites;

        if satellites.is_empty() {
            return Err(PredictError::NoSatellites(self.source_name));
        }

        if satellites.len() == 1 {
            let mut entry = satellites.remove(0);
            if !target.is_empty() {
                entry.info.name = target.to_string();
            }
            return Ok(entry);
        }

        match satellites.iter().position(|s| s.info.name.trim() == target) {
            Some(idx) => Ok(satellites.swap_remove(idx)),
            None => {
                let entry = satellites.swap_remove(0);
                log::warn!(
                    "No satellite named '{}' in {}, using {}",
                    target,
                    self.source_name,
                    entry.info.name
                );
                Ok(entry)
            }
        }
    }
}

fn fetch_text(url: &str) -> Result<String, String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| format!("Request failed: {}", e))?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }

    response.text().map_err(|e| format!("Read failed: {}", e))
}

/// Build an entry from a TLE given directly in configuration.
pub fn parse_inline(name: &str, line1: &str, line2: &str) -> Result<TleEntry, PredictError> {
    build_entry(
        "inline",
        Some(name.to_string()),
        line1.trim(),
        line2.trim(),
    )
}

fn build_entry(
    source_name: &str,
    name: Option<String>,
    line1: &str,
    line2: &str,
) -> Result<TleEntry, PredictError> {
    let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
        .map_err(|e| PredictError::InvalidTle {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;

    let sat_name = name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id));

    Ok(TleEntry {
        info: SatelliteInfo {
            name: sat_name,
            norad_id: elements.norad_id,
            tle_source: source_name.to_string(),
        },
        elements,
    })
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
            // 3-line TLE (with name)
            result.push((
                Some(lines[i].to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}
