//! Skill taxonomy: the static JSON list of known skills, shared across requests.
//!
//! File format: `{"required": ["python", "docker", ...]}`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::analysis::skills::{extract_skills, ExtractionMode, SkillMatcher};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaxonomyFile {
    #[serde(default)]
    pub required: Vec<String>,
}

pub struct SkillTaxonomy {
    /// `None` keeps the taxonomy in memory only.
    path: Option<PathBuf>,
    matcher: RwLock<SkillMatcher>,
}

impl SkillTaxonomy {
    /// Loads the taxonomy from disk. A missing file starts an empty taxonomy;
    /// a malformed one is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<TaxonomyFile>(&raw)
                .with_context(|| format!("Malformed skill taxonomy at {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Skill taxonomy {} not found, starting empty", path.display());
                TaxonomyFile::default()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read skill taxonomy {}", path.display()))
            }
        };

        let matcher = SkillMatcher::new(&file.required)?;
        info!(
            "Loaded {} skills from {}",
            matcher.skills().len(),
            path.display()
        );

        Ok(Self {
            path: Some(path),
            matcher: RwLock::new(matcher),
        })
    }

    pub fn in_memory<I, S>(skills: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            path: None,
            matcher: RwLock::new(SkillMatcher::new(skills)?),
        })
    }

    pub async fn skills(&self) -> Vec<String> {
        self.matcher.read().await.skills().to_vec()
    }

    /// Extracts the skills of `text` against the current taxonomy snapshot.
    pub async fn extract(&self, text: &str, mode: ExtractionMode) -> Vec<String> {
        let matcher = self.matcher.read().await;
        extract_skills(text, mode, &matcher)
    }

    /// Adds skills not already present, persists the file, and returns what was added.
    pub async fn add_skills(&self, new_skills: &[String]) -> Result<Vec<String>> {
        let mut matcher = self.matcher.write().await;

        let mut added: Vec<String> = Vec::new();
        for skill in new_skills {
            let skill = skill.trim().to_lowercase();
            if !skill.is_empty() && !matcher.contains(&skill) && !added.contains(&skill) {
                added.push(skill);
            }
        }

        if added.is_empty() {
            info!("No new skills found to add.");
            return Ok(added);
        }

        let mut combined = matcher.skills().to_vec();
        combined.extend(added.iter().cloned());

        if let Some(path) = &self.path {
            persist(path, &combined)?;
        }
        *matcher = SkillMatcher::new(&combined)?;

        info!("Added {} new skills: {:?}", added.len(), added);
        Ok(added)
    }
}

/// Writes the taxonomy atomically: temp file in the same directory, then rename.
fn persist(path: &Path, skills: &[String]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create taxonomy directory {}", dir.display()))?;

    let body = serde_json::to_string_pretty(&TaxonomyFile {
        required: skills.to_vec(),
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(body.as_bytes())?;
    tmp.persist(path)
        .with_context(|| format!("Failed to write skill taxonomy {}", path.display()))?;
    Ok(())
}
