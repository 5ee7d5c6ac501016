//! File-based location catalog.
//!
//! Layout of a catalog directory:
//!
//! ```text
//! <dir>/job_listings.json                  one {"project_id": "<uuid>"} per line
//! <dir>/job_deliverables/<project_id>.json [{"lat": .., "lon": .., "image_url": ..}, ..]
//! ```
//!
//! Projects listed without a deliverable file are skipped. [`sync_listings`]
//! adds a listing line for every deliverable that does not have one yet.

use geoguess::{Location, PoolEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{ContentError, LocationPool};

const LISTINGS_FILE: &str = "job_listings.json";
const DELIVERABLES_DIR: &str = "job_deliverables";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct CaptureRecord {
    lat: f64,
    lon: f64,
    image_url: String,
}

/// Location pool loaded once from a catalog directory.
pub struct FileCatalog {
    dir: PathBuf,
    projects: Vec<Project>,
    entries: Vec<PoolEntry>,
}

impl FileCatalog {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ContentError> {
        let dir = dir.into();
        let listings = dir.join(LISTINGS_FILE);
        let deliverables = dir.join(DELIVERABLES_DIR);
        if !listings.exists() {
            return Err(ContentError::MissingFile(listings));
        }
        if !deliverables.is_dir() {
            return Err(ContentError::MissingFile(deliverables));
        }

        let mut projects = Vec::new();
        for project in read_listings(&listings)? {
            if deliverable_path(&deliverables, &project).exists() {
                projects.push(project);
            } else {
                tracing::warn!(
                    project_id = %project.project_id,
                    "No deliverable, skipping project"
                );
            }
        }

        let mut entries = Vec::new();
        for project in &projects {
            entries.extend(read_deliverable(&deliverable_path(&deliverables, project))?);
        }
        if entries.is_empty() {
            return Err(ContentError::Empty);
        }

        tracing::info!(
            dir = %dir.display(),
            projects = projects.len(),
            locations = entries.len(),
            "Loaded location catalog"
        );
        Ok(Self {
            dir,
            projects,
            entries,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Projects that have a deliverable file.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }
}

impl LocationPool for FileCatalog {
    fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }
}

fn deliverable_path(deliverables: &Path, project: &Project) -> PathBuf {
    deliverables.join(format!("{}.json", project.project_id))
}

fn read_listings(path: &Path) -> Result<Vec<Project>, ContentError> {
    let contents = std::fs::read_to_string(path)?;
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).map_err(ContentError::from))
        .collect()
}

/// Read one deliverable, dropping records whose coordinates are invalid.
fn read_deliverable(path: &Path) -> Result<Vec<PoolEntry>, ContentError> {
    let contents = std::fs::read_to_string(path)?;
    let records: Vec<CaptureRecord> = serde_json::from_str(&contents)?;

    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        match Location::new(record.lat, record.lon) {
            Ok(location) => entries.push(PoolEntry::new(record.image_url, location)),
            Err(e) => {
                tracing::warn!("Skipping capture {} in {:?}: {}", record.image_url, path, e);
            }
        }
    }
    Ok(entries)
}

/// Outcome of [`sync_listings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Project ids appended to the listings file, in sorted order.
    pub added: Vec<Uuid>,
    /// Deliverables that were already listed.
    pub already_listed: usize,
}

/// Append a `{"project_id": ..}` line to `job_listings.json` for every
/// `job_deliverables/<uuid>.json` that is not listed yet.
///
/// Existing lines are never rewritten. Lines that do not parse are ignored
/// when collecting the listed ids, and files whose name is not a UUID are
/// skipped. The listings file is created if missing.
pub fn sync_listings(dir: &Path) -> Result<SyncReport, ContentError> {
    let listings = dir.join(LISTINGS_FILE);
    let deliverables = dir.join(DELIVERABLES_DIR);
    if !deliverables.is_dir() {
        return Err(ContentError::MissingFile(deliverables));
    }

    let existing = if listings.exists() {
        std::fs::read_to_string(&listings)?
    } else {
        String::new()
    };
    let listed: HashSet<Uuid> = existing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<Project>(line) {
            Ok(project) => Some(project.project_id),
            Err(e) => {
                tracing::warn!("Ignoring malformed listing line {:?}: {}", line, e);
                None
            }
        })
        .collect();

    let mut found = Vec::new();
    for entry in std::fs::read_dir(&deliverables)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match Uuid::parse_str(stem) {
            Ok(id) => found.push(id),
            Err(_) => tracing::warn!("Skipping deliverable with non-UUID name: {:?}", path),
        }
    }
    found.sort();

    let mut report = SyncReport::default();
    let mut lines = String::new();
    for project_id in found {
        if listed.contains(&project_id) {
            report.already_listed += 1;
            continue;
        }
        lines.push_str(&serde_json::to_string(&Project { project_id })?);
        lines.push('\n');
        report.added.push(project_id);
    }

    if !lines.is_empty() {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&listings)?;
        if !existing.is_empty() && !existing.ends_with('\n') {
            file.write_all(b"\n")?;
        }
        file.write_all(lines.as_bytes())?;
    }

    tracing::info!(
        dir = %dir.display(),
        added = report.added.len(),
        already_listed = report.already_listed,
        "Synced job listings"
    );
    Ok(report)
}
