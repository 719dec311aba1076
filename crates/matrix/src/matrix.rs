// Matrix derivation
//
// Best effort: unknown platforms and unreadable requirements become
// annotations, never errors.

use semver::Version;
use serde::Serialize;
use tracing::debug;

use crate::metadata::{Metadata, OsSupport, Requirement};
use crate::output::Annotation;
use crate::requirement::VersionRequirement;
use crate::tables::{all_collections, image_for, is_docker_platform, COLLECTION_TABLE};

/// Requirement name that selects collections
const PUPPET_REQUIREMENT: &str = "puppet";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Matrix {
    pub platform: Vec<String>,
    pub collection: Vec<String>,
}

impl Matrix {
    pub fn cell_count(&self) -> usize {
        self.platform.len() * self.collection.len()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Matrix plus everything worth telling the workflow log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixReport {
    pub matrix: Matrix,
    pub annotations: Vec<Annotation>,
}

pub fn generate(metadata: &Metadata) -> MatrixReport {
    let mut annotations = Vec::new();

    let mut platform = derive_platforms(&metadata.operatingsystem_support, &mut annotations);
    let mut collection = derive_collections(
        metadata.requirements.as_deref().unwrap_or_default(),
        &mut annotations,
    );

    if collection.is_empty() {
        collection = all_collections();
    }

    sort_unique(&mut platform);
    sort_unique(&mut collection);

    MatrixReport {
        matrix: Matrix {
            platform,
            collection,
        },
        annotations,
    }
}

fn derive_platforms(support: &[OsSupport], annotations: &mut Vec<Annotation>) -> Vec<String> {
    let mut systems: Vec<&OsSupport> = support.iter().collect();
    systems.sort_by(|a, b| a.operatingsystem.cmp(&b.operatingsystem));

    let mut platforms = Vec::new();
    for system in systems {
        let mut releases: Vec<&String> = system.operatingsystemrelease.iter().collect();
        releases.sort_by_key(|release| leading_integer(release));

        for release in releases {
            let key = format!("{}-{}", system.operatingsystem, release);
            if let Some(image) = image_for(&key) {
                debug!(platform = %key, image = %image, "Mapped platform");
                platforms.push(image.to_string());
            } else if is_docker_platform(&key) {
                annotations.push(Annotation::Notice(format!(
                    "Expecting {} test using docker",
                    key
                )));
            } else {
                annotations.push(Annotation::Warning(format!("Cannot find image for {}", key)));
            }
        }
    }
    platforms
}

fn derive_collections(requirements: &[Requirement], annotations: &mut Vec<Annotation>) -> Vec<String> {
    let mut collections = Vec::new();

    for requirement in requirements {
        if requirement.name.as_deref() != Some(PUPPET_REQUIREMENT) {
            continue;
        }
        let Some(raw) = requirement.version_requirement.as_deref() else {
            continue;
        };

        let parsed = match VersionRequirement::parse(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Skipping remaining requirements");
                annotations.push(Annotation::Warning(format!(
                    "Didn't recognize version_requirement '{}'",
                    raw
                )));
                break;
            }
        };

        for (version, collection) in COLLECTION_TABLE {
            let Ok(version) = Version::parse(version) else {
                continue;
            };
            if parsed.matches(&version) {
                debug!(requirement = %parsed, collection = %collection, "Collection selected");
                collections.push(collection.to_string());
            }
        }
    }
    collections
}

/// Integer prefix of a release string: "2012 R2" -> 2012, "14.04" -> 14
fn leading_integer(release: &str) -> i64 {
    let digits: String = release
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

fn sort_unique(values: &mut Vec<String>) {
    values.sort();
    values.dedup();
}
