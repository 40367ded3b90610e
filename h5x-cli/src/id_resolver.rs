//! ID resolver module
//!
//! Resolves job ID prefixes to full UUIDs by listing the orchestrator's jobs.

use anyhow::{Context, Result, anyhow};
use h5x_client::OrchestratorClient;
use uuid::Uuid;

use crate::types::IdOrPrefix;

/// Resolve a job ID or prefix to a full UUID
///
/// A full UUID is returned as is; a prefix must match exactly one known job.
pub async fn resolve_job_id(client: &OrchestratorClient, id_or_prefix: &IdOrPrefix) -> Result<Uuid> {
    let prefix = match id_or_prefix {
        IdOrPrefix::Full(uuid) => return Ok(*uuid),
        IdOrPrefix::Prefix(prefix) => prefix,
    };

    let jobs = client
        .list_jobs()
        .await
        .context("Failed to fetch jobs for ID resolution")?;

    match_prefix(jobs.iter().map(|j| j.id), prefix)
}

fn match_prefix(ids: impl Iterator<Item = Uuid>, prefix: &str) -> Result<Uuid> {
    let matches: Vec<Uuid> = ids
        .filter(|id| id.to_string().starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!("No job found with ID starting with '{}'", prefix)),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple jobs: {}",
                prefix,
                ids.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<Uuid> {
        vec![
            Uuid::parse_str("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap(),
            Uuid::parse_str("3fb00000-0000-4000-8000-000000000000").unwrap(),
            Uuid::parse_str("9c1d0000-0000-4000-8000-000000000000").unwrap(),
        ]
    }

    #[test]
    fn test_unique_prefix() {
        let id = match_prefix(ids().into_iter(), "9c").unwrap();
        assert_eq!(id, ids()[2]);
    }

    #[test]
    fn test_ambiguous_prefix() {
        let err = match_prefix(ids().into_iter(), "3f").unwrap_err();
        assert!(err.to_string().contains("Ambiguous"));
    }

    #[test]
    fn test_no_match() {
        let err = match_prefix(ids().into_iter(), "ff").unwrap_err();
        assert!(err.to_string().contains("No job found"));
    }
}
