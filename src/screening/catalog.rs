use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::RwLock;

use crate::error::IntakeError;

use super::domain::JobRequirements;

/// Read-only view of the job/company store. The screening subsystem never
/// writes postings; it only resolves requirements for a posting id.
pub trait JobCatalog: Send + Sync {
    fn requirements(&self, job_posting_id: &str) -> Option<JobRequirements>;
}

/// In-memory catalog, seeded at boot (or per test) with posting snapshots.
#[derive(Debug, Default)]
pub struct InMemoryJobCatalog {
    postings: RwLock<HashMap<String, JobRequirements>>,
}

impl InMemoryJobCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, requirements: JobRequirements) {
        let mut postings = self.postings.write().expect("catalog lock poisoned");
        postings.insert(requirements.job_posting_id.clone(), requirements);
    }

    pub fn len(&self) -> usize {
        self.postings.read().expect("catalog lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seed the catalog from a CSV export with columns
    /// `job_posting_id,title,required_skills,preferred_skills`, skill lists
    /// separated by `;`.
    pub fn load_csv<R: Read>(&self, reader: R) -> Result<usize, IntakeError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &'static str| -> Result<usize, IntakeError> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or(IntakeError::MissingColumn { column: name })
        };

        let id_col = column("job_posting_id")?;
        let title_col = column("title")?;
        let required_col = column("required_skills")?;
        let preferred_col = column("preferred_skills")?;

        let mut loaded = 0;
        for record in csv_reader.records() {
            let record = record?;
            let id = record.get(id_col).unwrap_or_default();
            if id.is_empty() {
                continue;
            }
            self.insert(JobRequirements {
                job_posting_id: id.to_string(),
                title: record.get(title_col).unwrap_or_default().to_string(),
                required_skills: split_skills(record.get(required_col).unwrap_or_default()),
                preferred_skills: split_skills(record.get(preferred_col).unwrap_or_default()),
            });
            loaded += 1;
        }

        Ok(loaded)
    }

    pub fn load_csv_path(&self, path: &Path) -> Result<usize, IntakeError> {
        let file = std::fs::File::open(path).map_err(|err| IntakeError::Csv(err.into()))?;
        self.load_csv(file)
    }
}

fn split_skills(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl JobCatalog for InMemoryJobCatalog {
    fn requirements(&self, job_posting_id: &str) -> Option<JobRequirements> {
        self.postings
            .read()
            .expect("catalog lock poisoned")
            .get(job_posting_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn resolves_inserted_postings() {
        let catalog = InMemoryJobCatalog::new();
        catalog.insert(JobRequirements {
            job_posting_id: "posting-1".to_string(),
            title: "Backend Engineer".to_string(),
            required_skills: vec!["Rust".to_string()],
            preferred_skills: Vec::new(),
        });

        let found = catalog.requirements("posting-1").expect("present");
        assert_eq!(found.title, "Backend Engineer");
        assert!(catalog.requirements("posting-2").is_none());
    }

    #[test]
    fn loads_postings_from_csv() {
        let catalog = InMemoryJobCatalog::new();
        let csv = "job_posting_id,title,required_skills,preferred_skills\n\
                   posting-1,Backend Engineer,Rust; PostgreSQL,Kubernetes\n\
                   posting-2,Data Analyst,SQL,\n";
        let loaded = catalog
            .load_csv(Cursor::new(csv.as_bytes()))
            .expect("csv loads");
        assert_eq!(loaded, 2);

        let backend = catalog.requirements("posting-1").expect("present");
        assert_eq!(backend.required_skills, vec!["Rust", "PostgreSQL"]);
        assert_eq!(backend.preferred_skills, vec!["Kubernetes"]);

        let analyst = catalog.requirements("posting-2").expect("present");
        assert!(analyst.preferred_skills.is_empty());
    }

    #[test]
    fn csv_without_id_column_is_rejected() {
        let catalog = InMemoryJobCatalog::new();
        let csv = "title,required_skills,preferred_skills\nBackend Engineer,Rust,\n";
        match catalog.load_csv(Cursor::new(csv.as_bytes())) {
            Err(IntakeError::MissingColumn { column }) => {
                assert_eq!(column, "job_posting_id");
            }
            other => panic!("expected missing column error, got {other:?}"),
        }
    }
}
