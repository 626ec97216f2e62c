use serde::{Deserialize, Serialize};

/// Projection of a stored resume point as the retrieval tool sees it.
///
/// Records are created and maintained by an external ingestion process;
/// this service only ever reads them. `category` mirrors the point's
/// payload attribute of the same name and is absent when the ingestion
/// pipeline did not label the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub category: Option<String>,
    pub resume_text: String,
}
