use serde::{Deserialize, Serialize};

/// A job posting. Immutable once loaded from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    /// Employment type, e.g. "Full-time" or "Contract".
    #[serde(rename = "type")]
    pub employment_type: String,
    pub salary: String,
    pub description: String,
    /// Ordered requirement strings. Order matters for the smart resume template.
    pub requirements: Vec<String>,
    /// Human-readable posting age, e.g. "2 days ago".
    pub posted: String,
}

/// Returns the static job catalog served by `GET /api/jobs`.
pub fn default_catalog() -> Vec<Job> {
    vec![
        job(
            "1",
            "Senior Frontend Developer",
            "TechCorp Inc.",
            "San Francisco, CA",
            "Full-time",
            "$120k - $160k",
            "We are looking for an experienced Frontend Developer to join our dynamic team...",
            &[
                "5+ years React experience",
                "TypeScript proficiency",
                "UI/UX design skills",
            ],
            "2 days ago",
        ),
        job(
            "2",
            "Machine Learning Engineer",
            "AI Solutions Ltd.",
            "Remote",
            "Full-time",
            "$140k - $180k",
            "Join our AI team to build cutting-edge machine learning models...",
            &[
                "Python & TensorFlow",
                "ML algorithms expertise",
                "PhD preferred",
            ],
            "1 week ago",
        ),
        job(
            "3",
            "Full Stack Developer",
            "StartupXYZ",
            "New York, NY",
            "Contract",
            "$100k - $130k",
            "Build scalable web applications using modern tech stack...",
            &["Node.js & React", "3+ years experience", "AWS knowledge"],
            "3 days ago",
        ),
    ]
}

/// Looks up a catalog job by id.
pub fn find_job<'a>(catalog: &'a [Job], id: &str) -> Option<&'a Job> {
    catalog.iter().find(|j| j.id == id)
}

#[allow(clippy::too_many_arguments)]
fn job(
    id: &str,
    title: &str,
    company: &str,
    location: &str,
    employment_type: &str,
    salary: &str,
    description: &str,
    requirements: &[&str],
    posted: &str,
) -> Job {
    Job {
        id: id.to_string(),
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        employment_type: employment_type.to_string(),
        salary: salary.to_string(),
        description: description.to_string(),
        requirements: requirements.iter().map(|r| r.to_string()).collect(),
        posted: posted.to_string(),
    }
}
