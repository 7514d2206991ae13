//! Templated "optimized" resume for Smart Apply.
//!
//! Output is a pure function of the job: the title, the first two requirements in the
//! summary line, and every requirement numbered in order.

use std::time::Duration;

use crate::catalog::Job;

/// Synthetic delay between choosing Smart Apply and the preview appearing.
pub const SMART_GENERATION_DELAY: Duration = Duration::from_millis(1500);

const EXPERIENCE_BLOCK: &str = "EXPERIENCE:
- Led development of enterprise-scale applications
- Implemented best practices and modern architecture
- Collaborated with cross-functional teams";

const COMPATIBILITY_LINE: &str =
    "This resume has been optimized to match the job description with 95% compatibility score.";

/// Builds the smart resume text for a job.
pub fn optimized_resume(job: &Job) -> String {
    let skills = job
        .requirements
        .iter()
        .enumerate()
        .map(|(idx, req)| format!("{}. {}", idx + 1, req))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Modified Resume for {title}\n\
         \n\
         OPTIMIZED SUMMARY:\n\
         Results-driven professional with expertise in {expertise}. \
         Proven track record of delivering high-impact solutions.\n\
         \n\
         KEY SKILLS MATCHED TO JOB:\n\
         {skills}\n\
         \n\
         {experience}\n\
         \n\
         {compatibility}",
        title = job.title,
        expertise = expertise_phrase(&job.requirements),
        experience = EXPERIENCE_BLOCK,
        compatibility = COMPATIBILITY_LINE,
    )
}

/// "A and B" from the first two requirements; degrades for shorter lists.
fn expertise_phrase(requirements: &[String]) -> String {
    match requirements {
        [] => "the core requirements of this role".to_string(),
        [only] => only.clone(),
        [first, second, ..] => format!("{first} and {second}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    #[test]
    fn test_template_contains_title_and_first_two_requirements_in_order() {
        let job = default_catalog().remove(0);
        assert_eq!(job.title, "Senior Frontend Developer");

        let text = optimized_resume(&job);
        assert!(text.starts_with("Modified Resume for Senior Frontend Developer\n"));

        let first = text.find("5+ years React experience").unwrap();
        let second = text.find("TypeScript proficiency").unwrap();
        assert!(first < second, "requirements must appear in catalog order");
        assert!(text.contains(
            "expertise in 5+ years React experience and TypeScript proficiency."
        ));
    }

    #[test]
    fn test_template_numbers_every_requirement() {
        let job = default_catalog().remove(2);
        let text = optimized_resume(&job);
        assert!(text.contains("KEY SKILLS MATCHED TO JOB:\n1. Node.js & React\n2. 3+ years experience\n3. AWS knowledge\n"));
        assert!(text.ends_with(COMPATIBILITY_LINE));
    }

    #[test]
    fn test_template_is_deterministic() {
        let job = default_catalog().remove(1);
        assert_eq!(optimized_resume(&job), optimized_resume(&job));
    }

    #[test]
    fn test_expertise_phrase_degrades_gracefully() {
        assert_eq!(expertise_phrase(&["Rust".to_string()]), "Rust");
        assert!(expertise_phrase(&[]).contains("core requirements"));
    }
}
