use serde::{Deserialize, Serialize};

use crate::models::job::JobPosting;
use crate::platform::provinces;

/// The static seed list the landing page starts from.
pub fn sample_jobs() -> Vec<JobPosting> {
    vec![
        JobPosting {
            id: 1,
            title: "Senior Software Developer".into(),
            company: "Tech Innovations SA".into(),
            location: "Johannesburg, Gauteng".into(),
            salary_text: "R85,000".into(),
            employment_type: "Full-time".into(),
            description: "Looking for an experienced developer to join our dynamic team..."
                .into(),
            posted_ago: "2 hours ago".into(),
            urgent: true,
        },
        JobPosting {
            id: 2,
            title: "Data Scientist".into(),
            company: "DataFlow Analytics".into(),
            location: "Cape Town, Western Cape".into(),
            salary_text: "R95,000".into(),
            employment_type: "Full-time".into(),
            description: "Join our AI research team working on cutting-edge projects...".into(),
            posted_ago: "1 day ago".into(),
            urgent: true,
        },
        JobPosting {
            id: 3,
            title: "Marketing Manager".into(),
            company: "Brand Builders".into(),
            location: "Durban, KZN".into(),
            salary_text: "R65,000".into(),
            employment_type: "Full-time".into(),
            description: "Lead our marketing team to new heights...".into(),
            posted_ago: "3 days ago".into(),
            urgent: false,
        },
    ]
}

/// Filters from the search panel. Empty strings mean "any".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchCriteria {
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub min_salary: Option<u32>,
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl SearchCriteria {
    pub fn matches(&self, job: &JobPosting) -> bool {
        if let Some(key) = non_blank(&self.province) {
            let cities = provinces::cities_for(key);
            if !cities.iter().any(|c| c.eq_ignore_ascii_case(job.city())) {
                return false;
            }
        }

        if let Some(city) = non_blank(&self.city) {
            if !job.city().eq_ignore_ascii_case(city) {
                return false;
            }
        }

        match (self.min_salary, job.monthly_salary()) {
            (Some(min), Some(salary)) => salary >= min,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

pub fn search(jobs: &[JobPosting], criteria: &SearchCriteria) -> Vec<JobPosting> {
    jobs.iter()
        .filter(|j| criteria.matches(j))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(jobs: &[JobPosting]) -> Vec<&str> {
        jobs.iter().map(|j| j.title.as_str()).collect()
    }

    #[test]
    fn test_seed_has_three_jobs_two_urgent() {
        let jobs = sample_jobs();
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs.iter().filter(|j| j.urgent).count(), 2);
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        let found = search(&sample_jobs(), &SearchCriteria::default());
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_province_filter_uses_city_table() {
        let criteria = SearchCriteria {
            province: Some("kzn".into()),
            ..Default::default()
        };
        assert_eq!(titles(&search(&sample_jobs(), &criteria)), vec!["Marketing Manager"]);
    }

    #[test]
    fn test_city_filter_accepts_lowercase_option_values() {
        let criteria = SearchCriteria {
            city: Some("cape town".into()),
            ..Default::default()
        };
        assert_eq!(titles(&search(&sample_jobs(), &criteria)), vec!["Data Scientist"]);
    }

    #[test]
    fn test_min_salary_filter() {
        let criteria = SearchCriteria {
            min_salary: Some(80_000),
            ..Default::default()
        };
        assert_eq!(
            titles(&search(&sample_jobs(), &criteria)),
            vec!["Senior Software Developer", "Data Scientist"]
        );
    }

    #[test]
    fn test_blank_strings_are_ignored() {
        let criteria = SearchCriteria {
            province: Some(" ".into()),
            city: Some(String::new()),
            min_salary: None,
        };
        assert_eq!(search(&sample_jobs(), &criteria).len(), 3);
    }
}
