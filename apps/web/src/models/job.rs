use serde::{Deserialize, Serialize};

/// A listing shown in the landing page's jobs grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobPosting {
    pub id: u32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary_text: String, // "R85,000", monthly
    pub employment_type: String,
    pub description: String,
    pub posted_ago: String,
    pub urgent: bool,
}

impl JobPosting {
    /// City part of "City, Province".
    pub fn city(&self) -> &str {
        self.location
            .split(',')
            .next()
            .map(str::trim)
            .unwrap_or_default()
    }

    /// Monthly salary in rand, parsed from `salary_text`.
    pub fn monthly_salary(&self) -> Option<u32> {
        let digits: String = self
            .salary_text
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}
