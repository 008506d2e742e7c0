//! User demographics used to set the tone of the prompt.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::completed_years;

/// Profile fields as stored; both are optional for users who skipped them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographic {
    pub gender: Option<String>,
    pub age: Option<u32>,
}

impl Demographic {
    pub fn new(gender: &str, age: u32) -> Self {
        Self {
            gender: Some(gender.to_string()),
            age: Some(age),
        }
    }

    /// Derive from a stored profile. `None` when nothing usable is present.
    pub fn from_profile(profile: &UserProfile, today: NaiveDate) -> Option<Self> {
        let gender = profile
            .gender
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);
        let age = profile.dob.and_then(|dob| completed_years(dob, today));
        let d = Self { gender, age };
        if d.is_empty() { None } else { Some(d) }
    }

    pub fn is_empty(&self) -> bool {
        self.gender.is_none() && self.age.is_none()
    }
}
