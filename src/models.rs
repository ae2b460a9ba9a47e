use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(label)
    }
}

/// One of the three challenge series shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Track {
    A,
    B,
    C,
}

impl Track {
    pub const ALL: [Track; 3] = [Track::A, Track::B, Track::C];

    pub fn label(self) -> &'static str {
        match self {
            Track::A => "Challenge A",
            Track::B => "Challenge B",
            Track::C => "Challenge C",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "Date of Birth")]
    pub date_of_birth: NaiveDate,
    #[serde(rename = "Phone Number")]
    pub phone_number: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Date of Sign Up")]
    pub signup_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignupActivityPoint {
    #[serde(rename = "Date of Sign Up")]
    pub date: NaiveDate,
    #[serde(rename = "Count")]
    pub count: usize,
}

/// A wide row: one value per track for a single date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChallengePoint<T> {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Challenge A")]
    pub challenge_a: T,
    #[serde(rename = "Challenge B")]
    pub challenge_b: T,
    #[serde(rename = "Challenge C")]
    pub challenge_c: T,
}

impl<T: Copy> ChallengePoint<T> {
    pub fn from_fn(date: NaiveDate, mut value: impl FnMut(Track) -> T) -> Self {
        Self {
            date,
            challenge_a: value(Track::A),
            challenge_b: value(Track::B),
            challenge_c: value(Track::C),
        }
    }

    pub fn get(&self, track: Track) -> T {
        match track {
            Track::A => self.challenge_a,
            Track::B => self.challenge_b,
            Track::C => self.challenge_c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserChallengeScore {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Challenge A Score")]
    pub challenge_a: u32,
    #[serde(rename = "Challenge B Score")]
    pub challenge_b: u32,
    #[serde(rename = "Challenge C Score")]
    pub challenge_c: u32,
}

/// Rows that can be shown by a table renderer.
pub trait Tabular {
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl Tabular for UserRecord {
    const COLUMNS: &'static [&'static str] = &[
        "First Name",
        "Last Name",
        "Email",
        "Gender",
        "Date of Birth",
        "Phone Number",
        "Country",
        "Date of Sign Up",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.first_name.clone(),
            self.last_name.clone(),
            self.email.clone(),
            self.gender.to_string(),
            self.date_of_birth.to_string(),
            self.phone_number.clone(),
            self.country.clone(),
            self.signup_date.to_string(),
        ]
    }
}

impl Tabular for UserChallengeScore {
    const COLUMNS: &'static [&'static str] = &[
        "Email",
        "Challenge A Score",
        "Challenge B Score",
        "Challenge C Score",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.email.clone(),
            self.challenge_a.to_string(),
            self.challenge_b.to_string(),
            self.challenge_c.to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_rows<R: Tabular>(rows: &[R]) -> Self {
        Table {
            columns: R::COLUMNS.iter().map(|column| column.to_string()).collect(),
            rows: rows.iter().map(Tabular::cells).collect(),
        }
    }
}
