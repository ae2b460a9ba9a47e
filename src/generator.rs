use chrono::{Duration, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};
use tracing::debug;

use crate::error::DashboardError;
use crate::models::{ChallengePoint, Gender, Track, UserChallengeScore, UserRecord};

pub const MIN_AGE: u32 = 20;
pub const MAX_AGE: u32 = 50;
pub const SIGNUP_WINDOW_DAYS: i64 = 365;

// Names and locales come from their own stream so the numeric columns stay
// stable when the pools change.
const NAME_STREAM_SALT: u64 = 0x6e61_6d65_7331;

const FIRST_NAMES: &[&str] = &[
    "Avery", "Jules", "Kiara", "Noah", "Emma", "Liam", "Olivia", "Mateo", "Sofia", "Ethan",
    "Amara", "Lucas", "Maya", "Leo", "Chloe", "Arjun", "Hana", "Diego", "Zara", "Owen",
    "Priya", "Felix", "Ines", "Samuel", "Nora", "Kenji", "Lena", "Tomas", "Aisha", "Hugo",
    "Freya", "Rafael", "Yara", "Elias", "Mila", "Jonah", "Talia", "Omar", "Clara", "Ivan",
];

const LAST_NAMES: &[&str] = &[
    "Lee", "Moreno", "Patel", "Smith", "Johnson", "Garcia", "Nguyen", "Kim", "Brown", "Rossi",
    "Muller", "Silva", "Khan", "Tanaka", "Dubois", "Novak", "Walker", "Lopez", "Ahmed", "Cohen",
    "Fischer", "Haddad", "Jensen", "Kowalski", "Larsen", "Mensah", "Okafor", "Park", "Quinn",
    "Reyes", "Schmidt", "Torres", "Vargas", "Wright", "Young", "Zhang", "Baker", "Castillo",
    "Evans", "Hughes",
];

const COUNTRIES: &[&str] = &[
    "Argentina", "Australia", "Austria", "Belgium", "Brazil", "Canada", "Chile", "China",
    "Colombia", "Denmark", "Egypt", "Finland", "France", "Germany", "Ghana", "Greece", "India",
    "Indonesia", "Ireland", "Italy", "Japan", "Kenya", "Mexico", "Morocco", "Netherlands",
    "New Zealand", "Nigeria", "Norway", "Peru", "Philippines", "Poland", "Portugal",
    "South Africa", "South Korea", "Spain", "Sweden", "Switzerland", "Turkey",
    "United Kingdom", "United States of America",
];

const PHONE_FORMATS: &[&str] = &[
    "+1-###-###-####",
    "(###) ###-####",
    "###.###.####",
    "001-###-###-####x###",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorParams {
    pub seed: u64,
    pub users: usize,
    pub days: usize,
    /// Reference date that ages are measured against.
    pub as_of: NaiveDate,
    pub epoch: NaiveDate,
}

impl GeneratorParams {
    pub fn new(
        seed: u64,
        users: usize,
        days: usize,
        as_of: NaiveDate,
    ) -> Result<Self, DashboardError> {
        if users == 0 {
            return Err(DashboardError::InvalidParameter(
                "user count must be at least 1".to_string(),
            ));
        }
        if days == 0 {
            return Err(DashboardError::InvalidParameter(
                "day horizon must be at least 1".to_string(),
            ));
        }
        let epoch = NaiveDate::from_ymd_opt(2022, 1, 1).ok_or_else(|| {
            DashboardError::InvalidParameter("signup epoch is not a valid date".to_string())
        })?;

        Ok(Self {
            seed,
            users,
            days,
            as_of,
            epoch,
        })
    }
}

pub fn track_rate(track: Track) -> f64 {
    match track {
        Track::A => 3.0,
        Track::B => 2.0,
        Track::C => 4.0,
    }
}

fn birth_date_bounds(as_of: NaiveDate) -> Result<(NaiveDate, NaiveDate), DashboardError> {
    let out_of_range = || {
        DashboardError::InvalidParameter(format!(
            "reference date {as_of} leaves no room for a {MIN_AGE}-{MAX_AGE} age window"
        ))
    };
    let latest = as_of
        .checked_sub_months(Months::new(MIN_AGE * 12))
        .ok_or_else(out_of_range)?;
    let earliest = as_of
        .checked_sub_months(Months::new((MAX_AGE + 1) * 12))
        .and_then(|date| date.succ_opt())
        .ok_or_else(out_of_range)?;
    Ok((earliest, latest))
}

fn pick<'a>(rng: &mut StdRng, pool: &'a [&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

fn phone_number(rng: &mut StdRng) -> String {
    let format = pick(rng, PHONE_FORMATS);
    format
        .chars()
        .map(|c| {
            if c == '#' {
                char::from(b'0' + rng.gen_range(0..10u8))
            } else {
                c
            }
        })
        .collect()
}

pub fn generate_roster(params: &GeneratorParams) -> Result<Vec<UserRecord>, DashboardError> {
    let (earliest_birth, latest_birth) = birth_date_bounds(params.as_of)?;
    let birth_span = (latest_birth - earliest_birth).num_days();

    let mut numeric = StdRng::seed_from_u64(params.seed);
    let mut names = StdRng::seed_from_u64(params.seed ^ NAME_STREAM_SALT);
    let mut users = Vec::with_capacity(params.users);

    for _ in 0..params.users {
        let first_name = pick(&mut names, FIRST_NAMES).to_string();
        let last_name = pick(&mut names, LAST_NAMES).to_string();
        let country = pick(&mut names, COUNTRIES).to_string();
        let date_of_birth = earliest_birth + Duration::days(names.gen_range(0..=birth_span));
        let phone_number = phone_number(&mut names);

        let gender = Gender::ALL[numeric.gen_range(0..Gender::ALL.len())];
        let signup_date = params.epoch + Duration::days(numeric.gen_range(0..SIGNUP_WINDOW_DAYS));

        users.push(UserRecord {
            email: format!(
                "{}.{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase()
            ),
            first_name,
            last_name,
            gender,
            date_of_birth,
            phone_number,
            country,
            signup_date,
        });
    }

    debug!(users = users.len(), seed = params.seed, "generated user roster");
    Ok(users)
}

/// Daily completion counts, one Poisson draw per track and day.
pub fn generate_challenge_counts(
    params: &GeneratorParams,
) -> Result<Vec<ChallengePoint<u32>>, DashboardError> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut columns: Vec<Vec<u32>> = Vec::with_capacity(Track::ALL.len());

    for track in Track::ALL {
        let poisson = Poisson::new(track_rate(track))
            .map_err(|err| DashboardError::InvalidParameter(err.to_string()))?;
        let draws = (0..params.days)
            .map(|_| poisson.sample(&mut rng) as u32)
            .collect();
        columns.push(draws);
    }

    let series: Vec<ChallengePoint<u32>> = (0..params.days)
        .map(|day| {
            let date = params.epoch + Duration::days(day as i64);
            ChallengePoint::from_fn(date, |track| columns[track as usize][day])
        })
        .collect();

    debug!(days = series.len(), seed = params.seed, "generated challenge completions");
    Ok(series)
}

/// Per-user scores in `0..100`, drawn independently of the completion series.
pub fn generate_scores(seed: u64, roster: &[UserRecord]) -> Vec<UserChallengeScore> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut columns: Vec<Vec<u32>> = Vec::with_capacity(Track::ALL.len());
    for _ in Track::ALL {
        columns.push((0..roster.len()).map(|_| rng.gen_range(0..100)).collect());
    }

    roster
        .iter()
        .enumerate()
        .map(|(index, user)| UserChallengeScore {
            email: user.email.clone(),
            challenge_a: columns[Track::A as usize][index],
            challenge_b: columns[Track::B as usize][index],
            challenge_c: columns[Track::C as usize][index],
        })
        .collect()
}
