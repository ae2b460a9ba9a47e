use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use crate::page::DashboardData;

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes every table of a render pass as CSV into `dir`, returning the
/// files written.
pub fn export_tables(data: &DashboardData, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let files = [
        "users.csv",
        "signup_activity.csv",
        "challenges_daily.csv",
        "challenges_cumulative.csv",
        "challenges_smoothed.csv",
        "challenge_scores.csv",
    ]
    .map(|name| dir.join(name));

    write_csv(&files[0], &data.users)?;
    write_csv(&files[1], &data.signup_activity)?;
    write_csv(&files[2], &data.daily)?;
    write_csv(&files[3], &data.cumulative)?;
    write_csv(&files[4], &data.smoothed)?;
    write_csv(&files[5], &data.scores)?;

    Ok(files.to_vec())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::config::DashboardConfig;

    #[test]
    fn exports_one_file_per_table_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig {
            users: 5,
            days: 10,
            as_of: NaiveDate::from_ymd_opt(2024, 10, 2),
            ..DashboardConfig::default()
        };
        let data = DashboardData::generate(&config).unwrap();

        let files = export_tables(&data, dir.path()).unwrap();
        assert_eq!(files.len(), 6);

        let users = std::fs::read_to_string(&files[0]).unwrap();
        let mut lines = users.lines();
        assert_eq!(
            lines.next(),
            Some("First Name,Last Name,Email,Gender,Date of Birth,Phone Number,Country,Date of Sign Up")
        );
        assert_eq!(lines.count(), 5);

        let smoothed = std::fs::read_to_string(&files[4]).unwrap();
        assert!(smoothed.starts_with("Date,Challenge A,Challenge B,Challenge C"));
        assert_eq!(smoothed.lines().count(), 1 + 4);
    }
}
