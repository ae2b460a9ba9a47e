use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::{ChallengePoint, SignupActivityPoint, Track};

pub const CHART_WIDTH: u32 = 600;
pub const CHART_HEIGHT: u32 = 400;

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";
const FOLD_KEY: &str = "Challenge";
const FOLD_VALUE: &str = "Completions";

/// Declarative chart description, serialised as a Vega-Lite document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub data: InlineData,
    pub mark: Mark,
    pub encoding: Encoding,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineData {
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Basis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: MarkKind,
    pub interpolate: Interpolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Temporal,
    Quantitative,
    Nominal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEncoding {
    pub field: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl FieldEncoding {
    fn new(field: &str, kind: FieldType) -> Self {
        Self {
            field: field.to_string(),
            kind,
            title: None,
        }
    }

    fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encoding {
    pub x: FieldEncoding,
    pub y: FieldEncoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<FieldEncoding>,
    pub tooltip: Vec<FieldEncoding>,
}

/// One row of a wide series reshaped to long form: (date, track, value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldedRow<T> {
    pub date: NaiveDate,
    pub track: Track,
    pub value: T,
}

pub fn fold<T: Copy>(series: &[ChallengePoint<T>]) -> Vec<FoldedRow<T>> {
    series
        .iter()
        .flat_map(|point| {
            Track::ALL.into_iter().map(move |track| FoldedRow {
                date: point.date,
                track,
                value: point.get(track),
            })
        })
        .collect()
}

fn line_chart(title: &str, values: Vec<Value>, encoding: Encoding) -> ChartSpec {
    ChartSpec {
        schema: VEGA_LITE_SCHEMA,
        title: title.to_string(),
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
        data: InlineData { values },
        mark: Mark {
            kind: MarkKind::Line,
            interpolate: Interpolation::Basis,
        },
        encoding,
    }
}

pub fn signup_activity_chart(activity: &[SignupActivityPoint]) -> ChartSpec {
    let values = activity
        .iter()
        .map(|point| json!({ "Date of Sign Up": point.date.to_string(), "Count": point.count }))
        .collect();

    let date = FieldEncoding::new("Date of Sign Up", FieldType::Temporal);
    let count = FieldEncoding::new("Count", FieldType::Quantitative);
    line_chart(
        "User Sign Up Activity Over Time",
        values,
        Encoding {
            x: date.clone(),
            y: count.clone().titled("Sign Up Count"),
            color: None,
            tooltip: vec![date, count],
        },
    )
}

fn challenge_chart<T>(series: &[ChallengePoint<T>], title: &str, y_title: &str) -> ChartSpec
where
    T: Copy + Serialize,
{
    let values = fold(series)
        .into_iter()
        .map(|row| {
            json!({
                "Date": row.date.to_string(),
                FOLD_KEY: row.track.label(),
                FOLD_VALUE: row.value,
            })
        })
        .collect();

    let date = FieldEncoding::new("Date", FieldType::Temporal);
    let completions = FieldEncoding::new(FOLD_VALUE, FieldType::Quantitative);
    let challenge = FieldEncoding::new(FOLD_KEY, FieldType::Nominal);
    line_chart(
        title,
        values,
        Encoding {
            x: date.clone(),
            y: completions.clone().titled(y_title),
            color: Some(challenge.clone()),
            tooltip: vec![date, completions, challenge],
        },
    )
}

pub fn cumulative_challenge_chart(cumulative: &[ChallengePoint<u64>]) -> ChartSpec {
    challenge_chart(
        cumulative,
        "Cumulative Challenge Completions Over Time",
        "Cumulative Completions",
    )
}

pub fn smoothed_challenge_chart(smoothed: &[ChallengePoint<f64>]) -> ChartSpec {
    challenge_chart(
        smoothed,
        "Smoothed Daily Challenge Completions Over Time",
        "Smoothed Daily Completions",
    )
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, 1).unwrap() + Duration::days(offset)
    }

    fn cumulative() -> Vec<ChallengePoint<u64>> {
        vec![
            ChallengePoint::from_fn(day(0), |track| track as u64 + 1),
            ChallengePoint::from_fn(day(1), |track| track as u64 + 5),
        ]
    }

    #[test]
    fn fold_emits_one_row_per_date_and_track() {
        let rows = fold(&cumulative());
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].track, Track::A);
        assert_eq!(rows[2].track, Track::C);
        assert_eq!(rows[2].value, 3);
        assert_eq!(rows[3].date, day(1));
        assert_eq!(rows[3].value, 5);
    }

    #[test]
    fn builders_are_pure() {
        let series = cumulative();
        assert_eq!(
            cumulative_challenge_chart(&series),
            cumulative_challenge_chart(&series)
        );

        let activity = vec![SignupActivityPoint {
            date: day(3),
            count: 2,
        }];
        assert_eq!(
            signup_activity_chart(&activity),
            signup_activity_chart(&activity)
        );
    }

    #[test]
    fn signup_chart_serialises_to_vega_lite() {
        let activity = vec![SignupActivityPoint {
            date: day(3),
            count: 2,
        }];
        let spec = serde_json::to_value(signup_activity_chart(&activity)).unwrap();

        assert_eq!(spec["$schema"], VEGA_LITE_SCHEMA);
        assert_eq!(spec["title"], "User Sign Up Activity Over Time");
        assert_eq!(spec["width"], 600);
        assert_eq!(spec["height"], 400);
        assert_eq!(spec["mark"], json!({ "type": "line", "interpolate": "basis" }));
        assert_eq!(
            spec["encoding"]["x"],
            json!({ "field": "Date of Sign Up", "type": "temporal" })
        );
        assert_eq!(spec["encoding"]["y"]["title"], "Sign Up Count");
        assert!(spec["encoding"].get("color").is_none());
        assert_eq!(
            spec["data"]["values"][0],
            json!({ "Date of Sign Up": "2022-01-04", "Count": 2 })
        );
    }

    #[test]
    fn challenge_charts_colour_by_track() {
        let smoothed = vec![ChallengePoint::from_fn(day(6), |_| 2.5)];
        let spec = smoothed_challenge_chart(&smoothed);

        assert_eq!(spec.title, "Smoothed Daily Challenge Completions Over Time");
        assert_eq!(
            spec.encoding.color,
            Some(FieldEncoding::new("Challenge", FieldType::Nominal))
        );
        assert_eq!(
            spec.encoding.y.title.as_deref(),
            Some("Smoothed Daily Completions")
        );
        let fields: Vec<_> = spec.encoding.tooltip.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["Date", "Completions", "Challenge"]);
        assert_eq!(
            spec.data.values[1],
            json!({ "Date": "2022-01-07", "Challenge": "Challenge B", "Completions": 2.5 })
        );
    }
}
