use tracing::debug;

use crate::admin::{run_admin_panel, AdminOutcome, AdminPanel, HeaderImageStore};
use crate::aggregate;
use crate::charts::{self, ChartSpec};
use crate::config::{ChallengeView, DashboardConfig, HeaderMode};
use crate::error::DashboardError;
use crate::generator::{self, GeneratorParams};
use crate::models::{
    ChallengePoint, SignupActivityPoint, Table, UserChallengeScore, UserRecord,
};
use crate::render::{ImageSource, MessageLevel, Renderer};

pub const PAGE_TITLE: &str = "User Sign Up and Challenge Dashboard";

/// Everything one render pass shows, regenerated from scratch each time.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub users: Vec<UserRecord>,
    pub signup_activity: Vec<SignupActivityPoint>,
    pub daily: Vec<ChallengePoint<u32>>,
    pub cumulative: Vec<ChallengePoint<u64>>,
    pub smoothed: Vec<ChallengePoint<f64>>,
    pub scores: Vec<UserChallengeScore>,
}

impl DashboardData {
    pub fn generate(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let params = GeneratorParams::new(
            config.seed,
            config.users,
            config.days,
            config.reference_date(),
        )?;

        let users = generator::generate_roster(&params)?;
        let signup_activity = aggregate::signup_activity(&users);
        let daily = generator::generate_challenge_counts(&params)?;
        let cumulative = aggregate::cumulative_sum(&daily);
        let smoothed = aggregate::smooth(&daily, config.smoothing_window)?;
        let scores = generator::generate_scores(params.seed, &users);

        debug!(
            users = users.len(),
            activity_days = signup_activity.len(),
            smoothed_days = smoothed.len(),
            "dashboard data generated"
        );

        Ok(Self {
            users,
            signup_activity,
            daily,
            cumulative,
            smoothed,
            scores,
        })
    }

    pub fn signup_chart(&self) -> ChartSpec {
        charts::signup_activity_chart(&self.signup_activity)
    }

    /// Challenge charts selected by `view`, cumulative first.
    pub fn challenge_charts(&self, view: ChallengeView) -> Vec<ChartSpec> {
        let mut specs = Vec::new();
        if view.shows_cumulative() {
            specs.push(charts::cumulative_challenge_chart(&self.cumulative));
        }
        if view.shows_smoothed() {
            specs.push(charts::smoothed_challenge_chart(&self.smoothed));
        }
        specs
    }
}

fn header_image(
    config: &DashboardConfig,
    store: &HeaderImageStore,
) -> Result<ImageSource, DashboardError> {
    let placeholder = ImageSource::Url(config.header.image_url.clone());
    match config.header.mode {
        HeaderMode::Static => Ok(placeholder),
        HeaderMode::Uploadable => Ok(store.read()?.map(ImageSource::Bytes).unwrap_or(placeholder)),
    }
}

/// One full render pass. `panel` comes in with the previous pass's state
/// and leaves with the state the next pass should start from. Any error ends
/// the pass and is shown on the page before being returned.
pub fn render_dashboard<R: Renderer>(
    config: &DashboardConfig,
    data: &DashboardData,
    renderer: &mut R,
    panel: &mut AdminPanel,
    store: &HeaderImageStore,
) -> Result<AdminOutcome, DashboardError> {
    let result = render_sections(config, data, renderer, panel, store);
    if let Err(err) = &result {
        renderer.render_message(MessageLevel::Error, &err.to_string());
    }
    result
}

fn render_sections<R: Renderer>(
    config: &DashboardConfig,
    data: &DashboardData,
    renderer: &mut R,
    panel: &mut AdminPanel,
    store: &HeaderImageStore,
) -> Result<AdminOutcome, DashboardError> {
    renderer.render_title(PAGE_TITLE);
    let header = header_image(config, store)?;
    renderer.render_image(&header, config.header.width);

    renderer.render_subheader("User Sign Up Information");
    renderer.render_table(&Table::from_rows(&data.users));

    renderer.render_subheader("Sign Up Activity Over Time");
    renderer.render_chart(&data.signup_chart())?;

    for spec in data.challenge_charts(config.challenge_view) {
        renderer.render_subheader(&spec.title);
        renderer.render_chart(&spec)?;
    }

    renderer.render_subheader("User Challenge Scores");
    renderer.render_table(&Table::from_rows(&data.scores));

    match config.header.mode {
        HeaderMode::Static => Ok(AdminOutcome::Closed),
        HeaderMode::Uploadable => run_admin_panel(renderer, panel, store),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::admin::tests::ScriptedRenderer;
    use crate::admin::ADMIN_PASSWORD;
    use crate::models::Track;

    fn config() -> DashboardConfig {
        DashboardConfig {
            as_of: NaiveDate::from_ymd_opt(2024, 10, 2),
            ..DashboardConfig::default()
        }
    }

    #[test]
    fn default_scenario_shapes() {
        let data = DashboardData::generate(&config()).unwrap();

        assert_eq!(data.users.len(), 100);
        assert_eq!(data.scores.len(), 100);
        assert_eq!(data.daily.len(), 365);
        assert_eq!(data.cumulative.len(), 365);
        assert_eq!(data.smoothed.len(), 359);
        assert_eq!(
            data.signup_activity.iter().map(|p| p.count).sum::<usize>(),
            100
        );
        for track in Track::ALL {
            let total: u64 = data.daily.iter().map(|p| u64::from(p.get(track))).sum();
            assert_eq!(data.cumulative[364].get(track), total);
        }
    }

    #[test]
    fn invalid_counts_fail_generation() {
        let config = DashboardConfig {
            users: 0,
            ..config()
        };
        assert!(matches!(
            DashboardData::generate(&config),
            Err(DashboardError::InvalidParameter(_))
        ));
    }

    #[test]
    fn page_sections_follow_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = HeaderImageStore::new(dir.path().join("header.png"));
        let config = config();
        let data = DashboardData::generate(&config).unwrap();
        let mut renderer = ScriptedRenderer::default();
        let mut panel = AdminPanel::Hidden;

        let outcome = render_dashboard(&config, &data, &mut renderer, &mut panel, &store).unwrap();

        assert_eq!(outcome, AdminOutcome::Closed);
        let expected_image = format!("image:{}", config.header.image_url);
        assert_eq!(
            renderer.shown,
            vec![
                format!("title:{PAGE_TITLE}"),
                expected_image,
                "subheader:User Sign Up Information".to_string(),
                "table:100".to_string(),
                "subheader:Sign Up Activity Over Time".to_string(),
                "chart:User Sign Up Activity Over Time".to_string(),
                "subheader:Cumulative Challenge Completions Over Time".to_string(),
                "chart:Cumulative Challenge Completions Over Time".to_string(),
                "subheader:Smoothed Daily Challenge Completions Over Time".to_string(),
                "chart:Smoothed Daily Challenge Completions Over Time".to_string(),
                "subheader:User Challenge Scores".to_string(),
                "table:100".to_string(),
                "button:Admin".to_string(),
            ]
        );
    }

    #[test]
    fn static_header_skips_admin_panel() {
        let dir = tempfile::tempdir().unwrap();
        let store = HeaderImageStore::new(dir.path().join("header.png"));
        store.write(b"stored").unwrap();
        let mut config = config();
        config.header.mode = HeaderMode::Static;
        config.challenge_view = ChallengeView::Cumulative;
        let data = DashboardData::generate(&config).unwrap();
        let mut renderer = ScriptedRenderer::default();
        renderer.pressed.insert("Admin");
        let mut panel = AdminPanel::Hidden;

        render_dashboard(&config, &data, &mut renderer, &mut panel, &store).unwrap();

        assert_eq!(panel, AdminPanel::Hidden);
        assert!(renderer.shown.contains(&format!("image:{}", config.header.image_url)));
        assert!(!renderer.shown.iter().any(|s| s.starts_with("button:")));
        assert!(!renderer
            .shown
            .iter()
            .any(|s| s == "chart:Smoothed Daily Challenge Completions Over Time"));
    }

    #[test]
    fn uploaded_image_replaces_placeholder_on_next_pass() {
        let dir = tempfile::tempdir().unwrap();
        let store = HeaderImageStore::new(dir.path().join("uploads").join("header.png"));
        let config = config();
        let data = DashboardData::generate(&config).unwrap();
        let mut panel = AdminPanel::Visible;

        let mut update = ScriptedRenderer::default();
        update.passwords.insert("Admin Password", ADMIN_PASSWORD.to_string());
        update.uploads.insert("Upload new header image", vec![7; 16]);
        update.pressed.insert("Update Header Image");
        render_dashboard(&config, &data, &mut update, &mut panel, &store).unwrap();

        let mut next = ScriptedRenderer::default();
        render_dashboard(&config, &data, &mut next, &mut panel, &store).unwrap();
        assert_eq!(next.shown[1], "image:16 bytes");
    }

    #[test]
    fn wrong_password_is_shown_and_keeps_panel_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = HeaderImageStore::new(dir.path().join("header.png"));
        let config = config();
        let data = DashboardData::generate(&config).unwrap();
        let mut panel = AdminPanel::Visible;
        let mut renderer = ScriptedRenderer::default();
        renderer.passwords.insert("Admin Password", "wrong".to_string());

        let result = render_dashboard(&config, &data, &mut renderer, &mut panel, &store);

        assert!(matches!(result, Err(DashboardError::AuthenticationMismatch)));
        assert_eq!(panel, AdminPanel::Visible);
        assert_eq!(
            renderer.messages,
            vec![(MessageLevel::Error, "incorrect admin password".to_string())]
        );
        assert!(!renderer.shown.iter().any(|s| s.starts_with("upload:")));
    }
}
