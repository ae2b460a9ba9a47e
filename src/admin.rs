use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::DashboardError;
use crate::render::{MessageLevel, Renderer};

/// Shared admin secret, compared in plaintext. There is no hashing, rate
/// limiting or lockout; anyone holding it can replace the site header.
pub const ADMIN_PASSWORD: &str = "glownet1234";

pub const ADMIN_PANEL_FIELD: &str = "admin_panel";
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["png", "jpg", "jpeg"];

const ADMIN_BUTTON: &str = "Admin";
const PASSWORD_FIELD: &str = "Admin Password";
const UPLOAD_FIELD: &str = "Upload new header image";
const UPDATE_BUTTON: &str = "Update Header Image";

/// Visibility of the admin panel, carried from one render pass to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminPanel {
    #[default]
    Hidden,
    Visible,
}

impl AdminPanel {
    /// The panel only ever opens; pressing "Admin" again (or submitting the
    /// password with Enter, which sends the form's first button) keeps it open.
    pub fn reveal(self) -> Self {
        AdminPanel::Visible
    }

    pub fn is_visible(self) -> bool {
        self == AdminPanel::Visible
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdminPanel::Hidden => "hidden",
            AdminPanel::Visible => "visible",
        }
    }

    pub fn from_form(value: Option<&str>) -> Self {
        match value {
            Some("visible") => AdminPanel::Visible,
            _ => AdminPanel::Hidden,
        }
    }
}

/// Whether an uploaded file name carries one of the allowed image extensions.
pub fn accepts_image_name(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_IMAGE_TYPES
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

pub fn authenticate(candidate: &str) -> Result<(), DashboardError> {
    if candidate == ADMIN_PASSWORD {
        Ok(())
    } else {
        Err(DashboardError::AuthenticationMismatch)
    }
}

/// The single header image file. Writes replace it wholesale; concurrent
/// writers race and the last one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderImageStore {
    path: PathBuf,
}

impl HeaderImageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Option<Vec<u8>>, DashboardError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(DashboardError::HeaderImageUnreadable {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub fn write(&self, bytes: &[u8]) -> Result<(), DashboardError> {
        let failure = |source: std::io::Error| DashboardError::FileWriteFailure {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(failure)?;
        }
        std::fs::write(&self.path, bytes).map_err(failure)?;
        info!(path = %self.path.display(), bytes = bytes.len(), "header image updated");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    Closed,
    AwaitingPassword,
    AwaitingUpload,
    Updated { bytes: usize },
}

/// Runs the admin section of a render pass. A wrong password or a failed
/// write ends the pass with an error; the panel stays open either way.
pub fn run_admin_panel<R: Renderer>(
    renderer: &mut R,
    panel: &mut AdminPanel,
    store: &HeaderImageStore,
) -> Result<AdminOutcome, DashboardError> {
    if renderer.render_button(ADMIN_BUTTON) {
        *panel = panel.reveal();
    }
    if !panel.is_visible() {
        return Ok(AdminOutcome::Closed);
    }

    let password = renderer.render_password_field(PASSWORD_FIELD);
    if password.is_empty() {
        return Ok(AdminOutcome::AwaitingPassword);
    }
    if let Err(err) = authenticate(&password) {
        warn!("admin password rejected");
        return Err(err);
    }

    let upload = renderer.render_file_upload(UPLOAD_FIELD, ALLOWED_IMAGE_TYPES);
    if !renderer.render_button(UPDATE_BUTTON) {
        return Ok(AdminOutcome::AwaitingUpload);
    }
    let Some(bytes) = upload else {
        renderer.render_message(MessageLevel::Error, "Choose an image before updating.");
        return Ok(AdminOutcome::AwaitingUpload);
    };

    store.write(&bytes)?;
    renderer.render_message(MessageLevel::Success, "Header image updated.");
    Ok(AdminOutcome::Updated { bytes: bytes.len() })
}
