use gtk4::gio;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpenLinkError {
    #[error("failed to open {uri}")]
    Launch {
        uri: String,
        #[source]
        source: gtk4::glib::Error,
    },
}

/// Opens a link target in a new browsing context.
pub trait LinkOpener {
    fn open(&self, uri: &str) -> Result<(), OpenLinkError>;
}

/// Hands the URI to the desktop's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct GioLinkOpener;

impl LinkOpener for GioLinkOpener {
    fn open(&self, uri: &str) -> Result<(), OpenLinkError> {
        tracing::debug!(uri, "launching default handler for link");
        gio::AppInfo::launch_default_for_uri(uri, None::<&gio::AppLaunchContext>).map_err(
            |source| OpenLinkError::Launch {
                uri: uri.to_string(),
                source,
            },
        )
    }
}
