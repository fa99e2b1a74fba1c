use crate::{
    error::Result,
    multisrc::wpmangastream::{WpMangaStream, WpMangaStreamConfig},
    net::{ClientConfig, RateLimit},
    source::Source,
};

/// Fênix Scanlator, a Brazilian group on the MangaStream theme.
///
/// The site used to run Madara, hence `version_id` 2.
pub struct FenixScanlator {
    inner: WpMangaStream,
}

impl FenixScanlator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            inner: WpMangaStream::new(Self::config()?),
        })
    }

    pub fn config() -> Result<WpMangaStreamConfig> {
        Ok(WpMangaStreamConfig {
            client: ClientConfig::default().with_rate_limit(RateLimit::per_seconds(1, 2)?),
            version_id: 2,
            alt_name: "Nome alternativo: ",
            ..WpMangaStreamConfig::new(
                "fenixscanlator",
                "Fênix Scanlator",
                "https://fenixscanlator.xyz",
                "pt-BR",
                "MMMMM dd, yyyy",
            )
        })
    }

    pub fn template(&self) -> &WpMangaStream {
        &self.inner
    }
}

delegate_source!(FenixScanlator);
