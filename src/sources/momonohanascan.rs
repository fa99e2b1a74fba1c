use crate::{
    error::Result,
    multisrc::madara::{Madara, MadaraConfig, MadaraSelectors},
    net::{ClientConfig, RateLimit},
    source::Source,
};

/// Momo no Hana Scan, a Brazilian group on the Madara theme.
pub struct MomoNoHanaScan {
    inner: Madara,
}

impl MomoNoHanaScan {
    pub fn new() -> Result<Self> {
        Ok(Self {
            inner: Madara::new(Self::config()?),
        })
    }

    pub fn config() -> Result<MadaraConfig> {
        Ok(MadaraConfig {
            client: ClientConfig::default().with_rate_limit(RateLimit::per_seconds(1, 2)?),
            use_new_chapter_endpoint: true,
            alt_name: "Nome alternativo: ",
            selectors: MadaraSelectors {
                popular_manga: "div.page-item-detail.manga".to_string(),
                ..Default::default()
            },
            ..MadaraConfig::new(
                "momonohanascan",
                "Momo no Hana Scan",
                "https://momonohanascan.com",
                "pt-BR",
                "dd/MM/yyyy",
            )
        })
    }

    pub fn template(&self) -> &Madara {
        &self.inner
    }
}

delegate_source!(MomoNoHanaScan);
