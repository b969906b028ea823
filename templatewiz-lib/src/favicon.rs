//! Dominant colors of a site's favicon, used when the stylesheets name no
//! primary color.

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::error::FaviconError;
use crate::net::HttpFetcher;

pub trait FaviconSource: Send + Sync {
    /// The `k` most frequent colors of the icon at `icon_url`, as
    /// `("#rrggbb", percentage)` pairs, most frequent first.
    ///
    /// The pipeline locates the icon from the page it already parsed
    /// (`Page::favicon_url`), so the page is not fetched twice.
    fn top_k_colors(&self, icon_url: &Url, k: usize) -> Result<Vec<(String, f64)>, FaviconError>;
}

/// Downloads a favicon and counts the colors of its opaque pixels.
pub struct FaviconPalette {
    fetcher: Arc<dyn HttpFetcher>,
}

impl FaviconPalette {
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        FaviconPalette { fetcher }
    }
}

impl FaviconSource for FaviconPalette {
    fn top_k_colors(&self, icon_url: &Url, k: usize) -> Result<Vec<(String, f64)>, FaviconError> {
        log::debug!("fetching favicon {icon_url}");
        let icon = self.fetcher.get(icon_url).map_err(|source| FaviconError::Fetch {
            url: icon_url.clone(),
            source,
        })?;
        if !icon.is_ok() {
            return Err(FaviconError::Status {
                url: icon_url.clone(),
                status: icon.status,
            });
        }
        rank_colors(icon_url, &icon.body, k)
    }
}

/// Decodes `bytes` and ranks the colors of pixels that are not fully
/// transparent. Ties are ordered by hex code.
pub fn rank_colors(url: &Url, bytes: &[u8], k: usize) -> Result<Vec<(String, f64)>, FaviconError> {
    let image = image::load_from_memory(bytes)
        .map_err(|source| FaviconError::Decode {
            url: url.clone(),
            source,
        })?
        .to_rgba8();

    let mut counts: HashMap<[u8; 3], usize> = HashMap::new();
    let mut total = 0usize;
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue;
        }
        *counts.entry([r, g, b]).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return Err(FaviconError::Empty(url.clone()));
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|([r, g, b], count)| (format!("#{r:02x}{g:02x}{b:02x}"), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Ok(ranked
        .into_iter()
        .take(k)
        .map(|(hex, count)| (hex, count as f64 * 100.0 / total as f64))
        .collect())
}
