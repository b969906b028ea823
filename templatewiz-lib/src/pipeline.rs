//! Turns a webpage URL into a brand palette.
//!
//! fetch page -> inline styles and same-origin links -> CTA lookup ->
//! stylesheet selection -> fetch and reduce -> filter and chunk ->
//! per-chunk extraction -> merge -> favicon fallback.

use std::sync::Arc;

use url::Url;

use crate::chunker::chunk;
use crate::config::ExtractorConfig;
use crate::error::{ConfigError, ExtractError, FaviconError, LlmError};
use crate::extract::cta::locate_cta;
use crate::extract::palette::extract_palettes;
use crate::extract::stylesheets::select_stylesheets;
use crate::favicon::{FaviconPalette, FaviconSource};
use crate::llm::{LanguageModel, OpenAiCompatibleModel};
use crate::net::{HttpFetcher, ReqwestFetcher};
use crate::palette::{apply_favicon_fallback, merge, Palette};
use crate::parser::page::Page;
use crate::style::color_filter::filter;
use crate::style::owned_css::StyleRule;
use crate::style::reducer::reduce;
use crate::tokenizer::{TiktokenTokenizer, Tokenizer};
use crate::writing_style;

/// What the page itself yields before any stylesheet is fetched.
struct PageParts {
    inline_styles: Vec<String>,
    stylesheet_links: Vec<Url>,
    body_html: String,
    favicon_url: Option<Url>,
}

pub struct ExtractionPipeline {
    config: ExtractorConfig,
    fetcher: Arc<dyn HttpFetcher>,
    model: Arc<dyn LanguageModel>,
    tokenizer: Arc<dyn Tokenizer>,
    favicon: Arc<dyn FaviconSource>,
}

impl ExtractionPipeline {
    pub fn new(
        config: ExtractorConfig,
        fetcher: Arc<dyn HttpFetcher>,
        model: Arc<dyn LanguageModel>,
        tokenizer: Arc<dyn Tokenizer>,
        favicon: Arc<dyn FaviconSource>,
    ) -> Self {
        ExtractionPipeline {
            config,
            fetcher,
            model,
            tokenizer,
            favicon,
        }
    }

    /// Wires up the network-backed implementations described by `config`.
    pub fn from_config(config: ExtractorConfig) -> Result<Self, ConfigError> {
        let fetcher: Arc<dyn HttpFetcher> =
            Arc::new(ReqwestFetcher::new(config.http_timeout, config.retry.clone())?);
        let model = Arc::new(OpenAiCompatibleModel::new(
            &config.api_base,
            config.api_key.clone(),
            config.llm_timeout,
            config.retry.clone(),
        )?);
        let tokenizer = Arc::new(TiktokenTokenizer::for_model(&config.model)?);
        let favicon = Arc::new(FaviconPalette::new(fetcher.clone()));
        Ok(Self::new(config, fetcher, model, tokenizer, favicon))
    }

    /// Extracts the color and font palette of the page at `url`.
    ///
    /// Fails only when the page itself cannot be retrieved; every later
    /// stage degrades to fewer results instead.
    pub fn fetch_colors_from_url(&self, url: &str) -> Result<Palette, ExtractError> {
        let page_url = Url::parse(url.trim()).map_err(|source| ExtractError::InvalidUrl {
            input: url.to_string(),
            source,
        })?;

        log::info!("fetching {page_url}");
        let response = self
            .fetcher
            .get(&page_url)
            .map_err(|source| ExtractError::Fetch {
                url: page_url.clone(),
                source,
            })?;
        if !response.is_ok() {
            log::error!("failed to retrieve the webpage {page_url}, status {}", response.status);
            return Err(ExtractError::PageStatus {
                url: page_url,
                status: response.status,
            });
        }

        let parts = split_page(&response.text(), &page_url);
        log::info!(
            "found {} inline style block(s) and {} same-origin stylesheet(s)",
            parts.inline_styles.len(),
            parts.stylesheet_links.len()
        );

        let snippet = self.tokenizer.truncate(&parts.body_html, self.config.max_tokens);
        let cta = locate_cta(
            self.model.as_ref(),
            &self.config.model,
            self.config.temperature,
            &snippet,
        );
        match cta.primary.describe() {
            Some(description) => log::info!("call to action is {description}"),
            None => log::info!("no call to action found"),
        }

        let selected = select_stylesheets(
            self.model.as_ref(),
            &self.config.model,
            self.config.temperature,
            &parts.stylesheet_links,
        );
        log::info!("using {} of {} stylesheet(s)", selected.len(), parts.stylesheet_links.len());

        let mut rules: Vec<StyleRule> = parts.inline_styles.iter().flat_map(|css| reduce(css)).collect();
        for sheet in &selected {
            rules.extend(self.fetch_stylesheet(sheet));
        }

        let blocks = filter(&rules);
        let chunks: Vec<String> = chunk(&blocks, self.config.max_tokens, self.tokenizer.as_ref()).collect();
        log::info!(
            "{} color rule(s) of {} packed into {} chunk(s)",
            blocks.len(),
            rules.len(),
            chunks.len()
        );

        let partials = extract_palettes(self.model.as_ref(), &self.config, &chunks, &cta);
        let mut palette = merge(&partials);
        apply_favicon_fallback(&mut palette, || match &parts.favicon_url {
            Some(icon_url) => self.favicon.top_k_colors(icon_url, 1),
            None => Err(FaviconError::NotFound(page_url.clone())),
        });
        Ok(palette)
    }

    /// See [`writing_style::apply_writing_style`].
    pub fn apply_writing_style(
        &self,
        original_content: &str,
        reference_url: &Url,
    ) -> Result<String, LlmError> {
        writing_style::apply_writing_style(
            self.fetcher.as_ref(),
            self.model.as_ref(),
            &self.config.model,
            self.config.rewrite_temperature,
            original_content,
            reference_url,
        )
    }

    /// Reduced rules of one stylesheet; empty if it cannot be fetched.
    fn fetch_stylesheet(&self, url: &Url) -> Vec<StyleRule> {
        match self.fetcher.get(url) {
            Ok(response) if response.is_ok() => {
                let rules = reduce(&response.text());
                log::debug!("{url}: {} rule(s)", rules.len());
                rules
            }
            Ok(response) => {
                log::warn!("skipping stylesheet {url}: HTTP {}", response.status);
                Vec::new()
            }
            Err(e) => {
                log::warn!("skipping stylesheet {url}: {e}");
                Vec::new()
            }
        }
    }
}

fn split_page(html: &str, page_url: &Url) -> PageParts {
    let page = Page::parse(html, page_url.clone());
    let stylesheet_links = page
        .stylesheet_links()
        .into_iter()
        .filter(|link| {
            let keep = same_host(link, page_url);
            if !keep {
                log::debug!("ignoring cross-origin stylesheet {link}");
            }
            keep
        })
        .collect();
    PageParts {
        inline_styles: page.inline_styles(),
        stylesheet_links,
        body_html: page.body_html(),
        favicon_url: page.favicon_url(),
    }
}

/// Host and explicit port must match; scheme is ignored, so an `https`
/// stylesheet on the host of an `http` page is kept.
fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str().is_some() && a.host_str() == b.host_str() && a.port() == b.port()
}
