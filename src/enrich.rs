//! Detail page and tender document enrichment.
//!
//! Titles alone rarely carry a place name or an estimated cost. For each new
//! tender the enricher can follow the candidate's link, scan the detail page,
//! and, when the page links a tender document (usually a PDF notice inviting
//! tenders), scan the first part of that document as well. Document results
//! win over page results.
//!
//! Enrichment never fails the pipeline: any error along the way yields an
//! empty [`Enrichment`] and the normalizer falls back to title heuristics.

use crate::classify::{Classifiers, extract_monetary_value};
use crate::document;
use crate::http::{FetchError, PageFetcher};
use crate::models::Location;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

/// Fields recovered from a tender's detail page or linked document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub location: Option<Location>,
    pub value: Option<String>,
    /// Absolute URL of the embedded tender document, if one was linked.
    pub document_link: Option<String>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.value.is_none() && self.document_link.is_none()
    }
}

/// Optional per-candidate enrichment step.
#[async_trait]
pub trait Enrich: Send + Sync {
    async fn enrich(&self, link: &str) -> Enrichment;
}

/// Turns downloaded document bytes into at most `max_chars` characters of text.
pub type DocumentReader = fn(bytes: &[u8], max_chars: usize) -> Result<String, FetchError>;

/// Enricher that fetches the detail page and the first linked document.
pub struct DetailEnricher {
    fetcher: Arc<dyn PageFetcher>,
    classifiers: Classifiers,
    document_extensions: Vec<String>,
    pdf_max_chars: usize,
    read_document: DocumentReader,
}

impl DetailEnricher {
    /// Creates an enricher that reads linked documents as PDF.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Shared retrieval collaborator
    /// * `classifiers` - Location matcher applied to page and document text
    /// * `document_extensions` - Link suffixes that mark a tender document,
    ///   compared case-insensitively
    /// * `pdf_max_chars` - Leading characters of document text to scan
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        classifiers: Classifiers,
        document_extensions: &[String],
        pdf_max_chars: usize,
    ) -> Self {
        Self {
            fetcher,
            classifiers,
            document_extensions: document_extensions.iter().map(|e| e.to_lowercase()).collect(),
            pdf_max_chars,
            read_document: document::pdf_text,
        }
    }

    /// Replace the PDF reader, e.g. for a different document format.
    pub fn with_document_reader(mut self, reader: DocumentReader) -> Self {
        self.read_document = reader;
        self
    }

    async fn try_enrich(&self, link: &str) -> Result<Enrichment, FetchError> {
        let base = Url::parse(link)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Ok(Enrichment::default());
        }

        let html = self.fetcher.fetch_text(link).await?;
        let text = document::page_text(&html);
        let mut location = self.classifiers.match_location(&text);
        let mut value = extract_monetary_value(&text);

        let document_link = find_document_link(&html, &base, &self.document_extensions);
        if let Some(doc) = &document_link {
            let doc_text = self.document_text(doc).await?;
            if let Some(l) = self.classifiers.match_location(&doc_text) {
                location = Some(l);
            }
            if let Some(v) = extract_monetary_value(&doc_text) {
                value = Some(v);
            }
        }

        Ok(Enrichment {
            location,
            value,
            document_link,
        })
    }

    async fn document_text(&self, url: &str) -> Result<String, FetchError> {
        let bytes = self.fetcher.fetch_bytes(url).await?;
        let max_chars = self.pdf_max_chars;
        let read = self.read_document;
        tokio::task::spawn_blocking(move || read(&bytes, max_chars))
            .await
            .map_err(|e| FetchError::Pdf(e.to_string()))?
    }
}

#[async_trait]
impl Enrich for DetailEnricher {
    #[instrument(level = "debug", skip(self))]
    async fn enrich(&self, link: &str) -> Enrichment {
        match self.try_enrich(link).await {
            Ok(enrichment) => enrichment,
            Err(e) => {
                debug!(error = %e, "Enrichment failed; using title heuristics");
                Enrichment::default()
            }
        }
    }
}

/// First anchor whose target ends in one of `extensions`, made absolute.
pub fn find_document_link(html: &str, base: &Url, extensions: &[String]) -> Option<String> {
    document::anchors(html).into_iter().find_map(|anchor| {
        let href = anchor.href?;
        let href = href.trim();
        let lower = href.to_lowercase();
        let path = lower.split(['?', '#']).next().unwrap_or_default();
        if extensions.iter().any(|ext| path.ends_with(ext.as_str())) {
            base.join(href).ok().map(|u| u.to_string())
        } else {
            None
        }
    })
}
