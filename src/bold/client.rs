use crate::bold::classify::{MarkerClassifier, PostClassification, ResponseClassifier};
use crate::bold::db::{Database, BASE_URL};
use crate::bold::parse;
use crate::bold::Outcome;
use crate::{BoldError, Result};
use tracing::debug;
use url::Url;

/// Seam for the per-attempt remote call, so the retry and batch layers can
/// be exercised without sockets.
pub trait SubmitSequence {
    fn submit(&self, db: Database, seqid: &str, residues: &str) -> Result<Outcome>;
}

/// Submission client for the identification service. Stateless between
/// calls; each `submit` is exactly two HTTP round trips (form POST, then a
/// GET of the report page the POST response points at).
pub struct BoldClient {
    http: reqwest::blocking::Client,
    base_url: Url,
    classifier: Box<dyn ResponseClassifier>,
}

impl BoldClient {
    pub fn new() -> Result<Self> {
        Self::with_classifier(Box::new(MarkerClassifier))
    }

    pub fn with_classifier(classifier: Box<dyn ResponseClassifier>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("bold-taxa/", env!("CARGO_PKG_VERSION")))
            // The service can sit on a request for minutes when loaded.
            .timeout(std::time::Duration::from_secs(300))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()?;
        let base_url = Url::parse(BASE_URL)
            .map_err(|e| BoldError::Config(format!("bad base URL: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            classifier,
        })
    }
}

impl SubmitSequence for BoldClient {
    fn submit(&self, db: Database, seqid: &str, residues: &str) -> Result<Outcome> {
        let pane = db.pane_type();
        let sequence: String = residues.chars().filter(|c| !c.is_whitespace()).collect();

        let endpoint = self
            .base_url
            .join(pane.endpoint_path())
            .map_err(|e| BoldError::Config(format!("bad endpoint URL: {}", e)))?;

        debug!(%seqid, db = db.as_str(), url = %endpoint, "submitting sequence");
        let body = self
            .http
            .post(endpoint)
            .form(&[
                ("tabtype", pane.tab_tag()),
                ("searchdb", db.as_str()),
                ("sequence", sequence.as_str()),
            ])
            .send()?
            .text()?;

        let token = match self.classifier.classify_post(&body) {
            PostClassification::ResultToken(token) => token,
            PostClassification::NoMatch => return Ok(Outcome::NoMatch),
            PostClassification::Unrecognized => {
                return Err(BoldError::Submission(format!(
                    "no results token in submission response for {}",
                    seqid
                )))
            }
        };

        let result_url = self
            .base_url
            .join(&token)
            .map_err(|e| BoldError::Submission(format!("bad results token {:?}: {}", token, e)))?;

        debug!(%seqid, url = %result_url, "fetching report page");
        let page = self.http.get(result_url).send()?.text()?;

        parse::parse_results(&page, db, seqid, self.classifier.as_ref())
    }
}
