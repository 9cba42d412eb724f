//! The remote endpoint variant: a blocking SPARQL-protocol client over
//! HTTP, parsing the SPARQL-JSON results format.
//!
//! `reqwest` is not a teacher dependency; it is brought in from the rest of
//! the example pack (noted in `DESIGN.md`) because the teacher's validation
//! architecture never talks to a remote query service — it only reads local
//! RDF files.

use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::endpoint::{Binding, BindingStream, Credentials};
use crate::err::{Result, ShaclError};

pub struct RemoteEndpoint {
    client: Client,
    url: String,
    credentials: Option<Credentials>,
}

/// https://www.w3.org/TR/sparql11-results-json/
#[derive(Debug, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    results: Option<ResultsBody>,
    #[serde(default)]
    boolean: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ResultsBody {
    bindings: Vec<HashMap<String, SparqlValue>>,
}

#[derive(Debug, Deserialize)]
struct SparqlValue {
    value: String,
}

impl RemoteEndpoint {
    pub fn new(url: String, credentials: Option<Credentials>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ShaclError::Query(format!("failed to build HTTP client: {}", e)))?;
        Ok(RemoteEndpoint {
            client,
            url,
            credentials,
        })
    }

    pub fn run_query(&self, query: String) -> Result<BindingStream> {
        log::debug!("issuing query against '{}'", self.url);

        let mut request = self
            .client
            .get(&self.url)
            .header("Accept", "application/sparql-results+json")
            .query(&[("query", query)]);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.user, Some(&credentials.password));
        }

        let response = request
            .send()
            .map_err(|e| ShaclError::Query(format!("request to '{}' failed: {}", self.url, e)))?
            .error_for_status()
            .map_err(|e| ShaclError::Query(format!("endpoint returned an error status: {}", e)))?;

        let parsed: SparqlResults = response
            .json()
            .map_err(|e| ShaclError::Query(format!("malformed SPARQL-JSON response: {}", e)))?;

        if let Some(boolean) = parsed.boolean {
            let rows: Vec<Binding> = if boolean { vec![Binding::new()] } else { Vec::new() };
            return Ok(Box::new(rows.into_iter()));
        }

        let rows = parsed
            .results
            .map(|body| body.bindings)
            .unwrap_or_default()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(var, value)| (var, value.value))
                    .collect::<Binding>()
            })
            .collect::<Vec<_>>();
        Ok(Box::new(rows.into_iter()))
    }
}
