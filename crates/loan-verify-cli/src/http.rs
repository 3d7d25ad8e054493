use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use loan_verify_core::service::{AnnuityRequest, AnnuityResponse, LoanService, PlanRequest};
use loan_verify_core::types::{ActualPlan, LoanTerms, Money};
use loan_verify_core::{LoanVerifyError, LoanVerifyResult};

/// Blocking HTTP implementation of the two loan-service operations.
///
/// One request per operation, no retries: both calls happen exactly once per
/// verification run, and any non-200 status or non-JSON content type is a
/// hard failure.
pub struct HttpLoanService {
    client: Client,
    base_uri: String,
    annuity_endpoint: String,
    plan_endpoint: String,
}

impl HttpLoanService {
    pub fn new(base_uri: &str, annuity_endpoint: &str, plan_endpoint: &str) -> Self {
        HttpLoanService {
            client: Client::new(),
            base_uri: base_uri.trim_end_matches('/').to_owned(),
            annuity_endpoint: annuity_endpoint.to_owned(),
            plan_endpoint: plan_endpoint.to_owned(),
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_uri, endpoint)
        } else {
            format!("{}/{}", self.base_uri, endpoint)
        }
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> LoanVerifyResult<T> {
        let url = self.endpoint_url(endpoint);
        info!(%url, "calling loan service");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| collaborator(endpoint, format!("request failed: {e}")))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_owned();
        check_success(endpoint, status, &content_type)?;

        debug!(%status, %content_type, "loan service responded");
        response
            .json::<T>()
            .map_err(|e| collaborator(endpoint, format!("malformed response body: {e}")))
    }
}

impl LoanService for HttpLoanService {
    fn annuity(&self, terms: &LoanTerms) -> LoanVerifyResult<Money> {
        let response: AnnuityResponse =
            self.post_json(&self.annuity_endpoint, &AnnuityRequest::from_terms(terms))?;
        Ok(response.annuity)
    }

    fn generate_plan(&self, terms: &LoanTerms) -> LoanVerifyResult<ActualPlan> {
        self.post_json(&self.plan_endpoint, &PlanRequest::from_terms(terms))
    }
}

fn collaborator(endpoint: &str, reason: String) -> LoanVerifyError {
    LoanVerifyError::Collaborator {
        endpoint: endpoint.to_owned(),
        reason,
    }
}

/// A response only counts as success with HTTP 200 and a JSON content type.
fn check_success(
    endpoint: &str,
    status: reqwest::StatusCode,
    content_type: &str,
) -> LoanVerifyResult<()> {
    if status != reqwest::StatusCode::OK {
        return Err(collaborator(
            endpoint,
            format!("expected HTTP 200, got {status}"),
        ));
    }
    if !content_type.starts_with("application/json") {
        return Err(collaborator(
            endpoint,
            format!("expected a JSON content type, got '{content_type}'"),
        ));
    }
    Ok(())
}
