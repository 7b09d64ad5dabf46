use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::{
    commands::{self, IngestError, IngestSubmissionCommand},
    multipart::read_parts,
    SubmissionState,
};

pub const SUCCESS_MESSAGE: &str = "Data received and stored successfully";

/// Response header carrying the submission group id of a stored request
pub const SUBMISSION_ID_HEADER: HeaderName = HeaderName::from_static("x-submission-id");

pub fn submissions_routes() -> Router<SubmissionState> {
    Router::new().route("/form-submissions", get(receive_submission).post(receive_submission))
}

/// Path the form service was originally configured to call
pub fn legacy_routes() -> Router<SubmissionState> {
    Router::new().route(
        "/api/JotFormWebhookFunction",
        get(receive_submission).post(receive_submission),
    )
}

#[tracing::instrument(skip_all)]
async fn receive_submission(
    State(state): State<SubmissionState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, IngestError> {
    tracing::info!("Form submission webhook received a request");

    let multipart = multipart.map_err(|rejection| {
        IngestError::MalformedRequest(format!(
            "Invalid content type. Expected multipart/form-data. {}",
            rejection.body_text()
        ))
    })?;
    let parts = read_parts(multipart).await?;

    let report = commands::ingest::handle(
        &state.storage,
        &state.extractor,
        &state.settings,
        IngestSubmissionCommand { parts },
    )
    .await?;

    let mut response = (StatusCode::OK, SUCCESS_MESSAGE).into_response();
    if let Ok(value) = HeaderValue::from_str(&report.submission_group_id) {
        response.headers_mut().insert(SUBMISSION_ID_HEADER, value);
    }

    Ok(response)
}
