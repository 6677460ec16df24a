use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Prediction {
    pub roughness_ra: f64,
    pub roughness_rq: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PredictResponse {
    pub ok: bool,
    pub prediction: Prediction,
}

/// Placeholder estimate returned until a roughness model is wired in
pub const STUB_PREDICTION: Prediction = Prediction {
    roughness_ra: 3.21,
    roughness_rq: 4.56,
};

/// Accepts any JSON payload and answers with a fixed roughness estimate
#[utoipa::path(
    post,
    path = "/api/predict",
    responses(
        (status = 200, description = "Fixed roughness estimate", body = PredictResponse)
    ),
    tag = "predict"
)]
pub async fn predict(Json(payload): Json<serde_json::Value>) -> Json<PredictResponse> {
    tracing::debug!("Prediction requested with payload: {}", payload);

    Json(PredictResponse {
        ok: true,
        prediction: STUB_PREDICTION,
    })
}
