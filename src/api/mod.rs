//! Surface REST pilotant le moteur
//!
//! Intégration hôte de référence : chaque route verrouille le moteur le
//! temps d'une opération atomique. L'identité de l'appelant est portée
//! par l'en-tête `X-Caller` ; sans en-tête, l'appelant est `anonymous`
//! et les opérations mutantes échouent en 401.

use crate::engine::FirewallEngine;
use crate::error::EngineError;
use crate::models::{Protocol, RuleSpec, ThreatLevel};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

type SharedEngine = Arc<RwLock<FirewallEngine>>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    success: bool,
    message: String,
}

impl ApiResponse {
    fn ok(message: String) -> Json<Self> {
        Json(Self {
            success: true,
            message,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanRequest {
    pub source: String,
    pub destination: String,
    pub port: u16,
    pub protocol: Protocol,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AutoDetectRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RuleStatusRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SourceRequest {
    pub source: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManualThreatRequest {
    pub source: String,
    pub attack_type: String,
    pub level: ThreatLevel,
    pub description: String,
    pub should_block: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThresholdRequest {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminRequest {
    pub identity: String,
}

pub fn create_router(engine: SharedEngine) -> Router {
    Router::new()
        .route("/api/v1/system/start", post(start_system))
        .route("/api/v1/system/stop", post(stop_system))
        .route("/api/v1/system/autodetect", post(set_auto_detection))
        .route("/api/v1/system/status", get(system_status))
        .route("/api/v1/scan", post(scan_packet))
        .route("/api/v1/rules", post(create_rule).get(list_rules))
        .route("/api/v1/rules/:id", get(get_rule).delete(delete_rule))
        .route("/api/v1/rules/:id/status", post(update_rule_status))
        .route("/api/v1/blacklist", post(add_blacklist).get(list_blacklist))
        .route(
            "/api/v1/blacklist/:source",
            delete(remove_blacklist).get(check_blacklist),
        )
        .route("/api/v1/whitelist", post(add_whitelist).get(list_whitelist))
        .route(
            "/api/v1/whitelist/:source",
            delete(remove_whitelist).get(check_whitelist),
        )
        .route("/api/v1/threats", post(log_manual_threat))
        .route("/api/v1/threats/:id", get(get_threat))
        .route("/api/v1/thresholds", post(update_threshold))
        .route("/api/v1/admins", post(add_admin))
        .route(
            "/api/v1/admins/:identity",
            delete(remove_admin).get(check_admin),
        )
        .route("/api/v1/stats", get(network_stats))
        .route("/api/v1/traffic/:source", get(ip_traffic))
        .with_state(engine)
}

/// Identité de l'appelant, portée par l'en-tête X-Caller
fn caller_identity(headers: &HeaderMap) -> String {
    headers
        .get("x-caller")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous")
        .to_string()
}

/// Traduit une erreur du moteur en statut HTTP
fn error_response(err: EngineError) -> (StatusCode, Json<ApiResponse>) {
    let status = match err {
        EngineError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        EngineError::InvalidState(_) => StatusCode::CONFLICT,
        EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ApiResponse {
            success: false,
            message: err.to_string(),
        }),
    )
}

async fn start_system(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    engine
        .write()
        .await
        .start_system(&caller)
        .map_err(error_response)?;
    Ok(ApiResponse::ok("Système démarré".to_string()))
}

async fn stop_system(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    engine
        .write()
        .await
        .stop_system(&caller)
        .map_err(error_response)?;
    Ok(ApiResponse::ok("Système arrêté".to_string()))
}

async fn set_auto_detection(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Json(payload): Json<AutoDetectRequest>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    let mut engine = engine.write().await;
    let result = if payload.enabled {
        engine.enable_auto_detection(&caller)
    } else {
        engine.disable_auto_detection(&caller)
    };
    result.map_err(error_response)?;
    Ok(ApiResponse::ok(format!(
        "Détection automatique {}",
        if payload.enabled {
            "activée"
        } else {
            "désactivée"
        }
    )))
}

async fn system_status(
    State(engine): State<SharedEngine>,
) -> Json<crate::models::SystemStatus> {
    Json(engine.read().await.system_status())
}

async fn scan_packet(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    let verdict = engine
        .write()
        .await
        .scan_packet(
            &caller,
            &payload.source,
            &payload.destination,
            payload.port,
            payload.protocol,
        )
        .map_err(error_response)?;
    Ok(Json(serde_json::json!({
        "allowed": verdict.allowed(),
        "verdict": verdict,
    })))
}

async fn create_rule(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Json(spec): Json<RuleSpec>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    let id = engine
        .write()
        .await
        .create_rule(&caller, spec)
        .map_err(error_response)?;
    Ok(Json(serde_json::json!({ "id": id })))
}

async fn list_rules(
    State(engine): State<SharedEngine>,
) -> Json<Vec<crate::models::FirewallRule>> {
    Json(engine.read().await.rules())
}

async fn get_rule(
    State(engine): State<SharedEngine>,
    Path(id): Path<u64>,
) -> Result<Json<crate::models::FirewallRule>, (StatusCode, Json<ApiResponse>)> {
    let rule = engine.read().await.rule(id).map_err(error_response)?;
    Ok(Json(rule))
}

async fn update_rule_status(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(payload): Json<RuleStatusRequest>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    engine
        .write()
        .await
        .update_rule_status(&caller, id, payload.is_active)
        .map_err(error_response)?;
    Ok(ApiResponse::ok(format!("Règle #{} mise à jour", id)))
}

async fn delete_rule(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    engine
        .write()
        .await
        .delete_rule(&caller, id)
        .map_err(error_response)?;
    Ok(ApiResponse::ok(format!("Règle #{} supprimée", id)))
}

async fn add_blacklist(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Json(payload): Json<SourceRequest>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    engine
        .write()
        .await
        .blacklist_ip(&caller, &payload.source)
        .map_err(error_response)?;
    Ok(ApiResponse::ok(format!(
        "{} mise en liste noire",
        payload.source
    )))
}

async fn remove_blacklist(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Path(source): Path<String>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    engine
        .write()
        .await
        .remove_from_blacklist(&caller, &source)
        .map_err(error_response)?;
    Ok(ApiResponse::ok(format!("{} retirée de la liste noire", source)))
}

async fn check_blacklist(
    State(engine): State<SharedEngine>,
    Path(source): Path<String>,
) -> Json<serde_json::Value> {
    let blacklisted = engine.read().await.is_blacklisted(&source);
    Json(serde_json::json!({ "source": source, "blacklisted": blacklisted }))
}

async fn list_blacklist(State(engine): State<SharedEngine>) -> Json<Vec<String>> {
    Json(engine.read().await.blacklisted_sources())
}

async fn add_whitelist(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Json(payload): Json<SourceRequest>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    engine
        .write()
        .await
        .whitelist_ip(&caller, &payload.source)
        .map_err(error_response)?;
    Ok(ApiResponse::ok(format!(
        "{} mise en liste blanche",
        payload.source
    )))
}

async fn remove_whitelist(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Path(source): Path<String>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    engine
        .write()
        .await
        .remove_from_whitelist(&caller, &source)
        .map_err(error_response)?;
    Ok(ApiResponse::ok(format!(
        "{} retirée de la liste blanche",
        source
    )))
}

async fn check_whitelist(
    State(engine): State<SharedEngine>,
    Path(source): Path<String>,
) -> Json<serde_json::Value> {
    let whitelisted = engine.read().await.is_whitelisted(&source);
    Json(serde_json::json!({ "source": source, "whitelisted": whitelisted }))
}

async fn list_whitelist(State(engine): State<SharedEngine>) -> Json<Vec<String>> {
    Json(engine.read().await.whitelisted_sources())
}

async fn log_manual_threat(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Json(payload): Json<ManualThreatRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    let log_id = engine
        .write()
        .await
        .log_manual_threat(
            &caller,
            &payload.source,
            &payload.attack_type,
            payload.level,
            &payload.description,
            payload.should_block,
        )
        .map_err(error_response)?;
    Ok(Json(serde_json::json!({ "id": log_id })))
}

async fn get_threat(
    State(engine): State<SharedEngine>,
    Path(id): Path<u64>,
) -> Result<Json<crate::models::ThreatLogEntry>, (StatusCode, Json<ApiResponse>)> {
    let entry = engine.read().await.threat_entry(id).map_err(error_response)?;
    Ok(Json(entry))
}

async fn update_threshold(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Json(payload): Json<ThresholdRequest>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    let mut engine = engine.write().await;
    let result = match payload.name.as_str() {
        "max_connections_per_minute" => engine.update_max_connections(&caller, payload.value),
        "suspicion_threshold" => engine.update_suspicion_threshold(&caller, payload.value),
        "auto_block_threshold" => engine.update_auto_block_threshold(&caller, payload.value),
        _ => Err(EngineError::InvalidArgument("seuil inconnu")),
    };
    result.map_err(error_response)?;
    Ok(ApiResponse::ok(format!(
        "Seuil {} mis à jour: {}",
        payload.name, payload.value
    )))
}

async fn add_admin(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Json(payload): Json<AdminRequest>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    engine
        .write()
        .await
        .add_admin(&caller, &payload.identity)
        .map_err(error_response)?;
    Ok(ApiResponse::ok(format!(
        "Administrateur {} ajouté",
        payload.identity
    )))
}

async fn remove_admin(
    State(engine): State<SharedEngine>,
    headers: HeaderMap,
    Path(identity): Path<String>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let caller = caller_identity(&headers);
    engine
        .write()
        .await
        .remove_admin(&caller, &identity)
        .map_err(error_response)?;
    Ok(ApiResponse::ok(format!("Administrateur {} retiré", identity)))
}

async fn check_admin(
    State(engine): State<SharedEngine>,
    Path(identity): Path<String>,
) -> Json<serde_json::Value> {
    let is_admin = engine.read().await.is_admin(&identity);
    Json(serde_json::json!({ "identity": identity, "is_admin": is_admin }))
}

async fn network_stats(
    State(engine): State<SharedEngine>,
) -> Json<crate::models::NetworkStats> {
    Json(engine.read().await.network_stats())
}

async fn ip_traffic(
    State(engine): State<SharedEngine>,
    Path(source): Path<String>,
) -> Json<crate::models::IpTraffic> {
    Json(engine.read().await.ip_traffic(&source))
}
