//! Servidor Axum com WebSocket para etiquetagem POS em tempo real

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use pos_core::{
    corpus::tokenize, evaluate, fixture, viterbi_decode, Alignment, Corpus, Evaluation, HmmModel, ViterbiResult,
    ViterbiStep,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Pausa entre passos do Viterbi enviados pelo WebSocket (animação na UI)
const STEP_DELAY_MS: u64 = 35;

/// Estado compartilhado da aplicação; o modelo é somente leitura
pub struct AppState {
    pub model: Arc<HmmModel>,
}

#[derive(Deserialize)]
struct TagRequest {
    sentence: String,
}

#[derive(Serialize)]
struct TagResponse {
    words: Vec<String>,
    tags: Vec<String>,
    best_score: f64,
    fallback_positions: Vec<usize>,
    steps: Vec<ViterbiStep>,
    processing_ms: u64,
}

#[derive(Deserialize)]
struct EvaluateRequest {
    /// Sentenças, uma por linha
    words: String,
    /// Tags, alinhadas linha a linha
    tags: String,
    #[serde(default)]
    alignment: Alignment,
}

/// Eventos enviados ao cliente WebSocket para cada linha recebida.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TagEvent {
    /// Um passo do Viterbi: scores acumulados de cada tag alcançada.
    Step { step: ViterbiStep },
    /// Tags finais da linha.
    Done {
        words: Vec<String>,
        tags: Vec<String>,
        best_score: f64,
        fallback_positions: Vec<usize>,
        processing_ms: u64,
    },
    /// Falha irrecuperável.
    Error { message: String },
}

/// Monta o roteador com todas as rotas
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/tag", post(tag_handler))
        .route("/evaluate", post(evaluate_handler))
        .route("/fixture", get(fixture_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Etiquetagem via HTTP POST (sem streaming)
async fn tag_handler(State(state): State<Arc<AppState>>, Json(req): Json<TagRequest>) -> impl IntoResponse {
    let words = tokenize(&req.sentence);
    if words.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Sentença vazia"})),
        )
            .into_response();
    }

    let start = Instant::now();
    let result = viterbi_decode(&state.model, &words);
    Json(TagResponse {
        words,
        tags: result.best_sequence,
        best_score: result.best_score,
        fallback_positions: result.fallback_positions,
        steps: result.steps,
        processing_ms: start.elapsed().as_millis() as u64,
    })
    .into_response()
}

/// Relatório de acurácia sobre um corpus de teste enviado no corpo
async fn evaluate_handler(State(state): State<Arc<AppState>>, Json(req): Json<EvaluateRequest>) -> impl IntoResponse {
    let corpus = match Corpus::from_readers(req.words.as_bytes(), req.tags.as_bytes(), req.alignment) {
        Ok(corpus) => corpus,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    let model = Arc::clone(&state.model);
    match tokio::task::spawn_blocking(move || evaluate(&model, &corpus.sentences)).await {
        Ok(evaluation) => Json(EvaluationResponse::from(evaluation)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

#[derive(Serialize)]
struct EvaluationResponse {
    accuracy: f64,
    sequence_accuracy: f64,
    report: String,
    evaluation: Evaluation,
}

impl From<Evaluation> for EvaluationResponse {
    fn from(evaluation: Evaluation) -> Self {
        Self {
            accuracy: evaluation.overall.ratio(),
            sequence_accuracy: evaluation.sequence_accuracy(),
            report: evaluation.to_string(),
            evaluation,
        }
    }
}

/// Retorna as sentenças do exercício e as tags esperadas
async fn fixture_handler() -> impl IntoResponse {
    let sentences: Vec<serde_json::Value> = fixture::DRILL_SENTENCES
        .iter()
        .map(|(words, tags)| {
            serde_json::json!({
                "sentence": words.join(" "),
                "tags": tags
            })
        })
        .collect();
    Json(sentences)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: cada mensagem de texto é uma sentença; responde com os
/// passos do Viterbi e o resultado final
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let line = text.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                info!(chars = line.len(), "etiquetando via WebSocket");

                // Viterbi é síncrono; roda fora do runtime
                let model = Arc::clone(&state.model);
                let started = Instant::now();
                let words = tokenize(&line);
                let words_for_task = words.clone();
                let events = match tokio::task::spawn_blocking(move || viterbi_decode(&model, &words_for_task)).await {
                    Ok(result) => result_events(words, result, started.elapsed().as_millis() as u64),
                    Err(e) => {
                        warn!(error = %e, "decodificação interrompida");
                        vec![TagEvent::Error { message: e.to_string() }]
                    }
                };

                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            return; // cliente desconectou
                        }
                        tokio::time::sleep(tokio::time::Duration::from_millis(STEP_DELAY_MS)).await;
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}

/// Converte um resultado do Viterbi na sequência de eventos enviada ao cliente.
fn result_events(words: Vec<String>, result: ViterbiResult, processing_ms: u64) -> Vec<TagEvent> {
    let mut events: Vec<TagEvent> = result
        .steps
        .into_iter()
        .map(|step| TagEvent::Step { step })
        .collect();
    events.push(TagEvent::Done {
        words,
        tags: result.best_sequence,
        best_score: result.best_score,
        fallback_positions: result.fallback_positions,
        processing_ms,
    });
    events
}
