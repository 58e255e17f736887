// Finance Tracker - Web Server
// REST API with Axum over the library core; static UI from web/

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use finance_tracker::{
    aggregate, amortization_schedule, compute_loan, delete_transaction,
    get_transactions_for_user, insert_transaction, list_users, validate_transaction,
    LoanRequest, Transaction, TxKind, ValidationError,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

fn validation_failure(errors: &[ValidationError]) -> axum::response::Response {
    let message = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");

    (StatusCode::BAD_REQUEST, Json(ApiResponse::err(message))).into_response()
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> axum::response::Response {
    eprintln!("Error {}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::err("internal error")),
    )
        .into_response()
}

/// Incoming transaction body; username comes from the path
#[derive(Deserialize)]
struct NewTransaction {
    description: String,
    amount: f64,
    kind: TxKind,
    #[serde(default)]
    category: Option<String>,
}

/// Transaction response (simplified for API)
#[derive(Serialize)]
struct TransactionResponse {
    id: String,
    date: String,
    description: String,
    amount: f64,
    kind: String,
    category: String,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            date: tx.created_at.to_rfc3339(),
            description: tx.description,
            amount: tx.amount,
            kind: tx.kind.as_str().to_string(),
            category: tx.category,
        }
    }
}

#[derive(Serialize)]
struct DeleteResponse {
    deleted: bool,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/users - Usernames with recorded transactions
async fn get_users(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match list_users(&conn) {
        Ok(users) => (StatusCode::OK, Json(ApiResponse::ok(users))).into_response(),
        Err(e) => internal_error("listing users", e),
    }
}

/// GET /api/users/:username/transactions - A user's transactions
async fn get_transactions(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    let username = decode_username(&username);
    let conn = state.db.lock().unwrap();

    match get_transactions_for_user(&conn, &username) {
        Ok(transactions) => {
            let response: Vec<TransactionResponse> =
                transactions.into_iter().map(|tx| tx.into()).collect();

            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => internal_error("getting transactions", e),
    }
}

/// POST /api/users/:username/transactions - Record a transaction
async fn create_transaction(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(body): Json<NewTransaction>,
) -> impl IntoResponse {
    let username = decode_username(&username);

    let tx = Transaction::new(
        &username,
        &body.description,
        body.amount,
        body.kind,
        body.category.as_deref().unwrap_or(""),
    );

    if let Err(errors) = validate_transaction(&tx) {
        return validation_failure(&errors);
    }

    let conn = state.db.lock().unwrap();
    match insert_transaction(&conn, &tx) {
        Ok(_) => {
            let response: TransactionResponse = tx.into();
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => internal_error("inserting transaction", e),
    }
}

/// DELETE /api/users/:username/transactions/:id - Remove a transaction
async fn remove_transaction(
    State(state): State<AppState>,
    Path((username, id)): Path<(String, String)>,
) -> impl IntoResponse {
    let username = decode_username(&username);
    let conn = state.db.lock().unwrap();

    match delete_transaction(&conn, &username, &id) {
        Ok(deleted) => (
            StatusCode::OK,
            Json(ApiResponse::ok(DeleteResponse { deleted })),
        )
            .into_response(),
        Err(e) => internal_error("deleting transaction", e),
    }
}

/// GET /api/users/:username/summary - Totals, balance, and savings tip
async fn get_summary(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    let username = decode_username(&username);
    let conn = state.db.lock().unwrap();

    let transactions = match get_transactions_for_user(&conn, &username) {
        Ok(transactions) => transactions,
        Err(e) => return internal_error("getting transactions", e),
    };

    // Stored rows were validated on the way in; a failure here is ours
    match aggregate(&transactions) {
        Ok(summary) => (StatusCode::OK, Json(ApiResponse::ok(summary))).into_response(),
        Err(errors) => internal_error(
            "aggregating transactions",
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        ),
    }
}

/// POST /api/loan - EMI computation with advice
async fn post_loan(Json(request): Json<LoanRequest>) -> impl IntoResponse {
    match compute_loan(&request) {
        Ok(result) => (StatusCode::OK, Json(ApiResponse::ok(result))).into_response(),
        Err(errors) => validation_failure(&errors),
    }
}

/// POST /api/loan/schedule - Month-by-month repayment curve
async fn post_loan_schedule(Json(request): Json<LoanRequest>) -> impl IntoResponse {
    match amortization_schedule(&request) {
        Ok(schedule) => (StatusCode::OK, Json(ApiResponse::ok(schedule))).into_response(),
        Err(errors) => validation_failure(&errors),
    }
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

fn decode_username(raw: &str) -> String {
    urlencoding::decode(raw)
        .unwrap_or_else(|_| raw.into())
        .into_owned()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Finance Tracker - Web Server");

    let db_path =
        std::env::var("FINTRACK_DB").unwrap_or_else(|_| "finance.db".to_string());

    let conn = Connection::open(&db_path).expect("Failed to open database");
    finance_tracker::setup_database(&conn).expect("Failed to initialize database");
    println!("✓ Database ready: {}", db_path);

    // Create shared state
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/users", get(get_users))
        .route(
            "/users/:username/transactions",
            get(get_transactions).post(create_transaction),
        )
        .route(
            "/users/:username/transactions/:id",
            delete(remove_transaction),
        )
        .route("/users/:username/summary", get(get_summary))
        .route("/loan", post(post_loan))
        .route("/loan/schedule", post(post_loan_schedule))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("web"))
        .layer(CorsLayer::permissive());

    // Start server
    let addr = std::env::var("FINTRACK_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    println!("🚀 Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
