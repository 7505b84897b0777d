use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use tracing::info;

use crate::dto::{SubmitOrderRequest, SubmitOrderResponse};
use crate::error::ApiResult;
use crate::request_context::extract_request_context;
use crate::state::AppState;

pub async fn submit_order_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<SubmitOrderRequest>,
) -> ApiResult<Json<SubmitOrderResponse>> {
    let context = extract_request_context(peer, &headers, &state.trusted_proxies);
    let client_key = state.client_key_deriver.derive_key(&context);

    state.admission_gate.check_admission(&client_key).await?;

    let order_id = state.order_service.submit(payload.into()).await?;
    info!(%order_id, client_key = %client_key, "trip request accepted");

    Ok(Json(SubmitOrderResponse {
        message: "Your request has been received. We will contact you shortly.".to_owned(),
        order_id: order_id.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::to_bytes;
    use axum::http::header::RETRY_AFTER;
    use axum::http::{HeaderValue, StatusCode};
    use axum::response::IntoResponse;
    use ipnet::IpNet;
    use pickadrive_application::{
        AddressAgentKeyDeriver, AdmissionGate, Clock, OrderNotifier, OrderService,
    };
    use pickadrive_core::{AppError, AppResult};
    use pickadrive_domain::{AdmissionPolicy, AttemptLog, OrderId, RequestContext, ValidatedOrder};
    use pickadrive_infrastructure::{InMemoryAttemptLogStore, SystemClock};

    use super::*;
    use crate::error::ApiError;

    #[derive(Default)]
    struct CountingNotifier {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl OrderNotifier for CountingNotifier {
        async fn notify_order(&self, _order_id: OrderId, _order: &ValidatedOrder) -> AppResult<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct OfflineNotifier;

    #[async_trait]
    impl OrderNotifier for OfflineNotifier {
        async fn notify_order(&self, _order_id: OrderId, _order: &ValidatedOrder) -> AppResult<()> {
            Err(AppError::Unavailable("telegram is unreachable".to_owned()))
        }
    }

    fn app_state(notifier: Arc<dyn OrderNotifier>, trusted_proxies: Vec<IpNet>) -> AppState {
        AppState {
            admission_gate: AdmissionGate::with_log(
                AttemptLog::new(),
                Arc::new(InMemoryAttemptLogStore::new()),
                Arc::new(SystemClock::new()),
                AdmissionPolicy::default(),
            ),
            client_key_deriver: Arc::new(AddressAgentKeyDeriver),
            order_service: OrderService::new(notifier),
            trusted_proxies: trusted_proxies.into(),
        }
    }

    fn booking() -> SubmitOrderRequest {
        SubmitOrderRequest {
            customer_name: "Olga".to_owned(),
            customer_phone: "+7 902 555-01-01".to_owned(),
            from_location: "Airport".to_owned(),
            to_location: "City centre".to_owned(),
            trip_date: "2026-12-24 18:00".to_owned(),
            passengers_count: 4,
            special_requests: None,
            bus_id: Some(2),
        }
    }

    fn browser(user_agent: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_static(user_agent));
        headers
    }

    async fn submit(
        state: &AppState,
        peer: [u8; 4],
        headers: HeaderMap,
        payload: SubmitOrderRequest,
    ) -> ApiResult<Json<SubmitOrderResponse>> {
        submit_order_handler(
            State(state.clone()),
            ConnectInfo(SocketAddr::from((peer, 40_000))),
            headers,
            Json(payload),
        )
        .await
    }

    #[tokio::test]
    async fn fourth_request_from_same_device_is_rejected() {
        let notifier = Arc::new(CountingNotifier::default());
        let state = app_state(notifier.clone(), Vec::new());

        for _ in 0..3 {
            let result = submit(&state, [198, 51, 100, 4], browser("Mozilla/5.0"), booking()).await;
            assert!(result.is_ok());
        }

        let error = submit(&state, [198, 51, 100, 4], browser("Mozilla/5.0"), booking())
            .await
            .err()
            .unwrap_or_else(|| panic!("test"));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(RETRY_AFTER));
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rejection_message_names_the_daily_quota() {
        let state = app_state(Arc::new(CountingNotifier::default()), Vec::new());
        for _ in 0..3 {
            let _ = submit(&state, [198, 51, 100, 4], HeaderMap::new(), booking()).await;
        }

        let result = submit(&state, [198, 51, 100, 4], HeaderMap::new(), booking()).await;

        match result {
            Err(ApiError(AppError::RateLimited { message, .. })) => assert_eq!(
                message,
                "request limit exceeded: maximum 3 requests per day from this device"
            ),
            _ => panic!("expected a rate limit rejection"),
        }
    }

    #[tokio::test]
    async fn rejection_body_carries_limit_under_error_key() {
        let state = app_state(Arc::new(CountingNotifier::default()), Vec::new());
        for _ in 0..3 {
            let _ = submit(&state, [198, 51, 100, 4], browser("Mozilla/5.0"), booking()).await;
        }

        let response = submit(&state, [198, 51, 100, 4], browser("Mozilla/5.0"), booking())
            .await
            .err()
            .unwrap_or_else(|| panic!("test"))
            .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|_| panic!("test"));
        let body: serde_json::Value =
            serde_json::from_slice(&bytes).unwrap_or_else(|_| panic!("test"));
        assert_eq!(
            body["error"],
            "request limit exceeded: maximum 3 requests per day from this device"
        );
    }

    #[tokio::test]
    async fn other_agent_on_same_address_has_its_own_quota() {
        let state = app_state(Arc::new(CountingNotifier::default()), Vec::new());
        for _ in 0..3 {
            let _ = submit(&state, [198, 51, 100, 4], browser("Mozilla/5.0"), booking()).await;
        }

        let result = submit(&state, [198, 51, 100, 4], browser("curl/8.5"), booking()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn forwarded_for_from_untrusted_peer_shares_the_peer_quota() {
        let state = app_state(Arc::new(CountingNotifier::default()), Vec::new());
        for index in 0..3_u8 {
            let mut headers = browser("Mozilla/5.0");
            let spoofed = format!("203.0.113.{index}");
            headers.insert(
                "x-forwarded-for",
                HeaderValue::from_str(&spoofed).unwrap_or_else(|_| panic!("test")),
            );
            let _ = submit(&state, [198, 51, 100, 4], headers, booking()).await;
        }

        let mut headers = browser("Mozilla/5.0");
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.99"));
        let result = submit(&state, [198, 51, 100, 4], headers, booking()).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn trusted_proxy_clients_are_counted_separately() {
        let proxies: Vec<IpNet> = vec!["10.0.0.0/8".parse().unwrap_or_else(|_| panic!("test"))];
        let state = app_state(Arc::new(CountingNotifier::default()), proxies);

        for client in ["203.0.113.1", "203.0.113.2", "203.0.113.3", "203.0.113.4"] {
            let mut headers = browser("Mozilla/5.0");
            headers.insert(
                "x-forwarded-for",
                HeaderValue::from_str(client).unwrap_or_else(|_| panic!("test")),
            );
            let result = submit(&state, [10, 0, 0, 2], headers, booking()).await;
            assert!(result.is_ok());
        }
    }

    #[tokio::test]
    async fn invalid_request_is_bad_request_and_still_counts() {
        let state = app_state(Arc::new(CountingNotifier::default()), Vec::new());
        let invalid = SubmitOrderRequest {
            passengers_count: 0,
            ..booking()
        };

        let error = submit(&state, [198, 51, 100, 4], HeaderMap::new(), invalid)
            .await
            .err()
            .unwrap_or_else(|| panic!("test"));
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

        let key = state
            .client_key_deriver
            .derive_key(&RequestContext::new(Some("198.51.100.4".to_owned()), None));
        let now_ms = SystemClock::new().now_millis();
        assert_eq!(
            state.admission_gate.attempts_in_window_at(&key, now_ms).await,
            1
        );
    }

    #[tokio::test]
    async fn unreachable_notifier_maps_to_service_unavailable() {
        let state = app_state(Arc::new(OfflineNotifier), Vec::new());

        let error = submit(&state, [198, 51, 100, 4], HeaderMap::new(), booking())
            .await
            .err()
            .unwrap_or_else(|| panic!("test"));

        assert_eq!(
            error.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn accepted_request_returns_reference() {
        let state = app_state(Arc::new(CountingNotifier::default()), Vec::new());

        let Json(response) = submit(&state, [198, 51, 100, 4], HeaderMap::new(), booking())
            .await
            .unwrap_or_else(|_| panic!("test"));

        assert!(uuid::Uuid::parse_str(&response.order_id).is_ok());
        assert!(!response.message.is_empty());
    }
}
