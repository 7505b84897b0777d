//! Trip request intake: validation and hand-off to staff.

use std::sync::Arc;

use async_trait::async_trait;
use pickadrive_core::AppResult;
use pickadrive_domain::{OrderId, OrderRequest, ValidatedOrder};
use tracing::info;

/// Port for forwarding accepted requests to staff.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Delivers one accepted request.
    async fn notify_order(&self, order_id: OrderId, order: &ValidatedOrder) -> AppResult<()>;
}

/// Application service for submitting trip requests.
#[derive(Clone)]
pub struct OrderService {
    notifier: Arc<dyn OrderNotifier>,
}

impl OrderService {
    /// Creates a new order service.
    #[must_use]
    pub fn new(notifier: Arc<dyn OrderNotifier>) -> Self {
        Self { notifier }
    }

    /// Validates `request`, assigns it a reference and notifies staff.
    ///
    /// Admission must already have been granted by the caller.
    pub async fn submit(&self, request: OrderRequest) -> AppResult<OrderId> {
        let order = request.validate()?;
        let order_id = OrderId::new();

        self.notifier.notify_order(order_id, &order).await?;
        info!(
            %order_id,
            passengers = order.passengers_count,
            "trip request forwarded"
        );

        Ok(order_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pickadrive_core::AppError;

    use super::*;

    #[derive(Default)]
    struct TestNotifier {
        sent: Mutex<Vec<(OrderId, String)>>,
    }

    #[async_trait]
    impl OrderNotifier for TestNotifier {
        async fn notify_order(&self, order_id: OrderId, order: &ValidatedOrder) -> AppResult<()> {
            self.sent
                .lock()
                .map_err(|error| {
                    AppError::Internal(format!("failed to lock notifier state: {error}"))
                })?
                .push((order_id, order.customer_name.as_str().to_owned()));
            Ok(())
        }
    }

    struct UnreachableNotifier;

    #[async_trait]
    impl OrderNotifier for UnreachableNotifier {
        async fn notify_order(&self, _order_id: OrderId, _order: &ValidatedOrder) -> AppResult<()> {
            Err(AppError::Unavailable("messaging channel offline".to_owned()))
        }
    }

    fn request() -> OrderRequest {
        OrderRequest {
            customer_name: "Anna".to_owned(),
            customer_phone: "+7 901 111-22-33".to_owned(),
            from_location: "Kazan".to_owned(),
            to_location: "Sviyazhsk".to_owned(),
            trip_date: "Saturday morning".to_owned(),
            passengers_count: 12,
            special_requests: None,
            bus_id: None,
        }
    }

    #[tokio::test]
    async fn submit_notifies_with_assigned_reference() {
        let notifier = Arc::new(TestNotifier::default());
        let service = OrderService::new(notifier.clone());

        let order_id = service.submit(request()).await;
        assert!(order_id.is_ok());

        let sent = notifier
            .sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        assert_eq!(sent.len(), 1);
        assert_eq!(Some(sent[0].0), order_id.ok());
        assert_eq!(sent[0].1, "Anna");
    }

    #[tokio::test]
    async fn invalid_request_is_not_forwarded() {
        let notifier = Arc::new(TestNotifier::default());
        let service = OrderService::new(notifier.clone());

        let result = service
            .submit(OrderRequest {
                passengers_count: 0,
                ..request()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        let sent = notifier.sent.lock().map(|guard| guard.len()).unwrap_or(0);
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn notifier_failure_is_propagated() {
        let service = OrderService::new(Arc::new(UnreachableNotifier));

        let result = service.submit(request()).await;

        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }
}
