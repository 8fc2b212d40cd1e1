//! Integration tests for checkout.
//!
//! These tests verify validation happens before any network call, the
//! address/payment/clear sequence, and that failures leave the cart intact.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use storefront_session::auth::{keys, MemoryStorage, SessionStorage};
use storefront_session::checkout::{
    CheckoutField, ContactInfo, PaymentDetails, ShippingAddress,
};
use storefront_session::{
    AddressId, AddressSelection, AuthError, BaseUrl, CheckoutForm, CheckoutOrchestrator,
    PaymentProcessor, ProductId, Profile, ServerError, Session, Storefront, StorefrontConfig,
    StorefrontError, UserId,
};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn persisted_storage(user_id: &str, token: &str) -> Arc<MemoryStorage> {
    let session = Session::new(
        UserId::new(user_id),
        token.to_string(),
        None,
        Profile {
            email: "x@example.com".to_string(),
            ..Profile::default()
        },
    );
    let record = serde_json::to_string(&session.identity_record()).unwrap();
    Arc::new(MemoryStorage::with_entries([
        (keys::CREDENTIAL, token.to_string()),
        (keys::IDENTITY, record),
    ]))
}

fn storefront(server: &MockServer, storage: Arc<dyn SessionStorage>) -> Storefront {
    let config = StorefrontConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .payment_delay(Duration::from_millis(10))
        .build()
        .unwrap();
    Storefront::new(&config, storage).unwrap()
}

async fn mount_one_item_cart(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(query_param("id", "u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cart_items": [{
                "_id": "p1",
                "product_name": "Mug",
                "price": 10,
                "rating": 5,
                "image": "mug.jpg"
            }],
            "total_price": 10
        })))
        .mount(server)
        .await;
}

/// Restores user `u-1` and loads a one-line cart worth 10.00.
async fn ready_storefront(server: &MockServer) -> Storefront {
    mount_one_item_cart(server).await;
    let storefront = storefront(server, persisted_storage("u-1", "tok123"));
    assert!(storefront.start().await.is_authenticated());
    assert_eq!(storefront.cart().cart().await.line_count(), 1);
    storefront
}

fn valid_form() -> CheckoutForm {
    CheckoutForm {
        contact: ContactInfo {
            email: "x@example.com".to_string(),
            phone: "+1 555 0100".to_string(),
        },
        shipping: ShippingAddress {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            country: "United States".to_string(),
        },
        payment: PaymentDetails {
            card_number: "4111 1111 1111 1111".to_string(),
            expiry: "12/34".to_string(),
            cvv: "123".to_string(),
            cardholder_name: "Ada Lovelace".to_string(),
        },
    }
}

async fn mount_address_created(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/address"))
        .and(query_param("id", "u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"_id": "a-1"})))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// A processor that always declines and counts attempts.
#[derive(Debug, Default)]
struct DecliningPayment {
    attempts: AtomicUsize,
}

impl PaymentProcessor for DecliningPayment {
    async fn capture(&self, _amount: Decimal, _form: &CheckoutForm) -> Result<String, StorefrontError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorefrontError::Server(ServerError {
            status: 402,
            message: "Card declined".to_string(),
        }))
    }
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_short_card_number_fails_before_any_network_call() {
    let server = MockServer::start().await;
    mount_address_created(&server, 0).await;
    let storefront = ready_storefront(&server).await;

    let mut form = valid_form();
    form.payment.card_number = "4111 111".to_string();

    let error = assert_err!(storefront.checkout().submit(&form, &AddressSelection::New).await);
    match error {
        StorefrontError::Validation(errors) => {
            assert_eq!(
                errors.message_for(CheckoutField::CardNumber),
                Some("Please enter a valid card number")
            );
            assert_eq!(errors.errors.len(), 1);
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    assert_eq!(storefront.cart().cart().await.line_count(), 1);
    assert_eq!(form.payment.card_number, "4111 111");
}

#[tokio::test]
async fn test_saved_address_skips_shipping_validation() {
    let server = MockServer::start().await;
    mount_address_created(&server, 0).await;
    let storefront = ready_storefront(&server).await;

    let mut form = valid_form();
    form.shipping = ShippingAddress::default();

    let receipt = assert_ok!(
        storefront
            .checkout()
            .submit(&form, &AddressSelection::Saved(AddressId::new("a-9")))
            .await
    );
    assert_eq!(receipt.address_id, Some(AddressId::new("a-9")));
    assert!(storefront.cart().cart().await.is_empty());
}

// ============================================================================
// Order placement
// ============================================================================

#[tokio::test]
async fn test_successful_checkout_creates_address_pays_and_clears_cart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/address"))
        .and(query_param("id", "u-1"))
        .and(body_partial_json(serde_json::json!({
            "street_name": "1 Main St",
            "city_name": "Springfield",
            "pin_code": "62701"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"_id": "a-1"})))
        .expect(1)
        .mount(&server)
        .await;
    let storefront = ready_storefront(&server).await;

    let receipt = assert_ok!(
        storefront
            .checkout()
            .submit(&valid_form(), &AddressSelection::New)
            .await
    );

    assert_eq!(receipt.address_id, Some(AddressId::new("a-1")));
    assert!(receipt.payment_reference.starts_with("sim_"));
    assert_eq!(receipt.totals.subtotal, Decimal::new(10, 0));
    assert_eq!(receipt.totals.total, Decimal::new(1100, 2));
    assert!(storefront.cart().cart().await.is_empty());
}

#[tokio::test]
async fn test_address_without_reported_id_still_completes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/address"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let storefront = ready_storefront(&server).await;

    let receipt = assert_ok!(
        storefront
            .checkout()
            .submit(&valid_form(), &AddressSelection::New)
            .await
    );
    assert!(receipt.address_id.is_none());
}

#[tokio::test]
async fn test_declined_payment_leaves_cart_unchanged() {
    let server = MockServer::start().await;
    mount_address_created(&server, 1).await;
    let storefront = ready_storefront(&server).await;

    let orchestrator = CheckoutOrchestrator::with_processor(
        Arc::clone(storefront.gateway()),
        Arc::clone(storefront.cart()),
        DecliningPayment::default(),
    );

    let error = assert_err!(orchestrator.submit(&valid_form(), &AddressSelection::New).await);
    assert!(matches!(error, StorefrontError::Server(e) if e.message == "Card declined"));

    assert_eq!(orchestrator.payments().attempts.load(Ordering::SeqCst), 1);
    assert_eq!(storefront.cart().cart().await.line_count(), 1);

    let refreshed = assert_ok!(storefront.cart().refresh().await);
    assert_eq!(refreshed.line_count(), 1);
}

#[tokio::test]
async fn test_refused_address_aborts_before_payment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/address"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!("Not Allowed")))
        .mount(&server)
        .await;
    let storefront = ready_storefront(&server).await;

    let orchestrator = CheckoutOrchestrator::with_processor(
        Arc::clone(storefront.gateway()),
        Arc::clone(storefront.cart()),
        DecliningPayment::default(),
    );

    let error = assert_err!(orchestrator.submit(&valid_form(), &AddressSelection::New).await);
    assert!(matches!(error, StorefrontError::Server(e) if e.status == 400 && e.message == "Not Allowed"));

    assert_eq!(orchestrator.payments().attempts.load(Ordering::SeqCst), 0);
    assert_eq!(storefront.cart().cart().await.line_count(), 1);
}

#[tokio::test]
async fn test_rejected_credential_during_checkout_empties_cart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/address"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "token is expired"})))
        .mount(&server)
        .await;
    let storefront = ready_storefront(&server).await;

    let error = assert_err!(
        storefront
            .checkout()
            .submit(&valid_form(), &AddressSelection::New)
            .await
    );
    assert!(matches!(error, StorefrontError::Auth(AuthError::SessionExpired { .. })));

    assert!(!storefront.sessions().state().await.is_authenticated());
    assert!(storefront.cart().cart().await.is_empty());
}

#[tokio::test]
async fn test_rejected_credential_on_cart_order_empties_cart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart/checkout"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let storefront = ready_storefront(&server).await;

    let error = assert_err!(storefront.checkout().place_cart_order().await);
    assert!(error.is_auth());
    assert!(storefront.cart().cart().await.is_empty());
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let server = MockServer::start().await;
    mount_address_created(&server, 0).await;
    let storefront = storefront(&server, persisted_storage("u-1", "tok123"));
    storefront.sessions().restore().await;

    let error = assert_err!(
        storefront
            .checkout()
            .submit(&valid_form(), &AddressSelection::New)
            .await
    );
    assert!(matches!(error, StorefrontError::EmptyCart));
}

#[tokio::test]
async fn test_checkout_requires_session() {
    let server = MockServer::start().await;
    let storefront = storefront(&server, Arc::new(MemoryStorage::new()));

    let error = assert_err!(
        storefront
            .checkout()
            .submit(&valid_form(), &AddressSelection::New)
            .await
    );
    assert!(matches!(error, StorefrontError::Auth(AuthError::NotAuthenticated)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Backend orders
// ============================================================================

#[tokio::test]
async fn test_place_cart_order_clears_local_cart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart/checkout"))
        .and(query_param("id", "u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!("Successfully Placed the order")))
        .expect(1)
        .mount(&server)
        .await;
    let storefront = ready_storefront(&server).await;

    assert_ok!(storefront.checkout().place_cart_order().await);
    assert!(storefront.cart().cart().await.is_empty());
}

#[tokio::test]
async fn test_failed_cart_order_keeps_local_cart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart/checkout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let storefront = ready_storefront(&server).await;

    assert_err!(storefront.checkout().place_cart_order().await);
    assert_eq!(storefront.cart().cart().await.line_count(), 1);
}

#[tokio::test]
async fn test_instant_buy_sends_product_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart/instant-buy"))
        .and(query_param("id", "p7"))
        .and(query_param("userID", "u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!("Successully placed the order")))
        .expect(1)
        .mount(&server)
        .await;
    let storefront = ready_storefront(&server).await;

    assert_ok!(storefront.checkout().instant_buy(&ProductId::new("p7")).await);
    assert_eq!(storefront.cart().cart().await.line_count(), 1);
}
