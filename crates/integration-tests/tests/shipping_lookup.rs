//! Integration tests for postal-code lookup against a local ViaCEP stand-in.

#![allow(clippy::unwrap_used)]

use vitrine_core::PostalCode;
use vitrine_integration_tests::{
    FAILING_POSTAL_CODE, FakeViaCep, KNOWN_POSTAL_CODE, TestContext, UNKNOWN_POSTAL_CODE,
};
use vitrine_storefront::product::{AddToCartOutcome, ProductPage};
use vitrine_storefront::shipping::{
    CalculationOutcome, LookupError, PostalCodeLookup, ShippingCalculator, ViaCepClient,
};
use vitrine_storefront::views::CartConfirmationPopup;

async fn client() -> (FakeViaCep, ViaCepClient) {
    let server = FakeViaCep::start().await.unwrap();
    let client = ViaCepClient::new(&server.lookup_config()).unwrap();
    (server, client)
}

#[tokio::test]
async fn test_known_code_resolves_address() {
    let (_server, client) = client().await;
    let code = PostalCode::parse(KNOWN_POSTAL_CODE).unwrap();

    let info = client.lookup(&code).await.unwrap();
    assert_eq!(info.postal_code, code);
    assert_eq!(info.street, "Avenida Paulista");
    assert_eq!(info.district, "Bela Vista");
    assert_eq!(info.city, "São Paulo");
    assert_eq!(info.state, "SP");
}

#[tokio::test]
async fn test_repeated_lookup_is_cached() {
    let (server, client) = client().await;
    let code = PostalCode::parse(KNOWN_POSTAL_CODE).unwrap();

    client.lookup(&code).await.unwrap();
    client.lookup(&code).await.unwrap();
    assert_eq!(server.requests(), 1);
}

#[tokio::test]
async fn test_unknown_code_is_not_found_and_not_cached() {
    let (server, client) = client().await;
    let code = PostalCode::parse(UNKNOWN_POSTAL_CODE).unwrap();

    for _ in 0..2 {
        let err = client.lookup(&code).await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound(_)));
        assert_eq!(err.user_message(), "CEP não encontrado");
    }
    assert_eq!(server.requests(), 2);
}

#[tokio::test]
async fn test_string_erro_is_not_found() {
    let (_server, client) = client().await;
    let code = PostalCode::parse("12345678").unwrap();

    let err = client.lookup(&code).await.unwrap_err();
    assert!(matches!(err, LookupError::NotFound(_)));
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let (_server, client) = client().await;
    let code = PostalCode::parse(FAILING_POSTAL_CODE).unwrap();

    let err = client.lookup(&code).await.unwrap_err();
    assert!(matches!(err, LookupError::Api { status: 500, .. }));
    assert_eq!(err.user_message(), "Erro ao buscar o CEP");
}

#[tokio::test]
async fn test_calculator_enables_add_to_cart() {
    let (_server, client) = client().await;
    let ctx = TestContext::new();
    let state = ctx.open_page();
    let calculator = ShippingCalculator::new(client, state.store().clone());

    assert_eq!(calculator.input_changed("0131093"), "01310-93");
    let outcome = calculator.calculate("01310-930").await.unwrap();
    assert!(matches!(outcome, CalculationOutcome::Resolved(_)));
    assert_eq!(calculator.input(), "01310-930");
    assert_eq!(calculator.options().len(), 3);

    let page = ProductPage::new(&state);
    assert_eq!(page.shipping_info().unwrap().city, "São Paulo");
    let mut popup = CartConfirmationPopup::new(&state);
    let AddToCartOutcome::Added(item) = page.add_to_cart(&mut popup) else {
        panic!("expected the item to be added");
    };
    assert_eq!(item.postal_code.unwrap().as_str(), KNOWN_POSTAL_CODE);
    popup.close().await;
}

#[tokio::test]
async fn test_failed_lookup_keeps_previous_address() {
    let (_server, client) = client().await;
    let ctx = TestContext::new();
    let state = ctx.open_page();
    let calculator = ShippingCalculator::new(client, state.store().clone());
    calculator.calculate(KNOWN_POSTAL_CODE).await.unwrap();

    let err = calculator.calculate(UNKNOWN_POSTAL_CODE).await.unwrap_err();
    assert!(matches!(err, LookupError::NotFound(_)));
    assert_eq!(
        calculator.current().unwrap().postal_code.as_str(),
        KNOWN_POSTAL_CODE
    );

    let err = calculator.calculate("0131").await.unwrap_err();
    assert!(matches!(err, LookupError::InvalidInput(_)));
}

#[tokio::test]
async fn test_new_page_starts_with_stored_code() {
    let (server, client) = client().await;
    let ctx = TestContext::new();
    let first = ctx.open_page();
    ShippingCalculator::new(client, first.store().clone())
        .calculate(KNOWN_POSTAL_CODE)
        .await
        .unwrap();

    let second = ctx.open_page();
    let client = ViaCepClient::new(&server.lookup_config()).unwrap();
    let calculator = ShippingCalculator::new(client, second.store().clone());
    assert_eq!(calculator.input(), "01310-930");
    assert!(calculator.current().is_some());

    calculator.input_changed("");
    assert!(ProductPage::new(&first).shipping_info().is_none());
}
