use anyhow::Result;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{NaiveDate, Utc};
use elevator_client::core::services::{
    CrudService, Elevators, Faults, ListFilter, Parts, StatusService,
};
use elevator_client::domain::model::{ArizaDurumu, TeklifDurumu};
use elevator_client::domain::ports::TokenStore;
use elevator_client::{ApiClient, ClientError, MemoryTokenStore};
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn token_expiring_in(seconds: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "sub": "7",
            "username": "ayse",
            "role": "PERSONEL",
            "exp": Utc::now().timestamp() + seconds,
        })
        .to_string(),
    );
    format!("{}.{}.sig", header, payload)
}

fn client_for(server: &MockServer, store: Arc<MemoryTokenStore>) -> Result<ApiClient> {
    Ok(ApiClient::with_timeout(
        &server.url("/api"),
        store,
        Duration::from_secs(5),
    )?)
}

/// 列表請求帶上 bearer token 與篩選參數，並解開分頁包裝
#[tokio::test]
async fn test_list_elevators_unwraps_page_and_sends_filter() -> Result<()> {
    let server = MockServer::start_async().await;
    let token = token_expiring_in(3600);

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/elevators")
                .header("Authorization", format!("Bearer {}", token))
                .query_param("search", "Gül")
                .query_param("startDate", "2024-03-01");
            then.status(200).json_body(json!({
                "content": [{
                    "id": 3,
                    "identityNumber": "ASN-0003",
                    "buildingName": "Gül Apt.",
                    "address": "Kadıköy",
                    "blockName": "A",
                    "elevatorNumber": "2",
                    "labelType": "GREEN",
                    "expiryDate": "2025-01-31T00:00:00"
                }],
                "totalElements": 1
            }));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_access_token(token.clone()));
    let service = CrudService::<Elevators>::new(client_for(&server, store)?);
    let filter = ListFilter {
        start_date: Some("01.03.2024".to_string()),
        search: Some("Gül".to_string()),
        ..ListFilter::default()
    };

    let elevators = service.list(&filter).await?;
    mock.assert_async().await;

    assert_eq!(elevators.len(), 1);
    assert_eq!(elevators[0].bina_adi, "Gül Apt.");
    assert_eq!(elevators[0].kod(), "A2");
    assert_eq!(
        elevators[0].etiket_bitis,
        NaiveDate::from_ymd_opt(2025, 1, 31)
    );
    Ok(())
}

/// `{ success, data }` 包裝的單筆回應
#[tokio::test]
async fn test_get_fault_from_envelope() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/faults/12");
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "id": 12,
                    "elevatorId": 3,
                    "reportedDate": "2024-05-02",
                    "description": "Kapı kapanmıyor",
                    "status": "IN_PROGRESS"
                }
            }));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_access_token(token_expiring_in(3600)));
    let fault = CrudService::<Faults>::new(client_for(&server, store)?)
        .get(12)
        .await?;

    mock.assert_async().await;
    assert_eq!(fault.durum, ArizaDurumu::InProgress);
    assert_eq!(fault.aciklama, "Kapı kapanmıyor");
    Ok(())
}

#[tokio::test]
async fn test_backend_error_message_is_surfaced() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/parts/9");
            then.status(409)
                .json_body(json!({"success": false, "message": "Parça stokta kullanılıyor"}));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_access_token(token_expiring_in(3600)));
    let err = CrudService::<Parts>::new(client_for(&server, store)?)
        .delete(9)
        .await
        .unwrap_err();

    match err {
        ClientError::ApiError { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Parça stokta kullanılıyor");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

/// 401 代表伺服器端已失效，本地 token 需清除
#[tokio::test]
async fn test_unauthorized_clears_stored_token() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/parts");
            then.status(401).json_body(json!({"error": "Token revoked"}));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_access_token(token_expiring_in(3600)));
    let service = CrudService::<Parts>::new(client_for(&server, store.clone())?);

    let err = service.list(&ListFilter::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized { .. }));
    assert!(err.requires_login());
    assert!(store.load()?.is_none());
    Ok(())
}

/// 過期的 token 在本地就被拒絕，不會送出請求
#[tokio::test]
async fn test_expired_token_never_reaches_server() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/elevators");
            then.status(200).json_body(json!([]));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_access_token(token_expiring_in(-60)));
    let err = CrudService::<Elevators>::new(client_for(&server, store)?)
        .list(&ListFilter::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired));
    assert_eq!(mock.hits_async().await, 0);

    let no_token = Arc::new(MemoryTokenStore::new());
    let err = CrudService::<Elevators>::new(client_for(&server, no_token)?)
        .get(1)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
    Ok(())
}

#[tokio::test]
async fn test_update_part_sends_backend_field_names() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/api/parts/5")
                .json_body(json!({"id": 5, "name": "Halat", "stock": 12, "unitPrice": 1200.0}));
            then.status(200)
                .json_body(json!({"id": 5, "name": "Halat", "stock": 12, "unitPrice": 1200.0}));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_access_token(token_expiring_in(3600)));
    let service = CrudService::<Parts>::new(client_for(&server, store)?);
    let part = elevator_client::domain::model::Parca {
        id: Some(5),
        ad: "Halat".to_string(),
        stok: 12,
        birim_fiyat: 1200.0,
    };

    let updated = service.update(5, &part).await?;
    mock.assert_async().await;
    assert_eq!(updated, part);
    Ok(())
}

/// 狀態變更以 PATCH 送出後端的列舉名稱
#[tokio::test]
async fn test_fault_status_patch() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/faults/5/status")
                .json_body(json!({"status": "IN_PROGRESS"}));
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "id": 5,
                    "elevatorId": 3,
                    "reportedDate": "2024-05-02",
                    "description": "Kapı kapanmıyor",
                    "status": "IN_PROGRESS"
                }
            }));
        })
        .await;

    let store = Arc::new(MemoryTokenStore::with_access_token(token_expiring_in(3600)));
    let fault = StatusService::new(client_for(&server, store)?)
        .update_fault_status(5, ArizaDurumu::InProgress)
        .await?;

    mock.assert_async().await;
    assert_eq!(fault.id, Some(5));
    assert_eq!(fault.durum, ArizaDurumu::InProgress);
    Ok(())
}

#[tokio::test]
async fn test_offer_status_patch() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/offers/8/status")
                .json_body(json!({"status": "ACCEPTED"}));
            then.status(200).json_body(json!({
                "id": 8,
                "elevatorId": 3,
                "date": "2024-06-10",
                "amount": 45000.0,
                "description": "Kumanda panosu yenileme",
                "status": "ACCEPTED"
            }));
        })
        .await;

    let parsed = TeklifDurumu::parse("accepted").expect("known status");
    let store = Arc::new(MemoryTokenStore::with_access_token(token_expiring_in(3600)));
    let offer = StatusService::new(client_for(&server, store)?)
        .update_offer_status(8, parsed)
        .await?;

    mock.assert_async().await;
    assert_eq!(offer.durum, TeklifDurumu::Accepted);
    assert_eq!(offer.tutar, 45000.0);
    Ok(())
}
