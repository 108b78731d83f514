mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::spawn_app;

fn car_asset() -> serde_json::Value {
    json!({
        "name": "Car",
        "kind": "vehicle",
        "value": "18000.00",
        "acquisition_date": "2020-03-01",
        "acquisition_method": "purchase",
    })
}

#[tokio::test]
async fn owner_can_crud_own_assets() {
    let app = spawn_app().await;
    let (owner_id, access, _) = app
        .register_and_login("owner@example.com", "password123", "owner")
        .await;

    let base = format!("/owners/{}/assets", owner_id);

    let (status, body) = app
        .request(Method::POST, &base, Some(&access), Some(car_asset()))
        .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    let asset_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["owner_id"], owner_id.to_string());

    let asset_uri = format!("{}/{}", base, asset_id);
    let (status, body) = app
        .request(Method::GET, &asset_uri, Some(&access), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Car");

    let (status, body) = app
        .request(
            Method::PUT,
            &asset_uri,
            Some(&access),
            Some(json!({
                "name": "Car",
                "kind": "vehicle",
                "value": "15000.00",
                "acquisition_date": "2020-03-01",
                "acquisition_method": "purchase",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "15000.00");

    let (status, _) = app
        .request(Method::DELETE, &asset_uri, Some(&access), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(Method::GET, &asset_uri, Some(&access), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delegation_grant_scenario() {
    let app = spawn_app().await;

    // U1 owns an asset; U2 is an accountant with no grant yet.
    let (u1, u1_access, _) = app
        .register_and_login("u1@example.com", "password123", "owner")
        .await;
    let (u2, u2_access, _) = app
        .register_and_login("u2@example.com", "password123", "delegate")
        .await;

    let base = format!("/owners/{}/assets", u1);
    let (status, body) = app
        .request(Method::POST, &base, Some(&u1_access), Some(car_asset()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let asset_uri = format!("{}/{}", base, body["id"].as_str().unwrap());

    // Owner reads their own record.
    let (status, _) = app
        .request(Method::GET, &asset_uri, Some(&u1_access), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // No grant: denied, and the response does not confirm the
    // resource exists.
    let (status, body) = app
        .request(Method::GET, &asset_uri, Some(&u2_access), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));

    // Grant created for (U1, U2): the retry succeeds.
    app.registry.grant(u1, u2);
    let (status, body) = app
        .request(Method::GET, &asset_uri, Some(&u2_access), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Car");

    let (status, body) = app
        .request(Method::GET, &base, Some(&u2_access), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Revocation is effective on the very next request.
    app.registry.revoke(u1, u2);
    let (status, _) = app
        .request(Method::GET, &asset_uri, Some(&u2_access), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stranger_cannot_write_into_another_owners_records() {
    let app = spawn_app().await;
    let (u1, u1_access, _) = app
        .register_and_login("u1@example.com", "password123", "owner")
        .await;
    let (_, u2_access, _) = app
        .register_and_login("u2@example.com", "password123", "owner")
        .await;

    let base = format!("/owners/{}/assets", u1);
    let (status, body) = app
        .request(Method::POST, &base, Some(&u1_access), Some(car_asset()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let asset_uri = format!("{}/{}", base, body["id"].as_str().unwrap());

    let (status, _) = app
        .request(Method::POST, &base, Some(&u2_access), Some(car_asset()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            Method::PUT,
            &asset_uri,
            Some(&u2_access),
            Some(json!({
                "name": "Hijacked",
                "kind": "vehicle",
                "value": "1.00",
                "acquisition_date": "2020-03-01",
                "acquisition_method": "purchase",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(Method::DELETE, &asset_uri, Some(&u2_access), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The record is untouched.
    let (status, body) = app
        .request(Method::GET, &asset_uri, Some(&u1_access), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Car");
}

#[tokio::test]
async fn asset_listing_supports_filters() {
    let app = spawn_app().await;
    let (owner, access, _) = app
        .register_and_login("owner@example.com", "password123", "owner")
        .await;

    let base = format!("/owners/{}/assets", owner);
    for asset in [
        car_asset(),
        json!({
            "name": "Flat",
            "kind": "real_estate",
            "value": "250000.00",
            "acquisition_date": "2018-07-15",
            "acquisition_method": "inheritance",
        }),
        json!({
            "name": "Coin",
            "kind": "crypto",
            "value": "4000.00",
            "acquisition_date": "2022-11-30",
            "acquisition_method": "purchase",
        }),
    ] {
        let (status, _) = app
            .request(Method::POST, &base, Some(&access), Some(asset))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .request(Method::GET, &base, Some(&access), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = app
        .request(
            Method::GET,
            &format!("{}?kind=real_estate", base),
            Some(&access),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Flat");

    let (status, body) = app
        .request(
            Method::GET,
            &format!("{}?acquired_from=2020-01-01&acquired_to=2021-12-31", base),
            Some(&access),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Car");

    let (status, body) = app
        .request(
            Method::GET,
            &format!("{}?offset=1&limit=1", base),
            Some(&access),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Flat");
}

#[tokio::test]
async fn non_positive_values_are_rejected() {
    let app = spawn_app().await;
    let (owner, access, _) = app
        .register_and_login("owner@example.com", "password123", "owner")
        .await;

    let base = format!("/owners/{}/assets", owner);
    for value in ["0", "-100.00"] {
        let (status, _) = app
            .request(
                Method::POST,
                &base,
                Some(&access),
                Some(json!({
                    "name": "Car",
                    "kind": "vehicle",
                    "value": value,
                    "acquisition_date": "2020-03-01",
                    "acquisition_method": "purchase",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[tokio::test]
async fn asset_routes_require_authentication() {
    let app = spawn_app().await;
    let (owner, _, _) = app
        .register_and_login("owner@example.com", "password123", "owner")
        .await;

    let base = format!("/owners/{}/assets", owner);
    let (status, _) = app.request(Method::GET, &base, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::POST, &base, None, Some(car_asset()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
