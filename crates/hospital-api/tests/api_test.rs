use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use hospital_api::{create_router, AppState};
use hospital_core::Database;
use serde_json::{json, Value};
use tower::ServiceExt;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn app() -> Result<Router, Box<dyn std::error::Error>> {
    Ok(create_router(AppState::new(Database::open_in_memory()?)))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
    let builder = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

async fn create(app: &Router, uri: &str, body: Value) -> Result<i64, Box<dyn std::error::Error>> {
    let (status, value) = send(app, Method::POST, uri, Some(body)).await?;
    assert_eq!(status, StatusCode::CREATED, "{}: {}", uri, value);
    value["record"]["id"]
        .as_i64()
        .ok_or_else(|| format!("no id in {}", value).into())
}

async fn seed_visit(app: &Router) -> Result<(i64, i64, i64), Box<dyn std::error::Error>> {
    let patient = create(
        app,
        "/patients",
        json!({
            "name": "Jane Roe",
            "age": 34,
            "gender": "F",
            "blood_group": "A+",
            "phone": "555-0101",
        }),
    )
    .await?;
    let doctor = create(
        app,
        "/doctors",
        json!({
            "name": "Dr. House",
            "specialization": "Diagnostics",
            "phone": "555-0200",
            "available_days": "Mon-Fri",
            "available_time": "09:00-17:00",
        }),
    )
    .await?;
    let appointment = create(
        app,
        "/appointments",
        json!({
            "patient": patient,
            "doctor": doctor,
            "date": "2024-07-01",
            "time": "10:00",
        }),
    )
    .await?;
    Ok((patient, doctor, appointment))
}

#[tokio::test]
async fn test_dashboard_starts_empty() -> TestResult {
    let app = app()?;
    let (status, body) = send(&app, Method::GET, "/", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_patients"], 0);
    assert_eq!(body["unpaid_bills"], 0);
    assert_eq!(body["recent_appointments"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_create_and_fetch_patient() -> TestResult {
    let app = app()?;
    let (status, body) = send(
        &app,
        Method::POST,
        "/patients",
        Some(json!({
            "name": "John Doe",
            "age": "42",
            "gender": "M",
            "blood_group": "O+",
            "phone": "555-0100",
        })),
    )
    .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Patient registered successfully.");
    let id = body["record"]["id"].as_i64().ok_or("missing id")?;

    let (status, body) = send(&app, Method::GET, &format!("/patients/{}", id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "John Doe");
    assert_eq!(body["age"], 42);
    Ok(())
}

#[tokio::test]
async fn test_invalid_patient_echoes_values() -> TestResult {
    let app = app()?;
    let (status, body) = send(
        &app,
        Method::POST,
        "/patients",
        Some(json!({
            "name": "John Doe",
            "age": -1,
            "gender": "X",
            "blood_group": "O+",
            "phone": "555-0100",
        })),
    )
    .await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["age"].is_array());
    assert!(body["errors"]["gender"].is_array());
    assert_eq!(body["values"]["gender"], "X");

    let (_, dashboard) = send(&app, Method::GET, "/", None).await?;
    assert_eq!(dashboard["total_patients"], 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_records_are_not_found() -> TestResult {
    let app = app()?;
    for uri in ["/patients/99", "/doctors/99", "/appointments/99", "/treatments/99", "/bills/99"] {
        let (status, body) = send(&app, Method::GET, uri, None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert!(body["error"].is_string());
    }

    let (status, _) = send(&app, Method::GET, "/patients?page=7", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_dangling_doctor_is_rejected() -> TestResult {
    let app = app()?;
    let (patient, _, _) = seed_visit(&app).await?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/appointments",
        Some(json!({
            "patient": patient,
            "doctor": 999,
            "date": "2024-07-02",
            "time": "11:00",
        })),
    )
    .await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["doctor"].is_array());

    let (_, page) = send(&app, Method::GET, "/appointments", None).await?;
    assert_eq!(page["total_count"], 1);
    Ok(())
}

#[tokio::test]
async fn test_second_treatment_for_appointment_rejected() -> TestResult {
    let app = app()?;
    let (_, _, appointment) = seed_visit(&app).await?;
    let treatment = json!({
        "appointment": appointment,
        "diagnosis": "Flu",
        "prescription": "Rest",
    });

    create(&app, "/treatments", treatment.clone()).await?;
    let (status, body) = send(&app, Method::POST, "/treatments", Some(treatment)).await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["appointment"].is_array());
    Ok(())
}

#[tokio::test]
async fn test_treatments_have_no_delete_route() -> TestResult {
    let app = app()?;
    let (_, _, appointment) = seed_visit(&app).await?;
    let id = create(
        &app,
        "/treatments",
        json!({"appointment": appointment, "diagnosis": "Flu", "prescription": "Rest"}),
    )
    .await?;

    let (status, _) = send(&app, Method::DELETE, &format!("/treatments/{}", id), None).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

#[tokio::test]
async fn test_mark_bill_paid_defaults_to_cash() -> TestResult {
    let app = app()?;
    let (patient, _, appointment) = seed_visit(&app).await?;
    let bill = create(
        &app,
        "/bills",
        json!({"patient": patient, "appointment": appointment, "amount": "150.00"}),
    )
    .await?;

    let (_, dashboard) = send(&app, Method::GET, "/", None).await?;
    assert_eq!(dashboard["unpaid_bills"], 1);

    let (status, body) = send(&app, Method::POST, &format!("/bills/{}/pay", bill), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Bill #{} marked as paid.", bill));
    assert_eq!(body["record"]["paid"], true);
    assert_eq!(body["record"]["payment_method"], "Cash");
    assert_eq!(body["record"]["amount"], "150.00");

    let (_, page) = send(&app, Method::GET, "/bills?paid=false", None).await?;
    assert_eq!(page["total_count"], 0);
    Ok(())
}

#[tokio::test]
async fn test_mark_bill_paid_rejects_unknown_method() -> TestResult {
    let app = app()?;
    let (patient, _, appointment) = seed_visit(&app).await?;
    let bill = create(
        &app,
        "/bills",
        json!({"patient": patient, "appointment": appointment, "amount": "20"}),
    )
    .await?;

    let uri = format!("/bills/{}/pay", bill);
    let (status, body) = send(&app, Method::POST, &uri, Some(json!({"payment_method": "Barter"}))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["values"]["payment_method"], "Barter");

    let (_, detail) = send(&app, Method::GET, &format!("/bills/{}", bill), None).await?;
    assert_eq!(detail["paid"], false);

    let (status, body) = send(&app, Method::POST, &uri, Some(json!({"payment_method": "Card"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["payment_method"], "Card");
    Ok(())
}

#[tokio::test]
async fn test_delete_patient_cascades() -> TestResult {
    let app = app()?;
    let (patient, _, appointment) = seed_visit(&app).await?;
    create(
        &app,
        "/treatments",
        json!({"appointment": appointment, "diagnosis": "Flu", "prescription": "Rest"}),
    )
    .await?;
    create(
        &app,
        "/bills",
        json!({"patient": patient, "appointment": appointment, "amount": "75.50"}),
    )
    .await?;

    let (status, body) = send(&app, Method::DELETE, &format!("/patients/{}", patient), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["appointments"], 1);
    assert_eq!(body["record"]["treatments"], 1);
    assert_eq!(body["record"]["bills"], 1);

    let (_, dashboard) = send(&app, Method::GET, "/", None).await?;
    assert_eq!(dashboard["total_patients"], 0);
    assert_eq!(dashboard["total_doctors"], 1);
    assert_eq!(dashboard["total_appointments"], 0);
    assert_eq!(dashboard["total_treatments"], 0);
    assert_eq!(dashboard["total_bills"], 0);
    Ok(())
}

#[tokio::test]
async fn test_list_paginates_by_ten() -> TestResult {
    let app = app()?;
    for i in 0..12 {
        create(
            &app,
            "/doctors",
            json!({
                "name": format!("Dr. {:02}", i),
                "specialization": "General",
                "phone": "555-0300",
                "available_days": "Mon",
                "available_time": "09:00-12:00",
            }),
        )
        .await?;
    }

    let (status, first) = send(&app, Method::GET, "/doctors", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["items"].as_array().map(Vec::len), Some(10));
    assert_eq!(first["has_next"], true);
    assert_eq!(first["items"][0]["name"], "Dr. 00");

    let (_, second) = send(&app, Method::GET, "/doctors?page=2", None).await?;
    assert_eq!(second["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(second["has_previous"], true);
    assert_eq!(second["num_pages"], 2);
    Ok(())
}

#[tokio::test]
async fn test_bad_filter_is_rejected() -> TestResult {
    let app = app()?;
    let (status, body) = send(&app, Method::GET, "/appointments?status=Lost", None).await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["status"].is_array());
    assert_eq!(body["values"]["status"], "Lost");
    Ok(())
}
