//! HTTP handler functions for the air-quality API.
//!
//! Read-only feeds degrade to an empty list when the observation source is
//! unavailable. The report export instead distinguishes a source failure
//! (502) from filters that match nothing (404).

use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{Either, HttpResponse, web};
use air_quality_aggregate::feed::{map_points, polygons as polygon_feed};
use air_quality_aggregate::{filter_observations, municipalities as municipality_names};
use air_quality_observation_models::ObservationFilter;
use air_quality_report::{ReportError, ReportOptions, report_filename};
use air_quality_server_models::{
    ApiAggregate, ApiError, ApiHealth, ApiMapPoint, ApiPolygon, FilterParams,
};
use air_quality_source::{fetch_assets, fetch_observations, fetch_observations_or_empty};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/municipalities`
///
/// Sorted municipality names for the filter selector.
pub async fn municipalities(state: web::Data<AppState>) -> HttpResponse {
    let observations = fetch_observations_or_empty(&state.client, &state.config).await;
    HttpResponse::Ok().json(municipality_names(&observations))
}

/// `GET /api/map-data`
///
/// Individual sensor markers matching the municipality and category
/// filters.
pub async fn map_data(
    state: web::Data<AppState>,
    params: web::Query<FilterParams>,
) -> HttpResponse {
    let observations = fetch_observations_or_empty(&state.client, &state.config).await;
    let filter = ObservationFilter::from(&*params);

    let points: Vec<ApiMapPoint> = map_points(&observations, &filter)
        .into_iter()
        .map(ApiMapPoint::from)
        .collect();
    HttpResponse::Ok().json(points)
}

/// `GET /api/aggregate`
///
/// Per-municipality means. The category filter applies to each
/// aggregate's own category.
pub async fn aggregate(
    state: web::Data<AppState>,
    params: web::Query<FilterParams>,
) -> HttpResponse {
    let observations = fetch_observations_or_empty(&state.client, &state.config).await;
    let filter = ObservationFilter::from(&*params);

    let records: Vec<ApiAggregate> = air_quality_aggregate::aggregate(&observations, &filter)
        .into_iter()
        .map(ApiAggregate::from)
        .collect();
    HttpResponse::Ok().json(records)
}

/// `GET /api/polygons`
///
/// Every municipality aggregate with its fill colour.
pub async fn polygons(state: web::Data<AppState>) -> HttpResponse {
    let observations = fetch_observations_or_empty(&state.client, &state.config).await;

    let records: Vec<ApiPolygon> = polygon_feed(&observations)
        .into_iter()
        .map(ApiPolygon::from)
        .collect();
    HttpResponse::Ok().json(records)
}

/// `POST /api/export`
///
/// Renders the PDF report for the submitted filters and returns it as an
/// attachment. Accepts a form or JSON body.
pub async fn export(
    state: web::Data<AppState>,
    body: Either<web::Form<FilterParams>, web::Json<FilterParams>>,
) -> HttpResponse {
    let params = match body {
        Either::Left(form) => form.into_inner(),
        Either::Right(json) => json.into_inner(),
    };
    let filter = ObservationFilter::from(&params);

    let observations = match fetch_observations(&state.client, &state.config).await {
        Ok(observations) => observations,
        Err(e) => {
            log::error!("Failed to load observations for export: {e}");
            return HttpResponse::BadGateway().json(ApiError::new(
                "Não foi possível carregar os dados de qualidade do ar",
            ));
        }
    };

    if filter_observations(&observations, &filter).is_empty() {
        return no_data(&filter);
    }

    let assets = fetch_assets(&state.client, &state.config.assets).await;
    let options = ReportOptions {
        asset_urls: state.config.assets.clone(),
        ..ReportOptions::default()
    };
    let filename = report_filename(&filter);

    let built = web::block(move || {
        air_quality_report::build(&observations, &filter, &assets, &options)
            .map_err(|e| (e, filter))
    })
    .await;

    match built {
        Ok(Ok(bytes)) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header(attachment(&filename))
            .body(bytes),
        Ok(Err((ReportError::NoMatchingData { .. }, filter))) => no_data(&filter),
        Ok(Err((e, _))) => {
            log::error!("Failed to build report: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Falha ao gerar o relatório"))
        }
        Err(e) => {
            log::error!("Report task failed: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Falha ao gerar o relatório"))
        }
    }
}

/// `Content-Disposition: attachment` with an ASCII `filename` and, when the
/// name has accents, a UTF-8 `filename*`.
fn attachment(filename: &str) -> ContentDisposition {
    let fallback: String = filename.chars().map(ascii_fold).collect();
    let mut parameters = vec![DispositionParam::Filename(fallback.clone())];
    if fallback != filename {
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_owned()),
            language_tag: None,
            value: filename.as_bytes().to_vec(),
        }));
    }
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}

const fn ascii_fold(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        c if c.is_ascii() => c,
        _ => '_',
    }
}

fn no_data(filter: &ObservationFilter) -> HttpResponse {
    log::info!(
        "No data for export (municipality={:?}, category={:?})",
        filter.locality,
        filter.category
    );
    HttpResponse::NotFound().json(ApiError::new(
        "Nenhum dado encontrado para os filtros selecionados",
    ))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use air_quality_source::SourceConfig;

    use crate::{AppState, configure};

    const SAMPLE: &str = "\
MUNICÍPIO,latitude,longitude,pm2.5_24hour,Valor,name
Natal,-5.79,-35.21,10,Boa,PA-1
Natal,-5.80,-35.22,30,Moderada,PA-2
Mossoró,,,90,Muito Ruim,PA-3
";

    fn sample_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "air_quality_server_{}_{name}.csv",
            std::process::id()
        ));
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    fn state(location: &str) -> actix_web::web::Data<AppState> {
        let config = SourceConfig::parse(&format!("url = {location:?}")).unwrap();
        actix_web::web::Data::new(AppState::new(config).unwrap())
    }

    #[actix_web::test]
    async fn health_is_ok() {
        let app = test::init_service(App::new().app_data(state("x")).configure(configure)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn map_data_filters_and_drops_unmappable_rows() {
        let path = sample_file("map");
        let app = test::init_service(
            App::new()
                .app_data(state(&path.to_string_lossy()))
                .configure(configure),
        )
        .await;

        let all: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/map-data").to_request(),
        )
        .await;
        assert_eq!(all.as_array().map(Vec::len), Some(2));

        let good: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/map-data?municipality=natal&category=boa")
                .to_request(),
        )
        .await;
        assert_eq!(good[0]["sensorName"], "PA-1");
        assert_eq!(good[0]["color"], "#009966");
        assert_eq!(good.as_array().map(Vec::len), Some(1));

        std::fs::remove_file(path).ok();
    }

    #[actix_web::test]
    async fn aggregate_and_polygons_agree() {
        let path = sample_file("aggregate");
        let app = test::init_service(
            App::new()
                .app_data(state(&path.to_string_lossy()))
                .configure(configure),
        )
        .await;

        let aggregates: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/aggregate").to_request(),
        )
        .await;
        let polygons: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/polygons").to_request(),
        )
        .await;

        assert_eq!(aggregates[0]["locality"], "Natal");
        assert_eq!(aggregates[0]["meanValue"], 20.0);
        assert_eq!(aggregates[0]["sensorCount"], 2);
        assert_eq!(polygons[0]["meanValue"], aggregates[0]["meanValue"]);
        assert_eq!(polygons[1]["color"], "#EE3608");

        std::fs::remove_file(path).ok();
    }

    #[actix_web::test]
    async fn unavailable_source_degrades_feeds_but_fails_export() {
        let app = test::init_service(
            App::new()
                .app_data(state("/nonexistent/air_quality/dados.csv"))
                .configure(configure),
        )
        .await;

        let names: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/municipalities").to_request(),
        )
        .await;
        assert_eq!(names, serde_json::json!([]));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/export")
                .set_form([("municipality", ""), ("category", "")])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn export_returns_pdf_or_not_found() {
        let path = sample_file("export");
        let app = test::init_service(
            App::new()
                .app_data(state(&path.to_string_lossy()))
                .configure(configure),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/export")
                .set_form([("municipality", "Natal"), ("category", "")])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get("content-disposition")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        assert!(disposition.contains("relatorio_Natal_todos.pdf"));
        let body = test::read_body(resp).await;
        assert!(body.starts_with(b"%PDF-1.5"));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/export")
                .set_json(serde_json::json!({ "municipality": "Caicó" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        std::fs::remove_file(path).ok();
    }

    #[actix_web::test]
    async fn accented_municipality_gets_utf8_filename() {
        let path = sample_file("accented");
        let app = test::init_service(
            App::new()
                .app_data(state(&path.to_string_lossy()))
                .configure(configure),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/export")
                .set_form([("municipality", "Mossoró"), ("category", "")])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let disposition = resp
            .headers()
            .get("content-disposition")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        assert!(disposition.contains("filename=\"relatorio_Mossoro_todos.pdf\""));
        assert!(disposition.contains("filename*=UTF-8''relatorio_Mossor%C3%B3_todos.pdf"));

        std::fs::remove_file(path).ok();
    }

    #[::core::prelude::v1::test]
    fn ascii_names_have_no_extended_parameter() {
        let disposition = super::attachment("relatorio_Natal_todos.pdf");
        assert_eq!(disposition.parameters.len(), 1);
        assert_eq!(disposition.get_filename(), Some("relatorio_Natal_todos.pdf"));
    }
}
