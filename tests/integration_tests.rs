//! End-to-end tests against mocked geocoding, weather and IP lookup servers

use std::process::Command;

use serde_json::{Value, json};
use weather_insights::{
    AcquisitionPipeline, Coordinates, FixedGeolocator, GeolocationError, Geolocator,
    InsightsError, IpGeolocator, LocationResolver, OpenCageClient, OpenWeatherClient,
    RetryPolicy,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GEOCODE_KEY: &str = "test-geocode-key";
const WEATHER_KEY: &str = "test-weather-key";
const FALLBACK: Coordinates = Coordinates::new(40.7128, -74.0060);

type TestPipeline = AcquisitionPipeline<OpenCageClient, OpenWeatherClient>;

fn pipeline(server: &MockServer) -> TestPipeline {
    AcquisitionPipeline::new(
        OpenCageClient::with_base_url(GEOCODE_KEY, &server.uri(), 5)
            .expect("client construction should not fail"),
        OpenWeatherClient::with_base_url(WEATHER_KEY, &server.uri(), 5)
            .expect("client construction should not fail"),
        RetryPolicy::default(),
    )
}

fn geocode_body(city: &str, country: &str, lat: f64, lng: f64, timezone: &str) -> Value {
    json!({
        "results": [{
            "components": {
                "city": city,
                "state": "Somewhere",
                "country": country,
                "country_code": "xx"
            },
            "geometry": { "lat": lat, "lng": lng },
            "annotations": {
                "timezone": { "name": timezone, "offset_string": "+0100" },
                "currency": { "name": "Euro", "symbol": "€" },
                "flag": "🇫🇷",
                "callingcode": 33
            },
            "formatted": format!("{city}, {country}")
        }],
        "status": { "code": 200, "message": "OK" },
        "total_results": 1
    })
}

fn weather_body(lat: f64, lon: f64, timezone: &str) -> Value {
    let start = 1_705_320_000_i64;
    let condition = json!([{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }]);
    json!({
        "lat": lat,
        "lon": lon,
        "timezone": timezone,
        "timezone_offset": 3600,
        "current": {
            "dt": start,
            "sunrise": start - 16_200,
            "sunset": start + 15_600,
            "temp": 6.3,
            "feels_like": 3.9,
            "pressure": 1021,
            "humidity": 71,
            "visibility": 10000,
            "wind_speed": 4.12,
            "wind_deg": 230,
            "weather": condition
        },
        "hourly": (0..48).map(|i| json!({
            "dt": start + i * 3600,
            "temp": 6.0,
            "pop": 0.1,
            "weather": condition
        })).collect::<Vec<_>>(),
        "daily": (0..8).map(|i| json!({
            "dt": start + i * 86_400,
            "sunrise": start - 16_200 + i * 86_400,
            "sunset": start + 15_600 + i * 86_400,
            "temp": { "day": 6.0, "min": 1.2, "max": 8.7, "night": 2.0 },
            "pop": 0.3,
            "weather": condition
        })).collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn paris_search_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .and(query_param("q", "Paris"))
        .and(query_param("key", GEOCODE_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_body(
            "Paris",
            "France",
            48.856_614,
            2.352_222,
            "Europe/Paris",
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/onecall"))
        .and(query_param("lat", "48.856614"))
        .and(query_param("lon", "2.352222"))
        .and(query_param("exclude", "minutely"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", WEATHER_KEY))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(weather_body(48.8566, 2.3522, "Europe/Paris")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline(&server);
    let resolver = LocationResolver::new(pipeline.geocoder(), FALLBACK);

    let resolution = resolver.resolve_search("Paris").await.expect("search should resolve");
    assert_eq!(resolution.coordinates, Coordinates::new(48.856_614, 2.352_222));

    let insights = pipeline.run(resolution).await.expect("cycle should succeed");

    assert_eq!(insights.location.name, "Paris");
    assert_eq!(insights.location.country, "France");
    assert_eq!(insights.location.region, "Somewhere");
    assert_eq!(insights.location.coordinates.latitude, "48.8566");
    assert_eq!(insights.location.coordinates.longitude, "2.3522");
    assert_eq!(insights.location.timezone, "Europe/Paris");
    assert_eq!(insights.location.currency_symbol, "€");
    assert_eq!(insights.location.calling_code, "33");
    assert_eq!(insights.location.population, "Data not available");
    assert_eq!(insights.weather.timezone, "Europe/Paris");
    assert_eq!(insights.weather.hourly.len(), 48);
    assert_eq!(insights.weather.daily.len(), 8);
    assert_eq!(insights.weather.current.format_wind(), "4.12 m/s SW");
}

#[tokio::test]
async fn geolocation_denied_falls_back_to_default_position() {
    let server = MockServer::start().await;

    // "+" in the reverse query decodes to a space
    Mock::given(method("GET"))
        .and(path("/json"))
        .and(query_param("q", "40.7128 -74.006"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_body(
            "New York",
            "United States",
            40.7128,
            -74.006,
            "America/New_York",
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/onecall"))
        .and(query_param("lat", "40.7128"))
        .and(query_param("lon", "-74.006"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(weather_body(40.7128, -74.006, "America/New_York")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline(&server);
    let resolver = LocationResolver::new(pipeline.geocoder(), FALLBACK);
    let locator = FixedGeolocator::failing(GeolocationError::PermissionDenied);

    let resolution = resolver.resolve_device(&locator).await;
    assert_eq!(resolution.coordinates, FALLBACK);
    let notice = resolution.notice.as_ref().expect("fallback should carry a notice");
    assert!(notice.is_recoverable());
    assert_eq!(
        notice.user_message(),
        "Unable to get your location. Please try searching for a location instead."
    );

    let insights = pipeline.run(resolution).await.expect("cycle should succeed");
    assert_eq!(insights.coordinates, FALLBACK);
    assert_eq!(insights.location.name, "New York");
    assert_eq!(insights.location.coordinates.longitude, "-74.0060");
}

#[tokio::test]
async fn weather_server_error_fails_cycle_after_three_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_body(
            "Paris",
            "France",
            48.8566,
            2.3522,
            "Europe/Paris",
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/onecall"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = pipeline(&server)
        .acquire(Coordinates::new(48.8566, 2.3522), None)
        .await
        .expect_err("weather failure should abort the cycle");

    assert!(matches!(err, InsightsError::WeatherFetch { .. }), "got {err:?}");
    assert_eq!(
        err.user_message(),
        "Unable to fetch weather data. Please check your API key or try again later."
    );
}

#[tokio::test]
async fn empty_search_makes_no_requests() {
    let server = MockServer::start().await;
    let pipeline = pipeline(&server);
    let resolver = LocationResolver::new(pipeline.geocoder(), FALLBACK);

    for query in ["", "   "] {
        let err = resolver
            .resolve_search(query)
            .await
            .expect_err("blank query should be rejected");
        assert!(matches!(err, InsightsError::Validation { .. }));
    }

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn search_without_results_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [], "total_results": 0 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline(&server);
    let resolver = LocationResolver::new(pipeline.geocoder(), FALLBACK);
    let err = resolver
        .resolve_search("Xyzzyville")
        .await
        .expect_err("no candidate should fail");

    assert!(matches!(err, InsightsError::NotFound { .. }));
}

#[tokio::test]
async fn empty_reverse_geocode_is_generic_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/onecall"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(weather_body(0.0, 0.0, "Etc/UTC")),
        )
        .mount(&server)
        .await;

    let err = pipeline(&server)
        .acquire(Coordinates::new(0.0, 0.0), None)
        .await
        .expect_err("missing location details should fail");

    assert!(matches!(err, InsightsError::Data { .. }), "got {err:?}");
}

#[tokio::test]
async fn malformed_weather_body_is_generic_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/onecall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cod": 200 })))
        .mount(&server)
        .await;

    let err = pipeline(&server)
        .acquire(
            Coordinates::new(48.8566, 2.3522),
            Some(
                serde_json::from_value(geocode_body("Paris", "France", 48.8566, 2.3522, "Europe/Paris")["results"][0].clone())
                    .expect("fixture should decode"),
            ),
        )
        .await
        .expect_err("malformed body should fail");

    assert!(matches!(err, InsightsError::Data { .. }), "got {err:?}");
}

#[tokio::test]
async fn ip_lookup_reports_position() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "city": "Zurich",
            "lat": 47.3769,
            "lon": 8.5417
        })))
        .mount(&server)
        .await;

    let locator = IpGeolocator::with_url(&format!("{}/json", server.uri()), 5)
        .expect("client construction should not fail");
    assert_eq!(
        locator.current_position().await,
        Ok(Coordinates::new(47.3769, 8.5417))
    );
}

#[tokio::test]
async fn ip_lookup_failure_is_geolocation_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "fail",
            "message": "private range"
        })))
        .mount(&server)
        .await;

    let locator = IpGeolocator::with_url(&format!("{}/json", server.uri()), 5)
        .expect("client construction should not fail");
    assert_eq!(
        locator.current_position().await,
        Err(GeolocationError::Other("private range".to_string()))
    );
}

#[test]
fn cli_help_lists_commands() {
    let output = Command::new(env!("CARGO_BIN_EXE_weather-insights"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["search", "here", "presets", "interactive", "serve"] {
        assert!(stdout.contains(command), "help is missing '{command}'");
    }
}

#[test]
fn cli_search_without_api_keys_reports_configuration_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_weather-insights"))
        .args(["search", "Paris"])
        .env("HOME", std::env::temp_dir())
        .env("XDG_CONFIG_HOME", std::env::temp_dir().join("weather-insights-no-config"))
        .env_remove("WEATHER_INSIGHTS__GEOCODING__API_KEY")
        .env_remove("WEATHER_INSIGHTS__WEATHER__API_KEY")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("API key is required"), "stderr: {stderr}");
}
