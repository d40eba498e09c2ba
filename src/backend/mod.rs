pub mod models;

use reqwest::{Client, Response};
use serde_json::{Map, Value};

use crate::config::Settings;
use crate::error::BackendError;
use models::{Measurement, Place, SensorState, SensorUpdate};

/// Collaborator URLs, captured once at startup.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub places_by_username: String,
    pub report: String,
    pub sensor_measurement: String,
    pub place_admins: String,
    pub sensor_states: String,
    pub single_sensor: String,
}

impl From<&Settings> for Endpoints {
    fn from(settings: &Settings) -> Self {
        Self {
            places_by_username: settings.get_places_by_username_api.clone(),
            report: settings.get_report_api.clone(),
            sensor_measurement: settings.get_sensor_measurement_api.clone(),
            place_admins: settings.get_place_admin_api.clone(),
            sensor_states: settings.manage_sensors_api.clone(),
            single_sensor: settings.manage_single_sensor_api.clone(),
        }
    }
}

/// Thin client over the place directory, telemetry store, report generator
/// and sensor control service. No retries: a failure is returned as-is.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    endpoints: Endpoints,
}

impl BackendClient {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            client: Client::new(),
            endpoints,
        }
    }

    pub async fn places_by_username(&self, username: &str) -> Result<Vec<Place>, BackendError> {
        let resp = self
            .client
            .get(&self.endpoints.places_by_username)
            .query(&[("adminUsername", username)])
            .send()
            .await?;
        Ok(ensure_ok(resp)?.json().await?)
    }

    /// Download the PDF report in full.
    pub async fn report(&self) -> Result<Vec<u8>, BackendError> {
        let resp = self.client.get(&self.endpoints.report).send().await?;
        let bytes = ensure_ok(resp)?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Latest reading of one sensor, `None` when the store has no data.
    pub async fn latest_measurement(
        &self,
        sensor_name: &str,
        place_id: i64,
    ) -> Result<Option<Measurement>, BackendError> {
        let resp = self
            .client
            .get(&self.endpoints.sensor_measurement)
            .query(&[
                ("sensor_name", sensor_name.to_string()),
                ("place_id", place_id.to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<Measurement> = ensure_ok(resp)?.json().await?;
        Ok(rows.into_iter().next())
    }

    pub async fn place_admins(&self, place_id: i64) -> Result<Vec<String>, BackendError> {
        let resp = self
            .client
            .get(&self.endpoints.place_admins)
            .query(&[("placeID", place_id)])
            .send()
            .await?;
        Ok(ensure_ok(resp)?.json().await?)
    }

    pub async fn sensor_states(&self, place_id: i64) -> Result<Vec<SensorState>, BackendError> {
        let resp = self
            .client
            .get(&self.endpoints.sensor_states)
            .query(&[("placeID", place_id)])
            .send()
            .await?;
        let map: Map<String, Value> = ensure_ok(resp)?.json().await?;
        Ok(models::sensor_states_from_map(map))
    }

    pub async fn set_sensor_state(
        &self,
        place_id: i64,
        sensor_name: &str,
        status: bool,
    ) -> Result<(), BackendError> {
        let body = SensorUpdate {
            place_id,
            sensor_name,
            status,
        };
        let resp = self
            .client
            .put(&self.endpoints.single_sensor)
            .json(&body)
            .send()
            .await?;
        ensure_ok(resp)?;
        Ok(())
    }
}

/// Only a plain 200 counts as success for these collaborators.
fn ensure_ok(resp: Response) -> Result<Response, BackendError> {
    if resp.status() == reqwest::StatusCode::OK {
        Ok(resp)
    } else {
        Err(BackendError::Status(resp.status()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn endpoints_for(server: &MockServer) -> Endpoints {
        let base = server.uri();
        Endpoints {
            places_by_username: format!("{}/places", base),
            report: format!("{}/report", base),
            sensor_measurement: format!("{}/measurements", base),
            place_admins: format!("{}/admins", base),
            sensor_states: format!("{}/sensors", base),
            single_sensor: format!("{}/sensor", base),
        }
    }

    #[tokio::test]
    async fn places_are_requested_by_admin_username() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/places"))
            .and(query_param("adminUsername", "alice"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{ "placeID": 3 }, { "placeID": 1 }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = BackendClient::new(endpoints_for(&server));
        let places = api.places_by_username("alice").await.unwrap();
        assert_eq!(places, vec![Place { place_id: 3 }, Place { place_id: 1 }]);
    }

    #[tokio::test]
    async fn measurement_query_asks_for_one_row() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/measurements"))
            .and(query_param("sensor_name", "humidity"))
            .and(query_param("place_id", "4"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let api = BackendClient::new(endpoints_for(&server));
        assert!(api.latest_measurement("humidity", 4).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_200_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = BackendClient::new(endpoints_for(&server));
        let err = api.report().await.unwrap_err();
        assert!(matches!(err, BackendError::Status(s) if s.as_u16() == 500));
    }

    #[tokio::test]
    async fn set_sensor_state_puts_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/sensor"))
            .and(body_json(serde_json::json!({
                "placeID": 9, "sensorName": "smoke", "status": false
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = BackendClient::new(endpoints_for(&server));
        api.set_sensor_state(9, "smoke", false).await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let api = BackendClient::new(Endpoints {
            places_by_username: "http://127.0.0.1:9/places".to_string(),
            report: String::new(),
            sensor_measurement: String::new(),
            place_admins: String::new(),
            sensor_states: String::new(),
            single_sensor: String::new(),
        });
        let err = api.places_by_username("bob").await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
