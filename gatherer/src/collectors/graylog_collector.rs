use crate::{
    http_client::HttpClient,
    metrics::{
        flatten,
        Accumulator,
        Fields,
        MetricsRequest,
        ResponseMetrics,
        Tags,
    },
    settings::{
        GraylogSettings,
        ServerSpec,
    },
    GatherError,
};
use base64::{
    prelude::BASE64_STANDARD,
    Engine,
};
use reqwest::{
    header::{
        HeaderValue,
        ACCEPT,
        AUTHORIZATION,
        CONTENT_TYPE,
    },
    Method,
    Request,
    StatusCode,
};
use std::sync::Arc;
use url::Url;

/// Endpoints whose URL contains this are queried with a POST listing the configured metrics.
/// All others are `namespace` endpoints answering a plain GET.
pub const MULTIPLE_ENDPOINT_MARKER: &str = "multiple";

/// Gathers the metrics of a single Graylog endpoint
pub struct GraylogCollector {
    settings: Arc<GraylogSettings>,
    client: Arc<dyn HttpClient>,
}

impl GraylogCollector {
    pub fn new(settings: GraylogSettings, client: Arc<dyn HttpClient>) -> Self {
        Self {
            settings: Arc::new(settings),
            client,
        }
    }

    pub fn settings(&self) -> &GraylogSettings {
        &self.settings
    }

    pub fn client(&self) -> &Arc<dyn HttpClient> {
        &self.client
    }

    /// Fetch, parse and flatten the metrics of `server` and emit one record per metric.
    ///
    /// Nothing is emitted unless the whole response was received and parsed.
    #[instrument(level = "debug", skip(self, acc, server), fields(url = %server.url))]
    pub async fn gather_server(&self, acc: &dyn Accumulator, server: &ServerSpec) -> Result<(), GatherError> {
        let request_url = Url::parse(&server.url).map_err(|_| GatherError::InvalidServerUrl {
            url: server.url.clone(),
        })?;
        let request = self.build_request(&request_url)?;
        debug!(method = %request.method(), "graylog: sending request");

        let response = self.client.execute(request).await?;
        if response.status != StatusCode::OK {
            return Err(GatherError::UnexpectedStatus {
                url: request_url.to_string(),
                status: response.status,
            });
        }

        let data: ResponseMetrics = serde_json::from_str(&response.body)?;

        // An authority without host or port only degrades the tags.
        let (host, port) = split_host_port(&request_url).unwrap_or_default();
        let server_tag = server.alias.clone().unwrap_or(host);

        let count = data.metrics.len();
        for metric in data.metrics {
            let mut fields = Fields::new();
            flatten(&metric.fields, &mut fields, "");

            let tags = Tags::from([
                ("server".to_string(), server_tag.clone()),
                ("port".to_string(), port.clone()),
                ("name".to_string(), metric.name),
                ("type".to_string(), metric.metric_type),
            ]);
            acc.add_fields(&metric.full_name, fields, tags);
        }

        debug!(records = count, "graylog: server gathered");
        Ok(())
    }

    /// Build the authenticated JSON request for `url`.
    pub fn build_request(&self, url: &Url) -> Result<Request, GatherError> {
        let (method, body) = if url.as_str().contains(MULTIPLE_ENDPOINT_MARKER) {
            let body = serde_json::to_vec(&MetricsRequest {
                metrics: &self.settings.metrics,
            })
            .map_err(|_| GatherError::InvalidMetrics {
                metrics: self.settings.metrics.clone(),
            })?;
            (Method::POST, Some(body))
        } else {
            (Method::GET, None)
        };

        let mut request = Request::new(method, url.clone());
        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.authorization()?);

        if let Some(body) = body {
            *request.body_mut() = Some(body.into());
        }
        Ok(request)
    }

    fn authorization(&self) -> Result<HeaderValue, GatherError> {
        let credentials = BASE64_STANDARD.encode(format!("{}:{}", self.settings.username, self.settings.password));
        let mut value = HeaderValue::try_from(format!("Basic {credentials}"))
            .map_err(|err| GatherError::TransportSetup(format!("invalid authorization header: {err}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Host and port of the URL authority, falling back to the scheme's default port.
fn split_host_port(url: &Url) -> Option<(String, String)> {
    let host = url.host_str()?;
    let host = host
        .strip_prefix('[')
        .and_then(|host| host.strip_suffix(']'))
        .unwrap_or(host);
    let port = url.port_or_known_default()?;
    Some((host.to_string(), port.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        http_client::{
            fake::FakeHttpClient,
            HttpResponse,
        },
        metrics::RecordingAccumulator,
    };
    use pretty_assertions::assert_eq;

    const MULTIPLE_URL: &str = "http://graylog.local:12900/system/metrics/multiple";
    const NAMESPACE_URL: &str = "http://graylog.local:12900/system/metrics/namespace/jvm";

    const VALID_RESPONSE: &str = r#"{
        "total": 2,
        "metrics": [
            {
                "full_name": "m",
                "name": "n",
                "type": "t",
                "metric": { "x": 1, "y": { "z": 2.5 } }
            },
            {
                "full_name": "org.graylog2.buffers.input.size",
                "name": "size",
                "type": "gauge",
                "metric": { "value": 65536, "rate_unit": "events/second" }
            }
        ]
    }"#;

    fn settings(metrics: &[&str]) -> GraylogSettings {
        GraylogSettings {
            servers: vec![ServerSpec::new(MULTIPLE_URL)],
            metrics: metrics.iter().map(|m| m.to_string()).collect(),
            username: "admin".to_string(),
            password: "s3cret".to_string(),
            ..GraylogSettings::default()
        }
    }

    fn collector(settings: GraylogSettings, client: &FakeHttpClient) -> GraylogCollector {
        GraylogCollector::new(settings, Arc::new(client.clone()))
    }

    #[tokio::test]
    async fn emits_flattened_record_with_tags() {
        let client = FakeHttpClient::replying(StatusCode::OK, VALID_RESPONSE);
        let acc = RecordingAccumulator::new();

        collector(settings(&[]), &client)
            .gather_server(&acc, &ServerSpec::new(MULTIPLE_URL))
            .await
            .unwrap();

        let records = acc.records();
        assert_eq!(records.len(), 2);

        let record = &records[0];
        assert_eq!(record.measurement, "m");
        assert_eq!(
            record.fields,
            Fields::from([("x".to_string(), 1.0), ("y_z".to_string(), 2.5)])
        );
        assert_eq!(
            record.tags,
            Tags::from([
                ("name".to_string(), "n".to_string()),
                ("port".to_string(), "12900".to_string()),
                ("server".to_string(), "graylog.local".to_string()),
                ("type".to_string(), "t".to_string()),
            ])
        );

        assert_eq!(records[1].measurement, "org.graylog2.buffers.input.size");
        assert_eq!(records[1].fields, Fields::from([("value".to_string(), 65536.0)]));
    }

    #[tokio::test]
    async fn multiple_endpoint_posts_metric_names_with_basic_auth() {
        let client = FakeHttpClient::replying(StatusCode::OK, r#"{"metrics":[]}"#);
        let acc = RecordingAccumulator::new();

        collector(settings(&["a.b", "c.d"]), &client)
            .gather_server(&acc, &ServerSpec::new(MULTIPLE_URL))
            .await
            .unwrap();

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.as_str(), MULTIPLE_URL);
        assert_eq!(request.body_str(), Some(r#"{"metrics":["a.b","c.d"]}"#));
        assert_eq!(
            request.header("authorization"),
            Some(format!("Basic {}", BASE64_STANDARD.encode("admin:s3cret")).as_str())
        );
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("accept"), Some("application/json"));
        assert!(acc.is_empty());
    }

    #[tokio::test]
    async fn namespace_endpoint_uses_get_and_ignores_metric_list() {
        let client = FakeHttpClient::replying(StatusCode::OK, VALID_RESPONSE);
        let acc = RecordingAccumulator::new();

        collector(settings(&["a.b", "c.d"]), &client)
            .gather_server(&acc, &ServerSpec::new(NAMESPACE_URL))
            .await
            .unwrap();

        let requests = client.requests();
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].body, None);
        assert_eq!(requests[0].header("accept"), Some("application/json"));
        assert!(requests[0].header("authorization").is_some());
        assert_eq!(acc.len(), 2);
    }

    #[tokio::test]
    async fn non_ok_status_is_an_error_and_emits_nothing() {
        let client = FakeHttpClient::replying(StatusCode::INTERNAL_SERVER_ERROR, VALID_RESPONSE);
        let acc = RecordingAccumulator::new();

        let err = collector(settings(&[]), &client)
            .gather_server(&acc, &ServerSpec::new(MULTIPLE_URL))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GatherError::UnexpectedStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                ..
            }
        ));
        let message = err.to_string();
        assert!(message.contains(MULTIPLE_URL));
        assert!(message.contains("500"));
        assert!(message.contains("expected 200"));
        assert!(acc.is_empty());
    }

    #[tokio::test]
    async fn created_is_not_ok() {
        let client = FakeHttpClient::replying(StatusCode::CREATED, VALID_RESPONSE);
        let acc = RecordingAccumulator::new();

        let result = collector(settings(&[]), &client)
            .gather_server(&acc, &ServerSpec::new(MULTIPLE_URL))
            .await;

        assert!(result.is_err());
        assert!(acc.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let client = FakeHttpClient::replying(StatusCode::OK, r#"{"metrics": [ {"full_name": "#);
        let acc = RecordingAccumulator::new();

        let err = collector(settings(&[]), &client)
            .gather_server(&acc, &ServerSpec::new(MULTIPLE_URL))
            .await
            .unwrap_err();

        assert!(matches!(err, GatherError::Parse(_)));
        assert!(acc.is_empty());
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_any_request() {
        let client = FakeHttpClient::replying(StatusCode::OK, VALID_RESPONSE);
        let acc = RecordingAccumulator::new();

        let err = collector(settings(&[]), &client)
            .gather_server(&acc, &ServerSpec::new("not a url"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid server URL \"not a url\"");
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn transport_errors_are_passed_through() {
        let client = FakeHttpClient::new(|_| Err(GatherError::TransportSetup("connection refused".to_string())));
        let acc = RecordingAccumulator::new();

        let err = collector(settings(&[]), &client)
            .gather_server(&acc, &ServerSpec::new(MULTIPLE_URL))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn alias_replaces_server_tag() {
        let client = FakeHttpClient::new(|_| {
            Ok(HttpResponse {
                status: StatusCode::OK,
                body: VALID_RESPONSE.to_string(),
            })
        });
        let acc = RecordingAccumulator::new();

        collector(settings(&[]), &client)
            .gather_server(&acc, &ServerSpec::with_alias(MULTIPLE_URL, "primary"))
            .await
            .unwrap();

        let record = &acc.find("m")[0];
        assert_eq!(record.tags["server"], "primary");
        assert_eq!(record.tags["port"], "12900");
    }

    #[test]
    fn host_and_port_from_authority() {
        let host_port = |url: &str| split_host_port(&Url::parse(url).unwrap());

        assert_eq!(
            host_port("http://127.0.0.1:12900/system/metrics/multiple"),
            Some(("127.0.0.1".to_string(), "12900".to_string()))
        );
        assert_eq!(
            host_port("https://graylog.example.com/api/system/metrics/multiple"),
            Some(("graylog.example.com".to_string(), "443".to_string()))
        );
        assert_eq!(
            host_port("http://[::1]:9000/api"),
            Some(("::1".to_string(), "9000".to_string()))
        );
        assert_eq!(host_port("unix:/run/graylog.sock"), None);
    }
}
