use crate::http_client::{
    HttpTimeouts,
    TlsOptions,
};
use serde::{
    Deserialize,
    Serialize,
};

/// One configured endpoint, optionally shown under an alias instead of its host.
///
/// Deserializes from a plain URL string, a `[url]` / `[url, alias]` list, or a
/// `{ url, alias }` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ServerSpecRepr")]
pub struct ServerSpec {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ServerSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alias: None,
        }
    }

    pub fn with_alias(url: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alias: Some(alias.into()),
        }
    }
}

impl From<&str> for ServerSpec {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ServerSpecRepr {
    Url(String),
    List(Vec<String>),
    Table {
        url: String,
        #[serde(default)]
        alias: Option<String>,
    },
}

impl TryFrom<ServerSpecRepr> for ServerSpec {
    type Error = String;

    fn try_from(repr: ServerSpecRepr) -> Result<Self, Self::Error> {
        match repr {
            ServerSpecRepr::Url(url) => Ok(Self::new(url)),
            ServerSpecRepr::Table { url, alias } => Ok(Self { url, alias }),
            ServerSpecRepr::List(list) => match <[String; 2]>::try_from(list) {
                Ok([url, alias]) => Ok(Self::with_alias(url, alias)),
                Err(list) => match list.as_slice() {
                    [url] => Ok(Self::new(url.clone())),
                    _ => Err(format!("expected [url] or [url, alias], got {} entries", list.len())),
                },
            },
        }
    }
}

/// Everything a gather cycle needs to know about the Graylog servers.
///
/// Shared read-only between the gather tasks of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraylogSettings {
    pub servers: Vec<ServerSpec>,
    /// Metric names requested from `multiple` endpoints.
    pub metrics: Vec<String>,
    pub username: String,
    pub password: String,
    pub tls: TlsOptions,
    pub timeouts: HttpTimeouts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn server_spec_forms() {
        let specs: Vec<ServerSpec> = serde_json::from_str(
            r#"[
                "http://graylog:12900/system/metrics/multiple",
                ["http://a:12900/system/metrics/namespace/jvm"],
                ["http://b:12900/system/metrics/multiple", "primary"],
                { "url": "http://c:12900/system/metrics/multiple", "alias": "secondary" },
                { "url": "http://d:12900/system/metrics/multiple" }
            ]"#,
        )
        .unwrap();

        assert_eq!(
            specs,
            vec![
                ServerSpec::new("http://graylog:12900/system/metrics/multiple"),
                ServerSpec::new("http://a:12900/system/metrics/namespace/jvm"),
                ServerSpec::with_alias("http://b:12900/system/metrics/multiple", "primary"),
                ServerSpec::with_alias("http://c:12900/system/metrics/multiple", "secondary"),
                ServerSpec::new("http://d:12900/system/metrics/multiple"),
            ]
        );
    }

    #[test]
    fn server_spec_rejects_long_lists() {
        let err = serde_json::from_str::<ServerSpec>(r#"["http://a", "b", "c"]"#).unwrap_err();
        assert!(err.to_string().contains("got 3 entries"));
    }
}
