//! API client.
//!
//! One signed HTTP GET per call: the caller's arguments are merged over the
//! identity/action base set, signed, serialized into the query string and
//! sent to the configured base URL. The decoded JSON body comes back as-is;
//! response shapes are the provider's business.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde_json::Value;

use crate::config::Credentials;
use crate::error::CliError;
use crate::signer::{self, SignatureMethod};

pub struct ApiClient {
    http: Client,
    credentials: Credentials,
    method: SignatureMethod,
}

impl ApiClient {
    pub fn new(
        credentials: Credentials,
        method: SignatureMethod,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(ApiClient {
            http,
            credentials,
            method,
        })
    }

    /// Invoke `action` with the given arguments. Exactly one outbound
    /// request; no retry, no caching.
    pub async fn call(
        &self,
        action: &str,
        args: BTreeMap<String, String>,
    ) -> Result<Value, CliError> {
        let mut params = BTreeMap::new();
        params.insert("PublicKey".to_string(), self.credentials.public_key.clone());
        params.insert("Action".to_string(), action.to_string());
        params.extend(args);
        signer::sign(&mut params, &self.credentials.private_key, self.method);

        let resp = self
            .http
            .get(&self.credentials.base_url)
            .query(&params)
            .send()
            .await
            .map_err(CliError::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(CliError::Transport)?;

        if !status.is_success() {
            return Err(CliError::Api { status, body });
        }
        serde_json::from_str(&body).map_err(CliError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(base_url: String) -> ApiClient {
        ApiClient::new(
            Credentials {
                public_key: "pub-key".to_string(),
                private_key: "priv-key".to_string(),
                base_url,
            },
            SignatureMethod::Sha1,
            None,
        )
        .unwrap()
    }

    fn args(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn call_sends_signed_get_and_decodes_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("Action".into(), "DescribeFoo".into()),
                Matcher::UrlEncoded("Id".into(), "42".into()),
                Matcher::UrlEncoded("PublicKey".into(), "pub-key".into()),
                // sha1("ActionDescribeFooId42PublicKeypub-keypriv-key")
                Matcher::UrlEncoded(
                    "Signature".into(),
                    "bf361cc90f57d15012e7696fe79d1deff30d8a0a".into(),
                ),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"RetCode": 0, "Action": "DescribeFooResponse"}"#)
            .create_async()
            .await;

        let value = client(server.url())
            .call("DescribeFoo", args(&[("Id", "42")]))
            .await
            .unwrap();
        assert_eq!(value["RetCode"], 0);
        assert_eq!(value["Action"], "DescribeFooResponse");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"RetCode": 230, "Message": "missing signature"}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .call("DescribeFoo", BTreeMap::new())
            .await
            .unwrap_err();
        match err {
            CliError::Api { status, body } => {
                assert_eq!(status.as_u16(), 400);
                assert!(body.contains("missing signature"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = client(server.url())
            .call("DescribeFoo", BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Decode(_)));
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        // Discard port; nothing listens there.
        let err = client("http://127.0.0.1:9".to_string())
            .call("DescribeFoo", BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Transport(_)));
    }
}
