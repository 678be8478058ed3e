//! Blocking ureq transport for the terminal host.
use std::io::ErrorKind;
use std::time::Duration;

use stats_core::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

/// Executes core requests with ureq.
///
/// A fresh agent is built per request so each call gets the request's own
/// `timeout_ms`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_millis(req.timeout_ms)))
            .build()
            .new_agent();

        let mut builder = match req.method {
            HttpMethod::Post => agent.post(&req.url),
        };
        for (key, value) in &req.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let mut response = builder
            .send(req.body.unwrap_or_default().as_bytes())
            .map_err(map_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.body_mut().read_to_string().map_err(map_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::Io(e) => match e.kind() {
            ErrorKind::TimedOut => TransportError::Timeout,
            ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset => {
                TransportError::Connect(e.to_string())
            }
            _ => TransportError::Io(e.to_string()),
        },
        other => TransportError::Connect(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_server::{MockReply, MockState};
    use stats_core::{
        fetch_submission_counts, ClientConfig, Failure, FailureKind, FetchOutcome, StatsClient,
    };

    fn start_server(state: MockState) -> String {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run_with(listener, state).await
            })
            .unwrap();
        });

        format!("http://{addr}/graphql")
    }

    fn client(url: String) -> StatsClient {
        StatsClient::new(ClientConfig::new(url, mock_server::DEFAULT_USERNAME))
    }

    #[test]
    fn non_200_status_is_returned_as_data() {
        let url = start_server(MockState::scripted(vec![MockReply::Status(404)]));
        let req = client(url).build_submission_counts().unwrap();

        let resp = UreqTransport.execute(req).unwrap();
        assert_eq!(resp.status, 404);
    }

    #[test]
    fn known_user_yields_all_buckets() {
        let url = start_server(MockState::default());

        let outcome = fetch_submission_counts(&client(url), &UreqTransport);
        match outcome {
            FetchOutcome::Success(counts) => {
                assert_eq!(counts.len(), 4);
                assert_eq!(counts[0].difficulty, "All");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn slow_reply_times_out_as_499() {
        let url = start_server(MockState::scripted(vec![MockReply::Delay(2_000)]));
        let client = StatsClient::new(
            ClientConfig::new(url, mock_server::DEFAULT_USERNAME).with_timeout_ms(300),
        );

        let err = UreqTransport
            .execute(client.build_submission_counts().unwrap())
            .unwrap_err();
        assert_eq!(err, TransportError::Timeout);

        assert_eq!(
            FetchOutcome::from_transport_error(&err),
            FetchOutcome::Failure(Failure {
                code: 499,
                kind: FailureKind::Transport
            })
        );
    }

    #[test]
    fn refused_connection_is_connect_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = client(format!("http://127.0.0.1:{port}/graphql"));

        let err = UreqTransport
            .execute(client.build_submission_counts().unwrap())
            .unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)), "got {err:?}");

        assert_eq!(
            fetch_submission_counts(&client, &UreqTransport),
            FetchOutcome::Failure(Failure {
                code: 499,
                kind: FailureKind::Transport
            })
        );
    }
}
