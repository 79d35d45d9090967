use pretty_assertions::assert_eq;
use relay_rs_providers::{Adapter, AdapterCredentials};
use relay_rs_server::{ServerError, StdioServer};
use relay_rs_test_utils::StubTransport;
use relay_rs_tools::Dispatcher;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWrite, BufReader};

fn server(transport: StubTransport, max_in_flight: usize) -> StdioServer {
    let (catalog, client) = Adapter::Marketstack
        .assemble(None, &AdapterCredentials::key("ms-key"), Arc::new(transport))
        .expect("assemble");
    StdioServer::new(
        Arc::new(Dispatcher::new(Arc::new(catalog), client)),
        max_in_flight,
    )
}

/// Run the server over an in-memory input and collect responses by id.
async fn run(server: &StdioServer, input: &str) -> HashMap<String, Value> {
    let (server_out, mut client_in) = tokio::io::duplex(1 << 16);
    let reader = BufReader::new(input.as_bytes());
    let (served, output) = tokio::join!(server.serve(reader, server_out), async move {
        let mut output = String::new();
        client_in
            .read_to_string(&mut output)
            .await
            .expect("read output");
        output
    });
    served.expect("serve");
    output
        .lines()
        .map(|line| {
            let frame: Value = serde_json::from_str(line).expect("frame json");
            (frame["id"].to_string(), frame)
        })
        .collect()
}

#[tokio::test]
async fn answers_list_ping_and_calls() {
    let transport = StubTransport::with_json(200, json!({ "data": [{ "symbol": "AAPL" }] }));
    let server = server(transport.clone(), 4);
    let input = concat!(
        "{\"id\": 1, \"method\": \"tools/list\"}\n",
        "\n",
        "{\"id\": 2, \"method\": \"ping\"}\n",
        "{\"id\": 3, \"method\": \"tools/call\", \"params\": {\"name\": \"marketstack_eod\", \"arguments\": {\"symbols\": \"AAPL\"}}}\n",
        "{\"id\": 4, \"method\": \"tools/call\", \"params\": {\"name\": \"nope\"}}\n",
    );

    let responses = run(&server, input).await;
    assert_eq!(responses.len(), 4);

    let names = responses["1"]["result"]["tools"]
        .as_array()
        .expect("tools")
        .iter()
        .map(|tool| tool["name"].as_str().expect("name").to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "marketstack_eod",
            "marketstack_intraday",
            "marketstack_tickers",
            "marketstack_exchanges"
        ]
    );
    assert_eq!(responses["2"]["result"], json!({}));

    let call = &responses["3"]["result"];
    assert_eq!(call["isError"], json!(false));
    assert_eq!(
        call["content"][0]["text"],
        json!("{\n  \"data\": [\n    {\n      \"symbol\": \"AAPL\"\n    }\n  ]\n}")
    );

    let unknown = &responses["4"]["result"];
    assert_eq!(unknown["isError"], json!(true));
    assert_eq!(unknown["content"][0]["text"], json!("Unknown tool: nope"));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn malformed_frames_get_protocol_errors() {
    let server = server(StubTransport::new(), 1);
    let input = concat!(
        "not json\n",
        "{\"id\": 7, \"method\": \"resources/list\"}\n",
        "{\"id\": 8, \"method\": \"tools/call\", \"params\": 5}\n",
    );

    let responses = run(&server, input).await;
    assert_eq!(responses["null"]["error"]["code"], json!(-32700));
    assert_eq!(responses["7"]["error"]["code"], json!(-32601));
    assert_eq!(
        responses["7"]["error"]["message"],
        json!("method not found: resources/list")
    );
    assert_eq!(responses["8"]["error"]["code"], json!(-32602));
}

#[tokio::test]
async fn calls_run_concurrently_within_the_limit() {
    let transport = StubTransport::with_json(200, json!({ "data": [] }))
        .with_delay(Duration::from_millis(40));
    let server = server(transport.clone(), 2);
    let input = (1..=6)
        .map(|id| {
            format!(
                "{{\"id\": {id}, \"method\": \"tools/call\", \"params\": {{\"name\": \"marketstack_exchanges\", \"arguments\": {{}}}}}}\n"
            )
        })
        .collect::<String>();

    let responses = run(&server, &input).await;
    assert_eq!(responses.len(), 6);
    for id in 1..=6 {
        assert_eq!(responses[&id.to_string()]["result"]["isError"], json!(false));
    }
    assert_eq!(transport.call_count(), 6);
    assert!(transport.peak_in_flight() <= 2);
}

#[tokio::test]
async fn zero_capacity_is_rejected() {
    let server = server(StubTransport::new(), 0);
    let (server_out, _client_in) = tokio::io::duplex(64);
    let err = server
        .serve(BufReader::new(&b""[..]), server_out)
        .await
        .expect_err("no capacity");
    assert!(matches!(err, ServerError::NoCapacity));
}

/// Output sink whose every write fails, as when the client has gone away.
struct BrokenPipe;

impl AsyncWrite for BrokenPipe {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::from(io::ErrorKind::BrokenPipe)))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn dead_writer_stops_further_dispatch() {
    let transport = StubTransport::with_json(200, json!({ "data": [] }));
    let server = server(transport.clone(), 1);
    let input = (1..=50)
        .map(|id| {
            format!(
                "{{\"id\": {id}, \"method\": \"tools/call\", \"params\": {{\"name\": \"marketstack_exchanges\", \"arguments\": {{}}}}}}\n"
            )
        })
        .collect::<String>();

    let err = server
        .serve(BufReader::new(input.as_bytes()), BrokenPipe)
        .await
        .expect_err("writer failure");

    assert!(matches!(err, ServerError::Io(ref inner) if inner.kind() == io::ErrorKind::BrokenPipe));
    assert!(
        transport.call_count() < 50,
        "dispatched {} calls after the writer closed",
        transport.call_count()
    );
}
