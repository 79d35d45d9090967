//! Concurrent line-protocol server over any async reader/writer pair.

use crate::ServerError;
use crate::frame::{Action, classify_line};
use log::{debug, info, warn};
use relay_rs_protocol::{ProtocolError, ResponseFrame};
use relay_rs_tools::{Dispatcher, InvocationRequest};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;

/// Serves tool listing and tool calls, one JSON frame per line.
#[derive(Debug, Clone)]
pub struct StdioServer {
    dispatcher: Arc<Dispatcher>,
    max_in_flight: usize,
}

impl StdioServer {
    /// Create a server that runs at most `max_in_flight` tool calls at once.
    pub fn new(dispatcher: Arc<Dispatcher>, max_in_flight: usize) -> Self {
        Self {
            dispatcher,
            max_in_flight,
        }
    }

    /// Serve the process stdin/stdout until stdin closes.
    pub async fn run_stdio(&self) -> Result<(), ServerError> {
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await
    }

    /// Serve frames from `reader` until EOF, writing responses to `writer`.
    ///
    /// In-flight calls are drained before returning. Responses carry the
    /// request id and may be written out of request order.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        if self.max_in_flight == 0 {
            return Err(ServerError::NoCapacity);
        }
        info!(
            "relay server started (tools={}, max_in_flight={})",
            self.dispatcher.catalog().len(),
            self.max_in_flight
        );

        let (tx, rx) = mpsc::channel::<ResponseFrame>(self.max_in_flight.saturating_mul(2));
        let writer_task = tokio::spawn(write_responses(writer, rx));
        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();
        let mut lines = reader.lines();
        let mut received = 0usize;

        let read_result = loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break Ok(()),
                Err(err) => break Err(ServerError::Io(err)),
            };
            while let Some(joined) = tasks.try_join_next() {
                log_join(joined);
            }
            if tx.is_closed() {
                warn!("response writer closed; stopping input");
                break Ok(());
            }

            match classify_line(&line) {
                Action::Skip => continue,
                Action::Respond(frame) => {
                    received += 1;
                    send(&tx, frame).await;
                }
                Action::ListTools { id } => {
                    received += 1;
                    debug!("listing tools (id={})", id);
                    send(&tx, encode(id, &self.dispatcher.list_tools())).await;
                }
                Action::Call { id, request } => {
                    received += 1;
                    let permit = match permits.clone().acquire_owned().await {
                        Ok(permit) => permit,
                        Err(err) => break Err(err.into()),
                    };
                    let dispatcher = self.dispatcher.clone();
                    let tx = tx.clone();
                    tasks.spawn(async move {
                        let frame = call(&dispatcher, id, request).await;
                        drop(permit);
                        send(&tx, frame).await;
                    });
                }
            }
        };

        debug!(
            "input closed; draining calls (received={}, in_flight={})",
            received,
            tasks.len()
        );
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }
        drop(tx);

        let written = writer_task
            .await
            .map_err(|err| ServerError::Writer(err.to_string()))?;
        written?;
        read_result?;
        info!("relay server stopped (requests={})", received);
        Ok(())
    }
}

async fn call(dispatcher: &Dispatcher, id: Value, request: InvocationRequest) -> ResponseFrame {
    debug!("tool call received (id={}, tool_name={})", id, request.tool_name);
    let envelope = dispatcher.dispatch(request).await;
    encode(id, &envelope)
}

fn encode<T: serde::Serialize>(id: Value, payload: &T) -> ResponseFrame {
    match serde_json::to_value(payload) {
        Ok(result) => ResponseFrame::result(id, result),
        Err(err) => ResponseFrame::error(id, ProtocolError::internal(err.to_string())),
    }
}

async fn send(tx: &mpsc::Sender<ResponseFrame>, frame: ResponseFrame) {
    if tx.send(frame).await.is_err() {
        warn!("response dropped: writer is closed");
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(err) = joined {
        warn!("tool call task failed: {}", err);
    }
}

/// Write frames as they arrive, one line each, flushing after every frame.
async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::Receiver<ResponseFrame>,
) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = rx.recv().await {
        let mut line = serde_json::to_string(&frame)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    writer.shutdown().await?;
    Ok(())
}
