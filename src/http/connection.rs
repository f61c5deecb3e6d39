use anyhow::Context;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::http::reader::MessageReader;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::MessageWriter;
use crate::proxy::ProxyContext;
use crate::proxy::origin::OriginExchange;

/// One client connection and the request/response cycles run on it.
pub struct Connection<S> {
    id: u64,
    peer: String,
    client: MessageReader<S>,
    ctx: ProxyContext,
    state: ConnectionState,
}

pub enum ConnectionState {
    AwaitingRequest,
    ResolvingCache(Request),
    Forwarding {
        request: Request,
        host: String,
    },
    /// Holds the origin socket for the length of a single miss
    AwaitingOriginResponse {
        request: Request,
        host: String,
        origin: OriginExchange,
    },
    RespondingToClient {
        request: Request,
        host: String,
        response: Response,
    },
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(id: u64, peer: impl Into<String>, stream: S, ctx: ProxyContext) -> Self {
        Self {
            id,
            peer: peer.into(),
            client: MessageReader::new(stream),
            ctx,
            state: ConnectionState::AwaitingRequest,
        }
    }

    /// Drives the connection until it closes.
    ///
    /// Every failure ends this connection only; nothing is retried and the
    /// client gets no error response, just a closed socket.
    pub async fn run(&mut self) {
        let span = info_span!("conn", id = self.id);
        self.drive().instrument(span).await
    }

    async fn drive(&mut self) {
        info!(peer = %self.peer, "Connection opened");
        self.ctx.stats.connection_opened();

        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            if let ConnectionState::Closed = state {
                break;
            }

            self.state = match self.step(state).await {
                Ok(next) => next,
                Err(e) => {
                    let reason = format!("{:#}", e);
                    warn!(peer = %self.peer, error = %reason, "Closing connection");
                    ConnectionState::Closed
                }
            };
        }

        info!(peer = %self.peer, "Connection closed");
        self.ctx.stats.connection_closed();
    }

    async fn step(&mut self, state: ConnectionState) -> anyhow::Result<ConnectionState> {
        let next = match state {
            ConnectionState::AwaitingRequest => match self.client.read_request().await? {
                Some(request) => {
                    debug!(method = %request.method, uri = %request.uri, "Request received");
                    ConnectionState::ResolvingCache(request)
                }
                None => ConnectionState::Closed,
            },

            ConnectionState::ResolvingCache(request) => {
                // Without a Host there is nowhere to forward and nothing to report
                let Some(host) = request.host().map(str::to_string) else {
                    anyhow::bail!("request for {} has no Host header", request.uri);
                };

                let cached = self
                    .ctx
                    .cache
                    .get(request.method.as_str(), &request.uri)
                    .await;

                match cached {
                    Some(response) => {
                        debug!(host = %host, uri = %request.uri, "Cache hit");
                        ConnectionState::RespondingToClient {
                            request,
                            host,
                            response,
                        }
                    }
                    None => ConnectionState::Forwarding { request, host },
                }
            }

            ConnectionState::Forwarding { request, host } => {
                info!(host = %host, uri = %request.uri, "Requesting resource from origin");

                let origin = OriginExchange::send(&host, &request, &self.ctx.origin).await?;

                ConnectionState::AwaitingOriginResponse {
                    request,
                    host,
                    origin,
                }
            }

            ConnectionState::AwaitingOriginResponse {
                request,
                host,
                origin,
            } => {
                debug!(origin = %origin.addr(), "Awaiting origin response");
                let response = origin.receive().await?;

                self.ctx
                    .cache
                    .set(request.method.as_str(), &request.uri, response.clone())
                    .await;

                ConnectionState::RespondingToClient {
                    request,
                    host,
                    response,
                }
            }

            ConnectionState::RespondingToClient {
                request,
                host,
                response,
            } => {
                MessageWriter::response(&response)
                    .write_to_stream(self.client.get_mut())
                    .await
                    .context("failed to write response to client")?;

                let content_length = response.declared_length().unwrap_or_else(|value| {
                    warn!(value, "Content-Length is not numeric");
                    0
                });
                self.ctx
                    .stats
                    .resource_visited(&host, &request.uri, content_length);

                if response.closes_connection() {
                    ConnectionState::Closed
                } else {
                    debug!(peer = %self.peer, "Keeping connection alive");
                    ConnectionState::AwaitingRequest
                }
            }

            ConnectionState::Closed => ConnectionState::Closed,
        };

        Ok(next)
    }
}

