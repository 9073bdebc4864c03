use sha2::{Digest, Sha256};
use tokio::io::AsyncWrite;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use httpwire::config::Config;
use httpwire::http::headers::HeaderMap;
use httpwire::http::request::Request;
use httpwire::http::response::{StatusCode, default_headers};
use httpwire::http::writer::{ResponseWriter, WriteError};
use httpwire::server::{self, Handler};

const BAD_REQUEST_HTML: &str = "<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>
";

const INTERNAL_ERROR_HTML: &str = "<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Okay, you know what? This one is on me.</p>
  </body>
</html>
";

const OK_HTML: &str = "<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was an absolute banger.</p>
  </body>
</html>
";

const MAX_DEMO_CHUNKS: usize = 100;

struct DemoHandler;

impl Handler for DemoHandler {
    async fn handle<W>(&self, request: &Request, writer: &mut ResponseWriter<W>)
    where
        W: AsyncWrite + Unpin + Send,
    {
        let result = match request.target.as_str() {
            "/yourproblem" => write_html(writer, StatusCode::BadRequest, BAD_REQUEST_HTML).await,
            "/myproblem" => {
                write_html(writer, StatusCode::InternalServerError, INTERNAL_ERROR_HTML).await
            }
            target => match target.strip_prefix("/chunked/") {
                Some(count) => write_chunked(writer, count).await,
                None => write_html(writer, StatusCode::Ok, OK_HTML).await,
            },
        };

        if let Err(e) = result {
            error!(path = %request.target, "Failed to write response: {}", e);
        }
    }
}

async fn write_html<W>(
    writer: &mut ResponseWriter<W>,
    status: StatusCode,
    html: &str,
) -> Result<(), WriteError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut headers = default_headers(html.len());
    headers.set("Content-Type", "text/html");

    writer.write_status_line(status.as_u16()).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(html.as_bytes()).await?;
    Ok(())
}

/// Streams `count` numbered lines as separate chunks, then reports the total
/// size and the SHA-256 of the streamed body in trailers.
async fn write_chunked<W>(writer: &mut ResponseWriter<W>, count: &str) -> Result<(), WriteError>
where
    W: AsyncWrite + Unpin + Send,
{
    let Some(count) = count.parse::<usize>().ok().filter(|n| *n <= MAX_DEMO_CHUNKS) else {
        return write_html(writer, StatusCode::BadRequest, BAD_REQUEST_HTML).await;
    };

    let mut headers = default_headers(0);
    headers.remove("Content-Length");
    headers.set("Transfer-Encoding", "chunked");
    headers.set("Trailer", "X-Content-SHA256, X-Content-Length, X-Chunk-Count");

    writer.write_status_line(StatusCode::Ok.as_u16()).await?;
    writer.write_headers(&headers).await?;

    let mut hasher = Sha256::new();
    let mut total = 0;
    for i in 0..count {
        let line = format!("chunk {}\n", i);
        hasher.update(line.as_bytes());
        total += line.len();
        writer.write_chunked_body(line.as_bytes()).await?;
    }
    writer.write_chunked_body_done().await?;

    let mut trailers = HeaderMap::new();
    trailers.set("X-Content-SHA256", format!("{:x}", hasher.finalize()));
    trailers.set("X-Content-Length", total.to_string());
    trailers.set("X-Chunk-Count", count.to_string());
    writer.write_trailers(&trailers).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let server = server::serve_config(&cfg.server, DemoHandler).await?;
    info!("Server started on port {}", server.local_addr().port());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    server.close().await?;
    info!("Server gracefully stopped");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chunked_route_trailers_describe_the_body() {
        let mut writer = ResponseWriter::new(Vec::<u8>::new());
        write_chunked(&mut writer, "2").await.unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert!(out.contains("Trailer: X-Content-SHA256, X-Content-Length, X-Chunk-Count\r\n"));
        assert!(out.ends_with(
            "8\r\nchunk 0\n\r\n\
8\r\nchunk 1\n\r\n\
0\r\n\
X-Content-SHA256: 44d3dfa5ffdfb237e4aa373777433d2f68f97b2bc1a0768ea9cc957eeb3a41e0\r\n\
X-Content-Length: 16\r\n\
X-Chunk-Count: 2\r\n\
\r\n"
        ));
    }

    #[tokio::test]
    async fn chunked_route_rejects_large_counts() {
        let mut writer = ResponseWriter::new(Vec::<u8>::new());
        write_chunked(&mut writer, "101").await.unwrap();

        let out = writer.into_inner();
        assert!(out.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
    }
}
