//! A shared counter served by two workers.
//!
//! ```text
//! cargo run --example counter_server -- 8080
//! curl -X POST localhost:8080/increment
//! curl localhost:8080/counter
//! ```

use microserve::{HttpResponse, HttpServer, Method, ServerConfig, StatusCode};
use log::info;
use serde::Serialize;

#[derive(Serialize)]
struct Counter {
    counter: i64,
}

fn counter_response(counter: i64) -> Result<HttpResponse, microserve::ServerError> {
    HttpResponse::json(StatusCode::Ok, &Counter { counter })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 8080,
    };

    let config = ServerConfig {
        workers: 2,
        ..ServerConfig::with_port(port)
    };

    let mut server = HttpServer::new(config, 0i64);
    server
        .add_route(Method::GET, "/counter", |_req, counter: &mut i64| counter_response(*counter))
        .add_route(Method::POST, "/increment", |_req, counter: &mut i64| {
            *counter += 1;
            counter_response(*counter)
        })
        .add_route(Method::POST, "/decrement", |_req, counter: &mut i64| {
            *counter -= 1;
            counter_response(*counter)
        });

    let server = server.build().await?;
    info!("Press Ctrl+C to stop");
    server.run().await?;

    Ok(())
}
