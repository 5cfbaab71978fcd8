use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::{json, Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app::{endpoint, App, Endpoint, Request, Response};
use crate::component::ComponentOptions;
use crate::config::{AppConfig, AppDescription, MiddlewareDescription, RouteDescription};
use crate::middleware::{AuthMiddleware, IdentityMiddleware, MetricsMiddleware, TracingMiddleware};
use crate::pipeline::{Middleware, MiddlewareChain};

/// Command-line interface for compono applications
///
/// Every command works on an application description file (YAML or JSON).
#[derive(Debug, Parser)]
#[command(name = "compono")]
#[command(about = "Inspect and exercise compono application descriptions", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the routes of an application
    Routes {
        /// Application description (YAML or JSON)
        #[arg(short, long, env = "COMPONO_APP_FILE")]
        app: PathBuf,
    },
    /// Print the resolved middleware order
    Order {
        /// Application description (YAML or JSON)
        #[arg(short, long, env = "COMPONO_APP_FILE")]
        app: PathBuf,
    },
    /// Send one request through the application and print the response
    Dispatch {
        /// Application description (YAML or JSON)
        #[arg(short, long, env = "COMPONO_APP_FILE")]
        app: PathBuf,

        /// HTTP method, e.g. GET
        method: String,

        /// Path with optional query string, e.g. /doc/42?lang=en
        target: String,

        /// Request header as `name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

/// Parse the process arguments and run the command against stdout.
pub fn run_cli(config: &AppConfig) -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    execute(&cli, config, &mut stdout.lock())
}

/// Run `cli`, writing human output to `out`.
pub fn execute(cli: &Cli, config: &AppConfig, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Commands::Routes { app } => {
            let description = load(app)?;
            let app = build_app(&description, config)?;
            for route in app.router.routes() {
                let name = route.component().name();
                writeln!(out, "{:<7} {}{}", route.method().as_str(), route.path(), label(name))?;
            }
        }
        Commands::Order { app } => {
            let description = load(app)?;
            let chain = build_chain(&description.middlewares)?;
            for (position, name) in chain.order()?.iter().enumerate() {
                writeln!(out, "{}. {name}", position + 1)?;
            }
        }
        Commands::Dispatch {
            app,
            method,
            target,
            headers,
            body,
        } => {
            let description = load(app)?;
            let app = build_app(&description, config)?;
            let request = build_request(method, target, headers, body.as_deref())?;
            let response = app.handle(request);
            let rendered = json!({
                "status": response.status,
                "headers": response
                    .headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
                    .collect::<Map<String, Value>>(),
                "body": response.body,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&rendered)?)?;
        }
    }
    Ok(())
}

fn label(name: &str) -> String {
    if name.is_empty() {
        String::new()
    } else {
        format!("  ({name})")
    }
}

fn load(path: &Path) -> Result<AppDescription> {
    AppDescription::from_yaml_file(path)
        .with_context(|| format!("Failed to load application description {}", path.display()))
}

/// Assemble an [`App`] from a description.
///
/// Routes without a canned response echo the request back.
pub fn build_app(description: &AppDescription, config: &AppConfig) -> Result<App> {
    let mut app = App::new();
    for route in &description.routes {
        let methods: Vec<String> = route.methods.iter().map(|m| m.to_ascii_uppercase()).collect();
        let methods: Vec<&str> = methods.iter().map(String::as_str).collect();
        app.router
            .register(
                &route.path,
                &methods,
                &route.name,
                route_endpoint(route),
                ComponentOptions::new(),
            )
            .with_context(|| format!("Invalid route {}", route.path))?;
    }
    let pipeline = build_chain(&description.middlewares)?
        .build(Some(description.pipeline_config(&config.pipeline)))
        .context("Failed to order middlewares")?;
    Ok(app.with_pipeline(pipeline))
}

fn route_endpoint(route: &RouteDescription) -> Endpoint {
    match &route.response {
        Some(canned) => {
            let (status, body) = (canned.status, canned.body.clone());
            endpoint(move |_| Response::json(status, body.clone()))
        }
        None => {
            let name = route.name.clone();
            endpoint(move |req| echo(&name, &req))
        }
    }
}

fn echo(route: &str, req: &Request) -> Response {
    let pairs = |items: &[(Arc<str>, String)]| {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
            .collect::<Map<String, Value>>()
    };
    Response::json(
        200,
        json!({
            "route": route,
            "method": req.method.as_str(),
            "path": req.path,
            "params": pairs(&req.params),
            "query": pairs(&req.query),
            "body": req.body,
            "user": req.context.get(crate::middleware::USER_KEY),
        }),
    )
}

/// Register the described middlewares with their ordering constraints.
pub fn build_chain(middlewares: &[MiddlewareDescription]) -> Result<MiddlewareChain<Request, Response>> {
    let mut chain = MiddlewareChain::new();
    for mw in middlewares {
        chain
            .add_shared(
                &mw.name,
                builtin(mw)?,
                mw.before.as_deref(),
                mw.after.as_deref(),
            )
            .with_context(|| format!("Cannot add middleware {}", mw.name))?;
    }
    Ok(chain)
}

fn builtin(mw: &MiddlewareDescription) -> Result<Arc<dyn Middleware<Request, Response>>> {
    let middleware: Arc<dyn Middleware<Request, Response>> = match mw.name.as_str() {
        "tracing" => Arc::new(TracingMiddleware),
        "metrics" => Arc::new(MetricsMiddleware::new()),
        "identity" => {
            let tokens = match mw.options.get("tokens") {
                None => Map::new(),
                Some(Value::Object(tokens)) => tokens.clone(),
                Some(_) => bail!("identity: `tokens` must map tokens to user names"),
            };
            let tokens = tokens
                .into_iter()
                .map(|(token, user)| match user {
                    Value::String(user) => Ok((token, user)),
                    other => Err(anyhow!("identity: user for a token must be a string, got {other}")),
                })
                .collect::<Result<Vec<_>>>()?;
            Arc::new(IdentityMiddleware::new(tokens))
        }
        "auth" => {
            let mut auth = AuthMiddleware::new();
            if let Some(Value::Array(prefixes)) = mw.options.get("allow") {
                for prefix in prefixes.iter().filter_map(Value::as_str) {
                    auth = auth.allow_prefix(prefix);
                }
            }
            Arc::new(auth)
        }
        other => bail!("unknown middleware {other:?}; expected tracing, metrics, identity or auth"),
    };
    Ok(middleware)
}

fn build_request(method: &str, target: &str, headers: &[String], body: Option<&str>) -> Result<Request> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid method {method}"))?;
    let mut request = Request::new(method, target);
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| anyhow!("Header {header:?} is not `name: value`"))?;
        request = request.with_header(name.trim(), value.trim());
    }
    if let Some(body) = body {
        let body: Value = serde_json::from_str(body).context("Request body is not valid JSON")?;
        request = request.with_body(body);
    }
    Ok(request)
}
