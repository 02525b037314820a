/// Test helpers: a routed stub transport and resolver builders
use async_trait::async_trait;
use source_resolver_lib::modules::provider::domain::ProviderDescriptor;
use source_resolver_lib::modules::provider::infrastructure::http_client::{
    HttpTransport, TransportError, TransportResponse,
};
use source_resolver_lib::{ResolverConfig, SourceResolver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "http://stub.test";

enum Matcher {
    Exact(String),
    Contains(String),
}

struct Route {
    matcher: Matcher,
    response: Result<TransportResponse, TransportError>,
}

/// Answers by URL and records every request.
///
/// Exact routes are checked before substring routes; anything unrouted gets
/// a 404 with an empty body.
#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route_exact(&self, url: &str, response: Result<TransportResponse, TransportError>) {
        self.routes.lock().unwrap().push(Route {
            matcher: Matcher::Exact(url.to_string()),
            response,
        });
    }

    pub fn route(&self, fragment: &str, body: &str) {
        self.routes.lock().unwrap().push(Route {
            matcher: Matcher::Contains(fragment.to_string()),
            response: Ok(TransportResponse::ok_json(body)),
        });
    }

    /// Health probe answer for `key`
    pub fn health(&self, key: &str, status: u16) {
        self.route_exact(
            &format!("{}/anime/{}", BASE_URL, key),
            Ok(TransportResponse::new(status, "")),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_containing(&self, fragment: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|url| url.contains(fragment))
            .collect()
    }

    /// Search requests, in the order they were made
    pub fn search_calls(&self) -> Vec<String> {
        self.calls_containing("?page=1")
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());

        let routes = self.routes.lock().unwrap();
        let exact = routes
            .iter()
            .find(|r| matches!(&r.matcher, Matcher::Exact(u) if u == url));
        let contains = || {
            routes
                .iter()
                .find(|r| matches!(&r.matcher, Matcher::Contains(f) if url.contains(f.as_str())))
        };

        match exact.or_else(contains) {
            Some(route) => route.response.clone(),
            None => Ok(TransportResponse::new(404, "")),
        }
    }
}

/// Providers on the stub host with a single category and server
pub fn stub_providers(keys: &[&str]) -> Vec<ProviderDescriptor> {
    keys.iter()
        .map(|key| {
            ProviderDescriptor::new(key, BASE_URL)
                .with_servers(&["hd-1"])
                .with_categories(&["sub"])
        })
        .collect()
}

/// Config without retries so unrouted requests fail immediately
pub fn stub_config(providers: Vec<ProviderDescriptor>) -> ResolverConfig {
    ResolverConfig {
        max_retries: 0,
        providers,
        ..ResolverConfig::default()
    }
}

pub fn build_resolver(config: ResolverConfig, transport: Arc<StubTransport>) -> SourceResolver {
    SourceResolver::with_transport(config, transport).expect("valid test config")
}
