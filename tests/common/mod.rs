#![allow(dead_code)]

use async_trait::async_trait;
use merch_hub::api::{ApiError, ApiRequest, ApiResponse, ConnectionSettings, CoveoClient, Transport};
use reqwest::Method;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const PLATFORM: &str = "https://platform.test";
pub const LISTINGS: &str = "/listings/pages";

struct Route {
    method: Method,
    url_contains: String,
    responses: VecDeque<ApiResponse>,
}

/// In-memory transport: records every request and answers from canned routes
///
/// The most specific route (longest matching URL fragment) wins. A route
/// replays its responses in order and keeps repeating the last one.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, method: Method, url_contains: &str, status: u16, body: Value) {
        let body = if body.is_null() {
            String::new()
        } else {
            body.to_string()
        };
        self.on_raw(method, url_contains, status, &body);
    }

    pub fn on_raw(&self, method: Method, url_contains: &str, status: u16, body: &str) {
        let response = ApiResponse {
            status,
            body: body.to_string(),
        };
        let mut routes = self.routes.lock().unwrap();
        if let Some(route) = routes
            .iter_mut()
            .find(|r| r.method == method && r.url_contains == url_contains)
        {
            route.responses.push_back(response);
        } else {
            routes.push(Route {
                method,
                url_contains: url_contains.to_string(),
                responses: VecDeque::from([response]),
            });
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: Method, url_suffix: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.url.ends_with(url_suffix))
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());

        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .filter(|r| r.method == request.method && request.url.contains(&r.url_contains))
            .max_by_key(|r| r.url_contains.len());

        let Some(route) = route else {
            return Ok(ApiResponse {
                status: 404,
                body: r#"{"message":"no fake route"}"#.to_string(),
            });
        };

        let response = if route.responses.len() > 1 {
            route.responses.pop_front()
        } else {
            route.responses.front().cloned()
        };
        response.ok_or_else(|| ApiError::Transport("empty fake route".to_string()))
    }
}

pub fn settings() -> ConnectionSettings {
    ConnectionSettings {
        organization_id: "acme".to_string(),
        tracking_id: "store".to_string(),
        access_token: "xx-token".to_string(),
        platform_url: PLATFORM.to_string(),
    }
}

pub fn client(transport: &Arc<FakeTransport>) -> CoveoClient {
    CoveoClient::with_transport(settings(), transport.clone())
}
