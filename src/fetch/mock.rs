//! Scripted in-memory backend for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{Error, ErrorKind};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use super::{Fetch, FetchError, Response};

#[derive(Debug, Clone)]
enum Route {
    Respond(Response),
    Fail,
}

/// Answers GETs from a route table and records every request.
///
/// A held path blocks each request until [`MockFetcher::release`] grants it.
#[derive(Debug, Default)]
pub struct MockFetcher {
    routes: Mutex<HashMap<String, Route>>,
    holds: Mutex<HashMap<String, Arc<Semaphore>>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style 200 route
    pub fn with(self, path: &str, body: &str) -> Self {
        self.respond(path, Response::ok(body));
        self
    }

    pub fn respond(&self, path: &str, response: Response) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Route::Respond(response));
    }

    /// Make requests for `path` fail at the transport level
    pub fn fail(&self, path: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Route::Fail);
    }

    pub fn hold(&self, path: &str) {
        self.holds
            .lock()
            .unwrap()
            .insert(path.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Let one pending (or future) request for `path` complete
    pub fn release(&self, path: &str) {
        if let Some(gate) = self.holds.lock().unwrap().get(path) {
            gate.add_permits(1);
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|p| *p == path)
            .count()
    }
}

#[async_trait]
impl Fetch for MockFetcher {
    async fn get(&self, path: &str) -> Result<Response, FetchError> {
        self.requests.lock().unwrap().push(path.to_string());

        let gate = self.holds.lock().unwrap().get(path).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        let route = self.routes.lock().unwrap().get(path).cloned();
        match route {
            Some(Route::Respond(response)) => Ok(response),
            Some(Route::Fail) => Err(Error::new(ErrorKind::ConnectionRefused, "unreachable").into()),
            None => Ok(Response::not_found()),
        }
    }
}
