#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{ImageFormat, Rgba, RgbaImage};

use xenia_artwork_scraper::error::ArtworkError;
use xenia_artwork_scraper::http::{HttpClient, HttpResponse, RequestProfile};
use xenia_artwork_scraper::retry::RetryPolicy;

pub type Scripted = Result<HttpResponse, String>;

/// Replays canned responses per URL. The last response for a URL repeats.
#[derive(Default)]
pub struct ScriptedHttp {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, responses: Vec<Scripted>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), responses.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

impl HttpClient for ScriptedHttp {
    fn get(&self, url: &str, _profile: RequestProfile) -> Result<HttpResponse, ArtworkError> {
        self.calls.lock().unwrap().push(url.to_string());
        let mut routes = self.routes.lock().unwrap();
        let Some(queue) = routes.get_mut(url) else {
            return Ok(status(404));
        };
        let next = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or_else(|| Ok(status(404)))
        };
        next.map_err(ArtworkError::Http)
    }
}

pub fn status(code: u16) -> HttpResponse {
    HttpResponse {
        status: code,
        content_type: Some("text/html".to_string()),
        body: b"<html>error</html>".to_vec(),
    }
}

pub fn image_response(content_type: &str, body: Vec<u8>) -> HttpResponse {
    HttpResponse {
        status: 200,
        content_type: Some(content_type.to_string()),
        body,
    }
}

pub fn json(value: serde_json::Value) -> HttpResponse {
    HttpResponse {
        status: 200,
        content_type: Some("application/json".to_string()),
        body: serde_json::to_vec(&value).unwrap(),
    }
}

pub fn encoded(format: ImageFormat) -> Vec<u8> {
    let image = RgbaImage::from_pixel(4, 4, Rgba([10, 120, 200, 255]));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub fn png() -> Vec<u8> {
    encoded(ImageFormat::Png)
}

/// Five attempts, waits recorded instead of slept.
pub fn recording_retry() -> (RetryPolicy, Arc<Mutex<Vec<Duration>>>) {
    let waits = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&waits);
    let policy = RetryPolicy::new(5, Duration::from_secs(5))
        .with_sleeper(move |delay| sink.lock().unwrap().push(delay));
    (policy, waits)
}
