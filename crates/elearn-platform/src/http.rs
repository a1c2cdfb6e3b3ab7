//! `HttpPort` over the browser `fetch()` API.
//! Uses gloo-net for WASM compatibility.

use async_trait::async_trait;
use gloo_net::http::Request;
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, FormData};

use elearn_core::ports::{FormPart, HttpPort, HttpRequest, HttpResponse, Method, RequestBody};
use elearn_types::{ClientError, Result};

/// Sends requests with `fetch`. Every HTTP status comes back as `Ok`; the
/// session layer decides what a 401 means.
#[derive(Default)]
pub struct FetchHttp;

impl FetchHttp {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl HttpPort for FetchHttp {
    async fn send(&self, req: &HttpRequest) -> Result<HttpResponse> {
        let url = req.full_url();
        let mut builder = match req.method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
            Method::Put => Request::put(&url),
            Method::Delete => Request::delete(&url),
        };
        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }

        // Multipart bodies leave Content-Type to the browser so the boundary is set.
        let request = match &req.body {
            RequestBody::Empty => builder.build(),
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.body(form_data(parts)?),
        }
        .map_err(|e| ClientError::Network(e.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .binary()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        log::debug!("{:?} {} -> {}", req.method, req.url, status);
        Ok(HttpResponse::new(status, body))
    }
}

fn form_data(parts: &[FormPart]) -> Result<FormData> {
    let form = FormData::new().map_err(js_err)?;
    for part in parts {
        match part {
            FormPart::Text { name, value } => {
                form.append_with_str(name, value).map_err(js_err)?;
            }
            FormPart::File { name, file } => {
                let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
                let chunks = js_sys::Array::of1(&bytes);
                let options = BlobPropertyBag::new();
                options.set_type(&file.mime_type);
                let blob = Blob::new_with_u8_array_sequence_and_options(&chunks, &options)
                    .map_err(js_err)?;
                form.append_with_blob_and_filename(name, &blob, &file.file_name)
                    .map_err(js_err)?;
            }
        }
    }
    Ok(form)
}

fn js_err(e: JsValue) -> ClientError {
    ClientError::JsInterop(format!("{:?}", e))
}
