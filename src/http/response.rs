use crate::http::error::{ResponseError, Result};
use crate::http::output::{DEFAULT_PROTOCOL, HostOutput};
use crate::http::status::Status;
use crate::http::variant::Variant;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{error, trace};

/// Collects the status, headers and body of one response and flushes them
/// into a [`HostOutput`].
///
/// The status code can only ever hold a value from the known status table.
/// Setters return `&mut Self` so calls can be chained:
///
/// ```
/// use http_response::http::{RecordedOutput, Response};
///
/// let mut resp = Response::new(RecordedOutput::new());
/// resp.set_status_code(404)?
///     .set_headers([("Content-Type", "text/plain")])
///     .set_body("nothing here")
///     .send()?;
///
/// assert_eq!(resp.output().status(), Some("HTTP/1.1 404 Not Found"));
/// # Ok::<(), http_response::http::ResponseError>(())
/// ```
pub struct Response<O: HostOutput> {
    output: O,
    variant: Variant,
    status: Status,
    headers: IndexMap<String, String>,
    removed_headers: IndexSet<String>,
    body: Option<String>,
}

impl<O: HostOutput> Response<O> {
    pub fn new(output: O) -> Self {
        Self::with_variant(output, Variant::default())
    }

    pub fn with_variant(output: O, variant: Variant) -> Self {
        Response {
            output,
            variant,
            status: Status::OK,
            headers: IndexMap::new(),
            removed_headers: IndexSet::new(),
            body: variant.empty_body(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }

    /// Restores status 200 and drops the headers to set and the body.
    ///
    /// Queued header removals are kept.
    pub fn reset(&mut self) -> &mut Self {
        self.status = Status::OK;
        self.headers.clear();
        self.body = self.variant.empty_body();
        self
    }

    pub fn set_status_code(&mut self, code: u16) -> Result<&mut Self> {
        match Status::from_code(code) {
            Some(status) => {
                self.status = status;
                Ok(self)
            }
            None => Err(ResponseError::invalid_status(code)),
        }
    }

    pub fn status_code(&self) -> Status {
        self.status
    }

    pub fn set_headers<K, V>(&mut self, headers: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in headers {
            self.headers.insert(k.into(), v.into());
        }
        self
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// Queues header names to be removed from the output before any of the
    /// headers in [`headers`](Self::headers) are applied.
    pub fn remove_headers<S>(&mut self, names: impl IntoIterator<Item = S>) -> &mut Self
    where
        S: Into<String>,
    {
        self.removed_headers.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn removed_headers(&self) -> &IndexSet<String> {
        &self.removed_headers
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    /// `None` only for the legacy variant, before a body has been set.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    fn status_line(&self) -> String {
        let protocol = self
            .output
            .server_protocol()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_PROTOCOL);

        format!("{} {}", protocol, self.status).trim().to_string()
    }

    pub fn send(&mut self) -> Result<()> {
        let status_line = self.status_line();
        trace!(%status_line, headers = self.headers.len(), "sending response");

        self.output.status_line(&status_line)?;

        for name in &self.removed_headers {
            self.output.remove_header(name)?;
        }

        for (k, v) in &self.headers {
            self.output.set_header(k, v)?;
        }

        if self.variant.should_write_body(self.body.as_deref()) {
            if let Some(body) = &self.body {
                self.output.write_body(body.as_bytes())?;
            }
        }

        self.output.finish()?;

        if self.variant.resets_after_send() {
            self.reset();
        }

        Ok(())
    }

    /// Sends `payload` encoded as JSON, with the variant's JSON media type.
    pub fn send_json<T: Serialize + ?Sized>(&mut self, payload: &T) -> Result<()> {
        let body = serde_json::to_string(payload)?;

        self.set_headers([("Content-Type", self.variant.json_content_type())])
            .set_body(body)
            .send()
    }

    /// Discards everything set so far and sends a redirect to `url`.
    ///
    /// `status` must be a known code in the 3xx range.
    pub fn redirect(&mut self, url: &str, status: u16) -> Result<()> {
        let status = Status::from_code(status)
            .filter(Status::is_redirect)
            .ok_or(ResponseError::invalid_redirect(status))?;

        trace!(url, code = status.code_num, "redirecting");

        self.reset();
        self.status = status;
        self.set_headers([("Location", url)]).send()
    }

    pub fn redirect_found(&mut self, url: &str) -> Result<()> {
        self.redirect(url, Status::FOUND.code_num)
    }

    /// Sends the response and terminates the process so nothing else can
    /// be written after it.
    pub fn send_and_exit(mut self) -> ! {
        let result = self.send();
        Self::exit_with(result)
    }

    pub fn send_json_and_exit<T: Serialize + ?Sized>(mut self, payload: &T) -> ! {
        let result = self.send_json(payload);
        Self::exit_with(result)
    }

    pub fn redirect_and_exit(mut self, url: &str, status: u16) -> ! {
        let result = self.redirect(url, status);
        Self::exit_with(result)
    }

    fn exit_with(result: Result<()>) -> ! {
        match result {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                error!(error = %e, "failed to send response");
                std::process::exit(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::output::{RecordedOutput, StreamOutput};
    use serde_json::json;

    fn response() -> Response<RecordedOutput> {
        Response::new(RecordedOutput::new())
    }

    fn legacy() -> Response<RecordedOutput> {
        Response::with_variant(RecordedOutput::new(), Variant::Legacy)
    }

    #[test]
    fn defaults() {
        let resp = response();
        assert_eq!(resp.status_code(), Status::OK);
        assert!(resp.headers().is_empty());
        assert_eq!(resp.body(), Some(""));

        assert_eq!(legacy().body(), None);
    }

    #[test]
    fn every_known_code_can_be_set() {
        let mut resp = response();
        for status in Status::all() {
            resp.set_status_code(status.code_num).unwrap();
            assert_eq!(resp.status_code(), status);
        }
    }

    #[test]
    fn unknown_code_leaves_status_unchanged() {
        let mut resp = response();
        resp.set_status_code(418).unwrap();

        for code in [0, 99, 209, 399, 600, 1000] {
            let err = resp.set_status_code(code).err().unwrap();
            assert!(matches!(err, ResponseError::InvalidStatusCode { code: c, .. } if c == code));
            assert_eq!(resp.status_code().code_num, 418);
        }
    }

    #[test]
    fn status_code_is_stable() {
        let mut resp = response();
        resp.set_status_code(503).unwrap();
        assert_eq!(resp.status_code(), resp.status_code());
        assert_eq!(resp.status_code().message, "Service Unavailable");
    }

    #[test]
    fn later_headers_overwrite_earlier_ones() {
        let mut resp = response();
        resp.set_headers([("A", "1"), ("B", "2")])
            .set_headers([("A", "3")]);

        let headers: Vec<_> = resp.headers().iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(headers, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut resp = response();
        resp.set_status_code(404)
            .unwrap()
            .set_headers([("X", "y")])
            .remove_headers(["Z"])
            .set_body("body");
        resp.reset();

        assert_eq!(resp.status_code(), Status::OK);
        assert!(resp.headers().is_empty());
        assert_eq!(resp.body(), Some(""));
        assert!(resp.removed_headers().contains("Z"));

        let mut resp = legacy();
        resp.set_body("body").reset();
        assert_eq!(resp.body(), None);
    }

    #[test]
    fn removals_survive_reset() {
        let host = RecordedOutput::new().with_headers([("X-Powered-By", "host")]);
        let mut resp = Response::new(host);
        resp.remove_headers(["X-Powered-By"]).reset();
        resp.send().unwrap();

        assert_eq!(resp.output().get_header("X-Powered-By"), None);
    }

    #[test]
    fn redirect_applies_queued_removals() {
        let host = RecordedOutput::new().with_headers([("X-Powered-By", "host")]);
        let mut resp = Response::new(host);
        resp.remove_headers(["X-Powered-By"]);
        resp.redirect("/next", 303).unwrap();

        assert_eq!(
            resp.output().headers(),
            &[("Location".to_string(), "/next".to_string())]
        );
    }

    #[test]
    fn send_uses_host_protocol() {
        let mut resp = Response::new(RecordedOutput::with_protocol("HTTP/2.0"));
        resp.set_status_code(201).unwrap();
        resp.send().unwrap();
        assert_eq!(resp.output().status(), Some("HTTP/2.0 201 Created"));

        let mut resp = response();
        resp.send().unwrap();
        assert_eq!(resp.output().status(), Some("HTTP/1.1 200 OK"));
    }

    #[test]
    fn blank_host_protocol_falls_back() {
        let mut resp = Response::new(RecordedOutput::with_protocol("  "));
        resp.send().unwrap();
        assert_eq!(resp.output().status(), Some("HTTP/1.1 200 OK"));
    }

    #[test]
    fn removals_apply_before_sets() {
        let host = RecordedOutput::new().with_headers([("X-Powered-By", "host"), ("X", "old")]);
        let mut resp = Response::new(host);
        resp.remove_headers(["X-Powered-By", "X"])
            .set_headers([("X", "v")]);
        resp.send().unwrap();

        assert_eq!(resp.output().get_header("X"), Some("v"));
        assert_eq!(resp.output().get_header("X-Powered-By"), None);
        assert_eq!(resp.output().headers().len(), 1);
    }

    #[test]
    fn empty_body_is_not_written() {
        let mut resp = response();
        resp.send().unwrap();
        assert!(resp.output().body().is_empty());
        assert_eq!(resp.output().finished(), 1);
    }

    #[test]
    fn body_is_written() {
        let mut resp = response();
        resp.set_body("hello").send().unwrap();
        assert_eq!(resp.output().body_str(), Some("hello"));
    }

    #[test]
    fn current_variant_keeps_state_after_send() {
        let mut resp = response();
        resp.set_status_code(404).unwrap().set_body("gone");
        resp.send().unwrap();

        assert_eq!(resp.status_code().code_num, 404);
        assert_eq!(resp.body(), Some("gone"));
    }

    #[test]
    fn legacy_variant_resets_after_send() {
        let mut resp = legacy();
        resp.set_status_code(404)
            .unwrap()
            .set_headers([("X", "y")])
            .set_body("gone");
        resp.send().unwrap();

        assert_eq!(resp.output().body_str(), Some("gone"));
        assert_eq!(resp.status_code(), Status::OK);
        assert!(resp.headers().is_empty());
        assert_eq!(resp.body(), None);
    }

    #[test]
    fn send_json_sets_content_type_and_body() {
        let mut resp = response();
        resp.send_json(&json!({"a": 1})).unwrap();

        assert_eq!(resp.body(), Some(r#"{"a":1}"#));
        assert_eq!(resp.headers().get("Content-Type").map(String::as_str), Some("application/json"));
        assert_eq!(resp.output().get_header("content-type"), Some("application/json"));
        assert_eq!(resp.output().body_str(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn legacy_send_json_uses_vendor_type() {
        let mut resp = legacy();
        resp.send_json(&json!([1, 2])).unwrap();

        assert_eq!(
            resp.output().get_header("Content-Type"),
            Some("application/vnd.api+json")
        );
        assert_eq!(resp.output().body_str(), Some("[1,2]"));
    }

    #[test]
    fn redirect_emits_location_only() {
        let mut resp = response();
        resp.set_headers([("X", "y")]).set_body("discarded");
        resp.redirect("https://example.com/", 301).unwrap();

        let out = resp.output();
        assert_eq!(out.status(), Some("HTTP/1.1 301 Moved Permanently"));
        assert_eq!(
            out.headers(),
            &[("Location".to_string(), "https://example.com/".to_string())]
        );
        assert!(out.body().is_empty());
    }

    #[test]
    fn redirect_defaults_to_found() {
        let mut resp = response();
        resp.redirect_found("/login").unwrap();
        assert_eq!(resp.output().status(), Some("HTTP/1.1 302 Found"));
    }

    #[test]
    fn invalid_redirect_changes_nothing() {
        for code in [200, 309, 400, 299] {
            let mut resp = response();
            resp.set_status_code(201).unwrap().set_headers([("X", "y")]).set_body("b");

            let err = resp.redirect("/elsewhere", code).unwrap_err();
            assert!(matches!(err, ResponseError::InvalidStatusCode { code: c, .. } if c == code));

            assert_eq!(resp.status_code().code_num, 201);
            assert_eq!(resp.headers().len(), 1);
            assert_eq!(resp.body(), Some("b"));
            assert_eq!(resp.output().finished(), 0);
        }
    }

    #[test]
    fn sends_through_stream_output() {
        let mut resp = Response::new(StreamOutput::with_protocol(Vec::new(), "HTTP/1.0"));
        resp.set_status_code(404)
            .unwrap()
            .set_headers([("Content-Type", "text/plain")])
            .set_body("missing");
        resp.send().unwrap();

        let written = String::from_utf8(resp.into_output().into_inner()).unwrap();
        assert_eq!(
            written,
            "HTTP/1.0 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 7\r\n\r\nmissing"
        );
    }
}
