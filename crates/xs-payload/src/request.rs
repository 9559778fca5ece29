use xs_core::DEFAULT_APP_ID;

/// Request identity for one signing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignRequest<'a> {
    /// MD5 hex of URI + body, computed upstream.
    pub md5_hex: &'a str,
    /// The `a1` cookie value.
    pub a1: &'a str,
    pub app_id: &'a str,
    pub uri_and_body: &'a str,
}

impl<'a> SignRequest<'a> {
    pub fn new(md5_hex: &'a str, a1: &'a str) -> Self {
        Self { md5_hex, a1, app_id: DEFAULT_APP_ID, uri_and_body: "" }
    }

    pub fn app_id(mut self, app_id: &'a str) -> Self {
        self.app_id = app_id;
        self
    }

    pub fn content(mut self, uri_and_body: &'a str) -> Self {
        self.uri_and_body = uri_and_body;
        self
    }
}
