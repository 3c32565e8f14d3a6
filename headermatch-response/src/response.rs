use headermatch_codec::{Cookie, CookieError, parse_set_cookie};

/// The parts of an HTTP response that header expectations look at.
/// Header names are case-insensitive.
pub trait HttpResponse {
    fn status(&self) -> u16;

    /// Every value of `name`, in the order received.
    fn header(&self, name: &str) -> Vec<String>;

    fn content(&self) -> String;

    fn has_header(&self, name: &str) -> bool {
        !self.header(name).is_empty()
    }

    /// Parses every `Set-Cookie` header, failing on the first malformed one.
    fn cookies(&self) -> Result<Vec<Cookie>, CookieError> {
        self.header("set-cookie")
            .iter()
            .map(|value| parse_set_cookie(value))
            .collect()
    }
}

impl<B: AsRef<[u8]>> HttpResponse for http::Response<B> {
    fn status(&self) -> u16 {
        http::Response::status(self).as_u16()
    }

    fn header(&self, name: &str) -> Vec<String> {
        self.headers()
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect()
    }

    fn content(&self) -> String {
        String::from_utf8_lossy(self.body().as_ref()).into_owned()
    }
}
