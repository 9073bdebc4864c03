use thiserror::Error;

const CRLF: &[u8] = b"\r\n";

/// Errors produced while parsing a single header line.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    /// The line is not of the form `name: value`.
    #[error("malformed header line")]
    MalformedHeaderLine,
    /// The header name is empty or contains non-token characters.
    #[error("invalid header name")]
    InvalidHeaderName,
}

/// Case-insensitive header collection.
///
/// Lookups go through the lowercased name. Each entry also keeps the name as
/// first spelled, which is what the response writer puts on the wire. Entries
/// keep their insertion order, which is the order they are serialized in.
/// Repeated names received from the wire are folded into one comma-separated
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    key: String,
    name: String,
    value: String,
}

impl Field {
    fn new(name: &str, value: String) -> Self {
        Self {
            key: name.to_ascii_lowercase(),
            name: name.to_string(),
            value,
        }
    }
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses at most one header line from the front of `data`.
    ///
    /// Returns the number of bytes consumed and whether the blank line that
    /// ends the header section was reached. `(0, false)` means no complete
    /// line is available yet.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpwire::http::headers::HeaderMap;
    /// let mut headers = HeaderMap::new();
    /// let (n, done) = headers.parse(b"Host: localhost:42069\r\n\r\n").unwrap();
    /// assert_eq!(n, 23);
    /// assert!(!done);
    /// assert_eq!(headers.get("HOST"), Some("localhost:42069"));
    /// ```
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), HeaderError> {
        let Some(line_end) = find_crlf(data) else {
            return Ok((0, false));
        };

        if line_end == 0 {
            return Ok((CRLF.len(), true));
        }

        let line = std::str::from_utf8(&data[..line_end])
            .map_err(|_| HeaderError::MalformedHeaderLine)?;

        let (key, value) = line
            .trim()
            .split_once(':')
            .ok_or(HeaderError::MalformedHeaderLine)?;

        // No whitespace allowed between the field name and the colon.
        if key.ends_with(|c: char| c.is_ascii_whitespace()) {
            return Err(HeaderError::MalformedHeaderLine);
        }

        if !is_token(key) {
            return Err(HeaderError::InvalidHeaderName);
        }

        self.append(key, value.trim());

        Ok((line_end + CRLF.len(), false))
    }

    /// Looks up a header value, ignoring the case of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].value.as_str())
    }

    /// Stores `value` under `name`, replacing any existing value in place.
    ///
    /// The value is kept verbatim. Replacing keeps the name as first spelled.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.position(name) {
            Some(i) => self.entries[i].value = value,
            None => self.entries.push(Field::new(name, value)),
        }
    }

    /// Adds `value` to `name`, folding it into an existing entry as
    /// `"old, new"`.
    pub fn append(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(i) => {
                let existing = &mut self.entries[i].value;
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => self.entries.push(Field::new(name, value.to_string())),
        }
    }

    /// Removes a header and returns its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.entries.remove(i).value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order, with names as
    /// first spelled.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|f| f.key.eq_ignore_ascii_case(name))
    }
}

pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}

/// RFC 9110 `token`: one or more tchar.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#'
                        | b'$'
                        | b'%'
                        | b'&'
                        | b'\''
                        | b'*'
                        | b'+'
                        | b'-'
                        | b'.'
                        | b'^'
                        | b'_'
                        | b'`'
                        | b'|'
                        | b'~'
                )
        })
}
