//! Header field collection.
//!
//! Lookups are case-insensitive. Entries keep insertion order, and each name is
//! written back with the casing it had when first inserted, so a response built
//! from `Content-Length` serializes as `Content-Length`.

use crate::http::error::{Error, Result};

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    /// Name as first inserted, used for serialization
    name: String,
    /// Lower-cased name, used for lookups
    key: String,
    value: String,
}

/// An insertion-ordered, case-insensitive map of header fields.
///
/// Repeated names are folded into one entry by comma concatenation
/// (see [`HeaderMap::set`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    fields: Vec<Field>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = name.to_ascii_lowercase();
        self.fields.iter().position(|f| f.key == key)
    }

    /// Retrieves a field value by name, ignoring case.
    ///
    /// # Example
    ///
    /// ```
    /// # use rawhttp::http::headers::HeaderMap;
    /// let mut headers = HeaderMap::new();
    /// headers.set("Host", "example.com");
    /// assert_eq!(headers.get("host"), Some("example.com"));
    /// assert_eq!(headers.get("Accept"), None);
    /// ```
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.fields[i].value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Adds a field, merging with an existing value as `old,new`.
    ///
    /// No deduplication happens and the entry keeps its original position.
    ///
    /// ```
    /// # use rawhttp::http::headers::HeaderMap;
    /// let mut headers = HeaderMap::new();
    /// headers.set("Accept", "text/html");
    /// headers.set("accept", "application/json");
    /// assert_eq!(headers.get("Accept"), Some("text/html,application/json"));
    /// ```
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(i) => {
                let field = &mut self.fields[i];
                field.value.push(',');
                field.value.push_str(&value);
            }
            None => self.fields.push(Field {
                key: name.to_ascii_lowercase(),
                name,
                value,
            }),
        }
    }

    /// Overwrites a field value instead of merging.
    ///
    /// Used for fields such as `Content-Length` that must never accumulate.
    pub fn replace(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(i) => self.fields[i].value = value,
            None => self.fields.push(Field {
                key: name.to_ascii_lowercase(),
                name,
                value,
            }),
        }
    }

    /// Removes a field entirely. Returns the removed value, if any.
    pub fn delete(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.fields.remove(i).value)
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
    }

    pub fn for_each(&self, mut f: impl FnMut(&str, &str)) {
        for (name, value) in self.iter() {
            f(name, value);
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parses a single field line from the front of `data`.
    ///
    /// Returns the number of bytes consumed and whether the header section is
    /// complete. Without a CRLF in `data` nothing is consumed; the caller has
    /// to supply more bytes and retry. An empty line ends the section and
    /// consumes its CRLF.
    pub fn parse_field_line(&mut self, data: &[u8]) -> Result<(usize, bool)> {
        let Some(idx) = find_crlf(data) else {
            return Ok((0, false));
        };

        if idx == 0 {
            return Ok((CRLF.len(), true));
        }

        let line = &data[..idx];
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or(Error::MalformedFieldLine)?;

        // Whitespace is not a token byte, so this also rejects `Host :`
        let name = match std::str::from_utf8(&line[..colon]) {
            Ok(name) if is_token(name) => name,
            _ => return Err(Error::MalformedFieldName),
        };

        // Values are opaque octets; bytes outside UTF-8 are kept as U+FFFD
        let value = String::from_utf8_lossy(&line[colon + 1..]);
        self.set(name, value.trim());
        Ok((idx + CRLF.len(), false))
    }

    /// Parses as many complete field lines as `data` holds.
    ///
    /// Stops after the terminating empty line or when no further CRLF is
    /// available.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool)> {
        let mut read = 0;

        loop {
            let (n, done) = self.parse_field_line(&data[read..])?;
            read += n;

            if done || n == 0 {
                return Ok((read, done));
            }
        }
    }
}

/// Checks `s` against the field-name token grammar.
///
/// Letters, digits and ``!#$%&'*+-.^_`|~`` are allowed; the empty string is not
/// a token.
pub fn is_token(s: &str) -> bool {
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

pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}
