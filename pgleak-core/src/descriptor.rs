//! Connection descriptor - which database to connect to and as whom
//!
//! Accepts the libpq keyword/value form (`host=db dbname=coolappdb ...`)
//! and renders back to it. Only the five keywords the demonstrator needs are
//! understood; anything else is rejected rather than silently dropped.

use std::fmt;
use std::str::FromStr;

use crate::error::DescriptorError;

/// Default PostgreSQL port
pub const DEFAULT_PORT: u16 = 5432;

/// Parameters identifying a database and the credentials to reach it.
///
/// Immutable once built. Host and database name are guaranteed non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    host: String,
    port: u16,
    database: String,
    user: String,
    password: String,
}

impl ConnectionDescriptor {
    /// Build a descriptor on the default port.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Empty`] if `host` or `database` is empty.
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, DescriptorError> {
        let host = host.into();
        let database = database.into();

        if host.trim().is_empty() {
            return Err(DescriptorError::Empty { field: "host" });
        }
        if database.trim().is_empty() {
            return Err(DescriptorError::Empty { field: "dbname" });
        }

        Ok(Self {
            host,
            port: DEFAULT_PORT,
            database,
            user: user.into(),
            password: password.into(),
        })
    }

    /// The descriptor the demo ships with: `coolappdb` on host `db`.
    pub fn sample() -> Self {
        Self {
            host: "db".to_string(),
            port: DEFAULT_PORT,
            database: "coolappdb".to_string(),
            user: "thedbuser".to_string(),
            password: "thepassword".to_string(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Render as a libpq keyword/value string.
    ///
    /// The port is omitted when it is the default, so the sample descriptor
    /// renders to exactly `host=db dbname=coolappdb user=thedbuser password=thepassword`.
    pub fn to_conninfo(&self) -> String {
        let mut parts = vec![format!("host={}", quote(&self.host))];
        if self.port != DEFAULT_PORT {
            parts.push(format!("port={}", self.port));
        }
        parts.push(format!("dbname={}", quote(&self.database)));
        parts.push(format!("user={}", quote(&self.user)));
        parts.push(format!("password={}", quote(&self.password)));
        parts.join(" ")
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `host:port/dbname`, safe for logs
impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.database)
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut host = String::new();
        let mut port = None;
        let mut database = String::new();
        let mut user = String::new();
        let mut password = String::new();

        for (key, value) in parse_pairs(s)? {
            match key.as_str() {
                "host" => host = value,
                "dbname" => database = value,
                "user" => user = value,
                "password" => password = value,
                "port" => {
                    let parsed = value
                        .parse::<u16>()
                        .map_err(|_| DescriptorError::InvalidPort { value })?;
                    port = Some(parsed);
                }
                _ => return Err(DescriptorError::UnknownKey { key }),
            }
        }

        let descriptor = Self::new(host, database, user, password)?;
        Ok(descriptor.with_port(port.unwrap_or(DEFAULT_PORT)))
    }
}

fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if !needs_quotes {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Split a keyword/value string into pairs.
///
/// Whitespace around `=` is allowed. Values are either bare (ending at the
/// next whitespace) or single-quoted; backslash escapes the next character in
/// both forms.
fn parse_pairs(input: &str) -> Result<Vec<(String, String)>, DescriptorError> {
    let mut pairs = Vec::new();
    let mut chars = input.char_indices().peekable();

    loop {
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        let Some(&(start, _)) = chars.peek() else {
            break;
        };

        let mut key = String::new();
        while let Some((_, c)) = chars.next_if(|(_, c)| *c != '=' && !c.is_whitespace()) {
            key.push(c);
        }
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        if chars.next_if(|(_, c)| *c == '=').is_none() {
            return Err(DescriptorError::malformed(&input[start..], "expected '=' after keyword"));
        }
        if key.is_empty() {
            return Err(DescriptorError::malformed(&input[start..], "missing keyword"));
        }
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let mut value = String::new();
        if chars.next_if(|(_, c)| *c == '\'').is_some() {
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some((_, escaped)) => value.push(escaped),
                        None => break,
                    },
                    '\'' => {
                        closed = true;
                        break;
                    }
                    _ => value.push(c),
                }
            }
            if !closed {
                return Err(DescriptorError::malformed(&input[start..], "unterminated quoted value"));
            }
        } else {
            while let Some((_, c)) = chars.next_if(|(_, c)| !c.is_whitespace()) {
                if c == '\\' {
                    if let Some((_, escaped)) = chars.next() {
                        value.push(escaped);
                    }
                } else {
                    value.push(c);
                }
            }
        }

        pairs.push((key, value));
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "host=db dbname=coolappdb user=thedbuser password=thepassword";

    #[test]
    fn parses_the_sample_string() {
        let parsed: ConnectionDescriptor = SAMPLE.parse().unwrap();
        assert_eq!(parsed, ConnectionDescriptor::sample());
        assert_eq!(parsed.port(), DEFAULT_PORT);
    }

    #[test]
    fn sample_renders_to_original_string() {
        assert_eq!(ConnectionDescriptor::sample().to_conninfo(), SAMPLE);
    }

    #[test]
    fn empty_host_or_database_rejected() {
        assert_eq!(
            ConnectionDescriptor::new("", "coolappdb", "u", "p"),
            Err(DescriptorError::Empty { field: "host" })
        );
        assert_eq!(
            ConnectionDescriptor::new("db", "  ", "u", "p"),
            Err(DescriptorError::Empty { field: "dbname" })
        );
        assert_eq!(
            "user=thedbuser dbname=coolappdb".parse::<ConnectionDescriptor>(),
            Err(DescriptorError::Empty { field: "host" })
        );
    }

    #[test]
    fn empty_credentials_are_allowed() {
        let descriptor = ConnectionDescriptor::new("db", "coolappdb", "", "").unwrap();
        assert_eq!(descriptor.user(), "");
        assert_eq!(
            descriptor.to_conninfo(),
            "host=db dbname=coolappdb user='' password=''"
        );
    }

    #[test]
    fn quoted_values_and_escapes() {
        let parsed: ConnectionDescriptor =
            r"host = db dbname='cool app' user=the\ user password='it\'s \\ here'"
                .parse()
                .unwrap();
        assert_eq!(parsed.database(), "cool app");
        assert_eq!(parsed.user(), "the user");
        assert_eq!(parsed.password(), r"it's \ here");

        let reparsed: ConnectionDescriptor = parsed.to_conninfo().parse().unwrap();
        assert_eq!(reparsed, parsed);
    }

    #[test]
    fn port_parsing() {
        let parsed: ConnectionDescriptor = "host=localhost port=6543 dbname=x".parse().unwrap();
        assert_eq!(parsed.port(), 6543);
        assert_eq!(parsed.to_conninfo(), "host=localhost port=6543 dbname=x user='' password=''");

        assert_eq!(
            "host=localhost port=abc dbname=x".parse::<ConnectionDescriptor>(),
            Err(DescriptorError::InvalidPort {
                value: "abc".to_string()
            })
        );
    }

    #[test]
    fn rejects_unknown_and_malformed_input() {
        assert_eq!(
            "host=db dbname=x sslmode=require".parse::<ConnectionDescriptor>(),
            Err(DescriptorError::UnknownKey {
                key: "sslmode".to_string()
            })
        );
        assert!(matches!(
            "host db".parse::<ConnectionDescriptor>(),
            Err(DescriptorError::Malformed { .. })
        ));
        assert!(matches!(
            "=db".parse::<ConnectionDescriptor>(),
            Err(DescriptorError::Malformed { .. })
        ));
        assert!(matches!(
            "host=db dbname='open".parse::<ConnectionDescriptor>(),
            Err(DescriptorError::Malformed { .. })
        ));
    }

    #[test]
    fn debug_never_shows_password() {
        let rendered = format!("{:?}", ConnectionDescriptor::sample());
        assert!(!rendered.contains("thepassword"));
        assert!(rendered.contains("<redacted>"));
        assert_eq!(ConnectionDescriptor::sample().to_string(), "db:5432/coolappdb");
    }
}
