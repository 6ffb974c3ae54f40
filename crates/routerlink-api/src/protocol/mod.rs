// RouterOS API sentences, commands, and replies
//
// Commands go out as `/path/verb` followed by attribute (`=key=value`) and
// query (`?key=value`) words. Replies come back as `!re` records terminated
// by `!done`, with `!trap` and `!fatal` signalling failure.

pub mod codec;

use indexmap::IndexMap;

use crate::error::Error;

pub use codec::ApiCodec;

/// One flat field-map from a `!re` or `!done` reply. Values are always
/// strings on the wire.
pub type Record = IndexMap<String, String>;

// ── Sentence ─────────────────────────────────────────────────────────

/// A raw sentence: the words between two zero-length terminators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    words: Vec<String>,
}

impl Sentence {
    pub fn from_words(words: Vec<String>) -> Self {
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn into_words(self) -> Vec<String> {
        self.words
    }
}

// ── Command ──────────────────────────────────────────────────────────

/// Builder for an outgoing command sentence.
///
/// ```rust,ignore
/// let cmd = Command::new("/ppp/secret/print")
///     .proplist(&[".id", "name", "disabled"])
///     .query("name", "u1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    path: String,
    words: Vec<String>,
}

impl Command {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            words: Vec::new(),
        }
    }

    /// Append an attribute word: `=key=value`.
    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.words.push(format!("={key}={value}"));
        self
    }

    /// Append a query word: `?key=value`.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.words.push(format!("?{key}={value}"));
        self
    }

    /// Restrict the fields returned by a `print`.
    pub fn proplist(self, fields: &[&str]) -> Self {
        let joined = fields.join(",");
        self.attr(".proplist", &joined)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn into_sentence(self) -> Sentence {
        let mut words = Vec::with_capacity(self.words.len() + 1);
        words.push(self.path);
        words.extend(self.words);
        Sentence::from_words(words)
    }
}

// ── Reply ────────────────────────────────────────────────────────────

/// A parsed reply sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `!re`: one data record.
    Re(Record),
    /// `!done`: end of the reply, sometimes carrying attributes (`=ret=`).
    Done(Record),
    /// `!trap`: the command failed.
    Trap {
        message: String,
        category: Option<u32>,
    },
    /// `!fatal`: the router is closing the connection.
    Fatal(String),
    /// `!empty`: the command produced no records (RouterOS 7.18+).
    Empty,
}

impl TryFrom<Sentence> for Reply {
    type Error = Error;

    fn try_from(sentence: Sentence) -> Result<Self, Error> {
        let mut words = sentence.into_words().into_iter();
        let Some(kind) = words.next() else {
            return Err(Error::Protocol("empty reply sentence".into()));
        };

        if kind == "!fatal" {
            // `!fatal` carries a bare reason word, not an attribute.
            let reason = words.collect::<Vec<_>>().join(" ");
            return Ok(Self::Fatal(reason));
        }

        let attrs = parse_attributes(words);

        match kind.as_str() {
            "!re" => Ok(Self::Re(attrs)),
            "!done" => Ok(Self::Done(attrs)),
            "!empty" => Ok(Self::Empty),
            "!trap" => Ok(Self::Trap {
                message: attrs
                    .get("message")
                    .cloned()
                    .unwrap_or_else(|| "unknown error".into()),
                category: attrs.get("category").and_then(|c| c.parse().ok()),
            }),
            other => Err(Error::Protocol(format!("unexpected reply word '{other}'"))),
        }
    }
}

/// Collect `=key=value` words into a record. API tags (`.tag=`) and
/// anything that is not an attribute word are skipped.
fn parse_attributes(words: impl Iterator<Item = String>) -> Record {
    words
        .filter_map(|word| {
            let rest = word.strip_prefix('=')?;
            let (key, value) = rest.split_once('=').unwrap_or((rest, ""));
            Some((key.to_owned(), value.to_owned()))
        })
        .collect()
}
