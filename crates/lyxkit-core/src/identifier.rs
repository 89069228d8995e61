//! Interned words for object keys.
//!
//! Every node carries a `(command, category, details)` triple. The same few
//! hundred words repeat across a document, so they are interned once and
//! compared as symbols.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by every parse.
///
/// # Thread Safety
///
/// Access goes through a `Mutex`, so documents may be parsed from several
/// threads at once.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    let lock = INTERNER.get_or_init(|| Mutex::new(DefaultStringInterner::new()));
    // A poisoned interner still holds valid symbols; keep using it.
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An interned word of an object key.
///
/// # Examples
///
/// ```
/// use lyxkit_core::identifier::Id;
///
/// let layout = Id::new("layout");
/// assert_eq!(layout, "layout");
/// assert!(Id::empty().is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `word` and returns its identifier.
    pub fn new(word: &str) -> Self {
        Self(interner().get_or_intern(word))
    }

    /// The identifier of the empty word, used by synthetic nodes.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// Returns `true` for the empty word.
    pub fn is_empty(&self) -> bool {
        *self == ""
    }

    /// Runs `f` with the interned text, without allocating.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        f(interner.resolve(self.0).unwrap_or_default())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.with_str(str::to_owned);
        f.write_str(&text)
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(word: &str) -> Self {
        Self::new(word)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "layout"`
    fn eq(&self, other: &str) -> bool {
        self.with_str(|s| s == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
