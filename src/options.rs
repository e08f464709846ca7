//! Runtime configuration shared by the decoder, the handle layer and the
//! builder.

use std::{collections::HashMap, fmt, sync::Arc};

use bytes::Bytes;
use tracing::debug;

use crate::{Error, Result, SharedSlice, Slice, builder::encode_string};

/// Collaborators and switches consulted while reading or rendering values.
///
/// The default configuration has no attribute translator and no external
/// resolver: integer object keys cannot be translated and external values
/// cannot be followed.
#[derive(Clone)]
pub struct Options {
    /// Maps integer object keys to attribute names.
    pub attribute_translator: Option<Arc<AttributeTranslator>>,
    /// Resolves the ids stored in external values.
    pub external_resolver: Option<Arc<dyn ExternalResolver>>,
    /// Render JSON with indentation.
    pub pretty_print: bool,
}

impl Options {
    pub const DEFAULT: Options = Options {
        attribute_translator: None,
        external_resolver: None,
        pretty_print: false,
    };

    pub fn with_translator(mut self, translator: Arc<AttributeTranslator>) -> Self {
        self.attribute_translator = Some(translator);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ExternalResolver>) -> Self {
        self.external_resolver = Some(resolver);
        self
    }

    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }

    /// Resolves an external id through the configured resolver.
    pub fn resolve(&self, id: u64) -> Result<SharedSlice> {
        let resolved = self
            .external_resolver
            .as_deref()
            .and_then(|resolver| resolver.resolve(id));
        match resolved {
            Some(value) => {
                debug!(id, "resolved external value");
                Ok(value)
            }
            None => Err(Error::UnresolvedExternal(id)),
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::DEFAULT
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("attribute_translator", &self.attribute_translator)
            .field(
                "external_resolver",
                &self.external_resolver.as_ref().map(|_| "<resolver>"),
            )
            .field("pretty_print", &self.pretty_print)
            .finish()
    }
}

/// A fixed mapping between integer key ids and attribute names.
///
/// The names are stored encoded, back to back, in one buffer owned by the
/// translator. Translated keys are handles into that buffer and keep it
/// alive independently of the value they were read from.
///
/// # Example
///
/// ```
/// use na_vpack::AttributeTranslator;
///
/// let translator = AttributeTranslator::new([(1, "_key"), (2, "_rev")]).unwrap();
///
/// assert_eq!(translator.id_of("_rev"), Some(2));
/// let name = translator.translate(1).unwrap();
/// assert_eq!(name.string_view().unwrap(), "_key");
/// assert!(translator.translate(3).is_none());
/// ```
pub struct AttributeTranslator {
    names: SharedSlice,
    offsets: HashMap<u64, usize>,
    ids: HashMap<String, u64>,
}

impl AttributeTranslator {
    /// Builds a translator from `(id, name)` pairs.
    ///
    /// Fails with [`Error::InvalidBuilderState`] if an id or a name appears
    /// twice.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, S)>,
        S: AsRef<str>,
    {
        let mut buffer = Vec::new();
        let mut offsets = HashMap::new();
        let mut ids = HashMap::new();
        for (id, name) in entries {
            let name = name.as_ref();
            if offsets.insert(id, buffer.len()).is_some() {
                return Err(Error::InvalidBuilderState("duplicate attribute id"));
            }
            if ids.insert(name.to_owned(), id).is_some() {
                return Err(Error::InvalidBuilderState("duplicate attribute name"));
            }
            encode_string(&mut buffer, name);
        }
        debug!(attributes = ids.len(), "built attribute translator");
        Ok(AttributeTranslator {
            names: SharedSlice::new(Bytes::from(buffer)),
            offsets,
            ids,
        })
    }

    /// Number of known attributes.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The name for `id` as a handle into the translator's buffer.
    pub fn translate(&self, id: u64) -> Option<SharedSlice> {
        self.offsets
            .get(&id)
            .map(|offset| self.names.alias_at(*offset))
    }

    /// The name for `id`, borrowed from the translator.
    pub fn translate_slice(&self, id: u64) -> Option<Slice<'_>> {
        let offset = *self.offsets.get(&id)?;
        self.names.slice().as_bytes().get(offset..).map(Slice::new)
    }

    /// The id registered for `name`.
    pub fn id_of(&self, name: &str) -> Option<u64> {
        self.ids.get(name).copied()
    }
}

impl fmt::Debug for AttributeTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.ids.iter()).finish()
    }
}

/// Looks up the value an external id refers to.
///
/// External values carry an opaque 8-byte id. The resolved value is a handle
/// with its own anchor; it does not borrow from the value that referenced it.
pub trait ExternalResolver: Send + Sync {
    fn resolve(&self, id: u64) -> Option<SharedSlice>;
}

/// A resolver backed by a list of values; an id is a position in the list.
#[derive(Clone, Debug, Default)]
pub struct ExternalTable {
    values: Vec<SharedSlice>,
}

impl ExternalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` and returns the id to store in an external value.
    pub fn insert(&mut self, value: SharedSlice) -> u64 {
        self.values.push(value);
        (self.values.len() - 1) as u64
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ExternalResolver for ExternalTable {
    fn resolve(&self, id: u64) -> Option<SharedSlice> {
        let index = usize::try_from(id).ok()?;
        self.values.get(index).cloned()
    }
}
