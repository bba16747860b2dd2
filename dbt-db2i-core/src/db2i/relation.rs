//! Relation identifiers and how they are rendered.

use std::fmt;

/// Prefix marking a relation that only lives as a CTE.
pub const EPHEMERAL_PREFIX: &str = "DBT_CTE__";

const QUOTE_CHARACTER: char = '"';

/// One boolean per identifier segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Policy {
    pub database: bool,
    pub schema: bool,
    pub identifier: bool,
}

impl Policy {
    pub const fn new(database: bool, schema: bool, identifier: bool) -> Self {
        Self {
            database,
            schema,
            identifier,
        }
    }

    /// Nothing is quoted by default; unquoted names fold to upper case.
    pub const fn default_quote() -> Self {
        Self::new(false, false, false)
    }

    /// The catalog is never part of a rendered name by default.
    pub const fn default_include() -> Self {
        Self::new(false, true, true)
    }

    fn get(&self, segment: Segment) -> bool {
        match segment {
            Segment::Database => self.database,
            Segment::Schema => self.schema,
            Segment::Identifier => self.identifier,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Segment {
    Database,
    Schema,
    Identifier,
}

/// A possibly-qualified relation name with its quote and include policies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Db2iRelation {
    database: Option<String>,
    schema: Option<String>,
    identifier: Option<String>,
    quote_policy: Policy,
    include_policy: Policy,
}

impl Db2iRelation {
    pub fn create(
        database: Option<&str>,
        schema: Option<&str>,
        identifier: Option<&str>,
    ) -> Self {
        Self {
            database: database.map(str::to_string),
            schema: schema.map(str::to_string),
            identifier: identifier.map(str::to_string),
            quote_policy: Policy::default_quote(),
            include_policy: Policy::default_include(),
        }
    }

    /// A relation referenced by its CTE name alone.
    pub fn ephemeral(name: &str) -> Self {
        Self::create(None, None, Some(&Self::add_ephemeral_prefix(name)))
    }

    pub fn add_ephemeral_prefix(name: &str) -> String {
        format!("{}{}", EPHEMERAL_PREFIX, name)
    }

    pub fn is_ephemeral(&self) -> bool {
        self.identifier
            .as_deref()
            .is_some_and(|identifier| identifier.starts_with(EPHEMERAL_PREFIX))
    }

    pub fn with_quote_policy(mut self, policy: Policy) -> Self {
        self.quote_policy = policy;
        self
    }

    pub fn with_include_policy(mut self, policy: Policy) -> Self {
        self.include_policy = policy;
        self
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn quote_policy(&self) -> Policy {
        self.quote_policy
    }

    pub fn include_policy(&self) -> Policy {
        self.include_policy
    }

    fn segment(&self, segment: Segment) -> Option<&str> {
        match segment {
            Segment::Database => self.database.as_deref(),
            Segment::Schema => self.schema.as_deref(),
            Segment::Identifier => self.identifier.as_deref(),
        }
    }

    /// The dotted name with excluded and missing segments left out.
    pub fn render(&self) -> String {
        [Segment::Database, Segment::Schema, Segment::Identifier]
            .into_iter()
            .filter(|&segment| self.include_policy.get(segment))
            .filter_map(|segment| {
                let value = self.segment(segment)?;
                Some(if self.quote_policy.get(segment) {
                    quote_identifier(value)
                } else {
                    value.to_string()
                })
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Wrap `identifier` in double quotes, doubling any embedded quote.
pub fn quote_identifier(identifier: &str) -> String {
    let escaped = identifier.replace(QUOTE_CHARACTER, "\"\"");
    format!("{q}{}{q}", escaped, q = QUOTE_CHARACTER)
}

impl fmt::Display for Db2iRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
