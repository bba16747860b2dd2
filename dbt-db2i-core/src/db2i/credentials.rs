//! Connection credentials.

use crate::db2i::error::{Db2iError, Db2iResult};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

/// Alternative configuration keys and the canonical field each resolves to.
pub const CREDENTIAL_ALIASES: &[(&str, &str)] = &[
    ("user", "UID"),
    ("username", "UID"),
    ("pass", "PWD"),
    ("password", "PWD"),
    ("naming", "NAM"),
    ("library", "schema"),
];

/// Fields that are safe to show in diagnostics, in display order.
const CONNECTION_KEYS: &[&str] = &["driver", "database", "NAM", "UID", "schema"];

/// Resolve a configuration key to its canonical field name.
pub fn canonical_key(key: &str) -> &str {
    CREDENTIAL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(key)
}

/// Parameters needed to reach one Db2 for i database.
///
/// The password is held as a [`SecretString`] and never appears in `Debug`
/// output or in [`connection_info`](Self::connection_info).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Db2iCredentials {
    driver: String,
    system: String,
    database: String,
    #[serde(rename = "UID", alias = "user", alias = "username", default)]
    uid: Option<String>,
    #[serde(
        rename = "PWD",
        alias = "pass",
        alias = "password",
        default,
        deserialize_with = "deserialize_secret"
    )]
    pwd: Option<SecretString>,
    #[serde(rename = "NAM", alias = "naming", default)]
    nam: i32,
    #[serde(alias = "library", default)]
    schema: Option<String>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

impl Db2iCredentials {
    pub fn new(
        driver: impl Into<String>,
        system: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            driver: driver.into(),
            system: system.into(),
            database: database.into(),
            uid: None,
            pwd: None,
            nam: 0,
            schema: None,
        }
    }

    /// Build credentials from raw configuration pairs, resolving aliases.
    ///
    /// A field given twice, directly or through an alias, is rejected.
    pub fn from_pairs<I, K, V>(pairs: I) -> Db2iResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut driver = None;
        let mut system = None;
        let mut database = None;
        let mut uid = None;
        let mut pwd = None;
        let mut nam = None;
        let mut schema = None;

        for (key, value) in pairs {
            let key = canonical_key(key.as_ref());
            let value: String = value.into();
            let slot_taken = match key {
                "driver" => driver.replace(value).is_some(),
                "system" => system.replace(value).is_some(),
                "database" => database.replace(value).is_some(),
                "UID" => uid.replace(value).is_some(),
                "PWD" => pwd.replace(SecretString::from(value)).is_some(),
                "schema" => schema.replace(value).is_some(),
                "NAM" => {
                    let naming = value.trim().parse::<i32>().map_err(|_| {
                        Db2iError::config(format!("NAM must be an integer, got '{}'", value))
                    })?;
                    nam.replace(naming).is_some()
                }
                other => {
                    return Err(Db2iError::config(format!(
                        "unrecognized credential key '{}'",
                        other
                    )));
                }
            };
            if slot_taken {
                return Err(Db2iError::config(format!(
                    "credential '{}' was given more than once",
                    key
                )));
            }
        }

        let required = |value: Option<String>, name: &str| {
            value.ok_or_else(|| {
                Db2iError::config(format!("missing required credential '{}'", name))
            })
        };

        Ok(Self {
            driver: required(driver, "driver")?,
            system: required(system, "system")?,
            database: required(database, "database")?,
            uid,
            pwd,
            nam: nam.unwrap_or(0),
            schema,
        })
    }

    pub fn user(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.pwd = Some(SecretString::from(pwd.into()));
        self
    }

    pub fn naming(mut self, nam: i32) -> Self {
        self.nam = nam;
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Dialect tag used by the host engine.
    pub fn type_name(&self) -> &'static str {
        "db2_for_i"
    }

    /// Key used to partition connections per user.
    pub fn unique_field(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn nam(&self) -> i32 {
        self.nam
    }

    pub fn get_schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn has_password(&self) -> bool {
        self.pwd.is_some()
    }

    pub(crate) fn expose_password(&self) -> Option<&str> {
        self.pwd.as_ref().map(|pwd| pwd.expose_secret())
    }

    /// The displayable subset of fields, in a fixed order.
    pub fn connection_info(&self) -> Vec<(&'static str, Option<String>)> {
        CONNECTION_KEYS
            .iter()
            .map(|&key| {
                let value = match key {
                    "driver" => Some(self.driver.clone()),
                    "database" => Some(self.database.clone()),
                    "NAM" => Some(self.nam.to_string()),
                    "UID" => self.uid.clone(),
                    _ => self.schema.clone(),
                };
                (key, value)
            })
            .collect()
    }
}
