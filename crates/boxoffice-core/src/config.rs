use anyhow::Context as _;

/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field `database_url` is read from
/// `DATABASE_URL` and so on. Use `#[serde(default = ...)]` for optional vars.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> anyhow::Result<Self> {
        envy::from_env().context("load config from environment")
    }

    /// Same as [`Config::from_env`] but over an explicit variable set.
    fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars).context("load config from variables")
    }
}
