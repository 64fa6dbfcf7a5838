use crate::{Connection, Error, Result};
use std::collections::BTreeMap;

/// Named collection of open connections. The first one added becomes the
/// default until [`set_default`](Registry::set_default) says otherwise.
#[derive(Default)]
pub struct Registry {
    connections: BTreeMap<String, Connection>,
    default: Option<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, connection: Connection) {
        let name = name.into();
        if self.default.is_none() {
            self.default = Some(name.clone());
        }
        self.connections.insert(name, connection);
    }

    /// A registered connection by name, or the default one.
    pub fn connection(&mut self, name: Option<&str>) -> Result<&mut Connection> {
        let name = match name.or(self.default.as_deref()) {
            Some(name) => name,
            None => return Err(Error::connection("the registry holds no connections")),
        };
        // The borrow of `default` must end before the mutable lookup.
        let name = name.to_string();
        self.connections
            .get_mut(&name)
            .ok_or_else(|| Error::connection(format!("no connection registered as `{name}`")))
    }

    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.connections.contains_key(name) {
            return Err(Error::connection(format!(
                "no connection registered as `{name}`",
            )));
        }
        self.default = Some(name.to_string());
        Ok(())
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.connections.keys().map(String::as_str)
    }
}
