//! Resource identifier parsing
//!
//! Platform resources are addressed as `ri.<service>.<instance>.<type>.<locator>`,
//! e.g. `ri.foundry.main.dataset.3f2a...`. The locator is the rest of the string
//! and may itself contain dots.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A parsed resource identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rid {
    pub service: String,
    pub instance: String,
    pub resource_type: String,
    pub locator: String,
}

impl Rid {
    /// Parse and validate a RID string
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidRid(format!("'{input}': {reason}"));

        let mut parts = input.splitn(5, '.');
        if parts.next() != Some("ri") {
            return Err(invalid("must start with 'ri.'"));
        }

        let mut component = |name: &str| -> Result<String> {
            match parts.next() {
                Some(part) if is_component(part) => Ok(part.to_string()),
                Some(_) => Err(invalid(&format!("invalid {name}"))),
                None => Err(invalid(&format!("missing {name}"))),
            }
        };

        let service = component("service")?;
        let instance = component("instance")?;
        let resource_type = component("type")?;

        let locator = match parts.next() {
            Some(locator) if !locator.is_empty() && !locator.chars().any(char::is_whitespace) => {
                locator.to_string()
            }
            Some(_) => return Err(invalid("invalid locator")),
            None => return Err(invalid("missing locator")),
        };

        Ok(Self {
            service,
            instance,
            resource_type,
            locator,
        })
    }
}

fn is_component(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl FromStr for Rid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Rid::parse(s)
    }
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ri.{}.{}.{}.{}",
            self.service, self.instance, self.resource_type, self.locator
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dataset_rid() {
        let rid = Rid::parse("ri.foundry.main.dataset.0a1b2c3d-aaaa-bbbb").unwrap();
        assert_eq!(rid.service, "foundry");
        assert_eq!(rid.instance, "main");
        assert_eq!(rid.resource_type, "dataset");
        assert_eq!(rid.locator, "0a1b2c3d-aaaa-bbbb");
        assert_eq!(rid.to_string(), "ri.foundry.main.dataset.0a1b2c3d-aaaa-bbbb");
    }

    #[test]
    fn test_locator_may_contain_dots() {
        let rid: Rid = "ri.compass.main.folder.a.b".parse().unwrap();
        assert_eq!(rid.locator, "a.b");
    }

    #[test]
    fn test_invalid_rids() {
        for input in [
            "",
            "foundry.main.dataset.x",
            "ri.foundry.main.dataset",
            "ri.foundry.main.dataset.",
            "ri..main.dataset.x",
            "ri.foundry.main.dataset.has space",
            "ri.foo bar.main.dataset.x",
        ] {
            assert!(
                matches!(Rid::parse(input), Err(Error::InvalidRid(_))),
                "{input} should be rejected"
            );
        }
    }
}
