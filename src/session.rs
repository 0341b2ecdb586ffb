//! Interactive session state.

use crate::error::CliError;

/// Deployment localities the provider exposes. The `region` command and
/// `Region` parameter completion only ever accept values from this set.
pub const REGIONS: &[&str] = &[
    "cn-north-01",
    "cn-north-02",
    "cn-north-03",
    "cn-east-01",
    "cn-south-01",
    "hk-01",
    "us-west-01",
];

/// Process-lifetime shell state: the currently selected region and the
/// prompt derived from it. Mutated only by the `region` command.
#[derive(Debug, Default)]
pub struct Session {
    region: Option<String>,
}

impl Session {
    pub fn new(region: Option<String>) -> Self {
        Session { region }
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Switch the active region, rejecting anything outside [`REGIONS`].
    pub fn set_region(&mut self, region: &str) -> Result<(), CliError> {
        if !REGIONS.contains(&region) {
            return Err(CliError::InvalidRegion(region.to_string()));
        }
        self.region = Some(region.to_string());
        Ok(())
    }

    pub fn prompt(&self) -> String {
        match &self.region {
            Some(region) => format!("Nimbus {region}"),
            None => "Nimbus".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_region_updates_session_and_prompt() {
        let mut session = Session::default();
        assert_eq!(session.prompt(), "Nimbus");

        session.set_region("hk-01").unwrap();
        assert_eq!(session.region(), Some("hk-01"));
        assert_eq!(session.prompt(), "Nimbus hk-01");
    }

    #[test]
    fn invalid_region_leaves_session_unchanged() {
        let mut session = Session::new(Some("hk-01".to_string()));
        let err = session.set_region("mars-01").unwrap_err();
        assert!(err.to_string().contains("Invalid region: mars-01"));
        assert_eq!(session.region(), Some("hk-01"));
    }
}
