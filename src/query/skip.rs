//! Decides whether a run should be skipped.

use crate::error::Result;
use crate::rpc::{with_session, SessionFactory};
use tracing::debug;

/// Why a run was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The static skip flag was set.
    Flag,
    /// The named keyspace already exists on the node.
    KeyspacePresent(String),
}

/// Evaluates the skip flag and the skip-if-keyspace-present check.
pub struct SkipEvaluator<'a> {
    factory: &'a dyn SessionFactory,
    skip: bool,
    skip_if_keyspace_is_present: Option<&'a str>,
}

impl<'a> SkipEvaluator<'a> {
    /// Creates a new skip evaluator.
    pub fn new(
        factory: &'a dyn SessionFactory,
        skip: bool,
        skip_if_keyspace_is_present: Option<&'a str>,
    ) -> Self {
        Self {
            factory,
            skip,
            skip_if_keyspace_is_present,
        }
    }

    /// Returns true if the run should not execute anything.
    pub fn should_skip(&self) -> Result<bool> {
        Ok(self.skip_reason()?.is_some())
    }

    /// Returns why the run should be skipped, if it should.
    ///
    /// The flag is checked first and needs no session. Otherwise a configured
    /// keyspace is looked up in one session; any describe failure counts as
    /// "absent". Failing to open the session is still an error.
    pub fn skip_reason(&self) -> Result<Option<SkipReason>> {
        if self.skip {
            return Ok(Some(SkipReason::Flag));
        }

        let Some(keyspace) = self.skip_if_keyspace_is_present else {
            return Ok(None);
        };

        let exists = keyspace_exists(self.factory, keyspace)?;
        Ok(exists.then(|| SkipReason::KeyspacePresent(keyspace.to_string())))
    }
}

/// Looks up a keyspace in its own session.
pub fn keyspace_exists(factory: &dyn SessionFactory, keyspace: &str) -> Result<bool> {
    with_session(factory, |session| match session.describe_keyspace(keyspace) {
        Ok(()) => Ok(true),
        Err(e) => {
            debug!("Assuming keyspace '{}' is absent: {}", keyspace, e);
            Ok(false)
        }
    })
}
