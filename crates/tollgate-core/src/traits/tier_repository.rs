use crate::errors::TollgateResult;
use crate::models::Tier;

/// Source of the tier list, read once at startup.
pub trait ITierRepository: Send + Sync {
    fn list_tiers(&self) -> TollgateResult<Vec<Tier>>;
}

impl ITierRepository for Vec<Tier> {
    fn list_tiers(&self) -> TollgateResult<Vec<Tier>> {
        Ok(self.clone())
    }
}
