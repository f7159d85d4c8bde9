//! Baseline Builder — turns a validated intent plus account context into the
//! entity graph the store persists.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::baselines::intent::CreateBaselineIntent;
use crate::middleware::account::AccountId;

/// Baseline row plus its inventory associations, ready to insert as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBaseline {
    pub account: AccountId,
    pub name: String,
    /// Always a JSON object; `{}` when the caller sent no config.
    pub config: Value,
    /// Unique inventory ids, in ascending order.
    pub inventory_ids: Vec<Uuid>,
}

pub fn build_baseline(account: AccountId, intent: CreateBaselineIntent) -> NewBaseline {
    let CreateBaselineIntent {
        name,
        inventory_ids,
        config,
    } = intent;

    let inventory_ids: BTreeSet<Uuid> = inventory_ids.into_iter().collect();

    NewBaseline {
        account,
        name,
        config: Value::Object(config.unwrap_or_else(Map::new)),
        inventory_ids: inventory_ids.into_iter().collect(),
    }
}
