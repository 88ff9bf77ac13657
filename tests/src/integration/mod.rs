//! Integration flows across fc-ledger and fc-node

pub mod ledger_flows;
pub mod registry_flows;
