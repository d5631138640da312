// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod capture;
pub mod inspect;
pub mod list;
pub mod recover;

use labcap_recovery::Classification;

/// Short status word and detail for a classified buffer
pub(crate) fn describe(classification: &Classification) -> (&'static str, Option<String>) {
    match classification {
        Classification::Corrupt { reason } => ("corrupt", Some(reason.clone())),
        Classification::Closed { .. } => ("closed", None),
        Classification::Orphaned { .. } => ("orphaned", None),
    }
}
