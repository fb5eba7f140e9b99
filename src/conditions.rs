// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Set-or-update helpers for workspace status conditions.

use crate::types::{Condition, ConditionStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::chrono::Utc;

pub fn get<'a>(conditions: &'a [Condition], condition_type: &str) -> Option<&'a Condition> {
    conditions
        .iter()
        .find(|c| c.condition_type == condition_type)
}

pub fn is_true(conditions: &[Condition], condition_type: &str) -> bool {
    get(conditions, condition_type).is_some_and(|c| c.status == ConditionStatus::True)
}

/// Set `status` for `condition_type`, leaving other condition types untouched.
///
/// Nothing is written when neither status nor message changed. The transition
/// time only moves when the status flips. Returns whether anything changed.
pub fn set(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: ConditionStatus,
    reason: Option<&str>,
    message: Option<String>,
) -> bool {
    let Some(existing) = conditions
        .iter_mut()
        .find(|c| c.condition_type == condition_type)
    else {
        conditions.push(Condition {
            condition_type: condition_type.to_string(),
            status,
            reason: reason.map(str::to_string),
            message,
            last_transition_time: Some(Time(Utc::now())),
        });
        return true;
    };

    if existing.status == status && existing.message == message {
        return false;
    }

    if existing.status != status {
        existing.last_transition_time = Some(Time(Utc::now()));
    }
    existing.status = status;
    existing.reason = reason.map(str::to_string);
    existing.message = message;
    true
}

pub fn mark_true(conditions: &mut Vec<Condition>, condition_type: &str) -> bool {
    set(conditions, condition_type, ConditionStatus::True, None, None)
}

pub fn mark_false(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    reason: &str,
    message: impl Into<String>,
) -> bool {
    set(
        conditions,
        condition_type,
        ConditionStatus::False,
        Some(reason),
        Some(message.into()),
    )
}
